use std::path::Path;

pub trait ObjectFetcher {
    fn fetch_object(&self, bucket: &str, key: &str, destination: &Path) -> Result<(), String>;
}

pub trait ArtifactStore {
    fn store_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String>;
}
