pub use loadtest_hook_core::{config, contract, storage_keys};
