pub mod engine;
pub mod jmeter;
pub mod lifecycle;
pub mod logging;
pub mod object_store;
