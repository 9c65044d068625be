pub mod config_io;
pub mod kv;
pub mod lock;
pub mod logging;
pub mod persistence;
pub mod recovery;
pub mod watcher;
