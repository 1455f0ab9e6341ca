pub mod config;
pub mod logging;
pub mod path_guard;

pub const APP_NAME: &str = "nook";

pub use config::{NookConfig, StorageKind, TasksConfig, ValentineConfig};
