// src/config/mod.rs

//! Configuration loading: TOML model plus file discovery.

pub mod loader;
pub mod model;

pub use loader::{discover_and_load, discover_config, discover_config_from, load_from_path};
pub use model::{ConfigFile, DagSection, LogRotation, LogSection, TaskDecl};
