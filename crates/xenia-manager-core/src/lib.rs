//! # xenia-manager-core
//!
//! Core library for Xenia Manager providing:
//! - Runtime configuration types (network, feed, product naming, paths)
//! - Hierarchical configuration loading with embedded defaults
//! - Shared error type

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use types::RuntimeConfig;
pub use utils::get_home_dir;
