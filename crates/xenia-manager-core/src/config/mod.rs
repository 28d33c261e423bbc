//! Configuration loading

pub mod hierarchical_loader;

pub use hierarchical_loader::HierarchicalConfigLoader;
