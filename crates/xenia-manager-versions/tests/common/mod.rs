//! Common test infrastructure for xenia-manager-versions tests
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: tags, asset names and payloads
//! - `builders`: fluent builders for release feed JSON
//! - `mock_server`: wiremock setup for feeds and downloads
//! - `fixtures`: zip payloads and a throwaway managed-content root

// Not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod fixtures;
pub mod mock_server;

pub use builders::*;
pub use constants::*;
pub use fixtures::*;
pub use mock_server::*;
