//! Zani - workspace context cache manager
//!
//! Keeps one remote context cache per workspace and decides, from a content
//! snapshot of the workspace, whether that cache still represents it.

pub mod audit;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod policy;
pub mod provider;
pub mod registry;
pub mod ui;
pub mod workspace;

pub use error::{ZaniError, ZaniResult};
