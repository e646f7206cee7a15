//! Shared types and configuration for Salama.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
