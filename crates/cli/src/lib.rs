//! Lendguard CLI - report orchestrator
//!
//! This crate provides the `lendguard` binary and its commands.

pub mod commands;
pub mod context;

pub use context::AppContext;
