//! Lembrete Server Library
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod protocol;
pub mod scheduler;
pub mod server;
pub mod store;
pub mod types;
