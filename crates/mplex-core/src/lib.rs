//! # mplex-core
//!
//! Core types shared by the mplex line queue and its tools.
//!
//! This crate is platform-agnostic and contains no OS-specific code.
//! Descriptor I/O lives in `mplex-queue`.
//!
//! ## Modules
//!
//! - `error` - Queue and formatted-write error types
//! - `kprint` - Kernel-style debug printing macros
//! - `env` - Environment variable utilities

pub mod error;
pub mod kprint;
pub mod env;

// Re-exports for convenience
pub use error::{QueueError, QueueResult, WriteError};
pub use env::{env_get, env_get_bool, env_get_opt};
