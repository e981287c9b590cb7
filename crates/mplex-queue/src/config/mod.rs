//! Queue configuration
//!
//! Compile-time defaults with runtime environment overrides.
//!
//! # Configuration Priority (highest wins)
//!
//! 1. Builder setters (programmatic)
//! 2. Environment variables (`from_env()`)
//! 3. Library defaults (`defaults`)
//!
//! # Example
//!
//! ```rust,ignore
//! use mplex_queue::QueueConfig;
//!
//! let config = QueueConfig::from_env().ideal_recvq(64 * 1024);
//! config.validate()?;
//! ```

pub mod defaults;

use mplex_core::env::env_get;
use mplex_core::kwarn;

/// Receive-side sizing consumed by the capacity manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Minimum tail slack the inbound adapter requires before reading
    pub min_recvq: usize,
    /// Preferred allocation size and shrink ceiling
    pub ideal_recvq: usize,
}

/// Compiled-in defaults; the environment is only read by `from_env()`.
impl Default for QueueConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueConfig {
    /// Create config from compile-time defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `MPX_MIN_RECVQ` - Minimum free space before a read
    /// - `MPX_IDEAL_RECVQ` - Preferred buffer size / shrink ceiling
    ///
    /// An override pair that fails `validate()` is discarded in favour
    /// of the defaults. Call once at startup and share the result.
    pub fn from_env() -> Self {
        let config = Self {
            min_recvq: env_get("MPX_MIN_RECVQ", defaults::MIN_RECVQ),
            ideal_recvq: env_get("MPX_IDEAL_RECVQ", defaults::IDEAL_RECVQ),
        };
        match config.validate() {
            Ok(()) => config,
            Err(reason) => {
                kwarn!(
                    "ignoring MPX_MIN_RECVQ={} MPX_IDEAL_RECVQ={}: {}",
                    config.min_recvq,
                    config.ideal_recvq,
                    reason
                );
                Self::new()
            }
        }
    }

    /// Create config with explicit defaults (no env override).
    pub fn new() -> Self {
        Self {
            min_recvq: defaults::MIN_RECVQ,
            ideal_recvq: defaults::IDEAL_RECVQ,
        }
    }

    pub fn min_recvq(mut self, n: usize) -> Self {
        self.min_recvq = n;
        self
    }

    pub fn ideal_recvq(mut self, n: usize) -> Self {
        self.ideal_recvq = n;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.min_recvq == 0 {
            return Err("min_recvq must be at least 1");
        }
        if self.ideal_recvq < self.min_recvq {
            return Err("ideal_recvq must not be below min_recvq");
        }
        Ok(())
    }
}
