//! Environment variable utilities
//!
//! Every `MPX_*` override is read through these helpers, so a missing or
//! malformed variable always degrades to the compiled-in default.
//!
//! # Usage
//!
//! ```ignore
//! use mplex_core::env::{env_get, env_get_bool};
//!
//! let ideal: usize = env_get("MPX_IDEAL_RECVQ", 16384);
//! let flush = env_get_bool("MPX_FLUSH_EPRINT", false);
//! ```

use std::str::FromStr;

/// Get environment variable parsed as `T`, or return `default`
///
/// Surrounding whitespace is ignored, so `MPX_MIN_RECVQ=" 512"` parses.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env_get_opt(key).unwrap_or(default)
}

/// Get environment variable as boolean
///
/// "1", "true", "yes", "on" are true; "0", "false", "no", "off" are false
/// (case-insensitive). Anything else, including unset, yields `default`.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => parse_bool(&val).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `Some(T)` if the variable is set and parses, `None` otherwise
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

// ============================================================================
// Tests
// ============================================================================
