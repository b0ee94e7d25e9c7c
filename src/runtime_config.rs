//! Coroutine runtime settings from the environment.
//!
//! `TREEROUTER_STACK_SIZE` sets the `may` coroutine stack size in bytes,
//! as decimal (`65536`) or hex (`0x10000`). Each connection runs on its own
//! coroutine, so memory use is roughly stack size times open connections.

use std::env;

/// Stack size used when the variable is missing or invalid
pub const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Coroutine stack size in bytes
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

/// Parse `16384` or `0x4000`
pub fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
    .filter(|size| *size > 0)
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let stack_size = env::var("TREEROUTER_STACK_SIZE")
            .ok()
            .and_then(|v| parse_size(&v))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }

    /// Apply to the global `may` configuration
    pub fn apply(&self, workers: Option<usize>) {
        let config = may::config();
        config.set_stack_size(self.stack_size);
        if let Some(workers) = workers.filter(|w| *w > 0) {
            config.set_workers(workers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("16384"), Some(16384));
        assert_eq!(parse_size("0x4000"), Some(0x4000));
        assert_eq!(parse_size(" 0X8000 "), Some(0x8000));
        assert_eq!(parse_size("0"), None);
        assert_eq!(parse_size("lots"), None);
    }
}
