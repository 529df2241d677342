//! Enrollment service configuration.

use std::env::{self, VarError};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, PageLimits};
use crate::util::retry::RetryPolicy;

/// Tunables for the enrollment service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentConfig {
    /// Longest wait for a per-class lock before a concurrency error.
    pub lock_timeout_ms: u64,
    /// Attempts for operations failing with a concurrency error.
    pub max_attempts: u32,
    /// First retry delay; doubles per attempt.
    pub base_backoff_ms: u64,
    /// Cap on any single retry delay.
    pub max_backoff_ms: u64,
    /// Page size when the caller gives none.
    pub default_page_limit: usize,
    /// Largest page size served.
    pub max_page_limit: usize,
    /// Events kept by the in-memory audit sink.
    pub audit_buffer: usize,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 2_000,
            max_attempts: 3,
            base_backoff_ms: 10,
            max_backoff_ms: 200,
            default_page_limit: 10,
            max_page_limit: 100,
            audit_buffer: 10_000,
            log_filter: "class_enrollment=info".into(),
        }
    }
}

impl EnrollmentConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.lock_timeout_ms == 0 {
            return Err("lock_timeout_ms must be greater than 0".into());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".into());
        }
        if self.max_backoff_ms < self.base_backoff_ms {
            return Err("max_backoff_ms must be at least base_backoff_ms".into());
        }
        if self.default_page_limit == 0 {
            return Err("default_page_limit must be greater than 0".into());
        }
        if self.max_page_limit < self.default_page_limit {
            return Err("max_page_limit must be at least default_page_limit".into());
        }
        if self.audit_buffer == 0 {
            return Err("audit_buffer must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `ENROLLMENT_*` variables, after loading `.env`
    /// if one exists.
    ///
    /// # Errors
    ///
    /// Fails on unparsable variables or an invalid resulting config.
    pub fn from_env() -> AppResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("loaded environment from {}", path.display());
        }
        let mut cfg = Self::default();
        override_from_env("ENROLLMENT_LOCK_TIMEOUT_MS", &mut cfg.lock_timeout_ms)?;
        override_from_env("ENROLLMENT_MAX_ATTEMPTS", &mut cfg.max_attempts)?;
        override_from_env("ENROLLMENT_BASE_BACKOFF_MS", &mut cfg.base_backoff_ms)?;
        override_from_env("ENROLLMENT_MAX_BACKOFF_MS", &mut cfg.max_backoff_ms)?;
        override_from_env("ENROLLMENT_DEFAULT_PAGE_LIMIT", &mut cfg.default_page_limit)?;
        override_from_env("ENROLLMENT_MAX_PAGE_LIMIT", &mut cfg.max_page_limit)?;
        override_from_env("ENROLLMENT_AUDIT_BUFFER", &mut cfg.audit_buffer)?;
        override_from_env("ENROLLMENT_LOG_FILTER", &mut cfg.log_filter)?;
        cfg.validate()
            .map_err(|e| anyhow::anyhow!("invalid enrollment config: {e}"))?;
        Ok(cfg)
    }

    /// Lock acquisition timeout.
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Retry policy for concurrency errors.
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_backoff: Duration::from_millis(self.base_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }

    /// Pagination policy for list requests.
    pub const fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_limit: self.default_page_limit,
            max_limit: self.max_page_limit,
        }
    }
}

fn override_from_env<T>(key: &str, slot: &mut T) -> AppResult<()>
where
    T: FromStr,
    T::Err: Display + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => {
            *slot = raw
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("invalid value for {key}: {raw:?}"))?;
            Ok(())
        }
        Err(VarError::NotPresent) => Ok(()),
        Err(e) => Err(e).with_context(|| format!("reading {key}")),
    }
}
