//! Rate limiting middleware
//!
//! This module provides the sliding-window limiter guarding login attempts.
//! Attempts are counted per normalized email address.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::normalize_email;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum attempts per window
    pub max_requests: u32,
    /// Time window duration
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_duration: Duration::from_secs(60),
        }
    }
}

impl From<&AuthConfig> for RateLimitConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            max_requests: config.login_max_attempts,
            window_duration: Duration::from_secs(config.login_window_seconds),
        }
    }
}

/// Attempts recorded for one key
#[derive(Debug, Clone, Default)]
struct RateLimitEntry {
    requests: Vec<Instant>,
}

impl RateLimitEntry {
    /// Drop attempts that fell out of the window
    fn cleanup(&mut self, window_duration: Duration) {
        let now = Instant::now();
        self.requests
            .retain(|&time| now.saturating_duration_since(time) < window_duration);
    }

    fn is_allowed(&mut self, config: &RateLimitConfig) -> bool {
        self.cleanup(config.window_duration);
        (self.requests.len() as u32) < config.max_requests
    }

    fn record_request(&mut self) {
        self.requests.push(Instant::now());
    }
}

/// Per-email login limiter shared by all request handlers
#[derive(Clone, Debug)]
pub struct LoginRateLimiter {
    config: RateLimitConfig,
    entries: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
}

impl LoginRateLimiter {
    /// Create a new LoginRateLimiter instance
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        // A panic while holding the lock leaves only stale timestamps behind
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count one login attempt for `email`, failing once the window is full
    pub fn check_rate_limit(&self, email: &str) -> Result<()> {
        let key = normalize_email(email);
        let mut entries = self.entries();
        let entry = entries.entry(key.clone()).or_default();

        if entry.is_allowed(&self.config) {
            entry.record_request();
            debug!(email = %key, attempts = entry.requests.len(), "Login rate limit check passed");
            Ok(())
        } else {
            warn!(email = %key, "Login rate limit exceeded");
            Err(EventHubError::RateLimitExceeded)
        }
    }

    /// Forget the attempts of `email`, used after a successful login
    pub fn reset(&self, email: &str) {
        self.entries().remove(&normalize_email(email));
    }

    /// Get current rate limit status for `email`
    pub fn get_rate_limit_status(&self, email: &str) -> RateLimitStatus {
        let mut entries = self.entries();
        let current_requests = match entries.get_mut(&normalize_email(email)) {
            Some(entry) => {
                entry.cleanup(self.config.window_duration);
                entry.requests.len() as u32
            }
            None => 0,
        };

        RateLimitStatus {
            current_requests,
            max_requests: self.config.max_requests,
            remaining_requests: self.config.max_requests.saturating_sub(current_requests),
            window_duration: self.config.window_duration,
        }
    }

    /// Clean up expired entries to prevent memory leaks
    pub fn cleanup_expired_entries(&self) {
        let window = self.config.window_duration;
        let mut entries = self.entries();
        let before = entries.len();

        entries.retain(|_, entry| {
            entry.cleanup(window);
            !entry.requests.is_empty()
        });

        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed = removed, "Cleaned up expired login rate limit entries");
        }
    }

    /// Spawn a task pruning expired entries once per window
    pub fn start_cleanup_task(&self) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        let window = self.config.window_duration;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(window);
            loop {
                ticker.tick().await;
                limiter.cleanup_expired_entries();
            }
        });

        info!("Started login rate limit cleanup every {:?}", window);
        handle
    }
}

/// Rate limit status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub current_requests: u32,
    pub max_requests: u32,
    pub remaining_requests: u32,
    pub window_duration: Duration,
}

impl RateLimitStatus {
    pub fn is_limited(&self) -> bool {
        self.remaining_requests == 0
    }
}
