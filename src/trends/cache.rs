//! Bounded-lifetime cache of client handles
//!
//! Handles are keyed by (locale, timezone offset) and rebuilt transparently
//! once older than the configured lifetime.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::utils::error::FetchError;

use super::ClientHandle;

struct CachedHandle {
    handle: ClientHandle,
    created_at: Instant,
}

/// Cache of client handles with a fixed time-to-live
pub struct ClientCache {
    ttl: Duration,
    entries: HashMap<(String, i32), CachedHandle>,
}

impl ClientCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached handle for this key, building it with `init` if
    /// missing or expired
    ///
    /// # Errors
    ///
    /// Returns whatever `init` fails with; nothing is cached in that case.
    pub fn get_or_try_init<F>(
        &mut self,
        locale: &str,
        timezone_offset: i32,
        init: F,
    ) -> Result<ClientHandle, FetchError>
    where
        F: FnOnce() -> Result<ClientHandle, FetchError>,
    {
        self.get_or_try_init_at(Instant::now(), locale, timezone_offset, init)
    }

    /// Same as [`get_or_try_init`](Self::get_or_try_init) with an explicit clock
    pub fn get_or_try_init_at<F>(
        &mut self,
        now: Instant,
        locale: &str,
        timezone_offset: i32,
        init: F,
    ) -> Result<ClientHandle, FetchError>
    where
        F: FnOnce() -> Result<ClientHandle, FetchError>,
    {
        let key = (locale.to_string(), timezone_offset);

        if let Some(cached) = self.entries.get(&key) {
            if now.saturating_duration_since(cached.created_at) < self.ttl {
                return Ok(cached.handle.clone());
            }
            tracing::debug!(locale, timezone_offset, "Client handle expired, rebuilding");
        }

        let handle = init()?;
        self.entries.insert(
            key,
            CachedHandle {
                handle: handle.clone(),
                created_at: now,
            },
        );

        tracing::debug!(locale, timezone_offset, "Client handle initialized");
        Ok(handle)
    }
}
