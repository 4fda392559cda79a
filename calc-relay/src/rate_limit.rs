//! Per-client request limiting.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

// Expired windows are swept once the table grows past this many clients.
const SWEEP_THRESHOLD: usize = 1024;

/// Fixed-window limiter: each client may make `max_requests` accepted
/// requests per window. The window starts with the client's first request.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

struct Window {
    count: u32,
    reset_at: Instant,
}

impl RateLimiter {
    pub fn new(
        max_requests: u32,
        window: Duration,
    ) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Records a request from `client` and reports whether it is allowed.
    pub fn check(
        &self,
        client: &str,
    ) -> bool {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(
        &self,
        client: &str,
        now: Instant,
    ) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, window| now < window.reset_at);
        }

        match windows.get_mut(client) {
            Some(window) if now < window.reset_at => {
                if window.count >= self.max_requests {
                    return false;
                }
                window.count += 1;
                true
            }
            _ => {
                windows.insert(
                    client.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                self.max_requests > 0
            }
        }
    }
}
