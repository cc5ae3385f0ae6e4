use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Fixed-window request limiter keyed by client IP.
pub struct RateLimiter {
    /// IP -> (window start, requests in window)
    windows: DashMap<IpAddr, (Instant, u32)>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    /// `max_requests` per second.
    pub fn per_second(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(1))
    }

    /// Record a request from `ip`.
    /// Returns Err(time until the window reopens) when over the limit.
    pub fn check(&self, ip: IpAddr) -> Result<(), Duration> {
        let now = Instant::now();

        let mut entry = self.windows.entry(ip).or_insert((now, 0));
        let (started, count) = entry.value_mut();

        if now.duration_since(*started) >= self.window {
            *started = now;
            *count = 1;
            return Ok(());
        }

        if *count >= self.max_requests {
            return Err(self.window - now.duration_since(*started));
        }

        *count += 1;
        Ok(())
    }

    /// Drop windows idle for more than two periods.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, (started, _)| now.duration_since(*started) < self.window * 2);
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Periodically prune idle clients so the map does not grow without bound.
pub fn spawn_cleanup(limiter: Arc<RateLimiter>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            limiter.cleanup();
            tracing::debug!("Rate limiter tracking {} clients", limiter.tracked_clients());
        }
    })
}
