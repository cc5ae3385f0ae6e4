use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::Config;
use crate::middleware::RateLimiter;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub read_limiter: Arc<RateLimiter>,
    /// Chassis weight used by performance estimates, in lbs.
    pub base_kart_weight: f64,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            read_limiter: Arc::new(RateLimiter::per_second(config.read_limit)),
            base_kart_weight: config.base_kart_weight,
        }
    }
}
