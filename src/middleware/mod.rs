pub mod rate_limit;

pub use rate_limit::{spawn_cleanup, RateLimiter};
