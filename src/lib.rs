pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;

pub use config::Config;
pub use db::{init_pool, run_migrations};
pub use error::AppError;
pub use routes::create_router;
pub use seed::{import_file, import_str, SeedError, SeedReport};
pub use state::AppState;
