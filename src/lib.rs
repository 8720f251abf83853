//! Slugline - time-scoped aliases for short, unique slugs.
//!
//! A slug names one external target. Aliases are alternate names for a slug
//! that are valid only during a half-open interval; intervals sharing an
//! alias name never overlap, so every alias resolves to at most one target
//! at any instant.

pub mod config;
pub mod db;
pub mod error;
pub mod interval;
pub mod models;
pub mod routes;
pub mod state;
pub mod target;
pub mod time;
pub mod validation;

pub use config::Config;
pub use db::{init_pool, run_migrations};
pub use error::{Error, Result, ValidationError};
pub use interval::Interval;
pub use models::{Alias, Resolution, Slug};
pub use routes::create_router;
pub use state::AppState;
pub use target::{CatalogEntry, TargetCatalog, TargetRef, TargetResolver};
pub use time::Timestamp;
pub use validation::Validator;
