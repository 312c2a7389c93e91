//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use picoclaw_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Provider: {}", cfg.agents.defaults.provider);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::Config;
