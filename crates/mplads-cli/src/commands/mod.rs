//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db, load_config)
//! - `import` - Collection import
//! - `status` - Database and configuration status
//! - `views` - Analytics views printed as JSON

pub mod core;
pub mod import;
pub mod status;
pub mod views;

// Re-export command functions for main.rs
pub use self::core::*;
pub use import::*;
pub use status::*;
pub use views::*;
