//! On-disk configuration and name data for Planet X runs.
//!
//! Settings files are RON, TOML or JSON, chosen by extension. The body-name
//! list is plain text, one name per line; a default list is bundled.

pub mod loader;
pub mod names;
pub mod schema;

pub use loader::{DataLoadError, load_settings};
pub use names::{bundled_names, load_name_pool};
pub use schema::Settings;
