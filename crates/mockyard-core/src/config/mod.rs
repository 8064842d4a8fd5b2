//! Loading declarative stubs from YAML, JSON and JSONC files.

pub mod error;
pub mod parser;

pub use error::ConfigError;
pub use parser::{load_stubs, parse_config, parse_stubs, strip_json_comments, StubFormat};
