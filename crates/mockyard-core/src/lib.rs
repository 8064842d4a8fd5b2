//! Core library for mockyard.
//!
//! Holds everything that does not need a socket:
//! - [`types`]: recorded requests, mock responses and declarative stub definitions
//! - [`matching`] and [`matchers`]: request predicates
//! - [`dispatch`]: the ordered handler registry that picks a response for a request
//! - [`config`]: loading stub definitions from YAML/JSON/JSONC files

pub mod config;
pub mod dispatch;
pub mod expression;
pub mod matchers;
pub mod matching;
pub mod types;

pub use dispatch::{
    DispatchError, Dispatched, HandlerId, HandlerRegistry, Match, Respond, Selected,
};
pub use types::request::RecordedRequest;
pub use types::response::MockResponse;
pub use types::stub::StubDefinition;
