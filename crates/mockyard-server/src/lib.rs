//! Embedded HTTP mock server for integration tests.
//!
//! [`MockHttpServer`] listens on an ephemeral local port and answers every
//! request with the first registered handler that matches it. Requests that no
//! handler matches are answered with `500`, logged, and kept so the test fails:
//! either through [`MockHttpServer::verify`] or when the server is dropped.
//!
//! ```ignore
//! let mut server = MockHttpServer::new("users-api");
//! server.start().await?;
//! server.add_path_handler("/users/1", MockResponse::ok().with_json_body(&json!({"id": 1})));
//!
//! let client = UsersClient::new(server.server_url()?);
//! ```

mod config;
mod error;
mod server;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::MockHttpServer;

pub use mockyard_core::matchers;
pub use mockyard_core::{HandlerId, Match, MockResponse, RecordedRequest, Respond, StubDefinition};
