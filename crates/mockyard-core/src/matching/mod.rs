//! Matching primitives shared by the request matchers.
//!
//! Each function answers one question about a request part (URL, headers,
//! query, body) and treats an unspecified expectation as "match anything".

mod headers;
mod intersection;
mod payload;
mod query;
mod url;

pub use headers::headers_matches;
pub use intersection::{hashmap_intersects, hashmap_to_value, object_intersects};
pub use payload::payload_matches;
pub use query::{parse_query_string, query_matches};
pub use url::{url_matches, PathPattern};
