//! Handler registration and dispatch.
//!
//! A [`HandlerRegistry`] keeps `(matcher, responder)` pairs in registration
//! order. [`HandlerRegistry::dispatch`] hands a request to the first pair whose
//! matcher accepts it; when none does, the request is reported back as a
//! [`DispatchError`] carrying everything needed to fix the test setup.

mod error;
mod registry;

pub use error::DispatchError;
pub use registry::{Dispatched, HandlerId, HandlerRegistry, Selected};

use crate::types::request::RecordedRequest;
use crate::types::response::MockResponse;

/// Decides whether a handler applies to a request.
pub trait Match: Send + Sync {
    fn matches(&self, request: &RecordedRequest) -> bool;
}

impl<F> Match for F
where
    F: Fn(&RecordedRequest) -> bool + Send + Sync,
{
    fn matches(&self, request: &RecordedRequest) -> bool {
        self(request)
    }
}

/// Produces the response for a matched request.
pub trait Respond: Send + Sync {
    fn respond(&self, request: &RecordedRequest) -> MockResponse;
}

impl Respond for MockResponse {
    fn respond(&self, _request: &RecordedRequest) -> MockResponse {
        self.clone()
    }
}

impl<F> Respond for F
where
    F: Fn(&RecordedRequest) -> MockResponse + Send + Sync,
{
    fn respond(&self, request: &RecordedRequest) -> MockResponse {
        self(request)
    }
}
