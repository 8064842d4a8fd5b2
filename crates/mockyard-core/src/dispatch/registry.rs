use crate::dispatch::{DispatchError, Match, Respond};
use crate::matchers::RequestMatcher;
use crate::types::request::RecordedRequest;
use crate::types::response::MockResponse;
use crate::types::stub::StubDefinition;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque identifier returned when a handler is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(Uuid);

impl HandlerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of a successful dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    /// Handler that produced the response
    pub handler: HandlerId,
    /// Invocation count of that handler, including this request
    pub hits: usize,
    pub response: MockResponse,
}

/// Handler picked for a request whose response has not been built yet.
///
/// Holding one does not borrow the registry, so the responder can run after
/// any lock around the registry is released.
#[derive(Clone)]
pub struct Selected {
    pub handler: HandlerId,
    pub hits: usize,
    responder: Arc<dyn Respond>,
}

impl Selected {
    pub fn respond(self, request: &RecordedRequest) -> Dispatched {
        Dispatched {
            handler: self.handler,
            hits: self.hits,
            response: self.responder.respond(request),
        }
    }
}

impl fmt::Debug for Selected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selected")
            .field("handler", &self.handler)
            .field("hits", &self.hits)
            .finish_non_exhaustive()
    }
}

struct Registration {
    id: HandlerId,
    matcher: Box<dyn Match>,
    responder: Arc<dyn Respond>,
    hits: usize,
}

/// Ordered list of handlers.
///
/// Registration order is dispatch order: when several matchers accept a
/// request, the earliest registered one wins.
pub struct HandlerRegistry {
    name: String,
    registrations: Vec<Registration>,
}

impl HandlerRegistry {
    /// Create an empty registry. `name` prefixes dispatch error messages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registrations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a handler and return its identifier.
    pub fn register<M, R>(&mut self, matcher: M, responder: R) -> HandlerId
    where
        M: Match + 'static,
        R: Respond + 'static,
    {
        let id = HandlerId::new();
        self.registrations.push(Registration {
            id,
            matcher: Box::new(matcher),
            responder: Arc::new(responder),
            hits: 0,
        });
        id
    }

    /// Register a declarative stub.
    pub fn register_stub(&mut self, stub: &StubDefinition) -> HandlerId {
        self.register(RequestMatcher::from(stub), stub.response.to_response())
    }

    /// Find the first handler accepting `request` and count the hit.
    pub fn select(&mut self, request: &RecordedRequest) -> Result<Selected, DispatchError> {
        let registration = self
            .registrations
            .iter_mut()
            .find(|registration| registration.matcher.matches(request))
            .ok_or_else(|| DispatchError::no_handler(&self.name, request))?;

        registration.hits += 1;

        Ok(Selected {
            handler: registration.id,
            hits: registration.hits,
            responder: Arc::clone(&registration.responder),
        })
    }

    /// [`select`](Self::select) and build the response in one step.
    pub fn dispatch(&mut self, request: &RecordedRequest) -> Result<Dispatched, DispatchError> {
        Ok(self.select(request)?.respond(request))
    }

    /// Number of requests answered by a handler, `None` if the id is unknown.
    pub fn hits(&self, id: HandlerId) -> Option<usize> {
        self.registrations
            .iter()
            .find(|registration| registration.id == id)
            .map(|registration| registration.hits)
    }

    /// Remove a single handler. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: HandlerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|registration| registration.id != id);
        self.registrations.len() != before
    }

    pub fn clear(&mut self) {
        self.registrations.clear();
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("name", &self.name)
            .field(
                "handlers",
                &self
                    .registrations
                    .iter()
                    .map(|registration| (registration.id, registration.hits))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
