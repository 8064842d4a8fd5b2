use crate::config::ServerConfig;
use crate::error::ServerError;
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use mockyard_core::matchers::path;
use mockyard_core::{
    DispatchError, HandlerId, HandlerRegistry, Match, MockResponse, RecordedRequest, Respond,
    StubDefinition,
};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// State shared between the test-facing handle and the connection tasks.
struct SharedState {
    registry: HandlerRegistry,
    /// Requests received since the server was created
    total_requests: usize,
    /// `total_requests` at the last reset
    baseline: usize,
    received: Vec<RecordedRequest>,
    failures: Vec<DispatchError>,
}

type SharedStateRef = Arc<Mutex<SharedState>>;

fn lock(state: &SharedStateRef) -> MutexGuard<'_, SharedState> {
    // A panicking test must not turn every later lock into a second failure
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Running {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// HTTP server whose responses come from test-registered handlers.
///
/// Handlers are tried in registration order and the first match answers.
/// Counters and recorded requests are scoped to the time since the last
/// [`reset_http_server`](Self::reset_http_server).
pub struct MockHttpServer {
    config: ServerConfig,
    state: SharedStateRef,
    running: Option<Running>,
}

impl MockHttpServer {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(ServerConfig::new(name))
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let state = SharedState {
            registry: HandlerRegistry::new(config.name.clone()),
            total_requests: 0,
            baseline: 0,
            received: Vec::new(),
            failures: Vec::new(),
        };
        Self {
            config,
            state: Arc::new(Mutex::new(state)),
            running: None,
        }
    }

    /// Create and start a server in one step.
    pub async fn started(name: impl Into<String>) -> Result<Self, ServerError> {
        let mut server = Self::new(name);
        server.start().await?;
        Ok(server)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn is_started(&self) -> bool {
        self.running.is_some()
    }

    /// Bind an ephemeral port and start serving.
    ///
    /// Calling this on a running server only logs; it is not an error.
    pub async fn start(&mut self) -> Result<(), ServerError> {
        if self.running.is_some() {
            tracing::info!(server = %self.config.name, "{} is already started", self.config.name);
            return Ok(());
        }

        let bind_addr = SocketAddr::new(self.config.host, 0);
        let listener = TcpListener::bind(bind_addr)
            .await
            .and_then(|listener| Ok((listener.local_addr()?, listener)));
        let (addr, listener) = listener.map_err(|source| ServerError::Bind {
            name: self.config.name.clone(),
            addr: bind_addr,
            source,
        })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&self.state),
            Arc::from(self.config.name.as_str()),
            shutdown_rx,
        ));

        tracing::info!(server = %self.config.name, %addr, "mock server started");
        self.running = Some(Running {
            addr,
            shutdown_tx,
            join,
        });
        Ok(())
    }

    /// Stop accepting connections and wait for the accept loop to finish.
    pub async fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown_tx.send(());
            if let Err(err) = running.join.await {
                tracing::warn!(server = %self.config.name, error = %err, "accept loop ended abnormally");
            }
            tracing::info!(server = %self.config.name, "mock server stopped");
        }
    }

    /// Register a handler. Earlier registrations take precedence.
    ///
    /// The responder is called without any server lock held.
    pub fn add_response_handler<M, R>(&self, matcher: M, responder: R) -> HandlerId
    where
        M: Match + 'static,
        R: Respond + 'static,
    {
        lock(&self.state).registry.register(matcher, responder)
    }

    /// Register a handler for an exact path, query string included.
    pub fn add_path_handler<R>(&self, path_str: &str, responder: R) -> HandlerId
    where
        R: Respond + 'static,
    {
        self.add_response_handler(path(path_str), responder)
    }

    /// Register declarative stubs in order.
    pub fn add_stubs(&self, stubs: &[StubDefinition]) -> Vec<HandlerId> {
        let mut state = lock(&self.state);
        stubs
            .iter()
            .map(|stub| {
                let id = state.registry.register_stub(stub);
                tracing::debug!(server = %self.config.name, stub = %stub.id, handler = %id, "registered stub");
                id
            })
            .collect()
    }

    /// Number of requests a handler has answered, `None` once it is gone.
    pub fn handler_hits(&self, id: HandlerId) -> Option<usize> {
        lock(&self.state).registry.hits(id)
    }

    /// Drop all handlers and start counting requests from zero.
    ///
    /// # Panics
    ///
    /// Panics when requests since the last reset had no matching handler and
    /// were not collected with [`verify`](Self::verify). The server is reset
    /// before the panic.
    pub fn reset_http_server(&self) {
        let mut state = lock(&self.state);
        state.registry.clear();
        state.baseline = state.total_requests;
        state.received.clear();
        let failures = std::mem::take(&mut state.failures);
        drop(state);

        if !failures.is_empty() && !std::thread::panicking() {
            panic!(
                "{}",
                ServerError::UnmatchedRequests {
                    name: self.config.name.clone(),
                    failures,
                }
            );
        }
    }

    /// Base URL such as `http://127.0.0.1:41234`, never with a trailing slash.
    pub fn server_url(&self) -> Result<String, ServerError> {
        let running = self
            .running
            .as_ref()
            .ok_or_else(|| ServerError::NotStarted(self.config.name.clone()))?;
        Ok(format!("http://{}", running.addr)
            .trim_end_matches('/')
            .to_string())
    }

    /// Address the server is bound to.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.addr)
    }

    /// Requests received since the last reset.
    pub fn request_count(&self) -> usize {
        let state = lock(&self.state);
        state.total_requests - state.baseline
    }

    /// Snapshots of the requests received since the last reset, in arrival order.
    pub fn received_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).received.clone()
    }

    /// Fail if any request since the last reset had no handler.
    ///
    /// The failures are consumed, so a verified server can be dropped quietly.
    pub fn verify(&self) -> Result<(), ServerError> {
        let failures = std::mem::take(&mut lock(&self.state).failures);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ServerError::UnmatchedRequests {
                name: self.config.name.clone(),
                failures,
            })
        }
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown_tx.send(());
            running.join.abort();
        }

        if std::thread::panicking() {
            return;
        }
        if let Err(err) = self.verify() {
            panic!("{err}");
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    state: SharedStateRef,
    name: Arc<str>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            accept = listener.accept() => {
                let (stream, peer) = match accept {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        tracing::debug!(server = %name, error = %err, "accept failed");
                        continue;
                    }
                };
                let io = TokioIo::new(stream);
                let state = Arc::clone(&state);
                let name = Arc::clone(&name);
                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        handle_request(req, Arc::clone(&state), Arc::clone(&name))
                    });
                    if let Err(err) = hyper::server::conn::http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        tracing::debug!(%peer, error = %err, "connection error");
                    }
                });
            }
        }
    }
}

async fn handle_request(
    req: Request<Incoming>,
    state: SharedStateRef,
    name: Arc<str>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            tracing::warn!(server = %name, error = %err, "failed to read request body");
            return Ok(plain_response(
                StatusCode::BAD_REQUEST,
                format!("failed to read request body: {err}"),
            ));
        }
    };

    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());
    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    let request = RecordedRequest {
        method: parts.method,
        path,
        headers,
        body,
        sequence_number: 0,
    };
    Ok(respond_to(&state, &name, request))
}

/// Record `request`, pick its handler and build the HTTP response.
///
/// The responder runs after the state lock is released, so it may call back
/// into the server.
fn respond_to(
    state: &SharedStateRef,
    name: &str,
    mut request: RecordedRequest,
) -> Response<Full<Bytes>> {
    let mut guard = lock(state);
    request.sequence_number = guard.total_requests;
    guard.total_requests += 1;
    guard.received.push(request.clone());

    let selected = guard.registry.select(&request);
    if let Err(err) = &selected {
        guard.failures.push(err.clone());
    }
    drop(guard);

    match selected {
        Ok(selected) => {
            let dispatched = selected.respond(&request);
            let response = dispatched.response;
            tracing::info!(
                server = %name,
                handler = %dispatched.handler,
                hits = dispatched.hits,
                "Responding [{}: {}]: status={} body={}",
                request.method,
                request.path,
                response.status(),
                response.compact_body()
            );
            to_http_response(name, response)
        }
        Err(err) => {
            tracing::error!(server = %name, "{err}");
            plain_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn to_http_response(name: &str, response: MockResponse) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(response.status());
    for (header_name, value) in response.headers() {
        builder = builder.header(header_name.as_str(), value.as_str());
    }
    builder
        .body(Full::new(response.body().clone()))
        .unwrap_or_else(|err| {
            tracing::error!(server = %name, error = %err, "invalid mock response");
            plain_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{name}: invalid mock response: {err}"),
            )
        })
}

fn plain_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use rstest::rstest;

    #[rstest]
    fn test_server_url_requires_start() {
        let server = MockHttpServer::new("idle");
        assert!(matches!(
            server.server_url(),
            Err(ServerError::NotStarted(name)) if name == "idle"
        ));
        assert_eq!(server.request_count(), 0);
        assert!(!server.is_started());
    }

    #[rstest]
    fn test_handlers_can_be_registered_before_start() {
        let server = MockHttpServer::new("early");
        let id = server.add_path_handler("/ready", MockResponse::ok());
        assert_eq!(server.handler_hits(id), Some(0));

        server.reset_http_server();
        assert_eq!(server.handler_hits(id), None);
    }

    #[rstest]
    fn test_verify_reports_and_consumes_failures() {
        let server = MockHttpServer::new("verify");
        {
            let mut state = lock(&server.state);
            let request = RecordedRequest::new(Method::GET, "/missing");
            let err = state
                .registry
                .dispatch(&request)
                .expect_err("empty registry");
            state.failures.push(err);
        }

        let err = server.verify().expect_err("Should report failure");
        let message = err.to_string();
        assert!(message.contains("verify: 1 request(s) had no matching handler"));
        assert!(message.contains("GET /missing"));

        assert!(server.verify().is_ok());
    }

    fn unmatched(server: &MockHttpServer, path: &str) {
        let response = respond_to(
            &server.state,
            server.name(),
            RecordedRequest::new(Method::GET, path),
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[rstest]
    #[should_panic(expected = "reused: 1 request(s) had no matching handler")]
    fn test_reset_reports_unverified_failures() {
        let server = MockHttpServer::new("reused");
        unmatched(&server, "/nothing");

        server.reset_http_server();
    }

    #[rstest]
    fn test_reset_leaves_server_clean_after_reporting() {
        let server = MockHttpServer::new("recovering");
        unmatched(&server, "/nothing");

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            server.reset_http_server()
        }));

        assert!(outcome.is_err());
        assert!(server.verify().is_ok());
        assert_eq!(server.request_count(), 0);
        server.reset_http_server();
    }

    #[rstest]
    fn test_reset_after_verify_is_quiet() {
        let server = MockHttpServer::new("verified");
        unmatched(&server, "/nothing");

        assert!(server.verify().is_err());
        server.reset_http_server();
        assert_eq!(server.request_count(), 0);
    }

    #[rstest]
    fn test_responder_can_read_server_state() {
        let server = MockHttpServer::new("reentrant");
        let state = Arc::downgrade(&server.state);
        server.add_path_handler("/count", move |_request: &RecordedRequest| {
            let Some(state) = state.upgrade() else {
                return MockResponse::ok().with_status(410);
            };
            let total = state.try_lock().ok().map(|guard| guard.total_requests);
            match total {
                Some(total) => MockResponse::ok().with_body(total.to_string()),
                None => MockResponse::ok().with_status(423),
            }
        });

        let response = respond_to(
            &server.state,
            server.name(),
            RecordedRequest::new(Method::GET, "/count"),
        );

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(server.request_count(), 1);
    }

    #[rstest]
    fn test_to_http_response_invalid_header_falls_back_to_500() {
        let response = MockResponse::ok().with_header("bad header", "x");
        let http_response = to_http_response("mock", response);
        assert_eq!(http_response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[rstest]
    fn test_to_http_response_copies_status_and_headers() {
        let response = MockResponse::ok()
            .with_status(418)
            .with_header("x-kind", "teapot");
        let http_response = to_http_response("mock", response);
        assert_eq!(http_response.status().as_u16(), 418);
        assert_eq!(http_response.headers()["x-kind"], "teapot");
    }
}
