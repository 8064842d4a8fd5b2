use mockyard_core::DispatchError;
use std::net::SocketAddr;

/// Errors returned by [`MockHttpServer`](crate::MockHttpServer)
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listener could not be bound
    #[error("{name}: failed to bind {addr}: {source}")]
    Bind {
        name: String,
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The server has not been started
    #[error("{0}: server is not started")]
    NotStarted(String),
    /// Requests arrived that no handler matched
    #[error("{name}: {} request(s) had no matching handler\n{}", .failures.len(), join_failures(.failures))]
    UnmatchedRequests {
        name: String,
        failures: Vec<DispatchError>,
    },
}

fn join_failures(failures: &[DispatchError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
