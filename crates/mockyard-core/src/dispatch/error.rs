use crate::types::request::RecordedRequest;

/// Errors produced while dispatching a request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// No registered handler matched the request
    #[error("{server}: mock has no handler for {method} {path}\n\tHeaders:\n{headers}\n\tBody: {body}")]
    NoHandler {
        server: String,
        method: String,
        path: String,
        headers: String,
        body: String,
    },
}

impl DispatchError {
    pub fn no_handler(server: &str, request: &RecordedRequest) -> Self {
        let headers = request
            .headers
            .iter()
            .map(|(name, value)| format!("\t\t{name} : {value}"))
            .collect::<Vec<_>>()
            .join("\n");

        DispatchError::NoHandler {
            server: server.to_string(),
            method: request.method.to_string(),
            path: request.path.clone(),
            headers,
            body: request.body_text().into_owned(),
        }
    }
}
