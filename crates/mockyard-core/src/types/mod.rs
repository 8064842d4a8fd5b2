//! Value types exchanged between the server, the registry and stub files.

pub mod request;
pub mod response;
pub mod stub;
