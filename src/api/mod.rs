pub mod client;
pub mod error;
pub mod payloads;
pub mod transport;
pub mod types;

pub use client::HttpTransport;
pub use error::TransportError;
pub use transport::{Api, ApiRequest, ApiResponse, Method, Transport};
