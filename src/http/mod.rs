//! Request/response model, transports and body normalization.

pub mod normalize;
pub mod payload;
pub mod request;
pub mod response;
pub mod responsebody;
pub mod result;
pub mod transport;

// Re-exports for convenience
pub use payload::{Payload, PayloadError, UrlPayload, XmlPayload};
pub use request::{Method, Request, ResponseFormat};
pub use response::HttpResponse;
pub use responsebody::ResponseBody;
pub use result::HttpResult;
pub use transport::{HttpTransport, RoundTrip, UserAgentTransport, DEFAULT_USER_AGENT};
