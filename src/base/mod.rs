//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): every failure a request can surface
//! - [`context`]: helpers attaching host/domain context to IO errors

pub mod context;
pub mod neterror;
