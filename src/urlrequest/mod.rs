//! Redirect-following request execution.

pub mod job;

pub use job::{URLRequestHttpJob, AUTH_URL, DEFAULT_REDIRECT_LIMIT};
