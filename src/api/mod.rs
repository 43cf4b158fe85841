//! Backend API support types.

pub mod headers;

pub use headers::{ApiHeaders, CustomApiHeader};
