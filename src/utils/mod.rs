//! Utility functions and types.

pub mod dates;
pub mod strings;

pub use dates::*;
pub use strings::*;
