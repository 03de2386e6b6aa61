//! Value models shared by the phpscope reflection engine and its front ends.
//!
//! Everything in this crate is a plain value: no parsing, no I/O. Resolution
//! results are built through `with_*` transformations that return new
//! instances, so a context handed to a caller can never change afterwards.

pub mod models;

// Re-export commonly used types
pub use models::*;
