//! Domain core for PrepCall: session lifecycle types, the voice engine and
//! backend boundaries, and the shared error type.

pub mod engine;
pub mod error;
pub mod feedback;
pub mod interview;
pub mod session;

// Re-export common error type
pub use error::{PrepcallError, Result};
