//! Live interview call-session orchestration.
//!
//! This crate owns the one genuinely stateful part of PrepCall: driving a
//! real-time voice conversation with the external engine, accumulating the
//! transcript, and triggering exactly-once feedback generation when the
//! conversation ends.

mod controller;
mod dispatcher;
mod driver;
mod outcome;

pub use controller::CallSessionController;
pub use dispatcher::FeedbackDispatcher;
pub use driver::{SessionCommand, SessionDriver, SessionUpdate};
pub use outcome::SessionOutcome;
