//! Session domain module.
//!
//! This module contains all session-related domain models and the small
//! pure components the call controller drives.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`, `SessionMode`)
//! - `status`: Lifecycle states (`CallStatus`)
//! - `transcript`: Transcript accumulation (`Speaker`, `TranscriptEntry`, `TranscriptAggregator`)
//! - `progress`: Question-progress tracking (`ProgressTracker`)
//! - `quality`: Connection-quality signal (`ConnectionQuality`, `ConnectionMonitor`)

mod model;
mod progress;
mod quality;
mod status;
mod transcript;

// Re-export public API
pub use model::{InterviewContext, Session, SessionMode};
pub use progress::ProgressTracker;
pub use quality::{ConnectionMonitor, ConnectionQuality};
pub use status::CallStatus;
pub use transcript::{Speaker, TranscriptAggregator, TranscriptEntry};
