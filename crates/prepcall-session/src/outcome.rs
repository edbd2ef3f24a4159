//! Terminal-state navigation decision.

/// Where the caller should be routed once a session reaches its terminal
/// state. Produced exactly once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Feedback was created; route to the feedback-detail view for this id.
    FeedbackReady { feedback_id: String },
    /// No feedback applies (generation mode, empty transcript, or dispatch
    /// failure); route to a neutral landing point.
    ReturnHome,
}
