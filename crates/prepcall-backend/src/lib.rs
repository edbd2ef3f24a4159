//! HTTP clients and configuration for the PrepCall remote backend.

pub mod config;
mod feedback_api;
mod http;
mod interview_api;

pub use config::BackendConfig;
pub use feedback_api::HttpFeedbackService;
pub use interview_api::HttpInterviewService;
