//! Interview lookup boundary.
//!
//! An interview record supplies the question list and context that seed a
//! session. It is consumed once, before the session is created.

use crate::error::Result;
use crate::session::{InterviewContext, Session};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An interview definition as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewDetails {
    pub id: String,
    pub role: String,
    pub level: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub questions: Vec<String>,
    /// Free-form classification (e.g. "technical", "behavioral").
    #[serde(default)]
    pub interview_type: Option<String>,
}

impl InterviewDetails {
    /// Seeds an interview-mode session from this definition.
    pub fn into_session(self) -> Session {
        let context = InterviewContext {
            role: self.role,
            level: self.level,
            company: self.company,
            job_description: self.job_description,
        };
        Session::interview(self.id, self.questions, context)
    }
}

/// Remote interview lookup operations.
#[async_trait]
pub trait InterviewService: Send + Sync {
    /// Finds an interview by its identifier.
    ///
    /// # Errors
    ///
    /// Returns `PrepcallError::NotFound` when no interview exists for `id`.
    async fn find_by_id(&self, id: &str) -> Result<InterviewDetails>;

    /// Finds an interview by its access code.
    ///
    /// # Errors
    ///
    /// Returns `PrepcallError::NotFound` when the code matches nothing.
    async fn find_by_access_code(&self, code: &str) -> Result<InterviewDetails>;
}
