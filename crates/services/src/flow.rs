use std::sync::Arc;

use quiz_core::model::QuizCode;

use crate::Clock;
use crate::backend::{QuizBackend, SubmitOutcome};
use crate::error::FlowError;
use crate::session_service::QuizSession;

/// Orchestrates one quiz attempt end to end: fetch the question bank,
/// hand the session to the caller, transmit the snapshot on submit.
///
/// The two network calls flank the session; everything between them is
/// synchronous, single-owner session state.
#[derive(Clone)]
pub struct QuizFlowService {
    clock: Clock,
    backend: Arc<dyn QuizBackend>,
}

impl QuizFlowService {
    #[must_use]
    pub fn new(clock: Clock, backend: Arc<dyn QuizBackend>) -> Self {
        Self { clock, backend }
    }

    /// Fetch the quiz for a join code and start a session on it.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Backend` if the fetch fails and
    /// `FlowError::Session` if the fetched quiz has no questions.
    pub async fn start_session(&self, code: QuizCode) -> Result<QuizSession, FlowError> {
        let fetch = self.backend.fetch_quiz(code).await?;
        let session = QuizSession::new(code, fetch.questions, fetch.started_at)?;
        Ok(session)
    }

    /// End the attempt and deliver the snapshot to the submission sink.
    ///
    /// The session transitions to its terminal state before the network
    /// call, so a rapid second invocation fails on the session and never
    /// reaches the backend.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Session` if the session was already submitted and
    /// `FlowError::Backend` if delivery fails.
    pub async fn submit_session(
        &self,
        session: &mut QuizSession,
    ) -> Result<SubmitOutcome, FlowError> {
        let snapshot = session.submit(self.clock.now())?;
        let outcome = self.backend.submit_answers(&snapshot).await?;
        Ok(outcome)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
