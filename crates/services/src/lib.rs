#![forbid(unsafe_code)]

pub mod analysis_service;
pub mod backend;
pub mod error;
pub mod flow;
pub mod http_backend;
pub mod session_service;

pub use quiz_core::Clock;

pub use analysis_service::{AnalysisService, QuizReport};
pub use backend::{AnalysisBundle, InMemoryQuizBackend, QuizBackend, QuizFetch, SubmitOutcome};
pub use error::{AnalysisError, BackendError, FlowError, SessionError};
pub use flow::QuizFlowService;
pub use http_backend::{HttpQuizBackend, QuizApiConfig};
pub use session_service::QuizSession;
