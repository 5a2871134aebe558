use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use tracing::{debug, warn};

use quiz_core::model::{
    AnswerKey, AnswerKeyEntry, AnswerSheet, GivenAnswer, OptionKey, Question, QuestionId,
    QuizCode, ResultId, SubmissionSnapshot,
};

use crate::backend::{AnalysisBundle, QuizBackend, QuizFetch, SubmitOutcome};
use crate::error::BackendError;

#[derive(Clone, Debug)]
pub struct QuizApiConfig {
    pub base_url: String,
    pub bearer_token: String,
}

impl QuizApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
        }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("QUIZ_API_BASE_URL").ok()?;
        let bearer_token = env::var("QUIZ_API_TOKEN").ok()?;
        if base_url.trim().is_empty() || bearer_token.trim().is_empty() {
            return None;
        }
        Some(Self {
            base_url,
            bearer_token,
        })
    }
}

/// `QuizBackend` over the quiz platform's HTTP API.
///
/// Request and response bodies mirror the platform's JSON wire format:
/// camelCase request fields, `quiz` / `resdata` / `quizInfo` response
/// envelopes, and answers keyed by question id.
#[derive(Clone)]
pub struct HttpQuizBackend {
    client: Client,
    config: QuizApiConfig,
}

impl HttpQuizBackend {
    #[must_use]
    pub fn new(config: QuizApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        QuizApiConfig::from_env().map(Self::new)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, BackendError>
    where
        Req: Serialize + Sync,
        Resp: for<'de> Deserialize<'de>,
    {
        let url = self.endpoint(path);
        debug!(%url, "sending quiz api request");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.bearer_token)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), path, "quiz api request failed");
            return Err(BackendError::HttpStatus(response.status()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl QuizBackend for HttpQuizBackend {
    async fn fetch_quiz(&self, code: QuizCode) -> Result<QuizFetch, BackendError> {
        let response: QuizGetResponse = self
            .post_json(
                "quiz/get",
                &QuizGetRequest {
                    quiz_code: code.value(),
                },
            )
            .await?;
        Ok(quiz_fetch_from_response(response))
    }

    async fn submit_answers(
        &self,
        snapshot: &SubmissionSnapshot,
    ) -> Result<SubmitOutcome, BackendError> {
        let request = SubmitRequest::from_snapshot(snapshot);
        let response: SubmitResponse = self.post_json("quiz/submit", &request).await?;
        Ok(SubmitOutcome {
            score: response.score,
            total: response.total,
            percentage: response.percentage,
            points: response.points,
            time_taken: response.time_taken,
        })
    }

    async fn fetch_analysis(
        &self,
        code: QuizCode,
        result: ResultId,
    ) -> Result<AnalysisBundle, BackendError> {
        let response: AnalysisResponse = self
            .post_json(
                "quiz/analysis",
                &AnalysisRequest {
                    quiz_code: code.value(),
                    qid: result.value(),
                },
            )
            .await?;
        Ok(bundle_from_response(response))
    }
}

//
// ─── WIRE FORMAT ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct QuizGetRequest {
    #[serde(rename = "quizCode")]
    quiz_code: u64,
}

#[derive(Debug, Deserialize)]
struct QuizGetResponse {
    quiz: QuizPayload,
}

#[derive(Debug, Deserialize)]
struct QuizPayload {
    questions: Vec<QuestionDto>,
    #[serde(rename = "startTime")]
    start_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct QuestionDto {
    id: u64,
    question: String,
    options: BTreeMap<String, String>,
}

impl QuestionDto {
    fn into_question(self) -> Question {
        Question::new(
            QuestionId::new(self.id),
            self.question,
            self.options
                .into_iter()
                .map(|(k, v)| (OptionKey::from(k), v)),
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AnswerDto {
    option: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct SubmitRequest {
    answers: BTreeMap<u64, AnswerDto>,
    #[serde(rename = "quizCode")]
    quiz_code: u64,
    #[serde(rename = "startTime")]
    start_time: DateTime<Utc>,
    #[serde(rename = "endTime")]
    end_time: DateTime<Utc>,
}

impl SubmitRequest {
    fn from_snapshot(snapshot: &SubmissionSnapshot) -> Self {
        Self {
            answers: snapshot
                .answers
                .iter()
                .map(|a| {
                    (
                        a.question_id.value(),
                        AnswerDto {
                            option: a.option.as_str().to_string(),
                            value: a.value.clone(),
                        },
                    )
                })
                .collect(),
            quiz_code: snapshot.quiz_code.value(),
            start_time: snapshot.started_at,
            end_time: snapshot.completed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    score: u32,
    total: u32,
    percentage: Option<u32>,
    points: u32,
    #[serde(rename = "timeTaken")]
    time_taken: Option<i64>,
}

#[derive(Debug, Serialize)]
struct AnalysisRequest {
    #[serde(rename = "quizCode")]
    quiz_code: u64,
    qid: u64,
}

#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    resdata: ResultData,
    #[serde(rename = "quizInfo")]
    quiz_info: QuizInfo,
}

#[derive(Debug, Deserialize)]
struct ResultData {
    quiz_title: String,
    score: u32,
    total_questions: u32,
    submitted_at: DateTime<Utc>,
    given_answer: BTreeMap<u64, AnswerDto>,
}

#[derive(Debug, Deserialize)]
struct QuizInfo {
    questions: Vec<QuestionDto>,
    answers: Vec<AnswerKeyDto>,
}

#[derive(Debug, Deserialize)]
struct AnswerKeyDto {
    id: u64,
    correct_option: String,
}

fn quiz_fetch_from_response(response: QuizGetResponse) -> QuizFetch {
    QuizFetch {
        questions: response
            .quiz
            .questions
            .into_iter()
            .map(QuestionDto::into_question)
            .collect(),
        started_at: response.quiz.start_time,
    }
}

// Stored answers arrive as a JSON map keyed by question id; the wire loses
// the original answer order, so the rebuilt sheet iterates in ascending
// question-id order.
fn bundle_from_response(response: AnalysisResponse) -> AnalysisBundle {
    let sheet: AnswerSheet = response
        .resdata
        .given_answer
        .into_iter()
        .map(|(id, dto)| {
            GivenAnswer::new(QuestionId::new(id), OptionKey::from(dto.option), dto.value)
        })
        .collect();

    AnalysisBundle {
        title: response.resdata.quiz_title,
        questions: response
            .quiz_info
            .questions
            .into_iter()
            .map(QuestionDto::into_question)
            .collect(),
        answer_key: AnswerKey::from_entries(response.quiz_info.answers.into_iter().map(|a| {
            AnswerKeyEntry::new(QuestionId::new(a.id), OptionKey::from(a.correct_option))
        })),
        sheet,
        server_score: response.resdata.score,
        server_total: response.resdata.total_questions,
        submitted_at: response.resdata.submitted_at,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_get_response_parses_into_fetch() {
        let json = r#"{
            "quiz": {
                "questions": [
                    {
                        "id": 1,
                        "question": "What is 2 + 2?",
                        "options": { "A": "3", "B": "4" }
                    }
                ],
                "startTime": "2025-01-15T10:00:00Z"
            }
        }"#;

        let response: QuizGetResponse = serde_json::from_str(json).unwrap();
        let fetch = quiz_fetch_from_response(response);

        assert_eq!(fetch.questions.len(), 1);
        let q = &fetch.questions[0];
        assert_eq!(q.id(), QuestionId::new(1));
        assert_eq!(q.text(), "What is 2 + 2?");
        assert_eq!(q.option_text(&OptionKey::from("B")), Some("4"));
        assert_eq!(
            fetch.started_at,
            "2025-01-15T10:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn submit_request_serializes_answers_keyed_by_question_id() {
        let mut answers = AnswerSheet::new();
        answers.record(GivenAnswer::new(
            QuestionId::new(2),
            OptionKey::from("B"),
            "beta",
        ));
        answers.record(GivenAnswer::new(
            QuestionId::new(1),
            OptionKey::from("A"),
            "alpha",
        ));

        let snapshot = SubmissionSnapshot {
            quiz_code: QuizCode::new(42),
            answers,
            started_at: "2025-01-15T10:00:00Z".parse().unwrap(),
            completed_at: "2025-01-15T10:05:00Z".parse().unwrap(),
        };

        let value = serde_json::to_value(SubmitRequest::from_snapshot(&snapshot)).unwrap();
        assert_eq!(value["quizCode"], 42);
        assert_eq!(value["answers"]["1"]["option"], "A");
        assert_eq!(value["answers"]["2"]["value"], "beta");
        assert_eq!(value["startTime"], "2025-01-15T10:00:00Z");
        assert_eq!(value["endTime"], "2025-01-15T10:05:00Z");
    }

    #[test]
    fn submit_response_tolerates_missing_optional_fields() {
        let json = r#"{ "score": 3, "total": 5, "points": 30 }"#;
        let response: SubmitResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.score, 3);
        assert_eq!(response.percentage, None);
        assert_eq!(response.time_taken, None);
    }

    #[test]
    fn analysis_response_parses_into_bundle() {
        let json = r#"{
            "resdata": {
                "quiz_title": "Sample quiz",
                "score": 1,
                "total_questions": 2,
                "submitted_at": "2025-01-15T10:05:00Z",
                "given_answer": {
                    "1": { "option": "A", "value": "alpha" },
                    "2": { "option": "B", "value": "beta" }
                }
            },
            "quizInfo": {
                "questions": [
                    { "id": 1, "question": "q1", "options": { "A": "alpha" } },
                    { "id": 2, "question": "q2", "options": { "B": "beta" } }
                ],
                "answers": [
                    { "id": 1, "correct_option": "A" },
                    { "id": 2, "correct_option": "C" }
                ]
            }
        }"#;

        let response: AnalysisResponse = serde_json::from_str(json).unwrap();
        let bundle = bundle_from_response(response);

        assert_eq!(bundle.title, "Sample quiz");
        assert_eq!(bundle.server_score, 1);
        assert_eq!(bundle.server_total, 2);
        assert_eq!(bundle.questions.len(), 2);
        assert_eq!(bundle.sheet.len(), 2);
        assert_eq!(
            bundle.answer_key.correct_option(QuestionId::new(2)),
            Some(&OptionKey::from("C"))
        );
    }

    #[test]
    fn endpoint_joins_without_duplicate_slashes() {
        let backend = HttpQuizBackend::new(QuizApiConfig::new("https://api.example.com/", "t"));
        assert_eq!(
            backend.endpoint("quiz/get"),
            "https://api.example.com/quiz/get"
        );
    }
}
