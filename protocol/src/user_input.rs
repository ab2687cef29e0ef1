use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

/// One selectable option of an ask-user-question request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInputQuestionOption {
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// A single question inside an ask-user-question request.
///
/// Questions are single-select: the host's type system has no per-question
/// multi-select, so an answer always carries at most one selected label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInputQuestion {
    pub id: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<UserInputQuestionOption>>,
}

/// An ask-user-question request pushed by the host. A new request replaces
/// any request currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInputRequest {
    /// Host-side identifier echoed back with the response.
    pub request_id: String,
    pub questions: Vec<UserInputQuestion>,
    /// Seconds until the dialog auto-cancels. `None` disables the countdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
}

/// The selected labels for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInputAnswer {
    pub answers: Vec<String>,
}

/// Response payload: question id -> selected labels. Cancellation (explicit
/// or by timeout) submits an empty map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserInputResponse {
    pub answers: HashMap<String, UserInputAnswer>,
}

impl UserInputResponse {
    pub fn cancelled() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn response_serializes_to_answer_map() {
        let mut answers = HashMap::new();
        answers.insert(
            "q1".to_string(),
            UserInputAnswer {
                answers: vec!["Use tabs".to_string()],
            },
        );
        let response = UserInputResponse { answers };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "answers": { "q1": { "answers": ["Use tabs"] } } })
        );
    }

    #[test]
    fn cancelled_response_is_empty_map() {
        let json = serde_json::to_value(UserInputResponse::cancelled()).expect("serialize");
        assert_eq!(json, serde_json::json!({ "answers": {} }));
    }
}
