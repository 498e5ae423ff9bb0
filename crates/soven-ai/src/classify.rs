use std::sync::Arc;

use soven_core::extract::extract_json;
use soven_core::types::Classification;
use tracing::warn;

use crate::client::{GenerativeModel, ModelRequest};

const CLASSIFY_PROMPT: &str = r#"
You are an expert virtual legal advocate assistant.
Your ONLY task is to analyze if a legal query is solvable or not.

Rules:
1. If the query is clear and legally solvable → return: {"status": "solvable", "message": "This legal query is solvable, please generate deadlines and documents required to keep track on your progress."}
2. If it is solvable but very hard/complex → return: {"status": "hard", "message": "This query is not easily solvable, but you can still try to solve it, please generate deadlines and documents required to keep track on your progress..Explore successful users with similar issues in our Find Users tab."}
3. If it is irrelevant or not a legal issue → return: {"status": "irrelevant", "message": "This query is not directly relevant. Explore successful users with similar issues in our Find Users tab."}

⚠️ Important:
- Do NOT provide legal explanations, documents, or deadlines.
- Only return a JSON object with 'status' and 'message'.
"#;

const PARSE_FAILURE: &str = "Could not analyze query properly.";

/// Decides whether a query is worth pursuing before any other work runs.
pub struct QueryClassifier {
    model: Arc<dyn GenerativeModel>,
}

impl QueryClassifier {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Total, and deliberately without a fallback: there is no deterministic
    /// substitute for classification, so failures surface as a result with
    /// `SolveStatus::Error` and the reason in the message.
    pub async fn classify(&self, query: &str) -> Classification {
        let prompt = format!("{CLASSIFY_PROMPT}\n\nUser Query: {query}");

        let reply = match self.model.generate(ModelRequest::text(prompt)).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "query classification call failed");
                return Classification::error(format!("API call failed: {e}"));
            }
        };

        extract_json(&reply)
            .and_then(|value| serde_json::from_value::<Classification>(value).ok())
            .unwrap_or_else(|| Classification::error(PARSE_FAILURE))
    }
}
