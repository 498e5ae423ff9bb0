use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use soven_core::extract::extract_json;
use soven_core::types::{Deadline, Outcome};
use tracing::{info, warn};

use crate::client::{GenerationConfig, GenerativeModel, ModelRequest};

const DEADLINE_PROMPT: &str = r#"
You are an expert legal assistant that generates realistic deadlines for legal cases.

Based on the user's legal query, generate 3-5 realistic deadlines with specific dates.

IMPORTANT: You MUST return ONLY a valid JSON object in this exact format:

{
  "deadlines": [
    {"task": "File initial petition", "due_date": "2025-09-15", "completed": false},
    {"task": "Discovery deadline", "due_date": "2025-10-20", "completed": false},
    {"task": "Mediation session", "due_date": "2025-11-10", "completed": false}
  ]
}

Rules:
- Return ONLY the JSON object, no other text
- Use YYYY-MM-DD date format
- Include 3-5 realistic deadlines
- All dates should be future dates (after 2025-09-01)
- Tasks should be relevant to the legal query
- Always set "completed": false
"#;

/// Days from now to the first task of every fallback schedule.
const FALLBACK_LEAD_DAYS: i64 = 14;

/// Produces the deadline schedule for a query. The model path is preferred;
/// whenever it yields nothing usable the generator falls back to a fixed
/// keyword-bucket schedule, so callers always receive deadlines.
pub struct DeadlineGenerator {
    model: Arc<dyn GenerativeModel>,
}

impl DeadlineGenerator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Never `Failed`: every non-answer path lands on `Outcome::Fallback`
    /// carrying the synthesized schedule and the reason the model path
    /// produced nothing.
    pub async fn generate(&self, query: &str) -> Outcome<Vec<Deadline>> {
        let prompt = format!("{DEADLINE_PROMPT}\n\nLegal Query: {query}\n\nGenerate deadlines:");
        let request = ModelRequest::text(prompt).with_config(GenerationConfig {
            temperature: Some(0.3),
            max_output_tokens: Some(1024),
            ..GenerationConfig::default()
        });

        let reason = match self.model.generate(request).await {
            Ok(reply) => match extract_json(&reply) {
                Some(value) => match value.get("deadlines").and_then(|d| d.as_array()) {
                    Some(entries) => {
                        let valid = validate_entries(entries);
                        if valid.is_empty() {
                            "No valid deadlines in AI response".to_string()
                        } else {
                            info!(count = valid.len(), "deadline schedule generated");
                            return Outcome::Answered(valid);
                        }
                    }
                    None => "Invalid JSON structure from AI".to_string(),
                },
                None => "Could not parse JSON from AI response".to_string(),
            },
            Err(e) => format!("API call failed: {e}"),
        };

        warn!(reason = %reason, "falling back to fixed deadline schedule");
        Outcome::Fallback {
            value: fallback_deadlines(query, Utc::now()),
            reason,
        }
    }
}

/// Keep entries carrying a non-blank task and due date; a missing
/// `completed` flag defaults to false.
fn validate_entries(entries: &[serde_json::Value]) -> Vec<Deadline> {
    entries
        .iter()
        .filter_map(|entry| serde_json::from_value::<Deadline>(entry.clone()).ok())
        .filter(|d| !d.task.trim().is_empty() && !d.due_date.trim().is_empty())
        .collect()
}

/// Fixed schedule for a query, anchored `FALLBACK_LEAD_DAYS` after `now`.
/// Pure: the same query and anchor always produce the same dates.
pub fn fallback_deadlines(query: &str, now: DateTime<Utc>) -> Vec<Deadline> {
    let query_lower = query.to_lowercase();
    let base = now + Duration::days(FALLBACK_LEAD_DAYS);

    let schedule: &[(&str, i64)] = if contains_any(
        &query_lower,
        &["dispute", "conflict", "disagreement", "land", "property"],
    ) {
        &[
            ("File initial petition", 0),
            ("Gather supporting documents", 7),
            ("Schedule mediation", 21),
            ("Prepare for court hearing", 45),
        ]
    } else if contains_any(&query_lower, &["contract", "agreement", "breach"]) {
        &[
            ("Review contract terms", 0),
            ("Send legal notice", 10),
            ("File breach of contract suit", 30),
        ]
    } else if contains_any(&query_lower, &["divorce", "custody", "marriage", "family"]) {
        &[
            ("File divorce petition", 0),
            ("Financial disclosure", 21),
            ("Child custody arrangement", 35),
        ]
    } else {
        &[
            ("Initial consultation with lawyer", 0),
            ("Collect relevant documents", 7),
            ("File preliminary application", 21),
            ("Prepare for next legal step", 30),
        ]
    };

    schedule
        .iter()
        .map(|(task, offset)| Deadline {
            task: (*task).to_string(),
            due_date: (base + Duration::days(*offset)).format("%Y-%m-%d").to_string(),
            completed: false,
        })
        .collect()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn property_queries_get_the_dispute_schedule() {
        let deadlines = fallback_deadlines("Property dispute over ancestral land", anchor());
        let tasks: Vec<&str> = deadlines.iter().map(|d| d.task.as_str()).collect();
        assert_eq!(
            tasks,
            [
                "File initial petition",
                "Gather supporting documents",
                "Schedule mediation",
                "Prepare for court hearing",
            ]
        );
        let dates: Vec<&str> = deadlines.iter().map(|d| d.due_date.as_str()).collect();
        assert_eq!(dates, ["2025-09-15", "2025-09-22", "2025-10-06", "2025-10-30"]);
        assert!(deadlines.iter().all(|d| !d.completed));
    }

    #[test]
    fn contract_queries_get_three_steps() {
        let deadlines = fallback_deadlines("breach of agreement by vendor", anchor());
        assert_eq!(deadlines.len(), 3);
        assert_eq!(deadlines[0].task, "Review contract terms");
        assert_eq!(deadlines[2].due_date, "2025-10-15");
    }

    #[test]
    fn family_queries_get_the_divorce_schedule() {
        let deadlines = fallback_deadlines("child custody after separation", anchor());
        assert_eq!(deadlines[0].task, "File divorce petition");
        assert_eq!(deadlines.len(), 3);
    }

    #[test]
    fn unmatched_queries_get_the_generic_schedule() {
        let deadlines = fallback_deadlines("name change affidavit", anchor());
        assert_eq!(deadlines[0].task, "Initial consultation with lawyer");
        assert_eq!(deadlines.len(), 4);
    }

    #[test]
    fn bucket_order_prefers_dispute_keywords() {
        // "property" wins even when contract keywords are present too.
        let deadlines = fallback_deadlines("contract about property", anchor());
        assert_eq!(deadlines[0].task, "File initial petition");
    }

    #[test]
    fn fallback_is_deterministic() {
        let a = fallback_deadlines("land dispute", anchor());
        let b = fallback_deadlines("land dispute", anchor());
        assert_eq!(a, b);
    }

    #[test]
    fn validation_drops_blank_entries() {
        let entries = vec![
            json!({"task": "File petition", "due_date": "2025-10-01"}),
            json!({"task": "", "due_date": "2025-10-02"}),
            json!({"task": "Hearing", "due_date": ""}),
            json!({"task": "Mediation", "due_date": "2025-11-01", "completed": true}),
            json!("not an object"),
        ];
        let valid = validate_entries(&entries);
        assert_eq!(valid.len(), 2);
        assert_eq!(valid[0].task, "File petition");
        assert!(!valid[0].completed);
        assert!(valid[1].completed);
    }
}
