use serde::{Deserialize, Serialize};

// ── Chat transcripts ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Lawyer,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "User",
            Sender::Lawyer => "Lawyer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub message: String,
}

/// Render the last `limit` messages as the `User:`/`Lawyer:` transcript the
/// negotiation assistant consumes.
pub fn format_transcript(messages: &[ChatMessage], limit: usize) -> String {
    let start = messages.len().saturating_sub(limit);
    messages[start..]
        .iter()
        .map(|m| format!("{}: {}", m.sender.as_str(), m.message))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Progress snapshots ────────────────────────────────────────────────────

/// Completed/total counters for the four tracked kinds of preparation work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub queries_analyzed: u32,
    #[serde(default)]
    pub total_queries: u32,
    #[serde(default)]
    pub documents_scanned: u32,
    #[serde(default)]
    pub total_documents: u32,
    #[serde(default)]
    pub deadlines_completed: u32,
    #[serde(default)]
    pub total_deadlines: u32,
    #[serde(default)]
    pub ai_tasks_completed: u32,
    #[serde(default)]
    pub total_ai_tasks: u32,
}

impl ProgressSnapshot {
    /// Percentage of all tracked items completed; 0 when nothing is tracked.
    pub fn overall_completion(&self) -> f64 {
        let completed = self.queries_analyzed
            + self.documents_scanned
            + self.deadlines_completed
            + self.ai_tasks_completed;
        let total =
            self.total_queries + self.total_documents + self.total_deadlines + self.total_ai_tasks;
        if total == 0 {
            return 0.0;
        }
        f64::from(completed) / f64::from(total) * 100.0
    }

    /// The canonical progress block. The negotiation assistant parses this
    /// exact layout back out of the text, so the line labels are load-bearing.
    pub fn summary(&self) -> String {
        format!(
            "Query Analysis: {}/{} completed\n\
             Documents Processed: {}/{} completed\n\
             Deadlines Managed: {}/{} completed\n\
             AI Tasks Completed: {}/{} completed\n\
             Overall Progress: {:.1}% complete",
            self.queries_analyzed,
            self.total_queries,
            self.documents_scanned,
            self.total_documents,
            self.deadlines_completed,
            self.total_deadlines,
            self.ai_tasks_completed,
            self.total_ai_tasks,
            self.overall_completion(),
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(sender: Sender, text: &str) -> ChatMessage {
        ChatMessage {
            sender,
            message: text.to_string(),
        }
    }

    #[test]
    fn transcript_labels_both_sides() {
        let messages = vec![
            msg(Sender::User, "Can we discuss your fee?"),
            msg(Sender::Lawyer, "My rate is 5k USD."),
        ];
        assert_eq!(
            format_transcript(&messages, 10),
            "User: Can we discuss your fee?\nLawyer: My rate is 5k USD."
        );
    }

    #[test]
    fn transcript_keeps_only_the_tail() {
        let messages: Vec<ChatMessage> = (0..12)
            .map(|i| msg(Sender::User, &format!("m{i}")))
            .collect();
        let transcript = format_transcript(&messages, 10);
        assert!(!transcript.contains("m0"));
        assert!(!transcript.contains("m1\n"));
        assert!(transcript.starts_with("User: m2"));
        assert!(transcript.ends_with("User: m11"));
    }

    #[test]
    fn empty_transcript_is_empty_string() {
        assert_eq!(format_transcript(&[], 10), "");
    }

    #[test]
    fn completion_is_zero_with_no_items() {
        assert_eq!(ProgressSnapshot::default().overall_completion(), 0.0);
    }

    #[test]
    fn completion_sums_across_kinds() {
        let snapshot = ProgressSnapshot {
            queries_analyzed: 2,
            total_queries: 4,
            documents_scanned: 1,
            total_documents: 2,
            deadlines_completed: 0,
            total_deadlines: 1,
            ai_tasks_completed: 1,
            total_ai_tasks: 1,
        };
        assert!((snapshot.overall_completion() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_contains_every_line() {
        let snapshot = ProgressSnapshot {
            queries_analyzed: 2,
            total_queries: 4,
            ..ProgressSnapshot::default()
        };
        let text = snapshot.summary();
        assert!(text.contains("Query Analysis: 2/4 completed"));
        assert!(text.contains("Documents Processed: 0/0 completed"));
        assert!(text.contains("Deadlines Managed: 0/0 completed"));
        assert!(text.contains("AI Tasks Completed: 0/0 completed"));
        assert!(text.contains("Overall Progress: 50.0% complete"));
    }
}
