use serde::{Deserialize, Serialize};

// ── Operation outcomes ────────────────────────────────────────────────────

/// Result of a model-backed operation. Callers must handle all three arms:
/// a validated answer, a locally synthesized substitute, or a failure with a
/// user-facing reason. None of the operations panic or return `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The model replied and the reply validated.
    Answered(T),
    /// The model path produced nothing usable; `value` was built locally.
    Fallback { value: T, reason: String },
    /// No usable value exists for this operation.
    Failed { reason: String },
}

impl<T> Outcome<T> {
    /// The carried value, if any, discarding how it was obtained.
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Answered(value) | Outcome::Fallback { value, .. } => Some(value),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

// ── Document requirements ─────────────────────────────────────────────────

/// The set of documents a legal query needs, in the order the model listed
/// them. An empty set is a legitimate answer, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementChecklist {
    #[serde(default)]
    pub documents: Vec<DocumentRequirement>,
}

/// One required document. Fields the model omits deserialize to empty
/// defaults; consumers read them defensively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRequirement {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub required_elements: Vec<String>,
    #[serde(default)]
    pub visual_reference: VisualReference,
}

/// Guidance for recognizing an authentic copy of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualReference {
    #[serde(default)]
    pub document_type: String,
    #[serde(default)]
    pub layout_description: String,
    #[serde(default)]
    pub key_visual_features: Vec<String>,
    /// Section names. The generation prompt asks the model to append a
    /// reference link as one of the entries, so links may appear here.
    #[serde(default)]
    pub typical_sections: Vec<String>,
}

// ── Scan verdicts ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    Valid,
    Invalid,
    Error,
    /// Also the catch-all for any label the model invents.
    #[default]
    #[serde(other)]
    Questionable,
}

/// Structured verdict for one scanned document image. Scans always produce
/// a verdict; failed scans carry `Validity::Error` and a diagnostic in
/// `detailed_analysis` instead of an `Err`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanVerdict {
    #[serde(default)]
    pub document_type_match: bool,
    #[serde(default)]
    pub authenticity_score: f64,
    #[serde(default)]
    pub required_elements_check: RequiredElementsCheck,
    #[serde(default)]
    pub visual_compliance: VisualCompliance,
    #[serde(default)]
    pub quality_assessment: QualityAssessment,
    #[serde(default)]
    pub overall_validity: Validity,
    #[serde(default)]
    pub detailed_analysis: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequiredElementsCheck {
    #[serde(default)]
    pub all_present: bool,
    #[serde(default)]
    pub missing_elements: Vec<String>,
    #[serde(default)]
    pub present_elements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualCompliance {
    #[serde(default)]
    pub matches_standard: bool,
    #[serde(default)]
    pub compliance_issues: Vec<String>,
}

/// Free-text quality gradings; nothing downstream branches on the wording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    #[serde(default)]
    pub readability: String,
    #[serde(default)]
    pub image_quality: String,
    #[serde(default)]
    pub potential_tampering: bool,
}

impl ScanVerdict {
    /// Verdict for a scan that never produced an analysis. The elements
    /// check stays at its empty default, so an `Error` verdict is never
    /// paired with a populated missing-elements list.
    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            overall_validity: Validity::Error,
            detailed_analysis: detail.into(),
            ..Self::default()
        }
    }

    /// One-line human summary for callers that store or display scans.
    pub fn summary(&self) -> String {
        match self.overall_validity {
            Validity::Valid => "Document is valid. All required elements present.".to_string(),
            Validity::Invalid => format!(
                "Document is invalid. Missing: {}",
                self.required_elements_check.missing_elements.join(", ")
            ),
            Validity::Questionable | Validity::Error => {
                if self.detailed_analysis.is_empty() {
                    "Analysis completed with issues.".to_string()
                } else {
                    self.detailed_analysis.clone()
                }
            }
        }
    }
}

// ── Deadlines ─────────────────────────────────────────────────────────────

/// One tracked deadline. `due_date` is a `YYYY-MM-DD` string; entries whose
/// task or date is blank are dropped during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub completed: bool,
}

// ── Query classification ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Solvable,
    Hard,
    Irrelevant,
    /// Classification has no deterministic fallback, so failures surface
    /// as a result with this status. Unknown labels collapse here too.
    #[serde(other)]
    Error,
}

/// Whether a query is worth pursuing, plus the guidance message shown to
/// the user. `status` is required when parsing a model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub status: SolveStatus,
    #[serde(default)]
    pub message: String,
}

impl Classification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SolveStatus::Error,
            message: message.into(),
        }
    }
}

// ── Negotiation ───────────────────────────────────────────────────────────

/// Everything the negotiation assistant derived for one exchange. The first
/// three fields always come from the local analyzers; `reply`, `strategy`
/// and `savings_note` come from the model when it cooperates and from the
/// deterministic fallback otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NegotiationContext {
    pub work_percentage: f64,
    pub is_fee_discussion: bool,
    pub mentioned_fee: Option<i64>,
    pub reply: String,
    pub strategy: String,
    pub savings_note: String,
}

// ── Tests ─────────────────────────────────────────────────────────────────
