pub mod config;
pub mod extract;
pub mod progress;
pub mod types;

pub use extract::extract_json;
pub use types::{
    Classification, Deadline, DocumentRequirement, NegotiationContext, Outcome,
    RequirementChecklist, ScanVerdict, SolveStatus, Validity, VisualReference,
};
