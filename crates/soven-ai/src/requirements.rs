use std::sync::Arc;

use soven_core::extract::extract_json;
use soven_core::types::{DocumentRequirement, Outcome, RequirementChecklist};
use tracing::{info, warn};

use crate::client::{GenerativeModel, ModelRequest};

const CHECKLIST_PROMPT: &str = r#"
You are an expert virtual legal advocate assistant.
Your task is to generate comprehensive document information for solving a legal query.

Rules:
1. Output must be a valid JSON.
2. Structure:
   {
     "documents": [
       {
         "name": "Document Name",
         "required_elements": [
           "Element 1",
           "Element 2",
           ...
         ],
         "visual_reference": {
           "document_type": "ID Card/Certificate/Form",
           "layout_description": "Brief description of how the document should look",
           "key_visual_features": [
             "Feature 1",
             "Feature 2"
           ],
           "typical_sections": [
             "Section 1",
             "Section 2",
             "Reference_Link",
           ]
         }
       }
     ]
   }
3. Focus on Indian legal documents and requirements.
4. Be specific about what elements must be present in each document.
5. Provide clear visual references to help identify authentic documents.
6.Provide a visual reference link via image link or any direct navigation link available on the internet as a part of typical_sections itself
"#;

const PARSE_FAILURE: &str = "Error: Could not generate documents properly.";

/// Reason reported when no checklist entry matches a requested name.
pub const NOT_FOUND: &str = "Document requirements not found";

/// Maps a legal query to the checklist of documents needed to pursue it.
pub struct RequirementResolver {
    model: Arc<dyn GenerativeModel>,
}

impl RequirementResolver {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// One model round-trip. Failures come back as `Outcome::Failed` with a
    /// reason, never as an empty checklist posing as an answer.
    pub async fn resolve(&self, query: &str) -> Outcome<RequirementChecklist> {
        let prompt = format!("{CHECKLIST_PROMPT}\n\nUser Query: {query}");

        let reply = match self.model.generate(ModelRequest::text(prompt)).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "requirement generation call failed");
                return Outcome::Failed {
                    reason: format!("API call failed: {e}"),
                };
            }
        };

        let Some(value) = extract_json(&reply) else {
            warn!(reply_len = reply.len(), "no JSON found in requirement reply");
            return Outcome::Failed {
                reason: PARSE_FAILURE.to_string(),
            };
        };

        match serde_json::from_value::<RequirementChecklist>(value) {
            Ok(checklist) => {
                info!(documents = checklist.documents.len(), "requirement checklist generated");
                Outcome::Answered(checklist)
            }
            Err(e) => {
                warn!(error = %e, "requirement reply did not match the checklist shape");
                Outcome::Failed {
                    reason: PARSE_FAILURE.to_string(),
                }
            }
        }
    }

    /// Requirements for one named document: resolves a synthetic query and
    /// picks the first checklist entry whose name contains `doc_name`,
    /// case-insensitively.
    pub async fn lookup(&self, doc_name: &str) -> Outcome<DocumentRequirement> {
        let query = format!("What are the requirements for {doc_name}?");
        let checklist = match self.resolve(&query).await {
            Outcome::Answered(checklist) | Outcome::Fallback { value: checklist, .. } => checklist,
            Outcome::Failed { reason } => return Outcome::Failed { reason },
        };

        let needle = doc_name.to_lowercase();
        match checklist
            .documents
            .into_iter()
            .find(|doc| doc.name.to_lowercase().contains(&needle))
        {
            Some(doc) => Outcome::Answered(doc),
            None => Outcome::Failed {
                reason: NOT_FOUND.to_string(),
            },
        }
    }
}
