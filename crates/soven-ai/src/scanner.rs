use std::sync::Arc;

use soven_core::types::{ScanVerdict, VisualReference};
use tracing::{info, warn};

use crate::client::{GenerationConfig, GenerativeModel, ModelRequest};

/// Verifies an uploaded document image against its requirement checklist.
pub struct DocumentScanner {
    model: Arc<dyn GenerativeModel>,
}

impl DocumentScanner {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Total: every path, including transport and parse failures, yields a
    /// verdict. The reply is parsed directly as JSON with no extraction
    /// cascade; the request pins the response mime type instead.
    pub async fn scan(
        &self,
        query: &str,
        doc_type: &str,
        image_b64: &str,
        required_elements: &[String],
        visual_reference: &VisualReference,
    ) -> ScanVerdict {
        let prompt = build_prompt(query, doc_type, required_elements, visual_reference);

        // Uploads arrive as data URLs; the payload is whatever follows the
        // last comma. The mime type is pinned to JPEG for every upload.
        let payload = image_b64.rsplit(',').next().unwrap_or(image_b64);

        let request = ModelRequest::text(prompt)
            .with_inline_data("image/jpeg", payload)
            .with_config(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                ..GenerationConfig::default()
            });

        info!(doc_type = %doc_type, payload_len = payload.len(), "scanning document");

        let reply = match self.model.generate(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(doc_type = %doc_type, error = %e, "document scan call failed");
                return ScanVerdict::failed(format!("Analysis failed: {e}"));
            }
        };

        match serde_json::from_str::<ScanVerdict>(&reply) {
            Ok(verdict) => verdict,
            Err(_) => ScanVerdict::failed(format!("Could not parse analysis result: {reply}")),
        }
    }
}

fn build_prompt(
    query: &str,
    doc_type: &str,
    required_elements: &[String],
    visual_reference: &VisualReference,
) -> String {
    let elements_json =
        serde_json::to_string_pretty(required_elements).unwrap_or_else(|_| "[]".to_string());
    let reference_json =
        serde_json::to_string_pretty(visual_reference).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"
You are an expert document verification assistant for Indian legal documents.

Document Type: {doc_type}
Legal Query Context: {query}

Required Elements to Check:
{elements_json}

Visual Reference Standards:
{reference_json}

Your tasks:
1. Verify if this is a genuine {doc_type}
2. Check if ALL required elements are present and clearly visible
3. Validate against the visual reference standards
4. Assess document quality and authenticity markers

Provide your analysis in this JSON format:
{{
  "document_type_match": true/false,
  "authenticity_score": 0-100,
  "required_elements_check": {{
    "all_present": true/false,
    "missing_elements": ["list of missing elements"],
    "present_elements": ["list of present elements"]
  }},
  "visual_compliance": {{
    "matches_standard": true/false,
    "compliance_issues": ["list of issues"]
  }},
  "quality_assessment": {{
    "readability": "good/fair/poor",
    "image_quality": "high/medium/low",
    "potential_tampering": true/false
  }},
  "overall_validity": "valid/invalid/questionable",
  "detailed_analysis": "Comprehensive analysis text",
  "recommendations": ["list of recommendations if any issues found"]
}}
"#
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_elements_and_reference() {
        let elements = vec!["Photo".to_string(), "Seal".to_string()];
        let reference = VisualReference {
            document_type: "ID Card".to_string(),
            ..VisualReference::default()
        };
        let prompt = build_prompt("land dispute", "Aadhaar Card", &elements, &reference);
        assert!(prompt.contains("Document Type: Aadhaar Card"));
        assert!(prompt.contains("Legal Query Context: land dispute"));
        assert!(prompt.contains("\"Photo\""));
        assert!(prompt.contains("\"document_type\": \"ID Card\""));
        assert!(prompt.contains("genuine Aadhaar Card"));
    }
}
