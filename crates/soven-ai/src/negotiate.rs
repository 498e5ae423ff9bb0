use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Deserialize;
use soven_core::types::NegotiationContext;
use tracing::warn;

use crate::client::{GenerativeModel, ModelRequest};

// ── Local analyzers ───────────────────────────────────────────────────────

const FEE_KEYWORDS: &[&str] = &[
    "fee", "cost", "price", "payment", "charge", "bill", "invoice", "amount", "money", "dollar",
    "thousand", "k usd", "rate", "hourly",
];

/// Amount patterns tried in order; the first match wins. The multiplier
/// scales shorthand forms like "5k usd" to whole dollars.
const FEE_PATTERNS: &[(&str, i64)] = &[
    (r"(\d+)k usd", 1000),
    (r"(\d+) thousand", 1000),
    (r"\$(\d+,?\d*)", 1),
    (r"(\d+) dollars", 1),
];

static OVERALL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static METRIC_RES: OnceLock<Vec<Regex>> = OnceLock::new();
static FEE_RES: OnceLock<Vec<(Regex, i64)>> = OnceLock::new();
static REPLY_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn overall_re() -> Option<&'static Regex> {
    OVERALL_RE
        .get_or_init(|| Regex::new(r"overall progress: ([\d.]+)%").ok())
        .as_ref()
}

fn metric_res() -> &'static [Regex] {
    METRIC_RES.get_or_init(|| {
        [
            r"query analysis: (\d+)/(\d+)",
            r"documents processed: (\d+)/(\d+)",
            r"deadlines managed: (\d+)/(\d+)",
            r"ai tasks completed: (\d+)/(\d+)",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

fn fee_res() -> &'static [(Regex, i64)] {
    FEE_RES.get_or_init(|| {
        FEE_PATTERNS
            .iter()
            .filter_map(|(p, mult)| Regex::new(p).ok().map(|re| (re, *mult)))
            .collect()
    })
}

fn reply_re() -> Option<&'static Regex> {
    REPLY_RE
        .get_or_init(|| Regex::new(r"(?s)\{.*\}").ok())
        .as_ref()
}

/// Share of preparation already done, read out of the progress summary
/// text. An explicit "Overall Progress: N%" line wins; otherwise the four
/// per-kind X/Y pairs are summed. No recognizable metric means 0.
pub fn work_percentage(progress_summary: &str) -> f64 {
    let text = progress_summary.to_lowercase();

    if let Some(pct) = overall_re()
        .and_then(|re| re.captures(&text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
    {
        return pct;
    }

    let mut completed: u64 = 0;
    let mut total: u64 = 0;
    for re in metric_res() {
        let Some(caps) = re.captures(&text) else { continue };
        let done = caps.get(1).and_then(|m| m.as_str().parse::<u64>().ok());
        let all = caps.get(2).and_then(|m| m.as_str().parse::<u64>().ok());
        if let (Some(done), Some(all)) = (done, all) {
            completed += done;
            total += all;
        }
    }

    if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// True when the conversation mentions money at all, per a fixed keyword set.
pub fn is_fee_discussion(transcript: &str) -> bool {
    let text = transcript.to_lowercase();
    FEE_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

/// First dollar amount found in the conversation, scaled to whole dollars.
/// A pattern whose digits fail to parse falls through to the next one.
pub fn mentioned_fee(transcript: &str) -> Option<i64> {
    let text = transcript.to_lowercase();
    for (re, multiplier) in fee_res() {
        let Some(caps) = re.captures(&text) else { continue };
        let Some(group) = caps.get(1) else { continue };
        if let Ok(amount) = group.as_str().replace(',', "").parse::<i64>() {
            return Some(amount * multiplier);
        }
    }
    None
}

// ── Prompt assembly ───────────────────────────────────────────────────────

const FEE_SCENARIO: &str = r#"
You are in a FEE NEGOTIATION scenario. Your primary goals:
1. Advocate for fair pricing based on work already completed
2. Highlight the user's preparation and documentation efforts
3. Use data-driven arguments for fee reduction
4. Maintain professional but assertive tone
5. Suggest specific percentage-based reductions
"#;

/// Cost-analysis block for the prompt; empty unless a fee was mentioned and
/// some work is already done.
fn savings_block(fee: Option<i64>, pct: f64) -> String {
    let Some(fee) = fee.filter(|f| *f > 0) else {
        return String::new();
    };
    if pct <= 0.0 {
        return String::new();
    }
    let saved = fee as f64 * (pct / 100.0);
    let suggested = fee as f64 - saved;
    format!(
        r#"
COST ANALYSIS:
- Standard fee mentioned: ${fee}
- Your preparation completed: {pct:.1}%
- Potential savings: ${saved}
- Suggested fair fee: ${suggested}
"#,
        fee = group_thousands(fee),
        saved = group_thousands(saved.round() as i64),
        suggested = group_thousands(suggested.round() as i64),
    )
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn build_prompt(
    query: &str,
    progress_summary: &str,
    transcript: &str,
    pct: f64,
    fee_discussion: bool,
    fee: Option<i64>,
) -> String {
    let scenario = if fee_discussion { FEE_SCENARIO } else { "" };
    let savings = savings_block(fee, pct);
    format!(
        r#"
You are an AI legal assistant helping a user negotiate with their lawyer. Your role is to:
1. Support the user's interests while maintaining professionalism
2. Help craft persuasive, data-driven arguments
3. Suggest fair fee negotiations based on work completed
4. Provide strategic communication advice

{scenario}

CONTEXT:
- User's legal matter: {query}
- User's preparation progress: {progress_summary}
- Current conversation: {transcript}
- Work completed by user: {pct:.1}%

{savings}

INSTRUCTIONS:
- Generate a helpful response for the user to send to their lawyer
- If discussing fees, emphasize the user's preparation work and suggest fair pricing
- Use specific percentages and amounts when relevant
- Be professional but advocate strongly for the user
- Focus on value delivered vs. standard rates
- If not fee-related, provide general legal communication assistance

Return ONLY a valid JSON object with the following format, and nothing else:
{{
  "assistant_reply": "string",
  "negotiation_strategy": "string",
  "potential_savings": "string"
}}
"#
    )
}

// ── Reply parsing ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ReplyFields {
    #[serde(default)]
    assistant_reply: String,
    #[serde(default)]
    negotiation_strategy: String,
    #[serde(default)]
    potential_savings: String,
}

/// Greedy first-`{`-to-last-`}` scan, not the shared extraction cascade.
fn parse_reply(reply: &str) -> Option<ReplyFields> {
    let re = reply_re()?;
    let found = re.find(reply)?;
    serde_json::from_str(found.as_str()).ok()
}

// ── Assistant ─────────────────────────────────────────────────────────────

/// Drafts a message the user can send their lawyer, biased toward fee
/// negotiation when the conversation warrants it.
pub struct NegotiationAssistant {
    model: Arc<dyn GenerativeModel>,
}

impl NegotiationAssistant {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// The analyzers run unconditionally on local text; only the reply
    /// wording comes from the model, and any failure on that path lands on
    /// the deterministic fallback letter.
    pub async fn assist(
        &self,
        query: &str,
        progress_summary: &str,
        chat_transcript: &str,
    ) -> NegotiationContext {
        let pct = work_percentage(progress_summary);
        let fee_discussion = is_fee_discussion(chat_transcript);
        let fee = mentioned_fee(chat_transcript);

        let prompt =
            build_prompt(query, progress_summary, chat_transcript, pct, fee_discussion, fee);

        let parsed = match self.model.generate(ModelRequest::text(prompt)).await {
            Ok(reply) => parse_reply(&reply),
            Err(e) => {
                warn!(error = %e, "negotiation call failed");
                None
            }
        };

        match parsed {
            Some(fields) => NegotiationContext {
                work_percentage: pct,
                is_fee_discussion: fee_discussion,
                mentioned_fee: fee,
                reply: fields.assistant_reply,
                strategy: fields.negotiation_strategy,
                savings_note: fields.potential_savings,
            },
            None => fallback_context(pct, fee_discussion, fee),
        }
    }
}

fn fallback_context(pct: f64, fee_discussion: bool, fee: Option<i64>) -> NegotiationContext {
    let reply = if fee_discussion && pct > 20.0 {
        format!(
            r#"Dear [Lawyer's Name],

I wanted to discuss the fee structure for my case. I've been quite proactive in preparing the groundwork:

• Completed {pct:.1}% of preliminary work through our legal platform
• Analyzed and organized all relevant documents
• Prepared comprehensive case timeline and deadlines
• Conducted initial legal research

Given this substantial preparation, I believe a fee adjustment reflecting the work already completed would be fair. Would you be open to discussing a rate that accounts for these efforts?

Best regards"#
        )
    } else {
        "I'd like to discuss this matter further. Could you provide more details about your approach and timeline?".to_string()
    };

    let strategy = if fee_discussion {
        "Professional fee negotiation based on completed work"
    } else {
        "General inquiry"
    };

    NegotiationContext {
        work_percentage: pct,
        is_fee_discussion: fee_discussion,
        mentioned_fee: fee,
        reply,
        strategy: strategy.to_string(),
        savings_note: format!("{pct:.1}% work completed"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
