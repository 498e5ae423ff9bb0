use std::collections::HashMap;

use anyhow::Result;

/// Runtime configuration, resolved once at startup. Process environment
/// variables win over `.env` entries; everything except the API key has a
/// default.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub model: String,
    pub base_url: String,
    pub http_timeout_s: u64,
    pub bind: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let dotenv = parse_dotenv();
        Ok(Config {
            gemini_api_key: get_str("GEMINI_API_KEY", &dotenv, ""),
            model: get_str("SOVEN_MODEL", &dotenv, "gemini-2.0-flash"),
            base_url: get_str(
                "GEMINI_BASE_URL",
                &dotenv,
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            http_timeout_s: get_u64("SOVEN_HTTP_TIMEOUT_S", &dotenv, 30),
            bind: get_str("SOVEN_BIND", &dotenv, "0.0.0.0"),
            port: get_u16("SOVEN_PORT", &dotenv, 8080),
        })
    }
}

/// Read `./.env` if present. Missing or unreadable files mean no overrides.
fn parse_dotenv() -> HashMap<String, String> {
    match std::fs::read_to_string(".env") {
        Ok(contents) => parse_env_lines(&contents),
        Err(_) => HashMap::new(),
    }
}

/// `KEY=VALUE` per line; blank lines and `#` comments are skipped.
fn parse_env_lines(contents: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            vars.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    vars
}

fn get(key: &str, dotenv: &HashMap<String, String>) -> Option<String> {
    std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
}

fn get_str(key: &str, dotenv: &HashMap<String, String>, default: &str) -> String {
    get(key, dotenv).unwrap_or_else(|| default.to_string())
}

fn get_u64(key: &str, dotenv: &HashMap<String, String>, default: u64) -> u64 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_u16(key: &str, dotenv: &HashMap<String, String>, default: u16) -> u16 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_lines_skip_comments_and_blanks() {
        let parsed = parse_env_lines(
            "# secrets\n\nGEMINI_API_KEY=abc123\nSOVEN_PORT = 9090\nnot a pair\n",
        );
        assert_eq!(parsed.get("GEMINI_API_KEY").map(String::as_str), Some("abc123"));
        assert_eq!(parsed.get("SOVEN_PORT").map(String::as_str), Some("9090"));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn values_keep_embedded_equals() {
        let parsed = parse_env_lines("GEMINI_BASE_URL=https://host/path?a=b\n");
        assert_eq!(
            parsed.get("GEMINI_BASE_URL").map(String::as_str),
            Some("https://host/path?a=b")
        );
    }

    #[test]
    fn numeric_getters_fall_back_on_garbage() {
        let mut dotenv = HashMap::new();
        dotenv.insert("SOVEN_HTTP_TIMEOUT_S".to_string(), "soon".to_string());
        assert_eq!(get_u64("SOVEN_HTTP_TIMEOUT_S", &dotenv, 30), 30);

        dotenv.insert("SOVEN_HTTP_TIMEOUT_S".to_string(), "90".to_string());
        assert_eq!(get_u64("SOVEN_HTTP_TIMEOUT_S", &dotenv, 30), 90);
    }
}
