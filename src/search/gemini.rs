//! Gemini generateContent 客户端

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ResourceSuggester;
use crate::config::SearchConfig;
use crate::errors::{PortalError, Result};
use crate::models::resources::responses::SuggestedResource;

// 模型输出中的第一个 JSON 数组（贪婪匹配到最后一个 `]`）
static JSON_ARRAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[\s\S]*\]").expect("Invalid JSON array regex"));

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    code: i32,
    message: String,
}

impl GenerateResponse {
    fn first_text(&self) -> &str {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .map(|p| p.text.as_str())
            .unwrap_or_default()
    }
}

pub struct GeminiSuggester {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiSuggester {
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.gemini_base_url.trim_end_matches('/'),
                config.gemini_model
            ),
            api_key: config.gemini_api_key.clone(),
        })
    }
}

fn build_prompt(query: &str, category: &str, limit: usize) -> String {
    format!(
        "As an educational resource curator for the Culture Bridge Program, suggest {limit} \
         high-quality, accessible resources related to \"{query}\" in the \"{category}\" category. \
         Focus on:\n\
         - SDGs (Sustainable Development Goals)\n\
         - Cross-cultural communication\n\
         - Japanese culture\n\
         - International exchange\n\
         - Volunteer opportunities\n\
         - Educational materials\n\n\
         For each resource, provide:\n\
         1. Title\n\
         2. URL (prefer real, accessible URLs)\n\
         3. Description (50-100 words)\n\
         4. Type (article, video, document, website)\n\
         5. Tags (3-5 relevant keywords)\n\n\
         Format as JSON array with these fields: title, url, description, type, tags[]"
    )
}

/// 从模型输出中提取推荐列表，无法解析的条目直接丢弃
pub fn extract_suggestions(text: &str) -> Vec<SuggestedResource> {
    let Some(found) = JSON_ARRAY_RE.find(text) else {
        debug!("No JSON array found in model output");
        return Vec::new();
    };

    match serde_json::from_str::<Vec<serde_json::Value>>(found.as_str()) {
        Ok(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<SuggestedResource>(item).ok())
            .collect(),
        Err(e) => {
            warn!("Failed to parse suggestions JSON: {}", e);
            Vec::new()
        }
    }
}

#[async_trait::async_trait]
impl ResourceSuggester for GeminiSuggester {
    async fn suggest(
        &self,
        query: &str,
        category: &str,
        limit: usize,
    ) -> Result<Vec<SuggestedResource>> {
        let prompt = build_prompt(query, category, limit);
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: &prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PortalError::upstream(format!(
                "Gemini API returned {status}: {text}"
            )));
        }

        let data: GenerateResponse = response.json().await?;
        if let Some(err) = data.error {
            return Err(PortalError::upstream(format!(
                "Gemini API error {}: {}",
                err.code, err.message
            )));
        }

        let text = data.first_text();
        debug!("Gemini response length: {} characters", text.len());
        Ok(extract_suggestions(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_suggestions_from_fenced_output() {
        let text = r#"Here are some resources:
```json
[
  {"title": "SDG Academy", "url": "https://sdgacademy.org", "description": "Free courses", "type": "website", "tags": ["sdgs", "education"]},
  {"title": "NHK World Japanese", "type": "video", "tags": []}
]
```
Enjoy!"#;

        let suggestions = extract_suggestions(text);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].title, "SDG Academy");
        assert_eq!(suggestions[0].resource_type.as_deref(), Some("website"));
        assert_eq!(suggestions[1].url, None);
    }

    #[test]
    fn test_extract_suggestions_skips_invalid_items() {
        let text = r#"[{"title": "Ok"}, {"url": "https://no-title.example"}, 3]"#;
        let suggestions = extract_suggestions(text);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].title, "Ok");
    }

    #[test]
    fn test_extract_suggestions_without_array() {
        assert!(extract_suggestions("Sorry, I cannot help with that.").is_empty());
        assert!(extract_suggestions("[not json]").is_empty());
    }

    #[test]
    fn test_first_text_of_response() {
        let data: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "[]" }] } }]
        }))
        .unwrap();
        assert_eq!(data.first_text(), "[]");

        let empty: GenerateResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty.first_text(), "");
    }

    #[test]
    fn test_prompt_mentions_query_and_limit() {
        let prompt = build_prompt("tea ceremony", "culture", 4);
        assert!(prompt.contains("suggest 4"));
        assert!(prompt.contains("\"tea ceremony\""));
        assert!(prompt.contains("\"culture\""));
    }
}
