//! Core request, response and result types

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Title used when an article arrives without one
pub const DEFAULT_TITLE: &str = "No title";

/// One article in a `/convert` request
///
/// Fields are defaulted rather than validated: `null`, missing keys and
/// non-scalar values all count as absent, while numbers and booleans are
/// kept as their JSON text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ArticleInput {
    /// Article title (defaults to "No title" when absent)
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,

    /// Article body, usually HTML
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,

    /// Fallback body used when `content` is absent or empty
    #[serde(
        default,
        rename = "cleanedContent",
        deserialize_with = "lenient_string"
    )]
    pub cleaned_content: Option<String>,
}

impl ArticleInput {
    /// Create an article with a title and content
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            cleaned_content: None,
        }
    }

    /// Title to render, falling back to [`DEFAULT_TITLE`]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    /// Body to render: `content` if non-empty, else `cleanedContent`, else empty
    pub fn body(&self) -> &str {
        match self.content.as_deref() {
            Some(content) if !content.is_empty() => content,
            _ => self.cleaned_content.as_deref().unwrap_or(""),
        }
    }
}

/// Request body for POST /convert
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ConvertRequest {
    /// Articles in the order they should appear in the digest
    #[serde(default, deserialize_with = "lenient_articles")]
    pub articles: Vec<ArticleInput>,
}

/// Response body for a successful POST /convert
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConvertResponse {
    /// Human-readable confirmation ("Converted & Sent!")
    pub message: String,
    /// Relative link to the delivered artifact
    pub download_link: String,
}

/// Outcome of a delivery attempt
///
/// `error` is present if and only if `success` is false.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryResult {
    /// Whether the transport accepted the message
    pub success: bool,

    /// Error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryResult {
    /// A successful delivery
    pub fn delivered() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed delivery with the transport's error text
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Envelope contents handed to a delivery strategy alongside the attachment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigestMessage {
    /// Email subject line
    pub subject: String,
    /// Plain-text email body
    pub body: String,
    /// File name the attachment is sent under
    pub attachment_name: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_text))
}

fn lenient_articles<'de, D>(deserializer: D) -> Result<Vec<ArticleInput>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Array(items)) = value else {
        return Ok(Vec::new());
    };

    // Entries that are not objects still produce a block, with every field defaulted
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

fn scalar_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_article_defaults() {
        let article: ArticleInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(article.display_title(), "No title");
        assert_eq!(article.body(), "");
    }

    #[test]
    fn test_cleaned_content_fallback() {
        let article: ArticleInput = serde_json::from_value(json!({
            "title": "T",
            "cleanedContent": "<p>clean</p>"
        }))
        .unwrap();
        assert_eq!(article.body(), "<p>clean</p>");

        let article: ArticleInput = serde_json::from_value(json!({
            "content": "",
            "cleanedContent": "fallback"
        }))
        .unwrap();
        assert_eq!(article.body(), "fallback");

        let article: ArticleInput = serde_json::from_value(json!({
            "content": "primary",
            "cleanedContent": "fallback"
        }))
        .unwrap();
        assert_eq!(article.body(), "primary");
    }

    #[test]
    fn test_lenient_field_values() {
        let article: ArticleInput = serde_json::from_value(json!({
            "title": 42,
            "content": null,
            "cleanedContent": ["not", "text"],
            "url": "https://example.com"
        }))
        .unwrap();
        assert_eq!(article.display_title(), "42");
        assert_eq!(article.content, None);
        assert_eq!(article.cleaned_content, None);
    }

    #[test]
    fn test_convert_request_defaults_to_no_articles() {
        let request: ConvertRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.articles.is_empty());

        let request: ConvertRequest = serde_json::from_value(json!({ "articles": null })).unwrap();
        assert!(request.articles.is_empty());

        let request: ConvertRequest =
            serde_json::from_value(json!({ "articles": "nope" })).unwrap();
        assert!(request.articles.is_empty());
    }

    #[test]
    fn test_non_object_article_entries_are_defaulted() {
        let request: ConvertRequest = serde_json::from_value(json!({
            "articles": [{ "title": "A" }, "stray", 7]
        }))
        .unwrap();
        assert_eq!(request.articles.len(), 3);
        assert_eq!(request.articles[0].display_title(), "A");
        assert_eq!(request.articles[1], ArticleInput::default());
        assert_eq!(request.articles[2], ArticleInput::default());
    }

    #[test]
    fn test_delivery_result_serialization() {
        let ok = serde_json::to_value(DeliveryResult::delivered()).unwrap();
        assert_eq!(ok, json!({ "success": true }));

        let failed = serde_json::to_value(DeliveryResult::failed("nope")).unwrap();
        assert_eq!(failed, json!({ "success": false, "error": "nope" }));
    }
}
