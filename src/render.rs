//! HTML digest rendering
//!
//! Turns a list of [`ArticleInput`]s into the single HTML document that is fed
//! to the converter. Rendering is pure: the same input always yields the same
//! bytes.

use crate::types::ArticleInput;

const PREAMBLE: &str = r#"<html>
<head>
<meta charset="UTF-8">
<style>
h1 {
    font-size: 24px;
    font-weight: bold;
    margin-bottom: 10px;
}
p {
    font-size: 16px;
    line-height: 1.5;
}
</style>
</head>
<body>
"#;

const CLOSING: &str = "</body></html>";

/// Render the digest document
///
/// With a `date_label` the document opens with a `Daily Digest - <label>`
/// heading. Each article then contributes one `<h1>` and one `<p>`, in input
/// order. Titles and bodies are sanitized so that article markup cannot inject
/// scripts or break out of its block.
///
/// A paragraph is empty when the article has no content, and also when its
/// content consists only of markup that sanitizing removes, such as a
/// `<script>` element.
pub fn render_digest(articles: &[ArticleInput], date_label: Option<&str>) -> String {
    let mut html = String::from(PREAMBLE);

    if let Some(label) = date_label {
        html.push_str(&format!("<h1>Daily Digest - {}</h1>\n", sanitize(label)));
    }

    for (index, article) in articles.iter().enumerate() {
        let title = article.display_title();
        tracing::debug!(article = index + 1, title = %title, "rendering article");

        let body = article.body();
        if body.is_empty() {
            tracing::warn!(article = index + 1, "article has no content");
        }

        html.push_str(&format!("<h1>{}</h1>\n", sanitize(title)));
        html.push_str(&format!("<p>{}</p>\n", sanitize(body)));
    }

    html.push_str(CLOSING);
    html
}

fn sanitize(fragment: &str) -> String {
    if fragment.is_empty() {
        return String::new();
    }
    ammonia::clean(fragment)
}
