use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::utils::constants::MAX_ERROR_MESSAGE_WORDS;

/// Success body: `urlNotificationMetadata.latestUpdate.url` (or `latestRemove`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    url_notification_metadata: Option<UrlNotificationMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UrlNotificationMetadata {
    latest_update: Option<UrlNotification>,
    latest_remove: Option<UrlNotification>,
}

#[derive(Debug, Deserialize)]
struct UrlNotification {
    url: Option<String>,
}

/// Error body: `{"error": {"message": ...}}`
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

pub fn metadata_url(body: &str) -> Option<String> {
    let parsed: PublishResponse = serde_json::from_str(body).ok()?;
    let metadata = parsed.url_notification_metadata?;
    metadata
        .latest_update
        .and_then(|n| n.url)
        .or_else(|| metadata.latest_remove.and_then(|n| n.url))
        .filter(|url| !url.is_empty())
}

pub fn success_message(metadata_url: Option<&str>) -> String {
    match metadata_url {
        Some(url) => format!("Successfully published. Metadata URL: {}", url),
        None => "Successfully published.".to_owned(),
    }
}

pub fn api_error_message(status: u16, body: &str) -> String {
    let mut message = format!("API Error. Status: {}", status);
    let api_message = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|r| r.error.message)
        .filter(|m| !m.trim().is_empty());

    if let Some(api_message) = api_message {
        message.push_str(" Message: ");
        message.push_str(&trim_words(&api_message, MAX_ERROR_MESSAGE_WORDS));
    } else if !body.trim().is_empty() {
        message.push_str(" Body: ");
        message.push_str(&trim_words(&strip_tags(body), MAX_ERROR_MESSAGE_WORDS));
    }
    message
}

pub fn json_body(body: &str) -> Option<Value> {
    serde_json::from_str(body).ok()
}

/// Remove markup, including the contents of script/style blocks.
pub fn strip_tags(text: &str) -> String {
    let script = Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("static regex");
    let style = Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("static regex");
    let tag = Regex::new(r"(?s)<[^>]*>").expect("static regex");

    let text = script.replace_all(text, "");
    let text = style.replace_all(&text, "");
    tag.replace_all(&text, "").trim().to_owned()
}

/// Keep at most `max_words` whitespace-separated words, appending `...` when cut.
pub fn trim_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > max_words {
        format!("{}...", words[..max_words].join(" "))
    } else {
        words.join(" ")
    }
}
