use actix_web::http::header::ContentType;
use actix_web::HttpResponse;
use chrono::DateTime;

use crate::config::CONTENT_PREVIEW_CHARS;

pub fn html_response(html: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html)
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

/// `"Jan 02, 2025, 14:03:09"` for an RFC 3339 timestamp; anything else is
/// returned unchanged.
pub fn format_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%b %d, %Y, %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Shortens a dashed id to its middle groups, `"...-4a2b-9c3d-..."`.
pub fn format_id(id: &str) -> String {
    let parts: Vec<&str> = id.split('-').collect();
    if parts.len() < 3 {
        return id.to_string();
    }
    format!("...-{}-...", parts[1..parts.len() - 1].join("-"))
}

pub fn truncate_content(content: &str) -> String {
    if content.chars().count() <= CONTENT_PREVIEW_CHARS {
        return content.to_string();
    }
    let head: String = content.chars().take(CONTENT_PREVIEW_CHARS).collect();
    format!("{}...", head)
}

pub fn escape(text: &str) -> String {
    html_escape::encode_text(text).to_string()
}

pub fn escape_attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_rfc3339() {
        assert_eq!(format_date("2025-01-02T14:03:09Z"), "Jan 02, 2025, 14:03:09");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn shortens_uuid_like_ids() {
        assert_eq!(
            format_id("1f0e7a3c-4a2b-11f0-9c3d-0242ac120002"),
            "...-4a2b-11f0-9c3d-..."
        );
        assert_eq!(format_id("plain"), "plain");
        assert_eq!(format_id("a-b"), "a-b");
    }

    #[test]
    fn truncates_long_content() {
        assert_eq!(truncate_content("short"), "short");
        assert_eq!(
            truncate_content("Hello world! My first post on HelixDB"),
            "Hello world! My first pos..."
        );
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>"), "&lt;b&gt;");
        assert_eq!(escape_attr("a\"b"), "a&quot;b");
    }
}
