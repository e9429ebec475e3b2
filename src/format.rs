// src/format.rs
//! Shared display helpers: compact magnitudes, markup stripping, whitespace
//! collapsing and short dates.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

/// `1_234_567 -> "1.2M"`, `1_500 -> "1.5k"`, `999 -> "999"`.
///
/// Halves round away from zero (`1_250 -> "1.3k"`).
pub fn compact_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", round_tenths(n as f64 / 1_000_000.0))
    } else if n >= 1_000 {
        format!("{:.1}k", round_tenths(n as f64 / 1_000.0))
    } else {
        n.to_string()
    }
}

fn round_tenths(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn re_tags() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]+>").unwrap())
}

fn re_ws() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Replace every tag with a single space (keeps adjacent text nodes apart).
pub fn strip_tags(s: &str) -> String {
    re_tags().replace_all(s, " ").into_owned()
}

/// Collapse runs of whitespace into one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    re_ws().replace_all(s, " ").trim().to_string()
}

/// Tags out, entities decoded, whitespace collapsed.
pub fn html_to_text(s: &str) -> String {
    let stripped = strip_tags(s);
    let decoded = html_escape::decode_html_entities(&stripped);
    collapse_whitespace(&decoded)
}

/// Like [`html_to_text`] for inline content: tags are removed without a
/// separator, so `<a>word</a>,` stays `word,`.
pub fn html_inline_text(s: &str) -> String {
    let stripped = re_tags().replace_all(s, "");
    let decoded = html_escape::decode_html_entities(&stripped);
    collapse_whitespace(&decoded)
}

/// RFC 3339 timestamp as "Mar 5, 2024". Unparseable input is returned as-is.
pub fn short_date(ts: &str) -> String {
    match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.with_timezone(&Utc).format("%b %-d, %Y").to_string(),
        Err(_) => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_count_thresholds() {
        assert_eq!(compact_count(0), "0");
        assert_eq!(compact_count(999), "999");
        assert_eq!(compact_count(1_000), "1.0k");
        assert_eq!(compact_count(1_250), "1.3k");
        assert_eq!(compact_count(1_260), "1.3k");
        assert_eq!(compact_count(2_250), "2.3k");
        assert_eq!(compact_count(1_249), "1.2k");
        assert_eq!(compact_count(45_600), "45.6k");
        assert_eq!(compact_count(1_000_000), "1.0M");
        assert_eq!(compact_count(3_400_000), "3.4M");
        assert_eq!(compact_count(1_250_000), "1.3M");
    }

    #[test]
    fn html_to_text_strips_and_decodes() {
        let s = "<p>Fast\n   <b>aligner</b>&nbsp;for &amp; reads</p>";
        assert_eq!(html_to_text(s), "Fast aligner for & reads");
    }

    #[test]
    fn inline_text_keeps_words_joined() {
        let s = r#"<a href="x">samtools</a>, a <em>fast</em>-ish&nbsp;tool"#;
        assert_eq!(html_inline_text(s), "samtools, a fast-ish tool");
        assert_eq!(html_to_text(s), "samtools , a fast -ish tool");
    }

    #[test]
    fn short_date_formats_or_passes_through() {
        assert_eq!(short_date("2024-03-05T10:00:00Z"), "Mar 5, 2024");
        assert_eq!(short_date("yesterday"), "yesterday");
    }
}
