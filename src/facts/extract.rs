// src/facts/extract.rs
//! Extractors for the two text-only sources: rendered SVG badges and the
//! recipe README page. Each returns `None` when nothing usable was found.

use once_cell::sync::OnceCell;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::format::{collapse_whitespace, html_inline_text, html_to_text};

/// Dotted numeric version with an optional `-prerelease` tail.
const VERSION_PATTERN: &str = r"\d+(?:\.\d+)*(?:-[0-9A-Za-z.]+)?";

fn re_version_in_text() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(&format!(r"\b{VERSION_PATTERN}\b")).unwrap())
}

fn re_version_exact() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(&format!(r"^{VERSION_PATTERN}$")).unwrap())
}

fn re_code_spans() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)<code(?:\s[^>]*)?>(.*?)</code\s*>").unwrap())
}

fn re_main() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)<main(?:\s[^>]*)?>(.*?)</main\s*>").unwrap())
}

fn re_body() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)<body(?:\s[^>]*)?>(.*)").unwrap())
}

/// A paragraph ends at `</p>`, at the next block-level tag (which closes an
/// open `<p>` implicitly), at the close of its container, or at end of input.
fn re_paragraph() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        const BLOCK: &str = "p|div|ul|ol|dl|table|pre|blockquote|h[1-6]|hr|section|article|\
                             header|footer|nav|aside|form|fieldset|figure|details|address|main";
        const CONTAINER: &str = "div|section|article|main|body|td|th|li|dd|blockquote|aside";
        Regex::new(&format!(
            r"(?is)<p(?:\s[^>]*)?>(.*?)(?:</p\s*>|<(?:{BLOCK})[\s/>]|</(?:{CONTAINER})\s*>|$)"
        ))
        .unwrap()
    })
}

/// Comments, scripts and stylesheets: markup that is never rendered text.
fn re_hidden() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>").unwrap()
    })
}

fn re_leading_float() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"^(?:\d+(?:\.\d*)?|\.\d+)").unwrap())
}

fn re_leading_int() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"^\d+").unwrap())
}

/// Visible text of an SVG badge, whitespace collapsed.
///
/// Text nodes are read with an XML reader; `<style>`/`<script>` content is
/// skipped. A document the reader rejects falls back to tag stripping.
pub fn badge_text(svg: &str) -> String {
    match svg_text_nodes(svg) {
        Some(t) => collapse_whitespace(&t),
        None => html_to_text(svg),
    }
}

fn svg_text_nodes(svg: &str) -> Option<String> {
    let mut reader = Reader::from_str(svg);
    let mut out = String::new();
    let mut skip_depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if skip_depth > 0 || matches!(e.local_name().as_ref(), b"style" | b"script") {
                    skip_depth += 1;
                }
            }
            Ok(Event::End(_)) => {
                skip_depth = skip_depth.saturating_sub(1);
            }
            Ok(Event::Text(t)) if skip_depth == 0 => {
                let text = t.unescape().ok()?;
                out.push(' ');
                out.push_str(&text);
            }
            Ok(Event::CData(c)) if skip_depth == 0 => {
                out.push(' ');
                out.push_str(&String::from_utf8_lossy(&c));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => return None,
        }
    }
    Some(out)
}

/// Download count from badge text: first token containing a digit wins.
pub fn badge_count(svg: &str) -> Option<u64> {
    let text = badge_text(svg);
    let token = text
        .split(' ')
        .find(|t| t.chars().any(|c| c.is_ascii_digit()))?;
    parse_count_token(token)
}

/// `"1.2k" -> 1200`, `"3.4M" -> 3_400_000`, `"1,234" -> 1234`.
pub fn parse_count_token(token: &str) -> Option<u64> {
    let s = token.replace(',', "").to_lowercase();
    let scale = if s.ends_with('k') {
        Some(1_000.0)
    } else if s.ends_with('m') {
        Some(1_000_000.0)
    } else {
        None
    };
    match scale {
        Some(scale) => {
            let m = re_leading_float().find(&s)?;
            let v: f64 = m.as_str().parse().ok()?;
            Some((v * scale).round() as u64)
        }
        None => re_leading_int().find(&s)?.as_str().parse().ok(),
    }
}

/// First version-looking substring in the badge text.
pub fn badge_version(svg: &str) -> Option<String> {
    let text = badge_text(svg);
    re_version_in_text()
        .find(&text)
        .map(|m| m.as_str().to_string())
}

/// First `<code>` span whose whole text is a version.
pub fn docs_version(html: &str) -> Option<String> {
    let html = re_hidden().replace_all(html, "");
    re_code_spans().captures_iter(&html).find_map(|cap| {
        let text = html_inline_text(&cap[1]);
        re_version_exact().is_match(&text).then_some(text)
    })
}

/// First paragraph of `<main>` (or the body when there is none).
pub fn docs_summary(html: &str) -> Option<String> {
    let html = re_hidden().replace_all(html, "");
    let region = re_main()
        .captures(&html)
        .or_else(|| re_body().captures(&html))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(&html);
    let cap = re_paragraph().captures(region)?;
    let text = html_inline_text(&cap[1]);
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOWNLOADS_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="20">
  <style>text { font-size: 11px }</style>
  <g fill="#fff"><text x="5" y="14">downloads</text><text x="70" y="14">1.2k</text></g>
</svg>"##;

    #[test]
    fn count_tokens_scale_by_suffix() {
        assert_eq!(parse_count_token("1.2k"), Some(1_200));
        assert_eq!(parse_count_token("3.4M"), Some(3_400_000));
        assert_eq!(parse_count_token("1,234"), Some(1_234));
        assert_eq!(parse_count_token("87"), Some(87));
        assert_eq!(parse_count_token("v1x"), None);
    }

    #[test]
    fn badge_count_reads_first_numeric_text_node() {
        assert_eq!(badge_count(DOWNLOADS_SVG), Some(1_200));
        assert_eq!(badge_count("<svg><text>1.2k downloads</text></svg>"), Some(1_200));
        assert_eq!(badge_count("<svg><text>downloads</text><text>n/a</text></svg>"), None);
    }

    #[test]
    fn badge_text_falls_back_on_broken_xml() {
        let broken = "<svg><text>downloads</text><text>3.4M</svg>";
        assert_eq!(badge_count(broken), Some(3_400_000));
    }

    #[test]
    fn badge_version_takes_first_version_like_token() {
        let svg = "<svg><text>bioconda</text><text>2.31.1-r2</text></svg>";
        assert_eq!(badge_version(svg).as_deref(), Some("2.31.1-r2"));
        assert_eq!(badge_version("<svg><text>unknown</text></svg>"), None);
    }

    #[test]
    fn docs_version_requires_whole_span_match() {
        let html = r#"<p>Install with <code>conda install samtools</code></p>
            <table><tr><td><code>1.19.2</code></td></tr></table>"#;
        assert_eq!(docs_version(html).as_deref(), Some("1.19.2"));
    }

    #[test]
    fn docs_summary_prefers_main_region() {
        let html = r#"<html><body><nav><p>Skip</p></nav>
            <main><h1>samtools</h1><p>Tools for   manipulating
            next-generation &amp; sequencing data</p></main></body></html>"#;
        assert_eq!(
            docs_summary(html).as_deref(),
            Some("Tools for manipulating next-generation & sequencing data")
        );
    }

    #[test]
    fn docs_summary_uses_body_without_main() {
        let html = "<html><head><title>x</title></head><body><p>Only paragraph</p></body></html>";
        assert_eq!(docs_summary(html).as_deref(), Some("Only paragraph"));
        assert_eq!(docs_summary("<body><pre>no paragraphs</pre></body>"), None);
    }

    #[test]
    fn docs_summary_keeps_inline_markup_joined() {
        let html = r#"<main><p><a href="x">samtools</a>, a <em>fast</em>-ish tool</p></main>"#;
        assert_eq!(docs_summary(html).as_deref(), Some("samtools, a fast-ish tool"));
    }

    #[test]
    fn unclosed_paragraph_stops_at_next_block() {
        let html = "<main><p>Short description<div>Install notes</div></main>";
        assert_eq!(docs_summary(html).as_deref(), Some("Short description"));
        let html = "<main><p>Aligner<h2>Versions</h2><ul><li>1.0</li></ul></main>";
        assert_eq!(docs_summary(html).as_deref(), Some("Aligner"));
        let html = "<body><div><p>Inside a box</div><table><tr><td>x</td></tr></table></body>";
        assert_eq!(docs_summary(html).as_deref(), Some("Inside a box"));
    }

    #[test]
    fn comments_and_scripts_are_not_content() {
        let html = r#"<main><!-- <p>old summary</p> -->
            <script>document.write("<p>injected</p>")</script>
            <p>Real summary</p></main>"#;
        assert_eq!(docs_summary(html).as_deref(), Some("Real summary"));

        let html = "<!-- <code>0.9</code> --><p><code>1.2.3</code></p>";
        assert_eq!(docs_version(html).as_deref(), Some("1.2.3"));
    }
}
