//! Encoding normalization: guarantee user-supplied HTML declares UTF-8.
//!
//! ## Why is this necessary?
//!
//! The rendering engine sniffs the document's charset declaration before its
//! own default-encoding fallback kicks in. User-supplied HTML routinely
//! arrives with no `<meta charset>`, no `<head>`, or no `<html>` wrapper at
//! all — and a declaration-less non-ASCII document renders as mojibake.
//! Inserting one `<meta charset="utf-8">` tag at the right place fixes that
//! without parsing the document: a case-insensitive substring scan is enough,
//! and anything fancier (a DOM pass) would be wasted work on content we are
//! about to hand to a full browser engine anyway.
//!
//! ## Totality
//!
//! [`normalize`] cannot fail. Rust's `String` is valid UTF-8 by type
//! invariant, so the byte-level round-trip the contract asks for is
//! discharged at the HTTP boundary, where raw bodies are decoded with
//! `String::from_utf8_lossy` (invalid sequences become U+FFFD there). When
//! no insertion point exists the input is returned unchanged and the
//! engine's `web.defaultEncoding` setting carries the conversion.

/// The tag inserted when the document lacks a charset declaration.
pub const META_CHARSET_TAG: &str = r#"<meta charset="utf-8">"#;

/// The three charset-declaration spellings that suppress insertion.
/// Matched case-insensitively, anywhere in the document.
const CHARSET_SPELLINGS: [&str; 3] = [
    r#"charset="utf-8""#,
    "charset='utf-8'",
    "charset=utf-8",
];

/// Ensure `html` declares UTF-8 character encoding.
///
/// Insertion point, first match wins:
/// 1. Document already declares a UTF-8 charset (any spelling, any case,
///    anywhere) — returned unchanged.
/// 2. After the first `<head>`.
/// 3. After the closing `>` of the first `<html …` tag, wrapped in a full
///    `<head>` block.
/// 4. Neither tag present — returned unchanged; the engine's default
///    encoding applies.
///
/// Empty input passes through unchanged.
pub fn normalize(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    // ASCII lowercasing is byte-length preserving, so every index found in
    // the shadow string is a valid char boundary in the original.
    let lower = html.to_ascii_lowercase();

    if CHARSET_SPELLINGS.iter().any(|s| lower.contains(s)) {
        return html.to_string();
    }

    if let Some(head) = lower.find("<head>") {
        let insert_at = head + "<head>".len();
        let mut out = String::with_capacity(html.len() + META_CHARSET_TAG.len());
        out.push_str(&html[..insert_at]);
        out.push_str(META_CHARSET_TAG);
        out.push_str(&html[insert_at..]);
        return out;
    }

    if let Some(html_tag) = lower.find("<html") {
        if let Some(close) = lower[html_tag..].find('>') {
            let insert_at = html_tag + close + 1;
            let block = format!("<head>{META_CHARSET_TAG}</head>");
            let mut out = String::with_capacity(html.len() + block.len());
            out.push_str(&html[..insert_at]);
            out.push_str(&block);
            out.push_str(&html[insert_at..]);
            return out;
        }
    }

    html.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_passes_through() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn existing_declaration_suppresses_insertion() {
        for decl in [
            r#"charset="utf-8""#,
            "charset='utf-8'",
            "charset=utf-8",
            r#"CHARSET="UTF-8""#,
            "Charset='Utf-8'",
        ] {
            let html = format!("<html><head><meta {decl}></head><body>x</body></html>");
            assert_eq!(normalize(&html), html, "declaration: {decl}");
        }
    }

    #[test]
    fn declaration_outside_head_still_suppresses() {
        // Surface-level scan only: a declaration anywhere counts.
        let html = r#"<html><head></head><body>charset=utf-8</body></html>"#;
        assert_eq!(normalize(html), html);
    }

    #[test]
    fn inserts_after_first_head() {
        let html = "<html><head><title>t</title></head><body>x</body></html>";
        let out = normalize(html);
        assert_eq!(
            out,
            r#"<html><head><meta charset="utf-8"><title>t</title></head><body>x</body></html>"#
        );
        assert_eq!(out.matches("charset").count(), 1);
    }

    #[test]
    fn head_match_is_case_insensitive() {
        let html = "<HTML><HEAD></HEAD><BODY>x</BODY></HTML>";
        let out = normalize(html);
        assert_eq!(
            out,
            r#"<HTML><HEAD><meta charset="utf-8"></HEAD><BODY>x</BODY></HTML>"#
        );
    }

    #[test]
    fn no_head_inserts_block_after_html_tag() {
        let html = r#"<html lang="en"><body>x</body></html>"#;
        let out = normalize(html);
        assert_eq!(
            out,
            r#"<html lang="en"><head><meta charset="utf-8"></head><body>x</body></html>"#
        );
    }

    #[test]
    fn bare_html_tag_without_attributes() {
        let out = normalize("<html><body>x</body></html>");
        assert_eq!(
            out,
            r#"<html><head><meta charset="utf-8"></head><body>x</body></html>"#
        );
    }

    #[test]
    fn fragment_without_head_or_html_is_unchanged() {
        let html = "<p>Just a paragraph</p>";
        assert_eq!(normalize(html), html);
    }

    #[test]
    fn unclosed_html_tag_is_left_alone() {
        // "<html" with no closing '>' has no insertion point.
        let html = "<html lang=\"en\"";
        assert_eq!(normalize(html), html);
    }

    #[test]
    fn non_ascii_content_survives_insertion() {
        let html = "<html><head></head><body>héllo wörld — 東京</body></html>";
        let out = normalize(html);
        assert!(out.contains(META_CHARSET_TAG));
        assert!(out.contains("héllo wörld — 東京"));
    }

    #[test]
    fn never_fails_on_garbage() {
        for input in [
            "\u{0}\u{1}\u{2}binary-ish",
            "plain text with no tags at all",
            "<<<>>>",
            "🙂🙃",
        ] {
            let out = normalize(input);
            assert!(!out.is_empty());
        }
        // Long input: no pathological blowup beyond one tag insertion.
        let long = format!("<html><head></head>{}", "a".repeat(1 << 20));
        let out = normalize(&long);
        assert_eq!(out.len(), long.len() + META_CHARSET_TAG.len());
    }

    #[test]
    fn insertion_is_idempotent() {
        let once = normalize("<html><head></head><body>x</body></html>");
        assert_eq!(normalize(&once), once);
    }
}
