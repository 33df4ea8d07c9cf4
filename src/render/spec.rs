//! The render job specification: everything the engine needs for one
//! conversion.
//!
//! Layout policy is fixed — every request renders with the same paper size,
//! margins, resolution, and chrome. Only the HTML content (and the footer
//! timestamp the job is stamped with) varies. Keeping the policy in one
//! value object makes the renderer seam trivially stubbable and the
//! conversion reproducible from logs.

use time::macros::format_description;
use time::OffsetDateTime;

/// Footer timestamp, e.g. `2026-08-06 14:03:22 UTC`.
const FOOTER_STAMP_FORMAT: &[time::format_description::FormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
);

/// Immutable specification for a single render job.
///
/// Built once per request by [`RenderJobSpec::for_content`], consumed exactly
/// once by the renderer, never mutated in between.
#[derive(Debug, Clone)]
pub struct RenderJobSpec {
    /// Normalized HTML document body.
    pub html: String,

    // ── Page layout (fixed policy) ────────────────────────────────────────
    pub paper_size: &'static str,
    pub orientation: &'static str,
    /// Margin applied to all four sides, in millimetres.
    pub margin_mm: u32,
    /// Output resolution for the page and for embedded images.
    pub dpi: u32,
    pub image_dpi: u32,
    /// JPEG quality for re-encoded images, percent.
    pub image_quality: u32,

    // ── Content behaviour (fixed policy) ──────────────────────────────────
    pub enable_javascript: bool,
    pub load_images: bool,
    pub enable_intelligent_shrinking: bool,
    pub print_media_type: bool,
    pub minimum_font_size: u32,
    /// Fallback charset when the document declares none.
    pub default_encoding: &'static str,

    // ── Document chrome (fixed policy) ────────────────────────────────────
    pub document_title: &'static str,
    /// Right-aligned header text; `[page]`/`[topage]` are engine variables.
    pub header_right: &'static str,
    pub header_font_size: u32,
    /// Centered footer text — the UTC generation timestamp.
    pub footer_center: String,
    pub footer_font_size: u32,
}

impl RenderJobSpec {
    /// Build the spec for one request, wrapping `html` in the fixed layout
    /// policy and stamping the footer with the current UTC time.
    pub fn for_content(html: String) -> Self {
        let stamp = OffsetDateTime::now_utc()
            .format(FOOTER_STAMP_FORMAT)
            .unwrap_or_default();
        Self {
            html,
            paper_size: "A4",
            orientation: "Portrait",
            margin_mm: 10,
            dpi: 300,
            image_dpi: 300,
            image_quality: 100,
            enable_javascript: true,
            load_images: true,
            enable_intelligent_shrinking: true,
            print_media_type: true,
            minimum_font_size: 10,
            default_encoding: "utf-8",
            document_title: "PDF Report",
            header_right: "Page [page] of [topage]",
            header_font_size: 9,
            footer_center: format!("Generated: {stamp}"),
            footer_font_size: 9,
        }
    }

    /// Margin value in the engine's unit syntax, e.g. `10mm`.
    pub fn margin(&self) -> String {
        format!("{}mm", self.margin_mm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_policy_is_fixed() {
        let spec = RenderJobSpec::for_content("<html></html>".into());
        assert_eq!(spec.paper_size, "A4");
        assert_eq!(spec.orientation, "Portrait");
        assert_eq!(spec.margin(), "10mm");
        assert_eq!(spec.dpi, 300);
        assert_eq!(spec.image_dpi, 300);
        assert_eq!(spec.image_quality, 100);
        assert_eq!(spec.minimum_font_size, 10);
        assert!(spec.enable_javascript);
        assert!(spec.load_images);
        assert!(spec.enable_intelligent_shrinking);
        assert!(spec.print_media_type);
    }

    #[test]
    fn chrome_uses_nine_point_fonts_without_rules() {
        let spec = RenderJobSpec::for_content(String::new());
        assert_eq!(spec.header_font_size, 9);
        assert_eq!(spec.footer_font_size, 9);
        assert!(spec.header_right.contains("[page]"));
        assert!(spec.header_right.contains("[topage]"));
    }

    #[test]
    fn footer_carries_a_utc_stamp() {
        let spec = RenderJobSpec::for_content(String::new());
        assert!(spec.footer_center.starts_with("Generated: "));
        assert!(spec.footer_center.ends_with(" UTC"));
    }

    #[test]
    fn only_content_differs_between_requests() {
        let a = RenderJobSpec::for_content("<p>a</p>".into());
        let b = RenderJobSpec::for_content("<p>b</p>".into());
        assert_ne!(a.html, b.html);
        assert_eq!(a.paper_size, b.paper_size);
        assert_eq!(a.document_title, b.document_title);
    }
}
