//! Letter layout rendering.
//!
//! Rendering is a pure function of the letter body, branding configuration, organisation
//! profile, page settings and letter date. It produces an HTML fragment made of the letterhead,
//! date block, body, signature block and confidentiality footer, together with the single
//! stylesheet shared by the in-app preview and the exporter.
//!
//! The body is treated as plain text: it is HTML-escaped here, once, so substituted placeholder
//! values can never inject markup.

use crate::branding::{
    effective_header_display, usable_logo_url, BrandingConfig, HeaderDisplay,
};
use crate::constants::CHARS_PER_PAGE;
use crate::dates::format_letter_date;
use crate::validation::validate_font_family;
use crate::variables::records::{non_blank, OrganisationProfile};
use crate::{LetterError, LetterResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// Supported physical page sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    Letter,
    A4,
    Legal,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Letter, PageSize::A4, PageSize::Legal];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::Letter => "letter",
            PageSize::A4 => "a4",
            PageSize::Legal => "legal",
        }
    }

    /// Width and height in inches, portrait.
    pub fn dimensions_in(&self) -> (f64, f64) {
        match self {
            PageSize::Letter => (8.5, 11.0),
            PageSize::A4 => (8.27, 11.69),
            PageSize::Legal => (8.5, 14.0),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageSize {
    type Err = LetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "letter" | "us-letter" => Ok(PageSize::Letter),
            "a4" => Ok(PageSize::A4),
            "legal" => Ok(PageSize::Legal),
            other => Err(LetterError::InvalidInput(format!(
                "unknown page size '{}' (expected letter, a4 or legal)",
                other
            ))),
        }
    }
}

/// Page margins in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn uniform(inches: f64) -> Self {
        Self {
            top: inches,
            right: inches,
            bottom: inches,
            left: inches,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// Physical page and typography settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub page_size: PageSize,
    pub margins: Margins,
    pub font_family: String,
    pub font_size_pt: f64,
    pub line_height: f64,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            page_size: PageSize::Letter,
            margins: Margins::default(),
            font_family: "Georgia, 'Times New Roman', serif".into(),
            font_size_pt: 12.0,
            line_height: 1.5,
        }
    }
}

impl PageSettings {
    pub fn with_page_size(page_size: PageSize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Checks that the settings produce a usable page.
    ///
    /// # Errors
    ///
    /// Returns `LetterError::InvalidInput` if the font family is unsafe, the font size or line
    /// height is out of range, or the margins leave no printable area.
    pub fn validate(&self) -> LetterResult<()> {
        validate_font_family(&self.font_family)?;

        if !(6.0..=36.0).contains(&self.font_size_pt) {
            return Err(LetterError::InvalidInput(format!(
                "font size {}pt is outside 6-36pt",
                self.font_size_pt
            )));
        }

        if !(1.0..=3.0).contains(&self.line_height) {
            return Err(LetterError::InvalidInput(format!(
                "line height {} is outside 1.0-3.0",
                self.line_height
            )));
        }

        let m = &self.margins;
        if [m.top, m.right, m.bottom, m.left]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(LetterError::InvalidInput(
                "margins must be non-negative".into(),
            ));
        }

        let (width, height) = self.page_size.dimensions_in();
        if m.left + m.right >= width || m.top + m.bottom >= height {
            return Err(LetterError::InvalidInput(format!(
                "margins leave no printable area on a {} page",
                self.page_size
            )));
        }

        Ok(())
    }
}

/// Page geometry handed to the exporter alongside the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageMetadata {
    pub page_size: PageSize,
    pub width_in: f64,
    pub height_in: f64,
    pub margins: Margins,
}

impl From<&PageSettings> for PageMetadata {
    fn from(settings: &PageSettings) -> Self {
        let (width_in, height_in) = settings.page_size.dimensions_in();
        Self {
            page_size: settings.page_size,
            width_in,
            height_in,
            margins: settings.margins,
        }
    }
}

/// Inputs to [`render_letter`].
#[derive(Debug, Clone, Copy)]
pub struct LetterContext<'a> {
    /// Plain-text body with placeholders already substituted.
    pub body: &'a str,
    pub branding: &'a BrandingConfig,
    pub organisation: Option<&'a OrganisationProfile>,
    pub page: &'a PageSettings,
    pub letter_date: NaiveDate,
}

/// A rendered letter: markup, stylesheet and page metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedLetter {
    pub html: String,
    pub css: String,
    pub page: PageMetadata,
    pub estimated_pages: usize,
    pub header: HeaderDisplay,
}

impl RenderedLetter {
    /// Assembles a standalone HTML document embedding the stylesheet.
    pub fn to_html_document(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Letter</title>\n<style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            self.css, self.html
        )
    }

    /// Hex-encoded SHA-256 of [`to_html_document`](Self::to_html_document).
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.to_html_document().as_bytes()))
    }
}

/// Renders a letter.
///
/// An organisation logo URL that fails validation is treated as absent, so the letterhead falls
/// back to the organisation name.
///
/// # Errors
///
/// Returns `LetterError::InvalidInput` if the page settings are invalid.
pub fn render_letter(ctx: &LetterContext<'_>) -> LetterResult<RenderedLetter> {
    ctx.page.validate()?;

    let logo_url = usable_logo_url(ctx.organisation.and_then(|org| org.logo_url.as_deref()));
    let header = effective_header_display(ctx.branding, logo_url);

    let mut html = String::new();
    html.push_str("<article class=\"letter\">\n");
    push_letterhead(&mut html, ctx, header, logo_url);

    if ctx.branding.show_date {
        let _ = writeln!(
            html,
            "<div class=\"letter-date\">{}</div>",
            escape_html(&format_letter_date(
                ctx.letter_date,
                ctx.branding.date_format
            ))
        );
    }

    html.push_str("<section class=\"letter-body\">\n");
    for paragraph in paragraphs(ctx.body) {
        let lines = paragraph
            .iter()
            .map(|line| escape_html(line))
            .collect::<Vec<_>>()
            .join("<br>\n");
        let _ = writeln!(html, "<p>{}</p>", lines);
    }
    html.push_str("</section>\n");

    if ctx.branding.show_signature {
        push_signature(&mut html, ctx.branding);
    }

    if ctx.branding.show_confidentiality_footer {
        if let Some(text) = non_blank(Some(&ctx.branding.confidentiality_text)) {
            let _ = writeln!(
                html,
                "<footer class=\"confidentiality\">{}</footer>",
                escape_html(text)
            );
        }
    }
    html.push_str("</article>\n");

    let estimated_pages = estimate_page_count(ctx.body);
    tracing::debug!(
        "rendered letter: {} body chars, ~{} page(s), {} page",
        ctx.body.chars().count(),
        estimated_pages,
        ctx.page.page_size
    );

    Ok(RenderedLetter {
        html,
        css: letter_css(ctx.page),
        page: PageMetadata::from(ctx.page),
        estimated_pages,
        header,
    })
}

fn push_letterhead(
    html: &mut String,
    ctx: &LetterContext<'_>,
    header: HeaderDisplay,
    logo_url: Option<&str>,
) {
    let Some(org) = ctx.organisation else {
        return;
    };

    let mut inner = String::new();
    if let (true, Some(url)) = (header.show_logo, logo_url) {
        let _ = writeln!(
            inner,
            "<img class=\"org-logo\" src=\"{}\" alt=\"{} logo\">",
            escape_html(url),
            escape_html(&org.name)
        );
    }
    if header.show_org_name {
        if let Some(name) = non_blank(Some(&org.name)) {
            let _ = writeln!(inner, "<div class=\"org-name\">{}</div>", escape_html(name));
        }
    }

    if ctx.branding.show_address {
        let lines = [non_blank(org.address.as_deref()).map(str::to_owned), org.city_line()]
            .into_iter()
            .flatten()
            .map(|l| escape_html(&l))
            .collect::<Vec<_>>();
        if !lines.is_empty() {
            let _ = writeln!(
                inner,
                "<div class=\"org-address\">{}</div>",
                lines.join("<br>")
            );
        }
    }

    if ctx.branding.show_contact_info {
        let parts = [&org.phone, &org.email, &org.website]
            .into_iter()
            .filter_map(|p| non_blank(p.as_deref()))
            .map(escape_html)
            .collect::<Vec<_>>();
        if !parts.is_empty() {
            let _ = writeln!(
                inner,
                "<div class=\"org-contact\">{}</div>",
                parts.join(" | ")
            );
        }
    }

    if !inner.is_empty() {
        let _ = write!(html, "<header class=\"letterhead\">\n{}</header>\n", inner);
    }
}

fn push_signature(html: &mut String, branding: &BrandingConfig) {
    html.push_str("<div class=\"signature\">\n<div class=\"signature-space\"></div>\n");
    if let Some(name) = non_blank(branding.signature_name.as_deref()) {
        let _ = writeln!(
            html,
            "<div class=\"signature-name\">{}</div>",
            escape_html(name)
        );
    }
    if let Some(title) = non_blank(branding.signature_title.as_deref()) {
        let _ = writeln!(
            html,
            "<div class=\"signature-title\">{}</div>",
            escape_html(title)
        );
    }
    html.push_str("</div>\n");
}

/// Splits plain text into paragraphs on blank lines; each paragraph keeps its lines.
fn paragraphs(body: &str) -> Vec<Vec<&str>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for line in body.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// The stylesheet shared by preview and export.
pub fn letter_css(page: &PageSettings) -> String {
    let m = &page.margins;
    let (width, height) = page.page_size.dimensions_in();
    let size = match page.page_size {
        PageSize::Letter => "letter",
        PageSize::A4 => "A4",
        PageSize::Legal => "legal",
    };

    format!(
        r#"@page {{
  size: {size};
  margin: {top}in {right}in {bottom}in {left}in;
}}
.letter {{
  font-family: {font};
  font-size: {font_size}pt;
  line-height: {line_height};
  color: #1a1a1a;
  box-sizing: border-box;
}}
.letterhead {{
  margin-bottom: 2em;
  padding-bottom: 0.75em;
  border-bottom: 1px solid #cccccc;
}}
.letterhead .org-logo {{
  max-height: 0.9in;
  max-width: 3in;
}}
.letterhead .org-name {{
  font-size: 1.5em;
  font-weight: bold;
}}
.letterhead .org-address,
.letterhead .org-contact {{
  font-size: 0.85em;
  color: #444444;
}}
.letter-date {{
  margin-bottom: 1.5em;
}}
.letter-body p {{
  margin: 0 0 1em 0;
}}
.signature {{
  margin-top: 1em;
}}
.signature .signature-space {{
  height: 0.75in;
}}
.signature .signature-title {{
  color: #444444;
}}
.confidentiality {{
  margin-top: 2em;
  font-size: 0.75em;
  color: #666666;
}}
@media screen {{
  .letter {{
    width: {width}in;
    min-height: {height}in;
    padding: {top}in {right}in {bottom}in {left}in;
    margin: 0 auto;
    background: #ffffff;
    box-shadow: 0 1px 4px rgba(0, 0, 0, 0.2);
  }}
}}
@media print {{
  .letter {{
    width: auto;
    padding: 0;
    box-shadow: none;
  }}
  .letter-body p {{
    orphans: 3;
    widows: 3;
  }}
  .signature {{
    page-break-inside: avoid;
  }}
}}
"#,
        size = size,
        top = m.top,
        right = m.right,
        bottom = m.bottom,
        left = m.left,
        font = page.font_family,
        font_size = page.font_size_pt,
        line_height = page.line_height,
        width = width,
        height = height,
    )
}

/// Approximate printed page count for a body of text.
///
/// Uses a fixed characters-per-page figure regardless of page size or typography, so the result
/// is a rough guide for the editor rather than a layout measurement.
pub fn estimate_page_count(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_PAGE).max(1)
}

/// Escapes text for use in HTML element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
