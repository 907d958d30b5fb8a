//! Structural validation of letters before export.
//!
//! These checks are heuristic linting, not a grammar. Hard errors block finalisation: a letter
//! that is too short, or one that still contains template residue such as `[insert name]`,
//! `TBD` or an unresolved `{{Case.title}}`. Soft warnings point out conventional parts that
//! seem to be missing (date, salutation, closing) and never block anything.
//!
//! Editorial markers that belong in a final letter, such as `[REDACTED]` or `[SIC]`, are not
//! treated as residue.

use crate::constants::MIN_LETTER_LENGTH;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Warning emitted when no date could be found in the letter.
pub const MISSING_DATE_WARNING: &str = "No date found in the letter";
/// Warning emitted when no salutation could be found in the letter.
pub const MISSING_SALUTATION_WARNING: &str =
    "No salutation found (for example \"Dear ...\" or \"To Whom It May Concern\")";
/// Warning emitted when no closing could be found in the letter.
pub const MISSING_CLOSING_WARNING: &str =
    "No closing found (for example \"Sincerely\" or \"Regards\")";

/// Outcome of a structural check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructureReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl StructureReport {
    fn from_findings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

struct ResiduePattern {
    label: &'static str,
    regex: Regex,
}

fn residue(label: &'static str, pattern: &str) -> ResiduePattern {
    ResiduePattern {
        label,
        regex: Regex::new(pattern).expect("Invalid regex pattern for letter residue"),
    }
}

static RESIDUE_PATTERNS: LazyLock<Vec<ResiduePattern>> = LazyLock::new(|| {
    vec![
        residue("insert placeholder", r"(?i)\[insert[^\]]*\]"),
        residue("TBD marker", r"\bTBD\b"),
        residue("TODO marker", r"\bTODO\b"),
        residue("XXX marker", r"\bXXX\b"),
        residue("blank line", r"_{4,}"),
        residue("empty brackets", r"\[\s*\]"),
        residue(
            "bracket placeholder",
            r"(?i)\[(?:your |client |recipient |company |case |subject )?(?:name|date|address|phone|email|title|company|amount|signature|number)\]",
        ),
        residue("bracket placeholder", r"\[[A-Z][A-Z0-9_]*(?: [A-Z0-9_]+)*\]"),
        residue("unresolved placeholder", r"\{\{[^{}]*\}\}"),
    ]
});

/// Bracketed markers that are deliberate in finished correspondence.
const EDITORIAL_MARKERS: &[&str] = &["[REDACTED]", "[SIC]", "[EMPHASIS ADDED]", "[ENCLOSURE]"];

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        \b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?
           |sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+\d{1,2},?\s+\d{4}\b
        | \b\d{1,2}\s+(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?
           |aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\s+\d{4}\b
        | \b\d{1,2}/\d{1,2}/\d{2,4}\b
        | \b\d{4}-\d{2}-\d{2}\b",
    )
    .expect("Invalid regex pattern for date")
});

static SALUTATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:dear|to whom it may concern|greetings|hello)\b")
        .expect("Invalid regex pattern for salutation")
});

static CLOSING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:sincerely|regards|respectfully|yours truly|yours faithfully|cordially|best wishes)\b",
    )
    .expect("Invalid regex pattern for closing")
});

/// Checks a plain-text letter.
///
/// Each residue pattern reports every distinct matching text once, labelled with the kind of
/// residue found.
pub fn validate_letter_structure(text: &str) -> StructureReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let length = text.trim().chars().count();
    if length < MIN_LETTER_LENGTH {
        errors.push(format!(
            "Letter is too short ({} characters; at least {} required)",
            length, MIN_LETTER_LENGTH
        ));
    }

    for pattern in RESIDUE_PATTERNS.iter() {
        let mut seen: Vec<&str> = Vec::new();
        for m in pattern.regex.find_iter(text) {
            if seen.contains(&m.as_str()) || EDITORIAL_MARKERS.contains(&m.as_str()) {
                continue;
            }
            seen.push(m.as_str());
            errors.push(format!(
                "Unfilled placeholder \"{}\" ({})",
                m.as_str(),
                pattern.label
            ));
        }
    }

    if !DATE_PATTERN.is_match(text) {
        warnings.push(MISSING_DATE_WARNING.to_owned());
    }
    if !SALUTATION_PATTERN.is_match(text) {
        warnings.push(MISSING_SALUTATION_WARNING.to_owned());
    }
    if !CLOSING_PATTERN.is_match(text) {
        warnings.push(MISSING_CLOSING_WARNING.to_owned());
    }

    StructureReport::from_findings(errors, warnings)
}

/// Checks rendered HTML by validating its visible text.
pub fn validate_rendered_letter(html: &str) -> StructureReport {
    validate_letter_structure(&html_to_text(html))
}

static HIDDEN_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<head\b.*?</head>|<style\b.*?</style>|<script\b.*?</script>")
        .expect("Invalid regex pattern for hidden-block")
});

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|div|header|footer|section|article|li|h[1-6])\s*>")
        .expect("Invalid regex pattern for line-break")
});

static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex pattern for tag"));

/// Extracts visible text from HTML: drops head, style and script blocks, turns block ends and
/// `<br>` into newlines, strips remaining tags and decodes the basic entities.
pub fn html_to_text(html: &str) -> String {
    let visible = HIDDEN_BLOCKS.replace_all(html, "");
    let broken = LINE_BREAKS.replace_all(&visible, "\n");
    let stripped = TAGS.replace_all(&broken, "");

    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&");

    let mut out = String::with_capacity(decoded.len());
    let mut blank_run = 0;
    for line in decoded.lines().map(str::trim) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "January 6, 2026\n\n\
        Dear Ms. Bouvier,\n\n\
        We have completed the surveillance you requested and enclose our findings for \
        your review. Please contact us with any questions.\n\n\
        Sincerely,\nSam Reyes";

    #[test]
    fn test_well_formed_letter_is_clean() {
        let report = validate_letter_structure(WELL_FORMED);
        assert!(report.is_valid, "{:?}", report.errors);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn test_too_short() {
        let report = validate_letter_structure("Hi there!!");
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("too short")));
    }

    #[test]
    fn test_insert_placeholder_is_an_error() {
        let text = WELL_FORMED.replace("Ms. Bouvier", "[insert name]");
        let report = validate_letter_structure(&text);
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("[insert")));
    }

    #[test]
    fn test_each_residue_kind_is_reported() {
        let cases = [
            ("Amount due: TBD", "TBD marker"),
            ("TODO confirm the dates", "TODO marker"),
            ("Account XXX closed", "XXX marker"),
            ("Signed: ________", "blank line"),
            ("Tick here [ ]", "empty brackets"),
            ("Regarding [client name]", "bracket placeholder"),
            ("Regarding [CLIENT NAME]", "bracket placeholder"),
            ("Re: {{Case.title}}", "unresolved placeholder"),
        ];
        for (snippet, label) in cases {
            let text = format!("{}\n\n{}", WELL_FORMED, snippet);
            let report = validate_letter_structure(&text);
            assert!(!report.is_valid, "{snippet} should be invalid");
            assert!(
                report.errors.iter().any(|e| e.contains(label)),
                "{snippet}: {:?}",
                report.errors
            );
        }
    }

    #[test]
    fn test_repeated_residue_reported_once() {
        let text = format!("{}\nTBD and TBD again", WELL_FORMED);
        let report = validate_letter_structure(&text);
        assert_eq!(
            report.errors.iter().filter(|e| e.contains("TBD")).count(),
            1
        );
    }

    #[test]
    fn test_words_containing_markers_are_not_flagged() {
        let text = format!("{}\nThe TODOS list and XXXL sizes are fine.", WELL_FORMED);
        assert!(validate_letter_structure(&text).is_valid);
    }

    #[test]
    fn test_editorial_markers_are_not_residue() {
        let text = format!(
            "{}\nThe account holder [REDACTED] wrote \"recieved\" [SIC].",
            WELL_FORMED
        );
        let report = validate_letter_structure(&text);
        assert!(report.is_valid, "{:?}", report.errors);

        let report = validate_letter_structure(&format!("{}\n[CLIENT NAME]", WELL_FORMED));
        assert!(!report.is_valid);
    }

    #[test]
    fn test_missing_parts_are_warnings_only() {
        let text = "We have completed the surveillance you requested and enclose our findings.";
        let report = validate_letter_structure(text);
        assert!(report.is_valid);
        assert_eq!(
            report.warnings,
            vec![
                MISSING_DATE_WARNING.to_owned(),
                MISSING_SALUTATION_WARNING.to_owned(),
                MISSING_CLOSING_WARNING.to_owned()
            ]
        );
    }

    #[test]
    fn test_numeric_dates_are_recognised() {
        for date in ["01/06/2026", "2026-01-06", "6 January 2026", "Jan. 6, 2026"] {
            let text = WELL_FORMED.replace("January 6, 2026", date);
            let report = validate_letter_structure(&text);
            assert!(
                !report.warnings.contains(&MISSING_DATE_WARNING.to_owned()),
                "{date}"
            );
        }
    }

    #[test]
    fn test_html_to_text() {
        let html = "<html><head><title>Letter</title><style>p { color: red; }</style></head>\
            <body><p>Dear &amp; welcome,<br>second line</p><div>&lt;b&gt; literal</div></body></html>";
        assert_eq!(
            html_to_text(html),
            "Dear & welcome,\nsecond line\n<b> literal"
        );
    }

    #[test]
    fn test_validate_rendered_letter_ignores_markup() {
        let html = format!(
            "<article class=\"letter\"><p>{}</p></article>",
            WELL_FORMED.replace('\n', "<br>")
        );
        let report = validate_rendered_letter(&html);
        assert!(report.is_valid);
        assert!(report.warnings.is_empty());
    }
}
