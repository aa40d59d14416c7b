//! Post-processing: deterministic clean-up of OCR text and model replies.
//!
//! Two independent rule chains live here:
//!
//! * [`clean_ocr_text`] tidies raw Tesseract / pdfium output before it is
//!   embedded in a prompt. Fewer junk characters means fewer tokens and
//!   fewer hallucinated fields.
//! * [`extract_json_object`] pulls the JSON object out of a model reply.
//!   Models asked for "only JSON" still wrap it in ```json fences or add a
//!   sentence before it often enough to matter.
//!
//! Each rule is a pure `&str → String` function and is tested on its own.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply the OCR clean-up rules, in order:
/// 1. Normalise line endings (CRLF → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 3. Replace form feeds (page breaks from Tesseract) with blank lines
/// 4. Trim trailing whitespace per line
/// 5. Collapse 3+ consecutive blank lines down to 1
/// 6. Trim the whole text
pub fn clean_ocr_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = s.replace('\u{000C}', "\n\n");
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

/// Return the JSON object contained in a model reply.
///
/// Rules (applied in order):
/// 1. Strip invisible Unicode
/// 2. Strip outer code fences (```json … ``` or ``` … ```)
/// 3. If prose surrounds the object, keep the span from the first `{` to
///    the last `}`
///
/// Returns the trimmed input unchanged when no braces are present so the
/// caller's JSON parser reports a meaningful error.
pub fn extract_json_object(reply: &str) -> String {
    let s = remove_invisible_chars(reply);
    let s = strip_code_fences(&s);
    let trimmed = s.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    }
}

// ── Shared rules ─────────────────────────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Reply rules ──────────────────────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*[ \t]*\n(.*?)\n?```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}
