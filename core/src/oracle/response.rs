use crate::error::{CoreError, CoreResult};
use crate::oracle::interface::{
    OracleErrorCategory, OracleFailure, Verdict, VerdictKind,
};
use regex::Regex;

/// Drop every markdown fence line (```` ``` ````, ```` ```json ````) and trim.
pub fn strip_code_fences(text: &str) -> String {
    text.trim()
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Find the first verdict token in `text` that belongs to `allowed`.
///
/// Matching is case-insensitive on whole words. "No Conflict" is tried before
/// "Conflict" at the same position, and markdown emphasis may sit between
/// the two words (`**No** conflict`).
pub fn extract_verdict(text: &str, allowed: &[VerdictKind]) -> CoreResult<VerdictKind> {
    let pattern = Regex::new(r"(?i)\b(no[\s-]*conflicts?|conflicts?|equivalent)\b")
        .map_err(|_e| CoreError::InvalidInput("Regex compilation failed".to_string()))?;

    // `_` is a word character, so `__No__` would hide the word boundary.
    let plain = text.replace(['*', '_'], " ");
    for m in pattern.find_iter(&plain) {
        let token = m.as_str().to_ascii_lowercase();
        let kind = if token.starts_with("no") {
            VerdictKind::NoConflict
        } else if token.starts_with("conflict") {
            VerdictKind::Conflict
        } else {
            VerdictKind::Equivalent
        };
        if allowed.contains(&kind) {
            return Ok(kind);
        }
    }
    Ok(VerdictKind::Unclassified)
}

/// Turn raw oracle text into a verdict. Empty text is a failure; text without
/// a recognised token is `Unclassified`.
pub fn parse_verdict(raw: &str, allowed: &[VerdictKind]) -> CoreResult<Verdict> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(OracleFailure::new(
            OracleErrorCategory::EMPTY_RESPONSE,
            "oracle returned no text",
        )
        .into());
    }
    Ok(Verdict {
        kind: extract_verdict(&cleaned, allowed)?,
        reasoning: raw.to_string(),
    })
}
