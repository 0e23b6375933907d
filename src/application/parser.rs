//! Line parsing for dependency manifests.
//!
//! Handles conversion from raw manifest lines to domain models. The grammar
//! is line-oriented: blank lines and `#` lines produce no entry; everything
//! else is `name[extras]specs; marker  # annotation`.

use crate::domain::{AppError, Marker, MarkerOp, Requirement, Result, Version, VersionSpec};

/// Classification of a single manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Empty or whitespace-only line.
    Blank,
    /// Pure comment line (first non-whitespace character is `#`).
    Comment,
    /// A requirement entry.
    Requirement(Requirement),
}

/// Parses one manifest line.
///
/// # Errors
/// Returns a message describing the first syntax problem on the line.
pub fn parse_line(text: &str, line_number: usize) -> std::result::Result<ParsedLine, String> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Ok(ParsedLine::Blank);
    }
    if trimmed.starts_with('#') {
        return Ok(ParsedLine::Comment);
    }

    parse_requirement(trimmed, line_number).map(ParsedLine::Requirement)
}

/// Parses a requirement line (already known not to be blank or a comment).
///
/// # Errors
/// Returns a message describing the first syntax problem on the line.
pub fn parse_requirement(
    text: &str,
    line_number: usize,
) -> std::result::Result<Requirement, String> {
    let (body, annotation) = split_inline_comment(text);
    let body = body.trim();

    if body.is_empty() {
        return Err("Requirement line has no content before the comment".to_string());
    }

    let (body, marker_text) = match body.split_once(';') {
        Some((left, right)) => (left.trim(), Some(right)),
        None => (body, None),
    };

    let marker = marker_text.map(parse_marker).transpose()?;

    let (name, rest) = split_name(body)?;
    let (extras, rest) = split_extras(rest)?;
    let specs = parse_specs(rest)?;

    Ok(Requirement {
        name: name.to_string(),
        extras,
        specs,
        marker,
        annotation: annotation.map(str::to_string),
        line: line_number,
    })
}

/// Parses all lines of a manifest, failing on the first bad line.
///
/// # Errors
/// Returns a parse error carrying the file name and 1-based line number.
pub fn parse_manifest_text(content: &str, file: &str) -> Result<Vec<Requirement>> {
    let mut requirements = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let number = index + 1;
        match parse_line(line, number) {
            Ok(ParsedLine::Requirement(req)) => requirements.push(req),
            Ok(_) => {}
            Err(message) => return Err(AppError::parse(file, number, message)),
        }
    }

    Ok(requirements)
}

/// Splits a trailing inline comment off a line.
///
/// A `#` only starts a comment when preceded by whitespace.
fn split_inline_comment(text: &str) -> (&str, Option<&str>) {
    let mut prev_is_space = false;

    for (i, c) in text.char_indices() {
        if c == '#' && prev_is_space {
            let comment = text[i + 1..].trim();
            let comment = (!comment.is_empty()).then_some(comment);
            return (&text[..i], comment);
        }
        prev_is_space = c.is_whitespace();
    }

    (text, None)
}

/// Splits the package name off the front of a requirement body.
fn split_name(body: &str) -> std::result::Result<(&str, &str), String> {
    let end = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(body.len());

    let name = &body[..end];
    if !is_valid_name(name) {
        return Err(format!("Invalid package name: '{name}'"));
    }

    Ok((name, &body[end..]))
}

/// Whether a token is a valid package name: alphanumeric first and last
/// character, `-`/`_`/`.` permitted in the interior.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if !first.is_ascii_alphanumeric() {
        return false;
    }

    let interior_ok = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    let last_ok = name
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_alphanumeric());

    interior_ok && last_ok
}

/// Splits an optional `[extra, extra]` list off the requirement body.
fn split_extras(rest: &str) -> std::result::Result<(Vec<String>, &str), String> {
    let rest = rest.trim_start();

    let Some(after_open) = rest.strip_prefix('[') else {
        return Ok((Vec::new(), rest));
    };

    let close = after_open
        .find(']')
        .ok_or_else(|| "Unclosed extras bracket".to_string())?;

    let mut extras = Vec::new();
    for extra in after_open[..close].split(',') {
        let extra = extra.trim();
        if !is_valid_name(extra) {
            return Err(format!("Invalid extra name: '{extra}'"));
        }
        extras.push(extra.to_string());
    }

    Ok((extras, &after_open[close + 1..]))
}

/// Parses a comma-separated constraint list (`>=5.15.7,<6`).
fn parse_specs(text: &str) -> std::result::Result<Vec<VersionSpec>, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    text.split(',').map(parse_spec).collect()
}

/// Parses a single constraint: operator followed by a version.
fn parse_spec(text: &str) -> std::result::Result<VersionSpec, String> {
    let text = text.trim();

    let (op, rest) = ["==", "!=", ">=", "<=", "~="]
        .iter()
        .find_map(|op| text.strip_prefix(op).map(|rest| (*op, rest)))
        .or_else(|| {
            [">", "<"]
                .iter()
                .find_map(|op| text.strip_prefix(op).map(|rest| (*op, rest)))
        })
        .ok_or_else(|| format!("Missing version operator in constraint: '{text}'"))?;

    let comparator = op.parse()?;
    let version: Version = rest.trim().parse()?;

    if comparator == crate::domain::Comparator::Compatible && version.release.len() < 2 {
        return Err(format!(
            "Compatible release '~={version}' requires at least two release segments"
        ));
    }

    Ok(VersionSpec {
        comparator,
        version,
    })
}

/// Parses an environment marker (`sys_platform == "win32"`).
fn parse_marker(text: &str) -> std::result::Result<Marker, String> {
    let trimmed = text.trim();

    let rest = trimmed.strip_prefix("sys_platform").ok_or_else(|| {
        let variable: String = trimmed
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        format!("Unsupported marker variable: '{variable}'")
    })?;

    // Reject longer identifiers that merely start with sys_platform
    if rest
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        let variable: String = trimmed
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        return Err(format!("Unsupported marker variable: '{variable}'"));
    }

    let rest = rest.trim_start();
    let (op, rest) = if let Some(r) = rest.strip_prefix("==") {
        (MarkerOp::Eq, r)
    } else if let Some(r) = rest.strip_prefix("!=") {
        (MarkerOp::Ne, r)
    } else {
        return Err(format!("Invalid marker operator in: '{trimmed}'"));
    };

    let value = rest.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .ok_or_else(|| format!("Marker value must be quoted: '{trimmed}'"))?;

    if value.is_empty() {
        return Err("Marker value is empty".to_string());
    }

    Ok(Marker {
        op,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Comparator;

    fn requirement(text: &str) -> Requirement {
        parse_requirement(text, 1).unwrap()
    }

    #[test]
    fn test_parse_simple_lower_bound() {
        let req = requirement("PyQt5>=5.15.7");
        assert_eq!(req.name, "PyQt5");
        assert_eq!(req.specs.len(), 1);
        assert_eq!(req.specs[0].comparator, Comparator::Ge);
        assert_eq!(req.specs[0].version.to_string(), "5.15.7");
        assert!(req.marker.is_none());
    }

    #[test]
    fn test_parse_marked_entry() {
        let req = requirement("pywin32>=227; sys_platform == \"win32\"");
        assert_eq!(req.name, "pywin32");
        assert_eq!(req.specs[0].version.to_string(), "227");

        let marker = req.marker.unwrap();
        assert_eq!(marker.op, MarkerOp::Eq);
        assert_eq!(marker.value, "win32");
        assert!(!marker.applies_to("linux"));
        assert!(marker.applies_to("win32"));
    }

    #[test]
    fn test_parse_comment_and_blank_lines() {
        assert_eq!(parse_line("# Core GUI Framework", 1), Ok(ParsedLine::Comment));
        assert_eq!(parse_line("", 2), Ok(ParsedLine::Blank));
        assert_eq!(parse_line("   \t", 3), Ok(ParsedLine::Blank));
    }

    #[test]
    fn test_parse_inline_annotation() {
        let req = requirement("pygame>=2.1.0  # Optional: for sound effects");
        assert_eq!(req.annotation.as_deref(), Some("Optional: for sound effects"));
        assert!(req.is_optional());
    }

    #[test]
    fn test_parse_multiple_constraints() {
        let req = requirement("requests>=2.28.1,<3");
        assert_eq!(req.specs.len(), 2);
        assert_eq!(req.specs[0].comparator, Comparator::Ge);
        assert_eq!(req.specs[1].comparator, Comparator::Lt);
    }

    #[test]
    fn test_parse_extras() {
        let req = requirement("openpyxl[charts]>=3.0");
        assert_eq!(req.extras, vec!["charts".to_string()]);

        let req = requirement("pytest-qt[gui, audio] >= 4.0");
        assert_eq!(req.extras, vec!["gui".to_string(), "audio".to_string()]);
    }

    #[test]
    fn test_parse_bare_name() {
        let req = requirement("Pillow");
        assert!(req.specs.is_empty());
        assert!(req.is_unconstrained());
    }

    #[test]
    fn test_parse_whitespace_tolerance() {
        let req = requirement("requests >= 2.28.1 ; sys_platform != 'darwin'");
        assert_eq!(req.name, "requests");
        assert_eq!(req.specs[0].version.to_string(), "2.28.1");
        assert_eq!(req.marker.unwrap().op, MarkerOp::Ne);
    }

    #[test]
    fn test_reject_invalid_name() {
        assert!(parse_requirement("-bad>=1.0", 1).is_err());
        assert!(parse_requirement("bad->=1.0", 1).is_err());
    }

    #[test]
    fn test_reject_bad_operator() {
        assert!(parse_requirement("requests=2.28.1", 1).is_err());
        assert!(parse_requirement("requests 2.28.1", 1).is_err());
    }

    #[test]
    fn test_reject_unknown_marker_variable() {
        let err = parse_requirement("pkg>=1.0; python_version >= \"3.8\"", 1).unwrap_err();
        assert!(err.contains("python_version"), "got: {err}");

        let err = parse_requirement("pkg>=1.0; sys_platform_x == \"win32\"", 1).unwrap_err();
        assert!(err.contains("sys_platform_x"), "got: {err}");
    }

    #[test]
    fn test_reject_unquoted_marker_value() {
        assert!(parse_requirement("pkg; sys_platform == win32", 1).is_err());
    }

    #[test]
    fn test_reject_single_segment_compatible() {
        assert!(parse_requirement("pywin32~=227", 1).is_err());
        assert!(parse_requirement("PyQt5~=5.15", 1).is_ok());
    }

    #[test]
    fn test_manifest_text_line_numbers() {
        let content = "# header\nPyQt5>=5.15.7\n\nrequests>=2.28.1\n";
        let reqs = parse_manifest_text(content, "requirements.txt").unwrap();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].line, 2);
        assert_eq!(reqs[1].line, 4);
    }

    #[test]
    fn test_manifest_text_reports_bad_line() {
        let content = "PyQt5>=5.15.7\nnot a valid line!\n";
        let err = parse_manifest_text(content, "requirements.txt").unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {err}");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let content = "PyQt5>=5.15.7\npywin32>=227; sys_platform == \"win32\"\n";
        let first = parse_manifest_text(content, "a").unwrap();
        let second = parse_manifest_text(content, "a").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_canonical_line_reparses_equal() {
        let lines = [
            "PyQt5>=5.15.7",
            "pywin32>=227; sys_platform == \"win32\"",
            "pygame>=2.1.0  # Optional: for sound effects",
            "openpyxl[charts]>=3.0,<4",
        ];

        for line in lines {
            let req = requirement(line);
            let reparsed = parse_requirement(&req.canonical_line(), req.line).unwrap();
            assert_eq!(req, reparsed, "canonical form of '{line}' did not survive");
        }
    }
}
