//! Section extraction from free-form chat completions.
//!
//! The optimization prompt asks the model for numbered sections and the
//! rewritten text lives in the last one. This is a heuristic and brittle by
//! construction: the prompt is user-configurable and models do not always
//! follow the requested layout. A missing section is reported as an empty
//! string, not an error. Changing the matching rule means re-deriving the
//! prompt contract it depends on.

use crate::defaults::{SECTION_ID, SECTION_MARKER};

/// Identifies the heading line that opens the wanted section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMarker {
    /// Prefix the heading line must start with.
    pub prefix: String,
    /// Text the heading line must contain somewhere.
    pub id: String,
}

impl Default for SectionMarker {
    fn default() -> Self {
        Self {
            prefix: SECTION_MARKER.to_string(),
            id: SECTION_ID.to_string(),
        }
    }
}

impl SectionMarker {
    fn matches(&self, line: &str) -> bool {
        line.starts_with(&self.prefix) && line.contains(&self.id)
    }
}

/// Return everything after the first heading matching `marker`.
///
/// Lines are rejoined with `\n`. Returns an empty string when no heading
/// matches.
pub fn extract_section(completion: &str, marker: &SectionMarker) -> String {
    let lines: Vec<&str> = completion.lines().collect();
    lines
        .iter()
        .position(|line| marker.matches(line))
        .map(|i| lines[i + 1..].join("\n"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_matching_heading_returns_empty() {
        let marker = SectionMarker::default();
        assert_eq!(extract_section("### Not a match\nfoo", &marker), "");
    }

    #[test]
    fn returns_lines_after_heading() {
        let marker = SectionMarker::default();
        assert_eq!(
            extract_section("### Section 3\nkeep me\nand me", &marker),
            "keep me\nand me"
        );
    }

    #[test]
    fn earlier_sections_are_dropped() {
        let completion = "### 1 Analysis\nwordy\n### 2 Plan\nshorten\n### 3 Result\nShort text.";
        assert_eq!(
            extract_section(completion, &SectionMarker::default()),
            "Short text."
        );
    }

    #[test]
    fn only_first_match_counts() {
        let completion = "### 3 Result\nfirst\n### 3 again\nsecond";
        assert_eq!(
            extract_section(completion, &SectionMarker::default()),
            "first\n### 3 again\nsecond"
        );
    }

    #[test]
    fn heading_must_start_the_line() {
        let completion = "see ### 3 below\ntext";
        assert_eq!(extract_section(completion, &SectionMarker::default()), "");
    }

    #[test]
    fn heading_as_last_line_yields_empty() {
        assert_eq!(
            extract_section("intro\n### 3", &SectionMarker::default()),
            ""
        );
    }

    #[test]
    fn crlf_line_endings_are_normalized() {
        assert_eq!(
            extract_section("### 3\r\nline a\r\nline b", &SectionMarker::default()),
            "line a\nline b"
        );
    }

    #[test]
    fn custom_marker() {
        let marker = SectionMarker {
            prefix: "##".to_string(),
            id: "Final".to_string(),
        };
        assert_eq!(extract_section("## Final\ndone", &marker), "done");
    }

    #[test]
    fn empty_completion_returns_empty() {
        assert_eq!(extract_section("", &SectionMarker::default()), "");
    }
}
