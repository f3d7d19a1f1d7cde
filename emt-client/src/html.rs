/// Cancellation-policy cleanup.
///
/// The vendor embeds `<ul><li>...</li></ul>` markup in policy text;
/// chat surfaces need it as plain bulleted lines.

use once_cell::sync::Lazy;
use regex::Regex;

static LI_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</li>").unwrap());
static LI_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<li[^>]*>").unwrap());
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// Convert embedded HTML to plain text: each `<li>` becomes a leading
/// "• " and each `</li>` a line break, all other tags are stripped,
/// whitespace is normalized and blank lines dropped.
pub fn strip_html_tags(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = LI_CLOSE.replace_all(text, "\n");
    let text = LI_OPEN.replace_all(&text, "• ");
    let text = ANY_TAG.replace_all(&text, "");
    let text = SPACE_RUNS.replace_all(&text, " ");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_list_becomes_bullet_lines() {
        let input = "<ul><li>Free cancellation (Rs.0) before 25-Feb-2026 </li>\
                     <li> 100% Deduction From: 25-Feb-2026 till check-in </li>";
        let expected = "• Free cancellation (Rs.0) before 25-Feb-2026\n\
                        • 100% Deduction From: 25-Feb-2026 till check-in";
        assert_eq!(strip_html_tags(input), expected);
    }

    #[test]
    fn plain_text_is_left_alone() {
        assert_eq!(strip_html_tags("Non-refundable"), "Non-refundable");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(strip_html_tags(""), "");
    }

    #[test]
    fn mixed_case_tags_and_nested_markup() {
        let input = "<UL><LI>First</LI><li class=\"x\">Second</li></UL>";
        assert_eq!(strip_html_tags(input), "• First\n• Second");
    }

    #[test]
    fn blank_lines_are_collapsed() {
        let input = "<li>One</li><br/><br/><li>Two</li>";
        assert_eq!(strip_html_tags(input), "• One\n• Two");
    }
}
