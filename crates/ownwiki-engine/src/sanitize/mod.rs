//! Soft line-wrap normalization.
//!
//! The annotator works one logical line at a time, so raw article text is
//! first split into blocks on blank lines and each block has its wrapped
//! continuation lines merged back together. After this pass every output
//! line is independently annotatable: at most one heading or list prefix,
//! no internal hard breaks.

const LIST_PREFIX: &str = "* ";
const H1_PREFIX: &str = "# ";
const H2_PREFIX: &str = "## ";

/// True for lines that must never merge with a neighbour.
fn is_block_prefixed(line: &str) -> bool {
    line.starts_with(LIST_PREFIX) || line.starts_with(H1_PREFIX) || line.starts_with(H2_PREFIX)
}

/// Splits raw article content into logical lines.
///
/// Blocks are separated by a blank line; within each block wrapped list
/// items and paragraphs are re-joined. The blank separator lines survive
/// into the output so the caller can render paragraph breaks. Content that
/// is nothing but blank lines yields an empty sequence. Never fails.
pub fn sanitize(content: &str) -> Vec<String> {
    if content.trim().is_empty() {
        return Vec::new();
    }
    let sanitized: Vec<String> = content.split("\n\n").map(sanitize_block).collect();
    sanitized
        .join("\n\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Merges soft-wrapped lines within one block.
fn sanitize_block(block: &str) -> String {
    let lines: Vec<&str> = block.split('\n').collect();

    // Forward pass: a list item absorbs the single line that follows it when
    // that line opens neither a list item nor a heading. A list item wrapped
    // across more than two physical lines keeps its remainder separate.
    let mut merged: Vec<String> = Vec::with_capacity(lines.len());
    let mut skip_next = false;
    for (i, &line) in lines.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        let mut line = line.to_string();
        if line.starts_with(LIST_PREFIX)
            && i + 1 < lines.len()
            && !is_block_prefixed(lines[i + 1])
        {
            line.push(' ');
            line.push_str(lines[i + 1]);
            skip_next = true;
        }
        merged.push(line);
    }

    // Backward pass: re-join wrapped paragraph text bottom-up, so each merge
    // target absorbs at most the already-processed remainder below it.
    let mut lines = merged;
    for i in (1..lines.len()).rev() {
        let current = lines[i].clone();
        let previous = &lines[i - 1];
        if !current.trim().is_empty()
            && !previous.trim().is_empty()
            && !is_block_prefixed(&current)
            && !is_block_prefixed(previous)
        {
            lines[i - 1].push(' ');
            lines[i - 1].push_str(&current);
            lines.remove(i);
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn wrapped_list_item_merges_into_one_line() {
        assert_eq!(
            sanitize("* item one\ncontinued"),
            vec!["* item one continued"]
        );
    }

    #[test]
    fn wrapped_paragraph_merges_into_one_line() {
        assert_eq!(sanitize("line a\nline b"), vec!["line a line b"]);
    }

    #[test]
    fn long_paragraph_chain_merges_fully() {
        assert_eq!(sanitize("a\nb\nc\nd"), vec!["a b c d"]);
    }

    #[rstest]
    #[case("# Heading\nparagraph")]
    #[case("## Heading\nparagraph")]
    fn heading_is_never_merged(#[case] block: &str) {
        let lines = sanitize(block);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Heading"));
        assert_eq!(lines[1], "paragraph");
    }

    #[test]
    fn paragraph_before_heading_stays_separate() {
        assert_eq!(sanitize("intro\n# Title"), vec!["intro", "# Title"]);
    }

    #[test]
    fn consecutive_list_items_stay_separate() {
        assert_eq!(
            sanitize("* one\n* two\n* three"),
            vec!["* one", "* two", "* three"]
        );
    }

    #[test]
    fn list_item_absorbs_only_one_continuation_line() {
        // The forward pass merges a single following line; a third physical
        // line stays on its own.
        assert_eq!(
            sanitize("* item\nwrap one\nwrap two"),
            vec!["* item wrap one", "wrap two"]
        );
    }

    #[test]
    fn blocks_keep_their_blank_separator() {
        assert_eq!(
            sanitize("para one\n\npara two"),
            vec!["para one", "", "para two"]
        );
    }

    #[test]
    fn blocks_sanitize_independently() {
        assert_eq!(
            sanitize("# Title\n\nwrapped\nparagraph\n\n* a\ncont\n* b"),
            vec![
                "# Title",
                "",
                "wrapped paragraph",
                "",
                "* a cont",
                "* b",
            ]
        );
    }

    #[rstest]
    #[case("")]
    #[case("\n\n")]
    #[case("\n\n\n\n")]
    #[case("   ")]
    fn blank_content_yields_no_lines(#[case] content: &str) {
        assert_eq!(sanitize(content), Vec::<String>::new());
    }

    #[test]
    fn single_line_is_untouched() {
        assert_eq!(sanitize("just one line"), vec!["just one line"]);
    }
}
