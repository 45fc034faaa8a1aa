use std::sync::OnceLock;

use regex::Regex;

use super::buffer::{StyleFlags, StyledLine};

/// The eight formatting constructs, applied in [`Rule::ORDER`].
///
/// The rule set is closed, so the rules are variants of one enum dispatched
/// by `match` rather than an open trait hierarchy. Each variant pairs a match
/// pattern with a tagging-and-stripping procedure; rules hold no state across
/// lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Bold,
    Italic,
    Underline,
    InlineCode,
    Heading1,
    Heading2,
    BulletedList,
    Link,
}

impl Rule {
    /// Fixed pipeline order.
    ///
    /// Heading and list prefixes strip after the character-interior rules,
    /// and links run last: their markup spans several segments (`[`, label,
    /// `](`, target, `)`) that would confuse the delimiter scans.
    pub const ORDER: [Self; 8] = [
        Self::Bold,
        Self::Italic,
        Self::Underline,
        Self::InlineCode,
        Self::Heading1,
        Self::Heading2,
        Self::BulletedList,
        Self::Link,
    ];

    /// Match pattern for this construct.
    ///
    /// Delimited spans require one non-marker character after the closing
    /// delimiter to tell `**` apart from `***`; the pipeline's sentinel
    /// append makes that lookahead hold at the end of the line too. The
    /// interior is one non-space character, or a lazily-matched run whose
    /// first and last characters are non-space — the single-character branch
    /// comes first so `*a* and *b*` scans as two spans, not one.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Bold => r"\*\*(?:\S|\S.*?\S)\*\*[^*]",
            Self::Italic => r"\*(?:\S|\S.*?\S)\*[^*]",
            Self::Underline => r"_(?:\S|\S.*?\S)_[^_]",
            Self::InlineCode => r"`(?:\S|\S.*?\S)`[^`]",
            Self::Heading1 => r"^# ",
            Self::Heading2 => r"^## ",
            Self::BulletedList => r"^\* ",
            Self::Link => r"\[(.*?)\]\((.*?)\)",
        }
    }

    fn regex(self) -> &'static Regex {
        static REGEXES: OnceLock<[Regex; 8]> = OnceLock::new();
        let compiled = REGEXES.get_or_init(|| {
            Self::ORDER.map(|rule| Regex::new(rule.pattern()).expect("invalid rule pattern"))
        });
        &compiled[self as usize]
    }

    /// Applies this rule to the buffer: tag the characters the construct
    /// encloses, then strip its marker characters. The buffer transfers in
    /// and back out by value; rules never alias it.
    pub fn apply(self, line: StyledLine) -> StyledLine {
        match self {
            Self::Bold => apply_delimited(line, self.regex(), 2, |f| f.bold = true),
            Self::Italic => apply_delimited(line, self.regex(), 1, |f| f.italic = true),
            Self::Underline => apply_delimited(line, self.regex(), 1, |f| f.underline = true),
            Self::InlineCode => apply_delimited(line, self.regex(), 1, |f| f.inline_code = true),
            Self::Heading1 => apply_line_prefix(line, self.regex(), 2, |f| f.heading1 = true),
            Self::Heading2 => apply_line_prefix(line, self.regex(), 3, |f| f.heading2 = true),
            Self::BulletedList => apply_line_prefix(line, self.regex(), 2, |f| f.bulleted_list = true),
            Self::Link => apply_link(line, self.regex()),
        }
    }
}

/// Regex reports byte offsets into the rendered text; the buffer is addressed
/// by character.
fn char_index(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count()
}

/// Tags and strips a symmetric delimiter pair of `marker_len` characters.
///
/// All match intervals are collected first, then deletions run in descending
/// close-offset order: stripping the rightmost match first keeps the offsets
/// computed for matches to its left valid.
fn apply_delimited(
    mut line: StyledLine,
    re: &Regex,
    marker_len: usize,
    set: impl Fn(&mut StyleFlags),
) -> StyledLine {
    let text = line.to_text();
    let mut intervals = Vec::new();
    for m in re.find_iter(&text) {
        let start = char_index(&text, m.start());
        let end = start + m.as_str().chars().count();
        // The final matched character is the lookahead sentinel, not part of
        // the span; flag only the characters strictly inside the delimiters.
        for i in start + marker_len..end - 1 - marker_len {
            set(&mut line.char_mut(i).flags);
        }
        intervals.push((start, end));
    }

    intervals.sort_by(|a, b| b.1.cmp(&a.1));
    for (start, end) in intervals {
        let trailing = end - 1 - marker_len;
        for _ in 0..marker_len {
            line.remove_at(trailing);
        }
        for _ in 0..marker_len {
            line.remove_at(start);
        }
    }
    line
}

/// Flags every character of the line and strips the leading `prefix_len`
/// characters. Prefix rules match at most once, anchored to the line start.
fn apply_line_prefix(
    mut line: StyledLine,
    re: &Regex,
    prefix_len: usize,
    set: impl Fn(&mut StyleFlags),
) -> StyledLine {
    let text = line.to_text();
    if !re.is_match(&text) {
        return line;
    }
    for i in 0..line.len() {
        set(&mut line.char_mut(i).flags);
    }
    for _ in 0..prefix_len {
        line.remove_at(0);
    }
    line
}

/// Tags the label of every `[label](target)` with `link` and the verbatim
/// target, then strips the `](target)` tail and the opening `[`.
fn apply_link(mut line: StyledLine, re: &Regex) -> StyledLine {
    let text = line.to_text();
    // (match start, label end, match end), all in buffer indices.
    let mut intervals = Vec::new();
    for caps in re.captures_iter(&text) {
        let (Some(whole), Some(label), Some(target)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            // A bracket structure the pattern cannot take apart stays as
            // plain text.
            continue;
        };
        let match_start = char_index(&text, whole.start());
        let match_end = match_start + whole.as_str().chars().count();
        let label_start = char_index(&text, label.start());
        let label_end = label_start + label.as_str().chars().count();
        let href = target.as_str().to_string();

        for i in label_start..label_end {
            let c = line.char_mut(i);
            c.flags.link = true;
            c.href = Some(href.clone());
        }
        intervals.push((match_start, label_end, match_end));
    }

    intervals.sort_by(|a, b| b.2.cmp(&a.2));
    for (match_start, label_end, match_end) in intervals {
        // `](target)` first, then the opening `[`.
        for _ in 0..match_end - label_end {
            line.remove_at(label_end);
        }
        line.remove_at(match_start);
    }
    line
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    /// Rule tests feed the buffer a trailing sentinel themselves, the way the
    /// pipeline entry point does, and keep it in the output for inspection.
    fn apply_with_sentinel(rule: Rule, text: &str) -> StyledLine {
        rule.apply(StyledLine::from_text(&format!("{text} ")))
    }

    #[rstest]
    #[case(Rule::Bold, "**word** after", "word after ")]
    #[case(Rule::Italic, "*word* after", "word after ")]
    #[case(Rule::Underline, "_word_ after", "word after ")]
    #[case(Rule::InlineCode, "`word` after", "word after ")]
    fn delimited_rules_strip_markers(
        #[case] rule: Rule,
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(apply_with_sentinel(rule, input).to_text(), expected);
    }

    #[test]
    fn bold_flags_only_enclosed_chars() {
        let line = apply_with_sentinel(Rule::Bold, "a **bc** d");
        assert_eq!(line.to_text(), "a bc d ");
        let flagged: String = line.iter().filter(|c| c.flags.bold).map(|c| c.ch).collect();
        assert_eq!(flagged, "bc");
    }

    #[test]
    fn length_accounting_per_rule() {
        // Four delimiter characters stripped, sentinel still present.
        let input = "x **bold** y";
        let line = apply_with_sentinel(Rule::Bold, input);
        assert_eq!(line.len(), input.chars().count() + 1 - 4);
        assert_eq!(line.iter().filter(|c| c.flags.bold).count(), "bold".len());
    }

    #[test]
    fn multiple_matches_delete_rightmost_first() {
        let line = apply_with_sentinel(Rule::Italic, "*a* and *b*");
        assert_eq!(line.to_text(), "a and b ");
        let flagged: String = line
            .iter()
            .filter(|c| c.flags.italic)
            .map(|c| c.ch)
            .collect();
        assert_eq!(flagged, "ab");
    }

    #[test]
    fn unbalanced_markers_pass_through() {
        let line = apply_with_sentinel(Rule::Bold, "**never closed");
        assert_eq!(line.to_text(), "**never closed ");
        assert!(line.iter().all(|c| c.flags.is_plain()));
    }

    #[test]
    fn space_bounded_span_is_not_matched() {
        // The interior may not start or end with whitespace.
        let line = apply_with_sentinel(Rule::Italic, "* spaced *");
        assert_eq!(line.to_text(), "* spaced * ");
        assert!(line.iter().all(|c| c.flags.is_plain()));
    }

    #[test]
    fn single_char_interior_is_matched() {
        let line = apply_with_sentinel(Rule::Bold, "**a** word");
        assert_eq!(line.to_text(), "a word ");
        let flagged: String = line.iter().filter(|c| c.flags.bold).map(|c| c.ch).collect();
        assert_eq!(flagged, "a");
    }

    #[rstest]
    #[case(Rule::Heading1, "# Title", "Title", 2)]
    #[case(Rule::Heading2, "## Title", "Title", 3)]
    #[case(Rule::BulletedList, "* item", "item", 2)]
    fn prefix_rules_strip_prefix_and_flag_line(
        #[case] rule: Rule,
        #[case] input: &str,
        #[case] expected_text: &str,
        #[case] stripped: usize,
    ) {
        let line = apply_with_sentinel(rule, input);
        assert_eq!(line.to_text(), format!("{expected_text} "));
        assert_eq!(line.len(), input.chars().count() + 1 - stripped);
        let flag_set = |f: &StyleFlags| match rule {
            Rule::Heading1 => f.heading1,
            Rule::Heading2 => f.heading2,
            Rule::BulletedList => f.bulleted_list,
            _ => unreachable!(),
        };
        assert!(line.iter().all(|c| flag_set(&c.flags)));
    }

    #[test]
    fn heading1_does_not_match_heading2_line() {
        let line = apply_with_sentinel(Rule::Heading1, "## Title");
        assert_eq!(line.to_text(), "## Title ");
        assert!(line.iter().all(|c| !c.flags.heading1));
    }

    #[test]
    fn prefix_rules_only_match_at_line_start() {
        let line = apply_with_sentinel(Rule::Heading1, "not # a heading");
        assert_eq!(line.to_text(), "not # a heading ");
        assert!(line.iter().all(|c| c.flags.is_plain()));
    }

    #[test]
    fn link_extracts_label_and_target() {
        let line = apply_with_sentinel(Rule::Link, "[Home](index)");
        assert_eq!(line.to_text(), "Home ");
        for (i, expected) in "Home".chars().enumerate() {
            assert_eq!(line[i].ch, expected);
            assert!(line[i].flags.link);
            assert_eq!(line[i].href.as_deref(), Some("index"));
        }
        assert!(line[4].flags.is_plain());
    }

    #[test]
    fn multiple_links_keep_their_own_targets() {
        let line = apply_with_sentinel(Rule::Link, "[a](one) or [b](two)");
        assert_eq!(line.to_text(), "a or b ");
        assert_eq!(line[0].href.as_deref(), Some("one"));
        assert_eq!(line[5].href.as_deref(), Some("two"));
    }

    #[test]
    fn malformed_link_is_left_unmodified() {
        let line = apply_with_sentinel(Rule::Link, "[dangling](unclosed");
        assert_eq!(line.to_text(), "[dangling](unclosed ");
        assert!(line.iter().all(|c| c.flags.is_plain()));
    }

    #[test]
    fn delimited_rule_handles_multibyte_text() {
        let line = apply_with_sentinel(Rule::Bold, "héllo **wörld** née");
        assert_eq!(line.to_text(), "héllo wörld née ");
        let flagged: String = line.iter().filter(|c| c.flags.bold).map(|c| c.ch).collect();
        assert_eq!(flagged, "wörld");
    }
}
