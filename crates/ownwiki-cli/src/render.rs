//! The render adapter: turns annotated article text into ratatui lines.
//!
//! This is the one consumer of the engine's styled-char output. Terminals
//! have no font sizes, so headings map to accent colors instead of larger
//! type; everything else maps one-to-one onto text modifiers.

use ownwiki_engine::{StyleFlags, StyledLine, annotate, sanitize};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Rendered before the first character of a bulleted-list line.
const BULLET_PREFIX: &str = "    \u{2022} ";

/// One activatable link in the rendered article, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRegion {
    /// Article name the link navigates to, verbatim from the markup.
    pub href: String,
    /// Index of the rendered line the link sits on.
    pub line: usize,
}

/// The display form of one article.
#[derive(Debug, Clone, Default)]
pub struct RenderedArticle {
    pub lines: Vec<Line<'static>>,
    pub links: Vec<LinkRegion>,
}

/// Sanitizes and annotates `content`, then maps every styled line to a
/// ratatui line. `selected_link` highlights that link region for cycling.
pub fn render_article(content: &str, selected_link: Option<usize>) -> RenderedArticle {
    let mut rendered = RenderedArticle::default();
    for (idx, raw) in sanitize(content).iter().enumerate() {
        let styled = annotate(raw);
        let line = render_line(&styled, idx, &mut rendered.links, selected_link);
        rendered.lines.push(line);
    }
    rendered
}

/// Coalesces runs of identically-styled characters into spans. A run of
/// link-flagged characters sharing one href forms one link region.
fn render_line(
    styled: &StyledLine,
    line_idx: usize,
    links: &mut Vec<LinkRegion>,
    selected_link: Option<usize>,
) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    if styled.get(0).is_some_and(|c| c.flags.bulleted_list) {
        spans.push(Span::raw(BULLET_PREFIX));
    }

    let mut run = String::new();
    let mut run_key: Option<(StyleFlags, Option<String>)> = None;
    for c in styled {
        let key = (c.flags, c.href.clone());
        if run_key.as_ref() != Some(&key) {
            flush_run(&mut spans, &mut run, run_key.take(), line_idx, links, selected_link);
            run_key = Some(key);
        }
        run.push(c.ch);
    }
    flush_run(&mut spans, &mut run, run_key, line_idx, links, selected_link);

    Line::from(spans)
}

fn flush_run(
    spans: &mut Vec<Span<'static>>,
    run: &mut String,
    key: Option<(StyleFlags, Option<String>)>,
    line_idx: usize,
    links: &mut Vec<LinkRegion>,
    selected_link: Option<usize>,
) {
    let Some((flags, href)) = key else {
        return;
    };
    if run.is_empty() {
        return;
    }
    let selected = match href {
        Some(href) => {
            let index = links.len();
            links.push(LinkRegion {
                href,
                line: line_idx,
            });
            selected_link == Some(index)
        }
        None => false,
    };
    spans.push(Span::styled(std::mem::take(run), style_for(&flags, selected)));
}

/// Flag set → terminal style. Combinations accumulate, mirroring how flags
/// accumulate on a character.
fn style_for(flags: &StyleFlags, selected: bool) -> Style {
    let mut style = Style::default();
    if flags.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if flags.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if flags.underline {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if flags.inline_code {
        style = style.fg(Color::Yellow);
    }
    if flags.heading1 {
        style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
    }
    if flags.heading2 {
        style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
    }
    if flags.link {
        style = style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED);
        if selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
    }
    style
}
