//! The scrolling page: one collapsible section per catalog entry
//!
//! A section is its heading, and when expanded, the highlighted source, the
//! run trigger and (for the entry that was last run) the terminal output.

use super::source::code_lines;
use super::terminal::output_lines;
use crate::catalog::Catalog;
use crate::ui::app::LastRun;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};
use rustc_hash::FxHashSet;
use std::ops::Range;

const BODY_INDENT: &str = "    ";

pub const FOOTER: &str = "Every snippet runs in a fresh interpreter; its output is captured, never printed.";

pub struct PageRenderData<'a> {
    pub catalog: &'a Catalog,
    pub selected: usize,
    pub expanded: &'a FxHashSet<usize>,
    pub last_run: Option<&'a LastRun>,
}

/// Build every row of the page, plus the rows taken by the selected section
pub fn page_lines(data: &PageRenderData) -> (Vec<Line<'static>>, Range<usize>) {
    let mut lines = Vec::new();
    let mut selected_rows = 0..0;

    for (index, entry) in data.catalog.entries().iter().enumerate() {
        let start = lines.len();
        let is_selected = index == data.selected;
        let is_expanded = data.expanded.contains(&index);

        let heading_style = if is_selected {
            Style::default()
                .fg(DEFAULT_THEME.border_focused)
                .bg(DEFAULT_THEME.current_line_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(DEFAULT_THEME.primary)
        };
        let marker = if is_expanded { "▾" } else { "▸" };
        lines.push(Line::from(vec![
            Span::styled(if is_selected { "› " } else { "  " }, heading_style),
            Span::styled(format!("{} {}", marker, entry.title()), heading_style),
        ]));

        if is_expanded {
            lines.push(Line::default());
            lines.extend(code_lines(&entry.display_source(), BODY_INDENT));
            lines.push(Line::default());

            let trigger_style = if is_selected {
                Style::default()
                    .fg(DEFAULT_THEME.code_bg)
                    .bg(DEFAULT_THEME.primary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.primary)
            };
            lines.push(Line::from(vec![
                Span::raw(BODY_INDENT),
                Span::styled(format!(" ▶ Run: {} ", entry.title()), trigger_style),
            ]));

            if let Some(run) = data.last_run.filter(|run| run.title == entry.title()) {
                lines.push(Line::default());
                lines.extend(output_lines(&run.result, BODY_INDENT));
            }
            lines.push(Line::default());
        }

        if is_selected {
            selected_rows = start..lines.len();
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("  ── {} ──", FOOTER),
        Style::default()
            .fg(DEFAULT_THEME.comment)
            .add_modifier(Modifier::ITALIC),
    )));

    (lines, selected_rows)
}

/// Keep the selected section on screen, preferring its heading when it is
/// taller than the viewport
fn follow_selection(scroll: usize, section: &Range<usize>, height: usize, total: usize) -> usize {
    let mut offset = scroll;
    if section.end > offset + height {
        offset = section.end.saturating_sub(height);
    }
    if section.start < offset {
        offset = section.start;
    }
    offset.min(total.saturating_sub(height))
}

/// Render the page
pub fn render_page(frame: &mut Frame, area: Rect, data: &PageRenderData, scroll: &mut usize) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(DEFAULT_THEME.border_normal))
        .padding(Padding::new(1, 1, 0, 0));
    let height = area.height.saturating_sub(1).max(1) as usize;

    let (lines, section) = page_lines(data);
    *scroll = follow_selection(*scroll, &section, height, lines.len());

    let visible: Vec<Line> = lines.into_iter().skip(*scroll).take(height).collect();
    frame.render_widget(Paragraph::new(visible).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ExecutionResult;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_collapsed_page_is_headings_and_footer() {
        let catalog = Catalog::builtin();
        let expanded = FxHashSet::default();
        let data = PageRenderData {
            catalog: &catalog,
            selected: 2,
            expanded: &expanded,
            last_run: None,
        };
        let (lines, section) = page_lines(&data);
        assert_eq!(lines.len(), 21 + 2);
        assert_eq!(section, 2..3);
        assert!(line_text(&lines[0]).ends_with("▸ 1. Struct `self` pointers"));
        assert!(line_text(&lines[2]).starts_with("› "));
    }

    #[test]
    fn test_output_only_under_matching_title() {
        let catalog = Catalog::builtin();
        let expanded: FxHashSet<usize> = [0, 1].into_iter().collect();
        let run = LastRun {
            title: catalog.get(1).unwrap().title().to_string(),
            result: ExecutionResult {
                output: "Objects created: 2".to_string(),
                failure: None,
            },
        };
        let data = PageRenderData {
            catalog: &catalog,
            selected: 0,
            expanded: &expanded,
            last_run: Some(&run),
        };
        let (lines, section) = page_lines(&data);
        let texts: Vec<String> = lines.iter().map(line_text).collect();

        let output_row = texts
            .iter()
            .position(|t| t.contains("Objects created: 2"))
            .unwrap();
        let second_heading = texts
            .iter()
            .position(|t| t.contains("2. Shared counters"))
            .unwrap();
        assert!(output_row > second_heading);
        assert_eq!(texts.iter().filter(|t| t.contains("Terminal Output")).count(), 1);
        assert!(section.end <= second_heading);
    }

    #[test]
    fn test_follow_selection() {
        // section below the viewport scrolls into view
        assert_eq!(follow_selection(0, &(30..35), 10, 100), 25);
        // section above the viewport scrolls up to its heading
        assert_eq!(follow_selection(50, &(10..12), 10, 100), 10);
        // taller than the viewport: heading wins
        assert_eq!(follow_selection(0, &(20..60), 10, 100), 20);
        // never past the end
        assert_eq!(follow_selection(95, &(98..99), 10, 100), 90);
    }
}
