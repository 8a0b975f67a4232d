//! Page title and caption

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub const PAGE_TITLE: &str = "C Mastery Playground";

pub fn caption(concepts: usize) -> String {
    format!(
        "An interactive tour of {} essential C concepts: expand a section, read the code, run it.",
        concepts
    )
}

pub fn render_header(frame: &mut Frame, area: Rect, concepts: usize) {
    let lines = vec![
        Line::default(),
        Line::from(Span::styled(
            format!("🧠 {}", PAGE_TITLE),
            Style::default()
                .fg(DEFAULT_THEME.primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            caption(concepts),
            Style::default().fg(DEFAULT_THEME.comment),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}
