//! Terminal output block shown under a run trigger

use crate::runner::ExecutionResult;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

/// Lines of the "Terminal Output" block for one run
pub fn output_lines(result: &ExecutionResult, indent: &str) -> Vec<Line<'static>> {
    let (label, label_color) = if result.is_success() {
        ("🖥 Terminal Output:", DEFAULT_THEME.success)
    } else {
        ("🖥 Terminal Output (error):", DEFAULT_THEME.error)
    };

    let mut lines = vec![Line::from(vec![
        Span::raw(indent.to_string()),
        Span::styled(
            label,
            Style::default()
                .fg(label_color)
                .add_modifier(Modifier::BOLD),
        ),
    ])];

    let text_style = if result.is_success() {
        Style::default().fg(DEFAULT_THEME.fg).bg(DEFAULT_THEME.code_bg)
    } else {
        Style::default().fg(DEFAULT_THEME.error).bg(DEFAULT_THEME.code_bg)
    };

    if result.is_success() && result.output.is_empty() {
        lines.push(Line::from(vec![
            Span::raw(format!("{}  ", indent)),
            Span::styled("(no output)", Style::default().fg(DEFAULT_THEME.comment)),
        ]));
        return lines;
    }

    lines.extend(result.lines().map(|line| {
        Line::from(vec![
            Span::raw(format!("{}  ", indent)),
            Span::styled(line.to_string(), text_style),
        ])
    }));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::FailureKind;

    #[test]
    fn test_line_breaks_become_rows() {
        let result = ExecutionResult {
            output: "5<br>4<br>3".to_string(),
            failure: None,
        };
        let lines = output_lines(&result, "");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3].spans[1].content, "3");
    }

    #[test]
    fn test_error_styled() {
        let result = ExecutionResult {
            output: "Division by zero in '1 / 0' at line 1".to_string(),
            failure: Some(FailureKind::Runtime),
        };
        let lines = output_lines(&result, "");
        assert_eq!(lines[1].spans[1].style.fg, Some(DEFAULT_THEME.error));
    }

    #[test]
    fn test_empty_output_placeholder() {
        let result = ExecutionResult {
            output: String::new(),
            failure: None,
        };
        let lines = output_lines(&result, "");
        assert_eq!(lines[1].spans[1].content, "(no output)");
    }
}
