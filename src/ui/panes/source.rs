//! Snippet source rendering with syntax highlighting
//!
//! Highlighting works line by line with a small scanner rather than the real
//! lexer, so it never fails on code the interpreter would reject. Block
//! comments are only recognized when they open and close on the same line.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

const TYPES: &[&str] = &["int", "char", "void", "struct", "const", "static", "typedef"];

const KEYWORDS: &[&str] = &[
    "return", "if", "else", "while", "for", "do", "switch", "case", "default", "break",
    "continue", "sizeof",
];

/// Highlight one line of C source
pub fn highlight_line(line: &str) -> Vec<Span<'static>> {
    if line.trim_start().starts_with('#') {
        return vec![Span::styled(
            line.to_string(),
            Style::default().fg(DEFAULT_THEME.keyword),
        )];
    }

    let mut spans = Vec::new();
    let mut plain = String::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    let flush = |plain: &mut String, spans: &mut Vec<Span<'static>>| {
        if !plain.is_empty() {
            spans.push(Span::styled(
                std::mem::take(plain),
                Style::default().fg(DEFAULT_THEME.fg),
            ));
        }
    };

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c == '/' && next == Some('/') {
            flush(&mut plain, &mut spans);
            spans.push(styled(&chars[i..], DEFAULT_THEME.comment));
            break;
        }

        if c == '/' && next == Some('*') {
            flush(&mut plain, &mut spans);
            let end = (i + 2..chars.len().saturating_sub(1))
                .find(|&j| chars[j] == '*' && chars[j + 1] == '/')
                .map_or(chars.len(), |j| j + 2);
            spans.push(styled(&chars[i..end], DEFAULT_THEME.comment));
            i = end;
            continue;
        }

        if c == '"' || c == '\'' {
            flush(&mut plain, &mut spans);
            let mut end = i + 1;
            while end < chars.len() && chars[end] != c {
                end += if chars[end] == '\\' { 2 } else { 1 };
            }
            let end = (end + 1).min(chars.len());
            spans.push(styled(&chars[i..end], DEFAULT_THEME.string));
            i = end;
            continue;
        }

        if c.is_alphanumeric() || c == '_' {
            flush(&mut plain, &mut spans);
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let is_call = chars[i..].iter().find(|c| !c.is_whitespace()) == Some(&'(');
            let style = word_style(&word, is_call);
            spans.push(Span::styled(word, style));
            continue;
        }

        plain.push(c);
        i += 1;
    }

    flush(&mut plain, &mut spans);
    spans
}

fn styled(chars: &[char], color: ratatui::style::Color) -> Span<'static> {
    Span::styled(chars.iter().collect::<String>(), Style::default().fg(color))
}

fn word_style(word: &str, is_call: bool) -> Style {
    if TYPES.contains(&word) {
        Style::default().fg(DEFAULT_THEME.type_name)
    } else if KEYWORDS.contains(&word) {
        Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD)
    } else if word == "NULL" || word.starts_with(|c: char| c.is_ascii_digit()) {
        Style::default().fg(DEFAULT_THEME.number)
    } else if is_call {
        Style::default().fg(DEFAULT_THEME.function)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    }
}

/// Numbered, highlighted code block for an expanded section
pub fn code_lines(source: &str, indent: &str) -> Vec<Line<'static>> {
    let lines: Vec<&str> = source.lines().collect();
    let width = lines.len().to_string().len();

    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let mut spans = vec![
                Span::raw(indent.to_string()),
                Span::styled(
                    format!("{:>width$} │ ", idx + 1, width = width),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
            ];
            spans.extend(
                highlight_line(line)
                    .into_iter()
                    .map(|span| span.patch_style(Style::default().bg(DEFAULT_THEME.code_bg))),
            );
            Line::from(spans)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(spans: &[Span]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_highlight_preserves_text() {
        let line = r#"    printf("%d\n", add(5, 7)); // 12"#;
        assert_eq!(text(&highlight_line(line)), line);
    }

    #[test]
    fn test_highlight_classifies_tokens() {
        let spans = highlight_line("int x = f(\"s\") /* c */;");
        let find = |s: &str| spans.iter().find(|span| span.content == s).unwrap().style.fg;
        assert_eq!(find("int"), Some(DEFAULT_THEME.type_name));
        assert_eq!(find("f"), Some(DEFAULT_THEME.function));
        assert_eq!(find("\"s\""), Some(DEFAULT_THEME.string));
        assert_eq!(find("/* c */"), Some(DEFAULT_THEME.comment));
    }

    #[test]
    fn test_code_lines_numbered() {
        let lines = code_lines("a\nb", "  ");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].spans[1].content, "2 │ ");
    }
}
