/// Remove the longest common leading whitespace from every line.
///
/// Lines made only of spaces and tabs are ignored when computing the margin
/// and come out empty. Tabs and spaces are not equivalent: `"\t"` and
/// `"    "` share no margin.
pub fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;

    for line in text.split('\n') {
        let content = line.trim_start_matches([' ', '\t']);
        if content.is_empty() {
            continue;
        }
        let indent = &line[..line.len() - content.len()];
        margin = Some(match margin {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }

    let margin = margin.unwrap_or("");
    text.split('\n')
        .map(|line| {
            if line.trim_start_matches([' ', '\t']).is_empty() {
                ""
            } else {
                line.strip_prefix(margin).unwrap_or(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Both arguments are ASCII whitespace, so byte positions are char boundaries
fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_indent_removed() {
        let text = "    int x;\n      x = 1;\n    return x;\n";
        assert_eq!(dedent(text), "int x;\n  x = 1;\nreturn x;\n");
    }

    #[test]
    fn test_blank_lines_ignored_and_emptied() {
        let text = "\n        a\n   \n        b\n";
        assert_eq!(dedent(text), "\na\n\nb\n");
    }

    #[test]
    fn test_mixed_tabs_and_spaces() {
        assert_eq!(dedent("\tx\n    y"), "\tx\n    y");
        assert_eq!(dedent("\t\tx\n\ty"), "\tx\ny");
    }

    #[test]
    fn test_unindented_text_unchanged() {
        assert_eq!(dedent("a\n  b"), "a\n  b");
        assert_eq!(dedent(""), "");
    }
}
