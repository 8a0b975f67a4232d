// Integration tests for the snippet runner

use cmastery::runner::{run, FailureKind, SnippetRunner};

#[test]
fn test_single_line_output() {
    let source = r#"
        #include <stdio.h>

        int main(void) {
            printf("Woof!\n");
            return 0;
        }
    "#;
    assert_eq!(run(source), "Woof!");
}

#[test]
fn test_lines_joined_with_marker() {
    let source = "int main(void) {\n    printf(\"1\\n\");\n    printf(\"2\\n\");\n    return 0;\n}\n";
    assert_eq!(run(source), "1<br>2");
}

#[test]
fn test_indentation_is_normalized() {
    let flat = "int main(void) {\n    printf(\"1\\n\");\n    printf(\"2\\n\");\n    return 0;\n}\n";
    let indented: String = flat
        .lines()
        .map(|line| format!("            {}\n", line))
        .collect();
    assert_eq!(run(&indented), "1<br>2");
    assert_eq!(run(&indented), run(flat));
}

#[test]
fn test_silent_snippet_returns_empty_string() {
    let result = SnippetRunner::new().run("int main(void) { int x = 1; return x; }");
    assert!(result.is_success());
    assert_eq!(result.output, "");
}

#[test]
fn test_failure_discards_partial_output() {
    let source = r#"
        int main(void) {
            int zero = 0;
            printf("before\n");
            printf("%d\n", 10 / zero);
            return 0;
        }
    "#;
    let result = SnippetRunner::new().run(source);
    assert_eq!(result.failure, Some(FailureKind::Runtime));
    assert!(result.output.contains("Division by zero"), "{}", result.output);
    assert!(!result.output.contains("before"));
}

#[test]
fn test_assert_message_reported() {
    let source = r#"
        #include <assert.h>

        int main(void) {
            int age = 16;
            assert(age >= 18 && "Age must be 18 or above");
            printf("unreachable\n");
            return 0;
        }
    "#;
    let output = run(source);
    assert!(output.starts_with("Assertion failed: Age must be 18 or above"), "{}", output);
}

#[test]
fn test_syntax_error_reported() {
    let result = SnippetRunner::new().run("int main(void) {\n    printf(\"x\\n\")\n}\n");
    assert_eq!(result.failure, Some(FailureKind::Syntax));
    assert!(result.output.starts_with("Parse error at line 3"), "{}", result.output);
}

#[test]
fn test_runs_are_isolated() {
    let source = r#"
        int calls = 0;

        int main(void) {
            calls++;
            printf("%d\n", calls);
            return 0;
        }
    "#;
    let runner = SnippetRunner::new();
    assert_eq!(runner.run(source).output, "1");
    assert_eq!(runner.run(source).output, "1");
}

#[test]
fn test_exit_keeps_output() {
    let source = r#"
        int main(void) {
            printf("bye\n");
            exit(2);
            printf("never\n");
            return 0;
        }
    "#;
    let result = SnippetRunner::new().run(source);
    assert!(result.is_success());
    assert_eq!(result.output, "bye");
}

#[test]
fn test_main_return_value_ignored() {
    let result = SnippetRunner::new().run("int main(void) { printf(\"ok\\n\"); return 1; }");
    assert!(result.is_success());
    assert_eq!(result.output, "ok");
}

#[test]
fn test_runaway_recursion_is_an_error() {
    let source = r#"
        int down(int n) {
            return down(n + 1);
        }

        int main(void) {
            printf("start\n");
            return down(0);
        }
    "#;
    let result = SnippetRunner::new().run(source);
    assert_eq!(result.failure, Some(FailureKind::Runtime));
    assert!(result.output.starts_with("Stack overflow"), "{}", result.output);
}

#[test]
fn test_heap_exhaustion_is_an_error() {
    let source = r#"
        int main(void) {
            while (1) {
                malloc(4096);
            }
            return 0;
        }
    "#;
    let output = run(source);
    assert!(output.contains("out of memory"), "{}", output);
}

#[test]
fn test_execute_returns_raw_capture() {
    let captured = SnippetRunner::new()
        .execute("int main(void) { printf(\"a\\nb\\n\"); return 0; }")
        .unwrap();
    assert_eq!(captured, "a\nb\n");
}

#[test]
fn test_deeply_nested_expression_is_a_syntax_error() {
    let depth = 5000;
    let source = format!(
        "int main(void) {{\n    int x = {}1{};\n    printf(\"%d\\n\", x);\n    return 0;\n}}\n",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let result = SnippetRunner::new().run(&source);
    assert_eq!(result.failure, Some(FailureKind::Syntax));
    assert!(result.output.contains("nested too deeply"), "{}", result.output);

    let chain = format!("int main(void) {{ return 1{}; }}", " + 1".repeat(depth));
    let result = SnippetRunner::new().run(&chain);
    assert_eq!(result.failure, Some(FailureKind::Syntax));
}

#[test]
fn test_moderate_nesting_still_runs() {
    let source = format!(
        "int main(void) {{\n    int x = {}1{};\n    printf(\"%d\\n\", x);\n    return 0;\n}}\n",
        "(".repeat(100),
        ")".repeat(100)
    );
    assert_eq!(run(&source), "1");
}

#[test]
fn test_oversized_array_is_a_runtime_error() {
    let source = r#"
        int main(void) {
            char a[65536][65536][65536][65536];
            printf("allocated\n");
            return 0;
        }
    "#;
    let result = SnippetRunner::new().run(source);
    assert_eq!(result.failure, Some(FailureKind::Runtime));
    assert!(result.output.contains("too large"), "{}", result.output);

    let result = SnippetRunner::new().run("int main(void) { int a[2147483647][2147483647][2147483647]; return 0; }");
    assert_eq!(result.failure, Some(FailureKind::Runtime));
    assert!(result.output.contains("too large"), "{}", result.output);
}

#[test]
fn test_huge_printf_width_is_a_runtime_error() {
    let result = SnippetRunner::new().run("int main(void) { printf(\"%99999999999999999999d\\n\", 1); return 0; }");
    assert_eq!(result.failure, Some(FailureKind::Runtime));
    assert!(result.output.contains("field width"), "{}", result.output);

    let result = SnippetRunner::new().run("int main(void) { printf(\"%1000000000d\\n\", 1); return 0; }");
    assert_eq!(result.failure, Some(FailureKind::Runtime));
    assert!(result.output.contains("field width"), "{}", result.output);
}
