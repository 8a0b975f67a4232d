// Integration tests for the C interpreter

use cmastery::interpreter::{CaptureBuffer, Interpreter, RuntimeError};
use cmastery::parser::parse::Parser;

/// Parse and run a program, returning its status and everything it printed
fn run_program(source: &str) -> (Result<i32, RuntimeError>, String) {
    let program = Parser::new(source)
        .expect("Parser creation failed")
        .parse_program()
        .expect("Parsing failed");

    let mut out = CaptureBuffer::new();
    let result = match Interpreter::new(program, &mut out) {
        Ok(mut interpreter) => interpreter.run(),
        Err(err) => Err(err),
    };
    (result, out.into_string())
}

fn output_of(source: &str) -> String {
    let (result, output) = run_program(source);
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    output
}

fn error_of(source: &str) -> String {
    let (result, _) = run_program(source);
    match result {
        Err(err) => err.to_string(),
        Ok(status) => panic!("expected a runtime error, program exited with {}", status),
    }
}

#[test]
fn test_main_return_value_is_status() {
    let (result, output) = run_program(
        r#"
        int add(int a, int b) {
            return a + b;
        }

        int main(void) {
            return add(3, 4);
        }
    "#,
    );
    assert_eq!(result, Ok(7));
    assert_eq!(output, "");
}

#[test]
fn test_struct_fields_and_nested_access() {
    let output = output_of(
        r#"
        struct Point { int x; int y; };
        struct Line { struct Point from; struct Point to; };

        int main(void) {
            struct Line l = {{1, 2}, {3, 4}};
            struct Line *p = &l;
            p->to.y = 40;
            printf("%d %d %d %d\n", l.from.x, l.from.y, p->to.x, l.to.y);
            printf("%d\n", sizeof(struct Line));
            return 0;
        }
    "#,
    );
    assert_eq!(output, "1 2 3 40\n16\n");
}

#[test]
fn test_struct_copy_is_by_value() {
    let output = output_of(
        r#"
        struct Box { int v; };

        struct Box bump(struct Box b) {
            b.v = b.v + 1;
            return b;
        }

        int main(void) {
            struct Box a = {1};
            struct Box b = bump(a);
            printf("%d %d %d\n", a.v, b.v, bump(b).v);
            return 0;
        }
    "#,
    );
    assert_eq!(output, "1 2 3\n");
}

#[test]
fn test_function_pointers() {
    let output = output_of(
        r#"
        typedef int (*BinaryOp)(int, int);

        int add(int a, int b) { return a + b; }
        int mul(int a, int b) { return a * b; }

        int apply(BinaryOp op, int a, int b) {
            return op(a, b);
        }

        int main(void) {
            BinaryOp ops[2] = {add, mul};
            int (*f)(int, int) = &mul;
            printf("%d %d\n", apply(ops[0], 3, 4), apply(ops[1], 3, 4));
            printf("%d %d\n", (*f)(5, 6), f == mul);
            return 0;
        }
    "#,
    );
    assert_eq!(output, "7 12\n30 1\n");
}

#[test]
fn test_switch_fallthrough_and_default() {
    let output = output_of(
        r#"
        int main(void) {
            for (int i = 0; i < 4; i++) {
                switch (i) {
                    case 0:
                        printf("zero ");
                    case 1:
                        printf("one ");
                        break;
                    default:
                        printf("other ");
                }
            }
            printf("\n");
            return 0;
        }
    "#,
    );
    assert_eq!(output, "zero one one other other \n");
}

#[test]
fn test_loops_break_and_continue() {
    let output = output_of(
        r#"
        int main(void) {
            int total = 0;
            int i = 0;
            while (1) {
                i++;
                if (i % 2 == 0) {
                    continue;
                }
                if (i > 9) {
                    break;
                }
                total += i;
            }
            do {
                total--;
            } while (total > 20);
            printf("%d %d\n", i, total);
            return 0;
        }
    "#,
    );
    assert_eq!(output, "11 20\n");
}

#[test]
fn test_static_locals_keep_their_value() {
    let output = output_of(
        r#"
        int next_id(void) {
            static int id = 100;
            id++;
            return id;
        }

        int main(void) {
            next_id();
            next_id();
            printf("%d\n", next_id());
            return 0;
        }
    "#,
    );
    assert_eq!(output, "103\n");
}

#[test]
fn test_globals_are_zero_initialized() {
    let output = output_of(
        r#"
        int counter;
        char *name;

        int main(void) {
            counter += 5;
            printf("%d %d\n", counter, name == NULL);
            return 0;
        }
    "#,
    );
    assert_eq!(output, "5 1\n");
}

#[test]
fn test_heap_strings() {
    let output = output_of(
        r#"
        int main(void) {
            char *copy = malloc(strlen("hello") + 1);
            strcpy(copy, "hello");
            copy[0] = 'j';
            puts(copy);
            printf("%d %d\n", strcmp(copy, "jello"), strlen(copy));
            free(copy);
            return 0;
        }
    "#,
    );
    assert_eq!(output, "jello\n0 5\n");
}

#[test]
fn test_printf_formatting() {
    let output = output_of(
        r#"
        int main(void) {
            printf("[%5d][%-5d][%05d]\n", 42, 42, 42);
            printf("[%x][%X][%c][%s][%%]\n", 255, 255, 'A', "str");
            putchar('!');
            putchar('\n');
            return 0;
        }
    "#,
    );
    assert_eq!(output, "[   42][42   ][00042]\n[ff][FF][A][str][%]\n!\n");
}

#[test]
fn test_exit_stops_program_with_status() {
    let (result, output) = run_program(
        r#"
        void stop(void) {
            printf("stopping\n");
            exit(3);
        }

        int main(void) {
            stop();
            printf("unreachable\n");
            return 0;
        }
    "#,
    );
    assert_eq!(result, Ok(3));
    assert_eq!(output, "stopping\n");
}

// === ERROR DETECTION ===

#[test]
fn test_use_after_free() {
    let err = error_of(
        r#"
        int main(void) {
            int *p = malloc(sizeof(int));
            *p = 1;
            free(p);
            return *p;
        }
    "#,
    );
    assert!(err.contains("use after free"), "{}", err);
}

#[test]
fn test_double_free() {
    let err = error_of(
        r#"
        int main(void) {
            int *p = malloc(4);
            free(p);
            free(p);
            return 0;
        }
    "#,
    );
    assert!(err.contains("double free"), "{}", err);
}

#[test]
fn test_out_of_bounds_write() {
    let err = error_of(
        r#"
        int main(void) {
            int xs[3] = {1, 2, 3};
            xs[3] = 4;
            return 0;
        }
    "#,
    );
    assert!(err.contains("buffer overrun"), "{}", err);
    assert!(err.contains("'xs'"), "{}", err);
}

#[test]
fn test_dangling_stack_pointer() {
    let err = error_of(
        r#"
        int *escape(void) {
            int local = 5;
            return &local;
        }

        int main(void) {
            int *p = escape();
            return *p;
        }
    "#,
    );
    assert!(err.contains("dangling pointer to 'local'"), "{}", err);
}

#[test]
fn test_const_and_literal_writes_rejected() {
    let err = error_of(
        r#"
        int main(void) {
            const int limit = 10;
            limit = 11;
            return 0;
        }
    "#,
    );
    assert!(err.contains("Attempted to modify const"), "{}", err);

    let err = error_of(
        r#"
        int main(void) {
            char *s = "fixed";
            s[0] = 'F';
            return 0;
        }
    "#,
    );
    assert!(err.contains("read-only"), "{}", err);
}

#[test]
fn test_null_dereference() {
    let err = error_of(
        r#"
        struct Node { int v; struct Node *next; };

        int main(void) {
            struct Node n = {1, NULL};
            return n.next->v;
        }
    "#,
    );
    assert!(err.starts_with("Null pointer dereference at line 6"), "{}", err);
}

#[test]
fn test_uninitialized_read() {
    let err = error_of("int main(void) {\n  int x;\n  int y = x + 1;\n  return y;\n}");
    assert_eq!(err, "Read from uninitialized variable 'x' at line 3");
}

#[test]
fn test_integer_overflow() {
    let err = error_of("int main(void) { int big = 2147483647; return big + 1; }");
    assert!(err.starts_with("Integer overflow"), "{}", err);
}

#[test]
fn test_argument_count_and_missing_main() {
    let err = error_of("int f(int a) { return a; }\nint main(void) { return f(1, 2); }");
    assert_eq!(err, "Function 'f' expects 1 argument(s), got 2 at line 2");

    let err = error_of("int helper(void) { return 0; }");
    assert_eq!(err, "No main function found");
}

#[test]
fn test_output_is_raw_bytes() {
    // 0xC3 0xA9 is "é" in UTF-8
    let output = output_of(
        r#"
        int main(void) {
            putchar(195);
            putchar(169);
            printf("%c%c|%3c\n", 195, 169, 'x');
            return 0;
        }
    "#,
    );
    assert_eq!(output, "éé|  x\n");

    let output = output_of("int main(void) { putchar(200); putchar('\\n'); return 0; }");
    assert_eq!(output, "\u{FFFD}\n");
}

#[test]
fn test_duplicate_case_value_rejected() {
    let err = error_of(
        r#"
        const int ONE = 1;

        int main(void) {
            int x = 2;
            switch (x) {
                case ONE:
                    break;
                case 1:
                    break;
            }
            return 0;
        }
    "#,
    );
    assert_eq!(err, "Duplicate case value 1 at line 9");
}
