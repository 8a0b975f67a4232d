// Every built-in concept must run cleanly and print what its section promises

use cmastery::catalog::Catalog;
use cmastery::runner::SnippetRunner;

fn output_of(catalog: &Catalog, number: usize) -> String {
    let entry = catalog.get(number - 1).expect("entry exists");
    let result = SnippetRunner::new().run(entry.source());
    assert!(
        result.is_success(),
        "'{}' failed: {}",
        entry.title(),
        result.output
    );
    result.output
}

#[test]
fn test_entries_in_authored_order() {
    let catalog = Catalog::builtin();
    let titles: Vec<&str> = catalog.entries().iter().map(|e| e.title()).collect();
    assert_eq!(titles.len(), 21);
    for (i, title) in titles.iter().enumerate() {
        assert!(
            title.starts_with(&format!("{}. ", i + 1)),
            "entry {} is '{}'",
            i + 1,
            title
        );
    }

    let again: Vec<&str> = catalog.entries().iter().map(|e| e.title()).collect();
    assert_eq!(titles, again);
}

#[test]
fn test_every_entry_runs_with_output() {
    let catalog = Catalog::builtin();
    let runner = SnippetRunner::new();
    for entry in catalog.entries() {
        let result = runner.run(entry.source());
        assert!(
            result.is_success(),
            "'{}' failed: {}",
            entry.title(),
            result.output
        );
        assert!(!result.output.is_empty(), "'{}' printed nothing", entry.title());
    }
}

#[test]
fn test_entries_are_idempotent() {
    let catalog = Catalog::builtin();
    let runner = SnippetRunner::new();
    for entry in catalog.entries() {
        assert_eq!(runner.run(entry.source()), runner.run(entry.source()));
    }
}

#[test]
fn test_expected_outputs() {
    let catalog = Catalog::builtin();
    let expected = [
        (1, "Name: Alice, Marks: 92"),
        (2, "Objects created: 2<br>Ids: 1, 2"),
        (3, "Toyota<br>Toyota car started"),
        (4, "Bank 1: Global Bank<br>Bank 2: Global Bank"),
        (5, "12"),
        (6, "Logger initialized<br>Logger destroyed"),
        (7, "John<br>50000"),
        (8, "Ms. Rose Math"),
        (9, "15"),
        (10, "Buddy says Woof!"),
        (11, "2"),
        (12, "77"),
        (13, "Engine started (4 cylinders)"),
        (14, "Alice"),
        (15, "B"),
        (16, "Function is being called<br>Hello!"),
        (17, "Hello from Decorator!"),
        (18, "100"),
        (19, "1<br>30"),
        (20, "Error: Age must be 18 or above"),
        (21, "5<br>4<br>3<br>2<br>1<br>0"),
    ];
    for (number, output) in expected {
        assert_eq!(output_of(&catalog, number), output, "entry {}", number);
    }
}

#[test]
fn test_display_source_matches_what_runs() {
    let catalog = Catalog::builtin();
    let runner = SnippetRunner::new();
    let entry = catalog.find("10. Instance-style functions").unwrap();
    assert_eq!(
        runner.run(&entry.display_source()),
        runner.run(entry.source())
    );
    assert!(!entry.display_source().starts_with(' '));
}
