use std::fs;
use std::path::PathBuf;
use std::thread;

use tempfile::TempDir;

use snapedit::edit::Edit;
use snapedit::flush::{flush, flush_global};
use snapedit::registry::EditRegistry;

fn write_fixture(directory: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = directory.path().join(name);
    fs::write(&path, content).expect("fixture write should succeed");
    path
}

#[test]
fn edits_recorded_from_stack_traces_resolve_against_the_real_file() {
    let directory = TempDir::new().expect("tempdir should be created");
    let path = write_fixture(&directory, "index.test.js", "test(() => {\n  check(run())\n});\n");

    let stack = format!(
        "Error: snapshot mismatch\n    at check ({}:2:3)\n    at run (/repo/runner.js:10:1)",
        path.display()
    );
    let edit = Edit::from_stack_trace(&stack, "result").expect("frame should parse");
    assert_eq!(edit.file, path);

    let registry = EditRegistry::new();
    registry.record(edit);

    let report = flush(&registry);
    assert!(report.is_success(), "report: {report:?}");
    assert_eq!(
        fs::read_to_string(&path).expect("fixture should be readable"),
        "test(() => {\n  check(run(), `result`)\n});\n"
    );
}

#[test]
fn file_groups_are_flushed_concurrently_and_independently() {
    let directory = TempDir::new().expect("tempdir should be created");
    let registry = EditRegistry::new();

    let paths = (0..6)
        .map(|index| {
            let path = write_fixture(
                &directory,
                &format!("spec-{index}.js"),
                &format!("check({index})\n"),
            );
            registry.record(Edit::new(&path, 0, 0, index.to_string(), "stack"));
            path
        })
        .collect::<Vec<_>>();

    let report = flush(&registry);
    assert!(report.is_success(), "report: {report:?}");
    assert_eq!(report.summary.files_written, 6);
    assert_eq!(report.summary.edits_applied, 6);

    for (index, path) in paths.iter().enumerate() {
        assert_eq!(
            fs::read_to_string(path).expect("fixture should be readable"),
            format!("check({index}, `{index}`)\n")
        );
    }
}

#[test]
fn concurrent_assertions_record_into_one_registry_without_loss() {
    let directory = TempDir::new().expect("tempdir should be created");
    let registry = EditRegistry::new();

    let first = write_fixture(&directory, "first.js", "check(a)\ncheck(b)\n");
    let second = write_fixture(&directory, "second.js", "check(c)\ncheck(d)\n");

    thread::scope(|scope| {
        for (path, line, output) in [
            (&first, 0usize, "a"),
            (&first, 1, "b"),
            (&second, 0, "c"),
            (&second, 1, "d"),
        ] {
            let registry = &registry;
            scope.spawn(move || registry.record(Edit::new(path, line, 0, output, "stack")));
        }
    });

    assert_eq!(registry.pending_edits(), 4);
    let report = flush(&registry);
    assert!(report.is_success(), "report: {report:?}");
    assert_eq!(
        fs::read_to_string(&first).expect("fixture should be readable"),
        "check(a, `a`)\ncheck(b, `b`)\n"
    );
    assert_eq!(
        fs::read_to_string(&second).expect("fixture should be readable"),
        "check(c, `c`)\ncheck(d, `d`)\n"
    );
}

#[test]
fn the_global_registry_feeds_flush_global() {
    let directory = TempDir::new().expect("tempdir should be created");
    let path = write_fixture(&directory, "global.js", "check(1)\n");

    EditRegistry::global().record(Edit::new(&path, 0, 0, "1", "stack"));

    let report = flush_global();
    assert!(report.is_success(), "report: {report:?}");
    assert!(EditRegistry::global().is_empty());
    assert_eq!(
        fs::read_to_string(&path).expect("fixture should be readable"),
        "check(1, `1`)\n"
    );
}
