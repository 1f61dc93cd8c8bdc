use std::path::Path;
use std::process::{Command, Output};

use rust_xlsxwriter::Workbook;

fn write_fixture(path: &Path, sheet_name: &str, l_rows: &[&[&str]]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).unwrap();
    for (n_row, l_row) in l_rows.iter().enumerate() {
        for (n_col, val) in l_row.iter().enumerate() {
            if !val.is_empty() {
                worksheet
                    .write_string(n_row as u32, n_col as u16, *val)
                    .unwrap();
            }
        }
    }
    workbook.save(path).unwrap();
}

fn run_codekit(dir: &Path, l_args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_codekit"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(l_args)
        .output()
        .unwrap()
}

#[test]
fn next_prints_gap_filling_codes() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(
        &dir.path().join("base.xlsx"),
        "aba1",
        &[&["Codigo", ""], &["ABC001", "ABC003"]],
    );

    let output = run_codekit(
        dir.path(),
        &["next", "ABC", "ABC", "AB", "--base", "base.xlsx", "--digits", "3"],
    );
    assert!(output.status.success());
    let c_stdout = String::from_utf8_lossy(&output.stdout);
    let l_lines: Vec<&str> = c_stdout.lines().collect();
    assert_eq!(l_lines[0], "ABC\tABC002");
    assert_eq!(l_lines[1], "ABC\tABC004");
    assert!(l_lines[2].starts_with("AB\t(skipped"));
}

#[test]
fn allocate_writes_default_output_and_keeps_tags_file() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(
        &dir.path().join("base.xlsx"),
        "aba1",
        &[&["Codigo"], &["XYZ0001"]],
    );
    write_fixture(&dir.path().join("siglas.xlsx"), "SIGLAS", &[&["XYZ"], &["QRS"]]);

    let output = run_codekit(
        dir.path(),
        &["allocate", "--base", "base.xlsx", "--tags", "siglas.xlsx"],
    );
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(dir.path().join("siglas_codes.xlsx").exists());
    assert!(
        String::from_utf8_lossy(&output.stdout)
            .contains("[ALLOC] requested=2 allocated=2 skipped=0 overflowed=0 warnings=0")
    );
}

#[test]
fn missing_sheet_fails_with_flag_hint() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(&dir.path().join("base.xlsx"), "Plan1", &[&["Codigo"]]);

    let output = run_codekit(dir.path(), &["validate", "--base", "base.xlsx"]);
    assert_eq!(output.status.code(), Some(1));
    let c_stderr = String::from_utf8_lossy(&output.stderr);
    assert!(c_stderr.contains("--base-sheet"));
    assert!(c_stderr.contains("Plan1"));
}

#[test]
fn config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_codekit(dir.path(), &["config", "init"]);
    assert!(output.status.success());
    assert!(dir.path().join("codekit.toml").exists());

    let output = run_codekit(dir.path(), &["config", "init"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run_codekit(dir.path(), &["config", "show"]);
    assert!(output.status.success());
    let c_stdout = String::from_utf8_lossy(&output.stdout);
    assert!(c_stdout.contains("[allocation]"));
    assert!(c_stdout.contains("digit_width = 4"));
}

#[test]
fn shared_workbook_missing_tags_sheet_hints_tags_flag() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(
        &dir.path().join("book.xlsx"),
        "aba1",
        &[&["Codigo"], &["ABC0001"]],
    );

    let output = run_codekit(
        dir.path(),
        &["allocate", "--base", "book.xlsx", "--tags", "book.xlsx"],
    );
    assert_eq!(output.status.code(), Some(1));
    let c_stderr = String::from_utf8_lossy(&output.stderr);
    assert!(c_stderr.contains("--tags-sheet"), "{c_stderr}");
    assert!(!c_stderr.contains("--base-sheet"));
    assert!(c_stderr.contains("SIGLAS"));
}
