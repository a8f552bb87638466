use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn richdoc() -> Command {
    Command::cargo_bin("richdoc").unwrap()
}

#[test]
fn markdown_to_carrier_on_stdout() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("note.md");
    fs::write(&input, "# Title\n\n```mermaid\ngraph TD\n  A --> B\n```\n").unwrap();

    richdoc()
        .arg(input.to_str().unwrap())
        .arg("--to")
        .arg("carrier")
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1>Title</h1>"))
        .stdout(predicate::str::contains("data-type=\"mermaid\""));
}

#[test]
fn carrier_back_to_markdown_via_output_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("page.html");
    let output = dir.path().join("note.md");
    fs::write(
        &input,
        "<h2>Notes</h2><div data-latex=\"E=mc^2\" data-type=\"block-math\"></div>",
    )
    .unwrap();

    richdoc()
        .arg("convert")
        .arg(input.to_str().unwrap())
        .arg("--to")
        .arg("markdown")
        .arg("-o")
        .arg(output.to_str().unwrap())
        .assert()
        .success();

    let markdown = fs::read_to_string(&output).unwrap();
    assert_eq!(markdown, "## Notes\n\n$$\nE=mc^2\n$$\n");
}

#[test]
fn roundtrip_reports_ok_for_stable_content() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("stable.md");
    fs::write(&input, "# Doc\n\n- [x] done\n\n$$\nx^2\n$$\n").unwrap();

    richdoc()
        .arg("roundtrip")
        .arg(input.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("ok:"));
}

#[test]
fn paste_unwraps_a_markdown_fence() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("clipboard.txt");
    fs::write(&input, "```markdown\n# Pasted\n\ntext\n```").unwrap();

    richdoc()
        .arg("paste")
        .arg(input.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::eq("# Pasted\n\ntext"));
}

#[test]
fn inspect_emits_document_json() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("doc.md");
    fs::write(&input, "- [ ] task\n").unwrap();

    richdoc()
        .arg("inspect")
        .arg(input.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"taskList\""));
}

#[test]
fn unknown_target_format_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("note.md");
    fs::write(&input, "text\n").unwrap();

    richdoc()
        .arg(input.to_str().unwrap())
        .arg("--to")
        .arg("docx")
        .assert()
        .failure()
        .stderr(predicate::str::contains("docx"));
}

#[test]
fn list_formats_names_both_builtin_formats() {
    richdoc()
        .arg("--list-formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("markdown"))
        .stdout(predicate::str::contains("carrier"));
}

#[test]
fn config_file_can_change_the_diagram_language() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("richdoc.toml");
    fs::write(
        &config,
        "[convert.markdown]\ndiagram_language = \"plantuml\"\n",
    )
    .unwrap();
    let input = dir.path().join("note.md");
    fs::write(&input, "```plantuml\n@startuml\n@enduml\n```\n").unwrap();

    richdoc()
        .arg(input.to_str().unwrap())
        .arg("--config")
        .arg(config.to_str().unwrap())
        .arg("--to")
        .arg("carrier")
        .assert()
        .success()
        .stdout(predicate::str::contains("data-type=\"plantuml\""));
}
