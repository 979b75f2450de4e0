use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

fn cmd(cwd: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_apimd")));
    cmd.current_dir(cwd).env_remove("RUST_LOG");
    cmd
}

fn input_folder() -> String {
    format!("{}/tests/fixtures/input", env!("CARGO_MANIFEST_DIR"))
}

/// Run against the fixture packages with LF output, plus extra args.
fn generate(out: &Path, extra: &[&str]) -> assert_cmd::assert::Assert {
    cmd(out.parent().unwrap())
        .args(["-i", &input_folder(), "-o", out.to_str().unwrap(), "--newline", "lf"])
        .args(extra)
        .assert()
}

fn listing(folder: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(folder)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn read(folder: &Path, name: &str) -> String {
    fs::read_to_string(folder.join(name)).unwrap()
}

// -- granularity --

#[test]
fn member_level_writes_one_file_per_item() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("md");
    generate(&out, &[]).success();

    assert_eq!(
        listing(&out),
        [
            "index.md",
            "package-simple.color.md",
            "package-simple.color.red.md",
            "package-simple.load.md",
            "package-simple.load_1.md",
            "package-simple.md",
            "package-simple.options.md",
            "package-simple.options.property_0.md",
            "package-simple.options.property_1.md",
            "package-simple.utils.md",
            "package-simple.utils.version.md",
            "package-simple.widget.md",
            "package-simple.widget.render.md",
            "package-simple.widget.reset.md",
            "scope_package-child.childwidget.md",
            "scope_package-child.childwidget.sparkle.md",
            "scope_package-child.md",
        ]
    );

    let index = read(&out, "index.md");
    assert!(index.starts_with(
        "<!-- Do not edit this file. It is automatically generated by API Documenter. -->\n\n"
    ));
    assert!(index.contains("## API Reference"));
    assert!(index.contains("[package-simple](./package-simple.md)"));
    assert!(index.contains("[@scope/package-child](./scope_package-child.md)"));

    let widget = read(&out, "package-simple.widget.md");
    assert!(widget.contains("[render(target)](./package-simple.widget.render.md)"));
    assert!(widget.contains("[Widget.render](./package-simple.widget.render.md)"));
    assert!(widget.contains("<code>static</code>"));
}

#[test]
fn export_level_anchors_members() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("md");
    generate(&out, &["-l", "export"]).success();

    let names = listing(&out);
    assert!(names.contains(&"package-simple.widget.md".to_string()));
    assert!(!names.iter().any(|n| n.contains("render")));

    let widget = read(&out, "package-simple.widget.md");
    assert!(widget.contains("<a name=\"render\"></a>"));
    assert!(widget.contains("[render(target)](#render)"));
    assert!(widget.contains("[Widget.render](#render)"));

    let color = read(&out, "package-simple.color.md");
    assert!(color.contains("[Red](#red)"));
    assert!(color.contains("<a name=\"red\"></a>"));

    let options = read(&out, "package-simple.options.md");
    assert!(options.contains("<a name=\"property~0\"></a>"));
    assert!(options.contains("<a name=\"property~1\"></a>"));
}

#[test]
fn all_levels_render_side_by_side() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("md");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("old.md"), "stale").unwrap();
    generate(&out, &["-l", "all"]).success();

    assert_eq!(
        listing(&out),
        ["export", "member", "model", "namespace", "package"]
    );
    assert_eq!(listing(&out.join("model")), ["index.md"]);
    assert_eq!(
        listing(&out.join("package")),
        ["index.md", "package-simple.md", "scope_package-child.md"]
    );
}

#[test]
fn cross_package_heritage_links() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("md");
    generate(&out, &[]).success();

    let child = read(&out, "scope_package-child.childwidget.md");
    assert!(child.contains("## ChildWidget class"));
    assert!(child.contains("**Extends:** [Widget](./package-simple.widget.md)"));
    assert!(child.contains("> This API is provided as a preview for developers"));

    let package = read(&out, "scope_package-child.md");
    assert!(package.contains("## package-child package"));
}

// -- options --

#[test]
fn config_file_is_applied() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("md");
    let mut config = NamedTempFile::new().unwrap();
    write!(
        config,
        r#"{{ "markdownOptions": {{ "fileLevel": "package", "indexTitle": "Docs" }} }}"#
    )
    .unwrap();

    generate(&out, &["-c", config.path().to_str().unwrap()]).success();
    assert_eq!(
        listing(&out),
        ["index.md", "package-simple.md", "scope_package-child.md"]
    );
    assert!(read(&out, "index.md").contains("## Docs"));
}

#[test]
fn config_in_working_directory_is_picked_up() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("md");
    fs::write(
        dir.path().join("api-documenter.json"),
        r#"{ "markdownOptions": { "fileLevel": "model" } }"#,
    )
    .unwrap();

    generate(&out, &[]).success();
    assert_eq!(listing(&out), ["index.md"]);
}

#[test]
fn crlf_is_the_default_newline() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("md");
    cmd(dir.path())
        .args(["-i", &input_folder(), "-o", out.to_str().unwrap()])
        .assert()
        .success();
    assert!(read(&out, "index.md").contains("\r\n"));
}

#[test]
fn prefix_template_is_prepended() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("md");
    let prefix = dir.path().join("_prefix.md");
    fs::write(&prefix, "---\ntitle: ${name}\n---\n").unwrap();

    generate(&out, &["-p", prefix.to_str().unwrap()]).success();
    let page = read(&out, "package-simple.md");
    assert!(page.starts_with("---\ntitle: package-simple\n---\n<!-- Do not edit"));
}

#[test]
fn excluded_packages_are_skipped() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("md");
    generate(&out, &["--exclude", "@scope/*"])
        .success()
        .stderr(predicate::str::contains("skipping filtered package"));

    assert!(!listing(&out).iter().any(|n| n.starts_with("scope_")));
    assert!(!read(&out, "index.md").contains("package-child"));
}

#[test]
fn stale_output_is_cleared() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("md");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("old.md"), "stale").unwrap();

    generate(&out, &[]).success();
    assert!(!out.join("old.md").exists());
}

#[test]
fn rerun_produces_identical_output() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("md");
    generate(&out, &[]).success();
    let first = read(&out, "package-simple.widget.md");
    generate(&out, &[]).success();
    assert_eq!(read(&out, "package-simple.widget.md"), first);
}

// -- diagnostics --

#[test]
fn unresolved_link_warns_and_continues() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("md");
    generate(&out, &[])
        .success()
        .stderr(predicate::str::contains("unable to resolve reference"));

    let widget = read(&out, "package-simple.widget.md");
    assert!(widget.contains("and Missing."));
}

#[test]
fn missing_input_folder_fails() {
    let dir = TempDir::new().unwrap();
    cmd(dir.path())
        .args(["-i", "no-such-folder", "-o", "md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("the input folder does not exist"));
}

#[test]
fn unknown_file_level_is_rejected() {
    let dir = TempDir::new().unwrap();
    cmd(dir.path())
        .args(["-i", &input_folder(), "-l", "chapter"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown file level"));
}

#[test]
fn verbose_logs_progress() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("md");
    generate(&out, &["-v"])
        .success()
        .stderr(predicate::str::contains("generated"));
}
