use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::File;
use std::path::Path;

/// A `slidegen` command isolated from the user's config and credentials.
fn slidegen(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("slidegen").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("SLIDEGEN_LOG_PATH", home.join("slidegen.log"))
        .env_remove("GOOGLE_API_KEY")
        .env_remove("SLIDEGEN_MODEL")
        .env_remove("SLIDEGEN_API_BASE")
        .env_remove("SLIDEGEN_OUTPUT_DIR");
    cmd
}

fn slide_parts(path: &Path) -> usize {
    let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .count()
}

#[test]
fn help_lists_subcommands() {
    let home = tempfile::tempdir().unwrap();
    slidegen(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("preview"));
}

#[test]
fn generate_from_content_file_writes_deck() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("decks");
    let content = home.path().join("content.txt");
    std::fs::write(&content, "Generative models produce text and images. ".repeat(40)).unwrap();

    slidegen(home.path())
        .args(["generate", "--title", "Gen AI", "--topic", "Intro", "--topic", "Uses"])
        .arg("--content-file")
        .arg(&content)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Gen_AI.pptx"));

    let deck = out.join("Gen_AI.pptx");
    assert!(deck.exists());
    // 1720 characters at the default 900-character limit: two chunks per topic.
    assert_eq!(slide_parts(&deck), 1 + 2 * 2);
}

#[test]
fn marker_mode_names_deck_for_download() {
    let home = tempfile::tempdir().unwrap();
    let content = home.path().join("content.txt");
    std::fs::write(
        &content,
        "**Slide 1: Intro**\n* What\n* Why\n\n**Slide 2: Uses**\n* Chat\n\n",
    )
    .unwrap();

    slidegen(home.path())
        .args(["generate", "--title", "Deck", "--topic", "AI", "--mode", "markers"])
        .arg("--content-file")
        .arg(&content)
        .arg("--output-dir")
        .arg(home.path())
        .assert()
        .success();

    let deck = home.path().join("Deck_presentation.pptx");
    assert_eq!(slide_parts(&deck), 3);
}

#[test]
fn missing_api_key_reports_error_and_writes_nothing() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("decks");

    slidegen(home.path())
        .args(["generate", "--topic", "Intro"])
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Missing API key."));

    assert!(!out.join("Gen_AI.pptx").exists());
}

#[test]
fn generate_without_topics_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    slidegen(home.path())
        .args(["generate", "--topic", "   "])
        .arg("--output-dir")
        .arg(home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter at least one topic."));
}

#[test]
fn api_key_is_read_from_dotenv_file() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("decks");
    // Nothing listens on the discard port, so the call fails after the key is found.
    std::fs::write(
        home.path().join(".env"),
        "GOOGLE_API_KEY=from-dotenv\nSLIDEGEN_API_BASE=http://127.0.0.1:9/v1beta\n",
    )
    .unwrap();

    slidegen(home.path())
        .args(["generate", "--topic", "Intro"])
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error generating content."))
        .stderr(predicate::str::contains("Missing API key").not());

    assert!(!out.join("Gen_AI.pptx").exists());
}

#[test]
fn init_config_writes_user_config_file() {
    let home = tempfile::tempdir().unwrap();
    slidegen(home.path())
        .args(["--model", "gemini-pro", "init-config"])
        .env("GOOGLE_API_KEY", "not-persisted")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));

    let written = home.path().join(".config").join("slidegen").join("config.json");
    let contents = std::fs::read_to_string(written).unwrap();
    assert!(contents.contains("gemini-pro"));
    assert!(!contents.contains("not-persisted"));
}
