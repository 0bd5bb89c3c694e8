use std::io;
use std::path::{Path, PathBuf};

pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Turn a presentation title into a file stem: spaces become underscores and
/// characters that are not allowed in file names are replaced as well.
pub fn sanitize_title(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        "presentation".to_string()
    } else {
        stem
    }
}

/// File name used when a deck is written straight to the output directory.
pub fn deck_file_name(title: &str) -> String {
    format!("{}.pptx", sanitize_title(title))
}

/// File name offered for decks rendered in memory and handed out as a download.
pub fn download_file_name(title: &str) -> String {
    format!("{}_presentation.pptx", sanitize_title(title))
}

/// Ensure the output directory exists
pub async fn ensure_output_dir<P: AsRef<Path>>(dir: P) -> io::Result<()> {
    let path = dir.as_ref();
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        tokio::fs::create_dir_all(path).await?;
    }
    Ok(())
}

/// Write deck bytes into `dir`, replacing any earlier file of the same name.
pub async fn save_deck<P: AsRef<Path>>(dir: P, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    let dir = dir.as_ref();
    ensure_output_dir(dir).await?;

    let file_path = dir.join(file_name);
    tokio::fs::write(&file_path, bytes).await?;
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Gen AI"), "Gen_AI");
        assert_eq!(sanitize_title("  Q3 Review  "), "Q3_Review");
        assert_eq!(sanitize_title("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_title("日本語 タイトル"), "日本語_タイトル");
        assert_eq!(sanitize_title(""), "presentation");
        assert_eq!(sanitize_title(".."), "presentation");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(deck_file_name("Gen AI"), "Gen_AI.pptx");
        assert_eq!(download_file_name("Gen AI"), "Gen_AI_presentation.pptx");
    }

    #[tokio::test]
    async fn save_deck_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("decks");

        let first = save_deck(&out, "Gen_AI.pptx", b"first").await.unwrap();
        let second = save_deck(&out, "Gen_AI.pptx", b"second").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second).unwrap(), b"second");
    }
}
