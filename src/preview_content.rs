//! Loads the selected note for the preview pane.

use tokio::io::AsyncReadExt;

use crate::error::Result;

/// Bytes scanned for NUL when deciding whether a file is binary.
const BINARY_SNIFF_BYTES: usize = 8192;

/// What the preview pane shows for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewContent {
    /// Plain text split into lines. `truncated` is set when the file is
    /// longer than the read limit.
    Text { lines: Vec<String>, truncated: bool },
    /// Content that is not UTF-8 text.
    Binary { size: u64 },
}

impl PreviewContent {
    /// Lines to draw in the pane.
    pub fn display_lines(&self) -> Vec<String> {
        match self {
            PreviewContent::Text { lines, truncated } => {
                let mut out = lines.clone();
                if *truncated {
                    out.push(String::new());
                    out.push("… (truncated)".to_string());
                }
                out
            }
            PreviewContent::Binary { size } => {
                vec![format!("Binary file ({}), no preview", format_size(*size))]
            }
        }
    }
}

/// Read at most `max_bytes` of `path` and classify it.
pub async fn load_preview(path: &str, max_bytes: u64) -> Result<PreviewContent> {
    let file = tokio::fs::File::open(path).await?;
    let size = file.metadata().await?.len();
    let mut buf = Vec::new();
    file.take(max_bytes).read_to_end(&mut buf).await?;
    let truncated = size > buf.len() as u64;
    Ok(classify(&buf, size, truncated))
}

fn classify(buf: &[u8], size: u64, truncated: bool) -> PreviewContent {
    let sniff = &buf[..buf.len().min(BINARY_SNIFF_BYTES)];
    if sniff.contains(&0) {
        return PreviewContent::Binary { size };
    }
    let text = match std::str::from_utf8(buf) {
        Ok(text) => text,
        // A cut can land inside a multi-byte character; keep the valid prefix.
        Err(e) if truncated && e.error_len().is_none() => {
            match std::str::from_utf8(&buf[..e.valid_up_to()]) {
                Ok(text) => text,
                Err(_) => return PreviewContent::Binary { size },
            }
        }
        Err(_) => return PreviewContent::Binary { size },
    };
    PreviewContent::Text {
        lines: text.lines().map(|line| line.replace('\t', "    ")).collect(),
        truncated,
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> String {
        let p = dir.path().join(name);
        std::fs::write(&p, bytes).unwrap();
        p.to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn text_file_is_split_into_lines() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "a.md", b"# Title\n\nbody\tline\n");
        let content = load_preview(&p, 1024).await.unwrap();
        assert_eq!(
            content,
            PreviewContent::Text {
                lines: vec!["# Title".into(), "".into(), "body    line".into()],
                truncated: false,
            }
        );
    }

    #[tokio::test]
    async fn long_file_is_capped() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "long.txt", "line\n".repeat(100).as_bytes());
        let content = load_preview(&p, 12).await.unwrap();
        match content {
            PreviewContent::Text { lines, truncated } => {
                assert!(truncated);
                assert_eq!(lines, vec!["line", "line", "li"]);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cap_inside_multibyte_char_keeps_prefix() {
        let dir = TempDir::new().unwrap();
        // "é" is two bytes; cap after the first one.
        let p = write(&dir, "u.txt", "aé".as_bytes());
        let content = load_preview(&p, 2).await.unwrap();
        assert_eq!(
            content,
            PreviewContent::Text {
                lines: vec!["a".into()],
                truncated: true,
            }
        );
    }

    #[tokio::test]
    async fn nul_bytes_mean_binary() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "img.png", &[0x89, b'P', b'N', b'G', 0, 0, 1]);
        assert_eq!(
            load_preview(&p, 1024).await.unwrap(),
            PreviewContent::Binary { size: 7 }
        );
    }

    #[tokio::test]
    async fn invalid_utf8_means_binary() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "latin1.txt", &[b'c', b'a', b'f', 0xe9, b'!']);
        assert!(matches!(
            load_preview(&p, 1024).await.unwrap(),
            PreviewContent::Binary { .. }
        ));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        assert!(load_preview("/nonexistent/x.md", 10).await.is_err());
    }

    #[test]
    fn display_lines_marks_truncation() {
        let content = PreviewContent::Text {
            lines: vec!["a".into()],
            truncated: true,
        };
        assert_eq!(content.display_lines(), vec!["a", "", "… (truncated)"]);
    }

    #[test]
    fn binary_placeholder_shows_size() {
        let content = PreviewContent::Binary { size: 2048 };
        assert_eq!(
            content.display_lines(),
            vec!["Binary file (2.00 KB), no preview"]
        );
    }
}
