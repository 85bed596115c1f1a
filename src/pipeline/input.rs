//! Input resolution: a user-supplied path or URL → validated PDF bytes.
//!
//! pdfium opens documents from a byte slice, so both sources end up as an
//! in-memory buffer. The `%PDF` magic is checked here so callers get a clear
//! error instead of a pdfium parse failure.

use crate::error::SplitError;
use std::path::PathBuf;
use tracing::{debug, info};

/// PDF bytes plus a display name for messages.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    /// File name for local inputs, last URL segment for downloads.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve `input` to PDF bytes, downloading it when it is a URL.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, SplitError> {
    let resolved = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        read_local(input).await?
    };
    check_magic(&resolved.name, &resolved.bytes)?;
    Ok(resolved)
}

/// Reject buffers that do not start with `%PDF`.
pub fn check_magic(name: &str, bytes: &[u8]) -> Result<(), SplitError> {
    if bytes.starts_with(b"%PDF") {
        Ok(())
    } else {
        Err(SplitError::NotAPdf {
            source_name: name.to_string(),
            magic: bytes.iter().take(4).copied().collect(),
        })
    }
}

async fn read_local(path_str: &str) -> Result<ResolvedInput, SplitError> {
    let path = PathBuf::from(path_str);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(SplitError::PermissionDenied { path });
        }
        Err(_) => return Err(SplitError::FileNotFound { path }),
    };

    debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path_str.to_string());
    Ok(ResolvedInput { name, bytes })
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, SplitError> {
    info!("Downloading PDF from: {}", url);

    let failed = |reason: String| SplitError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            SplitError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            SplitError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(ResolvedInput {
        name: filename_from_url(url),
        bytes: bytes.to_vec(),
    })
}

/// Last path segment of `url` when it looks like a file name.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn filename_from_url_segments() {
        assert_eq!(filename_from_url("https://x.test/r/report.pdf?x=1"), "report.pdf");
        assert_eq!(filename_from_url("https://x.test/download/"), "downloaded.pdf");
    }

    #[test]
    fn magic_check() {
        assert!(check_magic("a.pdf", b"%PDF-1.7\n").is_ok());
        match check_magic("a.docx", b"PK\x03\x04rest") {
            Err(SplitError::NotAPdf { magic, .. }) => assert_eq!(magic, b"PK\x03\x04"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
        assert!(matches!(check_magic("empty", b""), Err(SplitError::NotAPdf { .. })));
    }

    #[tokio::test]
    async fn missing_local_file() {
        let err = resolve_input("/definitely/not/here.pdf", 5).await.unwrap_err();
        assert!(matches!(err, SplitError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn local_file_is_read_and_checked() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.4 fake").unwrap();
        let resolved = resolve_input(f.path().to_str().unwrap(), 5).await.unwrap();
        assert_eq!(resolved.bytes, b"%PDF-1.4 fake");

        let mut g = tempfile::NamedTempFile::new().unwrap();
        g.write_all(b"hello").unwrap();
        let err = resolve_input(g.path().to_str().unwrap(), 5).await.unwrap_err();
        assert!(matches!(err, SplitError::NotAPdf { .. }));
    }
}
