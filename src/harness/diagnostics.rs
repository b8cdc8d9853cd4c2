//! Failure diagnostics
//!
//! A failing attempt captures the current page as a PNG before teardown, so
//! the reported failure carries what the browser was actually showing.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::session::Session;
use crate::Result;

/// Capture a page snapshot for a failed attempt.
///
/// The file lands in `artifact_dir` under a name carrying the case, the
/// attempt number, and a UTC timestamp.
pub async fn capture_failure_snapshot(
    session: &Arc<dyn Session>,
    artifact_dir: &Path,
    case_name: &str,
    attempt: u32,
) -> Result<PathBuf> {
    let png = session.screenshot_png().await?;

    std::fs::create_dir_all(artifact_dir)?;

    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3fZ");
    let path = artifact_dir.join(format!(
        "{}_attempt{}_{}.png",
        sanitize(case_name),
        attempt,
        stamp
    ));

    std::fs::write(&path, png)?;
    info!("Captured failure snapshot: {}", path.display());

    Ok(path)
}

/// Keep file names portable: anything outside [A-Za-z0-9_-] becomes '-'
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock::MockSession;

    #[test]
    fn test_sanitize_keeps_safe_chars() {
        assert_eq!(sanitize("full_flow-2"), "full_flow-2");
        assert_eq!(sanitize("docs search / pagination"), "docs-search---pagination");
    }

    #[tokio::test]
    async fn test_capture_writes_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let session = MockSession::new() as Arc<dyn Session>;

        let path = capture_failure_snapshot(&session, dir.path(), "full flow", 2)
            .await
            .unwrap();

        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("full-flow_attempt2_"));
        assert!(name.ends_with(".png"));

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }
}
