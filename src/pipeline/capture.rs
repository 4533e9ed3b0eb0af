use std::path::Path;

/// Write an intermediate result to its capture file, if one is configured.
///
/// Failures are reported on stderr (unless `quiet`) and otherwise ignored:
/// a capture never stops the run. Returns whether the file was written.
pub async fn capture(path: Option<&Path>, text: &str, label: &str, quiet: bool) -> bool {
    let Some(path) = path else {
        return false;
    };

    match tokio::fs::write(path, text).await {
        Ok(()) => true,
        Err(e) => {
            if !quiet {
                eprintln!(
                    "deco: warning: could not write {label} to {}: {e}",
                    path.display()
                );
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_when_path_given() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk-clean.txt");

        assert!(capture(Some(&path), "cleaned", "cleanup", true).await);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "cleaned");
    }

    #[tokio::test]
    async fn no_path_is_noop() {
        assert!(!capture(None, "text", "cleanup", true).await);
    }

    #[tokio::test]
    async fn failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("x.txt");
        assert!(!capture(Some(&path), "text", "optimization", true).await);
    }

    #[tokio::test]
    async fn overwrites_previous_capture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.txt");
        std::fs::write(&path, "old contents that are longer").unwrap();

        capture(Some(&path), "new", "cleanup", true).await;
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
