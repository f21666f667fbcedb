use std::path::{Path, PathBuf};

/// Local directory with the logo and category pictures.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    dir: PathBuf,
}

impl MediaLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of an existing file named by `reference`. Only the file name part
    /// of the reference is used.
    pub async fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let name = Path::new(reference).file_name()?;
        let path = self.dir.join(name);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Some(path),
            Ok(false) => {
                tracing::warn!(path = %path.display(), "Media file is missing");
                None
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Media file is not accessible");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn resolves_by_file_name_only() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("lion.jpg"), b"jpg").unwrap();
        let media = MediaLibrary::new(dir.path());

        assert_eq!(
            media.resolve("media/images/lion.jpg").await,
            Some(dir.path().join("lion.jpg"))
        );
        assert_eq!(media.resolve("lion.jpg").await, Some(dir.path().join("lion.jpg")));
    }

    #[tokio::test]
    async fn missing_or_empty_reference_resolves_to_nothing() {
        let dir = tempdir().unwrap();
        let media = MediaLibrary::new(dir.path());

        assert_eq!(media.resolve("owl.jpg").await, None);
        assert_eq!(media.resolve("").await, None);
    }
}
