use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use fs2::FileExt;
use tracing::debug;

use crate::dom::Element;

/// Atomically write content to a file using a temporary file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let temp = path.with_extension("xml.tmp");
    let mut file = File::create(&temp)
        .with_context(|| format!("Failed to create temporary file: {}", temp.display()))?;
    file.lock_exclusive()
        .context("Failed to acquire file lock")?;
    file.write_all(content)
        .context("Failed to write file content")?;
    file.sync_all().context("Failed to sync file")?;
    file.unlock().context("Failed to unlock file")?;
    fs::rename(&temp, path).with_context(|| format!("Failed to rename to {}", path.display()))?;
    Ok(())
}

/// A configuration XML file loaded into memory.
pub struct Document {
    path: PathBuf,
    root: Element,
}

impl Document {
    /// Open and parse an existing XML file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.is_file() {
            bail!("Configuration file does not exist: {}", path.display());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let root = Element::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        debug!(path = %path.display(), root = root.name(), "opened document");
        Ok(Self { path, root })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Write the document back to the file it was opened from.
    pub fn save(&self) -> Result<()> {
        let mut content = Vec::new();
        self.root
            .write_document(&mut content)
            .context("Failed to serialize document")?;
        content.push(b'\n');
        atomic_write(&self.path, &content)?;
        debug!(path = %self.path.display(), "saved document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    /// A temp directory holding `job.xml` with one rake task.
    #[fixture]
    fn job_file() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job.xml");
        fs::write(
            &path,
            r#"<job name="build"><tasks><rake target="default" /></tasks></job>"#,
        )
        .unwrap();
        (dir, path)
    }

    // -- atomic_write --

    // atomic_write should persist exact byte content to disk via
    // tmp-file-then-rename, handling normal text, newlines, and empty content.
    #[rstest]
    #[case::plain_text(b"hello" as &[u8], "hello")]
    #[case::with_newlines(b"line1\nline2", "line1\nline2")]
    #[case::empty(b"", "")]
    fn atomic_write_persists_content(#[case] input: &[u8], #[case] expected: &str) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.xml");
        atomic_write(&path, input).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), expected);
    }

    // Writing to the same path twice should replace the content, not append.
    #[rstest]
    fn atomic_write_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.xml");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    // The temporary file used during the write should be cleaned up by the
    // rename; it must not remain on disk.
    #[rstest]
    fn atomic_write_no_leftover_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.xml");
        atomic_write(&path, b"data").unwrap();
        assert!(!path.with_extension("xml.tmp").exists());
    }

    // -- open / save --

    #[rstest]
    fn open_parses_root(job_file: (TempDir, PathBuf)) {
        let (_dir, path) = job_file;
        let document = Document::open(&path).unwrap();

        assert_eq!(document.root().name(), "job");
        assert_eq!(document.root().attr("name"), Some("build"));
        assert_eq!(document.path(), path.as_path());
    }

    // Changes made through root_mut should be visible after reopening.
    #[rstest]
    fn save_persists_changes(job_file: (TempDir, PathBuf)) {
        let (_dir, path) = job_file;
        let mut document = Document::open(&path).unwrap();
        document.root_mut().set_attr("timeout", "5");
        document.save().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<?xml"));

        let reopened = Document::open(&path).unwrap();
        assert_eq!(reopened.root().attr("timeout"), Some("5"));
        assert!(reopened.root().find("tasks").is_some());
    }

    #[rstest]
    fn open_nonexistent_file_fails() {
        assert!(Document::open("/tmp/definitely_does_not_exist_gocd_tasks.xml").is_err());
    }

    #[rstest]
    fn open_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xml");
        fs::write(&path, "<job><tasks></job>").unwrap();

        let err = Document::open(&path).err().unwrap();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
