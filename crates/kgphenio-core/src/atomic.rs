//! Staged in-place rewrites.
//!
//! A rewrite goes to `<file>.tmp` next to the target and only replaces the
//! target by `rename` once the staged copy is flushed and closed. Dropping an
//! uncommitted [`StagedFile`] deletes the staged copy, so an aborted run
//! leaves the original untouched and no debris behind.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct StagedFile {
    target: PathBuf,
    tmp: PathBuf,
    writer: Option<BufWriter<File>>,
}

/// `<target>.tmp`, in the same directory so the final rename never crosses
/// filesystems.
pub fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

impl StagedFile {
    pub fn create(target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        let tmp = staging_path(&target);
        let file = File::create(&tmp).map_err(|e| Error::io(&tmp, e))?;
        Ok(Self {
            target,
            tmp,
            writer: Some(BufWriter::new(file)),
        })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn staging(&self) -> &Path {
        &self.tmp
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_inner(bytes, None)
    }

    /// Like [`write_all`](Self::write_all), but failures name the source line
    /// being copied.
    pub fn write_all_at(&mut self, bytes: &[u8], line: usize) -> Result<()> {
        self.write_inner(bytes, Some(line))
    }

    fn write_inner(&mut self, bytes: &[u8], line: Option<usize>) -> Result<()> {
        let result = match self.writer.as_mut() {
            Some(w) => w.write_all(bytes),
            None => Err(std::io::Error::other("staged file already closed")),
        };
        result.map_err(|source| Error::Io {
            path: self.tmp.clone(),
            line,
            source,
        })
    }

    /// Flush, sync and close the staged copy without replacing the target.
    ///
    /// Used when several files must all be written before any is swapped in.
    pub fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            let file = writer
                .into_inner()
                .map_err(|e| Error::io(&self.tmp, e.into_error()))?;
            file.sync_all().map_err(|e| Error::io(&self.tmp, e))?;
        }
        Ok(())
    }

    /// Close the staged copy and rename it over the target.
    pub fn commit(mut self) -> Result<()> {
        self.finish()?;
        fs::rename(&self.tmp, &self.target).map_err(|e| Error::io(&self.target, e))?;
        // Nothing left to clean up; `Drop` sees the tmp path is gone.
        Ok(())
    }
}

/// `<target>.bak`, where an original waits while a group of files is swapped.
fn backup_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Replace every target, or none of them.
///
/// All staged copies are closed first. Existing originals are then moved to
/// `<target>.bak` and the staged copies renamed into place in order. If any
/// rename fails, targets already replaced are put back and the error is
/// returned.
pub fn commit_all(mut files: Vec<StagedFile>) -> Result<()> {
    for file in &mut files {
        file.finish()?;
    }

    let mut backups: Vec<(PathBuf, PathBuf)> = Vec::new();
    for file in &files {
        if !file.target.exists() {
            continue;
        }
        let backup = backup_path(&file.target);
        if let Err(e) = fs::rename(&file.target, &backup) {
            restore(&[], &backups);
            return Err(Error::io(&file.target, e));
        }
        backups.push((file.target.clone(), backup));
    }

    let mut placed: Vec<PathBuf> = Vec::new();
    for file in &files {
        if let Err(e) = fs::rename(&file.tmp, &file.target) {
            restore(&placed, &backups);
            return Err(Error::io(&file.target, e));
        }
        placed.push(file.target.clone());
    }

    for (_, backup) in &backups {
        if let Err(err) = fs::remove_file(backup) {
            tracing::warn!(path = %backup.display(), error = %err, "failed to remove backup");
        }
    }
    Ok(())
}

/// Undo a partial [`commit_all`]: drop targets that had no original, then
/// move every backup back.
fn restore(placed: &[PathBuf], backups: &[(PathBuf, PathBuf)]) {
    for target in placed {
        if backups.iter().any(|(t, _)| t == target) {
            continue;
        }
        if let Err(err) = fs::remove_file(target) {
            tracing::warn!(path = %target.display(), error = %err, "failed to remove new file");
        }
    }
    for (target, backup) in backups {
        if let Err(err) = fs::rename(backup, target) {
            tracing::error!(
                original = %target.display(),
                backup = %backup.display(),
                error = %err,
                "failed to restore original; it is still at the backup path"
            );
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        self.writer.take();
        if self.tmp.exists() {
            if let Err(err) = fs::remove_file(&self.tmp) {
                tracing::warn!(
                    path = %self.tmp.display(),
                    error = %err,
                    "failed to remove staged file"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn commit_replaces_target() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nodes.tsv");
        fs::write(&target, "old\n").unwrap();

        let mut staged = StagedFile::create(&target).unwrap();
        staged.write_all(b"new\n").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "old\n");
        staged.commit().unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new\n");
        assert!(!staging_path(&target).exists());
    }

    #[test]
    fn dropping_uncommitted_keeps_original() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("edges.tsv");
        fs::write(&target, "original\n").unwrap();

        {
            let mut staged = StagedFile::create(&target).unwrap();
            staged.write_all(b"partial").unwrap();
            staged.finish().unwrap();
            assert!(staged.staging().exists());
        }

        assert_eq!(fs::read_to_string(&target).unwrap(), "original\n");
        assert!(!staging_path(&target).exists());
    }

    #[test]
    fn write_errors_name_the_line() {
        let dir = tempdir().unwrap();
        let mut staged = StagedFile::create(dir.path().join("edges.tsv")).unwrap();
        staged.finish().unwrap();

        match staged.write_all_at(b"row\n", 7).unwrap_err() {
            Error::Io { path, line, .. } => {
                assert_eq!(path, staging_path(&dir.path().join("edges.tsv")));
                assert_eq!(line, Some(7));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn commit_all_replaces_every_target() {
        let dir = tempdir().unwrap();
        let nodes = dir.path().join("g_nodes.tsv");
        let edges = dir.path().join("g_edges.tsv");
        fs::write(&nodes, "old nodes\n").unwrap();

        let mut a = StagedFile::create(&edges).unwrap();
        a.write_all(b"new edges\n").unwrap();
        let mut b = StagedFile::create(&nodes).unwrap();
        b.write_all(b"new nodes\n").unwrap();
        commit_all(vec![a, b]).unwrap();

        assert_eq!(fs::read_to_string(&edges).unwrap(), "new edges\n");
        assert_eq!(fs::read_to_string(&nodes).unwrap(), "new nodes\n");
        assert!(!backup_path(&nodes).exists());
        assert!(!staging_path(&nodes).exists());
    }

    #[cfg(unix)]
    #[test]
    fn failed_rename_puts_earlier_targets_back() {
        let dir = tempdir().unwrap();
        let edges = dir.path().join("g_edges.tsv");
        fs::write(&edges, "old edges\n").unwrap();
        let other = dir.path().join("other");
        fs::create_dir(&other).unwrap();
        let nodes = other.join("g_nodes.tsv");
        fs::write(&nodes, "old nodes\n").unwrap();

        let mut a = StagedFile::create(&edges).unwrap();
        a.write_all(b"new edges\n").unwrap();
        let mut b = StagedFile::create(&nodes).unwrap();
        b.write_all(b"new nodes\n").unwrap();
        // The second rename has nowhere to go.
        fs::remove_dir_all(&other).unwrap();

        let err = commit_all(vec![a, b]).unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(fs::read_to_string(&edges).unwrap(), "old edges\n");
        assert!(!backup_path(&edges).exists());
        assert!(!staging_path(&edges).exists());
    }

    #[test]
    fn staging_path_appends_suffix() {
        assert_eq!(
            staging_path(Path::new("out/phenio_nodes.tsv")),
            PathBuf::from("out/phenio_nodes.tsv.tmp")
        );
    }
}
