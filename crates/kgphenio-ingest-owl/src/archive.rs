//! Unpacking compressed source artifacts (`.tar.gz`, `.zip`, `.gz`).

use flate2::read::GzDecoder;
use kgphenio_core::{Error, Result, StagedFile};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

fn archive_error(path: &Path, err: impl std::fmt::Display) -> Error {
    Error::Archive {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Extract every entry of a gzipped tarball into `dest`.
pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| Error::io(archive, e))?;
    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;
    tar::Archive::new(GzDecoder::new(file))
        .unpack(dest)
        .map_err(|e| archive_error(archive, e))?;
    tracing::info!(archive = %archive.display(), dest = %dest.display(), "extracted archive");
    Ok(())
}

/// Extract every entry of a zip archive into `dest`.
pub fn unzip_to_dir(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| Error::io(archive, e))?;
    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| archive_error(archive, e))?;
    zip.extract(dest).map_err(|e| archive_error(archive, e))?;
    tracing::info!(
        archive = %archive.display(),
        dest = %dest.display(),
        entries = zip.len(),
        "extracted zip archive"
    );
    Ok(())
}

/// Decompress `gz_path` into `dir`, dropping a trailing `.gz` from the name.
pub fn ungzip_to_dir(gz_path: &Path, dir: &Path) -> Result<PathBuf> {
    let name = gz_path
        .file_name()
        .ok_or_else(|| archive_error(gz_path, "path has no file name"))?
        .to_string_lossy();
    let out_name = name.strip_suffix(".gz").unwrap_or(&name);
    let out_path = dir.join(out_name);

    let file = File::open(gz_path).map_err(|e| Error::io(gz_path, e))?;
    let mut decoder = GzDecoder::new(file);
    let mut staged = StagedFile::create(&out_path)?;
    let mut chunk = vec![0u8; 64 * 1024];
    loop {
        let n = decoder
            .read(&mut chunk)
            .map_err(|e| archive_error(gz_path, e))?;
        if n == 0 {
            break;
        }
        staged.write_all(&chunk[..n])?;
    }
    staged.commit()?;
    Ok(out_path)
}
