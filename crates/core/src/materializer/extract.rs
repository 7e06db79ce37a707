//! Archive recognition and extraction.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::debug;

use super::error::MaterializeError;

/// Archive formats the materializer can unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Zip,
}

/// Recognizes supported archives by file name.
pub fn archive_kind(file_name: &str) -> Option<ArchiveKind> {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
        Some(ArchiveKind::TarGz)
    } else if lower.ends_with(".zip") {
        Some(ArchiveKind::Zip)
    } else {
        None
    }
}

/// True for archive-looking files we do not unpack; these are logged
/// and skipped rather than uploaded raw.
pub fn is_unsupported_archive(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    [".rar", ".7z", ".tar.bz2", ".tar"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// Unpacks the archive into `dest` and returns the extracted regular
/// files as paths relative to `dest`. Synchronous; run on a blocking
/// thread.
pub fn extract_archive(
    kind: ArchiveKind,
    name: &str,
    data: &[u8],
    dest: &Path,
) -> Result<Vec<PathBuf>, MaterializeError> {
    match kind {
        ArchiveKind::TarGz => {
            let decoder = GzDecoder::new(data);
            let mut archive = tar::Archive::new(decoder);
            archive
                .unpack(dest)
                .map_err(|e| MaterializeError::archive(name, e))?;
        }
        ArchiveKind::Zip => {
            let mut archive = zip::ZipArchive::new(Cursor::new(data))
                .map_err(|e| MaterializeError::archive(name, e))?;
            archive
                .extract(dest)
                .map_err(|e| MaterializeError::archive(name, e))?;
        }
    }

    let mut files = Vec::new();
    collect_files(dest, dest, &mut files)?;
    files.sort();
    debug!(archive = name, count = files.len(), "extracted archive");
    Ok(files)
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(root, &path, out)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            out.push(relative.to_path_buf());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tar_gz_fixture(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(flate2::write::GzEncoder::new(
            Vec::new(),
            flate2::Compression::default(),
        ));
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn zip_fixture(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_archive_kind_recognition() {
        assert_eq!(archive_kind("scene.tar.gz"), Some(ArchiveKind::TarGz));
        assert_eq!(archive_kind("SCENE.TGZ"), Some(ArchiveKind::TarGz));
        assert_eq!(archive_kind("scene.zip"), Some(ArchiveKind::Zip));
        assert_eq!(archive_kind("scene.tif"), None);
        assert!(is_unsupported_archive("scene.rar"));
        assert!(is_unsupported_archive("scene.tar"));
        assert!(!is_unsupported_archive("scene.tar.gz"));
    }

    #[test]
    fn test_tar_gz_extraction_preserves_layout() {
        let data = tar_gz_fixture(&[
            ("product/image.tif", b"tif-bytes".as_slice()),
            ("product/meta/annotation.xml", b"<xml/>".as_slice()),
        ]);
        let tmp = tempfile::tempdir().unwrap();
        let files =
            extract_archive(ArchiveKind::TarGz, "scene.tar.gz", &data, tmp.path()).unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("product/image.tif"),
                PathBuf::from("product/meta/annotation.xml"),
            ]
        );
        assert_eq!(
            std::fs::read(tmp.path().join("product/image.tif")).unwrap(),
            b"tif-bytes"
        );
    }

    #[test]
    fn test_zip_extraction() {
        let data = zip_fixture(&[("image.tif", b"tif".as_slice()), ("meta.xml", b"x".as_slice())]);
        let tmp = tempfile::tempdir().unwrap();
        let files = extract_archive(ArchiveKind::Zip, "scene.zip", &data, tmp.path()).unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("image.tif"), PathBuf::from("meta.xml")]
        );
    }

    #[test]
    fn test_corrupt_archive_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let err = extract_archive(ArchiveKind::Zip, "bad.zip", b"not a zip", tmp.path())
            .unwrap_err();
        assert!(matches!(err, MaterializeError::Archive { .. }));
    }
}
