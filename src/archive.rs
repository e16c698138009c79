// src/archive.rs

//! BPM archive reader
//!
//! A `.bpm` file is a tar archive holding a `pkg.info` descriptor at its
//! root and, for binary packages, a `files.tar.gz` payload member. Archives
//! may additionally be gzip-compressed as a whole; this is detected from
//! the magic bytes. Only the requested member is streamed out, the rest of
//! the archive is skipped.

use crate::error::{Error, Result};
use crate::package::{PackageInfo, PACKAGE_INFO_FILE};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tar::Archive;
use tracing::debug;

/// File extension of BPM archives
pub const ARCHIVE_EXTENSION: &str = ".bpm";

/// Name of the installable payload member inside binary archives
pub const PAYLOAD_MEMBER: &str = "files.tar.gz";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

fn read_error(path: &Path, reason: impl ToString) -> Error {
    Error::ArchiveRead {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Open an archive, transparently decoding gzip
fn open_archive(path: &Path) -> Result<Archive<Box<dyn Read>>> {
    let file = File::open(path).map_err(|e| read_error(path, e))?;
    let mut reader = BufReader::new(file);

    let is_gzip = reader
        .fill_buf()
        .map_err(|e| read_error(path, e))?
        .starts_with(&GZIP_MAGIC);

    let reader: Box<dyn Read> = if is_gzip {
        Box::new(GzDecoder::new(reader))
    } else {
        Box::new(reader)
    };

    Ok(Archive::new(reader))
}

/// Whether an entry path names `member` at the archive root
fn is_root_member(entry_path: &Path, member: &str) -> bool {
    let normalized = entry_path.strip_prefix(".").unwrap_or(entry_path);
    normalized == Path::new(member)
}

/// Walk the archive until `member` is found and hand it to `visit`
///
/// Returns `Ok(None)` when the archive is readable but has no such member.
fn with_member<T>(
    path: &Path,
    member: &str,
    visit: impl FnOnce(&mut tar::Entry<'_, Box<dyn Read>>) -> Result<T>,
) -> Result<Option<T>> {
    let mut archive = open_archive(path)?;
    let entries = archive.entries().map_err(|e| read_error(path, e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| read_error(path, e))?;
        let entry_path = entry.path().map_err(|e| read_error(path, e))?.into_owned();

        if is_root_member(&entry_path, member) {
            return visit(&mut entry).map(Some);
        }
    }

    Ok(None)
}

/// Extract and parse the embedded `pkg.info` of an archive
pub fn read_package_info(path: &Path) -> Result<PackageInfo> {
    let data = with_member(path, PACKAGE_INFO_FILE, |entry| {
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| read_error(path, e))?;
        Ok(data)
    })?
    .ok_or_else(|| read_error(path, format!("{} entry not found", PACKAGE_INFO_FILE)))?;

    debug!("Read {} bytes of package info from {}", data.len(), path.display());
    PackageInfo::parse(&data)
}

/// Size of the `files.tar.gz` payload member as listed in the archive
///
/// `None` means the archive has no payload, which is a valid state for
/// packages without installable files; a corrupt archive is an error.
pub fn payload_size(path: &Path) -> Result<Option<u64>> {
    with_member(path, PAYLOAD_MEMBER, |entry| {
        entry.header().size().map_err(|e| read_error(path, e))
    })
}

/// Whether a path has the `.bpm` archive extension
pub fn is_archive_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(ARCHIVE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn append(builder: &mut tar::Builder<impl Write>, name: &str, data: &[u8]) {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, data).unwrap();
    }

    fn write_archive(path: &Path, members: &[(&str, &[u8])]) {
        let mut builder = tar::Builder::new(File::create(path).unwrap());
        for (name, data) in members {
            append(&mut builder, name, data);
        }
        builder.finish().unwrap();
    }

    #[test]
    fn test_read_package_info() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("foo-1.0-1-any.bpm");
        write_archive(
            &path,
            &[
                ("source.sh", b"echo hi\n"),
                ("pkg.info", b"name: foo\nversion: 1.0\n"),
            ],
        );

        let info = read_package_info(&path).unwrap();
        assert_eq!(info.name, "foo");
        assert_eq!(info.version, "1.0");
        assert_eq!(info.revision, 1);
    }

    #[test]
    fn test_dot_slash_prefix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("foo.bpm");
        write_archive(&path, &[("./pkg.info", b"name: foo\n")]);
        assert_eq!(read_package_info(&path).unwrap().name, "foo");
    }

    #[test]
    fn test_gzip_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("foo.bpm");
        let encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        append(&mut builder, "pkg.info", b"name: zipped\n");
        builder.into_inner().unwrap().finish().unwrap();

        assert_eq!(read_package_info(&path).unwrap().name, "zipped");
    }

    #[test]
    fn test_missing_package_info() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("foo.bpm");
        write_archive(&path, &[("source.sh", b"")]);
        assert!(matches!(
            read_package_info(&path),
            Err(Error::ArchiveRead { .. })
        ));
    }

    #[test]
    fn test_payload_size() {
        let dir = TempDir::new().unwrap();
        let with_payload = dir.path().join("a.bpm");
        write_archive(
            &with_payload,
            &[("pkg.info", b"name: a\n"), ("files.tar.gz", &[0u8; 1234])],
        );
        assert_eq!(payload_size(&with_payload).unwrap(), Some(1234));

        let without_payload = dir.path().join("b.bpm");
        write_archive(&without_payload, &[("pkg.info", b"name: b\n")]);
        assert_eq!(payload_size(&without_payload).unwrap(), None);
    }

    #[test]
    fn test_corrupt_archive_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.bpm");
        std::fs::write(&path, vec![0x42u8; 700]).unwrap();
        assert!(matches!(payload_size(&path), Err(Error::ArchiveRead { .. })));
    }

    #[test]
    fn test_archive_extension() {
        assert!(is_archive_path(Path::new("/r/binary/foo-1.0-1-x86_64.bpm")));
        assert!(!is_archive_path(Path::new("/r/binary/database.bpmdb")));
    }
}
