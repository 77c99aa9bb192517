//! Compression detection and decoding for source files.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use zip::ZipArchive;

use crate::error::{IngestError, Result};

/// Container format of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Plain, uncompressed file.
    None,
    /// gzip stream (`.gz`).
    Gzip,
    /// ZIP archive holding a single data file (`.zip`).
    Zip,
}

impl Compression {
    /// Detects the compression from the file extension.
    #[must_use]
    pub fn detect(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.ends_with(".gz") {
            Self::Gzip
        } else if name.ends_with(".zip") {
            Self::Zip
        } else {
            Self::None
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::None => "plain",
            Self::Gzip => "gzip",
            Self::Zip => "ZIP",
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Reads a source file fully, decompressing it according to its extension.
pub fn read_decompressed(path: &Path) -> Result<Vec<u8>> {
    let compression = Compression::detect(path);
    tracing::debug!(path = %path.display(), %compression, "reading source file");

    let file = File::open(path).map_err(|e| IngestError::from_io(path, e))?;

    match compression {
        Compression::None => {
            let mut bytes = Vec::new();
            BufReader::new(file)
                .read_to_end(&mut bytes)
                .map_err(|e| IngestError::from_io(path, e))?;
            Ok(bytes)
        }
        Compression::Gzip => read_gzip(file, path),
        Compression::Zip => read_zip(file, path),
    }
}

/// Decodes a gzip stream, accepting concatenated members.
fn read_gzip(file: File, path: &Path) -> Result<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(BufReader::new(file));
    let mut bytes = Vec::new();
    decoder
        .read_to_end(&mut bytes)
        .map_err(|e| IngestError::Decompress {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(bytes)
}

/// Extracts the single data file of a ZIP archive.
///
/// Directory entries and macOS resource forks are ignored; anything other
/// than exactly one remaining entry is rejected.
fn read_zip(file: File, path: &Path) -> Result<Vec<u8>> {
    let decompress_err = |message: String| IngestError::Decompress {
        path: path.to_path_buf(),
        message,
    };

    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|e| decompress_err(e.to_string()))?;

    let data_files: Vec<String> = archive
        .file_names()
        .filter(|name| !name.ends_with('/') && !name.starts_with("__MACOSX/"))
        .map(String::from)
        .collect();

    let name = match data_files.as_slice() {
        [single] => single.clone(),
        [] => return Err(decompress_err("archive contains no data file".to_string())),
        many => {
            return Err(decompress_err(format!(
                "archive contains {} data files, expected one",
                many.len()
            )));
        }
    };

    let mut entry = archive
        .by_name(&name)
        .map_err(|e| decompress_err(e.to_string()))?;
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| decompress_err(format!("{name}: {e}")))?;

    tracing::debug!(path = %path.display(), entry = %name, bytes = bytes.len(), "extracted archive entry");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::Compression as GzLevel;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn gzip_bytes(content: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), GzLevel::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap()
    }

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_detect_compression() {
        assert_eq!(
            Compression::detect(Path::new("inputs/patients.csv.gz")),
            Compression::Gzip
        );
        assert_eq!(
            Compression::detect(Path::new("inputs/consultations.csv.ZIP")),
            Compression::Zip
        );
        assert_eq!(
            Compression::detect(Path::new("inputs/plain.csv")),
            Compression::None
        );
    }

    #[test]
    fn test_read_gzip() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.csv.gz", &gzip_bytes(b"a,b\n1,2\n"));
        assert_eq!(read_decompressed(&path).unwrap(), b"a,b\n1,2\n");
    }

    #[test]
    fn test_read_gzip_concatenated_members() {
        let dir = TempDir::new().unwrap();
        let mut bytes = gzip_bytes(b"a,b\n");
        bytes.extend(gzip_bytes(b"1,2\n"));
        let path = write_file(&dir, "multi.csv.gz", &bytes);
        assert_eq!(read_decompressed(&path).unwrap(), b"a,b\n1,2\n");
    }

    #[test]
    fn test_read_corrupt_gzip_is_decompress_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bad.csv.gz", b"definitely not gzip");
        let err = read_decompressed(&path).unwrap_err();
        assert!(matches!(err, IngestError::Decompress { .. }));
    }

    #[test]
    fn test_read_zip_single_entry() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "c.csv.zip",
            &zip_bytes(&[("consultations.csv", b"x,y\n3,4\n")]),
        );
        assert_eq!(read_decompressed(&path).unwrap(), b"x,y\n3,4\n");
    }

    #[test]
    fn test_read_zip_ignores_macos_metadata() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "c.csv.zip",
            &zip_bytes(&[
                ("consultations.csv", b"x\n1\n"),
                ("__MACOSX/._consultations.csv", b"junk"),
            ]),
        );
        assert_eq!(read_decompressed(&path).unwrap(), b"x\n1\n");
    }

    #[test]
    fn test_read_zip_rejects_multiple_entries() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "c.csv.zip",
            &zip_bytes(&[("a.csv", b"x\n"), ("b.csv", b"y\n")]),
        );
        let err = read_decompressed(&path).unwrap_err();
        assert!(matches!(err, IngestError::Decompress { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_decompressed(&dir.path().join("absent.csv.gz")).unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }
}
