use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use super::{AttachmentUpload, BlobStore};
use crate::error::{ComplaintError, Result, StorageError, ValidationErrors};
use crate::sanitize::redact_path;

/// Attempts before giving up on finding a free name.
const MAX_NAME_ATTEMPTS: usize = 16;

/// Blob store writing into a single upload directory.
pub struct FileBlobStore {
    directory: PathBuf,
    max_file_bytes: u64,
}

impl FileBlobStore {
    pub fn new<P: AsRef<Path>>(directory: P, max_file_bytes: u64) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            max_file_bytes,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn ensure_directory(&self) -> std::result::Result<(), StorageError> {
        if !self.directory.exists() {
            std::fs::create_dir_all(&self.directory).map_err(|e| {
                StorageError::CreateDirectory {
                    path: self.directory.clone(),
                    source: e,
                }
            })?;
        }
        Ok(())
    }

    /// Creates the file exclusively, retrying with a new random part when
    /// the name is taken.
    fn write_new(&self, extension: &str, bytes: &[u8]) -> std::result::Result<String, StorageError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = generate_name(extension);
            let path = self.directory.join(&filename);

            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    if let Err(e) = file.write_all(bytes) {
                        let _ = std::fs::remove_file(&path);
                        return Err(StorageError::WriteFile { path, source: e });
                    }
                    return Ok(filename);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(StorageError::WriteFile { path, source: e }),
            }
        }
        Err(StorageError::NameExhausted(self.directory.clone()))
    }
}

/// Stored names may not leave the upload directory.
fn check_name(filename: &str) -> Result<()> {
    let plain = !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\', '\0']);
    if plain {
        Ok(())
    } else {
        Err(ValidationErrors::single("filename", "Invalid attachment filename").into())
    }
}

/// Lowercased `.ext` of the original name, or empty.
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// `<unix-millis>-<random><ext>`.
fn generate_name(extension: &str) -> String {
    let random = uuid::Uuid::new_v4().as_u128() % 1_000_000_000;
    format!("{}-{}{}", Utc::now().timestamp_millis(), random, extension)
}

impl BlobStore for FileBlobStore {
    fn persist(&self, original_name: &str, bytes: &[u8]) -> Result<AttachmentUpload> {
        let size = bytes.len() as u64;
        if size > self.max_file_bytes {
            return Err(ValidationErrors::single(
                "attachments",
                &format!(
                    "'{}' exceeds the {} byte limit",
                    original_name, self.max_file_bytes
                ),
            )
            .into());
        }

        self.ensure_directory()?;
        let filename = self.write_new(&extension_of(original_name), bytes)?;
        let mime_type = mime_guess::from_path(original_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        debug!(filename = %filename, size, mime_type = %mime_type, "Persisted upload");
        Ok(AttachmentUpload {
            filename,
            original_name: original_name.to_string(),
            mime_type,
            size,
        })
    }

    fn discard(&self, filename: &str) -> Result<()> {
        check_name(filename)?;
        let path = self.directory.join(filename);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(file = %redact_path(&path), "Discarded upload");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(file = %redact_path(&path), error = %e, "Failed to discard upload");
                Err(StorageError::RemoveFile { path, source: e }.into())
            }
        }
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        check_name(filename)?;
        let path = self.directory.join(filename);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ComplaintError::not_found(format!("Attachment '{}'", filename)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LIMIT: u64 = 1024;

    #[test]
    fn test_persist_writes_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(temp_dir.path().join("uploads"), LIMIT);

        let upload = store.persist("Foto Jalan.JPG", b"jpeg bytes").unwrap();
        assert!(upload.filename.ends_with(".jpg"));
        assert_eq!(upload.original_name, "Foto Jalan.JPG");
        assert_eq!(upload.mime_type, "image/jpeg");
        assert_eq!(upload.size, 10);

        let path = store.resolve(&upload.filename).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn test_generated_names_are_unique() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(temp_dir.path(), LIMIT);

        let a = store.persist("a.pdf", b"1").unwrap();
        let b = store.persist("a.pdf", b"2").unwrap();
        assert_ne!(a.filename, b.filename);
        assert_eq!(a.mime_type, "application/pdf");
    }

    #[test]
    fn test_name_shape() {
        let name = generate_name(".png");
        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert!(rest.ends_with(".png"));
        assert!(rest.trim_end_matches(".png").parse::<u64>().is_ok());
    }

    #[test]
    fn test_oversized_rejected_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(temp_dir.path(), 4);

        let err = store.persist("big.png", b"12345").unwrap_err();
        assert!(matches!(err, ComplaintError::Validation(_)));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_discard_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(temp_dir.path(), LIMIT);

        let upload = store.persist("bukti.pdf", b"pdf").unwrap();
        store.discard(&upload.filename).unwrap();
        store.discard(&upload.filename).unwrap();
        assert!(matches!(
            store.resolve(&upload.filename),
            Err(ComplaintError::NotFound(_))
        ));
    }

    #[test]
    fn test_traversal_names_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(temp_dir.path(), LIMIT);

        for name in ["../secret", "..", "", "a/b.png", "a\\b.png"] {
            assert!(
                matches!(store.resolve(name), Err(ComplaintError::Validation(_))),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_extension_sanitized() {
        assert_eq!(extension_of("scan.PDF"), ".pdf");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of("weird.p$f"), "");
    }
}
