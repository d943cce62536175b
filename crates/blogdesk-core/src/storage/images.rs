//! Content-addressed image storage
//!
//! Post records hold a `BlobRef` instead of inline image bytes. Blobs live
//! in `<data_dir>/images/`, named by the hex BLAKE3 hash of their content,
//! so identical uploads share one file.
//!
//! The upload contract is checked here, at the blob boundary: JPEG or PNG
//! only (sniffed from the leading bytes), at most `MAX_IMAGE_BYTES`.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::error::StorageError;
use super::kv::atomic_write;

/// Largest accepted image (1 MiB)
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Length of a hex-encoded BLAKE3 hash
const HASH_HEX_LEN: usize = 64;

/// Errors from the image store
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Only JPG and PNG images are allowed (got {0})")]
    UnsupportedType(String),

    #[error("Image must be less than 1MB (got {size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Invalid image hash: '{0}'")]
    InvalidHash(String),

    #[error("Image blob not found: {0}")]
    MissingBlob(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Accepted image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Jpeg,
    Png,
}

impl ImageType {
    pub fn mime(&self) -> &'static str {
        match self {
            ImageType::Jpeg => "image/jpeg",
            ImageType::Png => "image/png",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" => Some(ImageType::Jpeg),
            "image/png" => Some(ImageType::Png),
            _ => None,
        }
    }

    /// Detect the format from the leading bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&PNG_SIGNATURE) {
            Some(ImageType::Png)
        } else if bytes.starts_with(&JPEG_SIGNATURE) {
            Some(ImageType::Jpeg)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Reference to a stored image blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRef {
    /// Hex BLAKE3 hash of the content
    pub hash: String,
    pub media_type: ImageType,
}

/// Check bytes against the upload contract
///
/// Returns the detected format.
pub fn check_image(bytes: &[u8]) -> Result<ImageType, ImageError> {
    let image_type = ImageType::sniff(bytes)
        .ok_or_else(|| ImageError::UnsupportedType("unrecognized format".to_string()))?;

    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge {
            size: bytes.len(),
            max: MAX_IMAGE_BYTES,
        });
    }

    Ok(image_type)
}

/// Content-addressed blob directory for post images
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store image bytes, returning a reference to them
    ///
    /// Storing the same bytes twice returns the same reference and writes
    /// nothing the second time.
    pub fn put(&self, bytes: &[u8]) -> Result<BlobRef, ImageError> {
        let media_type = check_image(bytes)?;
        let hash = blake3::hash(bytes).to_hex().to_string();
        let path = self.dir.join(&hash);

        if !path.exists() {
            atomic_write(&path, bytes)?;
            debug!("Stored image blob {} ({} bytes)", hash, bytes.len());
        }

        Ok(BlobRef { hash, media_type })
    }

    /// Store an inline `data:<mime>;base64,<payload>` image
    pub fn put_data_url(&self, data_url: &str) -> Result<BlobRef, ImageError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| ImageError::InvalidDataUrl("missing 'data:' prefix".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::InvalidDataUrl("missing ',' separator".to_string()))?;
        let mime = header.strip_suffix(";base64").ok_or_else(|| {
            ImageError::InvalidDataUrl("only base64 payloads are supported".to_string())
        })?;
        let declared =
            ImageType::from_mime(mime).ok_or_else(|| ImageError::UnsupportedType(mime.to_string()))?;

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| ImageError::InvalidDataUrl(e.to_string()))?;

        let blob = self.put(&bytes)?;
        if blob.media_type != declared {
            warn!(
                "Data URL declared {} but content is {}",
                declared, blob.media_type
            );
        }
        Ok(blob)
    }

    /// Read the bytes of a stored blob
    pub fn get(&self, blob: &BlobRef) -> Result<Vec<u8>, ImageError> {
        let path = self.blob_path(&blob.hash)?;
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ImageError::MissingBlob(blob.hash.clone()),
            _ => StorageError::from_read(e, path).into(),
        })
    }

    /// Check if a blob is present
    pub fn contains(&self, blob: &BlobRef) -> bool {
        self.blob_path(&blob.hash)
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Delete every blob whose hash is not in `referenced`
    ///
    /// Returns the number of blobs removed. Files that are not blobs
    /// (leftover temp files, stray names) are left alone.
    pub fn prune(&self, referenced: &HashSet<String>) -> Result<usize, ImageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StorageError::from_read(e, self.dir.clone()).into()),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::from_read(e, self.dir.clone()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_blob_name(&name) || referenced.contains(&name) {
                continue;
            }

            let path = entry.path();
            fs::remove_file(&path).map_err(|e| StorageError::from_io(e, path.clone()))?;
            debug!("Pruned image blob {}", name);
            removed += 1;
        }

        Ok(removed)
    }

    fn blob_path(&self, hash: &str) -> Result<PathBuf, ImageError> {
        if !is_blob_name(hash) {
            return Err(ImageError::InvalidHash(hash.to_string()));
        }
        Ok(self.dir.join(hash))
    }
}

fn is_blob_name(name: &str) -> bool {
    name.len() == HASH_HEX_LEN && name.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn png_bytes(extra: &[u8]) -> Vec<u8> {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(extra);
        bytes
    }

    fn jpeg_bytes() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F']
    }

    #[test]
    fn test_sniff() {
        assert_eq!(ImageType::sniff(&png_bytes(b"x")), Some(ImageType::Png));
        assert_eq!(ImageType::sniff(&jpeg_bytes()), Some(ImageType::Jpeg));
        assert_eq!(ImageType::sniff(b"GIF89a"), None);
        assert_eq!(ImageType::sniff(b""), None);
    }

    #[test]
    fn test_put_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = ImageStore::new(temp_dir.path().join("images"));

        let bytes = png_bytes(b"pixels");
        let blob = store.put(&bytes).unwrap();

        assert_eq!(blob.media_type, ImageType::Png);
        assert_eq!(blob.hash.len(), 64);
        assert!(store.contains(&blob));
        assert_eq!(store.get(&blob).unwrap(), bytes);
    }

    #[test]
    fn test_put_dedupes_identical_content() {
        let temp_dir = TempDir::new().unwrap();
        let store = ImageStore::new(temp_dir.path());

        let a = store.put(&jpeg_bytes()).unwrap();
        let b = store.put(&jpeg_bytes()).unwrap();
        assert_eq!(a, b);

        let files = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(files, 1);
    }

    #[test]
    fn test_rejects_unsupported_type() {
        let temp_dir = TempDir::new().unwrap();
        let store = ImageStore::new(temp_dir.path());

        let err = store.put(b"GIF89a....").unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedType(_)));
    }

    #[test]
    fn test_size_limit() {
        let exact = png_bytes(&vec![0u8; MAX_IMAGE_BYTES - PNG_SIGNATURE.len()]);
        assert_eq!(exact.len(), MAX_IMAGE_BYTES);
        assert!(check_image(&exact).is_ok());

        let over = png_bytes(&vec![0u8; MAX_IMAGE_BYTES]);
        let err = check_image(&over).unwrap_err();
        assert!(matches!(err, ImageError::TooLarge { .. }));
    }

    #[test]
    fn test_put_data_url() {
        let temp_dir = TempDir::new().unwrap();
        let store = ImageStore::new(temp_dir.path());

        let bytes = png_bytes(b"inline");
        let url = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));
        let blob = store.put_data_url(&url).unwrap();

        assert_eq!(blob.media_type, ImageType::Png);
        assert_eq!(store.get(&blob).unwrap(), bytes);
    }

    #[test]
    fn test_put_data_url_errors() {
        let temp_dir = TempDir::new().unwrap();
        let store = ImageStore::new(temp_dir.path());

        assert!(matches!(
            store.put_data_url("https://example.com/a.png"),
            Err(ImageError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            store.put_data_url("data:image/gif;base64,R0lGODlh"),
            Err(ImageError::UnsupportedType(_))
        ));
        assert!(matches!(
            store.put_data_url("data:image/png;base64,@@@"),
            Err(ImageError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn test_get_missing_and_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let store = ImageStore::new(temp_dir.path());

        let missing = BlobRef {
            hash: "0".repeat(64),
            media_type: ImageType::Png,
        };
        assert!(matches!(store.get(&missing), Err(ImageError::MissingBlob(_))));

        let traversal = BlobRef {
            hash: "../../etc/passwd".to_string(),
            media_type: ImageType::Png,
        };
        assert!(matches!(store.get(&traversal), Err(ImageError::InvalidHash(_))));
        assert!(!store.contains(&traversal));
    }

    #[test]
    fn test_prune_keeps_referenced() {
        let temp_dir = TempDir::new().unwrap();
        let store = ImageStore::new(temp_dir.path());

        let keep = store.put(&png_bytes(b"keep")).unwrap();
        let stale = store.put(&png_bytes(b"drop")).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "not a blob").unwrap();

        let referenced: HashSet<String> = [keep.hash.clone()].into_iter().collect();
        let removed = store.prune(&referenced).unwrap();

        assert_eq!(removed, 1);
        assert!(store.contains(&keep));
        assert!(!store.contains(&stale));
        assert!(temp_dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_prune_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let store = ImageStore::new(temp_dir.path().join("never-created"));
        assert_eq!(store.prune(&HashSet::new()).unwrap(), 0);
    }
}
