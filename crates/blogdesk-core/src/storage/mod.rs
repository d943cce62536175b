//! Storage layer
//!
//! Handles durable key-value persistence for the post collections and the
//! content-addressed image blob store.
//!
//! ## Layout
//!
//! - `<data_dir>/blog-admin-blogs.json`: active posts (JSON array)
//! - `<data_dir>/blog-admin-trash.json`: trashed posts (JSON array)
//! - `<data_dir>/images/<blake3-hex>`: image blobs
//!
//! Files are written atomically (temp file, fsync, rename).

pub mod error;
pub mod images;
pub mod kv;

pub use error::{StorageError, StorageResult};
pub use images::{check_image, BlobRef, ImageError, ImageStore, ImageType, MAX_IMAGE_BYTES};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
