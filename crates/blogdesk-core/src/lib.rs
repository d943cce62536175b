//! blogdesk Core Library
//!
//! This crate provides the core functionality for blogdesk, a local blog
//! administration tool with a soft-delete trash and timed auto-purge.
//!
//! # Architecture
//!
//! - **BlogStore**: single owner of the active and trashed collections
//! - **KeyValueStore**: persistence seam; one JSON record per collection
//! - **ImageStore**: content-addressed blobs for uploaded images
//!
//! Every mutation is persisted before subscribers are notified.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = BlogStore::open()?;
//!
//! // Create a post
//! let post = store.create(NewPost::new("Hello", "First post", "Me"))?;
//!
//! // Trash and restore it
//! store.soft_delete(&post.id)?;
//! store.restore(&post.id)?;
//! ```
//!
//! # Modules
//!
//! - `store`: the blog store (main entry point)
//! - `models`: posts, trashed posts, create and update inputs
//! - `storage`: key-value persistence and image blobs
//! - `retention`: the auto-purge rule
//! - `events`: change subscriptions
//! - `validation`: post form rules
//! - `query`: list filtering and pagination
//! - `stats`: dashboard statistics
//! - `config`: application configuration

pub mod clock;
pub mod config;
pub mod events;
pub mod models;
pub mod query;
pub mod retention;
pub mod seed;
pub mod stats;
pub mod storage;
pub mod store;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use events::{StoreEvent, Subscription};
pub use models::{Category, NewPost, Post, PostId, PostImage, PostPatch, PostStatus, TrashedPost};
pub use query::{paginate, Page, PostQuery, StatusCounts, DEFAULT_PER_PAGE};
pub use retention::RetentionPolicy;
pub use stats::DashboardStats;
pub use storage::{
    BlobRef, FileStore, ImageError, ImageStore, KeyValueStore, MemoryStore, StorageError,
};
pub use store::BlogStore;
pub use validation::{validate, ValidationError, ValidationErrors};
