//! Blog store
//!
//! The `BlogStore` is the single source of truth for active and trashed
//! posts. It enforces the trash lifecycle:
//!
//! - `create` prepends a new post to the active collection
//! - `soft_delete` moves a post to the head of the trash, stamping `deleted_at`
//! - `restore` moves it back to the head of the active collection
//! - `permanent_delete` / `empty_trash` destroy trashed posts
//! - `purge` destroys trashed posts older than the retention window; it runs
//!   on open and after every change to the trash
//!
//! Every mutation is persisted before subscribers are notified. Operations on
//! ids that are not present are silent no-ops that return `Ok(false)`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = BlogStore::open()?;
//!
//! let post = store.create(NewPost::new("Title", "Body", "Me"))?;
//! store.soft_delete(&post.id)?;
//! store.restore(&post.id)?;
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::events::{StoreEvent, Subscribers, Subscription};
use crate::models::{NewPost, Post, PostId, PostPatch, TrashedPost};
use crate::retention::RetentionPolicy;
use crate::seed::seed_posts;
use crate::storage::{FileStore, KeyValueStore, StorageError, StorageResult};

/// Storage key of the active posts record
pub const POSTS_KEY: &str = "blog-admin-blogs";

/// Storage key of the trashed posts record
pub const TRASH_KEY: &str = "blog-admin-trash";

/// Owner of the active and trashed post collections
pub struct BlogStore<S: KeyValueStore = FileStore> {
    /// Active posts, newest first
    posts: Vec<Post>,
    /// Trashed posts, most recently deleted first
    trash: Vec<TrashedPost>,
    storage: S,
    clock: Box<dyn Clock>,
    retention: RetentionPolicy,
    ids: IdGenerator,
    subscribers: Subscribers,
    /// Posts removed by the purge that ran on open
    purged_on_open: usize,
}

impl BlogStore<FileStore> {
    /// Open the store using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(&config)
    }

    /// Open the file-backed store described by `config`
    pub fn open_with_config(config: &Config) -> Result<Self> {
        let storage = FileStore::new(config.data_dir.clone());
        Self::open_with(
            storage,
            Box::new(SystemClock),
            config.retention(),
            config.seed_on_first_run,
        )
    }
}

impl<S: KeyValueStore> BlogStore<S> {
    /// Open a store over any persistence backend
    ///
    /// Loads both collections. When no active-posts record exists and `seed`
    /// is set, the sample posts are loaded and persisted. A missing trash
    /// record is an empty trash. Auto-purge runs before returning.
    pub fn open_with(
        storage: S,
        clock: Box<dyn Clock>,
        retention: RetentionPolicy,
        seed: bool,
    ) -> Result<Self> {
        let stored_posts: Option<Vec<Post>> =
            load_record(&storage, POSTS_KEY).context("Failed to load posts")?;
        let trash: Vec<TrashedPost> = load_record(&storage, TRASH_KEY)
            .context("Failed to load trash")?
            .unwrap_or_default();

        let mut store = Self {
            posts: Vec::new(),
            trash,
            storage,
            clock,
            retention,
            ids: IdGenerator::default(),
            subscribers: Subscribers::new(),
            purged_on_open: 0,
        };

        match stored_posts {
            Some(posts) => store.posts = posts,
            None if seed => {
                store.posts = seed_posts();
                store.save_posts().context("Failed to save sample posts")?;
                info!("Initialized store with {} sample posts", store.posts.len());
            }
            None => {}
        }

        for id in store
            .posts
            .iter()
            .map(|p| &p.id)
            .chain(store.trash.iter().map(|t| t.id()))
        {
            store.ids.observe(id);
        }

        store.purged_on_open = store.purge().context("Failed to purge trash on open")?;

        debug!(
            "Opened store: {} posts, {} in trash",
            store.posts.len(),
            store.trash.len()
        );
        Ok(store)
    }

    // ==================== Read Surface ====================

    /// Active posts, newest first
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Trashed posts, most recently deleted first
    pub fn trash(&self) -> &[TrashedPost] {
        &self.trash
    }

    /// Look up an active post (the trash is not searched)
    pub fn get(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|p| &p.id == id)
    }

    /// Look up a trashed post
    pub fn get_trashed(&self, id: &PostId) -> Option<&TrashedPost> {
        self.trash.iter().find(|t| t.id() == id)
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    pub fn auto_purge_days(&self) -> u32 {
        self.retention.days()
    }

    /// Days until a trashed post is purged, as of now
    pub fn days_until_purge(&self, trashed: &TrashedPost) -> i64 {
        self.retention
            .days_remaining(trashed.deleted_at, self.clock.now())
    }

    /// Check if a trashed post is close to being purged
    pub fn is_purge_urgent(&self, trashed: &TrashedPost) -> bool {
        self.retention.is_urgent(trashed.deleted_at, self.clock.now())
    }

    /// Number of trashed posts removed when the store was opened
    pub fn purged_on_open(&self) -> usize {
        self.purged_on_open
    }

    /// The persistence backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ==================== Subscriptions ====================

    /// Register a listener for store changes
    ///
    /// The listener is removed when the returned handle is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    // ==================== Mutations ====================

    /// Create a new post at the head of the active collection
    pub fn create(&mut self, fields: NewPost) -> Result<Post> {
        let now = self.clock.now();
        let id = self.ids.next(now);
        let post = Post::from_new(id, fields, now);

        self.posts.insert(0, post.clone());
        if let Err(e) = self.save_posts() {
            self.posts.remove(0);
            return Err(e).context("Failed to save new post");
        }

        debug!("Created post {}", post.id);
        self.subscribers
            .notify(&StoreEvent::PostCreated(post.id.clone()));
        Ok(post)
    }

    /// Merge `patch` into an active post and refresh `updated_at`
    ///
    /// Returns `false` (and changes nothing) if no active post has this id.
    pub fn update(&mut self, id: &PostId, patch: PostPatch) -> Result<bool> {
        let now = self.clock.now();
        let Some(post) = self.posts.iter_mut().find(|p| &p.id == id) else {
            debug!("Update ignored: no active post {}", id);
            return Ok(false);
        };

        let previous = post.clone();
        patch.apply_to(post);
        post.updated_at = now;
        if let Err(e) = self.save_posts() {
            if let Some(post) = self.posts.iter_mut().find(|p| &p.id == id) {
                *post = previous;
            }
            return Err(e).context("Failed to save updated post");
        }

        debug!("Updated post {}", id);
        self.subscribers.notify(&StoreEvent::PostUpdated(id.clone()));
        Ok(true)
    }

    /// Move an active post to the head of the trash
    ///
    /// Returns `false` if no active post has this id.
    pub fn soft_delete(&mut self, id: &PostId) -> Result<bool> {
        let Some(index) = self.posts.iter().position(|p| &p.id == id) else {
            debug!("Soft delete ignored: no active post {}", id);
            return Ok(false);
        };

        let post = self.posts.remove(index);
        self.trash.insert(0, TrashedPost::new(post, self.clock.now()));
        // Destination first: an interrupted move leaves the post in both records, never in neither
        if let Err(e) = self.save_trash().and_then(|_| self.save_posts()) {
            let post = self.trash.remove(0).into_post();
            self.posts.insert(index, post);
            self.resync_after_failed_save();
            return Err(e).context("Failed to save after moving post to trash");
        }

        debug!("Moved post {} to trash", id);
        self.subscribers.notify(&StoreEvent::MovedToTrash(id.clone()));
        self.purge()?;
        Ok(true)
    }

    /// Move a trashed post back to the head of the active collection
    ///
    /// The post keeps its id and timestamps; only `deleted_at` is dropped.
    /// Returns `false` if no trashed post has this id.
    pub fn restore(&mut self, id: &PostId) -> Result<bool> {
        let Some(index) = self.trash.iter().position(|t| t.id() == id) else {
            debug!("Restore ignored: no trashed post {}", id);
            return Ok(false);
        };

        let trashed = self.trash.remove(index);
        self.posts.insert(0, trashed.post.clone());
        // Destination first: an interrupted move leaves the post in both records, never in neither
        if let Err(e) = self.save_posts().and_then(|_| self.save_trash()) {
            self.posts.remove(0);
            self.trash.insert(index, trashed);
            self.resync_after_failed_save();
            return Err(e).context("Failed to save after restoring post");
        }

        debug!("Restored post {}", id);
        self.subscribers.notify(&StoreEvent::Restored(id.clone()));
        self.purge()?;
        Ok(true)
    }

    /// Destroy a trashed post
    ///
    /// Returns `false` if no trashed post has this id.
    pub fn permanent_delete(&mut self, id: &PostId) -> Result<bool> {
        let Some(index) = self.trash.iter().position(|t| t.id() == id) else {
            debug!("Permanent delete ignored: no trashed post {}", id);
            return Ok(false);
        };

        let removed = self.trash.remove(index);
        if let Err(e) = self.save_trash() {
            self.trash.insert(index, removed);
            return Err(e).context("Failed to save trash after permanent delete");
        }

        debug!("Permanently deleted post {}", id);
        self.subscribers
            .notify(&StoreEvent::PermanentlyDeleted(id.clone()));
        self.purge()?;
        Ok(true)
    }

    /// Destroy every trashed post
    ///
    /// Returns the number of posts removed. The empty trash record is
    /// persisted even when the trash was already empty.
    pub fn empty_trash(&mut self) -> Result<usize> {
        let removed = std::mem::take(&mut self.trash);
        let count = removed.len();
        if let Err(e) = self.save_trash() {
            self.trash = removed;
            return Err(e).context("Failed to save emptied trash");
        }

        debug!("Emptied trash ({} posts)", count);
        self.subscribers
            .notify(&StoreEvent::TrashEmptied { count });
        Ok(count)
    }

    /// Remove trashed posts older than the retention window
    ///
    /// Returns the number of posts removed. Nothing is written when nothing
    /// expired.
    pub fn purge(&mut self) -> Result<usize> {
        let now = self.clock.now();
        let before = self.trash.clone();
        let purged = self.purge_at(now);
        if purged == 0 {
            return Ok(0);
        }

        if let Err(e) = self.save_trash() {
            self.trash = before;
            return Err(e).context("Failed to save trash after purge");
        }
        info!("Auto-purged {} old item(s) from trash", purged);
        self.subscribers
            .notify(&StoreEvent::AutoPurged { count: purged });
        Ok(purged)
    }

    fn purge_at(&mut self, now: DateTime<Utc>) -> usize {
        let retention = self.retention;
        let before = self.trash.len();
        self.trash
            .retain(|t| !retention.is_expired(t.deleted_at, now));
        before - self.trash.len()
    }

    // ==================== Persistence ====================

    fn save_posts(&mut self) -> StorageResult<()> {
        save_record(&mut self.storage, POSTS_KEY, &self.posts)
    }

    fn save_trash(&mut self) -> StorageResult<()> {
        save_record(&mut self.storage, TRASH_KEY, &self.trash)
    }

    /// Rewrite both records from memory after a move failed half-way
    fn resync_after_failed_save(&mut self) {
        if let Err(e) = self.save_posts().and_then(|_| self.save_trash()) {
            warn!("Stored records may be out of date: {}", e);
        }
    }
}

fn load_record<T: DeserializeOwned>(
    storage: &impl KeyValueStore,
    key: &str,
) -> StorageResult<Option<Vec<T>>> {
    let Some(raw) = storage.load(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorageError::InvalidFormat {
            key: key.to_string(),
            details: e.to_string(),
        })
}

fn save_record<T: Serialize>(
    storage: &mut impl KeyValueStore,
    key: &str,
    items: &[T],
) -> StorageResult<()> {
    let json = serde_json::to_string(items).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    storage.save(key, &json)
}

/// Largest id the clock can produce (9999-12-31T23:59:59.999Z)
const MAX_CLOCK_ID: i64 = 253_402_300_799_999;

/// Issues wall-clock-derived post ids
///
/// Ids are milliseconds since the epoch, bumped so that every id is greater
/// than any clock-range id seen so far. This keeps ids unique even when two
/// posts are created in the same millisecond or the clock steps backwards.
/// Numeric ids past the clock range are not tracked.
#[derive(Debug, Default)]
struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    fn observe(&mut self, id: &PostId) {
        if let Some(n) = id.as_number().filter(|n| *n <= MAX_CLOCK_ID) {
            self.last = self.last.max(n);
        }
    }

    fn next(&mut self, now: DateTime<Utc>) -> PostId {
        let candidate = now.timestamp_millis().max(self.last.saturating_add(1));
        self.last = candidate;
        PostId::new(candidate.to_string())
    }
}
