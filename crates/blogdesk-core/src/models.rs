//! Data models for blogdesk
//!
//! Defines the core data structures: Post, TrashedPost, and the input types
//! used to create (`NewPost`) and update (`PostPatch`) posts.
//!
//! Field names serialize in camelCase to match the persisted record layout
//! (`publishDate`, `createdAt`, ...).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::storage::images::BlobRef;

/// Unique, immutable identifier of a post
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the id, if it is one
    ///
    /// Generated ids are wall-clock milliseconds; seed ids are small integers.
    pub fn as_number(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PostId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Error returned when parsing a category or status from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFieldError {
    #[error("Unknown category '{0}'. Valid categories: Technology, Design, Development, Business, Lifestyle")]
    Category(String),

    #[error("Unknown status '{0}'. Valid statuses: draft, published")]
    Status(String),
}

/// Fixed set of post categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Technology,
    Design,
    Development,
    Business,
    Lifestyle,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 5] = [
        Category::Technology,
        Category::Design,
        Category::Development,
        Category::Business,
        Category::Lifestyle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Design => "Design",
            Category::Development => "Development",
            Category::Business => "Business",
            Category::Lifestyle => "Lifestyle",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseFieldError::Category(s.to_string()))
    }
}

/// Publication status of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            _ => Err(ParseFieldError::Status(s.to_string())),
        }
    }
}

/// Image attached to a post
///
/// Image bytes never live in the post record. Uploaded images are kept in
/// the content-addressed `ImageStore` and referenced by hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PostImage {
    /// Image hosted elsewhere
    Url { url: String },
    /// Image stored in the local blob store
    Blob(BlobRef),
}

impl PostImage {
    /// Hash of the referenced blob, if this image is stored locally
    pub fn blob_hash(&self) -> Option<&str> {
        match self {
            PostImage::Blob(blob) => Some(&blob.hash),
            PostImage::Url { .. } => None,
        }
    }
}

/// Stored image field: a tagged `PostImage`, or a bare URL string
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredImage {
    Bare(String),
    Tagged(PostImage),
}

/// Accepts `null`, `""`, a bare URL string, or a tagged image
fn deserialize_image<'de, D>(deserializer: D) -> Result<Option<PostImage>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StoredImage>::deserialize(deserializer)? {
        Some(StoredImage::Bare(url)) if url.trim().is_empty() => None,
        Some(StoredImage::Bare(url)) => Some(PostImage::Url { url }),
        Some(StoredImage::Tagged(image)) => Some(image),
        None => None,
    })
}

impl fmt::Display for PostImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostImage::Url { url } => write!(f, "{}", url),
            PostImage::Blob(blob) => write!(f, "blob:{} ({})", blob.hash, blob.media_type),
        }
    }
}

/// A blog post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier
    pub id: PostId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub author: String,
    #[serde(
        default,
        deserialize_with = "deserialize_image",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<PostImage>,
    pub publish_date: NaiveDate,
    pub status: PostStatus,
    /// When this post was created
    pub created_at: DateTime<Utc>,
    /// When this post was last updated
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a post from creation fields
    ///
    /// `created_at` and `updated_at` are both set to `now`.
    pub fn from_new(id: PostId, fields: NewPost, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            category: fields.category,
            author: fields.author,
            image: fields.image,
            publish_date: fields.publish_date,
            status: fields.status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// The editable fields of this post
    pub fn fields(&self) -> NewPost {
        NewPost {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            author: self.author.clone(),
            image: self.image.clone(),
            publish_date: self.publish_date,
            status: self.status,
        }
    }
}

/// A soft-deleted post waiting in the trash
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrashedPost {
    #[serde(flatten)]
    pub post: Post,
    /// When the post was moved to the trash
    pub deleted_at: DateTime<Utc>,
}

impl TrashedPost {
    pub fn new(post: Post, deleted_at: DateTime<Utc>) -> Self {
        Self { post, deleted_at }
    }

    pub fn id(&self) -> &PostId {
        &self.post.id
    }

    /// Strip the deletion stamp, giving back the original post
    pub fn into_post(self) -> Post {
        self.post
    }
}

/// Fields supplied when creating a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub author: String,
    #[serde(default)]
    pub image: Option<PostImage>,
    pub publish_date: NaiveDate,
    pub status: PostStatus,
}

impl NewPost {
    /// Create fields with the form defaults: Technology, draft, published today
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: Category::default(),
            author: author.into(),
            image: None,
            publish_date: Utc::now().date_naive(),
            status: PostStatus::default(),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_publish_date(mut self, date: NaiveDate) -> Self {
        self.publish_date = date;
        self
    }

    pub fn with_image(mut self, image: PostImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// Partial update merged into an existing post
///
/// Only fields that are `Some` are written. `image: Some(None)` clears the
/// image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub author: Option<String>,
    pub image: Option<Option<PostImage>>,
    pub publish_date: Option<NaiveDate>,
    pub status: Option<PostStatus>,
}

impl PostPatch {
    /// Check if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.author.is_none()
            && self.image.is_none()
            && self.publish_date.is_none()
            && self.status.is_none()
    }

    /// Write the present fields into `post`
    ///
    /// Does not touch `id`, `created_at`, or `updated_at`.
    pub fn apply_to(&self, post: &mut Post) {
        if let Some(ref title) = self.title {
            post.title = title.clone();
        }
        if let Some(ref description) = self.description {
            post.description = description.clone();
        }
        if let Some(category) = self.category {
            post.category = category;
        }
        if let Some(ref author) = self.author {
            post.author = author.clone();
        }
        if let Some(ref image) = self.image {
            post.image = image.clone();
        }
        if let Some(date) = self.publish_date {
            post.publish_date = date;
        }
        if let Some(status) = self.status {
            post.status = status;
        }
    }

    /// The fields `post` would have after this patch, for validation
    pub fn preview(&self, post: &Post) -> NewPost {
        let mut merged = post.clone();
        self.apply_to(&mut merged);
        merged.fields()
    }
}
