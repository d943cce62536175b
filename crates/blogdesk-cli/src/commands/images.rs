//! Image command handlers

use std::collections::HashSet;

use anyhow::{Context, Result};

use blogdesk_core::{BlogStore, ImageStore, KeyValueStore};

use crate::output::Output;

/// Hashes of every blob referenced by an active or trashed post
pub fn referenced_blobs<S: KeyValueStore>(store: &BlogStore<S>) -> HashSet<String> {
    store
        .posts()
        .iter()
        .chain(store.trash().iter().map(|t| &t.post))
        .filter_map(|post| post.image.as_ref()?.blob_hash())
        .map(str::to_string)
        .collect()
}

/// Delete image blobs no post refers to
pub fn prune<S: KeyValueStore>(
    store: &BlogStore<S>,
    images: &ImageStore,
    output: &Output,
) -> Result<()> {
    let referenced = referenced_blobs(store);
    let removed = images
        .prune(&referenced)
        .context("Failed to prune image blobs")?;

    output.success(&format!("Removed {} unused image(s)", removed));
    Ok(())
}
