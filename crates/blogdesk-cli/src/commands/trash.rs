//! Trash command handlers

use anyhow::{Context, Result};

use blogdesk_core::{BlogStore, KeyValueStore, PostId};

use crate::editor::confirm;
use crate::output::{Output, TrashRow};

/// List trashed posts with their time left before auto-purge
pub fn list<S: KeyValueStore>(store: &BlogStore<S>, output: &Output) -> Result<()> {
    let rows: Vec<TrashRow<'_>> = store
        .trash()
        .iter()
        .map(|trashed| TrashRow {
            trashed,
            days_until_purge: store.days_until_purge(trashed),
            urgent: store.is_purge_urgent(trashed),
        })
        .collect();

    output.print_trash(&rows, store.auto_purge_days());
    Ok(())
}

/// Move a trashed post back to the post list
pub fn restore<S: KeyValueStore>(store: &mut BlogStore<S>, id: String, output: &Output) -> Result<()> {
    let post_id = resolve_trashed_id(store, &id)?;

    store
        .restore(&post_id)
        .context("Failed to restore post")?;

    let title = store
        .get(&post_id)
        .map(|p| p.title.clone())
        .unwrap_or_default();
    output.success(&format!("Restored: {}", title));

    Ok(())
}

/// Permanently delete a trashed post
pub fn delete<S: KeyValueStore>(store: &mut BlogStore<S>, id: String, output: &Output) -> Result<()> {
    let post_id = resolve_trashed_id(store, &id)?;

    let trashed = store
        .get_trashed(&post_id)
        .ok_or_else(|| anyhow::anyhow!("Post not found in trash: {}", id))?;
    let title = trashed.post.title.clone();

    if output.should_prompt() {
        println!("Permanently delete: {} - {}", post_id, title);
        println!("This action cannot be undone.");
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .permanent_delete(&post_id)
        .context("Failed to delete post")?;

    output.success(&format!("Permanently deleted: {}", title));

    Ok(())
}

/// Permanently delete everything in the trash
pub fn empty<S: KeyValueStore>(store: &mut BlogStore<S>, output: &Output) -> Result<()> {
    if output.should_prompt() && !store.trash().is_empty() {
        println!(
            "Permanently delete all {} item(s) in the trash?",
            store.trash().len()
        );
        println!("This action cannot be undone.");
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let count = store.empty_trash().context("Failed to empty trash")?;

    output.success(&format!("Emptied trash ({} item(s) deleted)", count));

    Ok(())
}

/// Remove trashed posts older than the retention window now
pub fn purge<S: KeyValueStore>(store: &mut BlogStore<S>, output: &Output) -> Result<()> {
    let count = store.purge().context("Failed to purge trash")?;

    if count == 0 {
        output.message(&format!(
            "Nothing to purge. Items are deleted after {} days in the trash.",
            store.auto_purge_days()
        ));
    } else {
        output.success(&format!("Auto-purged {} old item(s) from trash", count));
    }

    Ok(())
}

fn resolve_trashed_id<S: KeyValueStore>(store: &BlogStore<S>, id: &str) -> Result<PostId> {
    super::resolve_id(
        id,
        store
            .trash()
            .iter()
            .map(|t| (t.id(), t.post.title.as_str())),
        "trashed post",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use blogdesk_core::{ManualClock, MemoryStore, NewPost, RetentionPolicy};
    use chrono::{DateTime, Duration, Utc};

    fn start() -> DateTime<Utc> {
        "2026-02-01T08:00:00Z".parse().unwrap()
    }

    fn setup() -> (BlogStore<MemoryStore>, ManualClock) {
        let clock = ManualClock::new(start());
        let mut store = BlogStore::open_with(
            MemoryStore::new(),
            Box::new(clock.clone()),
            RetentionPolicy::default(),
            false,
        )
        .unwrap();

        for title in ["First", "Second"] {
            let post = store
                .create(NewPost::new(title, "Body", "Author"))
                .unwrap();
            store.soft_delete(&post.id).unwrap();
        }
        (store, clock)
    }

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_restore() {
        let (mut store, _clock) = setup();
        let id = store.trash()[0].id().clone();
        let before = store.trash().len();

        restore(&mut store, id.to_string(), &quiet()).unwrap();

        assert_eq!(store.trash().len(), before - 1);
        assert_eq!(store.posts()[0].id, id);
    }

    #[test]
    fn test_restore_active_post_fails() {
        let (mut store, _clock) = setup();
        let post = store
            .create(NewPost::new("Active", "Body", "Author"))
            .unwrap();

        assert!(restore(&mut store, post.id.to_string(), &quiet()).is_err());
    }

    #[test]
    fn test_delete_skips_prompt_in_quiet_mode() {
        let (mut store, _clock) = setup();
        let id = store.trash()[1].id().clone();

        delete(&mut store, id.to_string(), &quiet()).unwrap();

        assert_eq!(store.trash().len(), 1);
        assert!(store.get_trashed(&id).is_none());
    }

    #[test]
    fn test_empty() {
        let (mut store, _clock) = setup();
        empty(&mut store, &quiet()).unwrap();
        assert!(store.trash().is_empty());
    }

    #[test]
    fn test_purge() {
        let (mut store, clock) = setup();

        purge(&mut store, &quiet()).unwrap();
        assert_eq!(store.trash().len(), 2);

        clock.advance(Duration::days(30));
        purge(&mut store, &quiet()).unwrap();
        assert!(store.trash().is_empty());
    }

    #[test]
    fn test_list() {
        let (store, _clock) = setup();
        list(&store, &quiet()).unwrap();
    }
}
