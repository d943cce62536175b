//! Stats command handler

use anyhow::Result;

use blogdesk_core::{BlogStore, DashboardStats, KeyValueStore};

use crate::output::Output;

/// Show dashboard statistics
pub fn show<S: KeyValueStore>(store: &BlogStore<S>, output: &Output) -> Result<()> {
    let stats = DashboardStats::compute(store.posts(), store.trash());
    output.print_stats(&stats);
    Ok(())
}
