//! Command handlers

pub mod config;
pub mod images;
pub mod post;
pub mod stats;
pub mod trash;

use anyhow::{bail, Result};

use blogdesk_core::PostId;

/// Resolve a post ID argument (full ID or unique prefix)
///
/// `candidates` yields the id and title of every post the command may act on.
fn resolve_id<'a>(
    id: &str,
    candidates: impl Iterator<Item = (&'a PostId, &'a str)>,
    what: &str,
) -> Result<PostId> {
    let candidates: Vec<_> = candidates.collect();

    // Exact match first
    if let Some((exact, _)) = candidates.iter().find(|(pid, _)| pid.as_str() == id) {
        return Ok((*exact).clone());
    }

    let matches: Vec<_> = candidates
        .iter()
        .filter(|(pid, _)| pid.as_str().starts_with(id))
        .collect();

    match matches.as_slice() {
        [] => bail!("No {} found matching: {}", what, id),
        [(pid, _)] => Ok((*pid).clone()),
        _ => {
            eprintln!("Multiple {}s match '{}':", what, id);
            for (pid, title) in &matches {
                eprintln!("  {} - {}", pid, title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
