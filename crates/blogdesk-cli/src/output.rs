//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use blogdesk_core::{DashboardStats, Page, Post, StatusCounts, TrashedPost};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// A trashed post with its time left before auto-purge
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashRow<'a> {
    #[serde(flatten)]
    pub trashed: &'a TrashedPost,
    pub days_until_purge: i64,
    pub urgent: bool,
}

/// Output helper for consistent formatting
#[derive(Debug, Clone, Copy)]
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single post
    pub fn print_post(&self, post: &Post) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:           {}", post.id);
                println!("Title:        {}", post.title);
                println!("Author:       {}", post.author);
                println!("Category:     {}", post.category);
                println!("Status:       {}", post.status);
                println!("Publish date: {}", post.publish_date);
                if let Some(ref image) = post.image {
                    println!("Image:        {}", image);
                }
                println!("Created:      {}", post.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:      {}", post.updated_at.format("%Y-%m-%d %H:%M"));
                println!();
                println!("{}", post.description);
            }
            OutputFormat::Json => print_json(post),
            OutputFormat::Quiet => {
                println!("{}", post.id);
            }
        }
    }

    /// Print one page of the post list
    ///
    /// `counts` covers the whole filtered list, not just this page.
    pub fn print_posts(&self, page: &Page<'_, &Post>, counts: StatusCounts) {
        match self.format {
            OutputFormat::Human => {
                if page.total_items == 0 {
                    println!("No blogs found. Try adjusting your filters.");
                    return;
                }
                for post in page.items {
                    println!(
                        "{} | {} | {:<11} | {:<9} | {}",
                        truncate(post.id.as_str(), 13),
                        truncate(&post.title, 40),
                        post.category,
                        post.status,
                        truncate(&post.author, 20)
                    );
                }
                println!();
                if page.items.is_empty() {
                    println!(
                        "Page {} is past the end ({} page(s))",
                        page.page, page.total_pages
                    );
                } else {
                    println!(
                        "Showing {}-{} of {} post(s), page {}/{}",
                        page.first_index(),
                        page.last_index(),
                        page.total_items,
                        page.page,
                        page.total_pages
                    );
                }
                println!(
                    "{} published, {} draft(s)",
                    counts.published, counts.drafts
                );
            }
            OutputFormat::Json => {
                print_json(&serde_json::json!({
                    "posts": page.items,
                    "page": page.page,
                    "perPage": page.per_page,
                    "totalItems": page.total_items,
                    "totalPages": page.total_pages,
                    "published": counts.published,
                    "drafts": counts.drafts,
                }));
            }
            OutputFormat::Quiet => {
                for post in page.items {
                    println!("{}", post.id);
                }
            }
        }
    }

    /// Print the trash with days left before auto-purge
    pub fn print_trash(&self, rows: &[TrashRow<'_>], auto_purge_days: u32) {
        match self.format {
            OutputFormat::Human => {
                if rows.is_empty() {
                    println!("Trash is empty.");
                    return;
                }
                for row in rows {
                    let marker = if row.urgent { "!" } else { " " };
                    println!(
                        "{} {} | {} | deleted {} | {} day(s) left",
                        marker,
                        truncate(row.trashed.id().as_str(), 13),
                        truncate(&row.trashed.post.title, 40),
                        row.trashed.deleted_at.format("%Y-%m-%d"),
                        row.days_until_purge
                    );
                }
                println!();
                println!(
                    "{} item(s) in trash. Items are permanently deleted after {} days.",
                    rows.len(),
                    auto_purge_days
                );
            }
            OutputFormat::Json => print_json(rows),
            OutputFormat::Quiet => {
                for row in rows {
                    println!("{}", row.trashed.id());
                }
            }
        }
    }

    /// Print dashboard statistics
    pub fn print_stats(&self, stats: &DashboardStats<'_>) {
        match self.format {
            OutputFormat::Human => {
                println!("Total blogs: {}", stats.total);
                println!("Published:   {}", stats.published);
                println!("Drafts:      {}", stats.drafts);
                println!("In trash:    {}", stats.in_trash);

                println!();
                println!("── Categories ──");
                if stats.categories.is_empty() {
                    println!("No categories yet");
                }
                for share in &stats.categories {
                    println!(
                        "{:<12} {:>3} ({}%)",
                        share.category.as_str(),
                        share.count,
                        share.percentage
                    );
                }

                println!();
                println!("── Recent ──");
                if stats.recent.is_empty() {
                    println!("No blogs yet");
                }
                for post in stats.recent {
                    println!(
                        "{} | {} | {}",
                        post.publish_date,
                        truncate(&post.title, 50),
                        post.status
                    );
                }
            }
            OutputFormat::Json => print_json(stats),
            OutputFormat::Quiet => {
                println!("{}", stats.total);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a side note to stderr, keeping stdout clean for the result
    pub fn notice(&self, msg: &str) {
        if !self.is_quiet() {
            eprintln!("{}", msg);
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("ééééééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_trash_row_json() {
        use blogdesk_core::{NewPost, PostId};
        use chrono::Utc;

        let now = Utc::now();
        let post = Post::from_new(PostId::new("7"), NewPost::new("T", "D", "A"), now);
        let trashed = TrashedPost::new(post, now);
        let row = TrashRow {
            trashed: &trashed,
            days_until_purge: 30,
            urgent: false,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["daysUntilPurge"], 30);
        assert!(json.get("deletedAt").is_some());
    }
}
