//! Dashboard statistics

use serde::Serialize;

use crate::models::{Category, Post, TrashedPost};
use crate::query::StatusCounts;

/// How many recent posts the dashboard shows
pub const RECENT_POSTS: usize = 5;

/// Number of posts in one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub count: usize,
    /// Share of all active posts, rounded to a whole percent
    pub percentage: u32,
}

/// Summary of the store's collections
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats<'a> {
    pub total: usize,
    pub published: usize,
    pub drafts: usize,
    pub in_trash: usize,
    /// Categories in the order they first appear; empty categories are omitted
    pub categories: Vec<CategoryShare>,
    /// The newest active posts
    pub recent: &'a [Post],
}

impl<'a> DashboardStats<'a> {
    pub fn compute(posts: &'a [Post], trash: &[TrashedPost]) -> Self {
        let StatusCounts { published, drafts } = StatusCounts::count(posts);

        Self {
            total: posts.len(),
            published,
            drafts,
            in_trash: trash.len(),
            categories: category_shares(posts),
            recent: &posts[..posts.len().min(RECENT_POSTS)],
        }
    }
}

fn category_shares(posts: &[Post]) -> Vec<CategoryShare> {
    let mut counts: Vec<(Category, usize)> = Vec::new();
    for post in posts {
        match counts.iter_mut().find(|(c, _)| *c == post.category) {
            Some((_, count)) => *count += 1,
            None => counts.push((post.category, 1)),
        }
    }

    let total = posts.len().max(1) as f64;
    counts
        .into_iter()
        .map(|(category, count)| CategoryShare {
            category,
            count,
            percentage: (count as f64 / total * 100.0).round() as u32,
        })
        .collect()
}
