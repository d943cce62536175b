//! Post list filtering and pagination
//!
//! A `PostQuery` narrows the active posts by search text, category, and
//! status. `paginate` then cuts the filtered list into 1-based pages.

use serde::Serialize;

use crate::models::{Category, Post, PostStatus};

/// Posts per page when none is given
pub const DEFAULT_PER_PAGE: usize = 5;

/// Filters applied to the post list
///
/// `None` means "All" for category and status. An empty search matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub status: Option<PostStatus>,
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Check if any filter is set
    pub fn is_active(&self) -> bool {
        self.search.as_deref().is_some_and(|s| !s.is_empty())
            || self.category.is_some()
            || self.status.is_some()
    }

    /// Check if `post` passes every filter
    ///
    /// Search is a case-insensitive substring match over title, description,
    /// and author.
    pub fn matches(&self, post: &Post) -> bool {
        let matches_search = match self.search.as_deref() {
            None | Some("") => true,
            Some(text) => {
                let needle = text.to_lowercase();
                [&post.title, &post.description, &post.author]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        };

        matches_search
            && self.category.map_or(true, |c| post.category == c)
            && self.status.map_or(true, |s| post.status == s)
    }

    /// The matching posts, in their original order
    pub fn filter<'a>(&self, posts: &'a [Post]) -> Vec<&'a Post> {
        posts.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Published and draft counts of a post list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub published: usize,
    pub drafts: usize,
}

impl StatusCounts {
    pub fn count<'a>(posts: impl IntoIterator<Item = &'a Post>) -> Self {
        posts
            .into_iter()
            .fold(Self::default(), |mut counts, post| {
                match post.status {
                    PostStatus::Published => counts.published += 1,
                    PostStatus::Draft => counts.drafts += 1,
                }
                counts
            })
    }
}

/// One page of a list
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based page number
    pub page: usize,
    pub per_page: usize,
    /// Length of the whole list
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// 1-based position of the first item on this page, 0 when empty
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }

    /// 1-based position of the last item on this page, 0 when empty
    pub fn last_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.first_index() + self.items.len() - 1
        }
    }
}

/// Cut `items` into pages of `per_page` and return page `page` (1-based)
///
/// `total_pages = ceil(len / per_page)`. Page 0 is treated as page 1 and a
/// `per_page` of 0 as 1. Pages past the end are empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let start = (page - 1).saturating_mul(per_page).min(total_items);
    let end = start.saturating_add(per_page).min(total_items);

    Page {
        items: &items[start..end],
        page,
        per_page,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPost, PostId};
    use chrono::Utc;

    fn post(id: &str, title: &str, author: &str, category: Category, status: PostStatus) -> Post {
        let fields = NewPost::new(title, format!("About {}", title), author)
            .with_category(category)
            .with_status(status);
        Post::from_new(PostId::new(id), fields, Utc::now())
    }

    fn sample() -> Vec<Post> {
        vec![
            post("1", "Rust Ownership", "Jordan Lee", Category::Development, PostStatus::Published),
            post("2", "Color Theory", "Mia Thompson", Category::Design, PostStatus::Draft),
            post("3", "Quarterly Review", "Nathan Cole", Category::Business, PostStatus::Published),
            post("4", "Async rust", "Ava Ramirez", Category::Development, PostStatus::Draft),
        ]
    }

    fn ids(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_empty_query_matches_all() {
        let posts = sample();
        let query = PostQuery::new();
        assert!(!query.is_active());
        assert_eq!(query.filter(&posts).len(), posts.len());

        let blank = PostQuery::new().search("");
        assert!(!blank.is_active());
        assert_eq!(blank.filter(&posts).len(), posts.len());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let posts = sample();

        let query = PostQuery::new().search("RUST");
        assert_eq!(ids(&query.filter(&posts)), vec!["1", "4"]);

        // Author and description are searched too
        let by_author = PostQuery::new().search("cole");
        assert_eq!(ids(&by_author.filter(&posts)), vec!["3"]);
        let by_description = PostQuery::new().search("about color");
        assert_eq!(ids(&by_description.filter(&posts)), vec!["2"]);
    }

    #[test]
    fn test_filters_combine() {
        let posts = sample();

        let query = PostQuery::new()
            .category(Category::Development)
            .status(PostStatus::Draft);
        assert!(query.is_active());
        assert_eq!(ids(&query.filter(&posts)), vec!["4"]);

        let none = PostQuery::new().search("rust").category(Category::Design);
        assert!(none.filter(&posts).is_empty());
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=12).collect();

        let first = paginate(&items, 1, 5);
        assert_eq!(first.items, &[1, 2, 3, 4, 5]);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_items, 12);
        assert!(first.has_next());
        assert!(!first.has_previous());
        assert_eq!((first.first_index(), first.last_index()), (1, 5));

        let last = paginate(&items, 3, 5);
        assert_eq!(last.items, &[11, 12]);
        assert!(!last.has_next());
        assert!(last.has_previous());
        assert_eq!((last.first_index(), last.last_index()), (11, 12));

        let ten = paginate(&items, 2, 10);
        assert_eq!(ten.items, &[11, 12]);
        assert_eq!(ten.total_pages, 2);
    }

    #[test]
    fn test_paginate_edges() {
        let items: Vec<u32> = (1..=4).collect();

        let past_end = paginate(&items, 9, 5);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total_pages, 1);
        assert_eq!(past_end.first_index(), 0);

        let zero = paginate(&items, 0, 0);
        assert_eq!(zero.page, 1);
        assert_eq!(zero.per_page, 1);
        assert_eq!(zero.items, &[1]);
        assert_eq!(zero.total_pages, 4);

        let empty: Vec<u32> = Vec::new();
        let page = paginate(&empty, 1, DEFAULT_PER_PAGE);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
    }

    #[test]
    fn test_summary_counts_filtered_set() {
        let posts = sample();
        let filtered = PostQuery::new().category(Category::Development).filter(&posts);
        let page = paginate(&filtered, 1, 1);

        // Counts cover the whole filtered list, not just the page
        assert_eq!(page.items.len(), 1);
        assert_eq!(
            StatusCounts::count(filtered.iter().copied()),
            StatusCounts {
                published: 1,
                drafts: 1
            }
        );
    }
}
