//! Post command handlers

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Args;

use blogdesk_core::{
    paginate, validate, BlogStore, Category, ImageStore, KeyValueStore, NewPost, PostId,
    PostImage, PostPatch, PostQuery, PostStatus, StatusCounts,
};

use crate::editor::{confirm, edit_text, is_interactive, prompt_with_default};
use crate::output::Output;

/// Post fields given on the command line
#[derive(Args, Debug, Clone, Default)]
pub struct PostFieldArgs {
    /// Post title (at most 100 characters)
    #[arg(short = 'T', long)]
    pub title: Option<String>,
    /// Post body (opens editor if not provided when creating)
    #[arg(short, long)]
    pub description: Option<String>,
    /// Author name
    #[arg(short, long)]
    pub author: Option<String>,
    /// Technology, Design, Development, Business, or Lifestyle
    #[arg(short, long)]
    pub category: Option<Category>,
    /// draft or published
    #[arg(short, long)]
    pub status: Option<PostStatus>,
    /// Publish date (YYYY-MM-DD)
    #[arg(long)]
    pub publish_date: Option<NaiveDate>,
    /// JPG or PNG file to attach (at most 1MB)
    #[arg(long, conflicts_with = "image_url")]
    pub image: Option<PathBuf>,
    /// Remote image URL, or an inline data: URL
    #[arg(long)]
    pub image_url: Option<String>,
}

impl PostFieldArgs {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.author.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.publish_date.is_none()
            && self.image.is_none()
            && self.image_url.is_none()
    }
}

/// Create a new post
pub fn create<S: KeyValueStore>(
    store: &mut BlogStore<S>,
    images: &ImageStore,
    args: PostFieldArgs,
    output: &Output,
) -> Result<()> {
    let description = match args.description.clone() {
        Some(description) => description,
        None if output.should_prompt() && is_interactive() => edit_text("")?,
        None => String::new(),
    };

    let mut fields = NewPost::new(
        args.title.clone().unwrap_or_default(),
        description,
        args.author.clone().unwrap_or_default(),
    );
    if let Some(category) = args.category {
        fields.category = category;
    }
    if let Some(status) = args.status {
        fields.status = status;
    }
    if let Some(date) = args.publish_date {
        fields.publish_date = date;
    }

    validate(&fields).context("Post is invalid")?;

    // Store the image only once the text fields are known to be good
    fields.image = resolve_image(images, &args)?;

    let post = store.create(fields).context("Failed to create post")?;

    output.success(&format!("Created post: {}", post.id));
    output.print_post(&post);

    Ok(())
}

/// List posts matching the filters, one page at a time
pub fn list<S: KeyValueStore>(
    store: &BlogStore<S>,
    search: Option<String>,
    category: Option<Category>,
    status: Option<PostStatus>,
    page: usize,
    per_page: usize,
    output: &Output,
) -> Result<()> {
    let query = PostQuery {
        search,
        category,
        status,
    };

    let filtered = query.filter(store.posts());
    let counts = StatusCounts::count(filtered.iter().copied());
    let page = paginate(&filtered, page, per_page);

    output.print_posts(&page, counts);
    Ok(())
}

/// Show a single post
pub fn show<S: KeyValueStore>(store: &BlogStore<S>, id: String, output: &Output) -> Result<()> {
    let post_id = resolve_active_id(store, &id)?;

    let post = store
        .get(&post_id)
        .ok_or_else(|| anyhow::anyhow!("Post not found: {}", id))?;

    output.print_post(post);
    Ok(())
}

/// Edit a post
///
/// With no field flags, prompts for each field interactively.
pub fn edit<S: KeyValueStore>(
    store: &mut BlogStore<S>,
    images: &ImageStore,
    id: String,
    args: PostFieldArgs,
    remove_image: bool,
    output: &Output,
) -> Result<()> {
    let post_id = resolve_active_id(store, &id)?;

    let post = store
        .get(&post_id)
        .ok_or_else(|| anyhow::anyhow!("Post not found: {}", id))?;

    let mut patch = if args.is_empty() && !remove_image {
        if !output.should_prompt() || !is_interactive() {
            bail!("Nothing to change. Pass field flags such as --title or --status.");
        }
        prompt_for_patch(post)?
    } else {
        PostPatch {
            title: args.title.clone(),
            description: args.description.clone(),
            category: args.category,
            author: args.author.clone(),
            image: None,
            publish_date: args.publish_date,
            status: args.status,
        }
    };

    if patch.is_empty() && !remove_image && args.image.is_none() && args.image_url.is_none() {
        output.message("No changes.");
        return Ok(());
    }

    validate(&patch.preview(post)).context("Post is invalid")?;

    if remove_image {
        patch.image = Some(None);
    } else if let Some(image) = resolve_image(images, &args)? {
        patch.image = Some(Some(image));
    }

    store
        .update(&post_id, patch)
        .context("Failed to update post")?;

    output.success("Post updated");
    if let Some(post) = store.get(&post_id) {
        output.print_post(post);
    }

    Ok(())
}

/// Move a post to the trash
pub fn delete<S: KeyValueStore>(store: &mut BlogStore<S>, id: String, output: &Output) -> Result<()> {
    let post_id = resolve_active_id(store, &id)?;

    let post = store
        .get(&post_id)
        .ok_or_else(|| anyhow::anyhow!("Post not found: {}", id))?;
    let title = post.title.clone();

    if output.should_prompt() {
        println!("Move to trash: {} - {}", post.id, post.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .soft_delete(&post_id)
        .context("Failed to move post to trash")?;

    output.success(&format!(
        "Moved to trash: {}. It will be permanently deleted in {} days.",
        title,
        store.auto_purge_days()
    ));

    Ok(())
}

/// Turn the image flags into a stored image reference
///
/// Local files and `data:` URLs are copied into the image store; other URLs
/// are kept as remote references.
fn resolve_image(images: &ImageStore, args: &PostFieldArgs) -> Result<Option<PostImage>> {
    if let Some(ref path) = args.image {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read image: {:?}", path))?;
        let blob = images
            .put(&bytes)
            .with_context(|| format!("Failed to store image: {:?}", path))?;
        return Ok(Some(PostImage::Blob(blob)));
    }

    match args.image_url.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(url) if url.starts_with("data:") => {
            let blob = images
                .put_data_url(url)
                .context("Failed to store inline image")?;
            Ok(Some(PostImage::Blob(blob)))
        }
        Some(url) => Ok(Some(PostImage::Url {
            url: url.to_string(),
        })),
    }
}

fn prompt_for_patch(post: &blogdesk_core::Post) -> Result<PostPatch> {
    println!("Editing post: {}", post.id);
    println!("Press Enter to keep current value, or type new value.\n");

    let mut patch = PostPatch {
        title: prompt_with_default("Title", &post.title)?,
        author: prompt_with_default("Author", &post.author)?,
        ..Default::default()
    };

    if let Some(category) = prompt_with_default("Category", post.category.as_str())? {
        patch.category = Some(category.parse()?);
    }
    if let Some(status) = prompt_with_default("Status", post.status.as_str())? {
        patch.status = Some(status.parse()?);
    }
    if let Some(date) = prompt_with_default("Publish date", &post.publish_date.to_string())? {
        patch.publish_date = Some(
            date.parse()
                .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD.", date))?,
        );
    }

    if confirm("Edit description?")? {
        let description = edit_text(&post.description)?;
        if description != post.description {
            patch.description = Some(description);
        }
    }

    Ok(patch)
}

fn resolve_active_id<S: KeyValueStore>(store: &BlogStore<S>, id: &str) -> Result<PostId> {
    super::resolve_id(
        id,
        store.posts().iter().map(|p| (&p.id, p.title.as_str())),
        "post",
    )
}
