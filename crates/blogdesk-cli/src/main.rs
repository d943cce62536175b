//! blogdesk CLI
//!
//! Command-line interface for blogdesk - blog posts with a trash bin.

use std::cell::Cell;
use std::fs::File;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use blogdesk_core::{
    BlogStore, Category, Config, FileStore, ImageStore, PostStatus, StorageError, StoreEvent,
    DEFAULT_PER_PAGE,
};

mod commands;
mod editor;
mod output;

use commands::post::PostFieldArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "blogdesk")]
#[command(about = "blogdesk - Manage blog posts, drafts, and the trash")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file to use instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage posts
    Post {
        #[command(subcommand)]
        command: PostCommands,
    },
    /// Manage the trash
    Trash {
        #[command(subcommand)]
        command: Option<TrashCommands>,
    },
    /// Show dashboard statistics
    Stats,
    /// Manage stored images
    Images {
        #[command(subcommand)]
        command: ImageCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum PostCommands {
    /// Create a new post
    #[command(alias = "add")]
    Create {
        #[command(flatten)]
        fields: PostFieldArgs,
    },
    /// List posts
    #[command(alias = "ls")]
    List {
        /// Search title, description, and author
        #[arg(short = 'S', long)]
        search: Option<String>,
        /// Filter by category
        #[arg(short, long)]
        category: Option<Category>,
        /// Filter by status (draft or published)
        #[arg(short, long)]
        status: Option<PostStatus>,
        /// Page number (starts at 1)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Posts per page
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,
    },
    /// Show post details
    Show {
        /// Post ID (full ID or prefix)
        id: String,
    },
    /// Edit a post (prompts for each field when no flags are given)
    Edit {
        /// Post ID (full ID or prefix)
        id: String,
        #[command(flatten)]
        fields: PostFieldArgs,
        /// Remove the post's image
        #[arg(long, conflicts_with_all = ["image", "image_url"])]
        remove_image: bool,
    },
    /// Move a post to the trash
    #[command(alias = "rm")]
    Delete {
        /// Post ID (full ID or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum TrashCommands {
    /// List trashed posts
    #[command(alias = "ls")]
    List,
    /// Restore a trashed post
    Restore {
        /// Post ID (full ID or prefix)
        id: String,
    },
    /// Permanently delete a trashed post
    #[command(alias = "rm")]
    Delete {
        /// Post ID (full ID or prefix)
        id: String,
    },
    /// Permanently delete everything in the trash
    Empty,
    /// Remove trashed posts past the retention window
    Purge,
}

#[derive(Subcommand)]
enum ImageCommands {
    /// Delete stored images that no post uses
    Prune,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, auto_purge_days, seed_on_first_run, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let result = run(Cli::parse());
    if let Err(e) = &result {
        if let Some(hint) = recovery_hint(e) {
            eprintln!("Hint: {}", hint);
        }
    }
    result
}

/// Recovery suggestion for the first storage error in the chain
fn recovery_hint(error: &anyhow::Error) -> Option<&'static str> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<StorageError>())
        .and_then(StorageError::recovery_suggestion)
}

fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;

    // File-based logging, only if BLOGDESK_LOG is set
    init_logging(&config);

    let mut store = BlogStore::open_with_config(&config)?;
    if store.purged_on_open() > 0 {
        output.notice(&format!(
            "Auto-purged {} old item(s) from trash",
            store.purged_on_open()
        ));
    }

    // Purges triggered by a command are reported once it finishes
    let purged = Rc::new(Cell::new(0));
    let purged_sink = Rc::clone(&purged);
    let _events = store.subscribe(move |event| {
        debug!("Store event: {:?}", event);
        if let StoreEvent::AutoPurged { count } = event {
            purged_sink.set(purged_sink.get() + count);
        }
    });

    let images = ImageStore::new(config.images_dir());
    let is_manual_purge = matches!(
        &cli.command,
        Commands::Trash {
            command: Some(TrashCommands::Purge)
        }
    );

    match cli.command {
        Commands::Post { command } => handle_post_command(command, &mut store, &images, &output)?,
        Commands::Trash { command } => handle_trash_command(command, &mut store, &output)?,
        Commands::Stats => commands::stats::show(&store, &output)?,
        Commands::Images { command } => match command {
            ImageCommands::Prune => commands::images::prune(&store, &images, &output)?,
        },
        Commands::Config { .. } => {} // Handled above
    }

    if purged.get() > 0 && !is_manual_purge {
        output.notice(&format!(
            "Auto-purged {} old item(s) from trash",
            purged.get()
        ));
    }

    Ok(())
}

fn handle_post_command(
    command: PostCommands,
    store: &mut BlogStore<FileStore>,
    images: &ImageStore,
    output: &Output,
) -> Result<()> {
    match command {
        PostCommands::Create { fields } => commands::post::create(store, images, fields, output),
        PostCommands::List {
            search,
            category,
            status,
            page,
            per_page,
        } => commands::post::list(store, search, category, status, page, per_page, output),
        PostCommands::Show { id } => commands::post::show(store, id, output),
        PostCommands::Edit {
            id,
            fields,
            remove_image,
        } => commands::post::edit(store, images, id, fields, remove_image, output),
        PostCommands::Delete { id } => commands::post::delete(store, id, output),
    }
}

fn handle_trash_command(
    command: Option<TrashCommands>,
    store: &mut BlogStore<FileStore>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(TrashCommands::List) | None => commands::trash::list(store, output),
        Some(TrashCommands::Restore { id }) => commands::trash::restore(store, id, output),
        Some(TrashCommands::Delete { id }) => commands::trash::delete(store, id, output),
        Some(TrashCommands::Empty) => commands::trash::empty(store, output),
        Some(TrashCommands::Purge) => commands::trash::purge(store, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("BLOGDESK_LOG") else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "blogdesk_core={},blogdesk_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}
