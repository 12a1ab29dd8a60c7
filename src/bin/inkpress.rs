//! inkpress CLI
//!
//! Build the blog from Markdown posts.
//!
//! # Examples
//!
//! Build every post:
//! ```bash
//! inkpress build
//! ```
//!
//! Start a new English post:
//! ```bash
//! inkpress new "Hello World" --lang en
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use inkpress::builder::read_posts_json;
use inkpress::scaffold::NewPost;
use inkpress::{BlogBuilder, BuildStats, Config, Language, PostSummary};

#[derive(Parser)]
#[command(name = "inkpress")]
#[command(author, version, about = "Build static blog pages from Markdown posts")]
#[command(long_about = r#"
Turn Markdown posts with front matter into article pages, refresh the
article cards and popular posts of the blog list pages, and write a
posts.json summary.

EXAMPLES:
  Build every post in ./posts:
    inkpress build

  Fail the build when a post could not be processed:
    inkpress build --strict

  Create a new post template:
    inkpress new "My New Post"

  Show what was built:
    inkpress list
    inkpress stats
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Site root; relative paths in the config resolve against it
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Path to a JSON config file (relative to the root)
    #[arg(short, long, global = true, default_value = "inkpress.json")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build all posts
    Build {
        /// Exit with an error when any post failed
        #[arg(long)]
        strict: bool,
    },

    /// Create a new Markdown post
    New {
        /// Post title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,

        /// Post language (zh or en)
        #[arg(short, long, default_value = "zh")]
        lang: Language,

        /// Post category
        #[arg(long)]
        category: Option<String>,
    },

    /// List the posts of the last build
    List,

    /// Show statistics of the last build
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("inkpress=debug,info")
    } else {
        EnvFilter::new("inkpress=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = load_config(&cli.root, &cli.config)?;

    match &cli.command {
        Commands::Build { strict } => build(config, *strict),
        Commands::New {
            title,
            lang,
            category,
        } => new_post(&config, &title.join(" "), *lang, category.as_deref()),
        Commands::List => list_posts(&config),
        Commands::Stats => show_stats(&config),
    }
}

fn load_config(root: &Path, path: &Path) -> Result<Config> {
    let path = if path.is_absolute() { path.to_path_buf() } else { root.join(path) };
    let config = if path.exists() {
        Config::load(&path).with_context(|| format!("Failed to read config {:?}", path))?
    } else {
        tracing::debug!("No config at {:?}, using defaults", path);
        Config::default()
    };
    Ok(config.resolve(root))
}

fn build(config: Config, strict: bool) -> Result<()> {
    println!("\n🚀 Building blog from {:?}\n", config.posts_dir);

    let builder = BlogBuilder::with_config(config);
    let stats = builder.run().context("Build failed")?;

    print_summary(&stats);

    if strict && !stats.is_clean() {
        anyhow::bail!(
            "{} post(s) failed to build, {} output(s) could not be written",
            stats.files_failed,
            stats.output_failures
        );
    }
    Ok(())
}

fn print_summary(stats: &BuildStats) {
    let categories = stats.categories.iter().cloned().collect::<Vec<_>>().join(", ");

    println!("\n╔══════════════════════════════════════════════════════════════════╗");
    println!("║                       ✅ Build Complete!                          ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!(
        "║  Markdown files:     {:>10}                                  ║",
        stats.files_found
    );
    println!(
        "║  Articles built:     {:>10}                                  ║",
        stats.articles_built
    );
    println!(
        "║  Chinese / English:  {:>4} / {:<4}                                 ║",
        stats.zh_articles, stats.en_articles
    );
    println!(
        "║  List pages updated: {:>10}                                  ║",
        stats.list_pages_updated
    );
    if let Some(duration) = stats.duration_secs {
        println!(
            "║  Duration:           {:>10.2}s                                 ║",
            duration
        );
    }
    println!("╚══════════════════════════════════════════════════════════════════╝");

    if !categories.is_empty() {
        println!("\n📂 Categories: {}", categories);
    }
    if stats.slug_collisions > 0 {
        let message = format!(
            "⚠️  {} slug collision(s), later posts overwrote earlier pages",
            stats.slug_collisions
        );
        println!("{}", style(message).yellow());
    }
    if stats.missing_images > 0 {
        let message = format!(
            "📸 {} missing image(s), see warnings above",
            stats.missing_images
        );
        println!("{}", style(message).yellow());
    }
    if stats.files_failed > 0 {
        let message = format!("❌ {} file(s) failed", stats.files_failed);
        println!("{}", style(message).red());
    }
    if stats.output_failures > 0 {
        let message = format!(
            "❌ {} list page(s) or posts.json could not be written",
            stats.output_failures
        );
        println!("{}", style(message).red());
    }
}

fn new_post(config: &Config, title: &str, lang: Language, category: Option<&str>) -> Result<()> {
    let mut post = NewPost::new(title).with_language(lang);
    if let Some(category) = category {
        post = post.with_category(category);
    }

    let path = post.create(config).context("Failed to create post")?;

    println!("✅ New post created: {:?}", path);
    println!("\nWhen you are done editing, build with:");
    println!("   inkpress build");
    Ok(())
}

fn load_posts(config: &Config) -> Result<Vec<PostSummary>> {
    let path = config.posts_json_path();
    read_posts_json(&path)
        .with_context(|| format!("Cannot read {:?}. Run `inkpress build` first.", path))
}

fn list_posts(config: &Config) -> Result<()> {
    let posts = load_posts(config)?;

    println!("\n📚 {} post(s)\n", posts.len());
    for (i, post) in posts.iter().enumerate() {
        println!(
            "{:>3}. {} {}",
            i + 1,
            style(&post.title).bold(),
            style(format!("[{}]", post.language)).dim()
        );
        println!(
            "     📅 {}  📂 {}  🏷️  {}",
            post.date,
            post.category,
            post.tags.join(", ")
        );
        println!("     🔗 {}", post.url);
    }
    Ok(())
}

fn show_stats(config: &Config) -> Result<()> {
    let posts = load_posts(config)?;

    let mut by_language: BTreeMap<Language, usize> = BTreeMap::new();
    let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_tag: BTreeMap<&str, usize> = BTreeMap::new();
    for post in &posts {
        *by_language.entry(post.language).or_default() += 1;
        *by_category.entry(post.category.as_str()).or_default() += 1;
        for tag in &post.tags {
            *by_tag.entry(tag.as_str()).or_default() += 1;
        }
    }
    let total_views: u64 = posts.iter().map(|p| u64::from(p.views)).sum();
    let total_minutes: u64 = posts.iter().map(|p| u64::from(p.read_time)).sum();

    let mut top_tags: Vec<_> = by_tag.into_iter().collect();
    top_tags.sort_by(|a, b| b.1.cmp(&a.1));

    println!("\n📊 Blog statistics");
    println!("{}", "─".repeat(50));
    println!("Total posts:   {}", posts.len());
    for lang in Language::all() {
        println!("  {:<14} {}", lang.display_name(), by_language.get(lang).copied().unwrap_or(0));
    }
    println!("Total views:   {}", total_views);
    println!("Reading time:  {} min", total_minutes);
    println!("\nCategories:");
    for (category, count) in &by_category {
        println!("  {:<14} {}", category, count);
    }
    println!("\nTop tags:");
    for (tag, count) in top_tags.iter().take(10) {
        println!("  {:<14} {}", tag, count);
    }
    println!("{}", "─".repeat(50));
    Ok(())
}
