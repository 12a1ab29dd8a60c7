//! Blog build pipeline

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;

use crate::article::{sort_newest_first, Article, BuildStats, PostSummary};
use crate::assembler::ContentAssembler;
use crate::config::Config;
use crate::error::{BuildError, Result};
use crate::list_page::ListPageUpdater;
use crate::render;

/// Builds article pages, list pages and `posts.json` from the posts directory
pub struct BlogBuilder {
    config: Config,
    assembler: ContentAssembler,
    updater: ListPageUpdater,
}

impl BlogBuilder {
    /// Create a builder with default config
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a builder with custom config
    pub fn with_config(config: Config) -> Self {
        let assembler = ContentAssembler::new(&config);
        let updater = ListPageUpdater::new(&config);
        Self {
            config,
            assembler,
            updater,
        }
    }

    /// Replace the assembler, e.g. to pin the default date
    pub fn with_assembler(mut self, assembler: ContentAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Get the config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a full build with counters seeded from the thread RNG
    pub fn run(&self) -> Result<BuildStats> {
        self.run_with_rng(&mut rand::rng())
    }

    /// Run a full build over every discovered post.
    ///
    /// Only a posts directory that cannot be listed or created fails the
    /// build.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> Result<BuildStats> {
        tracing::info!("Processing Markdown files in {:?}...", self.config.posts_dir);
        let files = self.discover()?;
        self.build_files(&files, rng)
    }

    /// Build the given posts.
    ///
    /// Per-file failures are logged and counted, never fatal. When no
    /// article could be built, list pages and `posts.json` are left as
    /// they are.
    pub fn build_files<R: Rng>(&self, files: &[PathBuf], rng: &mut R) -> Result<BuildStats> {
        let mut stats = BuildStats::new();
        stats.files_found = files.len() as u64;

        if files.is_empty() {
            tracing::warn!("No Markdown files found in {:?}", self.config.posts_dir);
            stats.finish();
            return Ok(stats);
        }

        let mut articles = self.assemble_all(files, rng, &mut stats);
        sort_newest_first(&mut articles);

        tracing::info!("Generating article pages...");
        let written = self.write_articles(articles, &mut stats);

        if written.is_empty() {
            tracing::warn!(
                "None of the {} Markdown files could be built, keeping list pages and posts.json",
                stats.files_found
            );
            stats.finish();
            return Ok(stats);
        }

        tracing::info!("Updating list pages...");
        self.updater.update_all(&written, &mut stats);

        tracing::info!("Writing posts.json...");
        if let Err(e) = self.write_posts_json(&written) {
            tracing::error!("Failed to write posts.json: {}", e);
            stats.output_failures += 1;
        }

        stats.finish();
        tracing::info!("Build complete!");
        tracing::info!("  Articles built: {}", stats.articles_built);
        tracing::info!("  Files failed: {}", stats.files_failed);
        tracing::info!("  List pages updated: {}", stats.list_pages_updated);
        if stats.output_failures > 0 {
            tracing::info!("  Output failures: {}", stats.output_failures);
        }

        Ok(stats)
    }

    /// Markdown files in the posts directory and its direct sub-directories,
    /// sorted by path. The directory is created when missing.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let dir = &self.config.posts_dir;
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| BuildError::io(dir, e))? {
            let path = entry.map_err(|e| BuildError::io(dir, e))?.path();
            if path.is_dir() {
                match fs::read_dir(&path) {
                    Ok(entries) => files.extend(
                        entries
                            .filter_map(|e| e.ok())
                            .map(|e| e.path())
                            .filter(|p| is_markdown(p)),
                    ),
                    Err(e) => tracing::error!("Failed to read directory {:?}: {}", path, e),
                }
            } else if is_markdown(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    fn assemble_all<R: Rng>(
        &self,
        files: &[PathBuf],
        rng: &mut R,
        stats: &mut BuildStats,
    ) -> Vec<Article> {
        let pb = self.progress_bar(files.len() as u64);
        let mut articles = Vec::with_capacity(files.len());

        for path in files {
            match self.assembler.assemble_file(path) {
                Ok(mut article) => {
                    article.seed_counters(rng);
                    tracing::debug!("Assembled '{}' from {:?}", article.title, path);
                    articles.push(article);
                }
                Err(e) => {
                    tracing::error!("Failed to process {:?}: {}", path, e);
                    stats.files_failed += 1;
                }
            }
            pb.set_message(format!("{} ok", articles.len()));
            pb.inc(1);
        }

        pb.finish_and_clear();
        articles
    }

    /// Write article pages, returning the articles that were written.
    fn write_articles(&self, articles: Vec<Article>, stats: &mut BuildStats) -> Vec<Article> {
        if let Err(e) = fs::create_dir_all(&self.config.articles_dir) {
            tracing::error!("Failed to create {:?}: {}", self.config.articles_dir, e);
        }

        let mut seen: HashMap<String, String> = HashMap::new();
        let mut written: Vec<Article> = Vec::with_capacity(articles.len());

        for article in articles {
            if let Some(previous) = seen.insert(article.slug.clone(), article.file_name.clone()) {
                tracing::warn!(
                    "Slug '{}' of '{}' was already used by '{}', its page is overwritten",
                    article.slug,
                    article.file_name,
                    previous
                );
                stats.slug_collisions += 1;
            }

            match self.write_article(&article) {
                Ok(path) => {
                    tracing::debug!("Wrote {:?}", path);
                    stats.record_article(&article);
                    written.push(article);
                }
                Err(e) => {
                    tracing::error!("Failed to write article '{}': {}", article.slug, e);
                    stats.files_failed += 1;
                }
            }
        }

        written
    }

    /// Render and write one article page
    pub fn write_article(&self, article: &Article) -> Result<PathBuf> {
        if self.config.create_image_dirs {
            let dir = self.config.post_images_dir(&article.slug);
            if !dir.exists() {
                fs::create_dir_all(&dir).map_err(|e| BuildError::io(&dir, e))?;
                tracing::debug!("Created image directory {:?}", dir);
            }
        }

        let html = render::article_page(article)?;
        let path = self.config.article_path(&article.output_file_name());
        fs::write(&path, html).map_err(|e| BuildError::io(&path, e))?;
        Ok(path)
    }

    /// Write the summary of every article to `posts.json`
    pub fn write_posts_json(&self, articles: &[Article]) -> Result<PathBuf> {
        let summaries: Vec<PostSummary> = articles.iter().map(Article::summary).collect();
        let path = self.config.posts_json_path();
        let json = serde_json::to_string_pretty(&summaries)?;
        fs::write(&path, json).map_err(|e| BuildError::io(&path, e))?;
        Ok(path)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} posts ({msg})")
        {
            pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }
        pb
    }
}

impl Default for BlogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read `posts.json`
pub fn read_posts_json(path: &Path) -> Result<Vec<PostSummary>> {
    let content = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

fn is_markdown(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "md")
}
