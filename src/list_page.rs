//! Blog list pages
//!
//! The list pages are hand-written HTML with two regions regenerated on
//! every build: the article cards and the popular posts list. Each region is
//! a named [`Slot`]; a page missing a slot is an error, never a silent skip.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::article::{Article, BuildStats};
use crate::config::Config;
use crate::error::{BuildError, Result};
use crate::render;
use crate::Language;

static BLOG_POSTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)(<div class="blog-posts">)(.*?)(</div>\s*<div class="pagination">)"#).unwrap()
});
static POPULAR_POSTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)(<ul class="popular-posts">)(.*?)(</ul>)"#).unwrap());

/// A regenerated region of a list page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Article cards, inside `<div class="blog-posts">` before the pagination
    BlogPosts,
    /// Most viewed articles, inside `<ul class="popular-posts">`
    PopularPosts,
}

impl Slot {
    pub fn name(&self) -> &'static str {
        match self {
            Slot::BlogPosts => "blog-posts",
            Slot::PopularPosts => "popular-posts",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            Slot::BlogPosts => &BLOG_POSTS_RE,
            Slot::PopularPosts => &POPULAR_POSTS_RE,
        }
    }

    /// Slot contents with the indentation of the closing marker
    fn wrap(&self, content: &str) -> String {
        match self {
            Slot::BlogPosts => format!("\n{}\n                        ", content),
            Slot::PopularPosts => format!("{}\n                            ", content),
        }
    }
}

/// A list page with slots to fill
#[derive(Debug, Clone)]
pub struct ListPage {
    path: PathBuf,
    html: String,
    fills: Vec<(Slot, String)>,
}

impl ListPage {
    /// Read a list page from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let html = std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        Ok(Self::from_html(path, html))
    }

    pub fn from_html(path: impl Into<PathBuf>, html: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            html: html.into(),
            fills: Vec::new(),
        }
    }

    /// Replace the contents of `slot`
    pub fn fill(mut self, slot: Slot, content: impl Into<String>) -> Self {
        self.fills.push((slot, content.into()));
        self
    }

    pub fn has_slot(&self, slot: Slot) -> bool {
        slot.pattern().is_match(&self.html)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Page HTML with every filled slot replaced.
    pub fn render(&self) -> Result<String> {
        let mut html = self.html.clone();
        for (slot, content) in &self.fills {
            let pattern = slot.pattern();
            if !pattern.is_match(&html) {
                return Err(BuildError::SlotNotFound {
                    slot: slot.name(),
                    page: self.path.clone(),
                });
            }
            let inner = slot.wrap(content);
            html = pattern
                .replacen(&html, 1, |caps: &Captures| format!("{}{}{}", &caps[1], inner, &caps[3]))
                .into_owned();
        }
        Ok(html)
    }

    /// Render and write the page back to its path
    pub fn save(&self) -> Result<()> {
        let html = self.render()?;
        std::fs::write(&self.path, html).map_err(|e| BuildError::io(&self.path, e))
    }
}

/// Regenerates the list page of every language
pub struct ListPageUpdater {
    pages: BTreeMap<Language, PathBuf>,
    popular_count: usize,
}

impl ListPageUpdater {
    pub fn new(config: &Config) -> Self {
        Self {
            pages: config.blog_pages.clone(),
            popular_count: config.popular_count,
        }
    }

    /// Update every configured page from `articles` (newest first).
    ///
    /// Missing pages are skipped with a warning. Pages that cannot be
    /// updated, e.g. because a slot is missing, are left untouched and
    /// counted in `stats.output_failures`.
    pub fn update_all(&self, articles: &[Article], stats: &mut BuildStats) {
        for (&lang, path) in &self.pages {
            if !path.exists() {
                tracing::warn!("List page for {} not found, skipping: {:?}", lang, path);
                continue;
            }
            match self.update(lang, path, articles) {
                Ok(()) => {
                    tracing::info!("Updated list page {:?}", path);
                    stats.list_pages_updated += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to update list page {:?}: {}", path, e);
                    stats.output_failures += 1;
                }
            }
        }
    }

    /// Update one page with the articles of `lang`.
    pub fn update(&self, lang: Language, path: &Path, articles: &[Article]) -> Result<()> {
        self.build_page(ListPage::load(path)?, lang, articles)?.save()
    }

    /// Fill the slots of `page` with the articles of `lang`.
    pub fn build_page(
        &self,
        page: ListPage,
        lang: Language,
        articles: &[Article],
    ) -> Result<ListPage> {
        let localized: Vec<&Article> = articles.iter().filter(|a| a.language == lang).collect();

        let cards = localized
            .iter()
            .map(|article| render::article_card(article, lang))
            .collect::<Result<Vec<_>>>()?
            .join("\n");

        let popular = self
            .popular(&localized)
            .into_iter()
            .map(|article| render::popular_item(article, lang))
            .collect::<Result<Vec<_>>>()?
            .concat();

        Ok(page.fill(Slot::BlogPosts, cards).fill(Slot::PopularPosts, popular))
    }

    /// Most viewed articles, ties kept in date order
    pub fn popular<'a>(&self, articles: &[&'a Article]) -> Vec<&'a Article> {
        let mut ranked = articles.to_vec();
        ranked.sort_by(|a, b| b.views.cmp(&a.views));
        ranked.truncate(self.popular_count);
        ranked
    }
}
