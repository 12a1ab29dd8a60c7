//! Build configuration

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};
use crate::Language;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site root that other relative references resolve against
    pub site_root: PathBuf,
    /// Directory holding the Markdown posts
    pub posts_dir: PathBuf,
    /// Output directory for generated article pages
    pub articles_dir: PathBuf,
    /// Root of the image library
    pub images_dir: PathBuf,
    /// Static blog list page per language
    pub blog_pages: BTreeMap<Language, PathBuf>,
    /// Author used when a post does not name one
    pub default_author: String,
    /// Category used when a post does not name one
    pub default_category: String,
    /// Tags used when a post has none
    pub default_tags: Vec<String>,
    /// Maximum excerpt length in characters
    pub excerpt_length: usize,
    /// Reading speed for Latin text
    pub words_per_minute: u32,
    /// Reading speed for CJK text
    pub cjk_chars_per_minute: u32,
    /// Number of entries in the popular posts list
    pub popular_count: usize,
    /// Create `images/posts/<slug>` for every article
    pub create_image_dirs: bool,
    /// Show a progress bar while building
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        let mut blog_pages = BTreeMap::new();
        blog_pages.insert(Language::Zh, PathBuf::from("src/pages/blog.html"));
        blog_pages.insert(Language::En, PathBuf::from("src/pages/blog-en.html"));

        Self {
            site_root: PathBuf::from("."),
            posts_dir: PathBuf::from("posts"),
            articles_dir: PathBuf::from("articles"),
            images_dir: PathBuf::from("public/images"),
            blog_pages,
            default_author: "Anonymous".to_string(),
            default_category: "tech".to_string(),
            default_tags: vec!["tech".to_string()],
            excerpt_length: 200,
            words_per_minute: 200,
            cjk_chars_per_minute: 250,
            popular_count: 4,
            create_image_dirs: true,
            show_progress: true,
        }
    }
}

impl Config {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the posts directory
    pub fn with_posts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.posts_dir = path.into();
        self
    }

    /// Set the output directory
    pub fn with_articles_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.articles_dir = path.into();
        self
    }

    /// Set the image library directory
    pub fn with_images_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.images_dir = path.into();
        self
    }

    /// Set the list page of a language
    pub fn with_blog_page(mut self, lang: Language, path: impl Into<PathBuf>) -> Self {
        self.blog_pages.insert(lang, path.into());
        self
    }

    pub fn with_default_author(mut self, author: impl Into<String>) -> Self {
        self.default_author = author.into();
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_image_dirs(mut self, create: bool) -> Self {
        self.create_image_dirs = create;
        self
    }

    /// Anchor every relative path at `root`.
    pub fn resolve(mut self, root: &Path) -> Self {
        let anchor = |p: &PathBuf| if p.is_absolute() { p.clone() } else { root.join(p) };
        self.site_root = root.to_path_buf();
        self.posts_dir = anchor(&self.posts_dir);
        self.articles_dir = anchor(&self.articles_dir);
        self.images_dir = anchor(&self.images_dir);
        for page in self.blog_pages.values_mut() {
            *page = anchor(&*page);
        }
        self
    }

    /// Get the path to the posts summary
    pub fn posts_json_path(&self) -> PathBuf {
        self.posts_dir.join("posts.json")
    }

    /// Get the path of an article page
    pub fn article_path(&self, file_name: &str) -> PathBuf {
        self.articles_dir.join(file_name)
    }

    /// Get the image directory of an article
    pub fn post_images_dir(&self, slug: &str) -> PathBuf {
        self.images_dir.join("posts").join(slug)
    }

    /// Save config to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| BuildError::io(path, e))?;
        Ok(())
    }

    /// Load config from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"posts_dir": "content", "popular_count": 6}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.posts_dir, PathBuf::from("content"));
        assert_eq!(config.popular_count, 6);
        assert_eq!(config.excerpt_length, 200);
        assert_eq!(config.blog_pages.len(), 2);
    }

    #[test]
    fn test_blog_pages_keyed_by_code() {
        let config: Config =
            serde_json::from_str(r#"{"blog_pages": {"en": "blog-en.html"}}"#).unwrap();
        assert_eq!(config.blog_pages.get(&Language::En), Some(&PathBuf::from("blog-en.html")));
        assert!(config.blog_pages.get(&Language::Zh).is_none());
    }

    #[test]
    fn test_resolve_anchors_relative_paths() {
        let config = Config::new().resolve(Path::new("/site"));
        assert_eq!(config.posts_dir, PathBuf::from("/site/posts"));
        assert_eq!(config.posts_json_path(), PathBuf::from("/site/posts/posts.json"));
        assert_eq!(
            config.blog_pages.get(&Language::En),
            Some(&PathBuf::from("/site/src/pages/blog-en.html"))
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inkpress.json");
        Config::new().with_default_author("someone").save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.default_author, "someone");
    }
}
