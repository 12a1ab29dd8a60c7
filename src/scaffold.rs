//! New post scaffolding

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::config::Config;
use crate::error::{BuildError, Result};
use crate::text::slugify;
use crate::Language;

/// Options for a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub language: Language,
    pub category: Option<String>,
    pub date: NaiveDate,
}

impl NewPost {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            language: Language::default(),
            category: None,
            date: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_language(mut self, lang: Language) -> Self {
        self.language = lang;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// File stem of the new post; English posts get the `-en` suffix.
    pub fn file_stem(&self) -> String {
        let slug = match slugify(&self.title) {
            s if s.is_empty() => format!("post-{}", self.date.format("%Y%m%d")),
            s => s,
        };
        match self.language {
            Language::En if !slug.ends_with("-en") => format!("{}-en", slug),
            _ => slug,
        }
    }

    /// Markdown source of the new post
    pub fn markdown(&self, config: &Config) -> String {
        let category = self.category.as_deref().unwrap_or(&config.default_category);
        let tags = config
            .default_tags
            .iter()
            .map(|t| yaml_quote(t))
            .collect::<Vec<_>>()
            .join(", ");
        let (excerpt, intro, first, summary) = match self.language {
            Language::Zh => (
                format!("{}的简要描述", self.title),
                "在这里开始写您的文章内容...",
                "## 第一个标题\n\n您的内容...",
                "## 总结\n\n文章总结...",
            ),
            Language::En => (
                format!("A short description of {}", self.title),
                "Start writing your post here...",
                "## First Section\n\nYour content...",
                "## Summary\n\nWrap up...",
            ),
        };

        format!(
            "---\ntitle: {title}\ndate: {date}\ncategory: {category}\ntags: [{tags}]\nauthor: {author}\nlanguage: {lang}\nexcerpt: {excerpt}\n---\n\n# {heading}\n\n{intro}\n\n{first}\n\n{summary}\n",
            title = yaml_quote(&self.title),
            date = self.date.format("%Y-%m-%d"),
            category = yaml_quote(category),
            tags = tags,
            author = yaml_quote(&config.default_author),
            lang = self.language.code(),
            excerpt = yaml_quote(&excerpt),
            heading = self.title,
            intro = intro,
            first = first,
            summary = summary,
        )
    }

    /// Write the post into the posts directory. Existing files are never
    /// overwritten.
    pub fn create(&self, config: &Config) -> Result<PathBuf> {
        if self.title.trim().is_empty() {
            return Err(BuildError::EmptyTitle);
        }

        let dir = &config.posts_dir;
        std::fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;

        let path = dir.join(format!("{}.md", self.file_stem()));
        if path.exists() {
            return Err(BuildError::AlreadyExists(path));
        }

        std::fs::write(&path, self.markdown(config)).map_err(|e| BuildError::io(&path, e))?;
        tracing::info!("Created new post {:?}", path);
        Ok(path)
    }
}

/// Double-quote a YAML scalar
fn yaml_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ContentAssembler;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(NewPost::new("My First Post!").file_stem(), "my-first-post");
        assert_eq!(
            NewPost::new("Hello").with_language(Language::En).file_stem(),
            "hello-en"
        );
        assert_eq!(NewPost::new("新文章").with_date(date()).file_stem(), "post-20240309");
    }

    #[test]
    fn test_scaffold_round_trips_through_assembler() {
        let config = Config::new();
        let post = NewPost::new("Rust: \"Ownership\" explained")
            .with_language(Language::En)
            .with_category("tutorial")
            .with_date(date());
        let markdown = post.markdown(&config);

        let article = ContentAssembler::new(&config).assemble(&post.file_stem(), &markdown);
        assert_eq!(article.title, "Rust: \"Ownership\" explained");
        assert_eq!(article.date, "2024-03-09");
        assert_eq!(article.category, "tutorial");
        assert_eq!(article.language, Language::En);
        assert_eq!(article.tags, config.default_tags);
    }

    #[test]
    fn test_create_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_posts_dir(dir.path());
        let post = NewPost::new("Only Once").with_date(date());

        let path = post.create(&config).unwrap();
        assert_eq!(path, dir.path().join("only-once.md"));
        assert!(matches!(post.create(&config), Err(BuildError::AlreadyExists(_))));
    }

    #[test]
    fn test_create_requires_title() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_posts_dir(dir.path());
        assert!(matches!(NewPost::new("  ").create(&config), Err(BuildError::EmptyTitle)));
    }
}
