//! Article assembly
//!
//! Turns the front matter and body of one post into an [`Article`],
//! filling everything the author left out.

use std::borrow::Cow;
use std::path::Path;

use chrono::NaiveDate;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::article::Article;
use crate::config::Config;
use crate::error::{BuildError, Result};
use crate::front_matter::{FrontMatterParser, Metadata};
use crate::images::{image_html, ImageRewriter, MissingImage};
use crate::text;
use crate::Language;

/// Builds article records from Markdown sources
pub struct ContentAssembler {
    images: ImageRewriter,
    default_author: String,
    default_category: String,
    default_tags: Vec<String>,
    excerpt_length: usize,
    words_per_minute: u32,
    cjk_chars_per_minute: u32,
    today: NaiveDate,
}

impl ContentAssembler {
    /// Create an assembler from the build config
    pub fn new(config: &Config) -> Self {
        Self {
            images: ImageRewriter::new(&config.images_dir, &config.site_root),
            default_author: config.default_author.clone(),
            default_category: config.default_category.clone(),
            default_tags: config.default_tags.clone(),
            excerpt_length: config.excerpt_length,
            words_per_minute: config.words_per_minute,
            cjk_chars_per_minute: config.cjk_chars_per_minute,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Set the date given to posts without one
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn images(&self) -> &ImageRewriter {
        &self.images
    }

    /// Read and assemble a Markdown file.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD.
    pub fn assemble_file(&self, path: &Path) -> Result<Article> {
        let bytes = std::fs::read(path).map_err(|e| BuildError::io(path, e))?;
        let source = String::from_utf8_lossy(&bytes);
        if let Cow::Owned(_) = source {
            tracing::warn!("{:?} is not valid UTF-8, invalid bytes were replaced", path);
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.assemble(&stem, &source))
    }

    /// Assemble an article from the file stem and raw text of a post.
    ///
    /// Counters not given in front matter stay at zero, see
    /// [`Article::seed_counters`].
    pub fn assemble(&self, file_stem: &str, source: &str) -> Article {
        let parsed = FrontMatterParser::parse(source);
        let meta = &parsed.metadata;
        let body = parsed.body;

        let title = meta
            .str("title")
            .map(str::to_string)
            .unwrap_or_else(|| text::title_from_stem(file_stem));
        let slug = self.slug_for(meta, file_stem);

        let language = match meta.str("language").or_else(|| meta.str("lang")) {
            Some(code) => Language::from_code(code).unwrap_or_else(|| {
                tracing::warn!(
                    "Unknown language '{}' in {}, guessing from file name",
                    code,
                    file_stem
                );
                Language::from_file_stem(file_stem)
            }),
            None => Language::from_file_stem(file_stem),
        };

        let tags = meta
            .list("tags")
            .map(|tags| {
                tags.into_iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|tags| !tags.is_empty())
            .unwrap_or_else(|| self.default_tags.clone());

        let excerpt = meta
            .str("excerpt")
            .map(str::to_string)
            .unwrap_or_else(|| text::excerpt(body, self.excerpt_length));

        let read_time = meta
            .number("readTime")
            .or_else(|| meta.number("read_time"))
            .filter(|&minutes| minutes > 0)
            .unwrap_or_else(|| {
                text::read_time(body, self.words_per_minute, self.cjk_chars_per_minute)
            });

        let cover = meta.str("cover").map(str::to_string);
        let thumbnail = meta.str("thumbnail").map(str::to_string);
        // Covers are checked but not rewritten
        let mut missing_images: Vec<MissingImage> = cover
            .iter()
            .chain(thumbnail.iter())
            .filter_map(|image| self.images.check(image, &title, &slug).1)
            .collect();

        let (html_content, body_missing) = self.render_markdown(body, &slug);
        missing_images.extend(body_missing);

        Article {
            title,
            date: meta
                .str("date")
                .map(str::to_string)
                .unwrap_or_else(|| self.today.format("%Y-%m-%d").to_string()),
            category: meta
                .str("category")
                .map(str::to_string)
                .unwrap_or_else(|| self.default_category.clone()),
            tags,
            author: meta
                .str("author")
                .map(str::to_string)
                .unwrap_or_else(|| self.default_author.clone()),
            language,
            excerpt,
            read_time,
            views: meta.number("views").unwrap_or(0),
            comments: meta.number("comments").unwrap_or(0),
            likes: meta.number("likes").unwrap_or(0),
            cover,
            thumbnail,
            html_content,
            file_name: file_stem.to_string(),
            missing_images,
            slug,
        }
    }

    /// Explicit slug, else the title, else the file name.
    fn slug_for(&self, meta: &Metadata, file_stem: &str) -> String {
        [meta.str("slug"), meta.str("title"), Some(file_stem)]
            .into_iter()
            .flatten()
            .map(text::slugify)
            .find(|slug| !slug.is_empty())
            .unwrap_or_else(|| "post".to_string())
    }

    /// Convert a Markdown body to HTML with line breaks kept.
    ///
    /// Images are resolved against the image library and emitted as
    /// lazy-loading `<img>`/`<figure>` markup.
    pub fn render_markdown(&self, body: &str, slug: &str) -> (String, Vec<MissingImage>) {
        if body.trim().is_empty() {
            return (String::new(), Vec::new());
        }

        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut events = Vec::new();
        let mut missing = Vec::new();
        let mut pending: Option<PendingImage> = None;

        for event in Parser::new_ext(body, options) {
            if pending.is_some() {
                match event {
                    Event::End(TagEnd::Image) => {
                        if let Some(image) = pending.take() {
                            let (src, lost) = self.images.check(&image.dest, &image.alt, slug);
                            missing.extend(lost);
                            let markup = image_html(&src, &image.alt, &image.title);
                            events.push(Event::InlineHtml(CowStr::from(markup)));
                        }
                    }
                    Event::Text(t) | Event::Code(t) => {
                        if let Some(image) = pending.as_mut() {
                            image.alt.push_str(&t);
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::Image { dest_url, title, .. }) => {
                    pending = Some(PendingImage {
                        dest: dest_url.to_string(),
                        title: title.to_string(),
                        alt: String::new(),
                    });
                }
                Event::SoftBreak => events.push(Event::HardBreak),
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        (html_output, missing)
    }
}

/// Image whose alt text is still being collected
struct PendingImage {
    dest: String,
    title: String,
    alt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler() -> ContentAssembler {
        let config = Config::new()
            .with_images_dir("/nonexistent/images")
            .with_default_author("Default Author");
        ContentAssembler::new(&config).with_today(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    #[test]
    fn test_defaults_without_front_matter() {
        let article = assembler().assemble("my-first-post", "Hello world, this is the body.");
        assert_eq!(article.title, "My First Post");
        assert_eq!(article.slug, "my-first-post");
        assert_eq!(article.date, "2024-06-01");
        assert_eq!(article.category, "tech");
        assert_eq!(article.tags, vec!["tech".to_string()]);
        assert_eq!(article.author, "Default Author");
        assert_eq!(article.language, Language::Zh);
        assert_eq!(article.excerpt, "Hello world, this is the body.");
        assert_eq!(article.read_time, 1);
        assert_eq!(article.views, 0);
        assert!(article.html_content.contains("<p>Hello world, this is the body.</p>"));
    }

    #[test]
    fn test_front_matter_overrides() {
        let source = "---\ntitle: My First Post!\ndate: 2024-01-15\ncategory: life\ntags: [a, b]\nauthor: Me\nlanguage: en\nexcerpt: Custom\nviews: 99\n---\nBody text";
        let article = assembler().assemble("whatever", source);
        assert_eq!(article.title, "My First Post!");
        assert_eq!(article.slug, "my-first-post");
        assert_eq!(article.date, "2024-01-15");
        assert_eq!(article.category, "life");
        assert_eq!(article.tags, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(article.author, "Me");
        assert_eq!(article.language, Language::En);
        assert_eq!(article.excerpt, "Custom");
        assert_eq!(article.views, 99);
        assert_eq!(article.file_name, "whatever");
    }

    #[test]
    fn test_slug_falls_back_to_file_name() {
        let article = assembler().assemble("rust-notes", "---\ntitle: 学习笔记\n---\n正文");
        assert_eq!(article.title, "学习笔记");
        assert_eq!(article.slug, "rust-notes");

        let article = assembler().assemble("笔记", "---\ntitle: 学习笔记\n---\n正文");
        assert_eq!(article.slug, "post");
    }

    #[test]
    fn test_english_file_name() {
        let article = assembler().assemble("hello-en", "Body");
        assert_eq!(article.language, Language::En);
    }

    #[test]
    fn test_read_time_from_body() {
        let body = "word ".repeat(450);
        let article = assembler().assemble("long", &body);
        assert_eq!(article.read_time, 3);
        assert!(article.excerpt.chars().count() <= 203);
    }

    #[test]
    fn test_line_breaks_enabled() {
        let (html, _) = assembler().render_markdown("line one\nline two", "p");
        assert!(html.contains("line one<br />"));
    }

    #[test]
    fn test_images_rewritten_and_reported() {
        let body = "![center chart](chart.png \"Results\")\n\n![x](https://e.com/a.png)";
        let (html, missing) = assembler().render_markdown(body, "p");
        assert!(html.contains("<figure class=\"image-figure\">"));
        assert!(html.contains("src=\"../images/posts/p/chart.png\""));
        assert!(html.contains("class=\"article-image center-image\""));
        assert!(html.contains("src=\"https://e.com/a.png\""));
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].alt, "center chart");
    }

    #[test]
    fn test_missing_cover_is_reported() {
        let source = "---\ntitle: Covered\ncover: cover.png\nthumbnail: https://e.com/t.png\n---\n![a](body.png)";
        let article = assembler().assemble("covered", source);
        assert_eq!(article.cover.as_deref(), Some("cover.png"));
        let references: Vec<_> = article
            .missing_images
            .iter()
            .map(|m| m.reference.as_str())
            .collect();
        assert_eq!(references, vec!["cover.png", "body.png"]);
        assert_eq!(
            article.missing_images[0].expected,
            Path::new("/nonexistent/images/posts/covered/cover.png")
        );
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cafe.md");
        std::fs::write(&path, b"---\ntitle: Caf\xe9\n---\nbody \xff end").unwrap();

        let article = assembler().assemble_file(&path).unwrap();
        assert_eq!(article.title, "Caf\u{fffd}");
        assert_eq!(article.slug, "caf");
        assert!(article.html_content.contains("body \u{fffd} end"));
    }
}
