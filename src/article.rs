//! Article data structures

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::images::MissingImage;
use crate::Language;

/// A blog post assembled from one Markdown file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// URL-safe identifier, also the output file name
    #[serde(rename = "id")]
    pub slug: String,
    pub title: String,
    /// ISO date (`YYYY-MM-DD`)
    pub date: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub language: Language,
    pub excerpt: String,
    /// Estimated reading time in minutes
    pub read_time: u32,
    /// Cosmetic counters, seeded at build time unless given in front matter
    pub views: u32,
    pub comments: u32,
    pub likes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Rendered body
    pub html_content: String,
    /// Source file stem
    pub file_name: String,
    /// Local images referenced by the post that do not exist
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_images: Vec<MissingImage>,
}

impl Article {
    /// Relative URL of the article page, as linked from list pages
    pub fn url(&self) -> String {
        format!("articles/{}.html", self.slug)
    }

    /// Output file name of the article page
    pub fn output_file_name(&self) -> String {
        format!("{}.html", self.slug)
    }

    /// Parsed publication date, if the date string is readable
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    /// Fill counters left at zero with random presentation values.
    pub fn seed_counters<R: Rng>(&mut self, rng: &mut R) {
        if self.views == 0 {
            self.views = rng.random_range(100..2100);
        }
        if self.comments == 0 {
            self.comments = rng.random_range(1..51);
        }
        if self.likes == 0 {
            self.likes = rng.random_range(5..105);
        }
    }

    /// Summary entry for `posts.json`
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            id: self.slug.clone(),
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            date: self.date.clone(),
            category: self.category.clone(),
            tags: self.tags.clone(),
            author: self.author.clone(),
            language: self.language,
            read_time: self.read_time,
            views: self.views,
            comments: self.comments,
            likes: self.likes,
            url: self.url(),
            file_name: self.output_file_name(),
        }
    }
}

/// Parse `YYYY-MM-DD` or `YYYY/MM/DD`, ignoring any time part.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    let day = date.get(..10).unwrap_or(date);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day, "%Y/%m/%d"))
        .ok()
}

/// Sort newest first. Unreadable dates go last, keeping their order.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.parsed_date().cmp(&a.parsed_date()));
}

/// One entry of `posts.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub date: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub language: Language,
    pub read_time: u32,
    pub views: u32,
    pub comments: u32,
    pub likes: u32,
    pub url: String,
    pub file_name: String,
}

/// Statistics about one build run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildStats {
    /// Markdown files found
    pub files_found: u64,
    /// Article pages written
    pub articles_built: u64,
    /// Files that could not be read, assembled or written
    pub files_failed: u64,
    /// Articles per language
    pub zh_articles: u64,
    pub en_articles: u64,
    /// Categories seen in this build
    pub categories: BTreeSet<String>,
    /// Articles whose slug was already used by an earlier article
    pub slug_collisions: u64,
    /// Missing local images across all articles
    pub missing_images: u64,
    /// List pages rewritten
    pub list_pages_updated: u64,
    /// List pages or `posts.json` that could not be written
    pub output_failures: u64,
    /// Build start time
    pub started_at: DateTime<Utc>,
    /// Build end time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl BuildStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            ..Default::default()
        }
    }

    /// Count a successfully written article.
    pub fn record_article(&mut self, article: &Article) {
        self.articles_built += 1;
        match article.language {
            Language::Zh => self.zh_articles += 1,
            Language::En => self.en_articles += 1,
        }
        self.categories.insert(article.category.clone());
        self.missing_images += article.missing_images.len() as u64;
    }

    pub fn finish(&mut self) {
        let now = Utc::now();
        self.duration_secs = Some((now - self.started_at).num_milliseconds() as f64 / 1000.0);
        self.completed_at = Some(now);
    }

    /// True when every discovered file made it to an article page and
    /// every output was written
    pub fn is_clean(&self) -> bool {
        self.files_failed == 0 && self.output_failures == 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub(crate) fn sample(slug: &str, date: &str, language: Language) -> Article {
        Article {
            slug: slug.to_string(),
            title: slug.replace('-', " "),
            date: date.to_string(),
            category: "tech".to_string(),
            tags: vec!["rust".to_string()],
            author: "author".to_string(),
            language,
            excerpt: "excerpt".to_string(),
            read_time: 1,
            views: 0,
            comments: 0,
            likes: 0,
            cover: None,
            thumbnail: None,
            html_content: "<p>body</p>".to_string(),
            file_name: slug.to_string(),
            missing_images: Vec::new(),
        }
    }

    #[test]
    fn test_seed_counters_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut article = sample("a", "2024-01-01", Language::Zh);
            article.seed_counters(&mut rng);
            assert!((100..2100).contains(&article.views));
            assert!((1..51).contains(&article.comments));
            assert!((5..105).contains(&article.likes));
        }
    }

    #[test]
    fn test_seed_counters_keeps_given_values() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut article = sample("a", "2024-01-01", Language::Zh);
        article.views = 42;
        article.seed_counters(&mut rng);
        assert_eq!(article.views, 42);
        assert!(article.likes >= 5);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut articles = vec![
            sample("old", "2023-05-01", Language::Zh),
            sample("bad", "someday", Language::Zh),
            sample("new", "2024-02-10T08:00:00Z", Language::En),
            sample("mid", "2023/12/31", Language::Zh),
        ];
        sort_newest_first(&mut articles);
        let order: Vec<_> = articles.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(order, vec!["new", "mid", "old", "bad"]);
    }

    #[test]
    fn test_summary_json_shape() {
        let mut article = sample("hello-world", "2024-01-01", Language::En);
        article.read_time = 3;
        let json = serde_json::to_value(article.summary()).unwrap();
        assert_eq!(json["id"], "hello-world");
        assert_eq!(json["readTime"], 3);
        assert_eq!(json["language"], "en");
        assert_eq!(json["url"], "articles/hello-world.html");
        assert_eq!(json["fileName"], "hello-world.html");
    }
}
