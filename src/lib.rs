//! # inkpress
//!
//! Build a bilingual static blog from Markdown posts.
//!
//! This crate provides tools to:
//! - Split posts into front matter metadata and a Markdown body
//! - Assemble article records with derived excerpt, slug and reading time
//! - Render article pages and splice article cards into blog list pages
//! - Write a `posts.json` summary of the whole blog
//!
//! ## Quick Start
//!
//! ```bash
//! # Scaffold a new post
//! inkpress new "My First Post"
//!
//! # Build every post in ./posts
//! inkpress build
//! ```

pub mod article;
pub mod assembler;
pub mod builder;
pub mod config;
pub mod error;
pub mod front_matter;
pub mod images;
pub mod list_page;
pub mod render;
pub mod scaffold;
pub mod text;

pub use article::{Article, BuildStats, PostSummary};
pub use assembler::ContentAssembler;
pub use builder::BlogBuilder;
pub use config::Config;
pub use error::{BuildError, Result};
pub use front_matter::{FrontMatterParser, MetaValue, Metadata};
pub use list_page::{ListPage, ListPageUpdater, Slot};

use serde::{Deserialize, Serialize};

/// Languages the blog is published in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Simplified Chinese
    #[default]
    Zh,
    /// English
    En,
}

impl Language {
    /// Language code used in front matter and `posts.json`
    pub fn code(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }

    /// Value of the `<html lang>` attribute
    pub fn html_lang(&self) -> &'static str {
        match self {
            Language::Zh => "zh-CN",
            Language::En => "en",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Zh => "Chinese (中文)",
            Language::En => "English",
        }
    }

    /// Parse from string
    pub fn from_code(code: &str) -> Option<Language> {
        match code.trim().to_lowercase().as_str() {
            "zh" | "zh-cn" | "cn" | "chinese" | "中文" => Some(Language::Zh),
            "en" | "en-us" | "english" => Some(Language::En),
            _ => None,
        }
    }

    /// Language implied by a post file name: `-en` marks English posts.
    pub fn from_file_stem(stem: &str) -> Language {
        if stem.contains("-en") {
            Language::En
        } else {
            Language::Zh
        }
    }

    /// Get all languages
    pub fn all() -> &'static [Language] {
        &[Language::Zh, Language::En]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = BuildError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| BuildError::UnknownLanguage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("EN"), Some(Language::En));
        assert_eq!(Language::from_code("zh"), Some(Language::Zh));
        assert_eq!(Language::from_code("fr"), None);
        assert!("xx".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_from_file_stem() {
        assert_eq!(Language::from_file_stem("hello-en"), Language::En);
        assert_eq!(Language::from_file_stem("hello-english-notes"), Language::En);
        assert_eq!(Language::from_file_stem("hello"), Language::Zh);
    }
}
