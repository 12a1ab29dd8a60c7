//! Page rendering
//!
//! Article pages and list page fragments are compiled templates under
//! `templates/`, filled through named fields.

use askama::Template;
use chrono::Datelike;

use crate::article::{parse_date, Article};
use crate::error::Result;
use crate::Language;

/// Tags shown on an article card
const CARD_TAGS: usize = 3;

/// Characters of the title used in placeholder images
const PLACEHOLDER_TITLE_CHARS: usize = 20;

/// Localised interface strings
#[derive(Debug)]
pub struct Labels {
    pub site_name: &'static str,
    pub home: &'static str,
    pub about: &'static str,
    pub projects: &'static str,
    pub blog: &'static str,
    pub resume: &'static str,
    pub contact: &'static str,
    pub min_read: &'static str,
    pub views: &'static str,
    pub read_more: &'static str,
    pub back_nav: &'static str,
    pub blog_home: &'static str,
    pub back_home: &'static str,
    pub rights: &'static str,
    pub home_href: &'static str,
    pub blog_href: &'static str,
    pub resume_href: &'static str,
}

static ZH_LABELS: Labels = Labels {
    site_name: "刘浩洋",
    home: "首页",
    about: "关于我",
    projects: "项目作品",
    blog: "博客",
    resume: "简历",
    contact: "联系我",
    min_read: "分钟阅读",
    views: "阅读",
    read_more: "阅读全文",
    back_nav: "返回导航",
    blog_home: "博客首页",
    back_home: "返回主页",
    rights: "刘浩洋. 保留所有权利.",
    home_href: "index.html",
    blog_href: "blog.html",
    resume_href: "resume.html",
};

static EN_LABELS: Labels = Labels {
    site_name: "Liu Haoyang",
    home: "Home",
    about: "About",
    projects: "Projects",
    blog: "Blog",
    resume: "Resume",
    contact: "Contact",
    min_read: "min read",
    views: "views",
    read_more: "Read More",
    back_nav: "Back to Navigation",
    blog_home: "Blog Home",
    back_home: "Back Home",
    rights: "Liu Haoyang. All rights reserved.",
    home_href: "index-en.html",
    blog_href: "blog-en.html",
    resume_href: "resume-en.html",
};

impl Labels {
    pub fn for_language(lang: Language) -> &'static Labels {
        match lang {
            Language::Zh => &ZH_LABELS,
            Language::En => &EN_LABELS,
        }
    }
}

/// Display name of a category; unknown categories are shown as is.
pub fn category_label(category: &str, lang: Language) -> String {
    let label = match (lang, category) {
        (Language::Zh, "tech") => "技术",
        (Language::Zh, "tutorial") => "教程",
        (Language::Zh, "life") => "生活",
        (Language::Zh, "thoughts") => "思考",
        (Language::En, "tech") => "Tech",
        (Language::En, "tutorial") => "Tutorial",
        (Language::En, "life") => "Life",
        (Language::En, "thoughts") => "Thoughts",
        _ => category,
    };
    label.to_string()
}

/// `January 5, 2024` or `2024年1月5日`; unreadable dates are kept verbatim.
pub fn format_date(date: &str, lang: Language) -> String {
    match parse_date(date) {
        Some(day) => match lang {
            Language::En => day.format("%B %-d, %Y").to_string(),
            Language::Zh => format!("{}年{}月{}日", day.year(), day.month(), day.day()),
        },
        None => date.to_string(),
    }
}

/// Card image: the thumbnail, else the cover, else a generated placeholder
pub fn card_image(article: &Article) -> String {
    if let Some(image) = article.thumbnail.as_ref().or(article.cover.as_ref()) {
        return image.clone();
    }
    let text: String = article.title.chars().take(PLACEHOLDER_TITLE_CHARS).collect();
    format!(
        "https://via.placeholder.com/600x300/4F46E5/FFFFFF?text={}",
        urlencoding::encode(&text)
    )
}

#[derive(Template)]
#[template(path = "article.html")]
struct ArticlePage<'a> {
    article: &'a Article,
    labels: &'static Labels,
    html_lang: &'static str,
    is_en: bool,
    date: String,
    year: i32,
}

#[derive(Template)]
#[template(path = "article_card.html")]
struct ArticleCard<'a> {
    article: &'a Article,
    labels: &'static Labels,
    url: String,
    category: String,
    date: String,
    image: String,
    tags: &'a [String],
}

#[derive(Template)]
#[template(path = "popular_item.html")]
struct PopularItem<'a> {
    article: &'a Article,
    labels: &'static Labels,
    url: String,
}

/// Full HTML page of an article, in the article's language
pub fn article_page(article: &Article) -> Result<String> {
    let lang = article.language;
    let page = ArticlePage {
        article,
        labels: Labels::for_language(lang),
        html_lang: lang.html_lang(),
        is_en: lang == Language::En,
        date: format_date(&article.date, lang),
        year: article
            .parsed_date()
            .map(|d| d.year())
            .unwrap_or_else(|| chrono::Local::now().year()),
    };
    Ok(page.render()?)
}

/// Article card for the list page of `lang`
pub fn article_card(article: &Article, lang: Language) -> Result<String> {
    let card = ArticleCard {
        article,
        labels: Labels::for_language(lang),
        url: article.url(),
        category: category_label(&article.category, lang),
        date: format_date(&article.date, lang),
        image: card_image(article),
        tags: &article.tags[..article.tags.len().min(CARD_TAGS)],
    };
    Ok(card.render()?)
}

/// Popular posts entry for the list page of `lang`
pub fn popular_item(article: &Article, lang: Language) -> Result<String> {
    let item = PopularItem {
        article,
        labels: Labels::for_language(lang),
        url: article.url(),
    };
    Ok(item.render()?)
}
