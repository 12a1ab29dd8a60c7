//! Image references in posts
//!
//! Markdown bodies refer to images in three ways: remote URLs (kept as is),
//! paths into the shared library (`../images/...`) and bare file names,
//! which live in the post's own folder `images/posts/<slug>/`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::text::html_escape;

/// A local image a post refers to but that does not exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingImage {
    pub alt: String,
    pub reference: String,
    pub expected: PathBuf,
}

/// Where an image reference points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Remote URL, never checked
    Remote,
    /// Local file: `src` goes into the page, `path` is checked on disk
    Local { src: String, path: PathBuf },
}

/// Resolves image references against the image library
#[derive(Debug, Clone)]
pub struct ImageRewriter {
    images_dir: PathBuf,
    site_root: PathBuf,
}

impl ImageRewriter {
    pub fn new(images_dir: impl Into<PathBuf>, site_root: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            site_root: site_root.into(),
        }
    }

    /// Resolve an image reference of the post `slug`.
    pub fn resolve(&self, reference: &str, slug: &str) -> ImageSource {
        let reference = reference.trim();
        if reference.starts_with("http")
            || reference.starts_with("//")
            || reference.starts_with("data:")
        {
            return ImageSource::Remote;
        }

        if let Some(rest) = reference.strip_prefix("../images/") {
            return ImageSource::Local {
                src: reference.to_string(),
                path: self.images_dir.join(rest),
            };
        }

        if !reference.contains('/') {
            return ImageSource::Local {
                src: format!("../images/posts/{}/{}", slug, reference),
                path: self.images_dir.join("posts").join(slug).join(reference),
            };
        }

        ImageSource::Local {
            src: reference.to_string(),
            path: self.site_root.join(reference.trim_start_matches('/')),
        }
    }

    /// Resolve a reference and check that a local target exists.
    ///
    /// Returns the `src` to emit and the missing image, if any.
    pub fn check(&self, reference: &str, alt: &str, slug: &str) -> (String, Option<MissingImage>) {
        match self.resolve(reference, slug) {
            ImageSource::Remote => (reference.to_string(), None),
            ImageSource::Local { src, path } => {
                let missing = if path.exists() {
                    None
                } else {
                    tracing::warn!("Image not found for '{}': {:?}", slug, path);
                    Some(MissingImage {
                        alt: alt.to_string(),
                        reference: reference.to_string(),
                        expected: path,
                    })
                };
                (src, missing)
            }
        }
    }

    /// Directory for the post's own images
    pub fn post_dir(&self, slug: &str) -> PathBuf {
        self.images_dir.join("posts").join(slug)
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }
}

/// `<img>` markup for a post image; titled images get a `<figure>`.
///
/// Keywords in the alt text select layout classes: `center`, `small`,
/// `large`, `float-left`, `float-right`. `priority` marks the image for
/// early fetching.
pub fn image_html(src: &str, alt: &str, title: &str) -> String {
    let alt_lower = alt.to_lowercase();
    let mut class = String::from("article-image");
    for (keyword, extra) in [
        ("center", " center-image"),
        ("small", " small-image"),
        ("large", " large-image"),
        ("float-left", " float-left"),
        ("float-right", " float-right"),
    ] {
        if alt_lower.contains(keyword) {
            class.push_str(extra);
        }
    }

    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(" title=\"{}\"", html_escape(title))
    };
    let priority = if alt_lower.contains("priority") {
        " fetchpriority=\"high\""
    } else {
        ""
    };

    let img = format!(
        "<img src=\"{}\" alt=\"{}\"{} loading=\"lazy\" class=\"{}\" decoding=\"async\"{}>",
        html_escape(src),
        html_escape(alt),
        title_attr,
        class,
        priority
    );

    if title.is_empty() {
        img
    } else {
        format!(
            "<figure class=\"image-figure\">\n    {}\n    <figcaption>{}</figcaption>\n</figure>",
            img,
            html_escape(title)
        )
    }
}
