//! Text helpers: slugs, titles, excerpts and reading time

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex patterns (compiled once)
static NON_SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").unwrap());
static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_-]+").unwrap());
static WORD_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w").unwrap());

static CODE_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static IMAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#+\s").unwrap());
static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static INLINE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`(.*?)`").unwrap());
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static NEWLINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\r?\n)+").unwrap());

/// Common CJK ideographs, read per character rather than per word
static CJK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{4e00}-\u{9fa5}]").unwrap());

/// Turn a title into a URL-safe slug.
///
/// `"My First Post!"` becomes `"my-first-post"`. Slugifying a slug returns
/// it unchanged. The result is empty when the title has no ASCII word
/// characters.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let stripped = NON_SLUG_RE.replace_all(&lower, "");
    let hyphenated = SEPARATOR_RE.replace_all(&stripped, "-");
    hyphenated.trim_matches('-').to_string()
}

/// Title from a file stem: `my-first-post` becomes `My First Post`.
pub fn title_from_stem(stem: &str) -> String {
    let spaced = stem.replace('-', " ");
    WORD_START_RE
        .replace_all(&spaced, |caps: &regex::Captures| caps[0].to_uppercase())
        .into_owned()
}

/// Plain text of a Markdown body, newlines collapsed to spaces
pub fn strip_markdown(markdown: &str) -> String {
    let text = CODE_BLOCK_RE.replace_all(markdown, "");
    let text = IMAGE_RE.replace_all(&text, "");
    let text = HEADER_RE.replace_all(&text, "");
    let text = BOLD_RE.replace_all(&text, "$1");
    let text = ITALIC_RE.replace_all(&text, "$1");
    let text = INLINE_CODE_RE.replace_all(&text, "$1");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = NEWLINES_RE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Excerpt of at most `max_chars` characters, plus `...` when truncated
pub fn excerpt(markdown: &str, max_chars: usize) -> String {
    let plain = strip_markdown(markdown);
    match plain.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &plain[..cut]),
        None => plain,
    }
}

/// Reading time in whole minutes, never less than one.
///
/// Latin words count at `words_per_minute`, CJK ideographs at
/// `cjk_chars_per_minute`.
pub fn read_time(markdown: &str, words_per_minute: u32, cjk_chars_per_minute: u32) -> u32 {
    let cjk_chars = CJK_RE.find_iter(markdown).count() as f64;
    let without_cjk = CJK_RE.replace_all(markdown, " ");
    let words = without_cjk.split_whitespace().count() as f64;

    let minutes = words / f64::from(words_per_minute.max(1))
        + cjk_chars / f64::from(cjk_chars_per_minute.max(1));
    (minutes.ceil() as u32).max(1)
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My First Post!"), "my-first-post");
        assert_eq!(slugify("  Rust -- and __ WebAssembly  "), "rust-and-webassembly");
        assert_eq!(slugify("C++ & Go: 2024"), "c-go-2024");
        assert_eq!(slugify("我的文章"), "");
    }

    #[test]
    fn test_slugify_idempotent() {
        for title in ["My First Post!", "a_b c-d", "--Leading and trailing--", "Vue.js 3 入门"] {
            let once = slugify(title);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn test_title_from_stem() {
        assert_eq!(title_from_stem("my-first-post"), "My First Post");
        assert_eq!(title_from_stem("hello"), "Hello");
    }

    #[test]
    fn test_strip_markdown() {
        let md = "# Title\n\nSome **bold** and *italic* with `code` and [a link](http://x.y).\n\n```rust\nfn main() {}\n```\n![pic](a.png)\nEnd";
        assert_eq!(
            strip_markdown(md),
            "Title Some bold and italic with code and a link. End"
        );
    }

    #[test]
    fn test_excerpt_truncation() {
        let long = "word ".repeat(100);
        let e = excerpt(&long, 200);
        assert!(e.ends_with("..."));
        assert_eq!(e.chars().count(), 203);

        let short = excerpt("Just a line", 200);
        assert_eq!(short, "Just a line");
    }

    #[test]
    fn test_excerpt_counts_chars_not_bytes() {
        let chinese = "汉".repeat(300);
        let e = excerpt(&chinese, 200);
        assert_eq!(e.chars().count(), 203);
    }

    #[test]
    fn test_read_time() {
        let words = "lorem ".repeat(450);
        assert_eq!(read_time(&words, 200, 250), 3);
        assert_eq!(read_time("", 200, 250), 1);
        assert_eq!(read_time("one two", 200, 250), 1);
        assert_eq!(read_time(&"字".repeat(500), 200, 250), 2);
    }
}
