//! Slug and excerpt derivation.

const EXCERPT_CHARS: usize = 200;
const CARD_PREVIEW_CHARS: usize = 150;

/// Derive a URL-safe slug from a title.
///
/// Lowercases the title, turns every run of characters outside `[a-z0-9]`
/// into a single hyphen and trims hyphens from both ends.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Slug for a post, falling back to "untitled" when the title has no
/// usable characters.
pub fn post_slug(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Remove every `<...>` tag. An unterminated `<` is kept as text.
pub fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        match rest[open..].find('>') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

fn leading_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Excerpt stored with a post.
///
/// A non-empty explicit excerpt is kept verbatim. Otherwise the first 200
/// characters of content are taken and tags are stripped from them.
pub fn auto_excerpt(excerpt: &str, content: &str) -> String {
    if !excerpt.is_empty() {
        return excerpt.to_string();
    }
    strip_tags(leading_chars(content, EXCERPT_CHARS))
}

/// Preview text on a home page card.
pub fn card_excerpt(excerpt: &str, content: &str) -> String {
    if !excerpt.is_empty() {
        return excerpt.to_string();
    }
    strip_tags(leading_chars(content, CARD_PREVIEW_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("Hello, World!!"), "hello-world");
        assert_eq!(slugify("Daily Notes"), "daily-notes");
        assert_eq!(slugify("First!"), "first");
    }

    #[test]
    fn test_slugify_trims_hyphens() {
        assert_eq!(slugify("  --Rust & Go--  "), "rust-go");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_drops_non_ascii_letters() {
        assert_eq!(slugify("Café Crème 2025"), "caf-cr-me-2025");
    }

    #[test]
    fn test_slugify_output_alphabet() {
        for title in ["A_B c", "ÄÖÜ", "x--y", "Tab\tand\nnewline", "123"] {
            let slug = slugify(title);
            assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            assert!(!slug.contains("--"));
        }
    }

    #[test]
    fn test_post_slug_fallback() {
        assert_eq!(post_slug(""), "untitled");
        assert_eq!(post_slug("?!"), "untitled");
        assert_eq!(post_slug("Hi there"), "hi-there");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <b>you</b></p>"), "Hello you");
        assert_eq!(strip_tags("a < b"), "a < b");
        assert_eq!(strip_tags("x<>y"), "xy");
    }

    #[test]
    fn test_auto_excerpt_truncates_then_strips() {
        let content = format!("<p>{}</p>", "a".repeat(300));
        let excerpt = auto_excerpt("", &content);
        // the opening tag uses 3 of the 200 characters
        assert_eq!(excerpt, "a".repeat(197));
    }

    #[test]
    fn test_auto_excerpt_plain_content() {
        let content = "b".repeat(300);
        assert_eq!(auto_excerpt("", &content), "b".repeat(200));
        assert_eq!(auto_excerpt("", "short"), "short");
    }

    #[test]
    fn test_auto_excerpt_counts_characters() {
        let content = "é".repeat(250);
        assert_eq!(auto_excerpt("", &content).chars().count(), 200);
    }

    #[test]
    fn test_explicit_excerpt_verbatim() {
        assert_eq!(auto_excerpt("  <i>mine</i> ", "content"), "  <i>mine</i> ");
    }

    #[test]
    fn test_card_excerpt_uses_150_chars() {
        let content = "c".repeat(300);
        assert_eq!(card_excerpt("", &content).len(), 150);
        assert_eq!(card_excerpt("given", &content), "given");
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        let content = "\u{1F600}".repeat(250);
        let excerpt = auto_excerpt("", &content);
        assert_eq!(excerpt.chars().count(), 200);
        assert_eq!(excerpt.len(), 800);
    }
}
