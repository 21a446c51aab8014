//! URL-safe place slugs.

/// Longest slug produced by [`slugify`], before any collision suffix.
pub const MAX_SLUG_LEN: usize = 60;

/// Used when a name has no slug-able characters at all.
const FALLBACK_SLUG: &str = "place";

/// Lower-cases `name`, folds common accented letters to ASCII and joins
/// the alphanumeric runs with single dashes.
pub fn slugify(name: &str) -> String {
    let slug = name
        .to_lowercase()
        .chars()
        .map(fold_accent)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let truncated = truncate(&slug, MAX_SLUG_LEN);
    if truncated.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        truncated
    }
}

fn truncate(slug: &str, max: usize) -> String {
    if slug.len() <= max {
        return slug.to_string();
    }
    // ASCII only at this point, so byte slicing is safe.
    slug[..max].trim_end_matches('-').to_string()
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Joe's Pizza"), "joe-s-pizza");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
        assert_eq!(slugify("Café Olé"), "cafe-ole");
        assert_eq!(slugify("Already-slugified"), "already-slugified");
    }

    #[test]
    fn test_slugify_fallback() {
        assert_eq!(slugify(""), "place");
        assert_eq!(slugify("!!!"), "place");
        assert_eq!(slugify("寿司"), "place");
    }

    #[test]
    fn test_slugify_truncates_without_trailing_dash() {
        let long = "word ".repeat(30);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("word-word"));
    }
}
