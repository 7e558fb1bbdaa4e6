//! Slug generation
//!
//! Converts arbitrary titles into URL-safe slugs. Cyrillic characters are
//! transliterated to Latin first, so "Заголовок" becomes "zagolovok" rather
//! than being dropped. Everything else non-alphanumeric collapses into
//! single hyphens.

/// Maximum slug length, matching the notes table column
pub const MAX_SLUG_LEN: usize = 100;

/// Generate a URL-safe slug from a title.
///
/// Transliterates Cyrillic, lowercases, replaces every other non-alphanumeric
/// character with a hyphen, collapses hyphen runs, and trims hyphens from
/// both ends. The result is capped at [`MAX_SLUG_LEN`] bytes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut prev_hyphen = true; // suppress a leading hyphen

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_hyphen = false;
        } else if let Some(tr) = transliterate(c) {
            // Silent signs transliterate to nothing at all
            if !tr.is_empty() {
                slug.push_str(tr);
                prev_hyphen = false;
            }
        } else {
            // Separator: punctuation, whitespace, or an unmappable character
            if !prev_hyphen {
                slug.push('-');
                prev_hyphen = true;
            }
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug.truncate(MAX_SLUG_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Transliterate a Cyrillic character to its Latin romanization.
///
/// Returns `None` for characters with no mapping (those act as
/// separators). The hard and soft signs map to the empty string.
fn transliterate(c: char) -> Option<&'static str> {
    let mapped = match c.to_lowercase().next().unwrap_or(c) {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(mapped)
}
