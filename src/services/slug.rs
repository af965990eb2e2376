use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s-]").expect("slug pattern compiles");
    static ref SEPARATORS: Regex = Regex::new(r"[\s_-]+").expect("slug pattern compiles");
}

/// URL-safe lowercase form of a product or category name.
pub fn slugify(text: &str) -> String {
    let cleaned = NON_WORD.replace_all(text, "");
    let lowered = cleaned.trim().to_lowercase();
    SEPARATORS.replace_all(&lowered, "-").into_owned()
}
