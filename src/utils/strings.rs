/// Word count is the number of whitespace-separated tokens. Sentence count is
/// the number of `.`, `!` and `?` characters, so "..." counts three times.
pub fn count_words_and_sentences(text: &str) -> (usize, usize) {
    let words = text.split_whitespace().count();
    let sentences = text.chars().filter(|c| is_terminator(*c)).count();
    (words, sentences)
}

pub fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Single-line preview of `text`, cut on a char boundary.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut out: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn mask(secret: &str) -> String {
    "•".repeat(secret.chars().count())
}
