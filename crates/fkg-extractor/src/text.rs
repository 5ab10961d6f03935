//! Text helpers: sentence segmentation and char-safe windows
//!
//! All offsets are byte offsets into the page text.

/// Words that end in a period without ending the sentence
const ABBREVIATIONS: &[&str] = &[
    "corp", "inc", "ltd", "co", "mr", "mrs", "ms", "dr", "prof", "vs", "no", "st", "jr", "sr",
    "u.s", "e.g", "i.e", "approx", "dept",
];

/// A sentence as a byte range of its source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

impl Sentence<'_> {
    /// Whether a byte offset falls inside this sentence
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Split text into sentences on `.`, `!` or `?` followed by whitespace or
/// end of text, and on blank lines. Leading whitespace is not part of a
/// sentence.
pub fn split_sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|(_, n)| *n);
        let boundary = match c {
            '.' | '!' | '?' => {
                next.map_or(true, char::is_whitespace) && !(c == '.' && ends_with_abbreviation(&text[start..i]))
            }
            '\n' => next == Some('\n'),
            _ => false,
        };
        if boundary {
            push_sentence(text, start, i + c.len_utf8(), &mut sentences);
            start = i + c.len_utf8();
        }
    }
    push_sentence(text, start, text.len(), &mut sentences);
    sentences
}

fn push_sentence<'a>(text: &'a str, start: usize, end: usize, out: &mut Vec<Sentence<'a>>) {
    let slice = &text[start..end];
    let trimmed = slice.trim_start();
    let start = start + (slice.len() - trimmed.len());
    let trimmed = trimmed.trim_end();
    if !trimmed.is_empty() {
        out.push(Sentence {
            start,
            end: start + trimmed.len(),
            text: trimmed,
        });
    }
}

fn ends_with_abbreviation(before: &str) -> bool {
    let word = before
        .rsplit(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    ABBREVIATIONS.contains(&word.as_str())
}

/// Largest char boundary not after `index`
pub fn floor_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Slice `[start, end)` after clamping both ends to char boundaries
pub fn slice(text: &str, start: usize, end: usize) -> &str {
    let start = floor_boundary(text, start);
    let end = floor_boundary(text, end).max(start);
    &text[start..end]
}

/// `radius` characters on each side of `[start, end)`, plus the span itself
pub fn context_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let start = floor_boundary(text, start);
    let end = floor_boundary(text, end).max(start);
    let from = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(start, |(i, _)| i);
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| end + i);
    &text[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let text = "XYZ Corp. reported revenue of $10.5 million. Mr. Smith joined in 2021! Why?";
        let sentences: Vec<_> = split_sentences(text).iter().map(|s| s.text).collect();
        assert_eq!(
            sentences,
            vec![
                "XYZ Corp. reported revenue of $10.5 million.",
                "Mr. Smith joined in 2021!",
                "Why?"
            ]
        );
    }

    #[test]
    fn test_sentence_offsets_index_source() {
        let text = "  First one.  Second one";
        for s in split_sentences(text) {
            assert_eq!(&text[s.start..s.end], s.text);
        }
    }

    #[test]
    fn test_blank_line_splits() {
        let sentences = split_sentences("Heading\n\nBody text");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "Heading");
    }

    #[test]
    fn test_context_window_radius() {
        let text = "0123456789ABCDEFGHIJ";
        assert_eq!(context_window(text, 10, 12, 3), "789ABCDE");
        assert_eq!(context_window(text, 0, 2, 50), text);
    }

    #[test]
    fn test_context_window_multibyte() {
        let text = "€€€ revenue €€€";
        let start = text.find("revenue").unwrap();
        let window = context_window(text, start, start + 7, 2);
        assert_eq!(window, "€ revenue €");
    }

    #[test]
    fn test_slice_clamps() {
        let text = "a€b";
        assert_eq!(slice(text, 0, 2), "a");
        assert_eq!(slice(text, 0, 100), "a€b");
    }
}
