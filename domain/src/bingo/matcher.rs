//! Keyword matching between bingo clues and utterances

/// Clues with fewer words than this never match.
pub const MIN_CLUE_WORDS: usize = 2;

/// Utterances with fewer words than this never fill a square.
pub const MIN_UTTERANCE_WORDS: usize = 5;

/// Share of clue keywords that must appear in the utterance.
pub const MIN_KEYWORD_SHARE: f64 = 0.3;

/// Matching this many keywords is enough regardless of share.
pub const MIN_KEYWORD_HITS: usize = 2;

/// Lowercased clue words longer than three characters.
pub fn keywords(clue: &str) -> Vec<String> {
    clue.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.chars().count() > 3)
        .map(str::to_lowercase)
        .collect()
}

/// Whether enough of the clue's keywords occur in `utterance`.
pub fn keyword_match(clue: &str, utterance: &str) -> bool {
    let keywords = keywords(clue);
    if keywords.is_empty() {
        return false;
    }

    let haystack = utterance.to_lowercase();
    let hits = keywords.iter().filter(|k| haystack.contains(k.as_str())).count();
    let share = hits as f64 / keywords.len() as f64;

    share >= MIN_KEYWORD_SHARE || hits >= MIN_KEYWORD_HITS
}

/// Whether `utterance` fills the square described by `clue`.
pub fn clue_satisfied(clue: &str, utterance: &str) -> bool {
    if clue.split_whitespace().count() < MIN_CLUE_WORDS {
        return false;
    }
    if utterance.split_whitespace().count() < MIN_UTTERANCE_WORDS {
        return false;
    }
    keyword_match(clue, utterance)
}
