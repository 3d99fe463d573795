use super::speller::Speller;
use super::word_finder::DocumentWords;

/// What followed the hyphen of a pending word
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Gap {
    None,
    Space,
    Newline,
}

#[derive(Debug)]
enum Pending {
    Idle,
    Word { text: String, pos: u32 },
    Hyphen { text: String, pos: u32, gap: Gap },
}

/// Extracts words from plain, single-version text
pub struct TextWordFinder<'a> {
    speller: &'a dyn Speller,
}

impl<'a> TextWordFinder<'a> {
    pub fn new(speller: &'a dyn Speller) -> Self {
        Self { speller }
    }

    /// Scan `text` into `words`, returning the number of new occurrences
    pub fn find(&self, text: &str, words: &mut DocumentWords<'_>) -> usize {
        let mut scan = TextScan {
            speller: self.speller,
            words,
            found: 0,
        };
        let mut pending = Pending::Idle;
        let mut line_start = 0u32;

        for line in text.split('\n') {
            if !is_page_number(line.trim()) {
                for (at, token) in split_tokens(line) {
                    pending = scan.feed(pending, token, line_start + at as u32);
                }
                pending = match pending {
                    Pending::Word { text, pos } => {
                        scan.store(&text, pos);
                        Pending::Idle
                    }
                    Pending::Hyphen { text, pos, .. } => Pending::Hyphen {
                        text,
                        pos,
                        gap: Gap::Newline,
                    },
                    Pending::Idle => Pending::Idle,
                };
            }
            line_start += line.chars().count() as u32 + 1;
        }

        if let Pending::Word { text, pos } | Pending::Hyphen { text, pos, .. } = pending {
            scan.store(&text, pos);
        }
        scan.found
    }
}

struct TextScan<'s, 'w, 'a> {
    speller: &'s dyn Speller,
    words: &'w mut DocumentWords<'a>,
    found: usize,
}

impl TextScan<'_, '_, '_> {
    fn store(&mut self, word: &str, pos: u32) {
        if self.words.insert(word.to_lowercase(), pos) {
            self.found += 1;
        }
    }

    fn feed(&mut self, pending: Pending, token: &str, pos: u32) -> Pending {
        match pending {
            Pending::Idle => {
                if is_space(token) || token == "-" {
                    Pending::Idle
                } else {
                    self.start_word(token, pos)
                }
            }
            Pending::Word { text, pos: start } => {
                if token == "-" {
                    Pending::Hyphen {
                        text,
                        pos: start,
                        gap: Gap::None,
                    }
                } else {
                    self.store(&text, start);
                    if is_space(token) {
                        Pending::Idle
                    } else {
                        self.start_word(token, pos)
                    }
                }
            }
            Pending::Hyphen {
                text,
                pos: start,
                gap,
            } => {
                if is_space(token) {
                    let gap = if gap == Gap::None { Gap::Space } else { gap };
                    return Pending::Hyphen {
                        text,
                        pos: start,
                        gap,
                    };
                }
                if token == "-" {
                    // a dash, not a hyphen
                    self.store(&text, start);
                    return Pending::Idle;
                }
                let (lead, second, closed) = strip_punctuation(token);
                if !is_word(second) {
                    self.store(&text, start);
                    return Pending::Idle;
                }
                match gap {
                    Gap::None if lead == 0 => {
                        self.continue_word(format!("{}-{}", text, second), start, closed)
                    }
                    Gap::Newline => {
                        let resolved = self.resolve_hyphenated(&text, second);
                        self.continue_word(resolved, start, closed)
                    }
                    _ => {
                        self.store(&text, start);
                        self.start_word(token, pos)
                    }
                }
            }
        }
    }

    fn start_word(&mut self, token: &str, pos: u32) -> Pending {
        let (lead, word, closed) = strip_punctuation(token);
        if is_word(word) {
            self.continue_word(word.to_string(), pos + lead as u32, closed)
        } else {
            Pending::Idle
        }
    }

    fn continue_word(&mut self, text: String, pos: u32, closed: bool) -> Pending {
        if closed {
            self.store(&text, pos);
            Pending::Idle
        } else {
            Pending::Word { text, pos }
        }
    }

    /// Decide how a word hyphenated at a line end is indexed
    fn resolve_hyphenated(&self, first: &str, second: &str) -> String {
        let hyphenated = format!("{}-{}", first, second);
        let composite = format!("{}{}", first, second);
        if self.speller.has_word(first) {
            if self.words.is_known(&hyphenated.to_lowercase()) {
                hyphenated
            } else if self.speller.has_word(&composite) {
                composite
            } else {
                hyphenated
            }
        } else {
            composite
        }
    }
}

fn is_space(token: &str) -> bool {
    matches!(token, " " | "\t" | "\r")
}

/// Split a line into words and single-character delimiter tokens, each with
/// its character offset in the line
fn split_tokens(line: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut word_start: Option<(usize, usize)> = None;
    for (at, (byte, c)) in line.char_indices().enumerate() {
        if matches!(c, ' ' | '\t' | '\r' | '-') {
            if let Some((start_byte, start_at)) = word_start.take() {
                tokens.push((start_at, &line[start_byte..byte]));
            }
            tokens.push((at, &line[byte..byte + c.len_utf8()]));
        } else if word_start.is_none() {
            word_start = Some((byte, at));
        }
    }
    if let Some((start_byte, start_at)) = word_start {
        tokens.push((start_at, &line[start_byte..]));
    }
    tokens
}

/// Strip surrounding punctuation. Returns the count of leading characters
/// removed, the word, and whether anything trailed it.
fn strip_punctuation(token: &str) -> (usize, &str, bool) {
    let tail = token.trim_start_matches(|c: char| !c.is_alphanumeric());
    let lead = token[..token.len() - tail.len()].chars().count();
    let word = tail.trim_end_matches(|c: char| !c.is_alphanumeric());
    (lead, word, word.len() < tail.len())
}

/// Lowercase, Capitalized or ALLCAPS; apostrophes allowed after lowercase
fn is_word(token: &str) -> bool {
    let mut chars = token.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    let rest = chars.as_str();
    let lower_tail = || rest.chars().all(|c| c.is_lowercase() || c == '\'' || c == '’');
    if first.is_lowercase() {
        lower_tail()
    } else if first.is_uppercase() {
        rest.chars().all(char::is_uppercase) || lower_tail()
    } else {
        false
    }
}

/// Arabic (`12`, `12a`) or roman (`xii`, `IV`) page number
fn is_page_number(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }
    let digits = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if digits.len() < line.len() {
        return digits.chars().all(char::is_lowercase);
    }
    line.chars()
        .all(|c| matches!(c.to_ascii_lowercase(), 'i' | 'v' | 'x' | 'l' | 'c' | 'd' | 'm'))
}
