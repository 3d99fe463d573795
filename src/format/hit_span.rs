/// Nearby matched terms of one version, rendered together as a snippet
/// padded out to whole words.
pub struct HitSpan<'a> {
    data: &'a [char],
    /// (term, offset in `data`) in the order added
    terms: Vec<(&'a str, usize)>,
    max_len: usize,
}

impl<'a> HitSpan<'a> {
    pub fn new(data: &'a [char], term: &'a str, pos: usize, max_len: usize) -> Self {
        Self {
            data,
            terms: vec![(term, pos.min(data.len()))],
            max_len,
        }
    }

    fn first_pos(&self) -> usize {
        self.terms[0].1
    }

    fn last_end(&self) -> usize {
        let (term, pos) = self.terms[self.terms.len() - 1];
        pos + term.chars().count()
    }

    /// Does `term` at `pos` follow the last term and still fit?
    pub fn wants(&self, term: &str, pos: usize) -> bool {
        let last_pos = self.terms[self.terms.len() - 1].1;
        let start = self.move_back(self.first_pos(), 1);
        let end = self.move_forward(last_pos, 1);
        pos >= self.last_end()
            && end - start < self.max_len
            && (pos + term.chars().count()).saturating_sub(start) < self.max_len
    }

    pub fn add(&mut self, term: &'a str, pos: usize) {
        self.terms.push((term, pos.min(self.data.len())));
    }

    /// Start of the word `n_words` before the one containing `pos`, or of
    /// the text
    fn move_back(&self, pos: usize, n_words: usize) -> usize {
        if self.data.is_empty() {
            return 0;
        }
        let mut in_space = false;
        let mut count = 0;
        let mut word_start = pos.min(self.data.len());
        for i in (0..pos.min(self.data.len() - 1) + 1).rev() {
            let space = self.data[i].is_whitespace();
            if !in_space {
                if space {
                    in_space = true;
                } else {
                    word_start = i;
                }
            } else if !space {
                if count == n_words {
                    return word_start;
                }
                count += 1;
                in_space = false;
                word_start = i;
            }
        }
        word_start
    }

    /// Start of the word `n_words + 1` after the one containing `pos`, or
    /// the end of the text
    fn move_forward(&self, pos: usize, n_words: usize) -> usize {
        let mut in_space = false;
        let mut count = 0;
        for i in pos..self.data.len() {
            let space = self.data[i].is_whitespace();
            if !in_space {
                in_space = space;
            } else if !space {
                if count == n_words {
                    return i;
                }
                count += 1;
                in_space = false;
            }
        }
        self.data.len()
    }

    /// Context window: whole words around the terms, widened a word at a
    /// time on each side until it reaches `max_len`
    pub fn bounds(&self) -> (usize, usize) {
        let mut start = self.move_back(self.first_pos(), 0);
        let mut end = self.move_forward(self.last_end(), 0);
        while end - start < self.max_len {
            let wider = (self.move_back(start, 1), self.move_forward(end, 0));
            if wider == (start, end) {
                break;
            }
            (start, end) = wider;
        }
        (start, end)
    }

    /// Characters `term` covers from `at`, ignoring case and skipping a
    /// line-break hyphen. `None` when the word at `at` is not `term`.
    pub fn term_extent(term: &str, data: &[char], at: usize) -> Option<usize> {
        let end = at + word_len(data, at);
        let mut i = at;
        for t in term.chars() {
            loop {
                if i >= end {
                    return None;
                }
                let c = data[i];
                i += 1;
                if c == t || c.to_lowercase().eq(t.to_lowercase()) {
                    break;
                }
                if c != '-' && !c.is_whitespace() {
                    return None;
                }
            }
        }
        Some(i - at)
    }

    /// Characters to mark for `term` at `at`: the term itself, or the word
    /// found there when the term does not match it
    fn term_length(term: &str, context: &[char], at: usize) -> usize {
        Self::term_extent(term, context, at).unwrap_or_else(|| word_len(context, at))
    }

    /// HTML for the span: escaped context with each term wrapped in a
    /// `match` span, followed by an ellipsis. Whitespace is left as found.
    pub fn render(&self) -> String {
        let (start, end) = self.bounds();
        let context = &self.data[start..end];
        let mut html = String::new();
        let mut prev = 0;
        for &(term, pos) in &self.terms {
            if pos < start || pos - start < prev || pos >= end {
                continue;
            }
            let at = pos - start;
            push_escaped(&mut html, &context[prev..at]);
            prev = at + Self::term_length(term, context, at);
            html.push_str("<span class=\"match\">");
            push_escaped(&mut html, &context[at..prev]);
            html.push_str("</span>");
        }
        push_escaped(&mut html, &context[prev..]);
        html.push_str(" ... ");
        html
    }
}

/// Length of the word starting at `at`: letters and apostrophes, joined
/// across a hyphen or a hyphen that ends a line
fn word_len(data: &[char], at: usize) -> usize {
    let mut i = at;
    while i < data.len() {
        let c = data[i];
        if c.is_alphabetic() || c == '\'' || c == '\u{2019}' {
            i += 1;
            continue;
        }
        if c != '-' {
            break;
        }
        let mut next = i + 1;
        let mut newline = false;
        while next < data.len() && data[next].is_whitespace() {
            newline |= data[next] == '\n';
            next += 1;
        }
        if next < data.len() && data[next].is_alphabetic() && (next == i + 1 || newline) {
            i = next;
        } else {
            break;
        }
    }
    i - at
}

fn push_escaped(out: &mut String, text: &[char]) {
    for &c in text {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
