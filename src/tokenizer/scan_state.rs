//! Per-version word scanner used while walking a variant graph

use crate::graph::VersionSet;

/// Longest word kept; further letters are dropped
pub const MAX_WORD_LEN: usize = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Between words
    Seeking,
    InWord,
    /// Letter followed by a hyphen
    Hyphen,
    /// Letter followed by an apostrophe (straight or curly)
    Apostrophe(char),
    /// Hyphen followed by whitespace, a probable line-break hyphenation
    HyphenBreak,
}

/// A word completed by a scan state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannedWord {
    pub text: String,
    /// Document-wide offset of the first letter
    pub offset: u32,
    /// The word was joined across a hyphen and whitespace
    pub line_broken: bool,
}

/// Scanner state shared by the versions in `versions`
#[derive(Clone, Debug)]
pub struct ScanState {
    versions: VersionSet,
    word: String,
    word_len: usize,
    phase: Phase,
    start: u32,
    line_broken: bool,
}

impl ScanState {
    pub fn new(versions: VersionSet) -> Self {
        Self {
            versions,
            word: String::new(),
            word_len: 0,
            phase: Phase::Seeking,
            start: 0,
            line_broken: false,
        }
    }

    pub fn versions(&self) -> &VersionSet {
        &self.versions
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    /// Fork off the versions shared with `versions`. The fork carries a copy
    /// of the in-progress word and `self` keeps the remaining versions.
    pub fn split(&mut self, versions: &VersionSet) -> ScanState {
        let shared = self.versions.split_off(versions);
        ScanState {
            versions: shared,
            ..self.clone()
        }
    }

    /// States that would behave identically on any further input
    pub fn same_scan(&self, other: &ScanState) -> bool {
        self.phase == other.phase
            && self.start == other.start
            && self.line_broken == other.line_broken
            && self.word == other.word
    }

    pub fn absorb(&mut self, other: ScanState) {
        self.versions |= &other.versions;
    }

    fn push(&mut self, c: char) {
        if self.word_len < MAX_WORD_LEN {
            self.word.push(c);
            self.word_len += 1;
        }
    }

    fn complete(&mut self) -> Option<ScannedWord> {
        let word = ScannedWord {
            text: std::mem::take(&mut self.word),
            offset: self.start,
            line_broken: self.line_broken,
        };
        self.word_len = 0;
        self.phase = Phase::Seeking;
        self.start = 0;
        self.line_broken = false;
        if word.text.is_empty() {
            None
        } else {
            Some(word)
        }
    }

    /// Feed one character found at document offset `offset`
    pub fn update(&mut self, c: char, offset: u32) -> Option<ScannedWord> {
        match self.phase {
            Phase::Seeking => {
                if c.is_alphabetic() {
                    self.push(c);
                    self.start = offset;
                    self.phase = Phase::InWord;
                }
                None
            }
            Phase::InWord => match c {
                '-' => {
                    self.phase = Phase::Hyphen;
                    None
                }
                '\'' | '’' => {
                    self.phase = Phase::Apostrophe(c);
                    None
                }
                c if c.is_alphabetic() => {
                    self.push(c);
                    None
                }
                _ => self.complete(),
            },
            Phase::Hyphen => {
                if c.is_whitespace() {
                    self.phase = Phase::HyphenBreak;
                    None
                } else if c.is_alphabetic() {
                    self.push('-');
                    self.push(c);
                    self.phase = Phase::InWord;
                    None
                } else {
                    self.complete()
                }
            }
            Phase::Apostrophe(apostrophe) => {
                if c.is_alphabetic() {
                    self.push(apostrophe);
                    self.push(c);
                    self.phase = Phase::InWord;
                    None
                } else {
                    self.complete()
                }
            }
            Phase::HyphenBreak => {
                if c.is_alphabetic() {
                    self.push('-');
                    self.push(c);
                    self.line_broken = true;
                    self.phase = Phase::InWord;
                    None
                } else if c.is_whitespace() {
                    None
                } else {
                    self.complete()
                }
            }
        }
    }

    /// End of text: emit any word still in progress
    pub fn finish(&mut self) -> Option<ScannedWord> {
        match self.phase {
            Phase::Seeking => None,
            _ => self.complete(),
        }
    }
}
