//! Word extraction for variant graphs and plain text

mod scan_state;
mod speller;
mod stopwords;
mod text_finder;
mod word_finder;

pub use scan_state::{Phase, ScanState, ScannedWord, MAX_WORD_LEN};
pub use speller::{Dictionaries, Dictionary, Hyphenator, Speller};
pub use stopwords::Stopwords;
pub use text_finder::TextWordFinder;
pub use word_finder::{DocumentWords, Vocabulary, WordFinder};
