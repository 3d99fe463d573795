//! Result localization
//!
//! A match is expressed in document-wide offsets over the whole variant
//! graph. Formatting finds the versions every matched word shares, picks
//! one, translates the offsets into that version's text and renders a
//! highlighted snippet around them.

mod formatter;
mod hit;
mod hit_span;
mod position;

pub use formatter::{collapse_whitespace, dehyphenate, merge_hits, DocumentSource, Formatter};
pub use hit::{Hit, HitPage};
pub use hit_span::HitSpan;
pub use position::{match_versions, v_positions, Position};
