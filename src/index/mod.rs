//! Inverted index over variant-graph and plain-text documents
//!
//! Each word maps to a [`Locations`] posting list of (document, offset)
//! pairs. Posting lists are column-compressed when persisted and decoded
//! lazily on first use.

mod codec;
mod inverted;
mod locations;
mod progress;
mod types;

pub use codec::{
    bitpack_decode, bitpack_encode, decode_plain, decode_sorted, decode_vbyte, encode_plain,
    encode_sorted, encode_vbyte, BLOCK_SIZE,
};
pub use inverted::{IndexBuilder, InvertedIndex, INDEX_FORMAT_VERSION};
pub use locations::Locations;
pub use progress::{NoProgress, Progress, ProgressSink};
pub use types::{DocNo, Location};
