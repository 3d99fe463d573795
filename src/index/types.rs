use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense document number within an index (0..documents)
/// Used internally for compact posting storage; the index maps it back to
/// the external docid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocNo(pub u32);

impl DocNo {
    pub fn new(n: u32) -> Self {
        Self(n)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DocNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc_{}", self.0)
    }
}

/// One occurrence of a word: document and document-wide character offset.
/// Ordered by document, then offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub doc: DocNo,
    pub offset: u32,
}

impl Location {
    pub fn new(doc: DocNo, offset: u32) -> Self {
        Self { doc, offset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_order() {
        let mut locs = vec![
            Location::new(DocNo(1), 4),
            Location::new(DocNo(0), 90),
            Location::new(DocNo(1), 2),
        ];
        locs.sort();
        assert_eq!(
            locs,
            vec![
                Location::new(DocNo(0), 90),
                Location::new(DocNo(1), 2),
                Location::new(DocNo(1), 4),
            ]
        );
    }
}
