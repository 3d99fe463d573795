use once_cell::sync::OnceCell;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::codec::{decode_plain, decode_sorted, encode_plain, encode_sorted};
use super::types::{DocNo, Location};
use crate::error::{Result, SearchError};

/// Stored form of a posting list
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum PackedLocations {
    Empty,
    /// Too small to be worth compressing
    Single(Location),
    /// Document column (delta codec) followed by offset column (plain codec)
    Columns { count: u32, data: Vec<u8> },
}

impl PackedLocations {
    fn pack(entries: &[Location]) -> Self {
        match entries {
            [] => PackedLocations::Empty,
            [only] => PackedLocations::Single(*only),
            _ => {
                let docs: Vec<u32> = entries.iter().map(|l| l.doc.0).collect();
                let offsets: Vec<u32> = entries.iter().map(|l| l.offset).collect();
                let mut data = Vec::new();
                encode_sorted(&docs, &mut data);
                encode_plain(&offsets, &mut data);
                PackedLocations::Columns {
                    count: entries.len() as u32,
                    data,
                }
            }
        }
    }

    fn unpack(&self) -> Result<Vec<Location>> {
        match self {
            PackedLocations::Empty => Ok(Vec::new()),
            PackedLocations::Single(loc) => Ok(vec![*loc]),
            PackedLocations::Columns { count, data } => {
                let corrupt = |e: std::io::Error| SearchError::CorruptIndex(e.to_string());
                let mut pos = 0;
                let docs = decode_sorted(data, &mut pos).map_err(corrupt)?;
                let offsets = decode_plain(data, &mut pos).map_err(corrupt)?;
                if docs.len() != *count as usize || offsets.len() != *count as usize {
                    return Err(SearchError::CorruptIndex(format!(
                        "posting list holds {} documents and {} offsets, expected {}",
                        docs.len(),
                        offsets.len(),
                        count
                    )));
                }
                Ok(docs
                    .into_iter()
                    .zip(offsets)
                    .map(|(doc, offset)| Location::new(DocNo(doc), offset))
                    .collect())
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            PackedLocations::Empty => 0,
            PackedLocations::Single(_) => 1,
            PackedLocations::Columns { count, .. } => *count as usize,
        }
    }
}

/// Sorted, duplicate-free posting list for one word.
///
/// A list read from storage stays packed until first accessed. Any mutation
/// drops the packed form.
#[derive(Clone, Debug)]
pub struct Locations {
    packed: Option<PackedLocations>,
    entries: OnceCell<Vec<Location>>,
}

impl Default for Locations {
    fn default() -> Self {
        Self::new()
    }
}

impl Locations {
    pub fn new() -> Self {
        Self {
            packed: None,
            entries: OnceCell::with_value(Vec::new()),
        }
    }

    /// Decoded entries, in (doc, offset) order
    pub fn locations(&self) -> Result<&[Location]> {
        self.entries
            .get_or_try_init(|| match &self.packed {
                Some(packed) => packed.unpack(),
                None => Ok(Vec::new()),
            })
            .map(Vec::as_slice)
    }

    fn entries_mut(&mut self) -> Result<&mut Vec<Location>> {
        self.locations()?;
        self.packed = None;
        self.entries
            .get_mut()
            .ok_or_else(|| SearchError::CorruptIndex("posting list not decoded".to_string()))
    }

    /// Insert a location, keeping order. Returns false if already present.
    pub fn add(&mut self, loc: Location) -> Result<bool> {
        let entries = self.entries_mut()?;
        if entries.last().map_or(true, |last| *last < loc) {
            entries.push(loc);
            return Ok(true);
        }
        match entries.binary_search(&loc) {
            Ok(_) => Ok(false),
            Err(at) => {
                entries.insert(at, loc);
                Ok(true)
            }
        }
    }

    /// Add all occurrences of a word in one document
    pub fn extend_document<I>(&mut self, doc: DocNo, offsets: I) -> Result<usize>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut added = 0;
        for offset in offsets {
            if self.add(Location::new(doc, offset))? {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn contains(&self, loc: &Location) -> Result<bool> {
        Ok(self.locations()?.binary_search(loc).is_ok())
    }

    /// Entries belonging to one document
    pub fn for_document(&self, doc: DocNo) -> Result<&[Location]> {
        let entries = self.locations()?;
        let start = entries.partition_point(|l| l.doc < doc);
        let end = entries.partition_point(|l| l.doc <= doc);
        Ok(&entries[start..end])
    }

    pub fn len(&self) -> usize {
        match (self.entries.get(), &self.packed) {
            (Some(entries), _) => entries.len(),
            (None, Some(packed)) => packed.len(),
            (None, None) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True until the packed form has been decoded
    pub fn is_packed(&self) -> bool {
        self.entries.get().is_none()
    }
}

impl PartialEq for Locations {
    fn eq(&self, other: &Self) -> bool {
        match (self.locations(), other.locations()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for Locations {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match (&self.packed, self.entries.get()) {
            (Some(packed), _) => packed.serialize(serializer),
            (None, Some(entries)) => PackedLocations::pack(entries).serialize(serializer),
            (None, None) => PackedLocations::Empty.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Locations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let packed = PackedLocations::deserialize(deserializer)?;
        Ok(Self {
            packed: Some(packed),
            entries: OnceCell::new(),
        })
    }
}
