use roaring::RoaringBitmap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAndAssign, BitOrAssign};

/// Identifier of one version (witness, edition) of a document. Ids start at 1.
pub type VersionId = u32;

/// Set of version ids, backed by a roaring bitmap so that copying a state's
/// versions on every fork stays cheap.
#[derive(Clone, Default, PartialEq)]
pub struct VersionSet(RoaringBitmap);

impl VersionSet {
    pub fn new() -> Self {
        Self(RoaringBitmap::new())
    }

    /// All versions `1..=count`
    pub fn all(count: u32) -> Self {
        let mut bitmap = RoaringBitmap::new();
        if count > 0 {
            bitmap.insert_range(1..=count);
        }
        Self(bitmap)
    }

    pub fn insert(&mut self, version: VersionId) -> bool {
        self.0.insert(version)
    }

    pub fn remove(&mut self, version: VersionId) -> bool {
        self.0.remove(version)
    }

    pub fn contains(&self, version: VersionId) -> bool {
        self.0.contains(version)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> u64 {
        self.0.len()
    }

    /// Lowest version in the set
    pub fn first(&self) -> Option<VersionId> {
        self.0.min()
    }

    pub fn max(&self) -> Option<VersionId> {
        self.0.max()
    }

    pub fn intersects(&self, other: &VersionSet) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    pub fn is_subset(&self, other: &VersionSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn union(&self, other: &VersionSet) -> VersionSet {
        VersionSet(&self.0 | &other.0)
    }

    pub fn intersection(&self, other: &VersionSet) -> VersionSet {
        VersionSet(&self.0 & &other.0)
    }

    pub fn difference(&self, other: &VersionSet) -> VersionSet {
        VersionSet(&self.0 - &other.0)
    }

    /// Move the versions shared with `other` out of `self` and return them
    pub fn split_off(&mut self, other: &VersionSet) -> VersionSet {
        let shared = self.intersection(other);
        self.0 -= &shared.0;
        shared
    }

    pub fn iter(&self) -> impl Iterator<Item = VersionId> + '_ {
        self.0.iter()
    }
}

impl FromIterator<VersionId> for VersionSet {
    fn from_iter<I: IntoIterator<Item = VersionId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl BitOrAssign<&VersionSet> for VersionSet {
    fn bitor_assign(&mut self, rhs: &VersionSet) {
        self.0 |= &rhs.0;
    }
}

impl BitAndAssign<&VersionSet> for VersionSet {
    fn bitand_assign(&mut self, rhs: &VersionSet) {
        self.0 &= &rhs.0;
    }
}

impl fmt::Debug for VersionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

// Serialized as a plain list of ids so graph JSON stays readable.
impl Serialize for VersionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for VersionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let ids = Vec::<VersionId>::deserialize(deserializer)?;
        Ok(ids.into_iter().collect())
    }
}
