use serde::{Deserialize, Serialize};

use super::version_set::{VersionId, VersionSet};
use crate::error::{Result, SearchError};

/// A declared version of the document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    #[serde(default)]
    pub group: String,
}

impl VersionInfo {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
        }
    }

    /// Display identifier, `group/name` or just `name` outside any group
    pub fn identifier(&self) -> String {
        if self.group.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.group, self.name)
        }
    }
}

/// Span of text shared by exactly the versions in `versions`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub versions: VersionSet,
    pub text: String,
    #[serde(skip)]
    len: u32,
}

impl Fragment {
    pub fn new(versions: VersionSet, text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.chars().count() as u32;
        Self {
            versions,
            text,
            len,
        }
    }

    /// Length in characters
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn chars(&self) -> std::str::Chars<'_> {
        self.text.chars()
    }

    pub fn contains_version(&self, version: VersionId) -> bool {
        self.versions.contains(version)
    }
}

#[derive(Deserialize)]
struct RawVariantGraph {
    versions: Vec<VersionInfo>,
    fragments: Vec<Fragment>,
}

impl TryFrom<RawVariantGraph> for VariantGraph {
    type Error = SearchError;

    fn try_from(raw: RawVariantGraph) -> Result<Self> {
        VariantGraph::new(raw.versions, raw.fragments)
    }
}

/// Multi-version document: the ordered fragment sequence and its version table.
///
/// Version ids are 1-based positions in the version table. Offsets handed out
/// by the graph are document-wide character offsets, counting every fragment
/// in order regardless of version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawVariantGraph")]
pub struct VariantGraph {
    versions: Vec<VersionInfo>,
    fragments: Vec<Fragment>,
}

impl VariantGraph {
    /// Build a graph, rejecting fragments that name undeclared versions
    pub fn new(versions: Vec<VersionInfo>, fragments: Vec<Fragment>) -> Result<Self> {
        let declared = VersionSet::all(versions.len() as u32);
        let mut checked = Vec::with_capacity(fragments.len());
        for (i, fragment) in fragments.into_iter().enumerate() {
            if fragment.versions.is_empty() {
                return Err(SearchError::MalformedGraph(format!(
                    "fragment {} belongs to no version",
                    i
                )));
            }
            if !fragment.versions.is_subset(&declared) {
                let stray = fragment.versions.difference(&declared);
                return Err(SearchError::MalformedGraph(format!(
                    "fragment {} references undeclared versions {:?}",
                    i, stray
                )));
            }
            // recompute: deserialized fragments skip the cached length
            checked.push(Fragment::new(fragment.versions, fragment.text));
        }
        Ok(Self {
            versions,
            fragments: checked,
        })
    }

    /// A one-version graph holding plain text
    pub fn single_version(text: impl Into<String>) -> Self {
        let versions: VersionSet = std::iter::once(1).collect();
        Self {
            versions: vec![VersionInfo::new("base", "")],
            fragments: vec![Fragment::new(versions, text)],
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn version_count(&self) -> u32 {
        self.versions.len() as u32
    }

    pub fn all_versions(&self) -> VersionSet {
        VersionSet::all(self.version_count())
    }

    /// Total length of the fragment sequence in characters
    pub fn len(&self) -> u32 {
        self.fragments.iter().map(Fragment::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn version_info(&self, version: VersionId) -> Result<&VersionInfo> {
        version
            .checked_sub(1)
            .and_then(|i| self.versions.get(i as usize))
            .ok_or_else(|| SearchError::VersionNotFound(format!("version {}", version)))
    }

    /// Full text of one version
    pub fn characters_of_version(&self, version: VersionId) -> Result<Vec<char>> {
        self.version_info(version)?;
        Ok(self
            .fragments
            .iter()
            .filter(|f| f.contains_version(version))
            .flat_map(|f| f.chars())
            .collect())
    }

    pub fn version_identifier(&self, version: VersionId) -> Result<String> {
        Ok(self.version_info(version)?.identifier())
    }

    pub fn resolve_version(&self, name: &str, group: &str) -> Result<VersionId> {
        self.versions
            .iter()
            .position(|v| v.name == name && v.group == group)
            .map(|i| i as VersionId + 1)
            .ok_or_else(|| {
                SearchError::VersionNotFound(VersionInfo::new(name, group).identifier())
            })
    }
}
