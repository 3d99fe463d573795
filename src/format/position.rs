use tracing::debug;

use crate::graph::{Fragment, VariantGraph, VersionId, VersionSet};

/// Where a matched word sits in the graph: the versions of the fragment it
/// starts in and, per version, the document-wide offset its letters run to.
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub start: u32,
    pub versions: VersionSet,
    ends: Vec<u32>,
}

impl Position {
    /// Position of the word starting `offset` characters into fragment
    /// `index`, which begins at document offset `start - offset`
    fn locate(fragments: &[Fragment], index: usize, offset: usize, start: u32) -> Self {
        let mut position = Position {
            start,
            versions: VersionSet::new(),
            ends: Vec::new(),
        };
        let Some(fragment) = fragments.get(index) else {
            return position;
        };

        for version in fragment.versions.iter() {
            let end = start + word_length(fragments, index, offset, version);
            if !position.ends.contains(&end) {
                position.ends.push(end);
            }
            position.versions.insert(version);
        }
        position
    }

    pub fn ends(&self) -> &[u32] {
        &self.ends
    }

    /// The earlier of the two words runs past the start of the later one
    pub fn overlaps(&self, other: &Position) -> bool {
        let (first, second) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        first.ends.iter().any(|&end| end > second.start)
    }
}

/// Letters read by `version` from `offset` in fragment `index` onwards
fn word_length(fragments: &[Fragment], index: usize, offset: usize, version: VersionId) -> u32 {
    let mut letters = 0;
    let mut skip = offset;
    for fragment in fragments[index..]
        .iter()
        .enumerate()
        .filter(|(i, f)| *i == 0 || (f.contains_version(version) && !f.is_empty()))
        .map(|(_, f)| f)
    {
        for c in fragment.chars().skip(skip) {
            if !c.is_alphabetic() {
                return letters;
            }
            letters += 1;
        }
        skip = 0;
    }
    letters
}

/// Positions of `offsets`, sorted, each resolved to its enclosing fragment
fn positions(offsets: &[u32], graph: &VariantGraph) -> Vec<Position> {
    let mut sorted = offsets.to_vec();
    sorted.sort_unstable();

    let fragments = graph.fragments();
    let mut index = 0;
    let mut fragment_start = 0u32;
    sorted
        .into_iter()
        .map(|pos| {
            while let Some(fragment) = fragments.get(index) {
                if fragment_start + fragment.len() > pos {
                    break;
                }
                fragment_start += fragment.len();
                index += 1;
            }
            Position::locate(fragments, index, (pos - fragment_start) as usize, pos)
        })
        .collect()
}

/// Versions in which every matched word occurs.
///
/// Each position narrows the shared set to its own versions, widened by the
/// previous position's versions when the two words overlap in the graph.
pub fn match_versions(offsets: &[u32], graph: &VariantGraph) -> VersionSet {
    let mut shared = VersionSet::new();
    let mut previous: Option<Position> = None;
    for mut position in positions(offsets, graph) {
        match &previous {
            None => shared = position.versions.clone(),
            Some(prev) => {
                if position.overlaps(prev) {
                    position.versions |= &prev.versions;
                }
                shared &= &position.versions;
            }
        }
        previous = Some(position);
    }
    shared
}

/// Translate document-wide offsets into character offsets within
/// `version`. Offsets that fall outside the version are dropped.
pub fn v_positions(offsets: &[u32], graph: &VariantGraph, version: VersionId) -> Vec<u32> {
    let mut sorted = offsets.to_vec();
    sorted.sort_unstable();

    let mut resolved = Vec::with_capacity(sorted.len());
    let mut pending = sorted.iter().copied().peekable();
    let mut doc_pos = 0u32;
    let mut version_pos = 0u32;
    for fragment in graph.fragments() {
        let in_version = fragment.contains_version(version);
        while let Some(offset) = pending.next_if(|&o| o < doc_pos + fragment.len()) {
            if in_version {
                resolved.push(version_pos + (offset - doc_pos));
            } else {
                debug!(offset, version, "Skipping position outside version");
            }
        }
        if pending.peek().is_none() {
            break;
        }
        if in_version {
            version_pos += fragment.len();
        }
        doc_pos += fragment.len();
    }
    for offset in pending {
        debug!(offset, "Skipping position past end of document");
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::VersionInfo;

    fn set(ids: &[u32]) -> VersionSet {
        ids.iter().copied().collect()
    }

    /// "a patch of " {1,2} | "blue" {1} | "red" {2} | " mist" {1,2}
    fn mist_graph() -> VariantGraph {
        VariantGraph::new(
            vec![VersionInfo::new("A", ""), VersionInfo::new("B", "")],
            vec![
                Fragment::new(set(&[1, 2]), "a patch of "),
                Fragment::new(set(&[1]), "blue"),
                Fragment::new(set(&[2]), "red"),
                Fragment::new(set(&[1, 2]), " mist"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_match_versions_across_fork() {
        let graph = mist_graph();
        // blue@11, red@15, mist@19, patch@2
        assert_eq!(match_versions(&[11, 19], &graph), set(&[1]));
        assert_eq!(match_versions(&[15, 19], &graph), set(&[2]));
        assert_eq!(match_versions(&[19], &graph), set(&[1, 2]));
        assert_eq!(match_versions(&[19, 2], &graph), set(&[1, 2]));
        assert!(match_versions(&[11, 15], &graph).is_empty());
        assert!(match_versions(&[], &graph).is_empty());
    }

    #[test]
    fn test_overlapping_words_do_not_overconstrain() {
        // version 1 reads "the seaboard plains", version 2 "the sea board plains"
        let graph = VariantGraph::new(
            vec![VersionInfo::new("A", ""), VersionInfo::new("B", "")],
            vec![
                Fragment::new(set(&[1, 2]), "the sea"),
                Fragment::new(set(&[1]), "board"),
                Fragment::new(set(&[2]), " board"),
                Fragment::new(set(&[1, 2]), " plains"),
            ],
        )
        .unwrap();

        let sea = Position::locate(graph.fragments(), 0, 4, 4);
        assert_eq!(sea.ends(), &[12, 7]);
        assert_eq!(match_versions(&[7], &graph), set(&[1]));
        // "board" at 7 lies inside version 1's reading of "seaboard"
        assert_eq!(match_versions(&[4, 7], &graph), set(&[1, 2]));
    }

    #[test]
    fn test_word_running_to_end_of_document() {
        let graph = mist_graph();
        let positions = positions(&[19], &graph);
        assert_eq!(positions[0].ends(), &[23]);
        assert!(!positions[0].overlaps(&Position::locate(graph.fragments(), 0, 2, 2)));
    }

    #[test]
    fn test_v_positions() {
        let graph = mist_graph();
        assert_eq!(v_positions(&[19, 2], &graph, 1), vec![2, 16]);
        assert_eq!(v_positions(&[19, 15], &graph, 2), vec![11, 15]);
        // blue is not in version 2
        assert_eq!(v_positions(&[11, 19], &graph, 2), vec![15]);
        assert_eq!(v_positions(&[99], &graph, 1), Vec::<u32>::new());

        let text: String = graph.characters_of_version(2).unwrap().into_iter().collect();
        assert_eq!(&text[15..19], "mist");
    }
}
