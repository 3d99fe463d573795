use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};

use super::parser::Query;
use crate::graph::VersionId;
use crate::index::DocNo;

/// How the terms of a query must relate inside a document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Quoted phrase: every term, in order, each within `slop` characters
    /// of the previous one
    Literal,
    /// Every term, anywhere in the document
    Boolean,
    /// No constraint
    Other,
}

impl MatchType {
    pub fn accepts(&self, candidate: &Match, slop: u32) -> bool {
        match self {
            MatchType::Literal => candidate.has_all_terms() && candidate.can_be_literal(slop),
            MatchType::Boolean => candidate.has_all_terms(),
            MatchType::Other => true,
        }
    }
}

/// Sorted offsets at which one query term occurs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchTerm {
    pub term: String,
    /// Term length in characters
    len: u32,
    offsets: Vec<u32>,
}

impl MatchTerm {
    fn new(term: &str) -> Self {
        Self {
            term: term.to_string(),
            len: term.chars().count() as u32,
            offsets: Vec::new(),
        }
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Smallest gap between an occurrence of `self` and one of `other`
    fn min_gap(&self, other: &MatchTerm) -> Option<u32> {
        let mut best: Option<u32> = None;
        for &a in &self.offsets {
            let at = other.offsets.partition_point(|&b| b < a);
            let after = other.offsets.get(at).map(|&b| b.saturating_sub(a + self.len));
            let before = at
                .checked_sub(1)
                .map(|i| a.saturating_sub(other.offsets[i] + other.len));
            for gap in after.into_iter().chain(before) {
                best = Some(best.map_or(gap, |b| b.min(gap)));
            }
        }
        best
    }
}

/// Candidate match of a query within one document
#[derive(Clone, Debug)]
pub struct Match {
    pub doc: DocNo,
    pub match_type: MatchType,
    /// Version to localize to, when the caller pinned one
    pub first_version: Option<VersionId>,
    terms: Vec<MatchTerm>,
    score: OnceCell<f32>,
}

impl Match {
    /// Empty candidate with a slot per query term
    pub fn new(doc: DocNo, query: &Query) -> Self {
        Self {
            doc,
            match_type: query.match_type,
            first_version: None,
            terms: query.terms.iter().map(|t| MatchTerm::new(t)).collect(),
            score: OnceCell::new(),
        }
    }

    /// Record an occurrence of query term `index`. Offsets already present
    /// are ignored.
    pub fn add_term(&mut self, index: usize, offset: u32) {
        if let Some(term) = self.terms.get_mut(index) {
            if let Err(at) = term.offsets.binary_search(&offset) {
                term.offsets.insert(at, offset);
                self.score = OnceCell::new();
            }
        }
    }

    pub fn terms(&self) -> &[MatchTerm] {
        &self.terms
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn has_all_terms(&self) -> bool {
        !self.terms.is_empty() && self.terms.iter().all(|t| !t.is_empty())
    }

    /// Every offset of every term, sorted and deduplicated
    pub fn positions(&self) -> Vec<u32> {
        let mut positions: Vec<u32> = self
            .terms
            .iter()
            .flat_map(|t| t.offsets.iter().copied())
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions
    }

    /// 100 less the share of the matched range taken up by gaps between
    /// neighbouring terms
    pub fn score(&self) -> f32 {
        *self.score.get_or_init(|| self.compute_score())
    }

    fn compute_score(&self) -> f32 {
        let present: Vec<&MatchTerm> = self.terms.iter().filter(|t| !t.is_empty()).collect();
        if present.len() < 2 {
            return 100.0;
        }

        let mut total_gap: u64 = 0;
        for (i, term) in present.iter().enumerate() {
            let nearest = present
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .filter_map(|(_, other)| term.min_gap(other))
                .min();
            total_gap += nearest.unwrap_or(0) as u64;
        }

        let start = present.iter().map(|t| t.offsets[0]).min().unwrap_or(0);
        let end = present
            .iter()
            .filter_map(|t| t.offsets.last().map(|&o| o + t.len))
            .max()
            .unwrap_or(start);
        let range = end.saturating_sub(start);
        if range == 0 {
            return 100.0;
        }
        (100.0 - (total_gap as f32 * 100.0 / range as f32)).clamp(0.0, 100.0)
    }

    /// Some arrangement of the occurrences reads the terms in query order,
    /// each starting after the previous one and within `slop` characters of
    /// its end
    pub fn can_be_literal(&self, slop: u32) -> bool {
        self.terms.windows(2).all(|pair| {
            let (first, second) = (&pair[0], &pair[1]);
            first.offsets.iter().any(|&a| {
                let at = second.offsets.partition_point(|&b| b <= a);
                second
                    .offsets
                    .get(at)
                    .map_or(false, |&b| b <= a + first.len + slop)
            })
        })
    }
}

/// Equal when the same terms occur at the same offsets, whatever the document
impl PartialEq for Match {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}

/// Keep the candidates the query type accepts, best score first
pub fn select(candidates: Vec<Match>, slop: u32) -> Vec<Match> {
    let mut selected: Vec<Match> = candidates
        .into_iter()
        .filter(|m| m.match_type.accepts(m, slop))
        .collect();
    selected.sort_by(|a, b| b.score().total_cmp(&a.score()));
    selected
}
