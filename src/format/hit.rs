use serde::{Deserialize, Serialize};

use crate::error::Result;

fn is_false(value: &bool) -> bool {
    !*value
}

/// One search result, all matches of a document merged
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// HTML snippet
    pub body: String,
    pub docid: String,
    /// Document-wide offsets of the matched terms
    pub positions: Vec<u32>,
    /// Identifier of the version the snippet was taken from
    pub version1: String,
    pub title: String,
    /// Duplicates an earlier match; rendered hidden
    #[serde(default, skip_serializing_if = "is_false")]
    pub suppressed: bool,
}

/// One page of hits
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitPage {
    pub hits: Vec<Hit>,
    pub first_hit: usize,
    pub total_hits: usize,
    pub num_hits: usize,
    pub hits_per_page: usize,
}

impl HitPage {
    /// The `hits_per_page` hits starting at `first_hit`
    pub fn paginate(hits: Vec<Hit>, first_hit: usize, hits_per_page: usize) -> Self {
        let total_hits = hits.len();
        let hits: Vec<Hit> = hits.into_iter().skip(first_hit).take(hits_per_page).collect();
        Self {
            num_hits: hits.len(),
            hits,
            first_hit,
            total_hits,
            hits_per_page,
        }
    }

    pub fn empty(first_hit: usize, hits_per_page: usize) -> Self {
        Self::paginate(Vec::new(), first_hit, hits_per_page)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(docid: &str) -> Hit {
        Hit {
            body: "<p class=\"hit\">... x ... </p>".to_string(),
            docid: docid.to_string(),
            positions: vec![4],
            version1: "A".to_string(),
            title: docid.to_string(),
            suppressed: false,
        }
    }

    #[test]
    fn test_paginate() {
        let hits: Vec<Hit> = (0..5).map(|i| hit(&format!("english/{}", i))).collect();
        let page = HitPage::paginate(hits, 3, 20);
        assert_eq!(page.total_hits, 5);
        assert_eq!(page.num_hits, 2);
        assert_eq!(page.hits[0].docid, "english/3");

        let past_end = HitPage::paginate(vec![hit("a")], 4, 20);
        assert_eq!(past_end.num_hits, 0);
        assert_eq!(past_end.total_hits, 1);
    }

    #[test]
    fn test_json_shape() {
        let page = HitPage::paginate(vec![hit("english/conrad")], 0, 20);
        let json: serde_json::Value = serde_json::from_str(&page.to_json().unwrap()).unwrap();
        assert_eq!(json["firstHit"], 0);
        assert_eq!(json["totalHits"], 1);
        assert_eq!(json["numHits"], 1);
        assert_eq!(json["hitsPerPage"], 20);
        let first = &json["hits"][0];
        assert_eq!(first["docid"], "english/conrad");
        assert_eq!(first["version1"], "A");
        assert_eq!(first["positions"][0], 4);
        assert!(first.get("suppressed").is_none());

        let back = HitPage::from_json(&page.to_json().unwrap()).unwrap();
        assert_eq!(back, page);
    }
}
