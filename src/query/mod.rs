//! Query parsing and match candidates
//!
//! A raw query string becomes a [`Query`]: a list of normalized terms and a
//! [`MatchType`]. The index grows one [`Match`] per document from the terms'
//! postings; [`select`] then applies the query type's constraint and orders
//! the survivors by score.

mod matcher;
mod parser;

pub use matcher::{select, Match, MatchTerm, MatchType};
pub use parser::Query;
