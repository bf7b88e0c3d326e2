use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::hierarchy::{Hierarchy, NodeId};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: NodeId,
    pub score: i64,
}

/// Nodes whose name fuzzily matches `query`, best score first, heavier
/// nodes first on equal scores. An empty query matches nothing.
pub fn find(hierarchy: &Hierarchy, query: &str, limit: usize) -> Vec<SearchHit> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    let m = SkimMatcherV2::default();
    let mut hits: Vec<(SearchHit, f64)> = hierarchy
        .nodes
        .iter()
        .filter_map(|n| {
            m.fuzzy_match(&n.name, query)
                .map(|score| (SearchHit { id: n.id, score }, n.weight))
        })
        .collect();
    hits.sort_by(|(a, wa), (b, wb)| b.score.cmp(&a.score).then(wb.total_cmp(wa)));
    hits.into_iter().take(limit).map(|(h, _)| h).collect()
}
