use std::collections::HashSet;
use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::lineage::LayoutGraph;

use super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Indices of the nodes whose name fuzzily matches `query`.
pub(super) fn matching_nodes(graph: &LayoutGraph, query: &str) -> HashSet<usize> {
    let matcher = SkimMatcherV2::default();
    graph
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| fuzzy_match_score(&matcher, node.name(), query).is_some())
        .map(|(index, _)| index)
        .collect()
}

impl ViewModel {
    pub(super) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.layout_revision == self.layout_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let view = self.view.as_ref()?;
        let matches = Arc::new(matching_nodes(view.graph(), query));
        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            layout_revision: self.layout_revision,
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }
}
