use super::SearchHit;
use crate::dataset::RawRepoRecord;
use std::collections::HashSet;

/// Filters search hits down to repositories not seen earlier in the run.
#[derive(Debug, Clone, Default)]
pub struct ResultDeduplicator {
    seen: HashSet<u64>,
    include_topics: bool,
}

impl ResultDeduplicator {
    #[must_use]
    pub fn new(include_topics: bool) -> Self {
        Self {
            seen: HashSet::new(),
            include_topics,
        }
    }

    /// Record the hit's id, returning `true` only the first time that id is admitted.
    ///
    /// Hits without an id are never admitted.
    pub fn admit(&mut self, hit: &SearchHit) -> bool {
        hit.id.is_some_and(|id| self.seen.insert(id))
    }

    /// Project a hit onto the dataset columns; `None` when the hit has no id
    #[must_use]
    pub fn normalize(&self, hit: &SearchHit) -> Option<RawRepoRecord> {
        Some(RawRepoRecord {
            repo_id: hit.id?,
            full_name: hit.full_name.clone(),
            name: hit.name.clone(),
            owner: hit.owner.as_ref().and_then(|o| o.login.clone()),
            language: hit.language.clone(),
            created_at: hit.created_at,
            updated_at: hit.updated_at,
            size_kb: hit.size,
            stargazers_count: hit.stargazers_count,
            forks_count: hit.forks_count,
            open_issues_count: hit.open_issues_count,
            watchers_count: hit.watchers_count,
            license: hit.license.as_ref().and_then(|l| l.name.clone()),
            topics: self
                .include_topics
                .then(|| hit.topics.as_deref().unwrap_or_default().join(",")),
        })
    }

    /// Number of distinct ids admitted so far
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
