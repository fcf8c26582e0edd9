//! Per-endpoint dispatch outcomes.

use std::collections::HashMap;

use crate::models::PushStatus;

/// Immutable per-endpoint outcome map produced by one dispatch.
///
/// A response is built exactly once from a gateway reply and never mutated;
/// reclassification means dispatching again and building a new response.
/// Internally the response keeps one status map per gateway interaction
/// ("part"), so an aggregate over several batch chunks or per-PIN requests
/// still answers `status()` against the full original endpoint list.
#[derive(Debug, Clone, Default)]
pub struct PushResponse {
    parts: Vec<HashMap<String, PushStatus>>,
}

impl PushResponse {
    /// Response covering the endpoints of a single gateway interaction.
    pub fn from_statuses(statuses: HashMap<String, PushStatus>) -> Self {
        Self {
            parts: vec![statuses],
        }
    }

    /// Response assigning one status to every listed endpoint.
    pub fn uniform(endpoints: &[String], status: PushStatus) -> Self {
        Self::from_statuses(
            endpoints
                .iter()
                .map(|endpoint| (endpoint.clone(), status))
                .collect(),
        )
    }

    /// Composes sub-responses into one, preserving their order and chunk
    /// structure. Lookups resolve across all parts, so the aggregate answers
    /// for every endpoint of the original request.
    pub fn aggregate(responses: impl IntoIterator<Item = PushResponse>) -> Self {
        Self {
            parts: responses.into_iter().flat_map(|r| r.parts).collect(),
        }
    }

    /// Status for one endpoint.
    ///
    /// Endpoints the gateway never answered for resolve to
    /// [`PushStatus::Unknown`]; this never fails and never returns a partial
    /// value.
    pub fn status(&self, endpoint: &str) -> PushStatus {
        self.parts
            .iter()
            .find_map(|part| part.get(endpoint).copied())
            .unwrap_or(PushStatus::Unknown)
    }

    /// Number of endpoints that received an explicit entry.
    pub fn classified_count(&self) -> usize {
        self.parts.iter().map(HashMap::len).sum()
    }

    /// Number of gateway interactions this response was assembled from.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// True when every classified endpoint reports [`PushStatus::Success`].
    pub fn all_succeeded(&self) -> bool {
        self.iter().all(|(_, status)| status == PushStatus::Success)
    }

    /// Iterates over every classified endpoint with its status.
    pub fn iter(&self) -> impl Iterator<Item = (&str, PushStatus)> {
        self.parts
            .iter()
            .flat_map(|part| part.iter().map(|(e, s)| (e.as_str(), *s)))
    }
}
