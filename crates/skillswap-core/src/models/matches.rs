use serde::{Deserialize, Serialize};

/// A suggested exchange partner from `GET /api/matches`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct Match {
    pub id: String,
    pub name: String,
    pub avatar: String,
    #[serde(rename = "skillOffered")]
    pub skill_offered: String,
    #[serde(rename = "skillWanted")]
    pub skill_wanted: String,
    pub rating: f64,
    #[serde(rename = "completedSwaps")]
    pub completed_swaps: u32,
    pub location: String,
    pub bio: String,
    #[serde(rename = "matchScore")]
    pub match_score: f64,
    pub tags: Vec<String>,
    #[serde(rename = "responseTime")]
    pub response_time: String,
    pub availability: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_match_uses_defaults() {
        let m: Match = serde_json::from_str(r#"{"id":"m1","name":"Cy","matchScore":87}"#)
            .expect("parse match");
        assert_eq!(m.id, "m1");
        assert_eq!(m.match_score, 87.0);
        assert!(m.tags.is_empty());
        assert_eq!(m.completed_swaps, 0);
    }
}
