//! Match browsing: suggested partners plus the local like/pass bookkeeping.

use std::collections::HashSet;

use crate::api::{ApiClient, ApiError};
use crate::models::Match;

#[derive(Debug, Clone, Default)]
pub struct MatchFeed {
    matches: Vec<Match>,
    liked: HashSet<String>,
    passed: HashSet<String>,
}

impl MatchFeed {
    pub fn new(matches: Vec<Match>) -> Self {
        Self {
            matches,
            ..Default::default()
        }
    }

    /// Fetch suggestions from the backend with `api`'s credentials.
    pub async fn load(api: &ApiClient) -> Result<Self, ApiError> {
        Ok(Self::new(api.get_matches().await?))
    }

    pub fn like(&mut self, match_id: &str) {
        self.liked.insert(match_id.to_string());
    }

    pub fn pass(&mut self, match_id: &str) {
        self.passed.insert(match_id.to_string());
    }

    /// Matches not yet liked or passed, in backend order.
    pub fn visible(&self) -> Vec<&Match> {
        self.matches
            .iter()
            .filter(|m| !self.liked.contains(&m.id) && !self.passed.contains(&m.id))
            .collect()
    }

    pub fn liked_count(&self) -> usize {
        self.liked.len()
    }

    pub fn all(&self) -> &[Match] {
        &self.matches
    }

    /// Floor of the mean match score over every suggestion; 0 when empty.
    pub fn average_score(&self) -> u32 {
        if self.matches.is_empty() {
            return 0;
        }
        let total: f64 = self.matches.iter().map(|m| m.match_score).sum();
        (total / self.matches.len() as f64).floor().max(0.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(id: &str, score: f64) -> Match {
        Match {
            id: id.to_string(),
            name: format!("User {}", id),
            match_score: score,
            ..Default::default()
        }
    }

    #[test]
    fn test_like_and_pass_hide_matches() {
        let mut feed = MatchFeed::new(vec![
            suggestion("a", 90.0),
            suggestion("b", 80.0),
            suggestion("c", 70.0),
        ]);
        feed.like("a");
        feed.pass("c");

        let visible: Vec<&str> = feed.visible().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(visible, vec!["b"]);
        assert_eq!(feed.liked_count(), 1);
        assert_eq!(feed.all().len(), 3);
    }

    #[test]
    fn test_unknown_id_changes_nothing_visible() {
        let mut feed = MatchFeed::new(vec![suggestion("a", 50.0)]);
        feed.pass("zzz");
        assert_eq!(feed.visible().len(), 1);
    }

    #[test]
    fn test_average_score_floors() {
        let feed = MatchFeed::new(vec![suggestion("a", 90.0), suggestion("b", 85.0)]);
        assert_eq!(feed.average_score(), 87);
        assert_eq!(MatchFeed::default().average_score(), 0);
    }
}
