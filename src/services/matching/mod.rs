pub mod scorer;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::config::MatchingConfig;
use crate::db::{BlindSpot, BuddyMatch, DbOperations, MatchStatus, User};
use crate::error::AppError;
use scorer::{rank_candidates, MatchProfile};

const MAX_LIMIT: u32 = 50;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSuggestion {
    pub match_id: Uuid,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub compatibility_score: f64,
    pub status: MatchStatus,
    pub shared_subjects: Vec<String>,
    pub shared_blind_spots: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub partner_name: Option<String>,
    pub status: MatchStatus,
    pub compatibility_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct MatchService {
    db: DbOperations,
    config: MatchingConfig,
    blind_spot_threshold: f64,
}

impl MatchService {
    pub fn new(db: DbOperations, config: MatchingConfig, blind_spot_threshold: f64) -> Self {
        Self {
            db,
            config,
            blind_spot_threshold,
        }
    }

    pub fn resolve_limit(&self, limit: Option<u32>) -> Result<usize, AppError> {
        match limit {
            None => Ok(self.config.max_results.clamp(1, MAX_LIMIT) as usize),
            Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n as usize),
            Some(_) => Err(AppError::validation(format!("limit must be between 1 and {}", MAX_LIMIT))),
        }
    }

    /// Scores every other user against the caller and records the best
    /// candidates as matches.
    pub async fn find_matches(&self, user_id: Uuid, limit: Option<u32>) -> Result<Vec<MatchSuggestion>, AppError> {
        let limit = self.resolve_limit(limit)?;

        let requester = self
            .db
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        let candidates = self.db.list_match_candidates(user_id).await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<Uuid> = candidates.iter().map(|u| u.id).collect();
        ids.push(user_id);
        let mut topics_by_user = group_topics(self.db.list_blind_spots_for_users(&ids).await?);

        let requester_profile = to_profile(&requester, topics_by_user.remove(&user_id).unwrap_or_default());
        let candidate_profiles: Vec<MatchProfile> = candidates
            .iter()
            .map(|u| to_profile(u, topics_by_user.remove(&u.id).unwrap_or_default()))
            .collect();
        let names: HashMap<Uuid, Option<String>> = candidates.into_iter().map(|u| (u.id, u.name)).collect();

        let ranked = rank_candidates(&requester_profile, &candidate_profiles, self.blind_spot_threshold);

        let mut suggestions = Vec::new();
        for candidate in ranked
            .into_iter()
            .filter(|c| c.score >= self.config.min_score)
            .take(limit)
        {
            let stored = self.db.upsert_match(user_id, candidate.user_id, candidate.score).await?;
            suggestions.push(MatchSuggestion {
                match_id: stored.id,
                user_id: candidate.user_id,
                name: names.get(&candidate.user_id).cloned().flatten(),
                compatibility_score: candidate.score,
                status: stored.status,
                shared_subjects: candidate.shared_subjects,
                shared_blind_spots: candidate.shared_blind_spots,
            });
        }

        info!(user_id = %user_id, matches = suggestions.len(), "Study buddy matches computed");
        Ok(suggestions)
    }

    pub async fn list_matches(&self, user_id: Uuid) -> Result<Vec<MatchView>, AppError> {
        let rows = self.db.list_matches_for_user(user_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| MatchView {
                id: row.buddy_match.id,
                partner_id: row.buddy_match.partner_of(user_id),
                partner_name: row.partner_name,
                status: row.buddy_match.status,
                compatibility_score: row.buddy_match.compatibility_score,
                created_at: row.buddy_match.created_at,
                updated_at: row.buddy_match.updated_at,
            })
            .collect())
    }

    pub async fn update_status(
        &self,
        user_id: Uuid,
        match_id: Uuid,
        status: &str,
    ) -> Result<BuddyMatch, AppError> {
        let next: MatchStatus = status.parse().map_err(AppError::Validation)?;

        let current = self
            .db
            .get_match(match_id)
            .await?
            .filter(|m| m.involves(user_id))
            .ok_or_else(|| AppError::not_found("Match"))?;

        if current.status == next {
            return Ok(current);
        }
        if !current.status.can_transition_to(next) {
            return Err(AppError::validation(format!(
                "Cannot change match status from {} to {}",
                current.status, next
            )));
        }

        let updated = self.db.update_match_status(match_id, next).await?;
        info!(match_id = %match_id, from = %current.status, to = %next, "Match status updated");
        Ok(updated)
    }
}

fn group_topics(spots: Vec<BlindSpot>) -> HashMap<Uuid, Vec<(String, f64)>> {
    let mut grouped: HashMap<Uuid, Vec<(String, f64)>> = HashMap::new();
    for spot in spots {
        grouped.entry(spot.user_id).or_default().push((spot.topic, spot.confidence));
    }
    grouped
}

fn to_profile(user: &User, topics: Vec<(String, f64)>) -> MatchProfile {
    MatchProfile {
        user_id: user.id,
        subjects: user.preferred_subjects.0.clone(),
        study_style: user.study_style.clone(),
        availability: user.availability.clone(),
        experience_level: user.experience_level.clone(),
        topics,
    }
}
