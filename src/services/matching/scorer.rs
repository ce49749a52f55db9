//! Compatibility scoring between study partners.
//!
//! The score is a weighted sum of five components, each in `[0, 1]`:
//! subject overlap (Jaccard), equal study style, equal availability,
//! experience proximity and shared blind spots. Weights sum to one.

use std::collections::BTreeSet;
use uuid::Uuid;

use crate::profile::experience_rank;

pub const SUBJECT_WEIGHT: f64 = 0.35;
pub const STYLE_WEIGHT: f64 = 0.15;
pub const AVAILABILITY_WEIGHT: f64 = 0.20;
pub const EXPERIENCE_WEIGHT: f64 = 0.15;
pub const BLIND_SPOT_WEIGHT: f64 = 0.15;

#[derive(Debug, Clone, Default)]
pub struct MatchProfile {
    pub user_id: Uuid,
    pub subjects: Vec<String>,
    pub study_style: Option<String>,
    pub availability: Option<String>,
    pub experience_level: Option<String>,
    /// Topics with their confidence; only those under the threshold count.
    pub topics: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub user_id: Uuid,
    pub score: f64,
    pub shared_subjects: Vec<String>,
    pub shared_blind_spots: Vec<String>,
}

/// Scores every candidate against the requester, best first. Equal scores
/// keep the order the candidates were given in.
pub fn rank_candidates(
    requester: &MatchProfile,
    candidates: &[MatchProfile],
    threshold: f64,
) -> Vec<ScoredCandidate> {
    let own_subjects = normalized(&requester.subjects);
    let own_weak = weak_topics(&requester.topics, threshold);

    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .filter(|c| c.user_id != requester.user_id)
        .map(|candidate| {
            let subjects = normalized(&candidate.subjects);
            let weak = weak_topics(&candidate.topics, threshold);

            let shared_subjects: Vec<String> = own_subjects.intersection(&subjects).cloned().collect();
            let shared_blind_spots: Vec<String> = own_weak.intersection(&weak).cloned().collect();

            let score = SUBJECT_WEIGHT * jaccard(&own_subjects, &subjects)
                + STYLE_WEIGHT * same_label(&requester.study_style, &candidate.study_style)
                + AVAILABILITY_WEIGHT * same_label(&requester.availability, &candidate.availability)
                + EXPERIENCE_WEIGHT
                    * experience_proximity(&requester.experience_level, &candidate.experience_level)
                + BLIND_SPOT_WEIGHT * shared_fraction(shared_blind_spots.len(), own_weak.len(), weak.len());

            ScoredCandidate {
                user_id: candidate.user_id,
                score: round3(score),
                shared_subjects,
                shared_blind_spots,
            }
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

fn normalized(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn weak_topics(topics: &[(String, f64)], threshold: f64) -> BTreeSet<String> {
    topics
        .iter()
        .filter(|(_, confidence)| *confidence < threshold)
        .map(|(topic, _)| topic.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn same_label(a: &Option<String>, b: &Option<String>) -> f64 {
    match (a.as_deref().map(str::trim), b.as_deref().map(str::trim)) {
        (Some(a), Some(b)) if !a.is_empty() && a.eq_ignore_ascii_case(b) => 1.0,
        _ => 0.0,
    }
}

fn experience_proximity(a: &Option<String>, b: &Option<String>) -> f64 {
    let (Some(a), Some(b)) = (
        a.as_deref().and_then(experience_rank),
        b.as_deref().and_then(experience_rank),
    ) else {
        return 0.0;
    };
    match a.abs_diff(b) {
        0 => 1.0,
        1 => 0.5,
        _ => 0.0,
    }
}

fn shared_fraction(shared: usize, a: usize, b: usize) -> f64 {
    let smaller = a.min(b);
    if smaller == 0 {
        return 0.0;
    }
    shared as f64 / smaller as f64
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(subjects: &[&str], style: &str, availability: &str, level: &str, topics: &[(&str, f64)]) -> MatchProfile {
        MatchProfile {
            user_id: Uuid::new_v4(),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            study_style: Some(style.to_string()),
            availability: Some(availability.to_string()),
            experience_level: Some(level.to_string()),
            topics: topics.iter().map(|(t, c)| (t.to_string(), *c)).collect(),
        }
    }

    #[test]
    fn test_identical_profiles_score_one() {
        let me = profile(&["Math", "Physics"], "visual", "evenings", "intermediate", &[("Integrals", 0.3)]);
        let twin = MatchProfile {
            user_id: Uuid::new_v4(),
            subjects: vec!["physics ".into(), "MATH".into()],
            study_style: Some("Visual".into()),
            ..me.clone()
        };

        let ranked = rank_candidates(&me, &[twin], 0.6);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, 1.0);
        assert_eq!(ranked[0].shared_subjects, vec!["math".to_string(), "physics".to_string()]);
        assert_eq!(ranked[0].shared_blind_spots, vec!["integrals".to_string()]);
    }

    #[test]
    fn test_disjoint_profiles_score_zero() {
        let me = profile(&["Math"], "visual", "mornings", "beginner", &[("Fractions", 0.2)]);
        let other = profile(&["History"], "auditory", "evenings", "expert", &[("Dates", 0.1)]);

        let ranked = rank_candidates(&me, &[other], 0.6);
        assert_eq!(ranked[0].score, 0.0);
        assert!(ranked[0].shared_subjects.is_empty());
    }

    #[test]
    fn test_adjacent_experience_scores_half() {
        let me = profile(&[], "a", "x", "intermediate", &[]);
        let adjacent = profile(&[], "b", "y", "advanced", &[]);
        let far = profile(&[], "b", "y", "expert", &[]);

        let ranked = rank_candidates(&me, &[far.clone(), adjacent.clone()], 0.6);
        assert_eq!(ranked[0].user_id, adjacent.user_id);
        assert_eq!(ranked[0].score, round3(EXPERIENCE_WEIGHT * 0.5));
        assert_eq!(ranked[1].user_id, far.user_id);
        assert_eq!(ranked[1].score, 0.0);
    }

    #[test]
    fn test_subject_overlap_is_jaccard() {
        let me = profile(&["Math", "Physics", "Chemistry"], "a", "x", "guru", &[]);
        let other = profile(&["Math", "Biology"], "b", "y", "guru", &[]);

        let ranked = rank_candidates(&me, &[other], 0.6);
        // |{math}| / |{math, physics, chemistry, biology}|
        assert_eq!(ranked[0].score, round3(SUBJECT_WEIGHT * 0.25));
    }

    #[test]
    fn test_only_low_confidence_topics_are_shared() {
        let me = profile(&[], "a", "x", "guru", &[("Recursion", 0.2), ("Loops", 0.9)]);
        let other = profile(&[], "b", "y", "guru", &[("recursion", 0.5), ("loops", 0.3)]);

        let ranked = rank_candidates(&me, &[other], 0.6);
        assert_eq!(ranked[0].shared_blind_spots, vec!["recursion".to_string()]);
        // one shared out of min(1, 2) weak topics
        assert_eq!(ranked[0].score, round3(BLIND_SPOT_WEIGHT));
    }

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let me = profile(&["Math"], "visual", "evenings", "beginner", &[]);
        let tie_a = profile(&["Art"], "visual", "mornings", "expert", &[]);
        let best = profile(&["Math"], "visual", "evenings", "beginner", &[]);
        let tie_b = profile(&["Music"], "visual", "afternoons", "expert", &[]);

        let ranked = rank_candidates(&me, &[tie_a.clone(), best.clone(), tie_b.clone()], 0.6);
        let order: Vec<Uuid> = ranked.iter().map(|c| c.user_id).collect();
        assert_eq!(order, vec![best.user_id, tie_a.user_id, tie_b.user_id]);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_requester_is_never_a_candidate() {
        let me = profile(&["Math"], "visual", "evenings", "beginner", &[]);
        let ranked = rank_candidates(&me, &[me.clone()], 0.6);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_missing_fields_score_nothing() {
        let me = MatchProfile {
            user_id: Uuid::new_v4(),
            ..Default::default()
        };
        let other = MatchProfile {
            user_id: Uuid::new_v4(),
            ..Default::default()
        };
        let ranked = rank_candidates(&me, &[other], 0.6);
        assert_eq!(ranked[0].score, 0.0);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total = SUBJECT_WEIGHT + STYLE_WEIGHT + AVAILABILITY_WEIGHT + EXPERIENCE_WEIGHT + BLIND_SPOT_WEIGHT;
        assert!((total - 1.0).abs() < 1e-9);
    }
}
