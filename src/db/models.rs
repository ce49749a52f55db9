use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub study_style: Option<String>,
    pub availability: Option<String>,
    pub experience_level: Option<String>,
    pub preferred_subjects: Json<Vec<String>>,
    pub interests: Json<Vec<String>>,
    pub embedding: Option<Json<Vec<f32>>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            name,
            study_style: None,
            availability: None,
            experience_level: None,
            preferred_subjects: Json(Vec::new()),
            interests: Json(Vec::new()),
            embedding: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_profile(&mut self, profile: ProfileUpdate) {
        if let Some(name) = profile.name {
            self.name = Some(name);
        }
        if let Some(style) = profile.study_style {
            self.study_style = Some(style);
        }
        if let Some(availability) = profile.availability {
            self.availability = Some(availability);
        }
        if let Some(level) = profile.experience_level {
            self.experience_level = Some(level);
        }
        if let Some(subjects) = profile.preferred_subjects {
            self.preferred_subjects = Json(subjects);
        }
        if let Some(interests) = profile.interests {
            self.interests = Json(interests);
        }
    }
}

/// The user as seen over HTTP. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub preferred_subjects: Vec<String>,
    pub study_style: Option<String>,
    pub availability: Option<String>,
    pub experience_level: Option<String>,
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            preferred_subjects: user.preferred_subjects.0,
            study_style: user.study_style,
            availability: user.availability,
            experience_level: user.experience_level,
            interests: user.interests.0,
            created_at: user.created_at,
        }
    }
}

/// Already-validated profile fields; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub study_style: Option<String>,
    pub availability: Option<String>,
    pub experience_level: Option<String>,
    pub preferred_subjects: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BlindSpot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// One topic as assessed by the model, confidence already clamped to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAssessment {
    pub topic: String,
    pub confidence: f64,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question: String,
    pub answer: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFlashcard {
    pub question: String,
    pub answer: String,
    pub topic: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
    Active,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Accepted => "accepted",
            MatchStatus::Rejected => "rejected",
            MatchStatus::Active => "active",
        }
    }

    /// Re-applying the current status is always allowed.
    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        use MatchStatus::*;
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Rejected) | (Accepted, Active) | (Accepted, Rejected) | (Active, Rejected)
        )
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(MatchStatus::Pending),
            "accepted" => Ok(MatchStatus::Accepted),
            "rejected" => Ok(MatchStatus::Rejected),
            "active" => Ok(MatchStatus::Active),
            other => Err(format!("Invalid match status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BuddyMatch {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub status: MatchStatus,
    pub compatibility_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BuddyMatch {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    pub fn partner_of(&self, user_id: Uuid) -> Uuid {
        if self.user1_id == user_id {
            self.user2_id
        } else {
            self.user1_id
        }
    }
}

/// A stored match joined with the partner's display name.
#[derive(Debug, Clone, FromRow)]
pub struct MatchWithPartner {
    #[sqlx(flatten)]
    pub buddy_match: BuddyMatch,
    pub partner_name: Option<String>,
}
