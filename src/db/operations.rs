use sqlx::PgPool;
use uuid::Uuid;
use chrono::Utc;
use serde::Serialize;
use crate::db::models::{
    BlindSpot, BuddyMatch, Flashcard, MatchStatus, MatchWithPartner, NewFlashcard, TopicAssessment, User,
};
use crate::error::AppError;
use sqlx::{Transaction, Postgres};
use std::sync::Arc;

type Result<T> = std::result::Result<T, AppError>;

const USER_COLUMNS: &str = "id, email, password_hash, name, study_style, availability, experience_level, \
     preferred_subjects, interests, embedding, created_at, updated_at";

const MATCH_COLUMNS: &str = "m.id, m.user1_id, m.user2_id, m.status, m.compatibility_score, m.created_at, m.updated_at";

#[derive(Clone)]
pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn get_pool_status(&self) -> DbPoolStatus {
        let size = self.pool.size();
        let idle = self.pool.num_idle() as u32;

        DbPoolStatus {
            total_connections: size,
            active_connections: size.saturating_sub(idle),
            idle_connections: idle,
        }
    }

    pub async fn begin_transaction(&self) -> Result<Transaction<'_, Postgres>> {
        Ok(self.pool.as_ref().begin().await?)
    }

    // ---- users ----

    pub async fn create_user(&self, user: &User) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (id, email, password_hash, name, study_style, availability, experience_level, \
             preferred_subjects, interests, embedding, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.name)
            .bind(&user.study_style)
            .bind(&user.availability)
            .bind(&user.experience_level)
            .bind(&user.preferred_subjects)
            .bind(&user.interests)
            .bind(&user.embedding)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    pub async fn update_user_profile(&self, user: &User) -> Result<User> {
        let sql = format!(
            "UPDATE users SET name = $2, study_style = $3, availability = $4, experience_level = $5, \
             preferred_subjects = $6, interests = $7, updated_at = $8 \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.study_style)
            .bind(&user.availability)
            .bind(&user.experience_level)
            .bind(&user.preferred_subjects)
            .bind(&user.interests)
            .bind(Utc::now())
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    /// Every other user, oldest account first so score ties stay stable.
    pub async fn list_match_candidates(&self, exclude_user_id: Uuid) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE id <> $1 ORDER BY created_at ASC, id ASC",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(exclude_user_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(users)
    }

    // ---- blind spots ----

    pub async fn insert_blind_spots(
        &self,
        user_id: Uuid,
        topics: &[TopicAssessment],
    ) -> Result<Vec<BlindSpot>> {
        let mut transaction = self.begin_transaction().await?;
        let result = Self::insert_blind_spots_with_transaction(user_id, topics, &mut transaction).await;

        match result {
            Ok(spots) => {
                transaction.commit().await?;
                Ok(spots)
            }
            Err(e) => {
                transaction.rollback().await?;
                Err(e)
            }
        }
    }

    async fn insert_blind_spots_with_transaction(
        user_id: Uuid,
        topics: &[TopicAssessment],
        transaction: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<BlindSpot>> {
        let mut spots = Vec::with_capacity(topics.len());
        for topic in topics {
            let spot = sqlx::query_as::<_, BlindSpot>(
                r#"
                INSERT INTO blind_spots (id, user_id, topic, confidence, created_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, user_id, topic, confidence, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&topic.topic)
            .bind(topic.confidence)
            .bind(Utc::now())
            .fetch_one(&mut **transaction)
            .await?;
            spots.push(spot);
        }
        Ok(spots)
    }

    pub async fn list_blind_spots(&self, user_id: Uuid) -> Result<Vec<BlindSpot>> {
        let spots = sqlx::query_as::<_, BlindSpot>(
            "SELECT id, user_id, topic, confidence, created_at FROM blind_spots \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(spots)
    }

    pub async fn list_blind_spots_for_users(&self, user_ids: &[Uuid]) -> Result<Vec<BlindSpot>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let spots = sqlx::query_as::<_, BlindSpot>(
            "SELECT id, user_id, topic, confidence, created_at FROM blind_spots \
             WHERE user_id = ANY($1) ORDER BY created_at DESC",
        )
        .bind(user_ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(spots)
    }

    /// Returns false when no row owned by `user_id` had that id.
    pub async fn delete_blind_spot(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blind_spots WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ---- flashcards ----

    pub async fn insert_flashcards(&self, user_id: Uuid, cards: &[NewFlashcard]) -> Result<Vec<Flashcard>> {
        let mut transaction = self.begin_transaction().await?;
        let mut stored = Vec::with_capacity(cards.len());

        for card in cards {
            let result = sqlx::query_as::<_, Flashcard>(
                r#"
                INSERT INTO flashcards (id, user_id, question, answer, topic, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, user_id, question, answer, topic, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&card.question)
            .bind(&card.answer)
            .bind(&card.topic)
            .bind(Utc::now())
            .fetch_one(&mut *transaction)
            .await;

            match result {
                Ok(card) => stored.push(card),
                Err(e) => {
                    transaction.rollback().await?;
                    return Err(e.into());
                }
            }
        }

        transaction.commit().await?;
        Ok(stored)
    }

    pub async fn list_flashcards(&self, user_id: Uuid, topic: Option<&str>) -> Result<Vec<Flashcard>> {
        let cards = sqlx::query_as::<_, Flashcard>(
            "SELECT id, user_id, question, answer, topic, created_at FROM flashcards \
             WHERE user_id = $1 AND ($2::TEXT IS NULL OR LOWER(topic) = LOWER($2)) \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(topic)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(cards)
    }

    pub async fn delete_flashcard(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM flashcards WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ---- buddy matches ----

    /// Inserts a pending match, or refreshes the score of the existing
    /// match for this pair while keeping its status.
    pub async fn upsert_match(&self, user1_id: Uuid, user2_id: Uuid, score: f64) -> Result<BuddyMatch> {
        let now = Utc::now();
        let buddy_match = sqlx::query_as::<_, BuddyMatch>(
            r#"
            INSERT INTO buddy_matches (id, user1_id, user2_id, status, compatibility_score, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT ((LEAST(user1_id, user2_id)), (GREATEST(user1_id, user2_id)))
            DO UPDATE SET compatibility_score = EXCLUDED.compatibility_score, updated_at = EXCLUDED.updated_at
            RETURNING id, user1_id, user2_id, status, compatibility_score, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user1_id)
        .bind(user2_id)
        .bind(MatchStatus::Pending)
        .bind(score)
        .bind(now)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(buddy_match)
    }

    pub async fn list_matches_for_user(&self, user_id: Uuid) -> Result<Vec<MatchWithPartner>> {
        let sql = format!(
            "SELECT {}, u.name AS partner_name FROM buddy_matches m \
             JOIN users u ON u.id = CASE WHEN m.user1_id = $1 THEN m.user2_id ELSE m.user1_id END \
             WHERE m.user1_id = $1 OR m.user2_id = $1 \
             ORDER BY m.compatibility_score DESC, m.created_at ASC",
            MATCH_COLUMNS
        );
        let matches = sqlx::query_as::<_, MatchWithPartner>(&sql)
            .bind(user_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(matches)
    }

    pub async fn get_match(&self, id: Uuid) -> Result<Option<BuddyMatch>> {
        let sql = format!("SELECT {} FROM buddy_matches m WHERE m.id = $1", MATCH_COLUMNS);
        let buddy_match = sqlx::query_as::<_, BuddyMatch>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(buddy_match)
    }

    pub async fn update_match_status(&self, id: Uuid, status: MatchStatus) -> Result<BuddyMatch> {
        let buddy_match = sqlx::query_as::<_, BuddyMatch>(
            r#"
            UPDATE buddy_matches SET status = $2, updated_at = $3 WHERE id = $1
            RETURNING id, user1_id, user2_id, status, compatibility_score, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(buddy_match)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DbPoolStatus {
    pub total_connections: u32,
    pub active_connections: u32,
    pub idle_connections: u32,
}
