use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::{extract_json_block, prompts, LlmClient};
use crate::config::CardsConfig;
use crate::db::{DbOperations, Flashcard, NewFlashcard};
use crate::error::{AiError, AppError};
use crate::services::{validate_content, AiBudget};

const DEFAULT_TOPIC: &str = "General";
const MAX_TOPIC_CHARS: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateCardsRequest {
    pub content: String,
    pub topic: Option<String>,
    pub count: Option<u32>,
}

pub struct CardService {
    db: DbOperations,
    llm: Arc<dyn LlmClient>,
    budget: Arc<AiBudget>,
    config: CardsConfig,
    max_content_chars: usize,
}

impl CardService {
    pub fn new(
        db: DbOperations,
        llm: Arc<dyn LlmClient>,
        budget: Arc<AiBudget>,
        config: CardsConfig,
        max_content_chars: usize,
    ) -> Self {
        Self {
            db,
            llm,
            budget,
            config,
            max_content_chars,
        }
    }

    /// Asks the model for cards; nothing is stored.
    pub async fn draft(&self, user_id: Uuid, req: &GenerateCardsRequest) -> Result<Vec<NewFlashcard>, AppError> {
        let content = validate_content(&req.content, self.max_content_chars)?;
        let count = req.count.unwrap_or(self.config.default_count);
        if count == 0 || count > self.config.max_count {
            return Err(AppError::validation(format!(
                "count must be between 1 and {}",
                self.config.max_count
            )));
        }
        let topic = match req.topic.as_deref().map(str::trim) {
            Some(t) if t.chars().count() > MAX_TOPIC_CHARS => {
                return Err(AppError::validation(format!(
                    "topic must be at most {} characters",
                    MAX_TOPIC_CHARS
                )))
            }
            Some(t) if !t.is_empty() => Some(t),
            _ => None,
        };

        self.budget.charge(user_id).await?;
        let reply = self
            .llm
            .complete(prompts::FLASHCARD_SYSTEM, &prompts::flashcard_prompt(content, topic, count))
            .await?;
        let value = extract_json_block(&reply)?;
        let cards = parse_flashcards(&value, topic, count as usize)?;

        if cards.is_empty() {
            return Err(AiError::MalformedResponse("model returned no usable flashcards".to_string()).into());
        }
        Ok(cards)
    }

    pub async fn generate(&self, user_id: Uuid, req: &GenerateCardsRequest) -> Result<Vec<Flashcard>, AppError> {
        let drafts = self.draft(user_id, req).await?;
        let stored = self.db.insert_flashcards(user_id, &drafts).await?;
        info!(user_id = %user_id, cards = stored.len(), "Flashcards generated");
        Ok(stored)
    }

    pub async fn list(&self, user_id: Uuid, topic: Option<&str>) -> Result<Vec<Flashcard>, AppError> {
        let topic = topic.map(str::trim).filter(|t| !t.is_empty());
        self.db.list_flashcards(user_id, topic).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if self.db.delete_flashcard(id, user_id).await? {
            info!(user_id = %user_id, flashcard_id = %id, "Flashcard deleted");
            Ok(())
        } else {
            Err(AppError::not_found("Flashcard"))
        }
    }

    pub async fn export_csv(&self, user_id: Uuid, topic: Option<&str>) -> Result<String, AppError> {
        let cards = self.list(user_id, topic).await?;
        flashcards_to_csv(&cards)
    }
}

/// Reads `{"flashcards": [{"question", "answer", "topic"}]}`.
pub fn parse_flashcards(
    value: &Value,
    requested_topic: Option<&str>,
    limit: usize,
) -> Result<Vec<NewFlashcard>, AiError> {
    let entries = value
        .get("flashcards")
        .and_then(Value::as_array)
        .ok_or_else(|| AiError::MalformedResponse("missing \"flashcards\" array".to_string()))?;

    let fallback_topic = requested_topic.unwrap_or(DEFAULT_TOPIC);
    let text = |entry: &Value, key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut cards = Vec::new();
    for entry in entries {
        if cards.len() == limit {
            break;
        }
        match (text(entry, "question"), text(entry, "answer")) {
            (Some(question), Some(answer)) => cards.push(NewFlashcard {
                question,
                answer,
                topic: text(entry, "topic").unwrap_or_else(|| fallback_topic.to_string()),
            }),
            _ => warn!("Skipping incomplete flashcard from model: {}", entry),
        }
    }
    Ok(cards)
}

pub fn flashcards_to_csv(cards: &[Flashcard]) -> Result<String, AppError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["question", "answer", "topic", "created_at"])?;
    for card in cards {
        wtr.write_record([
            card.question.as_str(),
            card.answer.as_str(),
            card.topic.as_str(),
            card.created_at.to_rfc3339().as_str(),
        ])?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))
}
