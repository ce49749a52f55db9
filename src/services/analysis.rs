use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::{extract_json_block, prompts, LlmClient};
use crate::config::AnalysisConfig;
use crate::db::{BlindSpot, DbOperations, TopicAssessment};
use crate::error::{AiError, AppError};
use crate::services::{validate_content, AiBudget};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub blind_spots: Vec<BlindSpot>,
    pub analysis: Vec<TopicAssessment>,
}

pub struct AnalysisService {
    db: DbOperations,
    llm: Arc<dyn LlmClient>,
    budget: Arc<AiBudget>,
    config: AnalysisConfig,
}

impl AnalysisService {
    pub fn new(db: DbOperations, llm: Arc<dyn LlmClient>, budget: Arc<AiBudget>, config: AnalysisConfig) -> Self {
        Self {
            db,
            llm,
            budget,
            config,
        }
    }

    /// Asks the model to grade the material; nothing is stored.
    pub async fn assess(&self, user_id: Uuid, content: &str) -> Result<Vec<TopicAssessment>, AppError> {
        let content = validate_content(content, self.config.max_content_chars)?;
        self.budget.charge(user_id).await?;
        let reply = self
            .llm
            .complete(prompts::ANALYSIS_SYSTEM, &prompts::analysis_prompt(content))
            .await?;
        let value = extract_json_block(&reply)?;
        Ok(parse_assessments(&value)?)
    }

    pub async fn analyze(&self, user_id: Uuid, content: &str) -> Result<AnalysisOutcome, AppError> {
        let analysis = self.assess(user_id, content).await?;

        let weak: Vec<TopicAssessment> = analysis
            .iter()
            .filter(|t| t.confidence < self.config.blind_spot_threshold)
            .cloned()
            .collect();

        let blind_spots = if weak.is_empty() {
            Vec::new()
        } else {
            self.db.insert_blind_spots(user_id, &weak).await?
        };

        info!(
            user_id = %user_id,
            topics = analysis.len(),
            blind_spots = blind_spots.len(),
            "Content analyzed"
        );

        Ok(AnalysisOutcome { blind_spots, analysis })
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<BlindSpot>, AppError> {
        self.db.list_blind_spots(user_id).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if self.db.delete_blind_spot(id, user_id).await? {
            info!(user_id = %user_id, blind_spot_id = %id, "Blind spot deleted");
            Ok(())
        } else {
            Err(AppError::not_found("Blind spot"))
        }
    }
}

/// Reads `{"topics": [{"topic", "confidence", "explanation"}]}`, dropping
/// entries without a usable topic or confidence.
pub fn parse_assessments(value: &Value) -> Result<Vec<TopicAssessment>, AiError> {
    let topics = value
        .get("topics")
        .and_then(Value::as_array)
        .ok_or_else(|| AiError::MalformedResponse("missing \"topics\" array".to_string()))?;

    let mut parsed = Vec::with_capacity(topics.len());
    for entry in topics {
        let topic = entry.get("topic").and_then(Value::as_str).map(str::trim).unwrap_or("");
        let confidence = entry.get("confidence").and_then(number_like);

        match (topic, confidence) {
            (topic, Some(confidence)) if !topic.is_empty() => parsed.push(TopicAssessment {
                topic: topic.to_string(),
                confidence: confidence.clamp(0.0, 1.0),
                explanation: entry
                    .get("explanation")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string),
            }),
            _ => warn!("Skipping unusable topic entry from model: {}", entry),
        }
    }
    Ok(parsed)
}

fn number_like(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}
