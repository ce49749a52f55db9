use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;

const BUDGET_WINDOW: Duration = Duration::from_secs(60);

/// Per-user allowance of chat model calls over a rolling window.
///
/// Only calls that are about to reach the model are charged, so requests
/// rejected by validation never use up a user's allowance.
pub struct AiBudget {
    limit: usize,
    window: Duration,
    calls: RwLock<HashMap<Uuid, VecDeque<Instant>>>,
}

impl AiBudget {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit as usize,
            window,
            calls: RwLock::new(HashMap::new()),
        }
    }

    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, BUDGET_WINDOW)
    }

    /// Books one model call for `user_id`, or fails with `RateLimited`.
    pub async fn charge(&self, user_id: Uuid) -> Result<(), AppError> {
        let now = Instant::now();
        let mut calls = self.calls.write().await;
        let recent = calls.entry(user_id).or_default();
        expire(recent, now, self.window);

        if recent.len() >= self.limit {
            warn!(user_id = %user_id, limit = self.limit, "AI request budget exhausted");
            return Err(AppError::RateLimited);
        }
        recent.push_back(now);
        Ok(())
    }

    /// Forgets users with no call inside the window; returns how many.
    pub async fn prune(&self) -> usize {
        let now = Instant::now();
        let mut calls = self.calls.write().await;
        let before = calls.len();
        calls.retain(|_, recent| {
            expire(recent, now, self.window);
            !recent.is_empty()
        });
        before - calls.len()
    }

    pub async fn tracked_users(&self) -> usize {
        self.calls.read().await.len()
    }
}

// Timestamps are pushed in order, so expired ones sit at the front.
fn expire(recent: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while recent
        .front()
        .is_some_and(|at| now.duration_since(*at) >= window)
    {
        recent.pop_front();
    }
}
