//! In-memory plan store keyed by generated ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::solver::Plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Generated,
    Edited,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPlan {
    pub id: Uuid,
    pub status: PlanStatus,
    pub plan: Plan,
}

/// Plans live until the store is dropped; there is no expiry.
#[derive(Debug, Default)]
pub struct PlanStore {
    plans: HashMap<Uuid, StoredPlan>,
}

impl PlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, plan: Plan) -> &StoredPlan {
        let id = Uuid::new_v4();
        debug!(%id, groups = plan.groups.len(), "plan stored");
        self.plans.entry(id).or_insert(StoredPlan {
            id,
            status: PlanStatus::Generated,
            plan,
        })
    }

    pub fn get(&self, id: &Uuid) -> Result<&StoredPlan> {
        self.plans
            .get(id)
            .ok_or_else(|| Error::not_found(format!("plan {}", id)))
    }

    /// Replaces the stored plan and marks it as edited.
    pub fn update(&mut self, id: &Uuid, plan: Plan) -> Result<&StoredPlan> {
        let stored = self
            .plans
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("plan {}", id)))?;
        stored.plan = plan;
        stored.status = PlanStatus::Edited;
        debug!(%id, "plan updated");
        Ok(stored)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
