//! Plan persistence gateway.
//!
//! The session runtime consumes this transport-agnostic contract; the remote
//! document store behind it is somebody else's problem. Identities crossing
//! this boundary are opaque strings (see [`ExerciseId`]). Retry policy, if
//! any, belongs to the implementation -- the core never retries.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::error::GatewayError;
use crate::model::{Exercise, ExerciseId, Plan, PlanStatus};

/// Operations the session runtime issues against plan storage.
#[allow(async_fn_in_trait)]
pub trait PlanGateway {
    /// Fetch a plan by id.
    async fn fetch_plan(&self, id: &ExerciseId) -> Result<Plan, GatewayError>;

    /// Fetch the whole exercise catalog.
    async fn fetch_all_exercises(&self) -> Result<Vec<Exercise>, GatewayError>;

    /// Best-effort status transition (e.g. `pending -> active` on start).
    async fn update_plan_status(
        &self,
        id: &ExerciseId,
        status: PlanStatus,
    ) -> Result<(), GatewayError>;

    /// Set status `completed` and stamp `completed_at` with the current UTC time.
    async fn mark_plan_completed(&self, id: &ExerciseId) -> Result<(), GatewayError>;
}

/// In-memory gateway for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    inner: Mutex<Store>,
}

#[derive(Debug, Default)]
struct Store {
    plans: HashMap<ExerciseId, Plan>,
    exercises: Vec<Exercise>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_plan(&self, plan: Plan) {
        self.inner.lock().unwrap().plans.insert(plan.id.clone(), plan);
    }

    pub fn insert_exercise(&self, exercise: Exercise) {
        self.inner.lock().unwrap().exercises.push(exercise);
    }

    pub fn plan(&self, id: &ExerciseId) -> Option<Plan> {
        self.inner.lock().unwrap().plans.get(id).cloned()
    }
}

impl PlanGateway for MemoryGateway {
    async fn fetch_plan(&self, id: &ExerciseId) -> Result<Plan, GatewayError> {
        self.inner
            .lock()
            .unwrap()
            .plans
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound {
                kind: "plan",
                id: id.to_string(),
            })
    }

    async fn fetch_all_exercises(&self) -> Result<Vec<Exercise>, GatewayError> {
        Ok(self.inner.lock().unwrap().exercises.clone())
    }

    async fn update_plan_status(
        &self,
        id: &ExerciseId,
        status: PlanStatus,
    ) -> Result<(), GatewayError> {
        let mut inner = self.inner.lock().unwrap();
        let plan = inner.plans.get_mut(id).ok_or_else(|| GatewayError::NotFound {
            kind: "plan",
            id: id.to_string(),
        })?;
        plan.status = status;
        Ok(())
    }

    async fn mark_plan_completed(&self, id: &ExerciseId) -> Result<(), GatewayError> {
        let mut inner = self.inner.lock().unwrap();
        let plan = inner.plans.get_mut(id).ok_or_else(|| GatewayError::NotFound {
            kind: "plan",
            id: id.to_string(),
        })?;
        plan.status = PlanStatus::Completed;
        plan.completed_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlanExercise, PlanType};
    use chrono::NaiveDate;

    fn plan(id: &str) -> Plan {
        Plan {
            id: ExerciseId::new(id),
            plan_type: PlanType::Instant,
            date: NaiveDate::from_ymd_opt(2026, 8, 23).unwrap(),
            time: "09:00".into(),
            status: PlanStatus::Pending,
            exercises: vec![PlanExercise {
                exercise_id: ExerciseId::new("1"),
                repetitions: 3,
            }],
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn fetch_missing_plan_is_not_found() {
        let gw = MemoryGateway::new();
        let err = gw.fetch_plan(&ExerciseId::new("absent")).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { kind: "plan", .. }));
    }

    #[tokio::test]
    async fn mark_completed_sets_status_and_timestamp() {
        let gw = MemoryGateway::new();
        gw.insert_plan(plan("p1"));
        gw.mark_plan_completed(&ExerciseId::new("p1")).await.unwrap();

        let stored = gw.plan(&ExerciseId::new("p1")).unwrap();
        assert_eq!(stored.status, PlanStatus::Completed);
        assert!(stored.completed_at.is_some());
    }
}
