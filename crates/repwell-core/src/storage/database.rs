//! SQLite-based plan and exercise storage.
//!
//! Local implementation of the plan gateway: the exercise catalog lives in
//! its own table, a plan row keeps its ordered exercise list as a JSON
//! column so the ordering survives round-trips untouched.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{DatabaseError, GatewayError};
use crate::gateway::PlanGateway;
use crate::model::{Exercise, ExerciseId, Plan, PlanExercise, PlanStatus, PlanType};

use super::data_dir;

/// SQLite database for plans and the exercise catalog.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/repwell/repwell.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("repwell.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS exercises (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                rationale   TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS plans (
                id           TEXT PRIMARY KEY,
                plan_type    TEXT NOT NULL,
                date         TEXT NOT NULL,
                time         TEXT NOT NULL,
                status       TEXT NOT NULL,
                exercises    TEXT NOT NULL,
                completed_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_plans_status ON plans(status);
            CREATE INDEX IF NOT EXISTS idx_plans_completed_at ON plans(completed_at);",
        )?;
        Ok(())
    }

    // ── Exercise catalog ─────────────────────────────────────────────

    pub fn insert_exercise(&self, exercise: &Exercise) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO exercises (id, name, description, rationale)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                exercise.id.as_str(),
                exercise.name,
                exercise.description,
                exercise.rationale
            ],
        )?;
        Ok(())
    }

    pub fn get_exercise(&self, id: &ExerciseId) -> Result<Option<Exercise>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, description, rationale FROM exercises WHERE id = ?1",
                params![id.as_str()],
                exercise_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn list_exercises(&self) -> Result<Vec<Exercise>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description, rationale FROM exercises ORDER BY name")?;
        let rows = stmt.query_map([], exercise_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn update_exercise(&self, exercise: &Exercise) -> Result<bool, DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE exercises SET name = ?2, description = ?3, rationale = ?4 WHERE id = ?1",
            params![
                exercise.id.as_str(),
                exercise.name,
                exercise.description,
                exercise.rationale
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_exercise(&self, id: &ExerciseId) -> Result<bool, DatabaseError> {
        let changed = self
            .conn
            .execute("DELETE FROM exercises WHERE id = ?1", params![id.as_str()])?;
        Ok(changed > 0)
    }

    // ── Plans ────────────────────────────────────────────────────────

    pub fn insert_plan(&self, plan: &Plan) -> Result<(), DatabaseError> {
        let exercises = serde_json::to_string(&plan.exercises)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        self.conn.execute(
            "INSERT INTO plans (id, plan_type, date, time, status, exercises, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                plan.id.as_str(),
                plan_type_str(plan.plan_type),
                plan.date.to_string(),
                plan.time,
                plan.status.as_str(),
                exercises,
                plan.completed_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    pub fn get_plan(&self, id: &ExerciseId) -> Result<Option<Plan>, DatabaseError> {
        self.conn
            .query_row(
                "SELECT id, plan_type, date, time, status, exercises, completed_at
                 FROM plans WHERE id = ?1",
                params![id.as_str()],
                plan_columns,
            )
            .optional()?
            .map(plan_from_columns)
            .transpose()
    }

    pub fn list_plans(&self) -> Result<Vec<Plan>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, plan_type, date, time, status, exercises, completed_at
             FROM plans ORDER BY date, time",
        )?;
        let rows = stmt.query_map([], plan_columns)?;
        rows.collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(plan_from_columns)
            .collect()
    }

    pub fn set_plan_status(
        &self,
        id: &ExerciseId,
        status: PlanStatus,
    ) -> Result<bool, DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE plans SET status = ?2 WHERE id = ?1",
            params![id.as_str(), status.as_str()],
        )?;
        Ok(changed > 0)
    }

    pub fn complete_plan(
        &self,
        id: &ExerciseId,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE plans SET status = 'completed', completed_at = ?2 WHERE id = ?1",
            params![id.as_str(), completed_at.to_rfc3339()],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_plan(&self, id: &ExerciseId) -> Result<bool, DatabaseError> {
        let changed = self
            .conn
            .execute("DELETE FROM plans WHERE id = ?1", params![id.as_str()])?;
        Ok(changed > 0)
    }
}

fn exercise_from_row(row: &Row<'_>) -> rusqlite::Result<Exercise> {
    Ok(Exercise {
        id: ExerciseId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        rationale: row.get(3)?,
    })
}

type PlanColumns = (
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
);

fn plan_columns(row: &Row<'_>) -> rusqlite::Result<PlanColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn plan_from_columns(cols: PlanColumns) -> Result<Plan, DatabaseError> {
    let (id, plan_type, date, time, status, exercises, completed_at) = cols;
    let corrupt = |message: String| DatabaseError::CorruptRow {
        table: "plans",
        message,
    };

    let plan_type = match plan_type.as_str() {
        "instant" => PlanType::Instant,
        "scheduled" => PlanType::Scheduled,
        other => return Err(corrupt(format!("unknown plan type '{other}'"))),
    };
    let status = match status.as_str() {
        "pending" => PlanStatus::Pending,
        "active" => PlanStatus::Active,
        "completed" => PlanStatus::Completed,
        other => return Err(corrupt(format!("unknown status '{other}'"))),
    };
    let date = date
        .parse::<NaiveDate>()
        .map_err(|e| corrupt(format!("bad date: {e}")))?;
    let exercises: Vec<PlanExercise> =
        serde_json::from_str(&exercises).map_err(|e| corrupt(format!("bad exercise list: {e}")))?;
    let completed_at = completed_at
        .map(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| corrupt(format!("bad completed_at: {e}")))
        })
        .transpose()?;

    Ok(Plan {
        id: ExerciseId::new(id),
        plan_type,
        date,
        time,
        status,
        exercises,
        completed_at,
    })
}

fn plan_type_str(plan_type: PlanType) -> &'static str {
    match plan_type {
        PlanType::Instant => "instant",
        PlanType::Scheduled => "scheduled",
    }
}

impl PlanGateway for Database {
    async fn fetch_plan(&self, id: &ExerciseId) -> Result<Plan, GatewayError> {
        self.get_plan(id)
            .map_err(GatewayError::from)?
            .ok_or_else(|| GatewayError::NotFound {
                kind: "plan",
                id: id.to_string(),
            })
    }

    async fn fetch_all_exercises(&self) -> Result<Vec<Exercise>, GatewayError> {
        self.list_exercises().map_err(GatewayError::from)
    }

    async fn update_plan_status(
        &self,
        id: &ExerciseId,
        status: PlanStatus,
    ) -> Result<(), GatewayError> {
        if self.set_plan_status(id, status).map_err(GatewayError::from)? {
            Ok(())
        } else {
            Err(GatewayError::NotFound {
                kind: "plan",
                id: id.to_string(),
            })
        }
    }

    async fn mark_plan_completed(&self, id: &ExerciseId) -> Result<(), GatewayError> {
        if self
            .complete_plan(id, Utc::now())
            .map_err(GatewayError::from)?
        {
            Ok(())
        } else {
            Err(GatewayError::NotFound {
                kind: "plan",
                id: id.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(id: &str, name: &str) -> Exercise {
        Exercise {
            id: ExerciseId::new(id),
            name: name.into(),
            description: "desc".into(),
            rationale: "why".into(),
        }
    }

    fn plan(id: &str) -> Plan {
        Plan {
            id: ExerciseId::new(id),
            plan_type: PlanType::Scheduled,
            date: NaiveDate::from_ymd_opt(2026, 8, 23).unwrap(),
            time: "07:30".into(),
            status: PlanStatus::Pending,
            exercises: vec![
                PlanExercise {
                    exercise_id: ExerciseId::new("a"),
                    repetitions: 3,
                },
                PlanExercise {
                    exercise_id: ExerciseId::new("b"),
                    repetitions: 5,
                },
            ],
            completed_at: None,
        }
    }

    #[test]
    fn exercise_crud_round_trip() {
        let db = Database::open_memory().unwrap();
        db.insert_exercise(&exercise("e1", "Neck stretch")).unwrap();
        db.insert_exercise(&exercise("e2", "Arm circles")).unwrap();

        let listed = db.list_exercises().unwrap();
        assert_eq!(listed.len(), 2);
        // Ordered by name.
        assert_eq!(listed[0].name, "Arm circles");

        let mut updated = exercise("e1", "Neck stretch (slow)");
        updated.description = "hold for two breaths".into();
        assert!(db.update_exercise(&updated).unwrap());
        let back = db.get_exercise(&ExerciseId::new("e1")).unwrap().unwrap();
        assert_eq!(back.name, "Neck stretch (slow)");

        assert!(db.delete_exercise(&ExerciseId::new("e2")).unwrap());
        assert!(!db.delete_exercise(&ExerciseId::new("e2")).unwrap());
        assert_eq!(db.list_exercises().unwrap().len(), 1);
    }

    #[test]
    fn plan_round_trip_preserves_exercise_order() {
        let db = Database::open_memory().unwrap();
        db.insert_plan(&plan("p1")).unwrap();

        let back = db.get_plan(&ExerciseId::new("p1")).unwrap().unwrap();
        assert_eq!(back.exercises.len(), 2);
        assert_eq!(back.exercises[0].exercise_id, ExerciseId::new("a"));
        assert_eq!(back.exercises[1].repetitions, 5);
        assert_eq!(back.status, PlanStatus::Pending);
        assert!(back.completed_at.is_none());
    }

    #[test]
    fn complete_plan_sets_status_and_timestamp() {
        let db = Database::open_memory().unwrap();
        db.insert_plan(&plan("p1")).unwrap();

        let at = Utc::now();
        assert!(db.complete_plan(&ExerciseId::new("p1"), at).unwrap());

        let back = db.get_plan(&ExerciseId::new("p1")).unwrap().unwrap();
        assert_eq!(back.status, PlanStatus::Completed);
        assert_eq!(back.completed_at.unwrap().timestamp(), at.timestamp());
    }

    #[tokio::test]
    async fn gateway_surface_maps_missing_rows_to_not_found() {
        let db = Database::open_memory().unwrap();
        let id = ExerciseId::new("ghost");

        let err = db.fetch_plan(&id).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { kind: "plan", .. }));
        let err = db.mark_plan_completed(&id).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn database_backs_a_full_session() {
        use crate::session::{SessionPhase, SessionRuntime};
        use crate::speech::SpeechOutput;

        let db = Database::open_memory().unwrap();
        db.insert_exercise(&exercise("a", "Neck stretch")).unwrap();
        db.insert_exercise(&exercise("b", "Arm circles")).unwrap();
        db.insert_plan(&plan("p1")).unwrap();

        let mut rt = SessionRuntime::new("p1", db, SpeechOutput::muted());
        rt.load().await.unwrap();
        rt.start().await.unwrap();
        rt.set_timer_enabled(false);
        rt.advance().await.unwrap();
        rt.advance().await.unwrap();
        assert_eq!(rt.phase(), SessionPhase::Completed);
    }
}
