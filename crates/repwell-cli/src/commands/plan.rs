use chrono::{Local, NaiveDate};
use clap::{Subcommand, ValueEnum};
use repwell_core::storage::Database;
use repwell_core::{ExerciseId, Plan, PlanExercise, PlanStatus, PlanType};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum PlanAction {
    /// Create a plan
    Create {
        /// Exercise entries as ID:REPS, in session order
        #[arg(long = "exercise", value_parser = parse_entry, required = true)]
        exercises: Vec<(String, u32)>,
        /// Scheduled date (defaults to today, making the plan instant)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Scheduled time, HH:MM
        #[arg(long, default_value = "09:00")]
        time: String,
    },
    /// List plans
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one plan
    Show {
        /// Plan id
        id: String,
    },
    /// Set a plan's status
    Status {
        /// Plan id
        id: String,
        status: StatusArg,
    },
    /// Remove a plan
    Rm {
        /// Plan id
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    Active,
    Completed,
}

impl From<StatusArg> for PlanStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => PlanStatus::Pending,
            StatusArg::Active => PlanStatus::Active,
            StatusArg::Completed => PlanStatus::Completed,
        }
    }
}

fn parse_entry(raw: &str) -> Result<(String, u32), String> {
    let (id, reps) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected ID:REPS, got '{raw}'"))?;
    if id.trim().is_empty() {
        return Err(format!("empty exercise id in '{raw}'"));
    }
    let reps: u32 = reps
        .parse()
        .map_err(|_| format!("bad repetition count in '{raw}'"))?;
    Ok((id.trim().to_string(), reps))
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        PlanAction::Create {
            exercises,
            date,
            time,
        } => {
            let plan = Plan {
                id: ExerciseId::new(Uuid::new_v4().to_string()),
                plan_type: if date.is_some() {
                    PlanType::Scheduled
                } else {
                    PlanType::Instant
                },
                date: date.unwrap_or_else(|| Local::now().date_naive()),
                time,
                status: PlanStatus::Pending,
                exercises: exercises
                    .into_iter()
                    .map(|(id, repetitions)| PlanExercise {
                        exercise_id: ExerciseId::new(id),
                        repetitions,
                    })
                    .collect(),
                completed_at: None,
            };
            db.insert_plan(&plan)?;
            println!("plan created: {}", plan.id);
        }
        PlanAction::List { json } => {
            let plans = db.list_plans()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
            } else {
                for plan in &plans {
                    println!(
                        "{}  {} {}  {}  {} exercise(s)",
                        plan.id,
                        plan.date,
                        plan.time,
                        plan.status.as_str(),
                        plan.exercises.len(),
                    );
                }
            }
        }
        PlanAction::Show { id } => {
            let id = ExerciseId::new(id);
            match db.get_plan(&id)? {
                Some(plan) => {
                    println!("{} {}  {}", plan.date, plan.time, plan.status.as_str());
                    for (i, pe) in plan.exercises.iter().enumerate() {
                        let name = db
                            .get_exercise(&pe.exercise_id)?
                            .map(|ex| ex.name)
                            .unwrap_or_else(|| format!("<missing {}>", pe.exercise_id));
                        println!("  {}. {} x{}", i + 1, name, pe.repetitions);
                    }
                    if let Some(at) = plan.completed_at {
                        println!("completed at {}", at.to_rfc3339());
                    }
                }
                None => {
                    eprintln!("unknown plan: {id}");
                    std::process::exit(1);
                }
            }
        }
        PlanAction::Status { id, status } => {
            if db.set_plan_status(&ExerciseId::new(id), status.into())? {
                println!("ok");
            } else {
                eprintln!("unknown plan");
                std::process::exit(1);
            }
        }
        PlanAction::Rm { id } => {
            if db.delete_plan(&ExerciseId::new(id))? {
                println!("ok");
            } else {
                eprintln!("nothing deleted");
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_entry;

    #[test]
    fn parses_id_and_reps() {
        assert_eq!(parse_entry("abc:12").unwrap(), ("abc".into(), 12));
        assert_eq!(parse_entry(" 9 :3").unwrap(), ("9".into(), 3));
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(parse_entry("abc").is_err());
        assert!(parse_entry(":3").is_err());
        assert!(parse_entry("abc:lots").is_err());
    }
}
