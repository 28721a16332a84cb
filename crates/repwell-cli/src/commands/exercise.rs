use clap::Subcommand;
use repwell_core::storage::Database;
use repwell_core::{Exercise, ExerciseId};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum ExerciseAction {
    /// Add an exercise to the catalog
    Add {
        /// Exercise name
        name: String,
        /// How to perform it
        #[arg(long, default_value = "")]
        description: String,
        /// Why it is prescribed
        #[arg(long, default_value = "")]
        rationale: String,
    },
    /// List the catalog
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one exercise
    Show {
        /// Exercise id
        id: String,
    },
    /// Edit an exercise
    Edit {
        /// Exercise id
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        rationale: Option<String>,
    },
    /// Remove an exercise
    Rm {
        /// Exercise id
        id: String,
    },
}

pub fn run(action: ExerciseAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        ExerciseAction::Add {
            name,
            description,
            rationale,
        } => {
            let exercise = Exercise {
                id: ExerciseId::new(Uuid::new_v4().to_string()),
                name,
                description,
                rationale,
            };
            db.insert_exercise(&exercise)?;
            println!("exercise created: {}", exercise.id);
        }
        ExerciseAction::List { json } => {
            let exercises = db.list_exercises()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&exercises)?);
            } else {
                for ex in &exercises {
                    println!("{}  {}", ex.id, ex.name);
                }
            }
        }
        ExerciseAction::Show { id } => {
            let id = ExerciseId::new(id);
            match db.get_exercise(&id)? {
                Some(ex) => {
                    println!("{}", ex.name);
                    if !ex.description.is_empty() {
                        println!("  {}", ex.description);
                    }
                    if !ex.rationale.is_empty() {
                        println!("  why: {}", ex.rationale);
                    }
                }
                None => {
                    eprintln!("unknown exercise: {id}");
                    std::process::exit(1);
                }
            }
        }
        ExerciseAction::Edit {
            id,
            name,
            description,
            rationale,
        } => {
            let id = ExerciseId::new(id);
            let Some(mut ex) = db.get_exercise(&id)? else {
                eprintln!("unknown exercise: {id}");
                std::process::exit(1);
            };
            if let Some(name) = name {
                ex.name = name;
            }
            if let Some(description) = description {
                ex.description = description;
            }
            if let Some(rationale) = rationale {
                ex.rationale = rationale;
            }
            db.update_exercise(&ex)?;
            println!("ok");
        }
        ExerciseAction::Rm { id } => {
            if db.delete_exercise(&ExerciseId::new(id))? {
                println!("ok");
            } else {
                eprintln!("nothing deleted");
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
