use clap::Subcommand;
use repwell_core::storage::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Print activity statistics
    Show,
    /// Print statistics as JSON
    Json,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let plans = db.list_plans()?;
    let stats = repwell_core::insights::stats(&plans);

    match action {
        StatsAction::Show => {
            println!("sessions completed: {}", stats.total_sessions);
            println!("repetitions done:   {}", stats.total_repetitions);
            println!("current streak:     {} day(s)", stats.current_streak);
            println!("last 7 days:");
            for day in &stats.daily_activity {
                let bar = "#".repeat(day.count as usize);
                println!("  {} {}  {}", day.day_label, day.date, bar);
            }
        }
        StatsAction::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
