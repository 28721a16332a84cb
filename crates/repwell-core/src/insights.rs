//! Activity statistics over completed plans.
//!
//! Pure reducer, no I/O: the caller fetches the plans and hands them in.
//! Dates are local -- a session finished at 23:30 counts for that calendar
//! day wherever the user is, and the streak is measured in local days.

use std::collections::HashSet;

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{Plan, PlanStatus};

/// Completed-session count for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub count: u32,
    /// Short weekday label, e.g. "Mon".
    pub day_label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightsStats {
    /// Completed plans.
    pub total_sessions: u32,
    /// Sum of target repetitions across completed plans.
    pub total_repetitions: u32,
    /// Consecutive local days with a completion, counting back from today
    /// (or yesterday when today is still empty).
    pub current_streak: u32,
    /// The last 7 days, oldest first.
    pub daily_activity: Vec<DailyActivity>,
}

/// Compute stats as of today.
pub fn stats(plans: &[Plan]) -> InsightsStats {
    stats_as_of(plans, Local::now().date_naive())
}

/// Compute stats with an explicit "today" (deterministic for tests).
pub fn stats_as_of(plans: &[Plan], today: NaiveDate) -> InsightsStats {
    let completed: Vec<&Plan> = plans
        .iter()
        .filter(|p| p.status == PlanStatus::Completed)
        .collect();

    let completion_dates: Vec<NaiveDate> = completed
        .iter()
        .filter_map(|p| p.completed_at)
        .map(|at| at.with_timezone(&Local).date_naive())
        .collect();

    InsightsStats {
        total_sessions: completed.len() as u32,
        total_repetitions: completed.iter().map(|p| p.total_repetitions()).sum(),
        current_streak: streak(&completion_dates, today),
        daily_activity: last_seven_days(&completion_dates, today),
    }
}

fn last_seven_days(dates: &[NaiveDate], today: NaiveDate) -> Vec<DailyActivity> {
    (0..7)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| DailyActivity {
            date,
            count: dates.iter().filter(|&&d| d == date).count() as u32,
            day_label: date.weekday().to_string(),
        })
        .collect()
}

fn streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let active: HashSet<NaiveDate> = dates.iter().copied().collect();
    if active.is_empty() {
        return 0;
    }

    let yesterday = match today.checked_sub_days(Days::new(1)) {
        Some(d) => d,
        None => return 0,
    };
    // The streak is alive only if today or yesterday has activity.
    let mut cursor = if active.contains(&today) {
        today
    } else if active.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 0;
    while active.contains(&cursor) {
        streak += 1;
        cursor = match cursor.checked_sub_days(Days::new(1)) {
            Some(d) => d,
            None => break,
        };
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExerciseId, PlanExercise, PlanType};
    use chrono::{TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A plan completed at local noon on the given day.
    fn completed_plan(date: NaiveDate, reps: u32) -> Plan {
        let noon = Local
            .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
            .unwrap()
            .with_timezone(&Utc);
        Plan {
            id: ExerciseId::new("p"),
            plan_type: PlanType::Instant,
            date,
            time: "12:00".into(),
            status: PlanStatus::Completed,
            exercises: vec![PlanExercise {
                exercise_id: ExerciseId::new("1"),
                repetitions: reps,
            }],
            completed_at: Some(noon),
        }
    }

    fn pending_plan(date: NaiveDate) -> Plan {
        Plan {
            status: PlanStatus::Pending,
            completed_at: None,
            ..completed_plan(date, 10)
        }
    }

    #[test]
    fn totals_count_only_completed_plans() {
        let today = day(2026, 8, 23);
        let plans = vec![
            completed_plan(today, 5),
            completed_plan(today, 7),
            pending_plan(today),
        ];
        let stats = stats_as_of(&plans, today);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_repetitions, 12);
    }

    #[test]
    fn streak_counts_back_from_today() {
        let today = day(2026, 8, 23);
        let plans = vec![
            completed_plan(today, 1),
            completed_plan(day(2026, 8, 22), 1),
            completed_plan(day(2026, 8, 21), 1),
            // Gap at the 20th ends the streak.
            completed_plan(day(2026, 8, 19), 1),
        ];
        assert_eq!(stats_as_of(&plans, today).current_streak, 3);
    }

    #[test]
    fn streak_survives_an_empty_today() {
        let today = day(2026, 8, 23);
        let plans = vec![
            completed_plan(day(2026, 8, 22), 1),
            completed_plan(day(2026, 8, 21), 1),
        ];
        assert_eq!(stats_as_of(&plans, today).current_streak, 2);
    }

    #[test]
    fn streak_dies_after_a_full_day_gap() {
        let today = day(2026, 8, 23);
        let plans = vec![completed_plan(day(2026, 8, 21), 1)];
        assert_eq!(stats_as_of(&plans, today).current_streak, 0);
    }

    #[test]
    fn no_completions_means_no_streak() {
        let today = day(2026, 8, 23);
        assert_eq!(stats_as_of(&[], today).current_streak, 0);
        assert_eq!(
            stats_as_of(&[pending_plan(today)], today).current_streak,
            0
        );
    }

    #[test]
    fn daily_activity_covers_the_last_seven_days() {
        let today = day(2026, 8, 23);
        let plans = vec![
            completed_plan(today, 1),
            completed_plan(today, 1),
            completed_plan(day(2026, 8, 20), 1),
            // Too old to appear.
            completed_plan(day(2026, 8, 10), 1),
        ];
        let activity = stats_as_of(&plans, today).daily_activity;
        assert_eq!(activity.len(), 7);
        assert_eq!(activity[0].date, day(2026, 8, 17));
        assert_eq!(activity[6].date, today);
        assert_eq!(activity[6].count, 2);
        assert_eq!(activity[3].count, 1);
        assert_eq!(activity[6].day_label, "Sun");
        let total: u32 = activity.iter().map(|d| d.count).sum();
        assert_eq!(total, 3);
    }
}
