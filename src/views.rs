//! Derived views computed from in-memory collections.
//!
//! Nothing here touches storage. Callers recompute on every render or tick.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use std::collections::BTreeSet;

use crate::models::{Dated, Record, Todo};

/// Default lifetime of a time-boxed todo
pub const TODO_TIME_LIMIT_HOURS: i64 = 72;

/// Collapsed previews show at most this many characters of the first line
pub const PREVIEW_MAX_CHARS: usize = 50;

pub fn default_todo_limit() -> TimeDelta {
    TimeDelta::hours(TODO_TIME_LIMIT_HOURS)
}

/// Number of consecutive days, ending today or yesterday, that have at least
/// one record. Zero when neither today nor yesterday has one.
pub fn streak<T: Dated>(records: &[T], today: NaiveDate) -> u32 {
    let dates: BTreeSet<NaiveDate> = records.iter().map(Dated::date).collect();
    if dates.is_empty() {
        return 0;
    }

    let yesterday = today - TimeDelta::days(1);
    if !dates.contains(&today) && !dates.contains(&yesterday) {
        return 0;
    }

    // walk back from the latest recorded day
    let sorted: Vec<NaiveDate> = dates.into_iter().collect();
    let mut streak = 1;
    for pair in sorted.windows(2).rev() {
        if pair[1] - pair[0] == TimeDelta::days(1) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup<'a, T> {
    pub date: NaiveDate,
    pub records: Vec<&'a T>,
}

/// Bucket records by their date. Buckets appear in first-seen order and keep
/// record insertion order inside each bucket.
pub fn group_by_date<T: Dated>(records: &[T]) -> Vec<DateGroup<'_, T>> {
    let mut groups: Vec<DateGroup<'_, T>> = Vec::new();
    for record in records {
        let date = record.date();
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.records.push(record),
            None => groups.push(DateGroup {
                date,
                records: vec![record],
            }),
        }
    }
    groups
}

/// Newest day first (achievement and failure listings)
pub fn group_by_date_desc<T: Dated>(records: &[T]) -> Vec<DateGroup<'_, T>> {
    let mut groups = group_by_date(records);
    groups.sort_by(|a, b| b.date.cmp(&a.date));
    groups
}

/// Oldest day first (plan listings)
pub fn group_by_date_asc<T: Dated>(records: &[T]) -> Vec<DateGroup<'_, T>> {
    let mut groups = group_by_date(records);
    groups.sort_by_key(|g| g.date);
    groups
}

/// Records ordered by creation time, newest first
pub fn newest_first<T: Record>(records: &[T]) -> Vec<&T> {
    let mut sorted: Vec<&T> = records.iter().collect();
    sorted.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    sorted
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanDay {
    Overdue,
    Today,
    Upcoming,
}

pub fn plan_day(date: NaiveDate, today: NaiveDate) -> PlanDay {
    if date < today {
        PlanDay::Overdue
    } else if date == today {
        PlanDay::Today
    } else {
        PlanDay::Upcoming
    }
}

/// True when any plan is filed under a day that has already passed
pub fn has_overdue_plans<T: Dated>(plans: &[T], today: NaiveDate) -> bool {
    plans.iter().any(|p| p.date() < today)
}

/// Time left before a todo expires, never negative. A deadline past the end
/// of the calendar counts as never expiring.
pub fn todo_remaining(created_at: DateTime<Utc>, now: DateTime<Utc>, limit: TimeDelta) -> TimeDelta {
    match created_at.checked_add_signed(limit) {
        Some(deadline) => (deadline - now).max(TimeDelta::zero()),
        None => TimeDelta::MAX,
    }
}

/// A todo is active while it is open and younger than the limit
pub fn is_todo_active(todo: &Todo, now: DateTime<Utc>, limit: TimeDelta) -> bool {
    !todo.completed && now - todo.created_at <= limit
}

pub fn active_todos(todos: &[Todo], now: DateTime<Utc>, limit: TimeDelta) -> Vec<&Todo> {
    todos.iter().filter(|t| is_todo_active(t, now, limit)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// 12 hours or less left
    Critical,
    /// 24 hours or less left
    Warning,
    Normal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TodoCountdown<'a> {
    pub todo: &'a Todo,
    pub remaining: TimeDelta,
}

impl TodoCountdown<'_> {
    pub fn is_expired(&self) -> bool {
        self.remaining <= TimeDelta::zero()
    }

    pub fn urgency(&self) -> Urgency {
        let hours = self.remaining.num_seconds() as f64 / 3600.0;
        if hours <= 12.0 {
            Urgency::Critical
        } else if hours <= 24.0 {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }

    /// Fraction of the time box still left, from 1.0 down to 0.0
    pub fn progress(&self, limit: TimeDelta) -> f64 {
        if limit <= TimeDelta::zero() {
            return 0.0;
        }
        let left = self.remaining.num_milliseconds() as f64 / limit.num_milliseconds() as f64;
        left.clamp(0.0, 1.0)
    }
}

pub fn todo_countdowns(todos: &[Todo], now: DateTime<Utc>, limit: TimeDelta) -> Vec<TodoCountdown<'_>> {
    todos
        .iter()
        .map(|todo| TodoCountdown {
            todo,
            remaining: todo_remaining(todo.created_at, now, limit),
        })
        .collect()
}

/// `71h 59m 03s`, or `expired` once nothing is left
pub fn format_remaining(remaining: TimeDelta) -> String {
    if remaining <= TimeDelta::zero() {
        return "expired".to_string();
    }
    let total = remaining.num_seconds();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// First line of the content, cut to `max_chars` characters with `...`
/// appended when it was longer. Display only.
pub fn preview(content: &str, max_chars: usize) -> String {
    let first_line = content.split('\n').next().unwrap_or_default();
    if first_line.chars().count() <= max_chars {
        return first_line.to_string();
    }
    let mut cut: String = first_line.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Achievement, Idea, Plan};
    use chrono::TimeZone;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap() + TimeDelta::days(offset)
    }

    fn achievement(date: NaiveDate, content: &str) -> Achievement {
        Achievement::new(
            date,
            content.to_string(),
            Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap(),
        )
    }

    fn achievements_on(offsets: &[i64]) -> Vec<Achievement> {
        offsets.iter().map(|o| achievement(day(*o), "done")).collect()
    }

    #[test]
    fn streak_counts_consecutive_days_ending_today() {
        let today = day(0);
        assert_eq!(streak(&achievements_on(&[0, -1, -2]), today), 3);
        assert_eq!(streak(&achievements_on(&[-2, -3]), today), 0);
        assert_eq!(streak(&achievements_on(&[0, -1, -3]), today), 2);
    }

    #[test]
    fn streak_accepts_yesterday_as_the_anchor() {
        let today = day(0);
        assert_eq!(streak(&achievements_on(&[-1, -2]), today), 2);
        assert_eq!(streak(&achievements_on(&[-1]), today), 1);
    }

    #[test]
    fn streak_ignores_duplicates_and_empty_input() {
        let today = day(0);
        assert_eq!(streak::<Achievement>(&[], today), 0);
        assert_eq!(streak(&achievements_on(&[0, 0, -1, -1, -1]), today), 2);
    }

    #[test]
    fn streak_walks_from_the_latest_recorded_day() {
        // a record dated in the future becomes the starting point
        let today = day(0);
        assert_eq!(streak(&achievements_on(&[0, 2]), today), 1);
    }

    #[test]
    fn grouping_keeps_insertion_order_within_buckets() {
        let records = vec![
            achievement(day(-1), "a"),
            achievement(day(0), "b"),
            achievement(day(-1), "c"),
        ];

        let groups = group_by_date(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, day(-1));
        let contents: Vec<&str> = groups[0].records.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "c"]);

        let desc: Vec<NaiveDate> = group_by_date_desc(&records).iter().map(|g| g.date).collect();
        assert_eq!(desc, vec![day(0), day(-1)]);
        let asc: Vec<NaiveDate> = group_by_date_asc(&records).iter().map(|g| g.date).collect();
        assert_eq!(asc, vec![day(-1), day(0)]);
    }

    #[test]
    fn plan_days_classify_against_today() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let plans = vec![Plan::new(day(1), "later".into(), created)];
        assert!(!has_overdue_plans(&plans, day(0)));
        assert!(has_overdue_plans(&plans, day(2)));
        assert_eq!(plan_day(day(-1), day(0)), PlanDay::Overdue);
        assert_eq!(plan_day(day(0), day(0)), PlanDay::Today);
        assert_eq!(plan_day(day(3), day(0)), PlanDay::Upcoming);
    }

    #[test]
    fn todo_countdown_around_the_deadline() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let todo = Todo::new("file taxes".to_string(), created);
        let limit = default_todo_limit();

        let almost = created + TimeDelta::hours(71) + TimeDelta::minutes(59);
        assert_eq!(todo_remaining(created, almost, limit), TimeDelta::minutes(1));
        assert!(is_todo_active(&todo, almost, limit));

        let past = created + TimeDelta::hours(72) + TimeDelta::seconds(1);
        assert_eq!(todo_remaining(created, past, limit), TimeDelta::zero());
        assert!(!is_todo_active(&todo, past, limit));

        let todos = vec![todo];
        let countdowns = todo_countdowns(&todos, past, limit);
        assert!(countdowns[0].is_expired());
        assert!(active_todos(&todos, past, limit).is_empty());
    }

    #[test]
    fn exact_deadline_is_active_with_nothing_left() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let todos = vec![Todo::new("renew passport".to_string(), created)];
        let limit = default_todo_limit();
        let deadline = created + limit;

        // still listed as active at the deadline itself...
        assert!(is_todo_active(&todos[0], deadline, limit));
        assert_eq!(active_todos(&todos, deadline, limit).len(), 1);

        // ...but the countdown has already run out
        let countdown = &todo_countdowns(&todos, deadline, limit)[0];
        assert_eq!(countdown.remaining, TimeDelta::zero());
        assert!(countdown.is_expired());
        assert_eq!(format_remaining(countdown.remaining), "expired");

        let one_ms_later = deadline + TimeDelta::milliseconds(1);
        assert!(!is_todo_active(&todos[0], one_ms_later, limit));
    }

    #[test]
    fn huge_limits_never_overflow() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let todos = vec![Todo::new("someday".to_string(), created)];
        let limit = TimeDelta::MAX;

        let countdown = &todo_countdowns(&todos, created, limit)[0];
        assert_eq!(countdown.remaining, TimeDelta::MAX);
        assert!(!countdown.is_expired());
        assert!(is_todo_active(&todos[0], created, limit));
    }

    #[test]
    fn completed_todos_are_never_active() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut todo = Todo::new("done".to_string(), created);
        todo.completed = true;
        assert!(!is_todo_active(&todo, created, default_todo_limit()));
    }

    #[test]
    fn urgency_and_progress_follow_remaining_time() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let todos = vec![Todo::new("x".to_string(), created)];
        let limit = default_todo_limit();

        let fresh = &todo_countdowns(&todos, created, limit)[0];
        assert_eq!(fresh.urgency(), Urgency::Normal);
        assert_eq!(fresh.progress(limit), 1.0);

        let day_left = &todo_countdowns(&todos, created + TimeDelta::hours(50), limit)[0];
        assert_eq!(day_left.urgency(), Urgency::Warning);

        let hours_left = &todo_countdowns(&todos, created + TimeDelta::hours(66), limit)[0];
        assert_eq!(hours_left.urgency(), Urgency::Critical);
        assert_eq!(hours_left.progress(limit), 6.0 / 72.0);
    }

    #[test]
    fn remaining_time_formats_for_display() {
        assert_eq!(format_remaining(TimeDelta::seconds(71 * 3600 + 59 * 60 + 3)), "71h 59m 03s");
        assert_eq!(format_remaining(TimeDelta::zero()), "expired");
    }

    #[test]
    fn preview_uses_first_line_and_truncates() {
        assert_eq!(preview("short\nsecond line", PREVIEW_MAX_CHARS), "short");

        let long = "x".repeat(60);
        let cut = preview(&long, PREVIEW_MAX_CHARS);
        assert_eq!(cut, format!("{}...", "x".repeat(50)));

        let exact = "y".repeat(50);
        assert_eq!(preview(&exact, PREVIEW_MAX_CHARS), exact);

        // counts characters, not bytes
        let wide = "灵".repeat(51);
        assert_eq!(preview(&wide, PREVIEW_MAX_CHARS), format!("{}...", "灵".repeat(50)));
    }

    #[test]
    fn newest_first_orders_by_creation_time() {
        let early = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let ideas = vec![
            Idea::new("old".to_string(), early),
            Idea::new("new".to_string(), early + TimeDelta::hours(2)),
        ];
        let sorted: Vec<&str> = newest_first(&ideas).iter().map(|i| i.content.as_str()).collect();
        assert_eq!(sorted, vec!["new", "old"]);
    }
}
