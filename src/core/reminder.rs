//! Reminder time encoding.
//!
//! A reminder is a single instant. When the user picks a date without a time
//! the instant is pinned to 09:00:01 local time; an explicitly chosen time
//! always has zero seconds. The encoding is lossy: a reminder genuinely set
//! for 09:00:01 reads back as "date only".

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};

use super::repeat::Repeat;

/// Local wall-clock time marking a date-only reminder.
pub const DATE_ONLY_TIME: (u32, u32, u32) = (9, 0, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Overdue,
    /// Due within the next hour.
    Urgent,
    Normal,
}

fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    first_valid(naive, |wall| {
        Local
            .from_local_datetime(wall)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

/// Resolve a wall time, stepping forward an hour at a time past a DST gap.
fn first_valid<F>(naive: NaiveDateTime, lookup: F) -> DateTime<Utc>
where
    F: Fn(&NaiveDateTime) -> Option<DateTime<Utc>>,
{
    (0..=24)
        .find_map(|h| lookup(&(naive + Duration::hours(h))))
        .unwrap_or_else(|| naive.and_utc())
}

/// Local midnight starting `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(date.and_time(NaiveTime::MIN))
}

/// Reminder for a date with no explicit time.
pub fn date_only(date: NaiveDate) -> DateTime<Utc> {
    let (h, m, s) = DATE_ONLY_TIME;
    let time = NaiveTime::from_hms_opt(h, m, s).unwrap_or(NaiveTime::MIN);
    local_to_utc(date.and_time(time))
}

/// Reminder for an explicit local date and time. Seconds are zeroed.
pub fn at_time(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
    local_to_utc(date.and_time(time))
}

/// Whether the reminder carries a user-chosen clock time.
pub fn has_explicit_time(reminder: &DateTime<Utc>) -> bool {
    has_explicit_time_in(reminder, &Local)
}

pub fn has_explicit_time_in<Tz: TimeZone>(reminder: &DateTime<Utc>, tz: &Tz) -> bool {
    let local = reminder.with_timezone(tz);
    (local.hour(), local.minute(), local.second()) != DATE_ONLY_TIME
}

pub fn urgency(reminder: &DateTime<Utc>, now: &DateTime<Utc>) -> Urgency {
    if reminder < now {
        Urgency::Overdue
    } else if *reminder <= *now + Duration::hours(1) {
        Urgency::Urgent
    } else {
        Urgency::Normal
    }
}

/// Human label: "Today", "Tomorrow" or "Mon, Oct 19", with the clock time
/// appended only when one was explicitly chosen.
pub fn format_reminder(reminder: &DateTime<Utc>, now: &DateTime<Local>) -> String {
    let local = reminder.with_timezone(&Local);
    let today = now.date_naive();
    let date = local.date_naive();

    let day = if date == today {
        "Today".to_string()
    } else if Some(date) == today.succ_opt() {
        "Tomorrow".to_string()
    } else if date.year() == today.year() {
        local.format("%a, %b %-d").to_string()
    } else {
        local.format("%a, %b %-d %Y").to_string()
    };

    if has_explicit_time(reminder) {
        format!("{} {}", day, local.format("%H:%M"))
    } else {
        day
    }
}

/// Reminder label followed by the recurrence label, if any.
pub fn format_schedule(reminder: &DateTime<Utc>, repeat: Repeat, now: &DateTime<Local>) -> String {
    let base = format_reminder(reminder, now);
    if repeat.is_none() {
        base
    } else {
        format!("{} {}", base, repeat.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn skipped_wall_time_moves_past_the_gap() {
        // UTC-3 before 00:00 on Sep 6, UTC-2 from 01:00; midnight never happens.
        let gap_day = NaiveDate::from_ymd_opt(2026, 9, 6).unwrap();
        let lookup = |wall: &NaiveDateTime| {
            let offset = if wall.date() < gap_day {
                3
            } else if wall.hour() < 1 && wall.date() == gap_day {
                return None;
            } else {
                2
            };
            Some(wall.and_utc() + Duration::hours(offset))
        };

        let midnight = gap_day.and_time(NaiveTime::MIN);
        let resolved = first_valid(midnight, lookup);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2026, 9, 6, 3, 0, 0).unwrap());
        assert_ne!(resolved, midnight.and_utc());

        let noon = gap_day.and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(first_valid(noon, lookup), Utc.with_ymd_and_hms(2026, 9, 6, 14, 0, 0).unwrap());
    }

    #[test]
    fn sentinel_means_date_only() {
        assert!(!has_explicit_time(&local(2026, 3, 2, 9, 0, 1)));
        assert!(has_explicit_time(&local(2026, 3, 2, 9, 0, 0)));
        assert!(has_explicit_time(&local(2026, 3, 2, 9, 1, 1)));
        assert!(has_explicit_time(&local(2026, 3, 2, 17, 30, 0)));
    }

    #[test]
    fn constructors_follow_the_encoding() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert!(!has_explicit_time(&date_only(date)));
        let at = at_time(date, NaiveTime::from_hms_opt(14, 15, 42).unwrap());
        assert!(has_explicit_time(&at));
        assert_eq!(at.with_timezone(&Local).second(), 0);
        assert_eq!(at.with_timezone(&Local).minute(), 15);
    }

    #[test]
    fn sentinel_in_explicit_zone() {
        let reminder = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 1).unwrap();
        assert!(!has_explicit_time_in(&reminder, &Utc));
        let reminder = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        assert!(has_explicit_time_in(&reminder, &Utc));
    }

    #[test]
    fn urgency_bands() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        assert_eq!(urgency(&(now - Duration::minutes(1)), &now), Urgency::Overdue);
        assert_eq!(urgency(&now, &now), Urgency::Urgent);
        assert_eq!(urgency(&(now + Duration::hours(1)), &now), Urgency::Urgent);
        assert_eq!(
            urgency(&(now + Duration::hours(1) + Duration::seconds(1)), &now),
            Urgency::Normal
        );
    }

    #[test]
    fn labels() {
        let now = Local.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).earliest().unwrap();
        assert_eq!(format_reminder(&local(2026, 3, 2, 9, 0, 1), &now), "Today");
        assert_eq!(format_reminder(&local(2026, 3, 3, 18, 45, 0), &now), "Tomorrow 18:45");
        assert_eq!(format_reminder(&local(2026, 3, 5, 9, 0, 1), &now), "Thu, Mar 5");
        assert_eq!(
            format_schedule(&local(2026, 3, 2, 9, 0, 1), Repeat::Daily, &now),
            "Today • Daily"
        );
    }
}
