use crate::models::{DayHours, OpeningPeriod, Schedule};
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::fmt;
use thiserror::Error;

/// Short weekday names, indexed from Sunday
pub const DAY_NAMES_SHORT: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];

/// Full weekday names as used by pre-formatted weekday lines
pub const DAY_NAMES_FULL: [&str; 7] = [
    "日曜日", "月曜日", "火曜日", "水曜日", "木曜日", "金曜日", "土曜日",
];

/// Shown when a shop has no schedule at all
pub const HOURS_UNKNOWN: &str = "営業時間不明";

/// Shown when a shop has a schedule but nothing opens today
pub const CLOSED_TODAY: &str = "本日定休日 / 営業時間不明";

/// Row text in the weekly table for a day without hours
pub const CLOSED_DAY: &str = "定休日、または営業時間不明";

/// Rendering of a period without a closing time
pub const ALWAYS_OPEN: &str = "24時間営業";

const MINUTES_PER_DAY: u32 = 24 * 60;
const MINUTES_PER_WEEK: u32 = 7 * MINUTES_PER_DAY;

/// Errors raised while parsing schedule data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("day {0} is outside 0-6")]
    InvalidDay(u8),

    #[error("time {0:?} is not a HHMM clock time")]
    InvalidTime(String),
}

/// Day of week for a reference instant, 0 = Sunday
#[inline]
pub fn weekday_index(at: NaiveDateTime) -> u8 {
    // num_days_from_sunday is always < 7
    at.weekday().num_days_from_sunday() as u8
}

/// What a shop looks like today
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodayHours {
    /// No schedule data at all
    Unknown,
    /// A schedule exists but nothing opens on `day`
    Closed { day: u8 },
    /// Rendered slots for `day`, in schedule order
    Open { day: u8, slots: Vec<String> },
}

impl fmt::Display for TodayHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodayHours::Unknown => f.write_str(HOURS_UNKNOWN),
            TodayHours::Closed { day } => {
                write!(f, "今日 ({}): {}", DAY_NAMES_SHORT[usize::from(*day)], CLOSED_TODAY)
            }
            TodayHours::Open { day, slots } => {
                write!(f, "今日 ({}): {}", DAY_NAMES_SHORT[usize::from(*day)], slots.join(" / "))
            }
        }
    }
}

/// Render a single period as `HH:MM〜HH:MM`, or `HH:MM〜翌<曜>HH:MM`
/// when it closes on another day
pub fn format_period(period: &OpeningPeriod) -> String {
    let open = period.open.clock();
    match period.close {
        None => format!("{}〜 ({})", open, ALWAYS_OPEN),
        Some(close) if close.day() != period.open.day() => format!(
            "{}〜翌{}{}",
            open,
            DAY_NAMES_SHORT[usize::from(close.day())],
            close.clock()
        ),
        Some(close) => format!("{}〜{}", open, close.clock()),
    }
}

/// Rendered slots for every period that opens on `day`
///
/// A period that started the previous evening and runs past midnight
/// belongs to the day it opened, not to `day`.
pub fn slots_for_day(periods: &[OpeningPeriod], day: u8) -> Vec<String> {
    periods
        .iter()
        .filter(|period| period.open.day() == day)
        .map(format_period)
        .collect()
}

/// Resolve today's hours from structured periods
pub fn today_hours(periods: &[OpeningPeriod], at: NaiveDateTime) -> TodayHours {
    if periods.is_empty() {
        return TodayHours::Unknown;
    }

    let day = weekday_index(at);
    let slots = slots_for_day(periods, day);

    if slots.is_empty() {
        TodayHours::Closed { day }
    } else {
        TodayHours::Open { day, slots }
    }
}

/// Human-readable "today's hours" for a weekly period table
pub fn format_today_hours(periods: &[OpeningPeriod], at: NaiveDateTime) -> String {
    today_hours(periods, at).to_string()
}

/// Find the pre-formatted line for `day` and return the hours part
///
/// Lines look like `"月曜日: 11:00-22:00"`.
pub fn weekday_line(lines: &[String], day: u8) -> Option<&str> {
    let name = DAY_NAMES_FULL[usize::from(day)];

    lines.iter().find_map(|line| {
        let rest = line.strip_prefix(name)?;
        let hours = match rest.split_once(": ") {
            Some((_, hours)) => hours,
            None => rest.trim_start_matches([':', '：', ' ']),
        };
        Some(hours.trim())
    })
}

/// Resolve today's hours from pre-formatted weekday lines
pub fn today_weekday_text(lines: &[String], at: NaiveDateTime) -> TodayHours {
    if lines.is_empty() {
        return TodayHours::Unknown;
    }

    let day = weekday_index(at);
    match weekday_line(lines, day) {
        Some(hours) if !hours.is_empty() => TodayHours::Open {
            day,
            slots: vec![hours.to_string()],
        },
        _ => TodayHours::Closed { day },
    }
}

pub fn format_today_weekday_text(lines: &[String], at: NaiveDateTime) -> String {
    today_weekday_text(lines, at).to_string()
}

/// Today's hours for whichever schedule a shop carries
pub fn format_today(schedule: Schedule<'_>, at: NaiveDateTime) -> String {
    match schedule {
        Schedule::Periods(periods) => format_today_hours(periods, at),
        Schedule::WeekdayText(lines) => format_today_weekday_text(lines, at),
        Schedule::Unknown => TodayHours::Unknown.to_string(),
    }
}

/// Seven rows, Sunday first, for a shop's weekly hours table
pub fn week_hours(schedule: Schedule<'_>, at: NaiveDateTime) -> Vec<DayHours> {
    let today = weekday_index(at);

    (0..7u8)
        .map(|day| {
            let hours = match schedule {
                Schedule::Unknown => HOURS_UNKNOWN.to_string(),
                Schedule::Periods(periods) => {
                    let slots = slots_for_day(periods, day);
                    if slots.is_empty() {
                        CLOSED_DAY.to_string()
                    } else {
                        slots.join(" / ")
                    }
                }
                Schedule::WeekdayText(lines) => match weekday_line(lines, day) {
                    Some(hours) if !hours.is_empty() => hours.to_string(),
                    _ => CLOSED_DAY.to_string(),
                },
            };

            DayHours {
                day: DAY_NAMES_FULL[usize::from(day)].to_string(),
                hours,
                is_today: day == today,
            }
        })
        .collect()
}

/// Whether any period covers the reference instant
///
/// Returns `None` when there are no structured periods to judge from.
/// Both ends of a period are inclusive.
pub fn is_open_at(periods: &[OpeningPeriod], at: NaiveDateTime) -> Option<bool> {
    if periods.is_empty() {
        return None;
    }

    let now = u32::from(weekday_index(at)) * MINUTES_PER_DAY + at.hour() * 60 + at.minute();
    Some(periods.iter().any(|period| period_contains(period, now)))
}

fn period_contains(period: &OpeningPeriod, now: u32) -> bool {
    let Some(close) = period.close else {
        return true;
    };

    let open = period.open.minute_of_week();
    let mut close = close.minute_of_week();
    // Saturday night into Sunday morning
    if close < open {
        close += MINUTES_PER_WEEK;
    }

    (open..=close).contains(&now) || (open..=close).contains(&(now + MINUTES_PER_WEEK))
}
