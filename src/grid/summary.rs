//! Yearly heatmap: one column per week, one row per weekday.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use super::values::CellValues;
use crate::types::Hours;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayShade {
    Holiday,
    Worked,
    Empty,
    OutsideYear,
}

#[derive(Debug, Clone)]
pub struct YearSummary {
    pub year: i32,
    /// Monday-first weeks; days outside the year pad the first and last.
    pub weeks: Vec<[DayShade; 7]>,
    /// (week index, month 1-12) where each month first appears.
    pub month_starts: Vec<(usize, u32)>,
    pub worked_days: usize,
    pub total_hours: Hours,
}

pub fn yearly_summary(
    year: i32,
    values: &CellValues,
    holidays: &HashSet<NaiveDate>,
) -> YearSummary {
    let mut weeks: Vec<[DayShade; 7]> = Vec::new();
    let mut month_starts = Vec::new();
    let mut worked_days = 0;
    let mut total_hours = 0;

    let Some(first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return YearSummary {
            year,
            weeks,
            month_starts,
            worked_days,
            total_hours,
        };
    };

    let mut week = [DayShade::OutsideYear; 7];
    for date in first.iter_days().take_while(|date| date.year() == year) {
        let weekday = date.weekday().num_days_from_monday() as usize;
        if date.day() == 1 && !month_starts.iter().any(|(_, m)| *m == date.month()) {
            month_starts.push((weeks.len(), date.month()));
        }

        let hours = values.day_total(date);
        total_hours += hours;
        week[weekday] = if holidays.contains(&date) {
            DayShade::Holiday
        } else if hours > 0 {
            worked_days += 1;
            DayShade::Worked
        } else {
            DayShade::Empty
        };

        if weekday == 6 {
            weeks.push(week);
            week = [DayShade::OutsideYear; 7];
        }
    }
    if week.iter().any(|shade| *shade != DayShade::OutsideYear) {
        weeks.push(week);
    }

    YearSummary {
        year,
        weeks,
        month_starts,
        worked_days,
        total_hours,
    }
}
