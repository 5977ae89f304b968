//! Lays a day's hours out as back-to-back time ranges for upload.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{ReportItem, UploadItem};
use crate::types::{Hours, ProjectId};

pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchBreak {
    /// Hours after the day start.
    pub start_offset: Hours,
    pub duration: Hours,
}

impl Default for LunchBreak {
    fn default() -> Self {
        Self {
            start_offset: 4,
            duration: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineSettings {
    pub day_start_hour: Hours,
    pub lunch: Option<LunchBreak>,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            day_start_hour: 8,
            lunch: Some(LunchBreak::default()),
        }
    }
}

/// A block of `duration` hours for one project, `at` hours after day start.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    project_id: ProjectId,
    at: Hours,
    duration: Hours,
}

fn layout(items: &[ReportItem], lunch: Option<LunchBreak>) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut at = 0;
    for item in items {
        if item.hours <= 0 {
            continue;
        }
        let mut remaining = item.hours;

        if let Some(lunch) = lunch {
            let end = lunch.start_offset + lunch.duration;
            if at + remaining > lunch.start_offset && at < end {
                let before = lunch.start_offset - at;
                if before > 0 {
                    out.push(Segment {
                        project_id: item.project_id.clone(),
                        at,
                        duration: before,
                    });
                    remaining -= before;
                }
                at = end;
            }
        }

        if remaining > 0 {
            out.push(Segment {
                project_id: item.project_id.clone(),
                at,
                duration: remaining,
            });
        }
        at += remaining;
    }
    out
}

fn stamp(date: NaiveDate, hour: Hours) -> String {
    let midnight: NaiveDateTime = date.and_time(chrono::NaiveTime::MIN);
    (midnight + Duration::hours(hour)).format(ISO_FORMAT).to_string()
}

/// Upload payloads for `items` on `date`, starting at the configured hour and
/// split around the lunch break. Zero-hour items produce nothing.
pub fn build_daily_timeline(
    date: NaiveDate,
    items: &[ReportItem],
    settings: &TimelineSettings,
) -> Vec<UploadItem> {
    layout(items, settings.lunch)
        .into_iter()
        .map(|segment| {
            let start = settings.day_start_hour + segment.at;
            UploadItem {
                project_id: segment.project_id,
                start_time: stamp(date, start),
                end_time: stamp(date, start + segment.duration),
                comment: String::new(),
                time_code: "normal".to_string(),
            }
        })
        .collect()
}
