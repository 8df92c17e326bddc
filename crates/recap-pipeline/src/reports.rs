//! Human-readable coverage reports.
//!
//! Both reports are pure projections of the assignment map: a month-by-month
//! calendar grid with per-day counts, and a CSV with one row per day of the
//! year plus one row per media item.

use std::path::Path;

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::info;

use crate::assign::AssignmentMap;
use crate::config::RecapConfig;
use crate::error::PipelineResult;

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// Weeks of a month as rows of day numbers, Monday-first, 0 for padding.
fn month_weeks(year: i32, month: u32) -> Vec<[u32; 7]> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month");
    let lead = first.weekday().num_days_from_monday() as usize;
    let days = days_in_month(year, month);

    let mut weeks = Vec::new();
    let mut week = [0u32; 7];
    let mut col = lead;
    for day in 1..=days {
        week[col] = day;
        col += 1;
        if col == 7 {
            weeks.push(week);
            week = [0; 7];
            col = 0;
        }
    }
    if col > 0 {
        weeks.push(week);
    }
    weeks
}

/// Plain-text calendar grid: one cell per day showing the media count,
/// `9+` when ten or more, `.` when empty.
pub fn visual_report(assignments: &AssignmentMap, config: &RecapConfig) -> String {
    let year = config.target_year;
    let mut lines = Vec::new();

    lines.push("=".repeat(60));
    lines.push(format!("YEAR {} MEDIA COVERAGE REPORT", year));
    lines.push("=".repeat(60));
    lines.push(String::new());

    let filled_days = assignments.len();
    let total_media: usize = assignments.values().map(|v| v.len()).sum();
    lines.push(format!("Days with media: {} / 365", filled_days));
    lines.push(format!("Total media files: {}", total_media));
    lines.push(format!(
        "Average media per day: {:.1}",
        total_media as f64 / filled_days.max(1) as f64
    ));
    lines.push(String::new());

    for month in 1..=12 {
        lines.push(format!("\n{} {}", config.month_name(month), year));
        lines.push("-".repeat(30));
        lines.push("Mo Tu We Th Fr Sa Su".to_string());

        for week in month_weeks(year, month) {
            let cells: Vec<String> = week
                .iter()
                .map(|&day| {
                    if day == 0 {
                        return "  ".to_string();
                    }
                    let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid day");
                    match assignments.get(&date) {
                        Some(media) if media.len() > 9 => "9+".to_string(),
                        Some(media) => format!("{:>2}", media.len()),
                        None => " .".to_string(),
                    }
                })
                .collect();
            lines.push(cells.join(" "));
        }

        let month_days: Vec<_> = assignments.keys().filter(|d| d.month() == month).collect();
        let month_media: usize = month_days
            .iter()
            .map(|d| assignments[*d].len())
            .sum();
        lines.push(format!(
            "  {} days, {} media files",
            month_days.len(),
            month_media
        ));
    }

    lines.push(format!("\n{}", "=".repeat(60)));
    lines.push("Legend: . = no media, number = count of media files".to_string());
    lines.push("=".repeat(60));

    lines.join("\n")
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV with one row per day of the year (empty days included) and one row
/// per media item on filled days.
pub fn csv_report(assignments: &AssignmentMap, config: &RecapConfig) -> String {
    let year = config.target_year;
    let mut rows = vec!["Date,Day_of_Week,Media_Count,Filename,Type,Date_Source".to_string()];

    let mut date = NaiveDate::from_ymd_opt(year, 1, 1).expect("valid year");
    while date.year() == year {
        let day_name = weekday_name(date.weekday());
        match assignments.get(&date) {
            Some(media) => {
                for record in media {
                    rows.push(format!(
                        "{},{},{},{},{},{}",
                        date,
                        day_name,
                        media.len(),
                        csv_field(&record.filename),
                        record.kind,
                        record.source
                    ));
                }
            }
            None => rows.push(format!("{},{},0,,,", date, day_name)),
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    rows.join("\n") + "\n"
}

/// Write both reports next to the assignment store.
pub fn write_reports(assignments: &AssignmentMap, config: &RecapConfig) -> PipelineResult<()> {
    let visual = visual_report(assignments, config);
    std::fs::write(config.visual_report_path(), visual)?;
    info!("Saved visual report to {}", config.visual_report_path().display());

    let csv = csv_report(assignments, config);
    std::fs::write(config.csv_report_path(), csv)?;
    info!("Saved detailed report to {}", config.csv_report_path().display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_models::{DateSource, MediaKind, MediaRecord};
    use std::path::PathBuf;

    fn record(name: &str, date: NaiveDate) -> MediaRecord {
        MediaRecord {
            filepath: PathBuf::from(format!("/m/{}", name)),
            filename: name.to_string(),
            kind: MediaKind::Image,
            date: date.and_hms_opt(10, 0, 0).unwrap(),
            source: DateSource::Filename,
        }
    }

    fn sample_assignments() -> AssignmentMap {
        let mut map = AssignmentMap::new();
        let jan2 = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        map.insert(jan2, vec![record("a.jpg", jan2), record("b.jpg", jan2)]);

        let busy = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        map.insert(busy, (0..12).map(|i| record(&format!("f{}.jpg", i), busy)).collect());
        map
    }

    #[test]
    fn test_month_weeks_layout() {
        // January 2025 starts on a Wednesday
        let weeks = month_weeks(2025, 1);
        assert_eq!(weeks[0], [0, 0, 1, 2, 3, 4, 5]);
        assert_eq!(weeks.last().unwrap()[4], 31);
        let total: u32 = weeks.iter().flatten().sum();
        assert_eq!(total, (1..=31).sum::<u32>());
    }

    #[test]
    fn test_visual_report_counts_and_cap() {
        let config = RecapConfig::default();
        let report = visual_report(&sample_assignments(), &config);

        assert!(report.contains("Days with media: 2 / 365"));
        assert!(report.contains("Total media files: 14"));
        assert!(report.contains("9+")); // capped cell for the 12-item day
        assert!(report.contains("January 2025"));
        assert!(report.contains(" ."));
    }

    #[test]
    fn test_csv_report_shape() {
        let config = RecapConfig::default();
        let csv = csv_report(&sample_assignments(), &config);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "Date,Day_of_Week,Media_Count,Filename,Type,Date_Source");
        // 365 days in 2025; filled days contribute extra rows per item
        let data_rows = lines.len() - 1;
        assert_eq!(data_rows, 365 - 2 + 2 + 12);
        assert!(lines.iter().any(|l| l.starts_with("2025-01-01,Wednesday,0,")));
        assert!(lines.iter().any(|l| l.starts_with("2025-01-02,Thursday,2,a.jpg,image,filename")));
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain.jpg"), "plain.jpg");
        assert_eq!(csv_field("a,b.jpg"), "\"a,b.jpg\"");
        assert_eq!(csv_field("say \"hi\".jpg"), "\"say \"\"hi\"\".jpg\"");
    }
}
