use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

use crate::model::{Assignment, AttendanceStatus};
use crate::store::Snapshot;

/// Display sentinel for an average with no graded work behind it.
pub const NOT_AVAILABLE: &str = "N/A";

/// 1-decimal rounding used for every displayed percentage:
/// `Int(10*x + 0.5) / 10`
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

pub fn format_average(avg: Option<f64>) -> String {
    match avg {
        Some(v) => format!("{:.1}", round_off_1_decimal(v)),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AverageBand {
    Excellent,
    Steady,
    Watch,
    Failing,
}

pub fn average_band(avg: Option<f64>) -> Option<AverageBand> {
    let v = round_off_1_decimal(avg?);
    Some(if v >= 90.0 {
        AverageBand::Excellent
    } else if v < 70.0 {
        AverageBand::Failing
    } else if v < 80.0 {
        AverageBand::Watch
    } else {
        AverageBand::Steady
    })
}

/// Earned over possible points, as a percentage, counting only graded
/// assignments of `class_id`. `None` when nothing is graded.
pub fn student_average_in_class(snap: &Snapshot, student_id: &str, class_id: &str) -> Option<f64> {
    let mut earned = 0.0;
    let mut possible = 0.0;
    for a in snap.assignments_in_class(class_id) {
        if let Some(g) = snap.grade(student_id, &a.id) {
            earned += g.score;
            possible += a.max_points;
        }
    }
    if possible > 0.0 {
        Some(100.0 * earned / possible)
    } else {
        None
    }
}

/// Average over the student's own class. Unknown students have no average.
pub fn student_average(snap: &Snapshot, student_id: &str) -> Option<f64> {
    let student = snap.student(student_id)?;
    student_average_in_class(snap, student_id, &student.class_id)
}

fn percent_of(value: f64, max_points: f64) -> f64 {
    if max_points > 0.0 {
        100.0 * value / max_points
    } else {
        0.0
    }
}

/// Mean score of everyone graded on the assignment, as a percentage of max points.
pub fn assignment_average_percent(snap: &Snapshot, assignment: &Assignment) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for g in snap.grades.iter().filter(|g| g.assignment_id == assignment.id) {
        sum += g.score;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(percent_of(sum / count as f64, assignment.max_points))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub assignment_id: String,
    pub date: String,
    pub value: f64,
    pub label: String,
}

fn compare_dates(a: &str, b: &str) -> Ordering {
    let pa = NaiveDate::parse_from_str(a.trim(), "%Y-%m-%d").ok();
    let pb = NaiveDate::parse_from_str(b.trim(), "%Y-%m-%d").ok();
    match (pa, pb) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ascending by date; equal dates keep insertion order. Undated entries go last.
fn sorted_by_date<'a>(assignments: impl Iterator<Item = &'a Assignment>) -> Vec<&'a Assignment> {
    let mut out: Vec<&Assignment> = assignments.collect();
    out.sort_by(|a, b| compare_dates(&a.date, &b.date));
    out
}

fn class_average_points<'a>(
    snap: &Snapshot,
    assignments: impl Iterator<Item = &'a Assignment>,
) -> Vec<SeriesPoint> {
    sorted_by_date(assignments)
        .into_iter()
        .filter_map(|a| {
            let pct = assignment_average_percent(snap, a)?;
            Some(SeriesPoint {
                assignment_id: a.id.clone(),
                date: a.date.clone(),
                value: round_off_1_decimal(pct),
                label: a.title.clone(),
            })
        })
        .collect()
}

pub fn class_series(snap: &Snapshot, class_id: &str) -> Vec<SeriesPoint> {
    class_average_points(snap, snap.assignments_in_class(class_id))
}

/// Dashboard series: every assignment across all classes.
pub fn global_series(snap: &Snapshot) -> Vec<SeriesPoint> {
    class_average_points(snap, snap.assignments.iter())
}

/// The student's own percentage on each graded assignment of their class.
pub fn student_series(snap: &Snapshot, student_id: &str) -> Vec<SeriesPoint> {
    let Some(student) = snap.student(student_id) else {
        return Vec::new();
    };
    sorted_by_date(snap.assignments_in_class(&student.class_id))
        .into_iter()
        .filter_map(|a| {
            let g = snap.grade(student_id, &a.id)?;
            Some(SeriesPoint {
                assignment_id: a.id.clone(),
                date: a.date.clone(),
                value: round_off_1_decimal(percent_of(g.score, a.max_points)),
                label: a.title.clone(),
            })
        })
        .collect()
}

/// Percentage-point change from the first to the last point.
pub fn series_trend(points: &[SeriesPoint]) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    let diff = last.value - first.value;
    Some((diff * 10.0).round() / 10.0)
}

pub fn attendance_status(
    snap: &Snapshot,
    date: &str,
    class_id: &str,
    student_id: &str,
) -> Option<AttendanceStatus> {
    snap.attendance
        .iter()
        .find(|r| r.date == date && r.class_id == class_id && r.student_id == student_id)
        .map(|r| r.status)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub excused: usize,
    pub unset: usize,
}

impl AttendanceSummary {
    fn add(&mut self, status: Option<AttendanceStatus>) {
        match status {
            Some(AttendanceStatus::Present) => self.present += 1,
            Some(AttendanceStatus::Absent) => self.absent += 1,
            Some(AttendanceStatus::Late) => self.late += 1,
            Some(AttendanceStatus::Excused) => self.excused += 1,
            None => self.unset += 1,
        }
    }
}

/// Status counts for the class roster on one day.
pub fn class_day_summary(snap: &Snapshot, date: &str, class_id: &str) -> AttendanceSummary {
    let mut summary = AttendanceSummary::default();
    for s in snap.students_in_class(class_id) {
        summary.add(attendance_status(snap, date, class_id, &s.id));
    }
    summary
}

/// Status counts for every student of every existing class on one day.
pub fn day_summary(snap: &Snapshot, date: &str) -> AttendanceSummary {
    let mut summary = AttendanceSummary::default();
    for c in snap.classes {
        for s in snap.students_in_class(&c.id) {
            summary.add(attendance_status(snap, date, &c.id, &s.id));
        }
    }
    summary
}

/// Counts across all dates of one student's records in one class.
pub fn student_attendance_counts(
    snap: &Snapshot,
    student_id: &str,
    class_id: &str,
) -> AttendanceSummary {
    let mut summary = AttendanceSummary::default();
    for r in snap
        .attendance
        .iter()
        .filter(|r| r.student_id == student_id && r.class_id == class_id)
    {
        summary.add(Some(r.status));
    }
    summary
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradebookCell {
    pub assignment_id: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradebookRow {
    pub student_id: String,
    pub name: String,
    pub average: String,
    pub band: Option<AverageBand>,
    pub cells: Vec<GradebookCell>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradebookModel {
    pub class_id: String,
    pub assignments: Vec<Assignment>,
    pub rows: Vec<GradebookRow>,
}

pub fn gradebook(snap: &Snapshot, class_id: &str) -> GradebookModel {
    let assignments: Vec<Assignment> = snap.assignments_in_class(class_id).cloned().collect();
    let rows = snap
        .students_in_class(class_id)
        .map(|s| {
            let avg = student_average_in_class(snap, &s.id, class_id);
            GradebookRow {
                student_id: s.id.clone(),
                name: s.name.clone(),
                average: format_average(avg),
                band: average_band(avg),
                cells: assignments
                    .iter()
                    .map(|a| GradebookCell {
                        assignment_id: a.id.clone(),
                        score: snap.grade(&s.id, &a.id).map(|g| g.score),
                    })
                    .collect(),
            }
        })
        .collect();
    GradebookModel {
        class_id: class_id.to_string(),
        assignments,
        rows,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassCount {
    pub class_id: String,
    pub name: String,
    pub section: String,
    pub schedule: String,
    pub student_count: usize,
    pub assignment_count: usize,
}

pub fn class_counts(snap: &Snapshot) -> Vec<ClassCount> {
    snap.classes
        .iter()
        .map(|c| ClassCount {
            class_id: c.id.clone(),
            name: c.name.clone(),
            section: c.section.clone(),
            schedule: c.schedule.clone(),
            student_count: snap.students_in_class(&c.id).count(),
            assignment_count: snap.assignments_in_class(&c.id).count(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub date: String,
    pub classes: Vec<ClassCount>,
    pub student_count: usize,
    pub assignment_count: usize,
    pub grades_recorded: usize,
    pub pending_todos: usize,
    pub attendance: AttendanceSummary,
    pub series: Vec<SeriesPoint>,
    pub trend: Option<f64>,
}

pub fn dashboard(snap: &Snapshot, date: &str) -> DashboardSummary {
    let series = global_series(snap);
    let trend = series_trend(&series);
    DashboardSummary {
        date: date.to_string(),
        classes: class_counts(snap),
        student_count: snap.students.len(),
        assignment_count: snap.assignments.len(),
        grades_recorded: snap.grades.len(),
        pending_todos: snap.todos.iter().filter(|t| !t.completed).count(),
        attendance: day_summary(snap, date),
        series,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(value: f64) -> SeriesPoint {
        SeriesPoint {
            assignment_id: String::new(),
            date: String::new(),
            value,
            label: String::new(),
        }
    }

    #[test]
    fn round_off_half_up() {
        assert_eq!(round_off_1_decimal(0.0), 0.0);
        assert_eq!(round_off_1_decimal(3.54), 3.5);
        assert_eq!(round_off_1_decimal(3.55), 3.6);
        assert_eq!(round_off_1_decimal(95.333_333), 95.3);
    }

    #[test]
    fn format_average_uses_sentinel() {
        assert_eq!(format_average(None), "N/A");
        assert_eq!(format_average(Some(80.0)), "80.0");
        assert_eq!(format_average(Some(143.0 / 150.0 * 100.0)), "95.3");
    }

    #[test]
    fn bands_follow_gradebook_thresholds() {
        assert_eq!(average_band(None), None);
        assert_eq!(average_band(Some(90.0)), Some(AverageBand::Excellent));
        assert_eq!(average_band(Some(85.0)), Some(AverageBand::Steady));
        assert_eq!(average_band(Some(79.9)), Some(AverageBand::Watch));
        assert_eq!(average_band(Some(69.9)), Some(AverageBand::Failing));
    }

    #[test]
    fn undated_sorts_last_and_ties_are_stable() {
        assert_eq!(compare_dates("2023-09-01", "2023-10-01"), Ordering::Less);
        assert_eq!(compare_dates("garbage", "2023-10-01"), Ordering::Greater);
        assert_eq!(compare_dates("2023-09-01", "2023-09-01"), Ordering::Equal);
    }

    #[test]
    fn trend_is_last_minus_first() {
        assert_eq!(series_trend(&[]), None);
        assert_eq!(series_trend(&[point(80.0)]), Some(0.0));
        assert_eq!(series_trend(&[point(82.3), point(90.0), point(75.1)]), Some(-7.2));
    }
}
