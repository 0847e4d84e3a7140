use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGroup {
    pub id: String,
    pub name: String,
    pub section: String,
    /// Free text, e.g. "08:00 AM".
    pub schedule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Not checked against the class list; may dangle after a class delete.
    pub class_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub class_id: String,
    pub title: String,
    pub max_points: f64,
    pub date: String,
    #[serde(default)]
    pub completed: bool,
}

/// Keyed by `(student_id, assignment_id)`; the store keeps at most one per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub student_id: String,
    pub assignment_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Late,
        AttendanceStatus::Excused,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::Excused => "Excused",
        }
    }

    /// Accepts the full name or its first letter, case-insensitive.
    pub fn parse(raw: &str) -> Option<Self> {
        let t = raw.trim();
        Self::ALL.into_iter().find(|s| {
            let name = s.as_str();
            name.eq_ignore_ascii_case(t) || (t.len() == 1 && name[..1].eq_ignore_ascii_case(t))
        })
    }
}

/// Keyed by `(date, class_id, student_id)`; the store keeps at most one per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub date: String,
    pub class_id: String,
    pub student_id: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: String,
    pub title: String,
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppView {
    #[default]
    Dashboard,
    Classes,
    Attendance,
    Gradebook,
    Snippets,
    Feedback,
}

impl AppView {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DASHBOARD" => Some(AppView::Dashboard),
            "CLASSES" => Some(AppView::Classes),
            "ATTENDANCE" => Some(AppView::Attendance),
            "GRADEBOOK" => Some(AppView::Gradebook),
            "SNIPPETS" => Some(AppView::Snippets),
            "FEEDBACK" => Some(AppView::Feedback),
            _ => None,
        }
    }
}

/// One durable slot per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Classes,
    Students,
    Assignments,
    Grades,
    Attendance,
    Snippets,
    Todos,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Classes,
        Collection::Students,
        Collection::Assignments,
        Collection::Grades,
        Collection::Attendance,
        Collection::Snippets,
        Collection::Todos,
    ];

    pub fn slot_key(self) -> &'static str {
        match self {
            Collection::Classes => "tcc_classes",
            Collection::Students => "tcc_students",
            Collection::Assignments => "tcc_assignments",
            Collection::Grades => "tcc_grades",
            Collection::Attendance => "tcc_attendance",
            Collection::Snippets => "tcc_snippets",
            Collection::Todos => "tcc_todos",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Collection::Classes => "classes",
            Collection::Students => "students",
            Collection::Assignments => "assignments",
            Collection::Grades => "grades",
            Collection::Attendance => "attendance",
            Collection::Snippets => "snippets",
            Collection::Todos => "todos",
        }
    }
}
