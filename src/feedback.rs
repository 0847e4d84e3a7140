use serde::Serialize;
use thiserror::Error;

use crate::calc::{format_average, student_attendance_counts, student_average_in_class};
use crate::store::Snapshot;

pub const FALLBACK_MISSING_CONFIG: &str =
    "Error: API key is missing. Please check your configuration.";
pub const FALLBACK_EMPTY: &str = "Error: Could not generate feedback.";
pub const FALLBACK_UNAVAILABLE: &str = "Error: Feedback service unavailable. Please try again later.";

/// Statistics bundle handed to the feedback collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub student_id: String,
    pub student_name: String,
    pub class_id: String,
    pub class_name: String,
    pub class_section: String,
    pub average: Option<f64>,
    pub completed: usize,
    pub total: usize,
    pub absences: usize,
    pub lates: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("feedback service is not configured")]
    MissingConfig,
    #[error("feedback request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("feedback service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("feedback service returned no text")]
    Empty,
}

/// Something that turns a statistics bundle into a progress-report paragraph.
pub trait FeedbackCollaborator {
    fn generate(&self, request: &FeedbackRequest) -> Result<String, FeedbackError>;
}

/// Builds the bundle for one student in one class. Refuses if either id is unknown.
pub fn assemble(
    snap: &Snapshot,
    student_id: &str,
    class_id: &str,
) -> Result<FeedbackRequest, SnapshotError> {
    let student = snap.student(student_id).ok_or_else(|| SnapshotError::NotFound {
        kind: "student",
        id: student_id.to_string(),
    })?;
    let class = snap.class(class_id).ok_or_else(|| SnapshotError::NotFound {
        kind: "class",
        id: class_id.to_string(),
    })?;

    let mut total = 0usize;
    let mut completed = 0usize;
    for a in snap.assignments_in_class(class_id) {
        total += 1;
        if snap.grade(student_id, &a.id).is_some() {
            completed += 1;
        }
    }
    let attendance = student_attendance_counts(snap, student_id, class_id);

    Ok(FeedbackRequest {
        student_id: student.id.clone(),
        student_name: student.name.clone(),
        class_id: class.id.clone(),
        class_name: class.name.clone(),
        class_section: class.section.clone(),
        average: student_average_in_class(snap, student_id, class_id),
        completed,
        total,
        absences: attendance.absent,
        lates: attendance.late,
    })
}

/// Calls the collaborator and always returns display text. Failures become
/// one of the `FALLBACK_*` strings.
pub fn request_feedback(collaborator: &dyn FeedbackCollaborator, request: &FeedbackRequest) -> String {
    match collaborator.generate(request) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) | Err(FeedbackError::Empty) => {
            tracing::warn!(student_id = %request.student_id, "feedback came back empty");
            FALLBACK_EMPTY.to_string()
        }
        Err(FeedbackError::MissingConfig) => {
            tracing::warn!("feedback requested without an API key");
            FALLBACK_MISSING_CONFIG.to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, "feedback request failed");
            FALLBACK_UNAVAILABLE.to_string()
        }
    }
}

pub fn build_prompt(req: &FeedbackRequest) -> String {
    let average = match req.average {
        Some(_) => format!("{}%", format_average(req.average)),
        None => "not available (no graded work yet)".to_string(),
    };
    format!(
        "Role: You are an encouraging but rigorous Computer Science teacher.\n\
         Task: Write a short, constructive paragraph (max 100 words) for a progress report.\n\
         \n\
         Student: {student}\n\
         Class: {class} ({section})\n\
         \n\
         Performance Data:\n\
         - Average Score: {average}\n\
         - Assignments Completed: {completed}/{total}\n\
         - Attendance: {absences} Absences, {lates} Lates\n\
         \n\
         Instructions:\n\
         - Highlight strengths if average is high, or specific areas for improvement if low.\n\
         - Mention attendance if it's an issue (more than 2 absences/lates).\n\
         - Use professional, academic tone but remain accessible.\n\
         - Do not include placeholders. Write the final feedback text directly.\n",
        student = req.student_name,
        class = req.class_name,
        section = req.class_section,
        average = average,
        completed = req.completed,
        total = req.total,
        absences = req.absences,
        lates = req.lates,
    )
}
