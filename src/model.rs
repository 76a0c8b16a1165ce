use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Editable cell fields. A closed set so every edit path is matched
/// exhaustively instead of going through stringly-typed field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditField {
    TeacherMark,
    GradingNotes,
    ManualWeight,
}

impl EditField {
    /// Wire name used in field-update payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            EditField::TeacherMark => "teacherMark",
            EditField::GradingNotes => "gradingNotes",
            EditField::ManualWeight => "manualWeight",
        }
    }
}

/// Unit of debounce and status tracking: one editable field of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditKey {
    pub student_id: i64,
    pub assignment_id: i64,
    pub field: EditField,
}

impl EditKey {
    pub fn new(student_id: i64, assignment_id: i64, field: EditField) -> Self {
        Self {
            student_id,
            assignment_id,
            field,
        }
    }
}

/// A validated local edit to a single cell field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    TeacherMark(Option<f64>),
    GradingNotes(String),
    ManualWeight(f64),
}

impl FieldEdit {
    pub fn field(&self) -> EditField {
        match self {
            FieldEdit::TeacherMark(_) => EditField::TeacherMark,
            FieldEdit::GradingNotes(_) => EditField::GradingNotes,
            FieldEdit::ManualWeight(_) => EditField::ManualWeight,
        }
    }

    /// JSON value as sent to the persistence collaborator.
    pub fn to_wire_value(&self) -> serde_json::Value {
        match self {
            FieldEdit::TeacherMark(Some(v)) => serde_json::json!(v),
            FieldEdit::TeacherMark(None) => serde_json::Value::Null,
            FieldEdit::GradingNotes(s) => serde_json::json!(s),
            FieldEdit::ManualWeight(w) => serde_json::json!(w),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Submitted,
    Late,
    NotSubmitted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub full_mark: f64,
    pub deadline: Option<DateTime<Utc>>,
}

/// One (student, assignment) grading unit as held in the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentCell {
    pub student_id: i64,
    pub assignment_id: i64,
    pub teacher_mark: Option<f64>,
    pub grading_notes: String,
    pub manual_weight: f64,
    pub full_mark: f64,
    pub submission_status: SubmissionStatus,
    pub is_late_submission: bool,
    pub copy_penalty_applied: bool,
    pub final_mark: Option<f64>,
    pub submission_files: Vec<FileRef>,
    pub graded_at: Option<DateTime<Utc>>,
}

impl AssessmentCell {
    /// Late either by the submission flag or by the status the server sent.
    pub fn counts_as_late(&self) -> bool {
        self.is_late_submission || self.submission_status == SubmissionStatus::Late
    }
}

/// Flat per-(student, assignment) record as fetched from the collaborator.
/// The engine groups these into the GridStore shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub assignment_id: i64,
    pub assignment_title: String,
    pub full_mark: f64,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub teacher_mark: Option<f64>,
    #[serde(default)]
    pub grading_notes: String,
    #[serde(default = "default_weight")]
    pub manual_weight: f64,
    #[serde(default)]
    pub final_mark: Option<f64>,
    pub submission_status: SubmissionStatus,
    #[serde(default)]
    pub is_late_submission: bool,
    #[serde(default)]
    pub copy_penalty_applied: bool,
    #[serde(default)]
    pub submission_files: Vec<FileRef>,
    #[serde(default)]
    pub graded_at: Option<DateTime<Utc>>,
}

fn default_weight() -> f64 {
    1.0
}

/// Lifecycle of a scheduled save, keyed by EditKey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SaveStatus {
    #[default]
    Idle,
    Pending,
    Saving,
    Saved,
    Error,
}
