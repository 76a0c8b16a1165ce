use std::collections::HashMap;

use crate::model::{Assignment, AssessmentCell, SnapshotRecord, Student};

/// In-memory grid built from a flat snapshot. The engine owns it; the UI
/// only ever sees clones. A fresh snapshot replaces the store wholesale,
/// cells are never deleted individually within a session.
#[derive(Debug, Default)]
pub struct GridStore {
    students: Vec<Student>,
    assignments: Vec<Assignment>,
    rows: HashMap<i64, HashMap<i64, AssessmentCell>>,
}

impl GridStore {
    /// Group flat (student x assignment) records into the grid shape.
    /// Student and assignment order follows first appearance in the
    /// snapshot, which is the order the server emitted.
    pub fn from_records(records: Vec<SnapshotRecord>) -> Self {
        let mut students: Vec<Student> = Vec::new();
        let mut assignments: Vec<Assignment> = Vec::new();
        let mut rows: HashMap<i64, HashMap<i64, AssessmentCell>> = HashMap::new();

        for rec in records {
            if !students.iter().any(|s| s.id == rec.student_id) {
                students.push(Student {
                    id: rec.student_id,
                    name: rec.student_name.clone(),
                    email: rec.student_email.clone(),
                });
            }
            if !assignments.iter().any(|a| a.id == rec.assignment_id) {
                assignments.push(Assignment {
                    id: rec.assignment_id,
                    title: rec.assignment_title.clone(),
                    full_mark: rec.full_mark,
                    deadline: rec.deadline,
                });
            }

            let cell = AssessmentCell {
                student_id: rec.student_id,
                assignment_id: rec.assignment_id,
                teacher_mark: rec.teacher_mark,
                grading_notes: rec.grading_notes,
                manual_weight: rec.manual_weight,
                full_mark: rec.full_mark,
                submission_status: rec.submission_status,
                is_late_submission: rec.is_late_submission,
                copy_penalty_applied: rec.copy_penalty_applied,
                final_mark: rec.final_mark,
                submission_files: rec.submission_files,
                graded_at: rec.graded_at,
            };
            rows.entry(rec.student_id)
                .or_default()
                .insert(rec.assignment_id, cell);
        }

        Self {
            students,
            assignments,
            rows,
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn assignment(&self, assignment_id: i64) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == assignment_id)
    }

    pub fn cell(&self, student_id: i64, assignment_id: i64) -> Option<&AssessmentCell> {
        self.rows.get(&student_id)?.get(&assignment_id)
    }

    pub fn cell_mut(&mut self, student_id: i64, assignment_id: i64) -> Option<&mut AssessmentCell> {
        self.rows.get_mut(&student_id)?.get_mut(&assignment_id)
    }

    /// All of one student's cells, in assignment column order.
    pub fn student_cells(&self, student_id: i64) -> Vec<&AssessmentCell> {
        let Some(row) = self.rows.get(&student_id) else {
            return Vec::new();
        };
        self.assignments
            .iter()
            .filter_map(|a| row.get(&a.id))
            .collect()
    }

    /// All cells of one assignment column, in student row order.
    pub fn assignment_cells(&self, assignment_id: i64) -> Vec<&AssessmentCell> {
        self.students
            .iter()
            .filter_map(|s| self.rows.get(&s.id)?.get(&assignment_id))
            .collect()
    }

    pub fn cell_count(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }
}
