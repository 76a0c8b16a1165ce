use crate::error::EngineError;
use crate::model::AssessmentCell;

/// Compute the displayed final mark for one cell.
///
/// Rules, in dominance order:
/// - no teacher mark yet => no final mark (never defaults to 0)
/// - copy penalty => 0, regardless of the entered mark
/// - late submission => mark * (1 - late_penalty_rate)
///
/// The mark is not clamped to `[0, full_mark]`: negative adjustments and
/// over-cap bonuses are legitimate entries, and clamping is a presentation
/// concern. Manual weight is applied at aggregation time only, so that
/// summing weighted cells does not double-weight.
pub fn compute_final_mark(
    teacher_mark: Option<f64>,
    full_mark: f64,
    is_late: bool,
    has_copy_penalty: bool,
    late_penalty_rate: f64,
) -> Result<Option<f64>, EngineError> {
    if !(full_mark > 0.0) {
        return Err(EngineError::InvalidInput(format!(
            "fullMark must be > 0, got {}",
            full_mark
        )));
    }
    if !(0.0..=1.0).contains(&late_penalty_rate) {
        return Err(EngineError::InvalidInput(format!(
            "latePenaltyRate must be in [0, 1], got {}",
            late_penalty_rate
        )));
    }

    let Some(mark) = teacher_mark else {
        return Ok(None);
    };
    if mark.is_nan() {
        return Err(EngineError::InvalidInput("teacherMark is NaN".to_string()));
    }

    if has_copy_penalty {
        return Ok(Some(0.0));
    }

    let result = if is_late {
        mark * (1.0 - late_penalty_rate)
    } else {
        mark
    };
    Ok(Some(result))
}

/// Current-standing totals for one student across a set of cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudentTotals {
    pub total_obtained: f64,
    pub total_possible: f64,
    /// 0 when nothing is possible yet.
    pub percentage: f64,
    pub graded_count: usize,
    pub ungraded_count: usize,
}

/// Sum a student's standing: graded cells contribute their weighted final
/// mark, every cell contributes its weighted full mark to the denominator.
/// Ungraded work therefore counts against the percentage; the grid shows
/// current standing, not potential standing. A weight of 0 is an explicit
/// entry that excludes the cell from both sides of the ratio; its graded/
/// ungraded count is still reported.
pub fn student_totals<'a, I>(cells: I) -> StudentTotals
where
    I: IntoIterator<Item = &'a AssessmentCell>,
{
    let mut total_obtained = 0.0_f64;
    let mut total_possible = 0.0_f64;
    let mut graded_count = 0_usize;
    let mut ungraded_count = 0_usize;

    for cell in cells {
        let weight = cell.manual_weight.max(0.0);
        total_possible += cell.full_mark * weight;
        match cell.final_mark {
            Some(v) => {
                graded_count += 1;
                total_obtained += v * weight;
            }
            None => ungraded_count += 1,
        }
    }

    let percentage = if total_possible > 0.0 {
        100.0 * total_obtained / total_possible
    } else {
        0.0
    };

    StudentTotals {
        total_obtained,
        total_possible,
        percentage,
        graded_count,
        ungraded_count,
    }
}

/// Class-level view of one assignment column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentAverage {
    pub avg_final: f64,
    pub avg_percent: f64,
    pub graded_count: usize,
    pub ungraded_count: usize,
    pub flagged_count: usize,
}

/// Average final mark across the graded cells of one assignment. Ungraded
/// cells are excluded from the mean but counted, as is the number of cells
/// carrying a copy flag.
pub fn assignment_average<'a, I>(cells: I, full_mark: f64) -> AssignmentAverage
where
    I: IntoIterator<Item = &'a AssessmentCell>,
{
    let mut sum = 0.0_f64;
    let mut graded_count = 0_usize;
    let mut ungraded_count = 0_usize;
    let mut flagged_count = 0_usize;

    for cell in cells {
        if cell.copy_penalty_applied {
            flagged_count += 1;
        }
        match cell.final_mark {
            Some(v) => {
                graded_count += 1;
                sum += v;
            }
            None => ungraded_count += 1,
        }
    }

    let avg_final = if graded_count > 0 {
        sum / graded_count as f64
    } else {
        0.0
    };
    let avg_percent = if full_mark > 0.0 {
        100.0 * avg_final / full_mark
    } else {
        0.0
    };

    AssignmentAverage {
        avg_final,
        avg_percent,
        graded_count,
        ungraded_count,
        flagged_count,
    }
}
