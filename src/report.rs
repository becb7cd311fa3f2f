use serde::Serialize;

use crate::board::Board;
use crate::data::{CourseKind, Indexes, SchedulingInput, SLOTS_MAX};

/// One head cell in a section's schedule. Continuation cells are implied by
/// `duration` and never listed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEntry {
    pub slot_index: usize,
    #[serde(rename = "courseID")]
    pub course_id: String,
    pub course_name: String,
    #[serde(rename = "type")]
    pub kind: CourseKind,
    #[serde(rename = "roomID")]
    pub room_id: String,
    #[serde(rename = "instructorID")]
    pub instructor_id: String,
    pub instructor_name: String,
    pub duration: usize,
    /// `"i"` for single slots, `"i-j"` inclusive otherwise.
    pub slot_range: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSchedule {
    #[serde(rename = "sectionID")]
    pub section_id: String,
    #[serde(rename = "groupID")]
    pub group_id: String,
    pub year: i32,
    pub student_count: u32,
    pub schedule: Vec<ScheduledEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnscheduledSection {
    #[serde(rename = "sectionID")]
    pub section_id: String,
    pub unscheduled_courses: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub iterations: u64,
    pub time_taken_ms: u128,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unscheduled_sections: Vec<UnscheduledSection>,
}

/// The 200 payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSuccess {
    pub success: bool,
    pub slots_max: usize,
    pub sections_max: usize,
    pub sections: Vec<SectionSchedule>,
    pub diagnostics: Diagnostics,
}

/// One entry in the bounded failure history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureInfo {
    #[serde(rename = "courseID")]
    pub course_id: String,
    pub course_name: String,
    #[serde(rename = "sectionID")]
    pub section_id: String,
    pub reason: String,
    pub depth: usize,
    pub placements_tried: usize,
    pub rooms_considered: usize,
}

/// The 400 payload for an unsolvable instance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub success: bool,
    /// Same as `root_cause`; kept for callers that only read `error`.
    pub error: String,
    pub root_cause: String,
    pub last_attempt: String,
    pub failure_chain: Vec<FailureInfo>,
    pub diagnostics: Diagnostics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Reads the head cells out of the board into the wire schema. Entries come
/// out ordered by ascending slot index because the grid is walked in order.
pub fn success(
    input: &SchedulingInput,
    idx: &Indexes,
    board: &Board,
    diagnostics: Diagnostics,
) -> ScheduleSuccess {
    let sections = input
        .sections
        .iter()
        .enumerate()
        .map(|(j, section)| {
            let mut schedule = Vec::new();
            for slot in 0..SLOTS_MAX {
                let Some(cell) = board.cell(slot, j) else {
                    continue;
                };
                if cell.is_continuation {
                    continue;
                }
                let course_name = idx
                    .courses
                    .get(&cell.course_id)
                    .map(|c| c.course_name.clone())
                    .unwrap_or_default();
                let instructor_name = idx
                    .teachers
                    .get(&cell.teacher_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_default();
                let slot_range = if cell.duration > 1 {
                    format!("{}-{}", slot, slot + cell.duration - 1)
                } else {
                    slot.to_string()
                };
                schedule.push(ScheduledEntry {
                    slot_index: slot,
                    course_id: cell.course_id.clone(),
                    course_name,
                    kind: cell.kind,
                    room_id: cell.room_id.clone().unwrap_or_default(),
                    instructor_id: cell.teacher_id.clone(),
                    instructor_name,
                    duration: cell.duration,
                    slot_range,
                });
            }
            SectionSchedule {
                section_id: section.section_id.clone(),
                group_id: section.group_id.clone(),
                year: section.year,
                student_count: section.student_count,
                schedule,
            }
        })
        .collect();

    ScheduleSuccess {
        success: true,
        slots_max: SLOTS_MAX,
        sections_max: input.sections.len(),
        sections,
        diagnostics,
    }
}

/// Per-section list of assigned courses that never made it onto the board.
/// Duplicate listings are reported once.
pub fn unscheduled_sections(input: &SchedulingInput, board: &Board) -> Vec<UnscheduledSection> {
    input
        .sections
        .iter()
        .enumerate()
        .filter_map(|(j, section)| {
            let mut seen = std::collections::HashSet::new();
            let missing: Vec<String> = section
                .assigned_courses
                .iter()
                .filter(|c| seen.insert(c.as_str()))
                .filter(|c| !board.scheduled_courses(j).contains(c.as_str()))
                .cloned()
                .collect();
            if missing.is_empty() {
                None
            } else {
                Some(UnscheduledSection {
                    section_id: section.section_id.clone(),
                    unscheduled_courses: missing,
                })
            }
        })
        .collect()
}
