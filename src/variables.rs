use std::collections::HashSet;

use log::debug;

use crate::data::{
    CourseId, CourseKind, GroupId, Indexes, RoomId, SchedulingInput, SolverConfig, TeacherId,
};

/// One scheduling obligation: a course together with every section that must
/// attend it at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub course_id: CourseId,
    pub kind: CourseKind,
    /// Section indices that must be co-scheduled. Never empty.
    pub target_sections: Vec<usize>,
    pub total_students: u32,
    pub duration: usize,
    /// Scheduled before everything else.
    pub hard: bool,
}

/// One candidate placement for a variable. `room_id` is `None` for courses
/// that take no room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub start_slot: usize,
    pub teacher_id: TeacherId,
    pub room_id: Option<RoomId>,
}

/// Converts the (section × assigned-course) multiset into the ordered list of
/// variables the search runs over.
///
/// All-year courses collapse into one variable per (year, course) covering
/// every section of that year; lectures collapse into one variable per
/// (group, course) covering the group; everything else gets a per-section
/// variable. Later sections hitting an already-merged pair skip the course.
pub fn identify(input: &SchedulingInput, idx: &Indexes, config: &SolverConfig) -> Vec<Variable> {
    let mut variables = Vec::new();
    let mut merged_year: HashSet<(i32, CourseId)> = HashSet::new();
    let mut merged_group: HashSet<(GroupId, CourseId)> = HashSet::new();
    let mut seen_section: HashSet<(usize, CourseId)> = HashSet::new();

    for (i, section) in input.sections.iter().enumerate() {
        for course_id in &section.assigned_courses {
            let Some(course) = idx.courses.get(course_id) else {
                continue;
            };

            let targets = if course.all_year {
                if !merged_year.insert((section.year, course_id.clone())) {
                    continue;
                }
                idx.year_sections
                    .get(&section.year)
                    .cloned()
                    .unwrap_or_else(|| vec![i])
            } else if course.kind == CourseKind::Lecture {
                if !merged_group.insert((section.group_id.clone(), course_id.clone())) {
                    continue;
                }
                idx.group_sections
                    .get(&section.group_id)
                    .cloned()
                    .unwrap_or_else(|| vec![i])
            } else {
                if !seen_section.insert((i, course_id.clone())) {
                    continue;
                }
                vec![i]
            };

            let total_students = targets
                .iter()
                .map(|&j| input.sections[j].student_count)
                .sum();

            variables.push(Variable {
                course_id: course_id.clone(),
                kind: course.kind,
                target_sections: targets,
                total_students,
                duration: course.duration,
                hard: config.hard_course_ids.contains(course_id),
            });
        }
    }

    order(&mut variables);
    debug!("identified {} variables", variables.len());
    variables
}

/// Most-constrained-first ordering: hard variables, then longer durations,
/// then larger cohorts, then more target sections. Stable, so equal keys
/// keep discovery order.
pub fn order(variables: &mut [Variable]) {
    variables.sort_by(|a, b| {
        b.hard
            .cmp(&a.hard)
            .then_with(|| b.duration.cmp(&a.duration))
            .then_with(|| b.total_students.cmp(&a.total_students))
            .then_with(|| b.target_sections.len().cmp(&a.target_sections.len()))
    });
}
