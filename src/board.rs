use std::collections::HashSet;

use crate::data::{
    CourseId, CourseKind, Indexes, RoomId, SchedulingInput, SolverConfig, TeacherId, SLOTS_MAX,
};
use crate::variables::{Placement, Variable};

/// Contents of one (slot, section) cell. Multi-slot placements write one head
/// cell followed by `duration - 1` continuation cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAssignment {
    pub course_id: CourseId,
    pub kind: CourseKind,
    pub room_id: Option<RoomId>,
    pub teacher_id: TeacherId,
    pub duration: usize,
    pub is_continuation: bool,
}

/// The live constraint index: the timetable grid plus the busy sets that
/// make legality checks cheap. All four structures are mutated only through
/// `apply` and `undo`, which are exact inverses of each other.
pub struct Board<'a> {
    input: &'a SchedulingInput,
    idx: &'a Indexes,
    config: &'a SolverConfig,
    /// Indexed [slot][section].
    grid: Vec<Vec<Option<CellAssignment>>>,
    teacher_busy: Vec<HashSet<TeacherId>>,
    room_busy: Vec<HashSet<RoomId>>,
    scheduled: Vec<HashSet<CourseId>>,
}

impl<'a> Board<'a> {
    pub fn new(input: &'a SchedulingInput, idx: &'a Indexes, config: &'a SolverConfig) -> Self {
        let sections = input.sections.len();
        Self {
            input,
            idx,
            config,
            grid: vec![vec![None; sections]; SLOTS_MAX],
            teacher_busy: vec![HashSet::new(); SLOTS_MAX],
            room_busy: vec![HashSet::new(); SLOTS_MAX],
            scheduled: vec![HashSet::new(); sections],
        }
    }

    pub fn cell(&self, slot: usize, section: usize) -> Option<&CellAssignment> {
        self.grid[slot][section].as_ref()
    }

    pub fn scheduled_courses(&self, section: usize) -> &HashSet<CourseId> {
        &self.scheduled[section]
    }

    pub fn section_id(&self, section: usize) -> &str {
        &self.input.sections[section].section_id
    }

    pub fn course_name(&self, course_id: &str) -> Option<String> {
        self.idx
            .courses
            .get(course_id)
            .map(|c| c.course_name.clone())
    }

    pub fn lab_subtype(&self, course_id: &str) -> Option<String> {
        self.idx
            .courses
            .get(course_id)
            .and_then(|c| c.lab_subtype().map(str::to_string))
    }

    fn teacher_available(&self, teacher_id: &str, slot: usize) -> bool {
        if self.teacher_busy[slot].contains(teacher_id) {
            return false;
        }
        match self.idx.teachers.get(teacher_id) {
            Some(info) => !info.unavailable.contains(&slot),
            None => true,
        }
    }

    /// Every teacher qualified for the course: instructors in input order,
    /// then TAs in input order.
    pub fn qualified_teachers(&self, course_id: &str) -> Vec<TeacherId> {
        let mut out = Vec::new();
        for inst in &self.input.instructors {
            if inst.qualified_courses.iter().any(|c| c == course_id) {
                out.push(inst.instructor_id.clone());
            }
        }
        for ta in &self.input.tas {
            if ta.qualified_courses.iter().any(|c| c == course_id) {
                out.push(ta.ta_id.clone());
            }
        }
        out
    }

    /// Rooms that satisfy the kind/subtype/capacity filter, in input order.
    /// Roomless courses get the single sentinel `None`. All-year courses are
    /// exempt from the capacity check.
    pub fn suitable_rooms(&self, var: &Variable) -> Vec<Option<RoomId>> {
        if self.config.roomless_course_ids.contains(&var.course_id) {
            return vec![None];
        }
        let Some(course) = self.idx.courses.get(&var.course_id) else {
            return Vec::new();
        };
        self.input
            .rooms
            .iter()
            .filter(|room| room.kind == course.kind)
            .filter(|room| match (course.kind, course.lab_subtype()) {
                (CourseKind::Lab, Some(subtype)) => room.lab_subtype() == Some(subtype),
                _ => true,
            })
            .filter(|room| course.all_year || room.capacity >= var.total_students)
            .map(|room| Some(room.room_id.clone()))
            .collect()
    }

    pub fn suitable_room_count(&self, var: &Variable) -> usize {
        if self.config.roomless_course_ids.contains(&var.course_id) {
            return 0;
        }
        self.suitable_rooms(var).len()
    }

    /// Longest run of consecutive slots in which every target section of the
    /// variable is free. Used to explain why a fixed-duration course cannot
    /// be placed.
    pub fn max_free_run(&self, var: &Variable) -> usize {
        let mut best = 0;
        let mut run = 0;
        for slot in 0..SLOTS_MAX {
            let free = var
                .target_sections
                .iter()
                .all(|&j| self.grid[slot][j].is_none());
            if free {
                run += 1;
                best = best.max(run);
            } else {
                run = 0;
            }
        }
        best
    }

    /// Whether a placement is legal against the current index state.
    pub fn is_valid(&self, var: &Variable, val: &Placement) -> bool {
        if val.start_slot + var.duration > SLOTS_MAX {
            return false;
        }
        if self.config.align_to_duration && var.duration > 1 && val.start_slot % var.duration != 0 {
            return false;
        }

        let range = val.start_slot..val.start_slot + var.duration;

        for s in range.clone() {
            if !self.teacher_available(&val.teacher_id, s) {
                return false;
            }
        }

        if let Some(room_id) = &val.room_id {
            for s in range.clone() {
                if self.room_busy[s].contains(room_id) {
                    return false;
                }
            }
        }

        for &j in &var.target_sections {
            for s in range.clone() {
                if self.grid[s][j].is_some() {
                    return false;
                }
            }
        }

        true
    }

    /// Every placement that passes `is_valid` right now: slots ascending,
    /// teachers in discovery order, rooms in input order.
    pub fn domain(&self, var: &Variable) -> Vec<Placement> {
        let mut domain = Vec::new();
        if var.duration == 0 || var.duration > SLOTS_MAX {
            return domain;
        }

        let teachers = self.qualified_teachers(&var.course_id);
        if teachers.is_empty() {
            return domain;
        }
        let rooms = self.suitable_rooms(var);
        if rooms.is_empty() {
            return domain;
        }

        for slot in 0..=SLOTS_MAX - var.duration {
            let sections_free = var.target_sections.iter().all(|&j| {
                (slot..slot + var.duration).all(|s| self.grid[s][j].is_none())
            });
            if !sections_free {
                continue;
            }

            for teacher_id in &teachers {
                let teacher_free =
                    (slot..slot + var.duration).all(|s| self.teacher_available(teacher_id, s));
                if !teacher_free {
                    continue;
                }

                for room_id in &rooms {
                    let val = Placement {
                        start_slot: slot,
                        teacher_id: teacher_id.clone(),
                        room_id: room_id.clone(),
                    };
                    if self.is_valid(var, &val) {
                        domain.push(val);
                    }
                }
            }
        }

        domain
    }

    /// Writes the placement into the grid and busy sets. Callers must have
    /// checked `is_valid` first; no checks happen here.
    pub fn apply(&mut self, var: &Variable, val: &Placement) {
        for &j in &var.target_sections {
            self.scheduled[j].insert(var.course_id.clone());
            for (offset, s) in (val.start_slot..val.start_slot + var.duration).enumerate() {
                self.grid[s][j] = Some(CellAssignment {
                    course_id: var.course_id.clone(),
                    kind: var.kind,
                    room_id: val.room_id.clone(),
                    teacher_id: val.teacher_id.clone(),
                    duration: var.duration,
                    is_continuation: offset > 0,
                });
            }
        }

        for s in val.start_slot..val.start_slot + var.duration {
            self.teacher_busy[s].insert(val.teacher_id.clone());
            if let Some(room_id) = &val.room_id {
                self.room_busy[s].insert(room_id.clone());
            }
        }
    }

    /// Exact inverse of `apply`. Calling this on a move that is not currently
    /// applied is undefined.
    pub fn undo(&mut self, var: &Variable, val: &Placement) {
        for &j in &var.target_sections {
            self.scheduled[j].remove(&var.course_id);
            for s in val.start_slot..val.start_slot + var.duration {
                self.grid[s][j] = None;
            }
        }

        for s in val.start_slot..val.start_slot + var.duration {
            self.teacher_busy[s].remove(&val.teacher_id);
            if let Some(room_id) = &val.room_id {
                self.room_busy[s].remove(room_id);
            }
        }
    }
}
