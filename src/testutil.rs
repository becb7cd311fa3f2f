//! Hand-built fixture inputs shared by the unit tests.

use crate::data::{Course, CourseKind, Instructor, Room, SchedulingInput, Section, Ta};

pub struct InputBuilder {
    input: SchedulingInput,
}

impl InputBuilder {
    pub fn new() -> Self {
        Self {
            input: SchedulingInput::default(),
        }
    }

    pub fn course(mut self, course: Course) -> Self {
        self.input.courses.push(course);
        self
    }

    pub fn instructor(mut self, instructor: Instructor) -> Self {
        self.input.instructors.push(instructor);
        self
    }

    pub fn ta(mut self, ta: Ta) -> Self {
        self.input.tas.push(ta);
        self
    }

    pub fn room(mut self, room: Room) -> Self {
        self.input.rooms.push(room);
        self
    }

    pub fn section(mut self, section: Section) -> Self {
        self.input.sections.push(section);
        self
    }

    pub fn build(self) -> SchedulingInput {
        self.input
    }
}

fn course(id: &str, kind: CourseKind, duration: usize) -> Course {
    Course {
        course_id: id.to_string(),
        course_name: format!("{id} name"),
        kind,
        lab_type: None,
        all_year: false,
        duration,
    }
}

pub fn lecture(id: &str, duration: usize) -> Course {
    course(id, CourseKind::Lecture, duration)
}

pub fn tutorial(id: &str, duration: usize) -> Course {
    course(id, CourseKind::Tutorial, duration)
}

pub fn lab(id: &str, duration: usize) -> Course {
    course(id, CourseKind::Lab, duration)
}

pub fn instructor(id: &str, qualified: &[&str]) -> Instructor {
    Instructor {
        instructor_id: id.to_string(),
        name: format!("{id} name"),
        qualified_courses: qualified.iter().map(|c| c.to_string()).collect(),
        preferred_time_slots: Vec::new(),
        unavailable_time_slots: Vec::new(),
    }
}

pub fn ta(id: &str, qualified: &[&str]) -> Ta {
    Ta {
        ta_id: id.to_string(),
        name: format!("{id} name"),
        qualified_courses: qualified.iter().map(|c| c.to_string()).collect(),
        preferred_time_slots: Vec::new(),
        unavailable_time_slots: Vec::new(),
    }
}

pub fn room(id: &str, kind: CourseKind, capacity: u32) -> Room {
    Room {
        room_id: id.to_string(),
        kind,
        lab_type: None,
        capacity,
    }
}

pub fn section(
    id: &str,
    group: &str,
    year: i32,
    students: u32,
    courses: &[&str],
) -> Section {
    Section {
        section_id: id.to_string(),
        group_id: group.to_string(),
        year,
        student_count: students,
        assigned_courses: courses.iter().map(|c| c.to_string()).collect(),
    }
}
