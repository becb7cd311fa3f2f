use itertools::Itertools;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// Type aliases for clarity
pub type CourseId = String;
pub type TeacherId = String;
pub type RoomId = String;
pub type SectionId = String;
pub type GroupId = String;

/// Number of slots on the time grid. A slot is an abstract unit; weekdays
/// and hours are not modelled.
pub const SLOTS_MAX: usize = 40;

/// What kind of room an offering needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CourseKind {
    Lecture,
    Tutorial,
    Lab,
}

impl FromStr for CourseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lec" | "Lec" | "lecture" | "Lecture" => Ok(Self::Lecture),
            "tut" | "Tut" | "tutorial" | "Tutorial" => Ok(Self::Tutorial),
            "lab" | "Lab" => Ok(Self::Lab),
            other => Err(format!(
                "unrecognised type {other:?}, expected one of lec/tut/lab"
            )),
        }
    }
}

impl fmt::Display for CourseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lecture => "Lecture",
            Self::Tutorial => "Tutorial",
            Self::Lab => "Lab",
        };
        f.write_str(name)
    }
}

impl<'de> Deserialize<'de> for CourseKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// A course to be scheduled for every section that lists it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "courseID")]
    pub course_id: CourseId,
    pub course_name: String,
    #[serde(rename = "type")]
    pub kind: CourseKind,
    #[serde(default)]
    pub lab_type: Option<String>,
    #[serde(default)]
    pub all_year: bool,
    #[serde(default = "default_duration")]
    pub duration: usize,
}

fn default_duration() -> usize {
    1
}

impl Course {
    /// Lab subtype, with the empty string treated as "none".
    pub fn lab_subtype(&self) -> Option<&str> {
        self.lab_type.as_deref().filter(|t| !t.is_empty())
    }
}

/// An instructor with their qualifications and availability.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    #[serde(rename = "instructorID")]
    pub instructor_id: TeacherId,
    pub name: String,
    #[serde(default)]
    pub qualified_courses: Vec<CourseId>,
    #[serde(default)]
    #[allow(dead_code)]
    pub preferred_time_slots: Vec<usize>,
    #[serde(default)]
    pub unavailable_time_slots: Vec<usize>,
}

/// A teaching assistant. Interchangeable with instructors for scheduling;
/// the instructor pool is searched first, then the TA pool.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ta {
    #[serde(rename = "taID")]
    pub ta_id: TeacherId,
    pub name: String,
    #[serde(default)]
    pub qualified_courses: Vec<CourseId>,
    #[serde(default)]
    #[allow(dead_code)]
    pub preferred_time_slots: Vec<usize>,
    #[serde(default)]
    pub unavailable_time_slots: Vec<usize>,
}

/// A physical room with a kind and capacity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(rename = "roomID")]
    pub room_id: RoomId,
    #[serde(rename = "type")]
    pub kind: CourseKind,
    #[serde(default)]
    pub lab_type: Option<String>,
    #[serde(default)]
    pub capacity: u32,
}

impl Room {
    pub fn lab_subtype(&self) -> Option<&str> {
        self.lab_type.as_deref().filter(|t| !t.is_empty())
    }
}

/// A cohort of students that attends together.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "sectionID")]
    pub section_id: SectionId,
    #[serde(rename = "groupID")]
    pub group_id: GroupId,
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default)]
    pub student_count: u32,
    #[serde(default, alias = "courses")]
    pub assigned_courses: Vec<CourseId>,
}

fn default_year() -> i32 {
    1
}

/// Optional explicit group membership. When present this overrides the
/// membership derived from each section's `groupID`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    #[serde(rename = "groupID")]
    pub group_id: GroupId,
    #[serde(default = "default_year")]
    #[allow(dead_code)]
    pub year: i32,
    #[serde(default)]
    pub sections: Vec<SectionId>,
}

/// The complete input for one scheduling request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInput {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub instructors: Vec<Instructor>,
    #[serde(default)]
    pub tas: Vec<Ta>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Per-teacher data shared by instructors and TAs.
#[derive(Debug, Clone)]
pub struct TeacherInfo {
    pub name: String,
    pub unavailable: HashSet<usize>,
}

/// Lookup tables rebuilt for every request.
#[derive(Debug, Clone)]
pub struct Indexes {
    pub section_index: HashMap<SectionId, usize>,
    pub group_sections: HashMap<GroupId, Vec<usize>>,
    pub year_sections: HashMap<i32, Vec<usize>>,
    pub courses: HashMap<CourseId, Course>,
    pub teachers: HashMap<TeacherId, TeacherInfo>,
}

impl Indexes {
    pub fn build(input: &SchedulingInput) -> Self {
        let section_index: HashMap<SectionId, usize> = input
            .sections
            .iter()
            .enumerate()
            .map(|(i, s)| (s.section_id.clone(), i))
            .collect();

        let group_sections = if input.groups.is_empty() {
            input
                .sections
                .iter()
                .enumerate()
                .map(|(i, s)| (s.group_id.clone(), i))
                .into_group_map()
        } else {
            input
                .groups
                .iter()
                .flat_map(|g| {
                    let section_index = &section_index;
                    g.sections.iter().filter_map(move |sid| {
                        section_index.get(sid).map(|&i| (g.group_id.clone(), i))
                    })
                })
                .into_group_map()
        };

        let year_sections = input
            .sections
            .iter()
            .enumerate()
            .map(|(i, s)| (s.year, i))
            .into_group_map();

        let courses = input
            .courses
            .iter()
            .map(|c| (c.course_id.clone(), c.clone()))
            .collect();

        let mut teachers = HashMap::new();
        for inst in &input.instructors {
            teachers.insert(
                inst.instructor_id.clone(),
                TeacherInfo {
                    name: inst.name.clone(),
                    unavailable: inst.unavailable_time_slots.iter().copied().collect(),
                },
            );
        }
        for ta in &input.tas {
            teachers.insert(
                ta.ta_id.clone(),
                TeacherInfo {
                    name: ta.name.clone(),
                    unavailable: ta.unavailable_time_slots.iter().copied().collect(),
                },
            );
        }

        Self {
            section_index,
            group_sections,
            year_sections,
            courses,
            teachers,
        }
    }
}

/// Per-request solver policy. Owned by the request handler so concurrent
/// requests never share mutable state.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Courses scheduled before everything else.
    pub hard_course_ids: HashSet<CourseId>,
    /// Courses that take no room; their placements carry the empty room.
    pub roomless_course_ids: HashSet<CourseId>,
    /// Restrict multi-slot placements to start slots that are multiples of
    /// their duration. Off unless explicitly requested.
    pub align_to_duration: bool,
    pub time_budget: Duration,
    pub max_iterations: u64,
    /// Extra attempts with a reshuffled variable order after a failure.
    pub retry_attempts: usize,
    pub retry_seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let fixed: HashSet<CourseId> = ["GRAD1", "GRAD2"].iter().map(|s| s.to_string()).collect();
        Self {
            hard_course_ids: fixed.clone(),
            roomless_course_ids: fixed,
            align_to_duration: false,
            time_budget: Duration::from_secs(60),
            max_iterations: 5_000_000,
            retry_attempts: 0,
            retry_seed: None,
        }
    }
}
