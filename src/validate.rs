use std::collections::HashSet;

use crate::data::SchedulingInput;

/// Checks that a request is not provably unsolvable before any search state
/// is built. Returns one human-readable diagnostic per defect; an empty list
/// means the input passed.
///
/// Mutates nothing. A non-empty result is a fatal error for the request.
pub fn validate(input: &SchedulingInput) -> Vec<String> {
    let mut errors = Vec::new();

    let known: HashSet<&str> = input
        .courses
        .iter()
        .map(|c| c.course_id.as_str())
        .collect();

    for section in &input.sections {
        for course_id in &section.assigned_courses {
            if !known.contains(course_id.as_str()) {
                errors.push(format!(
                    "Section {} is assigned unknown course: {}",
                    section.section_id, course_id
                ));
            }
        }
    }

    for course in &input.courses {
        let has_teacher = input
            .instructors
            .iter()
            .any(|i| i.qualified_courses.contains(&course.course_id))
            || input
                .tas
                .iter()
                .any(|t| t.qualified_courses.contains(&course.course_id));
        if !has_teacher {
            errors.push(format!(
                "Course {} ({}) has no qualified instructors or TAs",
                course.course_id, course.course_name
            ));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;

    #[test]
    fn clean_input_passes() {
        let input = InputBuilder::new()
            .course(lecture("CS101", 1))
            .instructor(instructor("I1", &["CS101"]))
            .room(room("R1", crate::data::CourseKind::Lecture, 100))
            .section(section("S1", "G1", 1, 30, &["CS101"]))
            .build();
        assert!(validate(&input).is_empty());
    }

    #[test]
    fn unknown_course_reference_is_reported() {
        let input = InputBuilder::new()
            .course(lecture("CS101", 1))
            .instructor(instructor("I1", &["CS101"]))
            .section(section("S1", "G1", 1, 30, &["CS999"]))
            .build();
        let errors = validate(&input);
        assert_eq!(
            errors,
            vec!["Section S1 is assigned unknown course: CS999".to_string()]
        );
    }

    #[test]
    fn course_without_any_teacher_is_reported() {
        let input = InputBuilder::new()
            .course(lecture("CS101", 1))
            .section(section("S1", "G1", 1, 30, &["CS101"]))
            .build();
        let errors = validate(&input);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("has no qualified instructors or TAs"));
        assert!(errors[0].contains("CS101"));
    }

    #[test]
    fn ta_qualification_counts() {
        let input = InputBuilder::new()
            .course(tutorial("CS101T", 1))
            .ta(ta("T1", &["CS101T"]))
            .section(section("S1", "G1", 1, 30, &["CS101T"]))
            .build();
        assert!(validate(&input).is_empty());
    }

    #[test]
    fn all_defects_are_collected() {
        let input = InputBuilder::new()
            .course(lecture("CS101", 1))
            .section(section("S1", "G1", 1, 30, &["CS101", "CS888"]))
            .section(section("S2", "G1", 1, 30, &["CS999"]))
            .build();
        let errors = validate(&input);
        assert_eq!(errors.len(), 3);
    }
}
