use std::collections::HashSet;

use crate::errors::BenchError;
use crate::model::{Attends, AttendsRef, Course, CourseRef, Student, StudentRef};

/// The in-memory dataset: entity sets for querying, plus ordered lists
/// used for positional lookup during setup and updates.
#[derive(Debug, Default)]
pub struct World {
    student_list: Vec<StudentRef>,
    course_list: Vec<CourseRef>,
    attends_list: Vec<AttendsRef>,
    students: HashSet<StudentRef>,
    courses: HashSet<CourseRef>,
    attends: HashSet<AttendsRef>,
}

impl World {
    /// Create `n` students `s<i>` and `n` courses `c<i>`, then one Attends
    /// per `[student, course]` pair in `init_att`.
    pub fn populate(n: usize, init_att: &[[usize; 2]]) -> Result<World, BenchError> {
        let mut world = World {
            student_list: Vec::with_capacity(n),
            course_list: Vec::with_capacity(n),
            attends_list: Vec::with_capacity(init_att.len()),
            students: HashSet::with_capacity(n),
            courses: HashSet::with_capacity(n),
            attends: HashSet::with_capacity(init_att.len()),
        };

        for i in 0..n {
            let s = Student::new(format!("s{}", i));
            world.students.insert(s.clone());
            world.student_list.push(s);

            let c = Course::new(format!("c{}", i));
            world.courses.insert(c.clone());
            world.course_list.push(c);
        }

        for &[si, ci] in init_att {
            let a = Attends::new(world.student(si)?.clone(), world.course(ci)?.clone());
            world.attends.insert(a.clone());
            world.attends_list.push(a);
        }

        Ok(world)
    }

    pub fn student(&self, index: usize) -> Result<&StudentRef, BenchError> {
        self.student_list.get(index).ok_or(BenchError::IndexOutOfRange {
            what: "Student",
            index,
            len: self.student_list.len(),
        })
    }

    pub fn course(&self, index: usize) -> Result<&CourseRef, BenchError> {
        self.course_list.get(index).ok_or(BenchError::IndexOutOfRange {
            what: "Course",
            index,
            len: self.course_list.len(),
        })
    }

    /// The fixed course every query runs against: the first one created.
    pub fn course0(&self) -> Result<&CourseRef, BenchError> {
        self.course_list.first().ok_or(BenchError::NoCourses)
    }

    pub fn attends_at(&self, index: usize) -> Option<&AttendsRef> {
        self.attends_list.get(index)
    }

    pub fn attends_len(&self) -> usize {
        self.attends_list.len()
    }

    pub fn students(&self) -> &HashSet<StudentRef> {
        &self.students
    }

    pub fn courses(&self) -> &HashSet<CourseRef> {
        &self.courses
    }

    pub fn attends(&self) -> &HashSet<AttendsRef> {
        &self.attends
    }

    /// Swap the Attends at `index` for a fresh `Attends(student, course)`.
    ///
    /// The new record enters the set before the old one leaves, and the
    /// list slot is overwritten in the same call. Returns the old record.
    ///
    /// Panics if `index` is out of range; `ops::encode_ops` checks indices
    /// before the loop starts.
    pub fn replace_attends(
        &mut self,
        index: usize,
        student: &StudentRef,
        course: &CourseRef,
    ) -> AttendsRef {
        let new_att = Attends::new(student.clone(), course.clone());
        self.attends.insert(new_att.clone());
        let old_att = std::mem::replace(&mut self.attends_list[index], new_att);
        self.attends.remove(&old_att);
        old_att
    }
}
