use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;

use serde_json::{Value, json};

/// Shared reference to an entity, compared and hashed by identity.
///
/// Two students named `s0` are still two different students.
pub struct Handle<T>(Rc<T>);

pub type StudentRef = Handle<Student>;
pub type CourseRef = Handle<Course>;
pub type AttendsRef = Handle<Attends>;

impl<T> Handle<T> {
    pub fn new(value: T) -> Self {
        Handle(Rc::new(value))
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Handle(Rc::clone(&self.0))
    }
}

impl<T> Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.0), state);
    }
}

impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl<T: fmt::Display> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

#[derive(Debug)]
pub struct Student {
    name: String,
}

impl Student {
    pub fn new(name: impl Into<String>) -> StudentRef {
        Handle::new(Student { name: name.into() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `["Student", {"name": ...}]`
    pub fn as_tree(&self) -> Value {
        json!(["Student", { "name": self.name }])
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Student({})", self.name)
    }
}

#[derive(Debug)]
pub struct Course {
    name: String,
}

impl Course {
    pub fn new(name: impl Into<String>) -> CourseRef {
        Handle::new(Course { name: name.into() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `["Course", {"name": ...}]`
    pub fn as_tree(&self) -> Value {
        json!(["Course", { "name": self.name }])
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Course({})", self.name)
    }
}

/// An enrollment fact. Never mutated; an update builds a new one.
#[derive(Debug)]
pub struct Attends {
    student: StudentRef,
    course: CourseRef,
}

impl Attends {
    pub fn new(student: StudentRef, course: CourseRef) -> AttendsRef {
        Handle::new(Attends { student, course })
    }

    pub fn student(&self) -> &StudentRef {
        &self.student
    }

    pub fn course(&self) -> &CourseRef {
        &self.course
    }

    /// `["Attends", {"student": <student tree>, "course": <course tree>}]`
    pub fn as_tree(&self) -> Value {
        json!(["Attends", {
            "student": self.student.as_tree(),
            "course": self.course.as_tree(),
        }])
    }
}

impl fmt::Display for Attends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ATTENDS {}", self.student, self.course)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn same_name_students_are_distinct() {
        let a = Student::new("s0");
        let b = Student::new("s0");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());

        let set: HashSet<StudentRef> = [a.clone(), b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_forms() {
        let s = Student::new("s1");
        let c = Course::new("c2");
        assert_eq!(s.to_string(), "Student(s1)");
        assert_eq!(c.to_string(), "Course(c2)");
        assert_eq!(Attends::new(s, c).to_string(), "Student(s1) ATTENDS Course(c2)");
    }

    #[test]
    fn attends_tree_nests_entity_trees() {
        let a = Attends::new(Student::new("s0"), Course::new("c3"));
        let tree = a.as_tree();
        assert_eq!(tree[0], "Attends");
        assert_eq!(tree[1]["student"], json!(["Student", {"name": "s0"}]));
        assert_eq!(tree[1]["course"], json!(["Course", {"name": "c3"}]));
    }

    #[test]
    fn equal_trees_for_distinct_entities() {
        let a = Attends::new(Student::new("s0"), Course::new("c0"));
        let b = Attends::new(Student::new("s0"), Course::new("c0"));
        assert_ne!(a, b);
        assert_eq!(a.as_tree(), b.as_tree());
    }
}
