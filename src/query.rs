use std::collections::HashSet;

use serde_json::{Value, json};

use crate::model::{AttendsRef, CourseRef, StudentRef};
use crate::types::CachePolicy;
use crate::world::World;

/// The query side of a benchmark run, injected into the driver.
///
/// `query` is what gets timed. Its result must not depend on the caching
/// policy; `format_output` turns it into a canonical JSON value for
/// verify traces.
pub trait QueryEngine {
    type Output;

    fn query(&mut self, world: &World, course: &CourseRef) -> Self::Output;

    fn format_output(&self, output: &Self::Output) -> Value;
}

/// Sort rows by their serialized text so traces from different runs and
/// policies compare equal regardless of set iteration order.
fn canonical(mut rows: Vec<Value>) -> Value {
    rows.sort_by_cached_key(|row| row.to_string());
    Value::Array(rows)
}

fn attending<'a>(world: &'a World, course: &'a CourseRef) -> impl Iterator<Item = &'a AttendsRef> {
    world.attends().iter().filter(move |a| a.course().ptr_eq(course))
}

/// `{a for a in ATTENDS if a.course == course}`
#[derive(Debug, Clone)]
pub struct AttendsQuery {
    policy: CachePolicy,
}

impl AttendsQuery {
    pub fn new(policy: CachePolicy) -> Self {
        AttendsQuery { policy }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }
}

impl QueryEngine for AttendsQuery {
    type Output = HashSet<AttendsRef>;

    fn query(&mut self, world: &World, course: &CourseRef) -> Self::Output {
        attending(world, course).cloned().collect()
    }

    fn format_output(&self, output: &Self::Output) -> Value {
        canonical(output.iter().map(|a| a.as_tree()).collect())
    }
}

/// `{(a, s) for a in ATTENDS for s in STUDENTS if a.course == course if a.student == s}`
#[derive(Debug, Clone)]
pub struct AttendsStudentQuery {
    policy: CachePolicy,
}

impl AttendsStudentQuery {
    pub fn new(policy: CachePolicy) -> Self {
        AttendsStudentQuery { policy }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }
}

impl QueryEngine for AttendsStudentQuery {
    type Output = HashSet<(AttendsRef, StudentRef)>;

    fn query(&mut self, world: &World, course: &CourseRef) -> Self::Output {
        attending(world, course)
            .filter_map(|a| {
                world
                    .students()
                    .get(a.student())
                    .map(|s| (a.clone(), s.clone()))
            })
            .collect()
    }

    fn format_output(&self, output: &Self::Output) -> Value {
        canonical(
            output
                .iter()
                .map(|(a, s)| json!([a.as_tree(), s.as_tree()]))
                .collect(),
        )
    }
}

/// `{(a, s, c) for a in ATTENDS for s in STUDENTS for c in COURSES
///   if a.course == course if a.student == s if a.course == c}`
#[derive(Debug, Clone)]
pub struct AttendsStudentCourseQuery {
    policy: CachePolicy,
}

impl AttendsStudentCourseQuery {
    pub fn new(policy: CachePolicy) -> Self {
        AttendsStudentCourseQuery { policy }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }
}

impl QueryEngine for AttendsStudentCourseQuery {
    type Output = HashSet<(AttendsRef, StudentRef, CourseRef)>;

    fn query(&mut self, world: &World, course: &CourseRef) -> Self::Output {
        attending(world, course)
            .filter_map(|a| {
                let s = world.students().get(a.student())?;
                let c = world.courses().get(a.course())?;
                Some((a.clone(), s.clone(), c.clone()))
            })
            .collect()
    }

    fn format_output(&self, output: &Self::Output) -> Value {
        canonical(
            output
                .iter()
                .map(|(a, s, c)| json!([a.as_tree(), s.as_tree(), c.as_tree()]))
                .collect(),
        )
    }
}
