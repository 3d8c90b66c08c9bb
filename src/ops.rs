use serde_json::Value;

use crate::errors::BenchError;
use crate::model::{CourseRef, StudentRef};
use crate::world::World;

/// An operation resolved against live entities, ready for the timed loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Query against the fixed reference course.
    Query,
    /// Replace the Attends at `index` with `Attends(student, course)`.
    Update {
        index: usize,
        student: StudentRef,
        course: CourseRef,
    },
}

/// Resolve the raw `OPS` list into `Op`s.
///
/// Every tag comparison and index lookup happens here, once, so the
/// execution loop only matches on the enum.
pub fn encode_ops(raw: &[Value], world: &World) -> Result<Vec<Op>, BenchError> {
    raw.iter()
        .enumerate()
        .map(|(position, entry)| encode_op(position, entry, world))
        .collect()
}

fn encode_op(position: usize, entry: &Value, world: &World) -> Result<Op, BenchError> {
    let malformed = |detail: &str| BenchError::MalformedOp {
        position,
        detail: detail.to_string(),
    };

    let items = entry
        .as_array()
        .ok_or_else(|| malformed("expected an array"))?;
    let kind = items
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("first element must be the operation kind string"))?;

    match kind {
        "query" => Ok(Op::Query),
        "update" => {
            let payload = items
                .get(1)
                .and_then(Value::as_array)
                .filter(|p| p.len() == 3)
                .ok_or_else(|| malformed("update payload must be [attends, student, course]"))?;

            let mut indices = [0usize; 3];
            for (slot, value) in indices.iter_mut().zip(payload) {
                *slot = value
                    .as_u64()
                    .and_then(|v| usize::try_from(v).ok())
                    .ok_or_else(|| malformed("update indices must be non-negative integers"))?;
            }
            let [index, si, ci] = indices;

            if index >= world.attends_len() {
                return Err(BenchError::IndexOutOfRange {
                    what: "Attends",
                    index,
                    len: world.attends_len(),
                });
            }

            Ok(Op::Update {
                index,
                student: world.student(si)?.clone(),
                course: world.course(ci)?.clone(),
            })
        }
        other => Err(BenchError::UnknownOpKind {
            position,
            kind: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn world() -> World {
        World::populate(3, &[[0, 0], [1, 1]]).unwrap()
    }

    #[test]
    fn encodes_query_and_update() {
        let world = world();
        let raw = vec![json!(["query"]), json!(["update", [1, 2, 0]])];
        let ops = encode_ops(&raw, &world).unwrap();

        assert_eq!(ops[0], Op::Query);
        match &ops[1] {
            Op::Update { index, student, course } => {
                assert_eq!(*index, 1);
                assert!(student.ptr_eq(world.student(2).unwrap()));
                assert!(course.ptr_eq(world.course(0).unwrap()));
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn encoding_twice_gives_identical_ops() {
        let world = world();
        let raw = vec![
            json!(["update", [0, 1, 2]]),
            json!(["query"]),
            json!(["update", [1, 0, 0]]),
        ];
        let first = encode_ops(&raw, &world).unwrap();
        let second = encode_ops(&raw, &world).unwrap();
        // Op equality compares entity identity, not names.
        assert_eq!(first, second);
    }

    #[test]
    fn encoding_against_another_world_differs() {
        let raw = vec![json!(["update", [0, 1, 2]])];
        let a = encode_ops(&raw, &world()).unwrap();
        let b = encode_ops(&raw, &world()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_list_encodes_to_empty() {
        assert!(encode_ops(&[], &world()).unwrap().is_empty());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let raw = vec![json!(["query"]), json!(["delete", [0, 0, 0]])];
        let err = encode_ops(&raw, &world()).unwrap_err();
        match err {
            BenchError::UnknownOpKind { position, kind } => {
                assert_eq!(position, 1);
                assert_eq!(kind, "delete");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn non_array_entry_is_malformed() {
        let err = encode_ops(&[json!("query")], &world()).unwrap_err();
        assert!(matches!(err, BenchError::MalformedOp { position: 0, .. }));
    }

    #[test]
    fn short_update_payload_is_malformed() {
        let err = encode_ops(&[json!(["update", [0, 1]])], &world()).unwrap_err();
        assert!(matches!(err, BenchError::MalformedOp { .. }));
    }

    #[test]
    fn negative_index_is_malformed() {
        let err = encode_ops(&[json!(["update", [0, -1, 0]])], &world()).unwrap_err();
        assert!(matches!(err, BenchError::MalformedOp { .. }));
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let world = world();

        let err = encode_ops(&[json!(["update", [2, 0, 0]])], &world).unwrap_err();
        assert!(matches!(err, BenchError::IndexOutOfRange { what: "Attends", index: 2, len: 2 }));

        let err = encode_ops(&[json!(["update", [0, 3, 0]])], &world).unwrap_err();
        assert!(matches!(err, BenchError::IndexOutOfRange { what: "Student", index: 3, .. }));

        let err = encode_ops(&[json!(["update", [0, 0, 9]])], &world).unwrap_err();
        assert!(matches!(err, BenchError::IndexOutOfRange { what: "Course", index: 9, .. }));
    }
}
