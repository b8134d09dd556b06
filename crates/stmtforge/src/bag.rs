//! Property-bag reading shared by `Field`, `OrderField`, `QueryField` and `QueryGroup`.
//!
//! A bag is any `serde::Serialize` value that serializes to an object: a plain
//! struct, a `serde_json::json!({...})` literal or a map. Member order is the
//! declaration/insertion order (`serde_json` is built with `preserve_order`).

use crate::error::{StmtError, StmtResult};
use serde::Serialize;

/// Read the ordered `(name, value)` members of a bag.
pub(crate) fn members<T>(bag: &T) -> StmtResult<Vec<(String, serde_json::Value)>>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(bag)?;
    let map = match value {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(StmtError::invalid_operation(format!(
                "expected an object-like bag, got {}",
                kind_of(&other)
            )));
        }
    };
    if map.is_empty() {
        return Err(StmtError::invalid_operation(
            "the bag does not have any readable members",
        ));
    }
    Ok(map.into_iter().collect())
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Person {
        id: i64,
        name: &'static str,
        age: Option<i32>,
    }

    #[test]
    fn struct_members_keep_declaration_order() {
        let bag = Person {
            id: 1,
            name: "x",
            age: None,
        };
        let names: Vec<String> = members(&bag).unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["id", "name", "age"]);
    }

    #[test]
    fn json_literal_keeps_insertion_order() {
        let bag = serde_json::json!({ "Zeta": 1, "Alpha": 2 });
        let names: Vec<String> = members(&bag).unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["Zeta", "Alpha"]);
    }

    #[test]
    fn scalar_bag_is_rejected() {
        assert!(members(&42).unwrap_err().is_invalid_operation());
        assert!(members("text").unwrap_err().is_invalid_operation());
    }

    #[test]
    fn empty_bag_is_rejected() {
        #[derive(Serialize)]
        struct Nothing {}
        assert!(members(&Nothing {}).unwrap_err().is_invalid_operation());
    }
}
