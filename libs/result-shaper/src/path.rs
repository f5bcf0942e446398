use serde_json::Value;

use crate::error::ShapeError;

/// Resolve a dot-notation path against a JSON value.
///
/// Each hop must exist: an object member by name, or an array element by
/// numeric index. A missing hop reports the first segment that failed.
pub fn resolve_path<'a>(data: &'a Value, path: &str) -> Result<&'a Value, ShapeError> {
    let mut current = data;
    for segment in segments(path) {
        current = step(current, segment).ok_or_else(|| not_found(path, segment))?;
    }
    Ok(current)
}

/// Mutable counterpart of [`resolve_path`].
pub fn resolve_path_mut<'a>(data: &'a mut Value, path: &str) -> Result<&'a mut Value, ShapeError> {
    let mut current = data;
    for segment in segments(path) {
        current = match current {
            Value::Object(map) => map.get_mut(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
            _ => None,
        }
        .ok_or_else(|| not_found(path, segment))?;
    }
    Ok(current)
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').map(str::trim).filter(|s| !s.is_empty())
}

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn not_found(path: &str, segment: &str) -> ShapeError {
    ShapeError::PathNotFound {
        path: path.to_string(),
        segment: segment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn walks_nested_objects_and_arrays() {
        let item = json!({"datasetReference": {"datasetId": "sales"}, "tags": ["a", "b"]});
        assert_eq!(resolve_path(&item, "datasetReference.datasetId").unwrap(), "sales");
        assert_eq!(resolve_path(&item, "tags.1").unwrap(), "b");
        assert_eq!(resolve_path(&item, "").unwrap(), &item);
    }

    #[test]
    fn reports_failing_segment() {
        let item = json!({"datasetReference": {"projectId": "p"}});
        let err = resolve_path(&item, "datasetReference.datasetId").unwrap_err();
        assert_eq!(
            err,
            ShapeError::PathNotFound {
                path: "datasetReference.datasetId".into(),
                segment: "datasetId".into(),
            }
        );
    }

    #[test]
    fn scalar_has_no_members() {
        let item = json!({"id": "proj"});
        assert!(resolve_path(&item, "id.name").is_err());
    }

    #[test]
    fn mutable_resolution_rewrites_in_place() {
        let mut item = json!({"tableReference": {"tableId": "t"}});
        *resolve_path_mut(&mut item, "tableReference.tableId").unwrap() = json!("u");
        assert_eq!(item, json!({"tableReference": {"tableId": "u"}}));
    }
}
