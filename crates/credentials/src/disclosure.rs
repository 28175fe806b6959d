use serde_json::Value;
use thiserror::Error;

/// Errors raised while partitioning a credential for selective disclosure.
#[derive(Debug, Error)]
pub enum DisclosureError {
    /// A pointer did not start with `/`.
    #[error("pointer {0:?} must begin with '/'")]
    InvalidPointer(String),

    /// A pointer did not resolve against the supplied document.
    #[error("pointer {0:?} does not resolve against the credential")]
    UnresolvedPointer(String),

    /// The same pointer appeared in both the mandatory and selective sets.
    #[error("pointer {0:?} is listed as both mandatory and selective")]
    ConflictingPointer(String),
}

/// A credential split into a mandatory (always-disclosed) fragment and a map
/// of selectively-disclosable fragments keyed by pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosurePartition {
    /// The document with every selective pointer's value removed.
    pub mandatory: Value,
    /// Each selective pointer's original value, keyed by the pointer itself.
    pub selective: Vec<(String, Value)>,
}

/// Partition `document` into a mandatory remainder and a set of selectively
/// disclosable fragments named by `selective` JSON Pointers.
///
/// `mandatory` pointers are validated (must resolve, must be well-formed) but
/// are not removed from the result; they exist so a caller can assert a
/// field can never be hidden. `selective` pointers are removed from
/// `mandatory` and returned individually.
///
/// # Errors
/// [`DisclosureError::InvalidPointer`] if a pointer does not begin with `/`;
/// [`DisclosureError::UnresolvedPointer`] if a pointer does not resolve
/// against `document`; [`DisclosureError::ConflictingPointer`] if a pointer
/// appears in both lists.
pub fn partition_pointers(
    document: &Value,
    mandatory: &[String],
    selective: &[String],
) -> Result<DisclosurePartition, DisclosureError> {
    for pointer in mandatory.iter().chain(selective.iter()) {
        if !pointer.starts_with('/') {
            return Err(DisclosureError::InvalidPointer(pointer.clone()));
        }
        if document.pointer(pointer).is_none() {
            return Err(DisclosureError::UnresolvedPointer(pointer.clone()));
        }
    }
    for pointer in selective {
        if mandatory.contains(pointer) {
            return Err(DisclosureError::ConflictingPointer(pointer.clone()));
        }
    }

    let mut remainder = document.clone();
    let mut extracted = Vec::with_capacity(selective.len());
    for pointer in selective {
        let value = take_at_pointer(&mut remainder, pointer)
            .ok_or_else(|| DisclosureError::UnresolvedPointer(pointer.clone()))?;
        extracted.push((pointer.clone(), value));
    }

    Ok(DisclosurePartition { mandatory: remainder, selective: extracted })
}

/// Remove and return the value at `pointer`, replacing it with `Value::Null`
/// in its parent. `serde_json::Value` has no `pointer_mut`-remove, so this
/// walks to the parent and takes the child directly.
fn take_at_pointer(document: &mut Value, pointer: &str) -> Option<Value> {
    let (parent_pointer, key) = pointer.rsplit_once('/')?;
    let parent = if parent_pointer.is_empty() {
        document
    } else {
        document.pointer_mut(parent_pointer)?
    };

    match parent {
        Value::Object(map) => map.get_mut(key).map(std::mem::take),
        Value::Array(list) => {
            let index: usize = key.parse().ok()?;
            list.get_mut(index).map(std::mem::take)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_selective_fields_and_leaves_mandatory_intact() {
        let doc = json!({"id": "urn:uuid:1", "credentialSubject": {"ssn": "111-22-3333", "name": "Ada"}});
        let partition = partition_pointers(
            &doc,
            &["/id".to_string()],
            &["/credentialSubject/ssn".to_string()],
        )
        .unwrap();

        assert_eq!(partition.mandatory["credentialSubject"]["ssn"], Value::Null);
        assert_eq!(partition.mandatory["credentialSubject"]["name"], "Ada");
        assert_eq!(partition.selective, vec![("/credentialSubject/ssn".to_string(), json!("111-22-3333"))]);
    }

    #[test]
    fn rejects_pointer_without_leading_slash() {
        let doc = json!({"id": "x"});
        let err = partition_pointers(&doc, &[], &["id".to_string()]).unwrap_err();
        assert!(matches!(err, DisclosureError::InvalidPointer(_)));
    }

    #[test]
    fn rejects_unresolved_pointer() {
        let doc = json!({"id": "x"});
        let err = partition_pointers(&doc, &[], &["/missing".to_string()]).unwrap_err();
        assert!(matches!(err, DisclosureError::UnresolvedPointer(_)));
    }

    #[test]
    fn rejects_pointer_listed_in_both_sets() {
        let doc = json!({"id": "x"});
        let pointer = "/id".to_string();
        let err =
            partition_pointers(&doc, &[pointer.clone()], &[pointer]).unwrap_err();
        assert!(matches!(err, DisclosureError::ConflictingPointer(_)));
    }
}
