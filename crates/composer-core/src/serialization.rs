//! Document snapshot serialization.
//!
//! Snapshots are flat JSON: `{ schemaVersion, rootId, nodes }`. Saving is a
//! plain serde encode; loading validates the top-level structure before
//! accepting, so a caller can distinguish "not a document at all" from a
//! parse error and decide whether to fall back to an empty document.
//!
//! Validation is deliberately shallow — the presence and types of the
//! top-level fields plus the root entry. The rest of the tree is taken as
//! is; callers that need a guarantee run `Document::check_invariants`.

use crate::model::Document;
use std::fmt;

/// Why a snapshot was rejected on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The text is not valid JSON, or the node map has the wrong shape.
    Parse(String),
    /// The top level is not a JSON object.
    NotAnObject,
    /// A required top-level field is missing or has the wrong type.
    MissingField(&'static str),
    /// `nodes` has no entry for `rootId`.
    DanglingRoot(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(reason) => write!(f, "invalid document JSON: {reason}"),
            Self::NotAnObject => write!(f, "document must be a JSON object"),
            Self::MissingField(field) => {
                write!(f, "document is missing required field `{field}`")
            }
            Self::DanglingRoot(root_id) => {
                write!(f, "root node `{root_id}` is not present in `nodes`")
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Encode a document as pretty-printed JSON.
#[must_use]
pub fn serialize_document(doc: &Document) -> String {
    serde_json::to_string_pretty(doc).expect("a Document always serializes to JSON")
}

/// Parse and structurally validate a document snapshot.
pub fn deserialize_document(text: &str) -> Result<Document, LoadError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| LoadError::Parse(e.to_string()))?;
    let object = value.as_object().ok_or(LoadError::NotAnObject)?;

    if !object
        .get("schemaVersion")
        .is_some_and(serde_json::Value::is_number)
    {
        return Err(LoadError::MissingField("schemaVersion"));
    }
    let root_id = object
        .get("rootId")
        .and_then(serde_json::Value::as_str)
        .ok_or(LoadError::MissingField("rootId"))?;
    let nodes = object
        .get("nodes")
        .and_then(serde_json::Value::as_object)
        .ok_or(LoadError::MissingField("nodes"))?;
    if !nodes.contains_key(root_id) {
        return Err(LoadError::DanglingRoot(root_id.to_string()));
    }

    serde_json::from_value(value).map_err(|e| LoadError::Parse(e.to_string()))
}

/// Like `deserialize_document`, but fall back to a fresh empty document on
/// failure instead of surfacing the error.
#[must_use]
pub fn deserialize_document_or_default(text: &str) -> Document {
    match deserialize_document(text) {
        Ok(doc) => doc,
        Err(err) => {
            log::warn!("document load failed, starting empty: {err}");
            Document::new()
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::model::{Node, Position, Size};
    use pretty_assertions::assert_eq;

    fn sample_document() -> Document {
        let mut doc = Document::new();
        let id = NodeId::intern("btn1");
        let mut button = Node::new(id, "Button", Position::new(12.0, 8.0), Size::new(100.0, 40.0));
        button.props.insert("label".into(), "Save".into());
        button.props.insert("disabled".into(), false.into());
        button.locked = Some(true);
        doc.nodes.insert(id, button);
        doc.nodes
            .get_mut(&doc.root_id)
            .unwrap()
            .children
            .as_mut()
            .unwrap()
            .push(id);
        doc
    }

    #[test]
    fn round_trip_preserves_content() {
        let doc = sample_document();
        let text = serialize_document(&doc);
        let back = deserialize_document(&text).expect("round trip should parse");
        assert_eq!(back, doc);
    }

    #[test]
    fn wire_shape_matches_contract() {
        let doc = sample_document();
        let value: serde_json::Value = serde_json::from_str(&serialize_document(&doc)).unwrap();

        assert_eq!(value["schemaVersion"], serde_json::json!(1));
        assert_eq!(value["rootId"], serde_json::json!("root"));
        let button = &value["nodes"]["btn1"];
        assert_eq!(button["type"], serde_json::json!("Button"));
        assert_eq!(button["position"]["x"], serde_json::json!(12.0));
        assert_eq!(button["props"]["label"], serde_json::json!("Save"));
        assert_eq!(button["locked"], serde_json::json!(true));
        // Absent optionals are omitted, not null.
        assert!(button.get("children").is_none());
        assert!(button.get("visible").is_none());
    }

    #[test]
    fn load_rejects_non_json() {
        assert!(matches!(
            deserialize_document("not json at all"),
            Err(LoadError::Parse(_))
        ));
    }

    #[test]
    fn load_rejects_non_object() {
        assert_eq!(deserialize_document("[1, 2]"), Err(LoadError::NotAnObject));
    }

    #[test]
    fn load_rejects_missing_fields() {
        assert_eq!(
            deserialize_document(r#"{ "rootId": "root", "nodes": {} }"#),
            Err(LoadError::MissingField("schemaVersion"))
        );
        assert_eq!(
            deserialize_document(r#"{ "schemaVersion": 1, "nodes": {} }"#),
            Err(LoadError::MissingField("rootId"))
        );
        assert_eq!(
            deserialize_document(r#"{ "schemaVersion": 1, "rootId": "root" }"#),
            Err(LoadError::MissingField("nodes"))
        );
        // Wrong type counts as missing
        assert_eq!(
            deserialize_document(r#"{ "schemaVersion": "1", "rootId": "root", "nodes": {} }"#),
            Err(LoadError::MissingField("schemaVersion"))
        );
    }

    #[test]
    fn load_rejects_dangling_root() {
        assert_eq!(
            deserialize_document(r#"{ "schemaVersion": 1, "rootId": "root", "nodes": {} }"#),
            Err(LoadError::DanglingRoot("root".to_string()))
        );
    }

    #[test]
    fn fallback_returns_fresh_document() {
        let doc = deserialize_document_or_default("{ broken");
        assert_eq!(doc.schema_version, crate::model::SCHEMA_VERSION);
        assert!(doc.root().is_some());
        assert!(doc.root().unwrap().children().is_empty());
    }
}
