use cdag_types::ChunkId;
use serde::Deserialize;
use serde_json::Value;

/// Parses a payload into the ordered list of chunks it builds upon.
///
/// Implementations must be pure and deterministic and must not perform I/O:
/// they run inline on every store.
pub trait ChildrenExtractor: Send + Sync {
    fn children(&self, payload: &[u8]) -> Vec<ChunkId>;
}

/// Treats every payload as a leaf.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoChildren;

impl ChildrenExtractor for NoChildren {
    fn children(&self, _payload: &[u8]) -> Vec<ChunkId> {
        Vec::new()
    }
}

/// Finds `chunk:<64 hex>` strings inside JSON payloads.
///
/// The document is walked depth-first in source order (array elements by
/// index, object members as written) and every string value in reference
/// form is reported, duplicates included. Object keys are not references.
/// Payloads that are not JSON have no children.
///
/// Nesting depth is not limited by the parser; the payload size bound of the
/// manager is what keeps it small.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonReferenceExtractor;

impl ChildrenExtractor for JsonReferenceExtractor {
    fn children(&self, payload: &[u8]) -> Vec<ChunkId> {
        let Some(value) = parse_json(payload) else {
            return Vec::new();
        };
        collect_references(&value)
    }
}

fn parse_json(payload: &[u8]) -> Option<Value> {
    let mut de = serde_json::Deserializer::from_slice(payload);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de).ok()?;
    de.end().ok()?;
    Some(value)
}

fn collect_references(root: &Value) -> Vec<ChunkId> {
    let mut out = Vec::new();
    let mut pending = vec![root];
    while let Some(value) = pending.pop() {
        match value {
            Value::String(s) => {
                if let Some(id) = ChunkId::parse_reference(s) {
                    out.push(id);
                }
            }
            // Pushed in reverse so they pop in document order.
            Value::Array(items) => pending.extend(items.iter().rev()),
            Value::Object(members) => pending.extend(members.values().rev()),
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }
    out
}
