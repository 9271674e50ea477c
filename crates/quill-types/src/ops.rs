//! Character operations.
//!
//! Every edit that crosses the wire is one [`Operation`]: insert a character
//! after its anchor, or delete a character by identity. A [`Batch`] is an
//! ordered list of them; order is significant from the translator that
//! produces it to the replica that integrates it.
//!
//! Wire shape (one JSON object per operation):
//!
//! ```text
//! { "operationKind": "Insert" | "Delete",
//!   "character": { "value": "x",
//!                  "identity": { "siteId": 1, "counter": 4 },
//!                  "anchor": { "siteId": 2, "counter": 3 } | null } }
//! ```

use serde::{Deserialize, Serialize};

use crate::{CharId, WireError};

/// An ordered group of operations sent or received as one message.
pub type Batch = Vec<Operation>;

/// Discriminant carried on the wire as `operationKind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum OperationKind {
    Insert,
    Delete,
}

/// One character as the replica knows it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Char {
    /// The character itself (one Unicode scalar value).
    pub value: char,
    /// Who inserted it.
    pub identity: CharId,
    /// The character it was inserted after. `None` = start of document.
    #[serde(default)]
    pub anchor: Option<CharId>,
}

impl Char {
    pub fn new(value: char, identity: CharId, anchor: Option<CharId>) -> Self {
        Self {
            value,
            identity,
            anchor,
        }
    }
}

/// An insert or a delete of a single character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireOperation", into = "WireOperation")]
pub enum Operation {
    Insert(Char),
    Delete(Char),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Insert(_) => OperationKind::Insert,
            Operation::Delete(_) => OperationKind::Delete,
        }
    }

    pub fn character(&self) -> &Char {
        match self {
            Operation::Insert(c) | Operation::Delete(c) => c,
        }
    }

    pub fn identity(&self) -> CharId {
        self.character().identity
    }

    /// Serialize to the wire shape.
    pub fn encode(&self) -> Result<serde_json::Value, WireError> {
        serde_json::to_value(self).map_err(WireError::Encode)
    }

    /// Parse one serialized operation.
    pub fn decode(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Operation::deserialize(value)
    }
}

/// The flat struct that actually crosses the wire.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOperation {
    operation_kind: OperationKind,
    character: Char,
}

impl From<WireOperation> for Operation {
    fn from(wire: WireOperation) -> Self {
        match wire.operation_kind {
            OperationKind::Insert => Operation::Insert(wire.character),
            OperationKind::Delete => Operation::Delete(wire.character),
        }
    }
}

impl From<Operation> for WireOperation {
    fn from(op: Operation) -> Self {
        let operation_kind = op.kind();
        let character = match op {
            Operation::Insert(c) | Operation::Delete(c) => c,
        };
        WireOperation {
            operation_kind,
            character,
        }
    }
}

/// Encode a batch, preserving order.
pub fn encode_batch(ops: &[Operation]) -> Result<Vec<serde_json::Value>, WireError> {
    ops.iter().map(Operation::encode).collect()
}

/// Decode a whole batch or nothing.
///
/// The first undecodable entry fails the batch and reports its index, so a
/// caller never integrates a prefix of a corrupt message.
pub fn decode_batch(raw: &[serde_json::Value]) -> Result<Batch, WireError> {
    raw.iter()
        .enumerate()
        .map(|(index, value)| {
            Operation::decode(value).map_err(|source| WireError::MalformedOperation { index, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SiteId;
    use serde_json::json;

    fn id(site: u32, counter: u64) -> CharId {
        CharId::new(SiteId::new(site), counter)
    }

    #[test]
    fn test_insert_wire_shape() {
        let op = Operation::Insert(Char::new('x', id(1, 4), Some(id(2, 3))));
        let value = op.encode().unwrap();
        assert_eq!(
            value,
            json!({
                "operationKind": "Insert",
                "character": {
                    "value": "x",
                    "identity": { "siteId": 1, "counter": 4 },
                    "anchor": { "siteId": 2, "counter": 3 }
                }
            })
        );
        assert_eq!(Operation::decode(&value).unwrap(), op);
    }

    #[test]
    fn test_delete_without_anchor_field() {
        let value = json!({
            "operationKind": "Delete",
            "character": { "value": "b", "identity": { "siteId": 5, "counter": 1 } }
        });
        let op = Operation::decode(&value).unwrap();
        assert_eq!(op.kind(), OperationKind::Delete);
        assert_eq!(op.identity(), id(5, 1));
        assert_eq!(op.character().anchor, None);
    }

    #[test]
    fn test_decode_batch_reports_failing_index() {
        let good = Operation::Insert(Char::new('a', id(1, 1), None)).encode().unwrap();
        let bad = json!({ "operationKind": "Insert", "character": { "value": "too long" } });

        let err = decode_batch(&[good.clone(), bad]).unwrap_err();
        assert!(matches!(err, WireError::MalformedOperation { index: 1, .. }));

        let ok = decode_batch(&[good]).unwrap();
        assert_eq!(ok.len(), 1);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let value = json!({
            "operationKind": "Move",
            "character": { "value": "a", "identity": { "siteId": 1, "counter": 1 } }
        });
        assert!(Operation::decode(&value).is_err());
    }

    #[test]
    fn test_encode_batch_preserves_order() {
        let ops = vec![
            Operation::Delete(Char::new('q', id(1, 1), None)),
            Operation::Insert(Char::new('r', id(1, 2), None)),
        ];
        let encoded = encode_batch(&ops).unwrap();
        assert_eq!(encoded[0]["operationKind"], "Delete");
        assert_eq!(encoded[1]["operationKind"], "Insert");
        assert_eq!(decode_batch(&encoded).unwrap(), ops);
    }
}
