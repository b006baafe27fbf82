//! Lattice specifications in JSON.
//!
//! # Format
//!
//! ```json
//! {
//!   "name": "DataType",
//!   "edges": {
//!     "UniqueID": ["AccountID", "IPAddress"],
//!     "Birthday": [],
//!     "Location": ["IPAddress"]
//!   }
//! }
//! ```
//!
//! Each key lists the immediate children of an element; an empty list makes
//! the key a singleton between `TOP` and `BOTTOM`. A JSON array of such
//! objects defines several lattices at once.
//!
//! # Loading
//!
//! ```rust
//! use flow_lattice::Lattice;
//!
//! let lattices = Lattice::many_from_json(r#"[
//!     { "name": "DataType", "edges": { "Location": ["IPAddress"] } },
//!     { "name": "Purpose",  "edges": { "Sharing": [] } }
//! ]"#)?;
//! assert_eq!(lattices.len(), 2);
//! assert_eq!(lattices[1].name(), "Purpose");
//! # Ok::<(), flow_lattice::LatticeError>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LatticeError;
use crate::lattice::Lattice;

/// The serde model of one lattice specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatticeSpec {
    /// Lattice name (required).
    pub name: String,

    /// Element → immediate children (required, may be empty).
    pub edges: BTreeMap<String, Vec<String>>,
}

impl LatticeSpec {
    /// Parse one specification object.
    pub fn from_json(json: &str) -> Result<Self, LatticeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the lattice described by this specification.
    pub fn build(self) -> Result<Lattice, LatticeError> {
        Lattice::from_edges(self.name, self.edges)
    }
}

impl Lattice {
    /// Build a lattice from a JSON specification object.
    pub fn from_json(json: &str) -> Result<Self, LatticeError> {
        LatticeSpec::from_json(json)?.build()
    }

    /// Build lattices from a JSON array of specification objects.
    ///
    /// A single object is accepted too and yields one lattice. Any invalid
    /// entry fails the whole call.
    pub fn many_from_json(json: &str) -> Result<Vec<Self>, LatticeError> {
        let specs = if json.trim_start().starts_with('{') {
            vec![LatticeSpec::from_json(json)?]
        } else {
            serde_json::from_str::<Vec<LatticeSpec>>(json)?
        };
        specs.into_iter().map(LatticeSpec::build).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{BOTTOM, TOP};

    #[test]
    fn test_from_json() {
        let lattice = Lattice::from_json(
            r#"{
                "name": "DataType",
                "edges": {
                    "UniqueID": ["AccountID", "IPAddress"],
                    "Birthday": [],
                    "Location": ["IPAddress"]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(lattice.name(), "DataType");
        assert_eq!(lattice.edges().len(), 9);
        assert_eq!(lattice.children_of(&[TOP]), vec!["Birthday", "Location", "UniqueID"]);
        assert_eq!(lattice.parents_of(&[BOTTOM]), vec!["AccountID", "Birthday", "IPAddress"]);
    }

    #[test]
    fn test_many_from_json() {
        let lattices = Lattice::many_from_json(
            r#"[
                {"name": "DataType", "edges": { "Location": ["IPAddress"]}},
                {"name": "Purpose", "edges": { "Sharing": [] } }
            ]"#,
        )
        .unwrap();
        assert_eq!(lattices.len(), 2);
        assert_eq!(lattices[0].name(), "DataType");
        assert_eq!(lattices[0].edges().len(), 3);
        assert_eq!(lattices[1].name(), "Purpose");
        assert_eq!(lattices[1].edges().len(), 2);
    }

    #[test]
    fn test_many_from_json_accepts_single_object() {
        let lattices =
            Lattice::many_from_json(r#"{"name": "Purpose", "edges": {"Sharing": []}}"#).unwrap();
        assert_eq!(lattices.len(), 1);
    }

    #[test]
    fn test_missing_fields_are_errors() {
        assert!(matches!(
            Lattice::from_json(r#"{"edges": {}}"#),
            Err(LatticeError::Json(_))
        ));
        assert!(matches!(
            Lattice::from_json(r#"{"name": "DataType"}"#),
            Err(LatticeError::Json(_))
        ));
        assert!(matches!(
            Lattice::from_json(r#"{"name": "DataType", "edges": {"A": "B"}}"#),
            Err(LatticeError::Json(_))
        ));
        assert!(matches!(
            Lattice::many_from_json(r#"[{"name": "DataType"}]"#),
            Err(LatticeError::Json(_))
        ));
        assert!(matches!(Lattice::from_json("not json"), Err(LatticeError::Json(_))));
    }

    #[test]
    fn test_invalid_entry_fails_the_batch() {
        let err = Lattice::many_from_json(
            r#"[
                {"name": "DataType", "edges": {"A": ["B"]}},
                {"name": "Loop", "edges": {"X": ["Y"], "Y": ["X"]}}
            ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, LatticeError::Cycle { .. }));
    }

    #[test]
    fn test_spec_roundtrips_through_json() {
        let spec = LatticeSpec::from_json(r#"{"name": "Purpose", "edges": {"Sharing": []}}"#).unwrap();
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"name":"Purpose","edges":{"Sharing":[]}}"#);
    }
}
