//! # Flow Lattice
//!
//! Information-flow policies over classification lattices.
//!
//! ## Lattices
//!
//! Data is classified along independent dimensions (what kind of data it is,
//! what it is used for, how it has been processed). Each dimension is a
//! finite lattice whose elements are ordered from general to specific:
//!
//! ```text
//! a ≤ b      a is b or a more specific classification below b
//! a ∧ b      meet: the most general classification below both
//! a ∨ b      join: the most specific classification above both
//! TOP, BOTTOM  synthesized greatest and least elements
//! ```
//!
//! Two lattices can be composed into a product `L × S`, whose values are
//! written `first:second` (e.g. `IPAddress:Truncated`).
//!
//! ## Policies
//!
//! ```text
//! ALLOW DataType TOP EXCEPT {
//!     DENY DataType IPAddress DataType AccountID
//! }
//! ```
//!
//! A policy is an `ALLOW` or `DENY` rule over name/value pairs with nested
//! `EXCEPT` blocks of the opposite mode. Policies are evaluated against
//! *annotations*, the labels attached to data or program elements.
//!
//! ## Quick Start
//!
//! ```rust
//! use flow_lattice::{Decision, Lattice, PolicyParser, Registry};
//!
//! let lattices = Lattice::many_from_json(r#"[
//!     { "name": "DataType",
//!       "edges": { "UniqueID": ["AccountID", "IPAddress"], "Location": ["IPAddress"] } },
//!     { "name": "Purpose", "edges": { "Sharing": [], "Analytics": [] } }
//! ]"#)?;
//! let parser = PolicyParser::new(Registry::new(lattices)?);
//!
//! let policy = parser.parse("DENY DataType UniqueID EXCEPT { ALLOW DataType IPAddress }")?;
//!
//! let ip = parser.parse_annotation("DataType IPAddress Purpose Analytics")?;
//! let account = parser.parse_annotation("DataType AccountID")?;
//! assert_eq!(policy.decide(&ip), Decision::Allow);
//! assert_eq!(policy.decide(&account), Decision::Deny);
//! # Ok::<(), flow_lattice::Error>(())
//! ```
//!
//! Lattices, registries and policies are immutable once built and can be
//! shared freely between threads.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
mod lattice;
pub mod policy;
mod spec;
mod value;

pub use error::{Error, LatticeError, ParseError, Position, Result};
pub use lattice::{Edge, Lattice, BOTTOM, TOP};
pub use policy::{Annotation, Clause, Decision, Mode, Pair, Policy, PolicyParser, Registry};
pub use spec::LatticeSpec;
pub use value::{Value, PRODUCT_SEPARATOR};
