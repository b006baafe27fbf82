//! ALLOW/DENY information-flow policies with nested EXCEPT carve-outs.
//!
//! ## Language
//!
//! ```text
//! Policy := ("ALLOW" | "DENY") Clause ("EXCEPT" "{" Policy+ "}")?
//! Clause := (LatticeName LatticeValue)*
//! ```
//!
//! Every policy inside an `EXCEPT` block has the opposite mode of its
//! parent. A clause may name the same lattice several times; the values
//! then act as alternatives.
//!
//! ## Evaluation
//!
//! - `ALLOW c EXCEPT { ... }` permits an annotation when, for every
//!   lattice, its values fall under the values of `c`, and no exception
//!   revokes it.
//! - `DENY c EXCEPT { ... }` forbids an annotation that overlaps `c` in
//!   every lattice, unless some exception permits the *overlap*. An
//!   exception never sees the raw outer annotation.
//!
//! ## Example
//!
//! ```rust
//! use flow_lattice::{Lattice, PolicyParser, Registry};
//!
//! let data_type = Lattice::from_json(r#"{ "name": "DataType",
//!     "edges": { "UniqueID": ["AccountID", "IPAddress"], "Location": ["IPAddress"] } }"#)?;
//! let parser = PolicyParser::new(Registry::new([data_type])?);
//!
//! // Allow everything except the use of IPAddress and AccountID together.
//! let policy = parser.parse(
//!     "ALLOW DataType TOP EXCEPT { DENY DataType IPAddress DataType AccountID }",
//! )?;
//!
//! assert!(policy.apply_on(&parser.parse_annotation("DataType IPAddress")?));
//! assert!(!policy.apply_on(&parser.parse_annotation("DataType IPAddress DataType AccountID")?));
//! # Ok::<(), flow_lattice::Error>(())
//! ```

mod eval;
mod parse;
mod token;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::LatticeError;
use crate::lattice::Lattice;
use crate::value::Value;

pub use eval::Decision;
pub use parse::PolicyParser;

/// Keyword opening a permitting policy.
pub const ALLOW: &str = "ALLOW";
/// Keyword opening a forbidding policy.
pub const DENY: &str = "DENY";
/// Keyword introducing the exception block.
pub const EXCEPT: &str = "EXCEPT";
/// Reserved words of the policy language.
pub const KEYWORDS: [&str; 3] = [ALLOW, DENY, EXCEPT];

/// Whether a policy permits or forbids what its clause matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Mode {
    /// `ALLOW`
    Allow,
    /// `DENY`
    Deny,
}

impl Mode {
    /// The mode every exception of a policy with this mode must have.
    pub fn opposite(self) -> Self {
        match self {
            Mode::Allow => Mode::Deny,
            Mode::Deny => Mode::Allow,
        }
    }

    /// The keyword spelling of this mode.
    pub fn keyword(self) -> &'static str {
        match self {
            Mode::Allow => ALLOW,
            Mode::Deny => DENY,
        }
    }

    /// Parse a keyword. Keywords are case-sensitive.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            ALLOW => Some(Mode::Allow),
            DENY => Some(Mode::Deny),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One attribute: a lattice name and a value from that lattice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Pair {
    /// The lattice name.
    pub name: String,
    /// An element (or product value) of that lattice.
    pub value: Value,
}

impl Pair {
    /// Create a pair.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.value)
    }
}

/// An ordered list of attributes.
///
/// Duplicate names are allowed: `DataType IPAddress DataType AccountID`
/// constrains the `DataType` dimension with two values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Clause(Vec<Pair>);

/// A clause used as the label of data or a program element.
pub type Annotation = Clause;

impl Clause {
    /// An empty clause.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair.
    pub fn push(&mut self, pair: Pair) {
        self.0.push(pair);
    }

    /// The values given for lattice `name`, in order.
    pub fn values_of(&self, name: &str) -> Vec<Value> {
        self.0
            .iter()
            .filter(|p| p.name == name)
            .map(|p| p.value.clone())
            .collect()
    }

    /// All pairs, in order.
    pub fn pairs(&self) -> &[Pair] {
        &self.0
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the clause has no pairs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Pair> for Clause {
    fn from_iter<I: IntoIterator<Item = Pair>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pair) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", pair)?;
        }
        Ok(())
    }
}

/// The lattices a policy is written against, keyed by name.
///
/// Cloning a registry is cheap: every policy node of a tree holds a handle
/// to the same read-only map.
#[derive(Debug, Clone)]
pub struct Registry {
    lattices: Arc<BTreeMap<String, Arc<Lattice>>>,
}

impl Registry {
    /// Build a registry. Needs at least one lattice and unique names.
    pub fn new<I, L>(lattices: I) -> Result<Self, LatticeError>
    where
        I: IntoIterator<Item = L>,
        L: Into<Arc<Lattice>>,
    {
        let mut map = BTreeMap::new();
        for lattice in lattices {
            let lattice: Arc<Lattice> = lattice.into();
            let name = lattice.name().to_string();
            if map.insert(name.clone(), lattice).is_some() {
                return Err(LatticeError::DuplicateName(name));
            }
        }
        if map.is_empty() {
            return Err(LatticeError::EmptyRegistry);
        }
        Ok(Self {
            lattices: Arc::new(map),
        })
    }

    /// Look up a lattice by name.
    pub fn get(&self, name: &str) -> Option<&Lattice> {
        self.lattices.get(name).map(Arc::as_ref)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lattices.keys().map(String::as_str)
    }

    /// `(name, lattice)` pairs, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Lattice)> {
        self.lattices
            .iter()
            .map(|(name, lattice)| (name.as_str(), lattice.as_ref()))
    }

    /// Number of lattices.
    pub fn len(&self) -> usize {
        self.lattices.len()
    }

    /// Whether the registry holds no lattices.
    pub fn is_empty(&self) -> bool {
        self.lattices.is_empty()
    }

    /// Whether two registries share the same underlying map.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.lattices, &other.lattices)
    }
}

/// A parsed policy tree.
///
/// Only [`PolicyParser`] creates policies, and only when the whole text is
/// valid, so every tree is complete: except children have the opposite mode
/// and all nodes share one [`Registry`].
#[derive(Debug, Clone)]
pub struct Policy {
    mode: Mode,
    clause: Clause,
    excepts: Vec<Policy>,
    registry: Registry,
}

impl Policy {
    /// `ALLOW` or `DENY`.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The attributes this rule matches.
    pub fn clause(&self) -> &Clause {
        &self.clause
    }

    /// Exceptions, each of the opposite mode.
    pub fn excepts(&self) -> &[Policy] {
        &self.excepts
    }

    /// The lattices this policy is evaluated against.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Nesting depth: 1 for a policy without exceptions.
    pub fn depth(&self) -> usize {
        1 + self.excepts.iter().map(Policy::depth).max().unwrap_or(0)
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{}", self.mode)?;
        if !self.clause.is_empty() {
            write!(f, " {}", self.clause)?;
        }
        if self.excepts.is_empty() {
            return Ok(());
        }
        f.write_str(" EXCEPT {\n")?;
        for except in &self.excepts {
            write!(f, "{:width$}", "", width = (indent + 1) * 2)?;
            except.write_indented(f, indent + 1)?;
            f.write_str("\n")?;
        }
        write!(f, "{:width$}}}", "", width = indent * 2)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
