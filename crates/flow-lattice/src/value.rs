//! Lattice values, optionally paired with an element of a state lattice.
//!
//! A value of a product lattice `L × S` is written `first:second` in policy
//! text, e.g. `IPAddress:Truncated`. Internally the two halves are kept in
//! separate fields; the `:` encoding only exists at the text boundary
//! ([`FromStr`] and [`Display`](fmt::Display)).

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

use crate::lattice::{BOTTOM, TOP};

/// Separator between the base and state halves of a product value.
pub const PRODUCT_SEPARATOR: char = ':';

/// An element of a lattice, possibly paired with an element of its state lattice.
///
/// A missing state component stands for the state lattice's `TOP`, so
/// `UniqueID` and `UniqueID:TOP` are the same value. [`Value::product`]
/// normalizes the latter into the former.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Value {
    base: String,
    state: Option<String>,
}

impl Value {
    /// A plain element of a single lattice.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            state: None,
        }
    }

    /// A product value. A `TOP` state is dropped.
    pub fn product(base: impl Into<String>, state: impl Into<String>) -> Self {
        let state = state.into();
        Self {
            base: base.into(),
            state: (state != TOP).then_some(state),
        }
    }

    /// The top element.
    pub fn top() -> Self {
        Self::new(TOP)
    }

    /// The bottom element.
    pub fn bottom() -> Self {
        Self::new(BOTTOM)
    }

    /// The element of the base lattice.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The element of the state lattice, if one was given.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// The element of the state lattice, `TOP` when none was given.
    pub fn state_or_top(&self) -> &str {
        self.state.as_deref().unwrap_or(TOP)
    }

    /// Whether this value carries a state component.
    pub fn is_product(&self) -> bool {
        self.state.is_some()
    }

    /// Whether either component is `BOTTOM`.
    pub fn is_bottom(&self) -> bool {
        self.base == BOTTOM || self.state.as_deref() == Some(BOTTOM)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        match text.split_once(PRODUCT_SEPARATOR) {
            Some((base, state)) => Self::product(base, state),
            None => Self::new(text),
        }
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl FromStr for Value {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            Some(state) => write!(f, "{}{}{}", self.base, PRODUCT_SEPARATOR, state),
            None => f.write_str(&self.base),
        }
    }
}

#[cfg(feature = "serde")]
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
