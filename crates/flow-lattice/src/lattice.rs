//! Finite classification lattices built from covering edges.
//!
//! A lattice is described by the immediate parent → child relation between
//! its elements. `TOP` and `BOTTOM` never need to be written down: they are
//! synthesized while the lattice is built.
//!
//! ```text
//! { "name": "DataType",
//!   "edges": { "UniqueID": ["AccountID", "IPAddress"],
//!              "Location": ["IPAddress"] } }
//!
//!               TOP
//!              /   \
//!       UniqueID   Location
//!           /   \    /
//!   AccountID   IPAddress
//!          \     /
//!          BOTTOM
//! ```
//!
//! Edges are never transitively closed, so meet, join and precede walk the
//! graph one level at a time.
//!
//! # Product lattices
//!
//! A second lattice can be attached as the *state* of a lattice with
//! [`Lattice::product`]. Values such as `IPAddress:Truncated` then live in
//! `DataType × TypeState`, and every operation works component-wise.
//!
//! ```rust
//! use std::sync::Arc;
//! use flow_lattice::{Lattice, Value};
//!
//! let mut data_type = Lattice::from_edges(
//!     "DataType",
//!     [("UniqueID", vec!["AccountID", "IPAddress"]), ("Location", vec!["IPAddress"])],
//! )?;
//! let state = Lattice::from_edges("TypeState", [("Truncated", vec!["Redacted"])])?;
//! data_type.product(Arc::new(state));
//!
//! let joined = data_type.join(&Value::from("AccountID:Truncated"), &Value::from("UniqueID:Redacted"));
//! assert_eq!(joined.to_string(), "UniqueID:Truncated");
//! # Ok::<(), flow_lattice::LatticeError>(())
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::LatticeError;
use crate::policy::KEYWORDS;
use crate::value::{Value, PRODUCT_SEPARATOR};

/// The greatest element of every lattice.
pub const TOP: &str = "TOP";

/// The least element of every lattice.
pub const BOTTOM: &str = "BOTTOM";

/// A covering relation: `to` is an immediate child of `from`.
///
/// `from` is the more general classification, `to` the more specific one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Edge {
    /// The parent element.
    pub from: String,
    /// The child element.
    pub to: String,
}

impl Edge {
    /// Create an edge from `from` down to `to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Toward `BOTTOM` (meet).
    Down,
    /// Toward `TOP` (join).
    Up,
}

impl Direction {
    fn limit(self) -> &'static str {
        match self {
            Direction::Down => BOTTOM,
            Direction::Up => TOP,
        }
    }

    fn reverse(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
        }
    }
}

/// A named finite partial order with a unique `TOP` and `BOTTOM`.
///
/// Lattices are immutable once built, apart from a single [`product`]
/// call which must happen before the lattice is shared. After that the
/// lattice is usually wrapped in an [`Arc`] and read from any number of
/// threads.
///
/// [`product`]: Lattice::product
#[derive(Debug, Clone)]
pub struct Lattice {
    name: String,
    edges: Vec<Edge>,
    state: Option<Arc<Lattice>>,
}

impl Lattice {
    /// Build a lattice from a map of element → immediate children.
    ///
    /// - an element mapped to no children is a singleton between `TOP` and `BOTTOM`;
    /// - every element that is nobody's child gets `TOP` as its parent;
    /// - every child that has no children of its own gets `BOTTOM` as its child.
    ///
    /// Repeated keys are merged. Fails when the name is empty, an element
    /// cannot be written in policy text, or the edges contain a cycle.
    pub fn from_edges<I, K, V>(name: impl Into<String>, edges: I) -> Result<Self, LatticeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LatticeError::EmptyName);
        }

        let mut covers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (from, tos) in edges {
            covers
                .entry(from.into())
                .or_default()
                .extend(tos.into_iter().map(Into::into));
        }

        let mut explicit = Vec::new();
        let mut singletons = Vec::new();
        for (from, tos) in covers {
            validate_element(&name, &from)?;
            if tos.is_empty() {
                singletons.push(from);
                continue;
            }
            for to in tos {
                validate_element(&name, &to)?;
                explicit.push(Edge::new(from.clone(), to));
            }
        }

        let (roots, leaves) = {
            let froms: BTreeSet<&str> = explicit.iter().map(|e| e.from.as_str()).collect();
            let tos: BTreeSet<&str> = explicit.iter().map(|e| e.to.as_str()).collect();
            let roots: Vec<String> = froms
                .difference(&tos)
                .filter(|e| **e != TOP)
                .map(|e| e.to_string())
                .collect();
            let leaves: Vec<String> = tos
                .difference(&froms)
                .filter(|e| **e != BOTTOM)
                .map(|e| e.to_string())
                .collect();
            (roots, leaves)
        };

        let mut all = explicit;
        all.extend(roots.into_iter().map(|root| Edge::new(TOP, root)));
        all.extend(leaves.into_iter().map(|leaf| Edge::new(leaf, BOTTOM)));
        for single in singletons {
            if single != TOP {
                all.push(Edge::new(TOP, single.clone()));
            }
            if single != BOTTOM {
                all.push(Edge::new(single, BOTTOM));
            }
        }
        if all.is_empty() {
            all.push(Edge::new(TOP, BOTTOM));
        }

        let mut seen = HashSet::new();
        all.retain(|edge| seen.insert(edge.clone()));
        check_acyclic(&name, &all)?;

        debug!(lattice = %name, edges = all.len(), "built lattice");
        Ok(Self {
            name,
            edges: all,
            state: None,
        })
    }

    /// The lattice name, used as the attribute name in policy text.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All covering edges, including the synthesized `TOP`/`BOTTOM` ones.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The attached state lattice, if any.
    pub fn state(&self) -> Option<&Lattice> {
        self.state.as_deref()
    }

    /// Attach `state` as the second component of a product lattice.
    ///
    /// Values written `first:second` are then interpreted as pairs of
    /// (element of `self`, element of `state`). The state lattice is shared,
    /// not copied.
    pub fn product(&mut self, state: impl Into<Arc<Lattice>>) {
        let state = state.into();
        debug!(lattice = %self.name, state = %state.name, "attached state lattice");
        self.state = Some(state);
    }

    /// Every element of the lattice, sorted, `TOP` and `BOTTOM` included.
    pub fn elements(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .edges
            .iter()
            .flat_map(|e| [e.from.as_str(), e.to.as_str()])
            .collect();
        set.into_iter().collect()
    }

    /// Whether `element` appears on either side of any edge.
    pub fn contains(&self, element: &str) -> bool {
        self.element(element).is_some()
    }

    /// Whether both components of `value` belong to this lattice
    /// (the state component to the attached state lattice).
    pub fn contains_value(&self, value: &Value) -> bool {
        if !self.contains(value.base()) {
            return false;
        }
        match (value.state(), self.state()) {
            (None, _) => true,
            (Some(state), Some(lattice)) => lattice.contains(state),
            (Some(_), None) => false,
        }
    }

    /// Resolve `element` to the copy stored in this lattice.
    fn element(&self, element: &str) -> Option<&str> {
        self.edges.iter().find_map(|e| {
            if e.from == element {
                Some(e.from.as_str())
            } else if e.to == element {
                Some(e.to.as_str())
            } else {
                None
            }
        })
    }

    /// Immediate children of a set of elements, deduplicated and sorted.
    pub fn children_of<'s>(&'s self, nodes: &[&str]) -> Vec<&'s str> {
        self.neighbours(nodes, Direction::Down)
    }

    /// Immediate parents of a set of elements, deduplicated and sorted.
    pub fn parents_of<'s>(&'s self, nodes: &[&str]) -> Vec<&'s str> {
        self.neighbours(nodes, Direction::Up)
    }

    fn neighbours<'s>(&'s self, nodes: &[&str], dir: Direction) -> Vec<&'s str> {
        let mut found: Vec<&'s str> = Vec::new();
        for edge in &self.edges {
            let (src, dst) = match dir {
                Direction::Down => (edge.from.as_str(), edge.to.as_str()),
                Direction::Up => (edge.to.as_str(), edge.from.as_str()),
            };
            if nodes.contains(&src) && !found.contains(&dst) {
                found.push(dst);
            }
        }
        found.sort_unstable();
        found
    }

    /// Greatest lower bound of `a` and `b`.
    ///
    /// Product values are met component-wise; the state half is met in the
    /// attached state lattice and dropped from the result when it is `TOP`.
    pub fn meet(&self, a: &Value, b: &Value) -> Value {
        self.combine(a, b, Direction::Down)
    }

    /// Least upper bound of `a` and `b`. Dual of [`meet`](Lattice::meet).
    pub fn join(&self, a: &Value, b: &Value) -> Value {
        self.combine(a, b, Direction::Up)
    }

    /// Whether `a ≤ b`: `a` is `b` or one of its descendants.
    ///
    /// For product values both components must precede.
    pub fn precede(&self, a: &Value, b: &Value) -> bool {
        match self.product_state(a, b) {
            Some(state) => {
                self.precedes(a.base(), b.base())
                    && state.precedes(a.state_or_top(), b.state_or_top())
            }
            None => self.precedes(a.base(), b.base()),
        }
    }

    /// Whether the annotation values all fall under some policy value.
    ///
    /// Every element of `annotation` must precede at least one element of
    /// `policy`. An empty annotation is always allowed.
    pub fn allow(&self, policy: &[Value], annotation: &[Value]) -> bool {
        annotation
            .iter()
            .all(|a| policy.iter().any(|p| self.precede(a, p)))
    }

    /// The intersection `T ⊓ T'` of two value lists.
    ///
    /// For every policy value `p` this is the join, over all annotation
    /// values `a`, of `p ∧ a`. Empty when `annotation` is empty.
    pub fn overlap(&self, policy: &[Value], annotation: &[Value]) -> Vec<Value> {
        if annotation.is_empty() {
            return Vec::new();
        }
        policy
            .iter()
            .map(|p| {
                annotation
                    .iter()
                    .map(|a| self.meet(p, a))
                    .reduce(|acc, m| self.join(&acc, &m))
                    .unwrap_or_else(Value::bottom)
            })
            .collect()
    }

    /// Whether a deny clause catches the annotation.
    ///
    /// True when no element of [`overlap`](Lattice::overlap) is bottom,
    /// i.e. every policy value shares some classification with the
    /// annotation. A product value counts as bottom when either half is.
    pub fn deny(&self, policy: &[Value], annotation: &[Value]) -> bool {
        !self
            .overlap(policy, annotation)
            .iter()
            .any(Value::is_bottom)
    }

    fn product_state(&self, a: &Value, b: &Value) -> Option<&Lattice> {
        self.state()
            .filter(|_| a.is_product() || b.is_product())
    }

    fn combine(&self, a: &Value, b: &Value, dir: Direction) -> Value {
        match self.product_state(a, b) {
            Some(state) => Value::product(
                self.bound_of(a.base(), b.base(), dir),
                state.bound_of(a.state_or_top(), b.state_or_top(), dir),
            ),
            None => Value::new(self.bound_of(a.base(), b.base(), dir)),
        }
    }

    fn bound_of(&self, a: &str, b: &str, dir: Direction) -> String {
        if a == b {
            return a.to_string();
        }
        match (self.element(a), self.element(b)) {
            (Some(a), Some(b)) => self.bound(a, b, dir).to_string(),
            _ => dir.limit().to_string(),
        }
    }

    /// Alternating frontier widening.
    ///
    /// Each round intersects the two frontiers; when they are disjoint the
    /// first frontier is widened by one level and the two are swapped.
    /// Frontiers only grow, so the walk ends at the latest when both reach
    /// the limit element.
    fn bound<'s>(&'s self, a: &'s str, b: &'s str, dir: Direction) -> &'s str {
        let mut first = vec![a];
        let mut second = vec![b];
        let mut stalled = 0;
        loop {
            let common: Vec<&'s str> = first
                .iter()
                .copied()
                .filter(|e| second.contains(e))
                .collect();
            match common.as_slice() {
                [] => {
                    let grown: Vec<&'s str> = self
                        .neighbours(&first, dir)
                        .into_iter()
                        .filter(|e| !first.contains(e))
                        .collect();
                    if grown.is_empty() {
                        stalled += 1;
                        if stalled > 1 {
                            return dir.limit();
                        }
                    } else {
                        stalled = 0;
                    }
                    trace!(lattice = %self.name, ?first, ?grown, "widening frontier");
                    let mut widened = first;
                    widened.extend(grown);
                    first = std::mem::replace(&mut second, widened);
                }
                [only] => return self.tighten(*only, a, b, dir),
                many => return self.tighten(self.pick(many, dir), a, b, dir),
            }
        }
    }

    /// Among several common bounds pick the tightest: for a meet the one
    /// every other candidate precedes, for a join the one preceding all others.
    fn pick<'s>(&self, candidates: &[&'s str], dir: Direction) -> &'s str {
        candidates
            .iter()
            .copied()
            .find(|c| {
                candidates.iter().all(|o| match dir {
                    Direction::Down => self.precedes(o, c),
                    Direction::Up => self.precedes(c, o),
                })
            })
            .or_else(|| candidates.first().copied())
            .unwrap_or(dir.limit())
    }

    /// Move a common bound toward `a` and `b` while it stays a common bound.
    ///
    /// The widening can meet on a deep common descendant before it reaches
    /// the true meet when the two operands sit on paths of unequal length.
    fn tighten<'s>(&'s self, mut bound: &'s str, a: &str, b: &str, dir: Direction) -> &'s str {
        loop {
            let next = self
                .neighbours(&[bound], dir.reverse())
                .into_iter()
                .find(|n| match dir {
                    Direction::Down => self.precedes(n, a) && self.precedes(n, b),
                    Direction::Up => self.precedes(a, n) && self.precedes(b, n),
                });
            match next {
                Some(n) => bound = n,
                None => return bound,
            }
        }
    }

    fn precedes(&self, a: &str, b: &str) -> bool {
        let mut frontier: Vec<&str> = vec![b];
        loop {
            if frontier.contains(&a) {
                return true;
            }
            if matches!(frontier.as_slice(), [] | [BOTTOM]) {
                return false;
            }
            frontier = self.children_of(&frontier);
        }
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(state) = &self.state {
            write!(f, " × {}", state.name)?;
        }
        f.write_str(":")?;
        for (i, edge) in self.edges.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}->{}", sep, edge.from, edge.to)?;
        }
        Ok(())
    }
}

fn validate_element(lattice: &str, element: &str) -> Result<(), LatticeError> {
    let reason = if element.is_empty() {
        "element is empty"
    } else if element.contains(PRODUCT_SEPARATOR) {
        "contains the product separator ':'"
    } else if element
        .chars()
        .any(|c| c.is_whitespace() || c == '{' || c == '}')
    {
        "contains whitespace or a brace"
    } else if KEYWORDS.contains(&element) {
        "is a policy keyword"
    } else {
        return Ok(());
    };
    Err(LatticeError::InvalidElement {
        lattice: lattice.to_string(),
        element: element.to_string(),
        reason,
    })
}

/// Kahn's algorithm; any element left with incoming edges sits on or below a cycle.
fn check_acyclic(lattice: &str, edges: &[Edge]) -> Result<(), LatticeError> {
    let mut indegree: BTreeMap<&str, usize> = BTreeMap::new();
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        indegree.entry(edge.from.as_str()).or_insert(0);
        *indegree.entry(edge.to.as_str()).or_insert(0) += 1;
        children
            .entry(edge.from.as_str())
            .or_default()
            .push(edge.to.as_str());
    }

    let mut ready: Vec<&str> = indegree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(e, _)| *e)
        .collect();
    let mut visited = 0;
    while let Some(node) = ready.pop() {
        visited += 1;
        for child in children.get(node).into_iter().flatten() {
            if let Some(d) = indegree.get_mut(*child) {
                *d -= 1;
                if *d == 0 {
                    ready.push(*child);
                }
            }
        }
    }

    if visited == indegree.len() {
        return Ok(());
    }
    let element = indegree
        .iter()
        .find(|(_, d)| **d > 0)
        .map(|(e, _)| e.to_string())
        .unwrap_or_default();
    Err(LatticeError::Cycle {
        lattice: lattice.to_string(),
        element,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Value {
        Value::from(text)
    }

    fn data_type() -> Lattice {
        let mut lattice = Lattice::from_edges(
            "DataType",
            [
                ("UniqueID", vec!["AccountID", "IPAddress"]),
                ("Birthday", vec![]),
                ("Location", vec!["IPAddress"]),
            ],
        )
        .unwrap();
        let state = Lattice::from_edges(
            "TypeState",
            [
                ("Encrypted", vec![]),
                ("Hashed", vec![]),
                ("Truncated", vec!["Redacted"]),
            ],
        )
        .unwrap();
        lattice.product(Arc::new(state));
        lattice
    }

    #[test]
    fn test_from_edges_synthesizes_top_and_bottom() {
        let lattice = data_type();
        assert_eq!(lattice.name(), "DataType");
        assert_eq!(lattice.edges().len(), 9);
        assert_eq!(lattice.state().map(Lattice::name), Some("TypeState"));
        assert!(lattice.edges().contains(&Edge::new(TOP, "UniqueID")));
        assert!(lattice.edges().contains(&Edge::new("AccountID", BOTTOM)));
        assert!(lattice.edges().contains(&Edge::new(TOP, "Birthday")));
        assert!(lattice.edges().contains(&Edge::new("Birthday", BOTTOM)));
    }

    #[test]
    fn test_single_edge_lattice() {
        let lattice = Lattice::from_edges("DataType", [("Location", vec!["IPAddress"])]).unwrap();
        assert_eq!(lattice.edges().len(), 3);

        let purpose = Lattice::from_edges("Purpose", [("Sharing", Vec::<&str>::new())]).unwrap();
        assert_eq!(purpose.edges().len(), 2);
    }

    #[test]
    fn test_empty_edges_connect_top_to_bottom() {
        let lattice = Lattice::from_edges("Empty", Vec::<(&str, Vec<&str>)>::new()).unwrap();
        assert_eq!(lattice.edges(), &[Edge::new(TOP, BOTTOM)]);
        assert!(lattice.precede(&Value::bottom(), &Value::top()));
    }

    #[test]
    fn test_explicit_top_is_not_duplicated() {
        let lattice = Lattice::from_edges("Level", [("TOP", vec!["Secret"])]).unwrap();
        assert_eq!(
            lattice.edges(),
            &[Edge::new(TOP, "Secret"), Edge::new("Secret", BOTTOM)]
        );
    }

    #[test]
    fn test_cycle_is_rejected() {
        let err = Lattice::from_edges("Loop", [("A", vec!["B"]), ("B", vec!["A"])]).unwrap_err();
        assert!(matches!(err, LatticeError::Cycle { .. }));

        let err = Lattice::from_edges("Loop", [("A", vec!["TOP"])]).unwrap_err();
        assert!(matches!(err, LatticeError::Cycle { .. }));
    }

    #[test]
    fn test_invalid_elements_are_rejected() {
        for bad in ["", "IP Address", "IP:Address", "{", "EXCEPT", "ALLOW"] {
            let err = Lattice::from_edges("DataType", [("UniqueID", vec![bad])]).unwrap_err();
            assert!(
                matches!(err, LatticeError::InvalidElement { .. }),
                "{bad:?} should be rejected"
            );
        }
        assert!(matches!(
            Lattice::from_edges(" ", [("A", vec!["B"])]),
            Err(LatticeError::EmptyName)
        ));
    }

    #[test]
    fn test_elements_and_contains() {
        let lattice = data_type();
        assert_eq!(
            lattice.elements(),
            vec!["AccountID", "BOTTOM", "Birthday", "IPAddress", "Location", "TOP", "UniqueID"]
        );
        assert!(lattice.contains("IPAddress"));
        assert!(!lattice.contains("Truncated"));
        assert!(lattice.contains_value(&v("IPAddress:Truncated")));
        assert!(!lattice.contains_value(&v("IPAddress:Salted")));
        assert!(!lattice.contains_value(&v("Email")));
    }

    #[test]
    fn test_children_of() {
        let lattice = data_type();
        assert_eq!(
            lattice.children_of(&[TOP]),
            vec!["Birthday", "Location", "UniqueID"]
        );
        assert_eq!(lattice.children_of(&["Location"]), vec!["IPAddress"]);
        assert_eq!(
            lattice.children_of(&["Location", "UniqueID"]),
            vec!["AccountID", "IPAddress"]
        );
    }

    #[test]
    fn test_parents_of() {
        let lattice = data_type();
        assert_eq!(lattice.parents_of(&["Location", "UniqueID"]), vec![TOP]);
        assert_eq!(
            lattice.parents_of(&["IPAddress"]),
            vec!["Location", "UniqueID"]
        );
    }

    #[test]
    fn test_meet() {
        let lattice = data_type();
        let cases = [
            ("AccountID", "UniqueID", "AccountID"),
            ("UniqueID", "AccountID", "AccountID"),
            ("AccountID", "TOP", "AccountID"),
            ("AccountID", "Location", "BOTTOM"),
            ("UniqueID", "Location", "IPAddress"),
            ("AccountID:Truncated", "UniqueID", "AccountID:Truncated"),
            ("AccountID:Truncated", "UniqueID:Redacted", "AccountID:Redacted"),
        ];
        for (a, b, want) in cases {
            assert_eq!(lattice.meet(&v(a), &v(b)).to_string(), want, "meet({a}, {b})");
        }
    }

    #[test]
    fn test_join() {
        let lattice = data_type();
        let cases = [
            ("AccountID", "UniqueID", "UniqueID"),
            ("AccountID", "TOP", "TOP"),
            ("AccountID", "Location", "TOP"),
            ("UniqueID", "BOTTOM", "UniqueID"),
            ("AccountID", "IPAddress", "UniqueID"),
            ("AccountID:Truncated", "UniqueID:Redacted", "UniqueID:Truncated"),
        ];
        for (a, b, want) in cases {
            assert_eq!(lattice.join(&v(a), &v(b)).to_string(), want, "join({a}, {b})");
        }
    }

    #[test]
    fn test_precede() {
        let lattice = data_type();
        let cases = [
            ("AccountID", "Location", false),
            ("AccountID", "UniqueID", true),
            ("AccountID", "TOP", true),
            ("BOTTOM", "BOTTOM", true),
            ("TOP", "AccountID", false),
            ("AccountID:Truncated", "UniqueID:Redacted", false),
            ("UniqueID:Redacted", "AccountID:Truncated", false),
            ("AccountID:Redacted", "UniqueID:Truncated", true),
        ];
        for (a, b, want) in cases {
            assert_eq!(lattice.precede(&v(a), &v(b)), want, "precede({a}, {b})");
        }
    }

    #[test]
    fn test_meet_on_paths_of_unequal_length() {
        // `c` is two levels below TOP through X but four through P, Q and a.
        let lattice = Lattice::from_edges(
            "Uneven",
            [
                ("X", vec!["c"]),
                ("P", vec!["Q"]),
                ("Q", vec!["a"]),
                ("a", vec!["c"]),
            ],
        )
        .unwrap();
        assert_eq!(lattice.meet(&v("a"), &Value::top()), v("a"));
        assert_eq!(lattice.join(&v("X"), &Value::bottom()), v("X"));
        assert_eq!(lattice.join(&v("c"), &v("Q")), v("Q"));
        assert_eq!(lattice.meet(&v("X"), &v("P")), v("c"));
    }

    #[test]
    fn test_unknown_elements_fall_to_the_limits() {
        let lattice = data_type();
        assert_eq!(lattice.meet(&v("Email"), &v("UniqueID")), Value::bottom());
        assert_eq!(lattice.join(&v("Email"), &v("UniqueID")), Value::top());
        assert!(!lattice.precede(&v("Email"), &v("TOP")));
        assert_eq!(lattice.meet(&v("Email"), &v("Email")), v("Email"));
    }

    #[test]
    fn test_allow() {
        let lattice = data_type();
        let cases: [(&[&str], &[&str], bool); 5] = [
            (&["IPAddress", "AccountID"], &["IPAddress"], true),
            (&["IPAddress"], &["TOP"], false),
            (&["UniqueID:Hashed"], &["UniqueID"], false),
            (&["UniqueID"], &["UniqueID:Hashed"], true),
            (&["IPAddress"], &[], true),
        ];
        for (policy, annotation, want) in cases {
            let policy: Vec<Value> = policy.iter().map(|s| v(s)).collect();
            let annotation: Vec<Value> = annotation.iter().map(|s| v(s)).collect();
            assert_eq!(lattice.allow(&policy, &annotation), want, "allow({policy:?}, {annotation:?})");
        }
    }

    #[test]
    fn test_overlap() {
        let lattice = data_type();
        let cases: [(&[&str], &[&str], &[&str]); 5] = [
            (&["IPAddress", "AccountID"], &["IPAddress"], &["IPAddress", "BOTTOM"]),
            (
                &["IPAddress", "AccountID"],
                &["IPAddress", "AccountID"],
                &["IPAddress", "AccountID"],
            ),
            (&["IPAddress"], &["IPAddress", "AccountID"], &["IPAddress"]),
            (&["UniqueID:Encrypted"], &["UniqueID:Hashed"], &["UniqueID:BOTTOM"]),
            (&["UniqueID"], &[], &[]),
        ];
        for (policy, annotation, want) in cases {
            let policy: Vec<Value> = policy.iter().map(|s| v(s)).collect();
            let annotation: Vec<Value> = annotation.iter().map(|s| v(s)).collect();
            let got: Vec<String> = lattice
                .overlap(&policy, &annotation)
                .iter()
                .map(Value::to_string)
                .collect();
            assert_eq!(got, want, "overlap({policy:?}, {annotation:?})");
        }
    }

    #[test]
    fn test_deny() {
        let lattice = data_type();
        let cases: [(&[&str], &[&str], bool); 5] = [
            (&["IPAddress", "AccountID"], &["IPAddress"], false),
            (&["IPAddress", "AccountID"], &["IPAddress", "AccountID"], true),
            (&["UniqueID:Hashed"], &["UniqueID"], true),
            (&["UniqueID"], &["UniqueID:Hashed"], true),
            (&["UniqueID:Encrypted"], &["UniqueID:Hashed"], false),
        ];
        for (policy, annotation, want) in cases {
            let policy: Vec<Value> = policy.iter().map(|s| v(s)).collect();
            let annotation: Vec<Value> = annotation.iter().map(|s| v(s)).collect();
            assert_eq!(lattice.deny(&policy, &annotation), want, "deny({policy:?}, {annotation:?})");
        }
    }

    #[test]
    fn test_display() {
        let lattice = Lattice::from_edges("Purpose", [("Sharing", Vec::<&str>::new())]).unwrap();
        assert_eq!(lattice.to_string(), "Purpose: TOP->Sharing, Sharing->BOTTOM");
        assert!(data_type().to_string().starts_with("DataType × TypeState: "));
    }

    #[test]
    fn test_lattice_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Lattice>();
    }
}
