//! Error types for lattice construction and policy parsing.
//!
//! Evaluation never fails: every algebra operation and [`Policy::apply_on`]
//! is total. Unknown names and values are rejected when text is parsed, so
//! they never reach the evaluator.
//!
//! [`Policy::apply_on`]: crate::Policy::apply_on

use std::fmt;

use thiserror::Error;

use crate::policy::Mode;

/// Result type for flow-lattice operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Any error produced by this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// A lattice or registry could not be built.
    #[error(transparent)]
    Lattice(#[from] LatticeError),

    /// Policy, clause or annotation text was rejected.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors raised while building lattices or a lattice registry.
#[derive(Error, Debug)]
pub enum LatticeError {
    /// The specification is not valid JSON or has the wrong shape
    /// (missing `name` or `edges`, non-string elements, ...).
    #[error("invalid lattice specification: {0}")]
    Json(#[from] serde_json::Error),

    /// The lattice name is empty.
    #[error("lattice name must not be empty")]
    EmptyName,

    /// An element name cannot be used in policy text.
    #[error("lattice {lattice}: invalid element '{element}': {reason}")]
    InvalidElement {
        /// The lattice being built.
        lattice: String,
        /// The offending element name.
        element: String,
        /// Why the element was rejected.
        reason: &'static str,
    },

    /// The edges do not form a partial order.
    #[error("lattice {lattice}: edges form a cycle through '{element}'")]
    Cycle {
        /// The lattice being built.
        lattice: String,
        /// An element that lies on the cycle.
        element: String,
    },

    /// A registry needs at least one lattice.
    #[error("a policy needs at least one lattice")]
    EmptyRegistry,

    /// Two lattices in one registry share a name.
    #[error("lattice '{0}' is registered twice")]
    DuplicateName(String),
}

/// A line/column location in policy or annotation text. Both are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Line number.
    pub line: usize,
    /// Column number, counted in characters.
    pub col: usize,
}

impl Position {
    /// Compute the position of a byte offset within `input`.
    pub fn locate(input: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut col = 1;
        for (i, ch) in input.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        Self { line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Errors raised while parsing policy, clause or annotation text.
///
/// Parsing is all-or-nothing: when one of these is returned no policy
/// tree exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The policy text contains no tokens.
    #[error("policy text is empty")]
    Empty,

    /// A policy does not start with `ALLOW` or `DENY`.
    #[error("{at}: policy must start with ALLOW or DENY, found '{found}'")]
    MissingMode {
        /// The token found instead.
        found: String,
        /// Where it was found.
        at: Position,
    },

    /// A clause has a lattice name without a value.
    #[error("{at}: clause is not composed of name-value pairs ('{name}' has no value)")]
    OddClause {
        /// The dangling lattice name.
        name: String,
        /// Where it was found.
        at: Position,
    },

    /// A clause names a lattice that is not registered.
    #[error(
        "{at}: '{name}' is not a valid lattice name{}",
        did_you_mean(.suggestion)
    )]
    UnknownLattice {
        /// The unknown name.
        name: String,
        /// The closest registered name, if any is close.
        suggestion: Option<String>,
        /// Where it was found.
        at: Position,
    },

    /// A clause value is not an element of its lattice.
    #[error(
        "{at}: '{value}' is not a valid value in lattice {lattice}{}",
        did_you_mean(.suggestion)
    )]
    UnknownValue {
        /// The rejected value text.
        value: String,
        /// The lattice it was checked against.
        lattice: String,
        /// The closest element, if any is close.
        suggestion: Option<String>,
        /// Where it was found.
        at: Position,
    },

    /// `EXCEPT` is not followed by `{`, or the policy does not end with `}`.
    #[error("{at}: except clause isn't wrapped by {{ and }}")]
    MissingBrace {
        /// Location of the offending token.
        at: Position,
    },

    /// A brace appears where none can be matched.
    #[error("{at}: unbalanced '{brace}'")]
    UnbalancedBrace {
        /// The brace character.
        brace: char,
        /// Where it was found.
        at: Position,
    },

    /// An except block starts with the same mode as its parent.
    #[error("{at}: except clause must start with {expected}, found '{found}'")]
    ModeMismatch {
        /// The mode an exception must have.
        expected: Mode,
        /// The token found instead.
        found: String,
        /// Where it was found.
        at: Position,
    },

    /// `EXCEPT { }` with nothing inside.
    #[error("{at}: except clause has no policies")]
    EmptyExcept {
        /// Location of the opening brace.
        at: Position,
    },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!("; did you mean '{}'?", s))
        .unwrap_or_default()
}

/// Find the candidate closest to `name` by edit distance (at most 3 edits).
pub(crate) fn suggest_closest<'a, I>(name: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|c| (c, levenshtein(name, c)))
        .filter(|(_, dist)| *dist <= 3 && *dist > 0)
        .min_by_key(|(_, dist)| *dist)
        .map(|(c, _)| c.to_string())
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
