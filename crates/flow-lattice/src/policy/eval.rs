//! Deciding whether a policy admits an annotation.

use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::debug;

use super::{Annotation, Mode, Pair, Policy};

/// Outcome of evaluating a policy on an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Decision {
    /// The annotated flow is permitted.
    Allow,
    /// The annotated flow is forbidden.
    Deny,
}

impl Decision {
    /// Whether this is [`Decision::Allow`].
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
        })
    }
}

impl Policy {
    /// Whether the policy admits `annotation`.
    ///
    /// `ALLOW c EXCEPT {e...}` holds when every lattice allows the
    /// annotation's values under `c` and every exception holds on the same
    /// annotation.
    ///
    /// `DENY c EXCEPT {e...}` holds as soon as one lattice finds no
    /// overlap between `c` and the annotation. Otherwise the annotation is
    /// narrowed to its overlap with `c`, and the policy holds only if some
    /// exception holds on that overlap.
    pub fn apply_on(&self, annotation: &Annotation) -> bool {
        match self.mode {
            Mode::Allow => self.apply_allow(annotation),
            Mode::Deny => self.apply_deny(annotation),
        }
    }

    /// [`apply_on`](Policy::apply_on) as a [`Decision`].
    pub fn decide(&self, annotation: &Annotation) -> Decision {
        let decision = Decision::from(self.apply_on(annotation));
        debug!(%annotation, %decision, mode = %self.mode, "evaluated policy");
        decision
    }

    fn apply_allow(&self, annotation: &Annotation) -> bool {
        let within = self.registry.iter().all(|(name, lattice)| {
            lattice.allow(&self.clause.values_of(name), &annotation.values_of(name))
        });
        within && self.excepts.iter().all(|except| except.apply_on(annotation))
    }

    fn apply_deny(&self, annotation: &Annotation) -> bool {
        // One lattice without overlap is enough to escape the rule.
        let caught = self.registry.iter().all(|(name, lattice)| {
            lattice.deny(&self.clause.values_of(name), &annotation.values_of(name))
        });
        if !caught {
            return true;
        }

        let overlap: Annotation = self
            .registry
            .iter()
            .flat_map(|(name, lattice)| {
                lattice
                    .overlap(&annotation.values_of(name), &self.clause.values_of(name))
                    .into_iter()
                    .map(move |value| Pair::new(name, value))
            })
            .collect();
        self.excepts.iter().any(|except| except.apply_on(&overlap))
    }
}
