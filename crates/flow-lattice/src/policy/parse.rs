//! Policy text → [`Policy`] trees.

use tracing::debug;

use super::token::{tokenize, Token};
use super::{Annotation, Clause, Mode, Pair, Policy, Registry, EXCEPT};
use crate::error::{suggest_closest, ParseError, Position};
use crate::lattice::Lattice;
use crate::value::{Value, PRODUCT_SEPARATOR};

/// Builds policies and annotations against a fixed set of lattices.
///
/// Parsing is all-or-nothing: either a complete [`Policy`] is returned or
/// an error describing the first problem found, with its location.
#[derive(Debug, Clone)]
pub struct PolicyParser {
    registry: Registry,
}

impl PolicyParser {
    /// Create a parser over `registry`.
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// The lattices names and values are checked against.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse a full policy.
    pub fn parse(&self, text: &str) -> Result<Policy, ParseError> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }
        let cx = Context { parser: self, input: text };
        let policy = cx.policy(&tokens)?;
        debug!(
            mode = %policy.mode,
            pairs = policy.clause.len(),
            depth = policy.depth(),
            "parsed policy"
        );
        Ok(policy)
    }

    /// Parse a flat list of `LatticeName LatticeValue` pairs.
    pub fn parse_clause(&self, text: &str) -> Result<Clause, ParseError> {
        let tokens = tokenize(text);
        let cx = Context { parser: self, input: text };
        if let Some(brace) = tokens.iter().find(|t| t.is_brace()) {
            return Err(cx.unbalanced(brace));
        }
        cx.clause(&tokens)
    }

    /// Parse an annotation. Same syntax as a clause.
    pub fn parse_annotation(&self, text: &str) -> Result<Annotation, ParseError> {
        self.parse_clause(text)
    }

    /// Check that `name` is a registered lattice.
    pub fn lattice_name<'r>(&'r self, name: &str) -> Result<&'r Lattice, ParseError> {
        self.lookup_lattice(name, Position { line: 1, col: 1 })
    }

    /// Check that `value` is an element (or product value) of lattice `name`.
    pub fn lattice_value(&self, value: &str, name: &str) -> Result<Value, ParseError> {
        let at = Position { line: 1, col: 1 };
        let lattice = self.lookup_lattice(name, at)?;
        lookup_value(lattice, value, at)
    }

    fn lookup_lattice(&self, name: &str, at: Position) -> Result<&Lattice, ParseError> {
        self.registry
            .get(name)
            .ok_or_else(|| ParseError::UnknownLattice {
                name: name.to_string(),
                suggestion: suggest_closest(name, self.registry.names()),
                at,
            })
    }
}

fn lookup_value(lattice: &Lattice, text: &str, at: Position) -> Result<Value, ParseError> {
    let unknown = |suggestion: Option<String>| ParseError::UnknownValue {
        value: text.to_string(),
        lattice: lattice.name().to_string(),
        suggestion,
        at,
    };
    let (base, state) = match text.split_once(PRODUCT_SEPARATOR) {
        Some((base, state)) => (base, Some(state)),
        None => (text, None),
    };
    if !lattice.contains(base) {
        return Err(unknown(suggest_closest(base, lattice.elements())));
    }
    match state {
        None => Ok(Value::new(base)),
        Some(state) => {
            let states = lattice.state().ok_or_else(|| unknown(None))?;
            if !states.contains(state) {
                let suggestion = suggest_closest(state, states.elements())
                    .map(|s| format!("{}{}{}", base, PRODUCT_SEPARATOR, s));
                return Err(unknown(suggestion));
            }
            Ok(Value::product(base, state))
        }
    }
}

struct Context<'p, 'a> {
    parser: &'p PolicyParser,
    input: &'a str,
}

impl Context<'_, '_> {
    fn at(&self, token: &Token<'_>) -> Position {
        Position::locate(self.input, token.offset)
    }

    fn unbalanced(&self, token: &Token<'_>) -> ParseError {
        ParseError::UnbalancedBrace {
            brace: if token.is("{") { '{' } else { '}' },
            at: self.at(token),
        }
    }

    /// `tokens` is never empty.
    fn policy(&self, tokens: &[Token<'_>]) -> Result<Policy, ParseError> {
        let head = &tokens[0];
        let mode = Mode::from_keyword(head.text).ok_or_else(|| ParseError::MissingMode {
            found: head.text.to_string(),
            at: self.at(head),
        })?;

        let except = tokens.iter().position(|t| t.is(EXCEPT));
        let clause_tokens = &tokens[1..except.unwrap_or(tokens.len())];
        if let Some(brace) = clause_tokens.iter().find(|t| t.is_brace()) {
            return Err(self.unbalanced(brace));
        }
        let clause = self.clause(clause_tokens)?;

        let excepts = match except {
            Some(i) => self.excepts(mode, &tokens[i..])?,
            None => Vec::new(),
        };

        Ok(Policy {
            mode,
            clause,
            excepts,
            registry: self.parser.registry.clone(),
        })
    }

    /// `tokens` starts at the `EXCEPT` keyword and runs to the end of the policy.
    fn excepts(&self, parent: Mode, tokens: &[Token<'_>]) -> Result<Vec<Policy>, ParseError> {
        let keyword = &tokens[0];
        let open = match tokens.get(1) {
            Some(open) if open.is("{") => open,
            Some(other) => return Err(ParseError::MissingBrace { at: self.at(other) }),
            None => return Err(ParseError::MissingBrace { at: self.at(keyword) }),
        };
        let close = &tokens[tokens.len() - 1];
        if tokens.len() < 3 || !close.is("}") {
            return Err(ParseError::MissingBrace { at: self.at(close) });
        }

        let body = &tokens[2..tokens.len() - 1];
        let expected = parent.opposite();
        let first = body
            .first()
            .ok_or_else(|| ParseError::EmptyExcept { at: self.at(open) })?;
        if !first.is(expected.keyword()) {
            return Err(ParseError::ModeMismatch {
                expected,
                found: first.text.to_string(),
                at: self.at(first),
            });
        }

        let mut starts = Vec::new();
        let mut depth: isize = 0;
        let mut last_open = open;
        for (i, token) in body.iter().enumerate() {
            if token.is("{") {
                depth += 1;
                last_open = token;
            } else if token.is("}") {
                depth -= 1;
                if depth < 0 {
                    return Err(self.unbalanced(token));
                }
            } else if depth == 0 && token.is(expected.keyword()) {
                starts.push(i);
            }
        }
        if depth != 0 {
            return Err(self.unbalanced(last_open));
        }

        starts
            .iter()
            .enumerate()
            .map(|(n, &start)| {
                let end = starts.get(n + 1).copied().unwrap_or(body.len());
                self.policy(&body[start..end])
            })
            .collect()
    }

    fn clause(&self, tokens: &[Token<'_>]) -> Result<Clause, ParseError> {
        let mut clause = Clause::new();
        for chunk in tokens.chunks(2) {
            let name = &chunk[0];
            let lattice = self.parser.lookup_lattice(name.text, self.at(name))?;
            let value = chunk.get(1).ok_or_else(|| ParseError::OddClause {
                name: name.text.to_string(),
                at: self.at(name),
            })?;
            let value = lookup_value(lattice, value.text, self.at(value))?;
            clause.push(Pair::new(lattice.name(), value));
        }
        Ok(clause)
    }
}
