//! Splits policy text into words and braces.

/// A word of policy text and the byte offset it starts at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub text: &'a str,
    pub offset: usize,
}

impl Token<'_> {
    pub fn is(&self, word: &str) -> bool {
        self.text == word
    }

    pub fn is_brace(&self) -> bool {
        self.text == "{" || self.text == "}"
    }
}

/// Tokenize `input`. Whitespace separates words; `{` and `}` are always
/// tokens on their own, so `EXCEPT{DENY` yields three tokens.
pub(crate) fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, ch) in input.char_indices() {
        if ch.is_whitespace() || ch == '{' || ch == '}' {
            if let Some(s) = start.take() {
                tokens.push(Token {
                    text: &input[s..i],
                    offset: s,
                });
            }
            if ch == '{' || ch == '}' {
                tokens.push(Token {
                    text: &input[i..i + 1],
                    offset: i,
                });
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            text: &input[s..],
            offset: s,
        });
    }
    tokens
}
