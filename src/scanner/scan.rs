//! Balanced-delimiter scanning for placeholder spans

use super::lexer::{lex, Span, Token};

/// The two placeholder families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// `${name}` or `${name:default}`
    Variable,
    /// `#{name(argument)}` or `#{name}`
    Expression,
}

impl PlaceholderKind {
    /// The two-character opening sigil for this kind
    pub fn opener(self) -> &'static str {
        match self {
            PlaceholderKind::Variable => "${",
            PlaceholderKind::Expression => "#{",
        }
    }

    fn open_token(self) -> Token {
        match self {
            PlaceholderKind::Variable => Token::VariableOpen,
            PlaceholderKind::Expression => Token::ExpressionOpen,
        }
    }
}

/// A located placeholder span
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    /// Byte range of the whole placeholder, delimiters included
    pub span: Span,
    /// Inner text with delimiters stripped; may contain nested placeholders
    /// and line breaks
    pub body: String,
}

impl Placeholder {
    /// The placeholder exactly as it appeared in the source text
    pub fn raw<'a>(&self, text: &'a str) -> &'a str {
        &text[self.span.clone()]
    }

    /// Whether this placeholder spans the entire source text
    pub fn covers(&self, text: &str) -> bool {
        self.span.start == 0 && self.span.end == text.len()
    }
}

/// Find the next well-formed placeholder of `kind` at or after `from`.
///
/// The scan matches the outermost balanced span: every opener (either sigil)
/// and every bare `{` after the opening delimiter increments the depth, `}`
/// decrements it, and depth zero closes the span. Malformed candidates - an
/// opener with no matching close, or an empty brace pair - are plain text;
/// the scan skips past them and keeps looking.
pub fn next_placeholder(text: &str, from: usize, kind: PlaceholderKind) -> Option<Placeholder> {
    let tokens: Vec<(Token, Span)> = lex(&text[from..]).collect();
    let open = kind.open_token();

    for (i, (token, open_span)) in tokens.iter().enumerate() {
        if *token != open {
            continue;
        }
        let Some(close_span) = find_close(&tokens[i + 1..]) else {
            // No matching close; this opener is plain text
            continue;
        };
        let body = &text[from + open_span.end..from + close_span.start];
        if body.is_empty() {
            // An empty brace pair carries no name
            continue;
        }
        return Some(Placeholder {
            kind,
            span: from + open_span.start..from + close_span.end,
            body: body.to_string(),
        });
    }
    None
}

/// Walk the tokens following an opener and return the span of the brace that
/// closes it, honoring nesting of either placeholder kind and bare braces.
fn find_close(tokens: &[(Token, Span)]) -> Option<Span> {
    let mut depth = 1usize;
    for (token, span) in tokens {
        match token {
            Token::VariableOpen | Token::ExpressionOpen | Token::BraceOpen => depth += 1,
            Token::BraceClose => {
                depth -= 1;
                if depth == 0 {
                    return Some(span.clone());
                }
            }
            _ => {}
        }
    }
    None
}
