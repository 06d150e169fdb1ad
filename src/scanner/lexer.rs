//! Lexer for placeholder delimiters using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    /// `${` - opens a variable reference
    #[token("${")]
    VariableOpen,

    /// `#{` - opens an expression invocation
    #[token("#{")]
    ExpressionOpen,

    /// Bare opening brace; nests inside a placeholder body
    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    /// A sigil with no following brace is plain text
    #[token("$")]
    Dollar,

    #[token("#")]
    Hash,

    /// Any run of characters that cannot start or end a delimiter,
    /// line breaks included (table cells wrap long values)
    #[regex(r"[^${}#]+")]
    Text,
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}
