use logos::Logos;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Default, Error)]
pub enum LexerError {
    #[default]
    #[error("unknown token")]
    UnknownToken,
}

/// Whitespace separated words. Operators are plain words at this level and
/// are only recognized after substitution.
#[derive(Debug, PartialEq, Logos)]
#[logos(skip r"[ \t\r\n\f]+", error = LexerError)]
pub enum Token<'a> {
    #[regex(r"\$[^ \t\r\n\f]*", |lex| &lex.slice()[1..])]
    Variable(&'a str),
    #[regex(r"[^ \t\r\n\f$][^ \t\r\n\f]*")]
    Word(&'a str),
}
