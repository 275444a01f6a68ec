//! Token stream for the statement scanner.
//!
//! Lexing is `sqlparser`'s Postgres tokenizer: strings, quoted identifiers,
//! dollar-quoted bodies and comments arrive as single tokens, so keywords
//! inside them never reach the scanner. Whitespace and comments are kept in
//! the stream as trivia.

use chittyschema_ir::Diagnostic;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::tokenizer::{Token, TokenWithLocation, Tokenizer, Whitespace};

pub type Tok = TokenWithLocation;

/// Tokenize `sql`. Never fails: when the tokenizer gives up (an unterminated
/// string, identifier or dollar body), input is cut back to the last `;`
/// before the failure, the statements before it survive, and the cut is
/// reported as a diagnostic.
pub fn tokenize(sql: &str) -> (Vec<Tok>, Option<Diagnostic>) {
    let dialect = PostgreSqlDialect {};
    let mut end = sql.len();
    let mut diagnostic = None;
    loop {
        match Tokenizer::new(&dialect, &sql[..end]).tokenize_with_location() {
            Ok(tokens) => return (tokens, diagnostic),
            Err(err) => {
                diagnostic.get_or_insert_with(|| {
                    Diagnostic::new(
                        err.location.line as usize,
                        "token",
                        format!("{}; statement skipped to end of input", err.message),
                    )
                });
                end = sql[..end.saturating_sub(1)]
                    .rfind(';')
                    .map(|i| i + 1)
                    .unwrap_or(0);
            }
        }
    }
}

pub fn line_of(t: &Tok) -> usize {
    t.location.line as usize
}

pub fn is_trivia(t: &Tok) -> bool {
    matches!(t.token, Token::Whitespace(_))
}

/// Unquoted word matching `kw`, case-insensitively.
pub fn is_keyword(t: &Tok, kw: &str) -> bool {
    matches!(&t.token, Token::Word(w) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(kw))
}

/// Identifier value; quoted identifiers come back without their quotes.
pub fn ident(t: &Tok) -> Option<String> {
    match &t.token {
        Token::Word(w) => Some(w.value.clone()),
        _ => None,
    }
}

pub fn line_comment(t: &Tok) -> Option<&str> {
    match &t.token {
        Token::Whitespace(Whitespace::SingleLineComment { comment, .. }) => {
            Some(comment.trim()).filter(|c| !c.is_empty())
        }
        _ => None,
    }
}

/// SQL text of `tokens` with comments dropped and whitespace collapsed.
pub fn text(tokens: &[Tok]) -> String {
    let mut out = String::new();
    let mut gap = false;
    for t in tokens {
        if is_trivia(t) {
            gap = !out.is_empty();
        } else {
            if gap {
                out.push(' ');
                gap = false;
            }
            match &t.token {
                Token::SingleQuotedString(s) => out.push_str(&format!("'{}'", s.replace('\'', "''"))),
                token => out.push_str(&token.to_string()),
            }
        }
    }
    out
}
