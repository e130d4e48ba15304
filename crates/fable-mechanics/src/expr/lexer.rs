use logos::Logos;
use std::fmt;

use crate::error::{MechError, MechResult};

/// Token type for story expressions.
///
/// Word operators and their symbolic spellings lex to the same token:
/// `and`/`&&`, `or`/`||`, `not`/`!`, `=`/`==`.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal.
    Number(f64),
    /// Dice group: count and sides (`2d6`, `d%`).
    Dice(u32, u32),
    /// Bare identifier. Always a free variable at evaluation time.
    Ident(String),
    /// `true`.
    True,
    /// `false`.
    False,
    /// `and` / `&&`.
    And,
    /// `or` / `||`.
    Or,
    /// `not` / `!`.
    Not,
    /// `+`.
    Plus,
    /// `-`.
    Minus,
    /// `*`.
    Star,
    /// `/`.
    Slash,
    /// `%`.
    Percent,
    /// `^`.
    Caret,
    /// `(`.
    LParen,
    /// `)`.
    RParen,
    /// `<`.
    Lt,
    /// `<=`.
    Le,
    /// `>`.
    Gt,
    /// `>=`.
    Ge,
    /// `=` / `==`.
    Eq,
    /// `!=`.
    Ne,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Dice(count, sides) => write!(f, "{count}d{sides}"),
            Token::Ident(name) => write!(f, "{name}"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::Not => write!(f, "not"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Caret => write!(f, "^"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::Eq => write!(f, "=="),
            Token::Ne => write!(f, "!="),
        }
    }
}

/// Internal logos token, converted to the owned `Token` after lexing.
#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[regex(r"[0-9]*d([0-9]+|%)", priority = 10)]
    Dice,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("and")]
    #[token("&&")]
    And,

    #[token("or")]
    #[token("||")]
    Or,

    #[token("not")]
    #[token("!")]
    Not,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("^")]
    Caret,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("<")]
    Lt,

    #[token("<=")]
    Le,

    #[token(">")]
    Gt,

    #[token(">=")]
    Ge,

    #[token("=")]
    #[token("==")]
    Eq,

    #[token("!=")]
    Ne,
}

fn dice_token(slice: &str) -> Option<Token> {
    let (count, sides) = slice.split_once('d')?;
    let count = if count.is_empty() {
        1
    } else {
        count.parse::<u32>().ok()?
    };
    let sides = if sides == "%" {
        100
    } else {
        sides.parse::<u32>().ok()?
    };
    Some(Token::Dice(count, sides))
}

/// Lex an expression into `(Token, Span)` pairs.
///
/// Fails on the first character that cannot start a token.
pub fn lex(source: &str) -> MechResult<Vec<(Token, std::ops::Range<usize>)>> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let slice = lexer.slice();
        let bad_input = || MechError::Lex {
            offset: span.start,
            text: slice.to_string(),
        };
        let raw = result.map_err(|()| bad_input())?;
        let token = match raw {
            RawToken::Dice => dice_token(slice).ok_or_else(bad_input)?,
            RawToken::Number => Token::Number(slice.parse::<f64>().map_err(|_| bad_input())?),
            RawToken::Ident => Token::Ident(slice.to_string()),
            RawToken::True => Token::True,
            RawToken::False => Token::False,
            RawToken::And => Token::And,
            RawToken::Or => Token::Or,
            RawToken::Not => Token::Not,
            RawToken::Plus => Token::Plus,
            RawToken::Minus => Token::Minus,
            RawToken::Star => Token::Star,
            RawToken::Slash => Token::Slash,
            RawToken::Percent => Token::Percent,
            RawToken::Caret => Token::Caret,
            RawToken::LParen => Token::LParen,
            RawToken::RParen => Token::RParen,
            RawToken::Lt => Token::Lt,
            RawToken::Le => Token::Le,
            RawToken::Gt => Token::Gt,
            RawToken::Ge => Token::Ge,
            RawToken::Eq => Token::Eq,
            RawToken::Ne => Token::Ne,
        };
        tokens.push((token, span));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_tokens(source: &str) -> Vec<Token> {
        lex(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn lex_arithmetic() {
        assert_eq!(
            lex_tokens("4 + 1.5*(2)"),
            vec![
                Token::Number(4.0),
                Token::Plus,
                Token::Number(1.5),
                Token::Star,
                Token::LParen,
                Token::Number(2.0),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn lex_dice() {
        assert_eq!(lex_tokens("2d6"), vec![Token::Dice(2, 6)]);
        assert_eq!(lex_tokens("d%"), vec![Token::Dice(1, 100)]);
        assert_eq!(
            lex_tokens("d6+d4"),
            vec![Token::Dice(1, 6), Token::Plus, Token::Dice(1, 4)]
        );
    }

    #[test]
    fn identifiers_are_not_dice() {
        assert_eq!(lex_tokens("dog"), vec![Token::Ident("dog".into())]);
        assert_eq!(lex_tokens("d6x"), vec![Token::Ident("d6x".into())]);
        assert_eq!(lex_tokens("android"), vec![Token::Ident("android".into())]);
    }

    #[test]
    fn lex_comparisons_and_logic() {
        assert_eq!(
            lex_tokens("14>=12 and 9<=10"),
            vec![
                Token::Number(14.0),
                Token::Ge,
                Token::Number(12.0),
                Token::And,
                Token::Number(9.0),
                Token::Le,
                Token::Number(10.0),
            ]
        );
        assert_eq!(
            lex_tokens("!a != b == c || d"),
            vec![
                Token::Not,
                Token::Ident("a".into()),
                Token::Ne,
                Token::Ident("b".into()),
                Token::Eq,
                Token::Ident("c".into()),
                Token::Or,
                Token::Ident("d".into()),
            ]
        );
    }

    #[test]
    fn lex_rejects_braces() {
        let err = lex("{fruits.1}").unwrap_err();
        assert!(matches!(err, MechError::Lex { offset: 0, .. }));
    }
}
