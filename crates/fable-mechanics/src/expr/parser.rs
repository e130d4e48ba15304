use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::lexer::Token;
use super::{BinaryOp, Expr, UnaryOp};
use crate::error::{MechError, MechResult};

type Span = SimpleSpan;

/// Fold `a ^ b ^ c` as `a ^ (b ^ c)`.
fn fold_power(first: Expr, mut rest: Vec<Expr>) -> Expr {
    let Some(mut acc) = rest.pop() else {
        return first;
    };
    while let Some(prev) = rest.pop() {
        acc = Expr::binary(BinaryOp::Pow, prev, acc);
    }
    Expr::binary(BinaryOp::Pow, first, acc)
}

fn expr_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    let expr = recursive(|expr| {
        let atom = select! {
            Token::Number(n) => Expr::Number(n),
            Token::True => Expr::Bool(true),
            Token::False => Expr::Bool(false),
            Token::Dice(count, sides) => Expr::Dice { count, sides },
            Token::Ident(name) => Expr::Var(name),
        }
        .or(expr.delimited_by(just(Token::LParen), just(Token::RParen)))
        .labelled("value");

        let unary = choice((
            just(Token::Minus).to(UnaryOp::Neg),
            just(Token::Not).to(UnaryOp::Not),
        ))
        .repeated()
        .foldr(atom, |op, operand| Expr::Unary(op, Box::new(operand)));

        let power = unary
            .clone()
            .then(
                just(Token::Caret)
                    .ignore_then(unary)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| fold_power(first, rest));

        let product = power.clone().foldl(
            choice((
                just(Token::Star).to(BinaryOp::Mul),
                just(Token::Slash).to(BinaryOp::Div),
                just(Token::Percent).to(BinaryOp::Rem),
            ))
            .then(power)
            .repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        );

        let sum = product.clone().foldl(
            choice((
                just(Token::Plus).to(BinaryOp::Add),
                just(Token::Minus).to(BinaryOp::Sub),
            ))
            .then(product)
            .repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        );

        let comparison = sum.clone().foldl(
            choice((
                just(Token::Le).to(BinaryOp::Le),
                just(Token::Lt).to(BinaryOp::Lt),
                just(Token::Ge).to(BinaryOp::Ge),
                just(Token::Gt).to(BinaryOp::Gt),
                just(Token::Eq).to(BinaryOp::Eq),
                just(Token::Ne).to(BinaryOp::Ne),
            ))
            .then(sum)
            .repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        );

        let conjunction = comparison.clone().foldl(
            just(Token::And).to(BinaryOp::And).then(comparison).repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        );

        conjunction.clone().foldl(
            just(Token::Or).to(BinaryOp::Or).then(conjunction).repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        )
    });

    expr.then_ignore(end())
}

/// Parse a token stream into an expression tree.
pub fn parse(tokens: &[(Token, std::ops::Range<usize>)]) -> MechResult<Expr> {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), Span::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: Span = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = expr_parser().parse(stream).into_output_errors();

    if let Some(expr) = output
        && errors.is_empty()
    {
        return Ok(expr);
    }

    let message = errors
        .into_iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    Err(MechError::Parse(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::lexer;

    fn parse_source(source: &str) -> MechResult<Expr> {
        parse(&lexer::lex(source)?)
    }

    fn num(n: f64) -> Expr {
        Expr::Number(n)
    }

    #[test]
    fn precedence_of_arithmetic() {
        let expr = parse_source("1+2*3").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Add,
                num(1.0),
                Expr::binary(BinaryOp::Mul, num(2.0), num(3.0))
            )
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        let expr = parse_source("5-2-1").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(BinaryOp::Sub, num(5.0), num(2.0)),
                num(1.0)
            )
        );
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse_source("2^3^2").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Pow,
                num(2.0),
                Expr::binary(BinaryOp::Pow, num(3.0), num(2.0))
            )
        );
    }

    #[test]
    fn logic_binds_loosest() {
        let expr = parse_source("1<2 or 3>4 and true").unwrap();
        let Expr::Binary(BinaryOp::Or, _, rhs) = expr else {
            panic!("expected or at the root");
        };
        assert!(matches!(*rhs, Expr::Binary(BinaryOp::And, _, _)));
    }

    #[test]
    fn unary_and_parentheses() {
        let expr = parse_source("-(1+2)").unwrap();
        assert_eq!(
            expr,
            Expr::Unary(
                UnaryOp::Neg,
                Box::new(Expr::binary(BinaryOp::Add, num(1.0), num(2.0)))
            )
        );
        assert!(matches!(
            parse_source("not true").unwrap(),
            Expr::Unary(UnaryOp::Not, _)
        ));
    }

    #[test]
    fn dice_and_variables() {
        assert_eq!(
            parse_source("2d1+20").unwrap(),
            Expr::binary(BinaryOp::Add, Expr::Dice { count: 2, sides: 1 }, num(20.0))
        );
        assert_eq!(parse_source("apple").unwrap(), Expr::Var("apple".into()));
    }

    #[test]
    fn errors_on_malformed_input() {
        assert!(matches!(parse_source("1 +"), Err(MechError::Parse(_))));
        assert!(matches!(parse_source("(1"), Err(MechError::Parse(_))));
        assert!(matches!(parse_source("1 2"), Err(MechError::Parse(_))));
        assert!(matches!(parse_source(""), Err(MechError::Parse(_))));
    }
}
