//! Recursive descent parser that builds shared-tree expressions straight from
//! the lexer, with one token of pushback.
//!
//! Grammar:
//!
//! ```text
//! expr = "(" expr ")" | "lam" ident expr | "app" expr expr
//!      | number | bool | ident
//! ```

use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::Num;

use crate::lexical_analysis::{Lexer, Token, TokenClass};
use crate::shared_tree_impl::shared_tree_ast::{ExprNode, SyntaxCategory, SyntaxError};

type ParseResult = Result<Arc<ExprNode>, SyntaxError>;

fn expect_error(expected: SyntaxCategory, found: TokenClass) -> SyntaxError {
    return SyntaxError::UnexpectedTokenClass { expected, found };
}

/// Parser state: the lexer plus a single slot of pushback.
struct Parser<'a> {
    lexer: Lexer<'a>,
    pushback: Option<Token>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Parser<'a> {
        return Parser {
            lexer: Lexer::new(input),
            pushback: None,
        };
    }

    fn next(&mut self) -> Token {
        return match self.pushback.take() {
            Some(token) => token,
            None => self.lexer.next_token(),
        };
    }

    // Only one token fits; it must be retrieved with `next` before another is
    // pushed back.
    fn unnext(&mut self, token: Token) {
        assert!(
            self.pushback.is_none(),
            "internal parser error: multiple unnext"
        );
        self.pushback = Some(token);
    }

    /// Tries to parse a token of the identifier class.
    fn try_identifier_rule(&mut self) -> Result<String, SyntaxError> {
        let token = self.next();

        if token.token_class != TokenClass::Identifier {
            return Err(expect_error(SyntaxCategory::Identifier, token.token_class));
        }

        return Ok(token.token_text);
    }

    /// Tries to parse an expression that looks like `[NUMBER]`.
    fn try_number_rule(&mut self) -> ParseResult {
        let token = self.next();

        if token.token_class != TokenClass::Number {
            return Err(expect_error(SyntaxCategory::Number, token.token_class));
        }

        return BigInt::from_str_radix(token.token_text.as_str(), 10)
            .map(|value| Arc::new(ExprNode::Number(value)))
            .map_err(|_| SyntaxError::BadNumber(token.token_text));
    }

    /// Tries to parse an expression that looks like `true` or `false`.
    fn try_bool_rule(&mut self) -> ParseResult {
        let token = self.next();

        if token.token_class != TokenClass::Bool {
            return Err(expect_error(SyntaxCategory::Bool, token.token_class));
        }

        let value = match token.token_text.as_str() {
            "true" => true,
            "false" => false,
            other => unreachable!("lexer produced a bool token with text '{}'", other),
        };

        return Ok(Arc::new(ExprNode::Bool(value)));
    }

    /// Tries to parse an expression that looks like `[IDENTIFIER]`.
    fn try_var_rule(&mut self) -> ParseResult {
        let var_name = self.try_identifier_rule()?;
        return Ok(Arc::new(ExprNode::Var { var_name }));
    }

    /// Tries to parse the rest of `lam [IDENTIFIER] [EXPR]` once `lam` has
    /// been consumed.
    fn try_lambda_rule(&mut self) -> ParseResult {
        let formal_param = self.try_identifier_rule()?;
        let fn_body = self.try_expr_rule()?;

        return Ok(Arc::new(ExprNode::FnDef {
            formal_param,
            fn_body,
        }));
    }

    /// Tries to parse the rest of `app [EXPR] [EXPR]` once `app` has been
    /// consumed.
    fn try_application_rule(&mut self) -> ParseResult {
        let fn_body = self.try_expr_rule()?;
        let actual_arg = self.try_expr_rule()?;

        return Ok(Arc::new(ExprNode::FnApp {
            fn_body,
            actual_arg,
        }));
    }

    /// Tries to parse the rest of `([EXPR])` once `(` has been consumed.
    fn try_parenthesis_expr_rule(&mut self) -> ParseResult {
        let expr_node = self.try_expr_rule()?;
        let token = self.next();

        if token.token_class != TokenClass::RightParen {
            return Err(expect_error(SyntaxCategory::RightParen, token.token_class));
        }

        return Ok(expr_node);
    }

    /// Tries to parse any expression. `lam` and `app` are keywords only here,
    /// at the head of an expression.
    fn try_expr_rule(&mut self) -> ParseResult {
        let token = self.next();

        match token.token_class {
            TokenClass::LeftParen => {
                return self.try_parenthesis_expr_rule();
            }
            TokenClass::RightParen => {
                return Err(expect_error(SyntaxCategory::Expression, TokenClass::RightParen));
            }
            TokenClass::Identifier if token.token_text == "lam" => {
                return self.try_lambda_rule();
            }
            TokenClass::Identifier if token.token_text == "app" => {
                return self.try_application_rule();
            }
            TokenClass::Identifier => {
                self.unnext(token);
                return self.try_var_rule();
            }
            TokenClass::Number => {
                self.unnext(token);
                return self.try_number_rule();
            }
            TokenClass::Bool => {
                self.unnext(token);
                return self.try_bool_rule();
            }
            TokenClass::Error => {
                return Err(SyntaxError::Lexical(token.token_text));
            }
            TokenClass::EndOfInput => {
                return Err(expect_error(SyntaxCategory::Expression, TokenClass::EndOfInput));
            }
        }
    }

    /// Parses one complete program: an expression followed by end of input.
    fn try_program_rule(&mut self) -> ParseResult {
        let root = self.try_expr_rule()?;
        let token = self.next();

        if token.token_class != TokenClass::EndOfInput {
            return Err(expect_error(SyntaxCategory::EndOfInput, token.token_class));
        }

        return Ok(root);
    }
}

/// Parses the given program text. Never fails outright: a program that can't
/// be parsed yields an `ExprNode::Error` describing the first problem found.
pub fn parse_recursive_descent(program_str: &str) -> Arc<ExprNode> {
    return match Parser::new(program_str).try_program_rule() {
        Ok(root) => root,
        Err(syntax_error) => Arc::new(ExprNode::Error(syntax_error)),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Arc<ExprNode> {
        return Arc::new(ExprNode::Var {
            var_name: String::from(name),
        });
    }

    fn num(value: i64) -> Arc<ExprNode> {
        return Arc::new(ExprNode::Number(BigInt::from(value)));
    }

    fn app(fn_body: Arc<ExprNode>, actual_arg: Arc<ExprNode>) -> Arc<ExprNode> {
        return Arc::new(ExprNode::FnApp {
            fn_body,
            actual_arg,
        });
    }

    fn lam(formal_param: &str, fn_body: Arc<ExprNode>) -> Arc<ExprNode> {
        return Arc::new(ExprNode::FnDef {
            formal_param: String::from(formal_param),
            fn_body,
        });
    }

    // Asserts that parsing program_str fails with the given message.
    fn assert_parse_error(program_str: &str, expected_message: &str) {
        match &*parse_recursive_descent(program_str) {
            ExprNode::Error(syntax_error) => {
                assert_eq!(syntax_error.to_string(), expected_message, "{:?}", program_str);
            }
            other => panic!("Expected parse error for {:?}, got {}", program_str, other),
        }
    }

    // Test if literals, identifiers and parentheses parse to the right leaves.
    #[test]
    fn test_simple_expressions() {
        let cases = vec![
            ("2", num(2)),
            ("-7", num(-7)),
            ("true", Arc::new(ExprNode::Bool(true))),
            ("false", Arc::new(ExprNode::Bool(false))),
            ("x", var("x")),
            ("(x)", var("x")),
            ("(((x)))", var("x")),
        ];

        for (program_str, expected_output) in cases {
            assert_eq!(parse_recursive_descent(program_str), expected_output);
        }
    }

    // Test if lam and app build the expected nested trees.
    #[test]
    fn test_compound_expressions() {
        let cases = vec![
            ("lam x x", lam("x", var("x"))),
            ("app (lam x x) 2", app(lam("x", var("x")), num(2))),
            (
                "app app add 1 3",
                app(app(var("add"), num(1)), num(3)),
            ),
            (
                "app app app if (app app gt 3 1) 10 5",
                app(
                    app(
                        app(var("if"), app(app(var("gt"), num(3)), num(1))),
                        num(10),
                    ),
                    num(5),
                ),
            ),
            (
                "app app (app (lam f lam y lam x (app (app f y) x)) (lam x lam y x)) 3 4",
                app(
                    app(
                        app(
                            lam("f", lam("y", lam("x", app(app(var("f"), var("y")), var("x"))))),
                            lam("x", lam("y", var("x"))),
                        ),
                        num(3),
                    ),
                    num(4),
                ),
            ),
        ];

        for (program_str, expected_output) in cases {
            assert_eq!(parse_recursive_descent(program_str), expected_output);
        }
    }

    // Test if lam and app are ordinary identifiers outside expression-head
    // position, and keywords inside it.
    #[test]
    fn test_keywords_as_identifiers() {
        assert_eq!(parse_recursive_descent("lam lam 1"), lam("lam", num(1)));
        assert_eq!(parse_recursive_descent("lam app x"), lam("app", var("x")));
        assert_eq!(
            parse_recursive_descent("lam app (lam lam 2)"),
            lam("app", lam("lam", num(2)))
        );

        // In head position the word starts a new production.
        assert_parse_error("lam x lam", "expecting identifier; got EOF");
        assert_parse_error("lam app app", "expecting expression; got EOF");
    }

    // Test if malformed programs produce the expected error messages.
    #[test]
    fn test_parse_errors() {
        let cases = vec![
            ("", "expecting expression; got EOF"),
            ("2s", "bad number syntax: '2s'"),
            ("()", "expecting expression; got ')'"),
            ("(1", "expecting ')'; got EOF"),
            ("1)", "expecting EOF; got ')'"),
            ("1 2", "expecting EOF; got number"),
            ("lam 1 x", "expecting identifier; got number"),
            ("lam x lam 1 y", "expecting identifier; got number"),
            ("lam true x", "expecting identifier; got bool"),
            ("app (lam 1 x) 2", "expecting identifier; got number"),
            ("app (lam x x) (lam 1 x)", "expecting identifier; got number"),
            ("lam x x ]", "expecting EOF; got error"),
            ("app x ]", "illegal character: ']'"),
            ("(x (", "expecting ')'; got '('"),
        ];

        for (program_str, expected_message) in cases {
            assert_parse_error(program_str, expected_message);
        }
    }

    // Test if incomplete programs are told apart from broken ones.
    #[test]
    fn test_unexpected_end_of_input() {
        for program_str in ["lam x", "app f", "(", "((app f x)", "app (lam x x)\n"] {
            assert!(
                parse_recursive_descent(program_str).is_unexpected_end_of_input(),
                "{:?}",
                program_str
            );
        }

        for program_str in ["lam x x", "1)", "()", "-", "lam 1"] {
            assert!(
                !parse_recursive_descent(program_str).is_unexpected_end_of_input(),
                "{:?}",
                program_str
            );
        }
    }

    // Test if the single-line rendering of a tree parses back to the same
    // tree.
    #[test]
    fn test_display_reparses() {
        for program_str in [
            "app app (app (lam f lam y lam x (app (app f y) x)) (lam x lam y x)) 3 4",
            "lam x (app lam y y x)",
            "app app add -12345678901234567890 (app (lam q q) 1)",
        ] {
            let parsed = parse_recursive_descent(program_str);
            let rendered = parsed.to_string();
            assert_eq!(parse_recursive_descent(rendered.as_str()), parsed, "{}", rendered);
        }
    }

    #[test]
    #[should_panic(expected = "multiple unnext")]
    fn test_double_unnext_panics() {
        let mut parser = Parser::new("x y");
        let first = parser.next();
        let second = parser.next();
        parser.unnext(first);
        parser.unnext(second);
    }
}
