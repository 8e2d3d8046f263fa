/// Data structures to represent parsed programs, the syntax errors that can
/// stand in for them, and utility functions to display them.
use std::fmt::Display;
use std::sync::Arc;

use num_bigint::BigInt;
use thiserror::Error;

use crate::lexical_analysis::TokenClass;

/// The syntactic category the parser was expecting when it failed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SyntaxCategory {
    Expression,
    RightParen,
    Number,
    Bool,
    Identifier,
    EndOfInput,
}

impl Display for SyntaxCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Expression => "expression",
            Self::RightParen => "')'",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Identifier => "identifier",
            Self::EndOfInput => "EOF",
        };

        return write!(f, "{}", text);
    }
}

/// Represents a lexical or syntactic error.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum SyntaxError {
    /// The received token doesn't fit the expected category.
    #[error("expecting {expected}; got {found}")]
    UnexpectedTokenClass {
        expected: SyntaxCategory,
        found: TokenClass,
    },

    /// The lexer produced an error token; holds its message.
    #[error("{0}")]
    Lexical(String),

    #[error("bad number: '{0}'")]
    BadNumber(String),
}

impl SyntaxError {
    /// True if the parser ran out of input before the program was complete,
    /// meaning more input could still make it valid.
    pub fn is_unexpected_end_of_input(&self) -> bool {
        return matches!(
            self,
            SyntaxError::UnexpectedTokenClass {
                found: TokenClass::EndOfInput,
                ..
            }
        );
    }
}

/// Represents a parsed expression, or the error that prevented parsing it.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ExprNode {
    Error(SyntaxError),
    FnApp {
        fn_body: Arc<ExprNode>,
        actual_arg: Arc<ExprNode>,
    },
    FnDef {
        formal_param: String,
        fn_body: Arc<ExprNode>,
    },
    Var {
        var_name: String,
    },
    Number(BigInt),
    Bool(bool),
}

impl ExprNode {
    /// See `SyntaxError::is_unexpected_end_of_input`. Always false for nodes
    /// that aren't errors.
    pub fn is_unexpected_end_of_input(&self) -> bool {
        return match self {
            ExprNode::Error(syntax_error) => syntax_error.is_unexpected_end_of_input(),
            _ => false,
        };
    }

    /// Leaves are printed inline by the pretty printer.
    fn is_leaf(&self) -> bool {
        return matches!(
            self,
            ExprNode::Var { .. } | ExprNode::Number(_) | ExprNode::Bool(_)
        );
    }
}

// Helper function to produce a single-line string representation of an
// ExprNode.
fn expr_node_to_string_helper(expr_node: &ExprNode, string_so_far: &mut String) {
    match expr_node {
        ExprNode::Error(syntax_error) => {
            string_so_far.push_str(syntax_error.to_string().as_str());
        }
        ExprNode::Var { var_name } => {
            string_so_far.push_str(var_name.as_str());
        }
        ExprNode::Number(value) => {
            string_so_far.push_str(value.to_string().as_str());
        }
        ExprNode::Bool(value) => {
            string_so_far.push_str(if *value { "true" } else { "false" });
        }
        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            // A lambda in function position is wrapped for readability.
            let first_needs_parens = matches!(&**fn_body, ExprNode::FnDef { .. });

            // So is a compound argument.
            let second_needs_parens = !actual_arg.is_leaf();

            string_so_far.push_str("app ");
            push_maybe_parenthesized(fn_body, first_needs_parens, string_so_far);
            string_so_far.push(' ');
            push_maybe_parenthesized(actual_arg, second_needs_parens, string_so_far);
        }
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            string_so_far.push_str(format!("lam {} ", formal_param.as_str()).as_str());
            expr_node_to_string_helper(fn_body, string_so_far);
        }
    };
}

fn push_maybe_parenthesized(expr_node: &ExprNode, needs_parens: bool, string_so_far: &mut String) {
    if needs_parens {
        string_so_far.push('(');
        expr_node_to_string_helper(expr_node, string_so_far);
        string_so_far.push(')');
    } else {
        expr_node_to_string_helper(expr_node, string_so_far);
    }
}

/// Converts an expr node to a single-line string that parses back to the same
/// tree.
pub fn expr_node_to_string(expr_node: &ExprNode) -> String {
    let mut out_string = String::new();
    expr_node_to_string_helper(expr_node, &mut out_string);
    return out_string;
}

// Display trait implementation for ExprNode using expr_node_to_string function.
impl Display for ExprNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", expr_node_to_string(self).as_str());
    }
}

const PRETTY_PRINT_INDENT: &str = "    ";

fn pretty_print_helper(expr_node: &ExprNode, indent: &str, string_so_far: &mut String) {
    string_so_far.push_str(indent);

    match expr_node {
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            string_so_far.push_str("lam ");
            string_so_far.push_str(formal_param.as_str());

            if fn_body.is_leaf() {
                string_so_far.push(' ');
                expr_node_to_string_helper(fn_body, string_so_far);
            } else {
                string_so_far.push('\n');
                let inner_indent = format!("{}{}", indent, PRETTY_PRINT_INDENT);
                pretty_print_helper(fn_body, &inner_indent, string_so_far);
            }
        }
        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            string_so_far.push_str("app");

            if fn_body.is_leaf() && actual_arg.is_leaf() {
                string_so_far.push(' ');
                expr_node_to_string_helper(fn_body, string_so_far);
                string_so_far.push(' ');
                expr_node_to_string_helper(actual_arg, string_so_far);
            } else {
                let inner_indent = format!("{}{}", indent, PRETTY_PRINT_INDENT);
                string_so_far.push('\n');
                pretty_print_helper(fn_body, &inner_indent, string_so_far);
                string_so_far.push('\n');
                pretty_print_helper(actual_arg, &inner_indent, string_so_far);
            }
        }
        leaf_or_error => {
            expr_node_to_string_helper(leaf_or_error, string_so_far);
        }
    }
}

/// Formats a tree over multiple lines, nesting the children of every
/// non-trivial `lam` and `app` one indentation level deeper.
pub fn pretty_print(expr_node: &ExprNode) -> String {
    let mut out_string = String::new();
    pretty_print_helper(expr_node, "", &mut out_string);
    return out_string;
}
