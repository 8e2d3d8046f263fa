//! This crate contains code for a small applicative lambda calculus
//! interpreter with arbitrary-precision integers, booleans and a few builtins.

pub mod end_to_end;
pub mod lexical_analysis;
pub mod shared_tree_impl;

pub use shared_tree_impl::shared_tree_ast::{ExprNode, SyntaxError};
pub use shared_tree_impl::shared_tree_builtins::default_environment;
pub use shared_tree_impl::shared_tree_environment::Environment;
pub use shared_tree_impl::shared_tree_execution::{
    evaluate, evaluate_in, evaluate_source, Object, RuntimeError,
};
pub use shared_tree_impl::shared_tree_recursive_descent_parsing::parse_recursive_descent as parse;
