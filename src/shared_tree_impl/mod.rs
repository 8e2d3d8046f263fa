//! Parser and program execution code that represents programs as a tree whose
//! nodes share their children via `Arc`, so closures can keep the lambda they
//! came from alive without copying it.

pub mod shared_tree_ast;
pub mod shared_tree_builtins;
pub mod shared_tree_environment;
pub mod shared_tree_execution;
pub mod shared_tree_recursive_descent_parsing;
