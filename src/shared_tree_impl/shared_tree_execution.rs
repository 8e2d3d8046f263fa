//! Executes programs given in the shared-tree representation by walking the
//! tree with an environment of closures and builtins.

use std::fmt::Display;
use std::sync::Arc;

use num_bigint::BigInt;
use thiserror::Error;

use crate::shared_tree_impl::shared_tree_ast::{ExprNode, SyntaxError};
use crate::shared_tree_impl::shared_tree_builtins::default_environment;
use crate::shared_tree_impl::shared_tree_environment::Environment;
use crate::shared_tree_impl::shared_tree_recursive_descent_parsing::parse_recursive_descent;

/// Represents an error raised while executing a program. Each variant renders
/// to the message shown to the user.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum RuntimeError {
    #[error("unknown identifier: '{0}'")]
    UnknownIdentifier(String),

    /// Holds the rendering of the value that was applied.
    #[error("apply: invalid function: '{0}'")]
    InvalidFunction(String),

    #[error("{builtin}: not a number: '{value}'")]
    NotANumber { builtin: String, value: String },

    #[error("{builtin}: not a bool: '{value}'")]
    NotABool { builtin: String, value: String },

    /// A parse error that was only discovered once the tree was executed.
    #[error("parse error: {0}")]
    Parse(SyntaxError),
}

/// The single-argument transform behind a builtin.
pub type BuiltinFn = dyn Fn(Object) -> Result<Object, RuntimeError> + Send + Sync;

/// A primitive function. Multi-argument builtins return another builtin from
/// each step until all their arguments have been supplied.
#[derive(Clone)]
pub struct Builtin {
    name: String,
    transform: Arc<BuiltinFn>,
}

impl Builtin {
    pub fn new<F>(name: &str, transform: F) -> Builtin
    where
        F: Fn(Object) -> Result<Object, RuntimeError> + Send + Sync + 'static,
    {
        return Builtin {
            name: String::from(name),
            transform: Arc::new(transform),
        };
    }

    pub fn name(&self) -> &str {
        return self.name.as_str();
    }

    pub fn apply(&self, actual_arg: Object) -> Result<Object, RuntimeError> {
        return (self.transform)(actual_arg);
    }
}

/// A lambda paired with the environment it was evaluated in.
#[derive(Clone)]
pub struct Closure {
    formal_param: String,
    fn_body: Arc<ExprNode>,
    env: Environment,
}

impl Closure {
    pub fn apply(&self, actual_arg: Object) -> Result<Object, RuntimeError> {
        let call_env = self.env.extend(self.formal_param.as_str(), actual_arg);
        return eval_expr(&self.fn_body, &call_env);
    }
}

/// Represents a runtime value.
#[derive(Clone)]
pub enum Object {
    Error(RuntimeError),
    Bool(bool),
    Number(BigInt),
    Builtin(Builtin),
    Closure(Closure),
}

// Functions compare by identity: two builtins are equal when they share a
// transform, two closures when they share a body and a scope.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        return match (self, other) {
            (Object::Error(lhs), Object::Error(rhs)) => lhs == rhs,
            (Object::Bool(lhs), Object::Bool(rhs)) => lhs == rhs,
            (Object::Number(lhs), Object::Number(rhs)) => lhs == rhs,
            (Object::Builtin(lhs), Object::Builtin(rhs)) => {
                Arc::ptr_eq(&lhs.transform, &rhs.transform)
            }
            (Object::Closure(lhs), Object::Closure(rhs)) => {
                lhs.formal_param == rhs.formal_param
                    && Arc::ptr_eq(&lhs.fn_body, &rhs.fn_body)
                    && lhs.env.same_scope(&rhs.env)
            }
            _ => false,
        };
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Error(runtime_error) => return write!(f, "{}", runtime_error),
            Object::Bool(value) => return write!(f, "{}", value),
            Object::Number(value) => return write!(f, "{}", value),
            Object::Builtin(builtin) => return write!(f, "<function {}>", builtin.name),
            Object::Closure(closure) => return write!(f, "<lam {}>", closure.formal_param),
        }
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "Object({})", self);
    }
}

// Applies an already-evaluated function value to an already-evaluated
// argument.
fn apply_object(fn_value: Object, actual_arg: Object) -> Result<Object, RuntimeError> {
    match fn_value {
        Object::Builtin(builtin) => return builtin.apply(actual_arg),
        Object::Closure(closure) => return closure.apply(actual_arg),
        Object::Error(runtime_error) => return Err(runtime_error),
        not_a_function @ (Object::Bool(_) | Object::Number(_)) => {
            return Err(RuntimeError::InvalidFunction(not_a_function.to_string()));
        }
    }
}

/// Evaluates `expr_body` in `env`. The first error met in evaluation order is
/// returned and the remaining subexpressions are skipped.
fn eval_expr(expr_body: &ExprNode, env: &Environment) -> Result<Object, RuntimeError> {
    match expr_body {
        ExprNode::Number(value) => return Ok(Object::Number(value.clone())),

        ExprNode::Bool(value) => return Ok(Object::Bool(*value)),

        ExprNode::Var { var_name } => match env.lookup(var_name.as_str()) {
            Some(Object::Error(runtime_error)) => return Err(runtime_error.clone()),
            Some(value) => return Ok(value.clone()),
            None => return Err(RuntimeError::UnknownIdentifier(var_name.clone())),
        },

        // Capture the scope now; the body runs on each application.
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            return Ok(Object::Closure(Closure {
                formal_param: formal_param.clone(),
                fn_body: Arc::clone(fn_body),
                env: env.clone(),
            }));
        }

        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            let fn_value = eval_expr(fn_body, env)?;
            let arg_value = eval_expr(actual_arg, env)?;
            return apply_object(fn_value, arg_value);
        }

        ExprNode::Error(syntax_error) => {
            return Err(RuntimeError::Parse(syntax_error.clone()));
        }
    }
}

/// Evaluates a tree in the given environment. Errors come back as
/// `Object::Error`.
pub fn evaluate_in(expr_body: &ExprNode, env: &Environment) -> Object {
    return match eval_expr(expr_body, env) {
        Ok(value) => value,
        Err(runtime_error) => Object::Error(runtime_error),
    };
}

/// Evaluates a tree in the default environment, which binds `add`, `if` and
/// `gt`.
pub fn evaluate(expr_body: &ExprNode) -> Object {
    return evaluate_in(expr_body, default_environment());
}

/// Parses and evaluates a program in the default environment.
pub fn evaluate_source(program_str: &str) -> Object {
    return evaluate(&parse_recursive_descent(program_str));
}
