//! The builtin library: curried `add`, `if` and `gt`, and the default
//! environment that binds them.

use lazy_static::lazy_static;
use num_bigint::BigInt;

use crate::shared_tree_impl::shared_tree_environment::Environment;
use crate::shared_tree_impl::shared_tree_execution::{Builtin, Object, RuntimeError};

lazy_static! {
    static ref DEFAULT_ENVIRONMENT: Environment = Environment::empty()
        .extend("add", Object::Builtin(builtin_add()))
        .extend("if", Object::Builtin(builtin_if()))
        .extend("gt", Object::Builtin(builtin_gt()));
}

/// The environment every program starts in.
pub fn default_environment() -> &'static Environment {
    return &DEFAULT_ENVIRONMENT;
}

fn expect_number(builtin_name: &str, value: Object) -> Result<BigInt, RuntimeError> {
    match value {
        Object::Number(number) => return Ok(number),
        other => {
            return Err(RuntimeError::NotANumber {
                builtin: String::from(builtin_name),
                value: other.to_string(),
            })
        }
    }
}

fn expect_bool(builtin_name: &str, value: Object) -> Result<bool, RuntimeError> {
    match value {
        Object::Bool(flag) => return Ok(flag),
        other => {
            return Err(RuntimeError::NotABool {
                builtin: String::from(builtin_name),
                value: other.to_string(),
            })
        }
    }
}

// Name of a builtin after it has received `arg`, e.g. "add 1".
fn partial_name(builtin_name: &str, arg: &Object) -> String {
    return format!("{} {}", builtin_name, arg);
}

/// `add`: number -> number -> number.
pub fn builtin_add() -> Builtin {
    return Builtin::new("add", |first_arg| {
        let name = partial_name("add", &first_arg);
        let lhs = expect_number("add", first_arg)?;

        return Ok(Object::Builtin(Builtin::new(name.as_str(), move |second_arg| {
            let rhs = expect_number("add", second_arg)?;
            return Ok(Object::Number(&lhs + rhs));
        })));
    });
}

/// `if`: bool -> a -> a -> a. Returns the second argument when the first is
/// true, the third otherwise. Both branches are already evaluated by the time
/// `if` sees them.
pub fn builtin_if() -> Builtin {
    return Builtin::new("if", |first_arg| {
        let name = partial_name("if", &first_arg);
        let condition = expect_bool("if", first_arg)?;
        let if_name = name.clone();

        return Ok(Object::Builtin(Builtin::new(if_name.as_str(), move |then_value| {
            let name = partial_name(name.as_str(), &then_value);

            return Ok(Object::Builtin(Builtin::new(name.as_str(), move |else_value| {
                if condition {
                    return Ok(then_value.clone());
                }
                return Ok(else_value);
            })));
        })));
    });
}

/// `gt`: number -> number -> bool. True when the first argument is strictly
/// greater than the second.
pub fn builtin_gt() -> Builtin {
    return Builtin::new("gt", |first_arg| {
        let name = partial_name("gt", &first_arg);
        let lhs = expect_number("gt", first_arg)?;

        return Ok(Object::Builtin(Builtin::new(name.as_str(), move |second_arg| {
            let rhs = expect_number("gt", second_arg)?;
            return Ok(Object::Bool(lhs > rhs));
        })));
    });
}
