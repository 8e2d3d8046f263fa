//! Run a given lambda calculus program and print the result to standard
//! output, or start an interactive session.
//!
//! Example usage:
//!
//!     cargo run -- \
//!         --src-filepath test_programs/sum_to_ten.lam

use clap::Parser;
use laminterp::end_to_end::{run_interpreter, InterpreterConfig};

fn main() {
    let interpreter_config = InterpreterConfig::parse();

    let interpreter_result = run_interpreter(&interpreter_config);

    match interpreter_result {
        Ok(Some(execution_result)) => {
            println!("{}", execution_result);
        }

        Ok(None) => {}

        Err(run_error) => {
            eprintln!("laminterp: {}", run_error);
            std::process::exit(1);
        }
    }
}
