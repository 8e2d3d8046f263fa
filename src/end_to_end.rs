//! Code to configure and run the interpreter on a source file, on standard
//! input, or interactively.

use std::fs;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use thiserror::Error;

use crate::lexical_analysis::run_lexical_analysis;
use crate::shared_tree_impl::shared_tree_ast::{pretty_print, ExprNode, SyntaxError};
use crate::shared_tree_impl::shared_tree_execution::{evaluate, Object, RuntimeError};
use crate::shared_tree_impl::shared_tree_recursive_descent_parsing::parse_recursive_descent;

/// Supported interpreter implementations.
pub const SUPPORTED_IMPLS: [&str; 1] = ["shared_tree"];

const FRESH_PROMPT: &str = ">> ";
const CONTINUATION_PROMPT: &str = ".. ";
const HISTORY_FILE_NAME: &str = ".laminterp_history";

/// Config for the interpreter. Instantiate via `InterpreterConfig::parse()`.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct InterpreterConfig {
    /// Which implementation to use. Must be present inside `SUPPORTED_IMPLS`.
    #[arg(short, long, default_value_t = String::from("shared_tree"))]
    pub impl_name: String,

    /// The input filepath to run on. Without it, an interactive session starts
    /// when standard input is a terminal, otherwise standard input is run as
    /// one program.
    #[arg(short, long)]
    pub src_filepath: Option<String>,

    /// Print a formatted version of the program instead of evaluating it.
    #[arg(short, long)]
    pub format: bool,

    /// Trace each interpreter stage to standard error.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        return InterpreterConfig {
            impl_name: String::from(SUPPORTED_IMPLS[0]),
            src_filepath: None,
            format: false,
            verbose: false,
        };
    }
}

/// Errors that may be thrown when running the interpreter.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("interpreter configuration error: {0}")]
    Config(String),

    #[error("input file error: {0}")]
    InputFile(#[from] std::io::Error),

    #[error("line editor error: {0}")]
    Readline(#[from] ReadlineError),

    #[error("parse error: {0}")]
    Parse(SyntaxError),

    #[error("runtime error: {0}")]
    Runtime(RuntimeError),

    #[error("unable to start worker thread: {0}")]
    Worker(std::io::Error),
}

// Parsing and evaluation recurse once per nesting level, so deep programs
// run on a worker thread with this much stack.
const WORKER_STACK_SIZE: usize = 512 * 1024 * 1024;

/// Runs `job` to completion on a thread with a `WORKER_STACK_SIZE` stack. A
/// panic in the job is resumed on the calling thread.
fn run_on_large_stack<T, F>(job: F) -> Result<T, RunError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let worker = std::thread::Builder::new()
        .name(String::from("laminterp-worker"))
        .stack_size(WORKER_STACK_SIZE)
        .spawn(job)
        .map_err(RunError::Worker)?;

    return match worker.join() {
        Ok(result) => Ok(result),
        Err(panic_payload) => std::panic::resume_unwind(panic_payload),
    };
}

// Body of `run_program_string`, run on the worker thread. The tree is also
// dropped there.
fn run_program_on_worker(
    config: &InterpreterConfig,
    program_str: &str,
) -> Result<String, RunError> {
    if config.verbose {
        eprintln!("Source: {:?}", program_str);
        eprintln!("Tokens: {:?}", run_lexical_analysis(program_str));
    }

    // Run parser.
    let program = parse_recursive_descent(program_str);

    if let ExprNode::Error(syntax_error) = &*program {
        return Err(RunError::Parse(syntax_error.clone()));
    }

    if config.verbose {
        eprintln!("Parsed program: {}", program);
    }

    if config.format {
        return Ok(pretty_print(&program));
    }

    // Execute the program.
    let execution_result = evaluate(&program);

    if config.verbose {
        eprintln!("Result: {}", execution_result);
    }

    return match execution_result {
        Object::Error(runtime_error) => Err(RunError::Runtime(runtime_error)),
        value => Ok(value.to_string()),
    };
}

/// Run the lexer, parser and evaluator (or pretty printer) on one complete
/// program, returning the text to display.
pub fn run_program_string(
    config: &InterpreterConfig,
    program_str: &str,
) -> Result<String, RunError> {
    let config = config.clone();
    let program_string = String::from(program_str);

    return run_on_large_stack(move || run_program_on_worker(&config, program_string.as_str()))?;
}

/// Run a whole program read from `config.src_filepath`, or from standard input
/// when no path is given.
pub fn run_batch_interpreter(config: &InterpreterConfig) -> Result<String, RunError> {
    let program_string = match &config.src_filepath {
        Some(src_filepath) => fs::read_to_string(src_filepath)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    return run_program_string(config, program_string.as_str());
}

/// What an interactive session should do after receiving a line.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplStep {
    /// The program so far is a valid prefix; keep reading.
    NeedMore,
    /// The program is finished (or broken); display this and start over.
    Output(String),
}

/// The line-accumulation state of an interactive session, independent of the
/// terminal.
#[derive(Debug, Default)]
pub struct ReplSession {
    program: String,
    format: bool,
}

impl ReplSession {
    pub fn new(format: bool) -> ReplSession {
        return ReplSession {
            program: String::new(),
            format,
        };
    }

    pub fn prompt(&self) -> &'static str {
        if self.program.is_empty() {
            return FRESH_PROMPT;
        }
        return CONTINUATION_PROMPT;
    }

    pub fn is_empty(&self) -> bool {
        return self.program.is_empty();
    }

    /// Drops any partially entered program.
    pub fn reset(&mut self) {
        self.program.clear();
    }

    /// Adds a line to the pending program and tries to parse everything
    /// entered so far. A parse that only failed because input ran out asks for
    /// more. Fails only if the worker thread can't be started.
    pub fn feed_line(&mut self, line: &str) -> Result<ReplStep, RunError> {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            self.program.push_str(trimmed);
            self.program.push('\n');
        }

        let program_string = self.program.clone();
        let format = self.format;

        let step = run_on_large_stack(move || {
            let program = parse_recursive_descent(program_string.as_str());

            if program.is_unexpected_end_of_input() {
                return ReplStep::NeedMore;
            }

            let output = match &*program {
                ExprNode::Error(syntax_error) => format!("parse error: {}", syntax_error),
                _ if format => pretty_print(&program),
                _ => evaluate(&program).to_string(),
            };

            return ReplStep::Output(output);
        })?;

        if let ReplStep::Output(_) = step {
            self.reset();
        }

        return Ok(step);
    }
}

fn history_file_path() -> Option<PathBuf> {
    return dirs::home_dir().map(|mut path| {
        path.push(HISTORY_FILE_NAME);
        path
    });
}

/// Run an interactive session until the user quits with an interrupt or end
/// of file on an empty prompt.
pub fn run_interactive_interpreter(config: &InterpreterConfig) -> Result<(), RunError> {
    let mut rl = DefaultEditor::new()?;
    let history_file = history_file_path();

    if let Some(path) = &history_file {
        let _ = rl.load_history(path);
    }

    let mut session = ReplSession::new(config.format);

    loop {
        match rl.readline(session.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }

                if let ReplStep::Output(output) = session.feed_line(line.as_str())? {
                    println!("{}", output);
                }
            }

            // With nothing pending the user is probably trying to quit;
            // otherwise they're abandoning the current program.
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                if session.is_empty() {
                    break;
                }
                session.reset();
            }

            Err(readline_error) => return Err(RunError::Readline(readline_error)),
        }
    }

    if let Some(path) = &history_file {
        let _ = rl.save_history(path);
    }

    return Ok(());
}

/// Run an interpreter (i.e. the lexer, parser, and code execution) given an
/// interpreter config. Returns the text to print for batch runs and `None`
/// after an interactive session.
pub fn run_interpreter(config: &InterpreterConfig) -> Result<Option<String>, RunError> {
    if !SUPPORTED_IMPLS.contains(&config.impl_name.as_str()) {
        return Err(RunError::Config(format!(
            "Unrecognized implementation name {}",
            config.impl_name
        )));
    }

    if config.src_filepath.is_none() && std::io::stdin().is_terminal() {
        run_interactive_interpreter(config)?;
        return Ok(None);
    }

    return run_batch_interpreter(config).map(Some);
}
