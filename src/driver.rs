//! The scan, parse, resolve and run pipeline shared by the CLI and tests.

use crate::language::{errors::SyntaxError, lexer, parser};
use crate::runtime::{error::RuntimeError, Interpreter, RunOutcome};
use thiserror::Error;
use tracing::debug;

pub const EXIT_USAGE: i32 = 64;
pub const EXIT_STATIC_ERROR: i32 = 65;
pub const EXIT_NO_INPUT: i32 = 66;
pub const EXIT_RUNTIME_ERROR: i32 = 70;
pub const EXIT_FATAL: i32 = 71;

#[derive(Debug, Error)]
pub enum LoxError {
    #[error("{} syntax error(s)", .0.len())]
    Syntax(Vec<SyntaxError>),
    #[error("{} resolution error(s)", .0.len())]
    Resolve(Vec<SyntaxError>),
    #[error("runtime error: {0}")]
    Runtime(RuntimeError),
    #[error("fatal: {0}")]
    Fatal(RuntimeError),
}

impl LoxError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Syntax(_) | LoxError::Resolve(_) => EXIT_STATIC_ERROR,
            LoxError::Runtime(_) => EXIT_RUNTIME_ERROR,
            LoxError::Fatal(_) => EXIT_FATAL,
        }
    }
}

/// Runs `source` on `interpreter`. Globals defined by earlier calls stay
/// visible, so one interpreter can serve a whole prompt session.
pub fn run_source(interpreter: &mut Interpreter, source: &str) -> Result<(), LoxError> {
    let tokens = lexer::lex(source).map_err(LoxError::Syntax)?;
    debug!(tokens = tokens.len(), "scanned");
    let program = parser::parse(&tokens).map_err(LoxError::Syntax)?;
    debug!(statements = program.statements.len(), "parsed");

    let errors = interpreter.resolve(&program);
    if !errors.is_empty() {
        return Err(LoxError::Resolve(errors));
    }

    match interpreter.interpret(&program) {
        RunOutcome::Completed => Ok(()),
        RunOutcome::Failed(err) => Err(LoxError::Runtime(err)),
        RunOutcome::Aborted(err) => Err(LoxError::Fatal(err)),
    }
}
