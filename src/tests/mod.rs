//! End-to-end language tests: whole programs through the driver with a
//! buffered print sink.

mod classes;
mod programs;

use crate::{
    config::Config,
    driver::{self, LoxError},
    runtime::{error::RuntimeError, output::PrintSink, Interpreter},
};

pub(crate) fn interpreter(config: Config) -> (Interpreter, PrintSink) {
    let sink = PrintSink::buffer();
    (Interpreter::with_output(config, sink.clone()), sink)
}

pub(crate) fn run(source: &str) -> (String, Result<(), LoxError>) {
    let (mut interpreter, sink) = interpreter(Config::default());
    let result = driver::run_source(&mut interpreter, source);
    (sink.contents(), result)
}

/// Output of a program that must run cleanly.
pub(crate) fn output(source: &str) -> String {
    let (out, result) = run(source);
    if let Err(err) = result {
        panic!("program failed: {err:?}\noutput so far:\n{out}");
    }
    out
}

/// The runtime error a program stops with, plus what it printed first.
pub(crate) fn runtime_error(source: &str) -> (String, RuntimeError) {
    match run(source) {
        (out, Err(LoxError::Runtime(err))) => (out, err),
        (out, other) => panic!("expected runtime error, got {other:?}\noutput:\n{out}"),
    }
}

pub(crate) fn static_errors(source: &str) -> Vec<String> {
    match run(source) {
        (_, Err(LoxError::Syntax(errors) | LoxError::Resolve(errors))) => {
            errors.iter().map(ToString::to_string).collect()
        }
        (out, other) => panic!("expected static errors, got {other:?}\noutput:\n{out}"),
    }
}
