pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod function;
pub mod interpreter;
pub mod native;
pub mod output;
pub mod value;

pub use interpreter::{Interpreter, RunOutcome};
