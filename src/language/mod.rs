pub mod ast;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod resolver;
pub mod scope;
pub mod span;
pub mod token;
