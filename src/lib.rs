pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod language;
pub mod runtime;
pub mod stack;

#[cfg(test)]
mod tests;
