use crate::{
    config::MAX_CALL_DEPTH_VAR,
    driver::LoxError,
    language::errors::SyntaxError,
    runtime::error::RuntimeError,
};
use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic, Clone)]
#[error("{message}")]
pub struct SyntaxDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("{label}")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
    message: String,
    label: String,
}

impl SyntaxDiagnostic {
    pub fn from_error(src: NamedSource<String>, err: &SyntaxError) -> Self {
        Self {
            src,
            span: err.to_source_span(),
            help: err.help.clone(),
            message: err.to_string(),
            label: err.label.clone(),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(lox::runtime))]
pub struct RuntimeDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
    message: String,
}

impl RuntimeDiagnostic {
    pub fn from_error(src: NamedSource<String>, err: &RuntimeError) -> Self {
        let help = err
            .is_fatal()
            .then(|| format!("raise {MAX_CALL_DEPTH_VAR} to allow deeper recursion"));
        Self {
            src,
            span: err.token().span.into(),
            help,
            message: format!("[line {}] {}", err.line(), err),
        }
    }
}

pub fn emit_syntax_errors(name: &str, source: &str, errors: &[SyntaxError]) {
    let src = NamedSource::new(name, source.to_string());
    for err in errors {
        let diagnostic = SyntaxDiagnostic::from_error(src.clone(), err);
        eprintln!("{:?}", Report::new(diagnostic));
    }
}

pub fn report_runtime_error(name: &str, source: &str, error: &RuntimeError) {
    let src = NamedSource::new(name, source.to_string());
    eprintln!("{:?}", Report::new(RuntimeDiagnostic::from_error(src, error)));
}

/// Full miette rendering of any pipeline failure.
pub fn report(name: &str, source: &str, error: &LoxError) {
    match error {
        LoxError::Syntax(errors) | LoxError::Resolve(errors) => {
            emit_syntax_errors(name, source, errors)
        }
        LoxError::Runtime(err) | LoxError::Fatal(err) => report_runtime_error(name, source, err),
    }
}

/// One line per error, for the interactive prompt.
pub fn report_plain(error: &LoxError) {
    match error {
        LoxError::Syntax(errors) | LoxError::Resolve(errors) => {
            for err in errors {
                eprintln!("{err}");
            }
        }
        LoxError::Runtime(err) | LoxError::Fatal(err) => {
            eprintln!("[line {}] {}", err.line(), err)
        }
    }
}

pub fn report_io_error(path: &Path, error: &std::io::Error) {
    eprintln!("Failed to access {}: {}", path.display(), error);
}
