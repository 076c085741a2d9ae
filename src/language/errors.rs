use crate::language::{span::Span, token::{Token, TokenKind}};
use miette::SourceSpan;
use std::fmt;

/// A static error: raised by the scanner, the parser or the resolver, always
/// before any code runs.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub label: String,
    pub span: Span,
    pub line: usize,
    pub help: Option<String>,
    location: Option<String>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span, line: usize) -> Self {
        let message = message.into();
        Self {
            label: message.clone(),
            message,
            span,
            line,
            help: None,
            location: None,
        }
    }

    /// Error anchored on a token; the rendered message names the token.
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        let mut err = Self::new(message, token.span, token.line);
        err.location = Some(if token.kind == TokenKind::Eof {
            "at end".to_string()
        } else {
            format!("at '{}'", token.lexeme)
        });
        err
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn to_source_span(&self) -> SourceSpan {
        self.span.into()
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "[line {}] Error {}: {}", self.line, location, self.message),
            None => write!(f, "[line {}] Error: {}", self.line, self.message),
        }
    }
}
