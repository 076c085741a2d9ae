use crate::language::token::Token;
use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Operand must be a number.")]
    OperandNotNumber { token: Token },
    #[error("Operands must be numbers.")]
    OperandsNotNumbers { token: Token },
    #[error("Operands must be two numbers, or include a string.")]
    InvalidOperands { token: Token },
    #[error("Division by zero.")]
    DivisionByZero { token: Token },
    #[error("Can only call functions and classes.")]
    NotCallable { token: Token },
    #[error("Expected {expected} arguments but got {received}.")]
    ArityMismatch {
        token: Token,
        expected: usize,
        received: usize,
    },
    #[error("Undefined variable '{}'.", .token.lexeme)]
    UndefinedVariable { token: Token },
    #[error("Undefined property '{}'.", .token.lexeme)]
    UndefinedProperty { token: Token },
    #[error("Only instances have properties.")]
    InvalidReceiver { token: Token },
    #[error("Only instances have fields.")]
    InvalidFieldTarget { token: Token },
    #[error("Static method '{}' must be called on its class.", .token.lexeme)]
    StaticMethodOnInstance { token: Token },
    #[error("Superclass must be a class.")]
    InvalidSuperclass { token: Token },
    #[error("Invalid increment target.")]
    InvalidIncrementTarget { token: Token },
    #[error("'{}' used outside of a loop.", .token.lexeme)]
    LoopControlOutsideLoop { token: Token },
    #[error("Stack overflow: call depth exceeded {limit}.")]
    StackOverflow { token: Token, limit: usize },
}

impl RuntimeError {
    /// The token at which evaluation failed.
    pub fn token(&self) -> &Token {
        match self {
            RuntimeError::OperandNotNumber { token }
            | RuntimeError::OperandsNotNumbers { token }
            | RuntimeError::InvalidOperands { token }
            | RuntimeError::DivisionByZero { token }
            | RuntimeError::NotCallable { token }
            | RuntimeError::ArityMismatch { token, .. }
            | RuntimeError::UndefinedVariable { token }
            | RuntimeError::UndefinedProperty { token }
            | RuntimeError::InvalidReceiver { token }
            | RuntimeError::InvalidFieldTarget { token }
            | RuntimeError::StaticMethodOnInstance { token }
            | RuntimeError::InvalidSuperclass { token }
            | RuntimeError::InvalidIncrementTarget { token }
            | RuntimeError::LoopControlOutsideLoop { token }
            | RuntimeError::StackOverflow { token, .. } => token,
        }
    }

    pub fn line(&self) -> usize {
        self.token().line
    }

    /// Resource exhaustion aborts the process instead of being reported as
    /// an ordinary failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RuntimeError::StackOverflow { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{span::Span, token::TokenKind};

    #[test]
    fn messages_name_the_offending_token() {
        let token = Token::new(TokenKind::Identifier, "missing", 3, Span::new(0, 7));
        let err = RuntimeError::UndefinedVariable {
            token: token.clone(),
        };
        assert_eq!(err.to_string(), "Undefined variable 'missing'.");
        assert_eq!(err.line(), 3);
        assert!(!err.is_fatal());

        let err = RuntimeError::ArityMismatch {
            token,
            expected: 2,
            received: 1,
        };
        assert_eq!(err.to_string(), "Expected 2 arguments but got 1.");
    }

    #[test]
    fn only_stack_overflow_is_fatal() {
        let err = RuntimeError::StackOverflow {
            token: Token::synthetic(TokenKind::RightParen, ")"),
            limit: 16,
        };
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "Stack overflow: call depth exceeded 16.");
    }
}
