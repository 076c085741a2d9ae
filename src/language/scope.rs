//! The constructs that open a scope, shared by the resolver and the
//! interpreter.
//!
//! The resolver computes lexical distances by counting scopes; the
//! interpreter walks exactly that many environment links at run time. Both
//! passes open every scope through a [`ScopeKind`] so the two chains keep the
//! same shape:
//!
//! | construct            | resolver                      | interpreter                          |
//! |----------------------|-------------------------------|--------------------------------------|
//! | block                | push scope                    | child environment                    |
//! | function call        | push scope holding parameters | child of the closure                 |
//! | subclass declaration | push scope holding `super`    | child holding the superclass         |
//! | instance methods     | push scope holding `this`     | child created by binding to instance |

pub const THIS: &str = "this";
pub const SUPER: &str = "super";
pub const INITIALIZER: &str = "init";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Block,
    Call,
    Superclass,
    Receiver,
}

impl ScopeKind {
    /// The name a scope of this kind binds on creation, if any.
    pub fn implicit_binding(&self) -> Option<&'static str> {
        match self {
            ScopeKind::Superclass => Some(SUPER),
            ScopeKind::Receiver => Some(THIS),
            ScopeKind::Block | ScopeKind::Call => None,
        }
    }
}
