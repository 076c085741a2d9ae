//! Static resolution pass.
//!
//! Walks the tree once before it runs, recording for every local variable
//! reference how many scopes separate it from its declaration, and rejecting
//! programs that are invalid regardless of input.

use crate::language::{
    ast::*,
    errors::SyntaxError,
    scope::{ScopeKind, INITIALIZER},
    token::Token,
};
use crate::stack::ensure_sufficient_stack;
use std::collections::HashMap;
use tracing::trace;

/// Lexical distance of every reference resolved to a local scope.
/// References missing from the table live in the global scope.
pub type Locals = HashMap<ExprId, usize>;

pub fn resolve(program: &Program) -> Result<Locals, Vec<SyntaxError>> {
    resolve_with_globals(program, Vec::new())
}

/// Resolves `program` after earlier runs already defined `defined` globals,
/// as in a REPL session.
pub fn resolve_with_globals(
    program: &Program,
    defined: impl IntoIterator<Item = String>,
) -> Result<Locals, Vec<SyntaxError>> {
    let mut resolver = Resolver::new();
    resolver.globals.extend(defined.into_iter().map(|name| (name, true)));
    resolver.resolve_stmts(&program.statements);
    if resolver.errors.is_empty() {
        Ok(resolver.locals)
    } else {
        Err(resolver.errors)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FunctionKind {
    None,
    Function,
    Method,
    Initializer,
    StaticMethod,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

struct Resolver {
    /// Name → ready. A name is declared (false) while its initializer is
    /// being resolved, and ready (true) afterwards.
    scopes: Vec<HashMap<String, bool>>,
    globals: HashMap<String, bool>,
    locals: Locals,
    errors: Vec<SyntaxError>,
    current_function: FunctionKind,
    current_class: ClassKind,
    /// Inside a static method body, including functions nested in it.
    in_static: bool,
    /// Loops enclosing the current point within the current function body.
    loop_depth: usize,
}

impl Resolver {
    fn new() -> Self {
        Self {
            scopes: Vec::new(),
            globals: HashMap::new(),
            locals: Locals::new(),
            errors: Vec::new(),
            current_function: FunctionKind::None,
            current_class: ClassKind::None,
            in_static: false,
            loop_depth: 0,
        }
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        ensure_sufficient_stack(|| self.resolve_stmt_inner(stmt))
    }

    fn resolve_stmt_inner(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope(ScopeKind::Block);
                self.resolve_stmts(statements);
                self.end_scope();
            }
            Stmt::Class(class) => self.resolve_class(class),
            Stmt::Expression(Expr::Keyword { keyword, control }) => {
                if self.loop_depth == 0 {
                    self.error(
                        SyntaxError::at(
                            keyword,
                            format!("Can't use '{}' outside of a loop.", control.keyword()),
                        )
                        .with_help("loop control does not reach across function boundaries"),
                    );
                }
            }
            Stmt::Expression(expr) => self.resolve_expr(expr),
            Stmt::Function(function) => {
                self.declare(&function.name);
                self.define(&function.name);
                self.resolve_function(function, FunctionKind::Function);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionKind::None {
                    self.error(SyntaxError::at(keyword, "Can't return from top-level code."));
                }
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer);
                }
                self.define(name);
            }
            Stmt::While {
                condition,
                body,
                increment,
            } => {
                self.resolve_expr(condition);
                self.loop_depth += 1;
                self.resolve_stmt(body);
                self.loop_depth -= 1;
                if let Some(increment) = increment {
                    self.resolve_expr(increment);
                }
            }
        }
    }

    fn resolve_class(&mut self, class: &ClassDecl) {
        let enclosing_class = self.current_class;
        self.current_class = ClassKind::Class;

        self.declare(&class.name);
        self.define(&class.name);

        if let Some(superclass) = &class.superclass {
            if let Expr::Variable { name, .. } = superclass {
                if name.lexeme == class.name.lexeme {
                    self.error(SyntaxError::at(name, "A class can't inherit from itself."));
                }
            }
            self.current_class = ClassKind::Subclass;
            self.resolve_expr(superclass);
            self.begin_scope(ScopeKind::Superclass);
        }

        self.begin_scope(ScopeKind::Receiver);
        for method in class.methods.iter().filter(|method| !method.is_static) {
            let kind = if method.name.lexeme == INITIALIZER {
                FunctionKind::Initializer
            } else {
                FunctionKind::Method
            };
            self.resolve_function(method, kind);
        }
        self.end_scope();

        // Static methods are never bound, so they close over the scope
        // outside the receiver.
        for method in class.methods.iter().filter(|method| method.is_static) {
            self.resolve_function(method, FunctionKind::StaticMethod);
        }

        if class.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_function(&mut self, function: &FunctionDecl, kind: FunctionKind) {
        let enclosing_function = self.current_function;
        let enclosing_loops = self.loop_depth;
        let enclosing_static = self.in_static;
        self.current_function = kind;
        self.loop_depth = 0;
        match kind {
            FunctionKind::StaticMethod => self.in_static = true,
            FunctionKind::Method | FunctionKind::Initializer => self.in_static = false,
            FunctionKind::Function | FunctionKind::None => {}
        }

        self.begin_scope(ScopeKind::Call);
        for param in &function.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&function.body);
        self.end_scope();

        self.current_function = enclosing_function;
        self.loop_depth = enclosing_loops;
        self.in_static = enclosing_static;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        ensure_sufficient_stack(|| self.resolve_expr_inner(expr))
    }

    fn resolve_expr_inner(&mut self, expr: &Expr) {
        match expr {
            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }
            Expr::Binary { left, right, .. } | Expr::Logic { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for argument in arguments {
                    self.resolve_expr(argument);
                }
            }
            Expr::Get { object, .. } => self.resolve_expr(object),
            Expr::Grouping(inner) => self.resolve_expr(inner),
            Expr::Literal(_) => {}
            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            Expr::Super { id, keyword, .. } => match self.current_class {
                ClassKind::None => {
                    self.error(SyntaxError::at(keyword, "Can't use 'super' outside of a class."))
                }
                ClassKind::Class => self.error(SyntaxError::at(
                    keyword,
                    "Can't use 'super' in a class with no superclass.",
                )),
                ClassKind::Subclass if self.in_static => {
                    self.error(SyntaxError::at(keyword, "Can't use 'super' in a static method."))
                }
                ClassKind::Subclass => self.resolve_local(*id, keyword),
            },
            Expr::This { id, keyword } => {
                if self.current_class == ClassKind::None {
                    self.error(SyntaxError::at(keyword, "Can't use 'this' outside of a class."));
                } else if self.in_static {
                    self.error(SyntaxError::at(keyword, "Can't use 'this' in a static method."));
                } else {
                    self.resolve_local(*id, keyword);
                }
            }
            Expr::Unary { right, .. } => self.resolve_expr(right),
            Expr::Variable { id, name } => {
                let (state, scope) = match self.scopes.last() {
                    Some(scope) => (scope.get(&name.lexeme), "local"),
                    None => (self.globals.get(&name.lexeme), "global"),
                };
                if state == Some(&false) {
                    self.error(SyntaxError::at(
                        name,
                        format!("Can't read {scope} variable in its own initializer."),
                    ));
                }
                self.resolve_local(*id, name);
            }
            Expr::Keyword { keyword, control } => self.error(
                SyntaxError::at(
                    keyword,
                    format!("Can't use '{}' inside an expression.", control.keyword()),
                )
                .with_help(format!("write `{};` as a statement of its own", control.keyword())),
            ),
        }
    }

    /// Records the distance to the innermost scope declaring `name`. Names
    /// not found locally are global and get no entry.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        let found = self
            .scopes
            .iter()
            .rev()
            .position(|scope| scope.contains_key(&name.lexeme));
        if let Some(distance) = found {
            trace!(name = %name.lexeme, line = name.line, distance, "resolved local");
            self.locals.insert(id, distance);
        }
    }

    fn begin_scope(&mut self, kind: ScopeKind) {
        let mut scope = HashMap::new();
        if let Some(name) = kind.implicit_binding() {
            scope.insert(name.to_string(), true);
        }
        self.scopes.push(scope);
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Redeclaring a global that is already defined keeps it readable, so
    /// `var a = a + 1;` sees the earlier value.
    fn declare(&mut self, name: &Token) {
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name.lexeme.clone(), false);
            }
            None => {
                self.globals.entry(name.lexeme.clone()).or_insert(false);
            }
        }
    }

    fn define(&mut self, name: &Token) {
        self.current_scope().insert(name.lexeme.clone(), true);
    }

    fn current_scope(&mut self) -> &mut HashMap<String, bool> {
        match self.scopes.last_mut() {
            Some(scope) => scope,
            None => &mut self.globals,
        }
    }

    fn error(&mut self, err: SyntaxError) {
        self.errors.push(err);
    }
}
