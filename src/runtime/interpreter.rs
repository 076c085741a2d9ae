use crate::config::Config;
use crate::stack::ensure_sufficient_stack;
use crate::language::{
    ast::*,
    errors::SyntaxError,
    resolver::{self, Locals},
    scope::{ScopeKind, INITIALIZER, THIS},
    token::{Token, TokenKind},
};
use crate::runtime::{
    callable::Callable,
    class::{Class, Instance},
    environment::{EnvRef, Environment},
    error::{RuntimeError, RuntimeResult},
    function::Function,
    native,
    output::PrintSink,
    value::Value,
};
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;
use tracing::{debug, trace};

pub struct Interpreter {
    globals: EnvRef,
    env: EnvRef,
    locals: Locals,
    config: Config,
    depth: usize,
    output: PrintSink,
}

/// Why a statement stopped before falling through to the next one.
#[derive(Debug)]
pub enum FlowSignal {
    Break(Token),
    Continue(Token),
    Return(Value),
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed,
    Failed(RuntimeError),
    /// Resource exhaustion; the host should stop rather than carry on.
    Aborted(RuntimeError),
}

impl Interpreter {
    pub fn new(config: Config) -> Self {
        Self::with_output(config, PrintSink::Stdout)
    }

    pub fn with_output(config: Config, output: PrintSink) -> Self {
        let globals = Environment::global();
        native::install(&globals);
        Self {
            env: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            config,
            depth: 0,
            output,
        }
    }

    /// Resolves `program` and records its lexical distances. The program must
    /// not be interpreted unless this returns no errors.
    pub fn resolve(&mut self, program: &Program) -> Vec<SyntaxError> {
        let defined = self.globals.borrow().names();
        match resolver::resolve_with_globals(program, defined) {
            Ok(locals) => {
                debug!(resolved = locals.len(), "resolution finished");
                self.locals.extend(locals);
                Vec::new()
            }
            Err(errors) => errors,
        }
    }

    /// Runs `program` against the persistent globals, stopping at the first
    /// runtime error. Effects already performed are kept.
    pub fn interpret(&mut self, program: &Program) -> RunOutcome {
        for statement in &program.statements {
            match self.eval_statement(statement) {
                Ok(None) => {}
                Ok(Some(FlowSignal::Break(keyword) | FlowSignal::Continue(keyword))) => {
                    return RunOutcome::Failed(RuntimeError::LoopControlOutsideLoop {
                        token: keyword,
                    });
                }
                Ok(Some(FlowSignal::Return(_))) => break,
                Err(err) if err.is_fatal() => return RunOutcome::Aborted(err),
                Err(err) => return RunOutcome::Failed(err),
            }
        }
        RunOutcome::Completed
    }

    fn eval_statement(&mut self, statement: &Stmt) -> RuntimeResult<Option<FlowSignal>> {
        ensure_sufficient_stack(|| self.eval_statement_inner(statement))
    }

    fn eval_statement_inner(&mut self, statement: &Stmt) -> RuntimeResult<Option<FlowSignal>> {
        match statement {
            Stmt::Block(statements) => {
                let scope = Environment::open(&self.env, ScopeKind::Block, None);
                self.execute_block(statements, scope)
            }
            Stmt::Class(class) => {
                self.declare_class(class)?;
                Ok(None)
            }
            Stmt::Expression(Expr::Keyword { keyword, control }) => Ok(Some(match control {
                LoopControl::Break => FlowSignal::Break(keyword.clone()),
                LoopControl::Continue => FlowSignal::Continue(keyword.clone()),
            })),
            Stmt::Expression(expr) => {
                self.eval_expression(expr)?;
                Ok(None)
            }
            Stmt::Function(declaration) => {
                debug!(name = %declaration.name.lexeme, line = declaration.name.line, "declare function");
                let function = Function::new(Rc::clone(declaration), Rc::clone(&self.env), false);
                self.env.borrow_mut().define(
                    declaration.name.lexeme.clone(),
                    Value::Callable(Callable::Function(Rc::new(function))),
                );
                Ok(None)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval_expression(condition)?.is_truthy() {
                    self.eval_statement(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.eval_statement(else_branch)
                } else {
                    Ok(None)
                }
            }
            Stmt::Print(expr) => {
                let value = self.eval_expression(expr)?;
                self.output.println(&value.to_string());
                Ok(None)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expression(expr)?,
                    None => Value::Nil,
                };
                Ok(Some(FlowSignal::Return(value)))
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.eval_expression(expr)?,
                    None => Value::Nil,
                };
                self.env.borrow_mut().define(name.lexeme.clone(), value);
                Ok(None)
            }
            Stmt::While {
                condition,
                body,
                increment,
            } => {
                while self.eval_expression(condition)?.is_truthy() {
                    match self.eval_statement(body)? {
                        None | Some(FlowSignal::Continue(_)) => {}
                        Some(FlowSignal::Break(_)) => break,
                        Some(flow @ FlowSignal::Return(_)) => return Ok(Some(flow)),
                    }
                    if let Some(increment) = increment {
                        self.eval_expression(increment)?;
                    }
                }
                Ok(None)
            }
        }
    }

    /// Runs `statements` with `scope` as the current environment. The previous
    /// environment is restored whether the block completes, signals or fails.
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Stmt],
        scope: EnvRef,
    ) -> RuntimeResult<Option<FlowSignal>> {
        let previous = mem::replace(&mut self.env, scope);
        let result = self.run_statements(statements);
        self.env = previous;
        result
    }

    fn run_statements(&mut self, statements: &[Stmt]) -> RuntimeResult<Option<FlowSignal>> {
        for statement in statements {
            if let Some(flow) = self.eval_statement(statement)? {
                return Ok(Some(flow));
            }
        }
        Ok(None)
    }

    fn declare_class(&mut self, class: &ClassDecl) -> RuntimeResult<()> {
        let superclass = match &class.superclass {
            Some(expr) => match self.eval_expression(expr)? {
                Value::Callable(Callable::Class(superclass)) => Some(superclass),
                _ => {
                    let token = match expr {
                        Expr::Variable { name, .. } => name.clone(),
                        _ => class.name.clone(),
                    };
                    return Err(RuntimeError::InvalidSuperclass { token });
                }
            },
            None => None,
        };

        self.env
            .borrow_mut()
            .define(class.name.lexeme.clone(), Value::Nil);

        let closure = match &superclass {
            Some(superclass) => Environment::open(
                &self.env,
                ScopeKind::Superclass,
                Some(Value::Callable(Callable::Class(Rc::clone(superclass)))),
            ),
            None => Rc::clone(&self.env),
        };

        let mut methods = HashMap::new();
        let mut static_methods = HashMap::new();
        for method in &class.methods {
            let is_initializer = !method.is_static && method.name.lexeme == INITIALIZER;
            let function = Rc::new(Function::new(
                Rc::clone(method),
                Rc::clone(&closure),
                is_initializer,
            ));
            let table = if method.is_static {
                &mut static_methods
            } else {
                &mut methods
            };
            table.insert(method.name.lexeme.clone(), function);
        }

        debug!(
            name = %class.name.lexeme,
            superclass = superclass.as_ref().map(|s| s.name.as_str()),
            methods = methods.len(),
            static_methods = static_methods.len(),
            "declare class"
        );
        let value = Class::new(class.name.lexeme.clone(), superclass, methods, static_methods);
        self.env
            .borrow_mut()
            .assign(&class.name, Value::Callable(Callable::Class(Rc::new(value))))
    }

    fn eval_expression(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        ensure_sufficient_stack(|| self.eval_expression_inner(expr))
    }

    fn eval_expression_inner(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        match expr {
            Expr::Assign { id, name, value } => {
                let value = self.eval_expression(value)?;
                self.assign_variable(*id, name, value.clone())?;
                Ok(value)
            }
            Expr::Binary {
                left,
                operator,
                op,
                right,
            } => {
                let left = self.eval_expression(left)?;
                let right = self.eval_expression(right)?;
                eval_binary(*op, operator, left, right)
            }
            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.eval_expression(callee)?;
                let arguments = self.eval_arguments(arguments)?;
                self.call_value(callee, arguments, paren)
            }
            Expr::Get { object, name } => match self.eval_expression(object)? {
                Value::Instance(instance) => Instance::get(&instance, name),
                Value::Callable(Callable::Class(class)) => class.get(name),
                _ => Err(RuntimeError::InvalidReceiver {
                    token: name.clone(),
                }),
            },
            Expr::Grouping(inner) => self.eval_expression(inner),
            Expr::Literal(literal) => Ok(Value::from(literal)),
            Expr::Logic { left, op, right, .. } => {
                let left = self.eval_expression(left)?;
                let decided = match op {
                    LogicOp::Or => left.is_truthy(),
                    LogicOp::And => !left.is_truthy(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.eval_expression(right)
                }
            }
            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.eval_expression(object)? else {
                    return Err(RuntimeError::InvalidFieldTarget {
                        token: name.clone(),
                    });
                };
                let value = self.eval_expression(value)?;
                instance.borrow_mut().set(name, value.clone());
                Ok(value)
            }
            Expr::Super {
                id,
                keyword,
                method,
            } => self.eval_super(*id, keyword, method),
            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),
            Expr::Unary {
                operator,
                op,
                right,
            } => match op {
                UnaryOp::Not => Ok(Value::Bool(!self.eval_expression(right)?.is_truthy())),
                UnaryOp::Neg => match self.eval_expression(right)? {
                    Value::Number(n) => Ok(Value::Number(-n)),
                    _ => Err(RuntimeError::OperandNotNumber {
                        token: operator.clone(),
                    }),
                },
                UnaryOp::Increment | UnaryOp::Decrement => {
                    self.eval_increment(operator, *op, right)
                }
            },
            Expr::Variable { id, name } => self.look_up_variable(*id, name),
            Expr::Keyword { keyword, .. } => Err(RuntimeError::LoopControlOutsideLoop {
                token: keyword.clone(),
            }),
        }
    }

    fn eval_arguments(&mut self, args: &[Expr]) -> RuntimeResult<Vec<Value>> {
        args.iter().map(|arg| self.eval_expression(arg)).collect()
    }

    fn call_value(
        &mut self,
        callee: Value,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> RuntimeResult<Value> {
        let Value::Callable(callable) = callee else {
            return Err(RuntimeError::NotCallable {
                token: paren.clone(),
            });
        };
        if arguments.len() != callable.arity() {
            return Err(RuntimeError::ArityMismatch {
                token: paren.clone(),
                expected: callable.arity(),
                received: arguments.len(),
            });
        }
        if self.depth >= self.config.max_call_depth {
            return Err(RuntimeError::StackOverflow {
                token: paren.clone(),
                limit: self.config.max_call_depth,
            });
        }

        trace!(callee = %callable, depth = self.depth, line = paren.line, "call");
        self.depth += 1;
        let result = ensure_sufficient_stack(|| callable.call(self, arguments, paren));
        self.depth -= 1;
        result
    }

    fn eval_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> RuntimeResult<Value> {
        let distance = self.locals.get(&id).copied().ok_or_else(|| {
            RuntimeError::UndefinedVariable {
                token: keyword.clone(),
            }
        })?;
        let Value::Callable(Callable::Class(superclass)) =
            Environment::get_at(&self.env, distance, keyword)?
        else {
            return Err(RuntimeError::InvalidSuperclass {
                token: keyword.clone(),
            });
        };
        // the receiver scope always sits directly inside the superclass scope
        let this = Token::new(TokenKind::This, THIS, keyword.line, keyword.span);
        let Value::Instance(instance) =
            Environment::get_at(&self.env, distance.saturating_sub(1), &this)?
        else {
            return Err(RuntimeError::InvalidReceiver {
                token: method.clone(),
            });
        };
        let found = superclass.find_method(&method.lexeme).ok_or_else(|| {
            RuntimeError::UndefinedProperty {
                token: method.clone(),
            }
        })?;
        Ok(Value::Callable(Callable::Function(Rc::new(
            found.bind(&instance),
        ))))
    }

    fn eval_increment(&mut self, operator: &Token, op: UnaryOp, target: &Expr) -> RuntimeResult<Value> {
        let Expr::Variable { id, name } = target else {
            return Err(RuntimeError::InvalidIncrementTarget {
                token: operator.clone(),
            });
        };
        let Value::Number(current) = self.look_up_variable(*id, name)? else {
            return Err(RuntimeError::OperandNotNumber {
                token: operator.clone(),
            });
        };
        let updated = match op {
            UnaryOp::Decrement => Value::Number(current - 1.0),
            _ => Value::Number(current + 1.0),
        };
        self.assign_variable(*id, name, updated.clone())?;
        Ok(updated)
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> RuntimeResult<Value> {
        match self.locals.get(&id) {
            Some(distance) => Environment::get_at(&self.env, *distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn assign_variable(&mut self, id: ExprId, name: &Token, value: Value) -> RuntimeResult<()> {
        match self.locals.get(&id) {
            Some(distance) => Environment::assign_at(&self.env, *distance, name, value),
            None => self.globals.borrow_mut().assign(name, value),
        }
    }
}

fn eval_binary(op: BinaryOp, operator: &Token, left: Value, right: Value) -> RuntimeResult<Value> {
    let numbers = match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => Some((*a, *b)),
        _ => None,
    };
    let value = match (op, numbers) {
        (BinaryOp::Eq, _) => Value::Bool(left == right),
        (BinaryOp::NotEq, _) => Value::Bool(left != right),
        (BinaryOp::Add, Some((a, b))) => Value::Number(a + b),
        (BinaryOp::Add, None) => match (&left, &right) {
            (Value::Str(_) | Value::Number(_), _) | (_, Value::Str(_) | Value::Number(_)) => {
                Value::string(format!("{left}{right}"))
            }
            _ => {
                return Err(RuntimeError::InvalidOperands {
                    token: operator.clone(),
                })
            }
        },
        (_, None) => {
            return Err(RuntimeError::OperandsNotNumbers {
                token: operator.clone(),
            })
        }
        (BinaryOp::Sub, Some((a, b))) => Value::Number(a - b),
        (BinaryOp::Mul, Some((a, b))) => Value::Number(a * b),
        (BinaryOp::Div, Some((_, b))) if b == 0.0 => {
            return Err(RuntimeError::DivisionByZero {
                token: operator.clone(),
            })
        }
        (BinaryOp::Div, Some((a, b))) => Value::Number(a / b),
        (BinaryOp::Lt, Some((a, b))) => Value::Bool(a < b),
        (BinaryOp::LtEq, Some((a, b))) => Value::Bool(a <= b),
        (BinaryOp::Gt, Some((a, b))) => Value::Bool(a > b),
        (BinaryOp::GtEq, Some((a, b))) => Value::Bool(a >= b),
    };
    Ok(value)
}
