use crate::language::{
    ast::*,
    errors::SyntaxError,
    token::{Literal, Token, TokenKind},
};
use crate::stack::ensure_sufficient_stack;
use std::rc::Rc;

const MAX_ARGUMENTS: usize = 255;
/// Deepest syntax tree the parser will build. Every later pass, and dropping
/// the tree, recurses once per level.
pub const MAX_NESTING: usize = 2048;

pub fn parse(tokens: &[Token]) -> Result<Program, Vec<SyntaxError>> {
    let mut parser = AstParser::new(tokens);
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(parser.errors)
    }
}

struct AstParser<'a> {
    tokens: &'a [Token],
    position: usize,
    depth: usize,
    errors: Vec<SyntaxError>,
}

type ParseResult<T> = Result<T, SyntaxError>;

impl<'a> AstParser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            errors: Vec::new(),
        }
    }

    fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        Program { statements }
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.matches(&[TokenKind::Class]) {
            self.class_declaration()
        } else if self.matches(&[TokenKind::Fun]) {
            self.function(false).map(Stmt::Function)
        } else if self.matches(&[TokenKind::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };
        match result {
            Ok(stmt) => Some(stmt),
            Err(err) => {
                self.report_error(err);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect class name.")?;

        let superclass = if self.matches(&[TokenKind::Less]) {
            let name = self.consume(TokenKind::Identifier, "Expect superclass name.")?;
            Some(Expr::variable(name))
        } else {
            None
        };

        self.consume(TokenKind::LeftBrace, "Expect '{' before class body.")?;
        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            let is_static = self.matches(&[TokenKind::Static]);
            methods.push(self.function(is_static)?);
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class(ClassDecl {
            name,
            superclass,
            methods,
        }))
    }

    fn function(&mut self, is_static: bool) -> ParseResult<Rc<FunctionDecl>> {
        let name = self.consume(TokenKind::Identifier, "Expect function name.")?;
        self.consume(TokenKind::LeftParen, "Expect '(' after function name.")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGUMENTS {
                    let err = SyntaxError::at(self.peek(), "Can't have more than 255 parameters.");
                    self.report_error(err);
                }
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;
        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.")?;
        let body = self.block()?;
        Ok(Rc::new(FunctionDecl {
            name,
            params,
            body,
            is_static,
        }))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;
        let initializer = if self.matches(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume_with_help(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
            format!("Try: var {} = <value>;", name.lexeme),
        )?;
        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        self.nested(Self::statement_inner)
    }

    fn statement_inner(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[TokenKind::For]) {
            return self.for_statement();
        }
        if self.matches(&[TokenKind::If]) {
            return self.if_statement();
        }
        if self.matches(&[TokenKind::Print]) {
            let value = self.expression()?;
            self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
            return Ok(Stmt::Print(value));
        }
        if self.matches(&[TokenKind::Return]) {
            return self.return_statement();
        }
        if self.matches(&[TokenKind::While]) {
            return self.while_statement();
        }
        if self.matches(&[TokenKind::LeftBrace]) {
            return Ok(Stmt::Block(self.block()?));
        }
        self.expression_statement()
    }

    /// `for` has no node of its own: it becomes a block holding the
    /// initializer and a while loop carrying the increment.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.matches(&[TokenKind::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(TokenKind::Semicolon) {
            Expr::Literal(LiteralValue::Bool(true))
        } else {
            self.expression()?
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let body = self.statement()?;
        let looped = Stmt::While {
            condition,
            body: Box::new(body),
            increment,
        };

        Ok(match initializer {
            Some(initializer) => Stmt::Block(vec![initializer, looped]),
            None => looped,
        })
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While {
            condition,
            body,
            increment: None,
        })
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.nested(Self::block_inner)
    }

    fn block_inner(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.matches(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.nested(Self::assignment)?;
            return match expr {
                Expr::Variable { name, .. } => Ok(Expr::assign(name, value)),
                Expr::Get { object, name } => Ok(Expr::Set {
                    object,
                    name,
                    value: Box::new(value),
                }),
                other => {
                    self.report_error(SyntaxError::at(&equals, "Invalid assignment target."));
                    Ok(other)
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;
        while self.matches(&[TokenKind::Or]) {
            let operator = self.previous().clone();
            self.deepen()?;
            let right = self.and()?;
            expr = Expr::Logic {
                left: Box::new(expr),
                operator,
                op: LogicOp::Or,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::And]) {
            let operator = self.previous().clone();
            self.deepen()?;
            let right = self.equality()?;
            expr = Expr::Logic {
                left: Box::new(expr),
                operator,
                op: LogicOp::And,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::comparison, |kind| match kind {
            TokenKind::BangEqual => Some(BinaryOp::NotEq),
            TokenKind::EqualEqual => Some(BinaryOp::Eq),
            _ => None,
        })
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::term, |kind| match kind {
            TokenKind::Greater => Some(BinaryOp::Gt),
            TokenKind::GreaterEqual => Some(BinaryOp::GtEq),
            TokenKind::Less => Some(BinaryOp::Lt),
            TokenKind::LessEqual => Some(BinaryOp::LtEq),
            _ => None,
        })
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::factor, |kind| match kind {
            TokenKind::Minus => Some(BinaryOp::Sub),
            TokenKind::Plus => Some(BinaryOp::Add),
            _ => None,
        })
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::unary, |kind| match kind {
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Star => Some(BinaryOp::Mul),
            _ => None,
        })
    }

    /// One left-associative precedence level.
    fn binary_level(
        &mut self,
        operand: fn(&mut Self) -> ParseResult<Expr>,
        operator_for: fn(TokenKind) -> Option<BinaryOp>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;
        while let Some(op) = operator_for(self.peek().kind) {
            let operator = self.advance().clone();
            self.deepen()?;
            let right = operand(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::PlusPlus => UnaryOp::Increment,
            TokenKind::MinusMinus => UnaryOp::Decrement,
            _ => return self.call(),
        };
        let operator = self.advance().clone();
        let right = self.nested(Self::unary)?;
        if matches!(op, UnaryOp::Increment | UnaryOp::Decrement)
            && !matches!(right, Expr::Variable { .. })
        {
            self.report_error(
                SyntaxError::at(&operator, "Invalid increment target.")
                    .with_help(format!("`{}` can only be applied to a variable", op.symbol())),
            );
        }
        Ok(Expr::Unary {
            operator,
            op,
            right: Box::new(right),
        })
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.matches(&[TokenKind::LeftParen]) {
                self.deepen()?;
                expr = self.finish_call(expr)?;
            } else if self.matches(&[TokenKind::Dot]) {
                self.deepen()?;
                let name =
                    self.consume(TokenKind::Identifier, "Expect property name after '.'.")?;
                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGUMENTS {
                    let err = SyntaxError::at(self.peek(), "Can't have more than 255 arguments.");
                    self.report_error(err);
                }
                arguments.push(self.expression()?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        let expr = match token.kind {
            TokenKind::False => Expr::Literal(LiteralValue::Bool(false)),
            TokenKind::True => Expr::Literal(LiteralValue::Bool(true)),
            TokenKind::Nil => Expr::Literal(LiteralValue::Nil),
            TokenKind::Number | TokenKind::String => Expr::Literal(match &token.literal {
                Some(Literal::Number(value)) => LiteralValue::Number(*value),
                Some(Literal::Str(value)) => LiteralValue::Str(Rc::from(value.as_str())),
                None => LiteralValue::Nil,
            }),
            TokenKind::This => Expr::this(token),
            TokenKind::Identifier => Expr::variable(token),
            TokenKind::Break => Expr::Keyword {
                keyword: token,
                control: LoopControl::Break,
            },
            TokenKind::Continue => Expr::Keyword {
                keyword: token,
                control: LoopControl::Continue,
            },
            TokenKind::Super => {
                self.advance();
                self.consume(TokenKind::Dot, "Expect '.' after 'super'.")?;
                let method =
                    self.consume(TokenKind::Identifier, "Expect superclass method name.")?;
                return Ok(Expr::super_access(token, method));
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
                return Ok(Expr::Grouping(Box::new(expr)));
            }
            _ => return Err(SyntaxError::at(&token, "Expect expression.")),
        };
        self.advance();
        Ok(expr)
    }

    /// Runs one level of recursive descent, refusing to go deeper than
    /// `MAX_NESTING`.
    fn nested<T>(&mut self, rule: fn(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.too_deep(self.peek()));
        }
        let saved = self.depth;
        self.depth += 1;
        let result = ensure_sufficient_stack(|| rule(self));
        self.depth = saved;
        result
    }

    /// Left-associative loops deepen the tree without recursing. Each link
    /// counts until the enclosing `nested` call returns.
    fn deepen(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_NESTING {
            return Err(self.too_deep(self.previous()));
        }
        self.depth += 1;
        Ok(())
    }

    fn too_deep(&self, at: &Token) -> SyntaxError {
        SyntaxError::at(at, "Too much nesting.")
            .with_help(format!("expressions and statements nest at most {MAX_NESTING} levels deep"))
    }

    fn consume(&mut self, expected: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(expected) {
            return Ok(self.advance().clone());
        }
        Err(SyntaxError::at(self.peek(), message))
    }

    fn consume_with_help(
        &mut self,
        expected: TokenKind,
        message: &str,
        help: String,
    ) -> ParseResult<Token> {
        self.consume(expected, message)
            .map_err(|err| err.with_help(help))
    }

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|kind| self.check(*kind)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, expected: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == expected
    }

    fn advance(&mut self) -> &'a Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &'a Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.position.min(last)]
    }

    fn previous(&self) -> &'a Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    fn report_error(&mut self, err: SyntaxError) {
        self.errors.push(err);
    }

    /// Skips to the start of the next statement after an error.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
