//! Debug rendering of syntax trees in parenthesized prefix form.

use crate::language::ast::*;

pub fn print_program(program: &Program) -> String {
    let mut out = String::new();
    for stmt in &program.statements {
        out.push_str(&print_stmt(stmt));
        out.push('\n');
    }
    out
}

pub fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Block(statements) => list("block", statements.iter().map(print_stmt)),
        Stmt::Class(class) => {
            let mut parts = vec![class.name.lexeme.clone()];
            if let Some(superclass) = &class.superclass {
                parts.push("<".to_string());
                parts.push(print_expr(superclass));
            }
            parts.extend(class.methods.iter().map(|method| print_function(method)));
            list("class", parts.into_iter())
        }
        Stmt::Expression(expr) => list(";", std::iter::once(print_expr(expr))),
        Stmt::Function(function) => print_function(function),
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let mut parts = vec![print_expr(condition), print_stmt(then_branch)];
            if let Some(else_branch) = else_branch {
                parts.push(print_stmt(else_branch));
            }
            list("if", parts.into_iter())
        }
        Stmt::Print(expr) => list("print", std::iter::once(print_expr(expr))),
        Stmt::Return { value, .. } => list("return", value.iter().map(print_expr)),
        Stmt::Var { name, initializer } => list(
            "var",
            std::iter::once(name.lexeme.clone()).chain(initializer.iter().map(print_expr)),
        ),
        Stmt::While {
            condition,
            body,
            increment,
        } => list(
            "while",
            [print_expr(condition), print_stmt(body)]
                .into_iter()
                .chain(increment.iter().map(print_expr)),
        ),
    }
}

fn print_function(function: &FunctionDecl) -> String {
    let head = if function.is_static { "static" } else { "fun" };
    let params: Vec<&str> = function.params.iter().map(|p| p.lexeme.as_str()).collect();
    list(
        head,
        [function.name.lexeme.clone(), format!("({})", params.join(" "))]
            .into_iter()
            .chain(function.body.iter().map(print_stmt)),
    )
}

pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Assign { name, value, .. } => {
            list("=", [name.lexeme.clone(), print_expr(value)].into_iter())
        }
        Expr::Binary {
            left, op, right, ..
        } => list(op.symbol(), [print_expr(left), print_expr(right)].into_iter()),
        Expr::Call {
            callee, arguments, ..
        } => list(
            "call",
            std::iter::once(print_expr(callee)).chain(arguments.iter().map(print_expr)),
        ),
        Expr::Get { object, name } => {
            list(".", [print_expr(object), name.lexeme.clone()].into_iter())
        }
        Expr::Grouping(inner) => list("group", std::iter::once(print_expr(inner))),
        Expr::Literal(literal) => match literal {
            LiteralValue::Nil => "nil".to_string(),
            LiteralValue::Bool(value) => value.to_string(),
            LiteralValue::Number(value) => value.to_string(),
            LiteralValue::Str(value) => format!("\"{value}\""),
        },
        Expr::Logic {
            left, op, right, ..
        } => {
            let head = match op {
                LogicOp::And => "and",
                LogicOp::Or => "or",
            };
            list(head, [print_expr(left), print_expr(right)].into_iter())
        }
        Expr::Set {
            object,
            name,
            value,
        } => list(
            "set",
            [print_expr(object), name.lexeme.clone(), print_expr(value)].into_iter(),
        ),
        Expr::Super { method, .. } => list("super", std::iter::once(method.lexeme.clone())),
        Expr::This { .. } => "this".to_string(),
        Expr::Unary { op, right, .. } => list(op.symbol(), std::iter::once(print_expr(right))),
        Expr::Variable { name, .. } => name.lexeme.clone(),
        Expr::Keyword { control, .. } => control.keyword().to_string(),
    }
}

fn list(head: &str, parts: impl Iterator<Item = String>) -> String {
    let mut out = format!("({head}");
    for part in parts {
        out.push(' ');
        out.push_str(&part);
    }
    out.push(')');
    out
}
