//! Print a (rewritten) tree as C# text.
//!
//! Output is single-line; layout is the formatting pass's job. Parentheses
//! are only added where a child binds looser than its position requires.

use super::ast::{
    Block, DeclStyle, Declaration, Expr, LongWidth, PostfixOp, Stmt, TypeName, TypeTag, UnaryOp,
};

const PREC_ASSIGN: u8 = 1;
const PREC_TERNARY: u8 = 2;
const PREC_UNARY: u8 = 13;
const PREC_POSTFIX: u8 = 14;
const PREC_PRIMARY: u8 = 15;

pub fn render_block(block: &Block) -> String {
    if block.stmts.is_empty() {
        return "{ }".to_string();
    }
    let inner: Vec<String> = block.stmts.iter().map(render_stmt).collect();
    format!("{{ {} }}", inner.join(" "))
}

pub fn render_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Decl(decl) => render_declaration(decl),
        Stmt::Expr(expr) => format!("{};", render_expr(expr)),
        Stmt::Return(None) => "return;".to_string(),
        Stmt::Return(Some(value)) => format!("return {};", render_expr(value)),
        Stmt::If { cond, then, otherwise } => {
            let mut out = format!("if ({}) {}", render_expr(cond), render_stmt(then));
            if let Some(otherwise) = otherwise {
                out.push_str(" else ");
                out.push_str(&render_stmt(otherwise));
            }
            out
        }
        Stmt::While { cond, body } => {
            format!("while ({}) {}", render_expr(cond), render_stmt(body))
        }
        Stmt::DoWhile { body, cond } => {
            format!("do {} while ({});", render_stmt(body), render_expr(cond))
        }
        Stmt::For { init, cond, step, body } => {
            let init = init.as_ref().map(|s| render_stmt(s)).unwrap_or_else(|| ";".to_string());
            let cond = cond.as_ref().map(render_expr).unwrap_or_default();
            let step = step.as_ref().map(render_expr).unwrap_or_default();
            let head = format!("{init} {cond}; {step}");
            format!("for ({}) {}", head.trim(), render_stmt(body))
        }
        Stmt::Break => "break;".to_string(),
        Stmt::Continue => "continue;".to_string(),
        Stmt::Block(block) => render_block(block),
        Stmt::Empty => ";".to_string(),
    }
}

fn render_declaration(decl: &Declaration) -> String {
    let parts: Vec<String> = decl
        .declarators
        .iter()
        .map(|d| {
            let ty = decl.declarator_type(d);
            match (decl.style, &d.init) {
                (DeclStyle::Inferred, Some(init)) => {
                    format!("var {} = {};", d.name, render_expr(init))
                }
                (DeclStyle::Inferred, None) => {
                    format!("var {} = default({});", d.name, render_type(&ty))
                }
                (DeclStyle::Explicit, Some(init)) => {
                    format!("{} {} = {};", render_type(&ty), d.name, render_expr(init))
                }
                (DeclStyle::Explicit, None) => format!("{} {};", render_type(&ty), d.name),
            }
        })
        .collect();
    parts.join(" ")
}

/// Target spelling of a type: qualifiers dropped, tags and pointers kept.
pub fn render_type(ty: &TypeName) -> String {
    let tag = match ty.tag {
        Some(TypeTag::Struct) => "struct ",
        Some(TypeTag::Union) => "union ",
        Some(TypeTag::Enum) => "enum ",
        None => "",
    };
    format!("{tag}{}{}", ty.base, "*".repeat(ty.pointer_depth()))
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Assign { .. } => PREC_ASSIGN,
        Expr::Ternary { .. } => PREC_TERNARY,
        Expr::Binary { op, .. } => op.precedence() + 2,
        Expr::Unary { .. } | Expr::Cast { .. } | Expr::SizeofExpr(_) => PREC_UNARY,
        Expr::Postfix { .. } | Expr::Call { .. } | Expr::Member { .. } | Expr::Index { .. } => {
            PREC_POSTFIX
        }
        _ => PREC_PRIMARY,
    }
}

fn render_child(expr: &Expr, min_prec: u8) -> String {
    let text = render_expr(expr);
    if precedence(expr) < min_prec {
        format!("({text})")
    } else {
        text
    }
}

pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Int(lit) => {
            let mut out = lit.digits.clone();
            if lit.suffix.unsigned {
                out.push('U');
            }
            match lit.suffix.long {
                LongWidth::None => {}
                LongWidth::Long => out.push('L'),
                LongWidth::LongLong => out.push_str("LL"),
            }
            out
        }
        Expr::Float(text) | Expr::Char(text) | Expr::Str(text) | Expr::Named(text) => text.clone(),
        Expr::Null => "null".to_string(),
        Expr::Unary { op, operand } => {
            let symbol = match op {
                UnaryOp::Neg => "-",
                UnaryOp::Plus => "+",
                UnaryOp::Not => "!",
                UnaryOp::Complement => "~",
                UnaryOp::Deref => "*",
                UnaryOp::AddrOf => "&",
                UnaryOp::PreInc => "++",
                UnaryOp::PreDec => "--",
            };
            let inner = render_child(operand, PREC_UNARY);
            // Keep `- -x` and `- --x` from fusing into a different token.
            if inner.starts_with(&symbol[..1]) && matches!(op, UnaryOp::Neg | UnaryOp::Plus) {
                format!("{symbol} {inner}")
            } else {
                format!("{symbol}{inner}")
            }
        }
        Expr::Postfix { op, operand } => {
            let symbol = match op {
                PostfixOp::Inc => "++",
                PostfixOp::Dec => "--",
            };
            format!("{}{symbol}", render_child(operand, PREC_POSTFIX))
        }
        Expr::Binary { op, lhs, rhs } => {
            let prec = op.precedence() + 2;
            format!("{} {} {}", render_child(lhs, prec), op.symbol(), render_child(rhs, prec + 1))
        }
        Expr::Assign { op, target, value } => {
            let symbol = op.map(|o| format!("{}=", o.symbol())).unwrap_or_else(|| "=".into());
            format!(
                "{} {symbol} {}",
                render_child(target, PREC_UNARY),
                render_child(value, PREC_ASSIGN)
            )
        }
        Expr::Ternary { cond, then, otherwise } => format!(
            "{} ? {} : {}",
            render_child(cond, PREC_TERNARY + 1),
            render_child(then, PREC_ASSIGN),
            render_child(otherwise, PREC_TERNARY)
        ),
        Expr::Cast { ty, operand } => {
            format!("({}){}", render_type(ty), render_child(operand, PREC_UNARY))
        }
        Expr::Call { callee, args } => {
            let args: Vec<String> = args.iter().map(|a| render_child(a, PREC_ASSIGN)).collect();
            format!("{}({})", render_child(callee, PREC_POSTFIX), args.join(", "))
        }
        Expr::Member { base, field, arrow } => {
            let sep = if *arrow { "->" } else { "." };
            format!("{}{sep}{field}", render_child(base, PREC_POSTFIX))
        }
        Expr::Index { base, index } => {
            format!("{}[{}]", render_child(base, PREC_POSTFIX), render_expr(index))
        }
        Expr::SizeofType(ty) => format!("sizeof({})", render_type(ty)),
        Expr::SizeofExpr(operand) => format!("sizeof {}", render_child(operand, PREC_UNARY)),
        Expr::Paren(inner) => format!("({})", render_expr(inner)),
        Expr::InitList(items) => {
            let items: Vec<String> = items.iter().map(render_expr).collect();
            format!("{{ {} }}", items.join(", "))
        }
        Expr::ObjectInit { ty, fields } => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(name, value)| format!("{name} = {}", render_expr(value)))
                .collect();
            format!("new {ty} {{ {} }}", fields.join(", "))
        }
    }
}
