//! Final gate between a rewritten body and the generated output.
//!
//! Conservative by construction: anything it is not sure about is rejected,
//! because a rejected function becomes a loud stub while an accepted one that
//! is subtly wrong would compile and misbehave at runtime.
//!
//! Three families of checks:
//! - text checks on the formatted output (balance, dangling statements);
//! - structural denylist checks on the rewritten tree;
//! - residual C spellings the rewriters did not translate.

use std::collections::HashSet;
use std::fmt;

use crate::catalog::Catalog;
use crate::model::FunctionSignature;
use crate::syntax::ast::{BinaryOp, DeclStyle, TypeName, TypeTag, UnaryOp};
use crate::syntax::{Block, Expr, Stmt};

/// Expression shapes whose C and target semantics may differ silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeniedConstruct {
    AndWithComplement,
    NonTrivialTernary,
    PointerTernary,
    OrWithLiteral,
    Xor,
    ArithmeticOnShift,
    ShiftOfSubtraction,
    ShiftedUnsignedLiteral,
    AndWithShiftRight,
    CallInReturn,
    NarrowingReturn,
    IntegerCondition,
    DoublePointerBufferCast,
}

impl DeniedConstruct {
    pub fn describe(&self) -> &'static str {
        match self {
            DeniedConstruct::AndWithComplement => "bitwise AND with complement",
            DeniedConstruct::NonTrivialTernary => "conditional with non-trivial branches",
            DeniedConstruct::PointerTernary => "pointer-typed conditional",
            DeniedConstruct::OrWithLiteral => "bitwise OR with literal",
            DeniedConstruct::Xor => "bitwise XOR",
            DeniedConstruct::ArithmeticOnShift => "arithmetic on shifted value",
            DeniedConstruct::ShiftOfSubtraction => "shift of subtraction",
            DeniedConstruct::ShiftedUnsignedLiteral => "shifted unsigned literal",
            DeniedConstruct::AndWithShiftRight => "bitwise AND with right shift",
            DeniedConstruct::CallInReturn => "function call in return",
            DeniedConstruct::NarrowingReturn => "narrowing return of wider expression",
            DeniedConstruct::IntegerCondition => "integer used as condition",
            DeniedConstruct::DoublePointerBufferCast => "double-pointer buffer cast",
        }
    }
}

/// One reason a rewritten body was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    UnmatchedBraces { open: usize, close: usize },
    UnmatchedParentheses { open: usize, close: usize },
    IncompleteStatement { line: usize },
    MissingClosingParenthesis { line: usize },
    Denied(DeniedConstruct),
    ResidualC(String),
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::UnmatchedBraces { open, close } => {
                write!(f, "unmatched braces ({open} open, {close} close)")
            }
            Finding::UnmatchedParentheses { open, close } => {
                write!(f, "unmatched parentheses ({open} open, {close} close)")
            }
            Finding::IncompleteStatement { line } => {
                write!(f, "incomplete statement on line {line}")
            }
            Finding::MissingClosingParenthesis { line } => {
                write!(f, "missing closing parenthesis in conditional on line {line}")
            }
            Finding::Denied(construct) => write!(
                f,
                "complex pattern requiring manual conversion: {}",
                construct.describe()
            ),
            Finding::ResidualC(token) => write!(f, "untranslated C construct: {token}"),
        }
    }
}

/// Outcome of validating one body. Accepted iff there are no findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub findings: Vec<Finding>,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn reasons(&self) -> Vec<String> {
        self.findings.iter().map(Finding::to_string).collect()
    }

    fn push(&mut self, finding: Finding) {
        if !self.findings.contains(&finding) {
            self.findings.push(finding);
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    catalog: &'a Catalog,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Validate the rewritten `tree` and its formatted `text` for `signature`.
    pub fn validate(&self, tree: &Block, text: &str, signature: &FunctionSignature) -> Verdict {
        let mut verdict = Verdict::default();
        check_text(text, &mut verdict);
        self.check_denylist(tree, signature, &mut verdict);
        self.check_residual_c(tree, signature, &mut verdict);
        verdict
    }

    fn check_denylist(&self, tree: &Block, signature: &FunctionSignature, verdict: &mut Verdict) {
        tree.walk_exprs(&mut |expr| {
            for construct in denied_expr(expr) {
                verdict.push(Finding::Denied(construct));
            }
        });

        let return_base = self.catalog.target_base(&signature.return_type.name);
        let narrow_return =
            signature.return_type.pointer_depth == 0 && self.catalog.is_narrow_target(&return_base);

        tree.walk_stmts(&mut |stmt| {
            let cond = match stmt {
                Stmt::If { cond, .. } | Stmt::While { cond, .. } | Stmt::DoWhile { cond, .. } => {
                    Some(cond)
                }
                Stmt::For { cond, .. } => cond.as_ref(),
                _ => None,
            };
            if let Some(cond) = cond {
                if !is_boolean(cond) {
                    verdict.push(Finding::Denied(DeniedConstruct::IntegerCondition));
                }
            }

            if let Stmt::Return(Some(value)) = stmt {
                let value = value.unparen();
                if matches!(value, Expr::Call { .. }) {
                    verdict.push(Finding::Denied(DeniedConstruct::CallInReturn));
                }
                if is_complement_shift(value)
                    || (narrow_return && !matches!(value, Expr::Cast { .. }) && !value.is_literal())
                {
                    verdict.push(Finding::Denied(DeniedConstruct::NarrowingReturn));
                }
            }
        });
    }

    fn check_residual_c(&self, tree: &Block, signature: &FunctionSignature, verdict: &mut Verdict) {
        let mut rendered_types: Vec<&TypeName> = Vec::new();
        let mut bound: HashSet<&str> =
            signature.parameters.iter().map(|p| p.name.as_str()).collect();
        tree.walk_stmts(&mut |stmt| {
            if let Stmt::Decl(decl) = stmt {
                bound.extend(decl.declarators.iter().map(|d| d.name.as_str()));
                let type_is_written = decl.style == DeclStyle::Explicit
                    || decl.declarators.iter().any(|d| d.init.is_none());
                if type_is_written {
                    rendered_types.push(&decl.ty);
                }
            }
        });
        let mut callees: HashSet<&str> = HashSet::new();
        tree.walk_exprs(&mut |expr| match expr {
            Expr::Cast { ty, .. } | Expr::SizeofType(ty) => rendered_types.push(ty),
            Expr::Call { callee, .. } => callees.extend(callee.as_ident()),
            _ => {}
        });
        for ty in rendered_types {
            if let Some(residue) = self.residual_type(ty) {
                verdict.push(Finding::ResidualC(residue));
            }
        }

        tree.walk_exprs(&mut |expr| match expr {
            // Known limit macros are renamed by the constants pass, so any
            // all-caps name still here is an unexpanded macro.
            Expr::Ident(name)
                if is_macro_name(name)
                    && !callees.contains(name.as_str())
                    && !bound.contains(name.as_str()) =>
            {
                verdict.push(Finding::ResidualC(name.clone()));
            }
            Expr::Int(lit) if lit.is_octal() => {
                verdict.push(Finding::ResidualC(format!("octal literal {}", lit.digits)));
            }
            Expr::Call { callee, .. } => {
                if let Some(name) = callee.as_ident().filter(|n| is_macro_name(n)) {
                    verdict.push(Finding::ResidualC(format!("{name}(...)")));
                }
            }
            Expr::InitList(_) => verdict.push(Finding::ResidualC("brace initializer".to_string())),
            _ => {}
        });
    }

    fn residual_type(&self, ty: &TypeName) -> Option<String> {
        if let Some(tag) = ty.tag {
            let keyword = match tag {
                TypeTag::Struct => "struct",
                TypeTag::Union => "union",
                TypeTag::Enum => "enum",
            };
            return Some(format!("{keyword} {}", ty.base));
        }
        if ty.base.contains(' ')
            || ty.base == "char"
            || self.catalog.is_c_type_key(&ty.base)
            || ty.base.ends_with("_t")
        {
            return Some(ty.base.clone());
        }
        None
    }
}

fn check_text(text: &str, verdict: &mut Verdict) {
    let count = |c: char| text.chars().filter(|x| *x == c).count();
    let (open, close) = (count('{'), count('}'));
    if open != close {
        verdict.push(Finding::UnmatchedBraces { open, close });
    }
    let (open, close) = (count('('), count(')'));
    if open != close {
        verdict.push(Finding::UnmatchedParentheses { open, close });
    }

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim_end();
        let Some(head) = line.strip_suffix(';') else {
            continue;
        };
        // An opening parenthesis never closed before the terminator.
        if let Some(open_at) = head.rfind('(') {
            if !head[open_at..].contains(')') {
                verdict.push(Finding::IncompleteStatement { line: idx + 1 });
            }
        }
        // `: (` branch never closed before the terminator.
        if let Some(colon_at) = head.find(':') {
            let branch = head[colon_at + 1..].trim_start();
            if branch.starts_with('(') && !branch.contains(')') {
                verdict.push(Finding::MissingClosingParenthesis { line: idx + 1 });
            }
        }
    }
}

fn denied_expr(expr: &Expr) -> Vec<DeniedConstruct> {
    let mut found = Vec::new();
    match expr {
        Expr::Binary { op, lhs, rhs } => {
            let (l, r) = (lhs.unparen(), rhs.unparen());
            match op {
                BinaryOp::BitAnd => {
                    if is_unary(l, UnaryOp::Complement) || is_unary(r, UnaryOp::Complement) {
                        found.push(DeniedConstruct::AndWithComplement);
                    }
                    if is_binary(l, BinaryOp::Shr) || is_binary(r, BinaryOp::Shr) {
                        found.push(DeniedConstruct::AndWithShiftRight);
                    }
                }
                BinaryOp::BitOr if l.is_literal() || r.is_literal() => {
                    found.push(DeniedConstruct::OrWithLiteral);
                }
                BinaryOp::BitXor => found.push(DeniedConstruct::Xor),
                BinaryOp::Add | BinaryOp::Sub => {
                    let shifted = |e: &Expr| {
                        is_binary(e, BinaryOp::Shl)
                            || (*op == BinaryOp::Add && is_binary(e, BinaryOp::Shr))
                    };
                    if shifted(l) || shifted(r) {
                        found.push(DeniedConstruct::ArithmeticOnShift);
                    }
                }
                BinaryOp::Shl => {
                    if is_binary(l, BinaryOp::Sub) {
                        found.push(DeniedConstruct::ShiftOfSubtraction);
                    }
                    if matches!(l, Expr::Int(lit) if lit.suffix.unsigned) {
                        found.push(DeniedConstruct::ShiftedUnsignedLiteral);
                    }
                }
                BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
                    if !is_boolean(l) || !is_boolean(r) {
                        found.push(DeniedConstruct::IntegerCondition);
                    }
                }
                _ => {}
            }
        }
        Expr::Unary { op: UnaryOp::Not, operand } if !is_boolean(operand) => {
            found.push(DeniedConstruct::IntegerCondition);
        }
        Expr::Ternary { cond, then, otherwise } => {
            if !is_trivial(then) || !is_trivial(otherwise) {
                found.push(DeniedConstruct::NonTrivialTernary);
            }
            if !is_boolean(cond) {
                found.push(DeniedConstruct::IntegerCondition);
            }
        }
        Expr::Cast { ty, operand } => {
            if ty.is_pointer() {
                let mut has_ternary = false;
                operand.walk(&mut |e| has_ternary |= matches!(e, Expr::Ternary { .. }));
                if has_ternary {
                    found.push(DeniedConstruct::PointerTernary);
                }
            }
            let names_buffer = operand.unparen().as_ident().is_some();
            if ty.base == "byte" && ty.pointer_depth() == 2 && names_buffer {
                found.push(DeniedConstruct::DoublePointerBufferCast);
            }
        }
        _ => {}
    }
    found
}

fn is_unary(expr: &Expr, wanted: UnaryOp) -> bool {
    matches!(expr, Expr::Unary { op, .. } if *op == wanted)
}

fn is_binary(expr: &Expr, wanted: BinaryOp) -> bool {
    matches!(expr, Expr::Binary { op, .. } if *op == wanted)
}

/// `(~x) >> n`: the complement widens before the shift.
fn is_complement_shift(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Binary { op: BinaryOp::Shr, lhs, .. } if is_unary(lhs.unparen(), UnaryOp::Complement)
    )
}

/// Identifiers, literals and plain member chains.
fn is_trivial(expr: &Expr) -> bool {
    match expr.unparen() {
        Expr::Ident(_) => true,
        Expr::Member { base, .. } => is_trivial(base),
        Expr::Unary { op: UnaryOp::Neg, operand } => operand.is_literal(),
        other => other.is_literal(),
    }
}

/// Whether the expression is certainly boolean in the target language.
fn is_boolean(expr: &Expr) -> bool {
    match expr.unparen() {
        Expr::Binary { op, lhs, rhs } if op.is_logical() => is_boolean(lhs) && is_boolean(rhs),
        Expr::Binary { op, .. } => op.is_comparison(),
        Expr::Unary { op: UnaryOp::Not, operand } => is_boolean(operand),
        Expr::Ident(name) => name == "true" || name == "false",
        _ => false,
    }
}

/// All-caps identifiers are preprocessor macros in C headers.
fn is_macro_name(name: &str) -> bool {
    name.len() > 1
        && name.chars().any(|c| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
