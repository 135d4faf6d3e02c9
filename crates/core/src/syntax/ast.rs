//! Tree for the C subset found in inline accessor/arithmetic bodies.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LongWidth {
    None,
    Long,
    LongLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntSuffix {
    pub unsigned: bool,
    pub long: LongWidth,
}

impl IntSuffix {
    pub const NONE: IntSuffix = IntSuffix { unsigned: false, long: LongWidth::None };

    pub fn is_long(&self) -> bool {
        self.long != LongWidth::None
    }
}

/// Integer literal as written: digits (with any `0x` prefix) plus a parsed suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntLiteral {
    pub digits: String,
    pub suffix: IntSuffix,
}

impl IntLiteral {
    pub fn decimal(value: u64) -> Self {
        Self { digits: value.to_string(), suffix: IntSuffix::NONE }
    }

    /// Leading-zero spelling such as `010`; a lone `0` is not octal.
    pub fn is_octal(&self) -> bool {
        self.digits.len() > 1
            && self.digits.starts_with('0')
            && !self.digits[1..].starts_with(['x', 'X'])
    }

    /// Numeric value, if it fits in 64 bits.
    pub fn value(&self) -> Option<u64> {
        let lower = self.digits.to_ascii_lowercase();
        if let Some(hex) = lower.strip_prefix("0x") {
            u64::from_str_radix(hex, 16).ok()
        } else if self.is_octal() {
            u64::from_str_radix(&lower[1..], 8).ok()
        } else {
            lower.parse().ok()
        }
    }
}

/// Aggregate tag written before a type name (`struct X`, `union X`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Struct,
    Union,
    Enum,
}

/// A type as written in a declaration or cast.
///
/// `base` may be a multi-word spelling (`unsigned int`) until the cast pass
/// collapses it. `pointers` holds one entry per `*`, `true` when that level is
/// `const`-qualified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub tag: Option<TypeTag>,
    pub base: String,
    pub is_const: bool,
    pub pointers: Vec<bool>,
}

impl TypeName {
    pub fn named(base: impl Into<String>) -> Self {
        Self { tag: None, base: base.into(), is_const: false, pointers: Vec::new() }
    }

    pub fn pointer_to(base: impl Into<String>, depth: usize) -> Self {
        Self { tag: None, base: base.into(), is_const: false, pointers: vec![false; depth] }
    }

    pub fn pointer_depth(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_pointer(&self) -> bool {
        !self.pointers.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    Complement,
    Deref,
    AddrOf,
    PreInc,
    PreDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostfixOp {
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
        }
    }

    /// C binding strength; larger binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 10,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Shl | BinaryOp::Shr => 8,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => 7,
            BinaryOp::Eq | BinaryOp::Ne => 6,
            BinaryOp::BitAnd => 5,
            BinaryOp::BitXor => 4,
            BinaryOp::BitOr => 3,
            BinaryOp::LogicalAnd => 2,
            BinaryOp::LogicalOr => 1,
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "&" => BinaryOp::BitAnd,
            "^" => BinaryOp::BitXor,
            "|" => BinaryOp::BitOr,
            "&&" => BinaryOp::LogicalAnd,
            "||" => BinaryOp::LogicalOr,
            _ => return None,
        })
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::LogicalAnd | BinaryOp::LogicalOr)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    Int(IntLiteral),
    Float(String),
    Char(String),
    Str(String),
    /// Target-language constant expression such as `int.MaxValue`.
    Named(String),
    /// Target-language null reference.
    Null,
    Unary { op: UnaryOp, operand: Box<Expr> },
    Postfix { op: PostfixOp, operand: Box<Expr> },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },
    /// `op` is the compound operator (`+=` -> `Some(Add)`), `None` for plain `=`.
    Assign { op: Option<BinaryOp>, target: Box<Expr>, value: Box<Expr> },
    Ternary { cond: Box<Expr>, then: Box<Expr>, otherwise: Box<Expr> },
    Cast { ty: TypeName, operand: Box<Expr> },
    Call { callee: Box<Expr>, args: Vec<Expr> },
    Member { base: Box<Expr>, field: String, arrow: bool },
    Index { base: Box<Expr>, index: Box<Expr> },
    SizeofType(TypeName),
    SizeofExpr(Box<Expr>),
    /// Parentheses written in the source; kept so output mirrors the input.
    Paren(Box<Expr>),
    /// C brace initializer `{a, b}`.
    InitList(Vec<Expr>),
    /// Target object construction `new T { field = value, ... }`.
    ObjectInit { ty: String, fields: Vec<(String, Expr)> },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn boxed(self) -> Box<Expr> {
        Box::new(self)
    }

    /// Strip any number of source parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren(inner) = expr {
            expr = inner;
        }
        expr
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self.unparen(),
            Expr::Int(_)
                | Expr::Float(_)
                | Expr::Char(_)
                | Expr::Str(_)
                | Expr::Named(_)
                | Expr::Null
        )
    }

    /// Visit this expression and every sub-expression, parents first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Expr)) {
        visit(self);
        match self {
            Expr::Unary { operand, .. }
            | Expr::Postfix { operand, .. }
            | Expr::Cast { operand, .. }
            | Expr::SizeofExpr(operand)
            | Expr::Paren(operand) => operand.walk(visit),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.walk(visit);
                rhs.walk(visit);
            }
            Expr::Assign { target, value, .. } => {
                target.walk(visit);
                value.walk(visit);
            }
            Expr::Ternary { cond, then, otherwise } => {
                cond.walk(visit);
                then.walk(visit);
                otherwise.walk(visit);
            }
            Expr::Call { callee, args } => {
                callee.walk(visit);
                for arg in args {
                    arg.walk(visit);
                }
            }
            Expr::Member { base, .. } => base.walk(visit),
            Expr::Index { base, index } => {
                base.walk(visit);
                index.walk(visit);
            }
            Expr::InitList(items) => {
                for item in items {
                    item.walk(visit);
                }
            }
            Expr::ObjectInit { fields, .. } => {
                for (_, value) in fields {
                    value.walk(visit);
                }
            }
            Expr::Ident(_)
            | Expr::Int(_)
            | Expr::Float(_)
            | Expr::Char(_)
            | Expr::Str(_)
            | Expr::Named(_)
            | Expr::Null
            | Expr::SizeofType(_) => {}
        }
    }

    /// Rewrite this expression bottom-up: children first, then `rewrite` on the node.
    pub fn transform(&mut self, rewrite: &mut dyn FnMut(&mut Expr)) {
        match self {
            Expr::Unary { operand, .. }
            | Expr::Postfix { operand, .. }
            | Expr::Cast { operand, .. }
            | Expr::SizeofExpr(operand)
            | Expr::Paren(operand) => operand.transform(rewrite),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.transform(rewrite);
                rhs.transform(rewrite);
            }
            Expr::Assign { target, value, .. } => {
                target.transform(rewrite);
                value.transform(rewrite);
            }
            Expr::Ternary { cond, then, otherwise } => {
                cond.transform(rewrite);
                then.transform(rewrite);
                otherwise.transform(rewrite);
            }
            Expr::Call { callee, args } => {
                callee.transform(rewrite);
                for arg in args {
                    arg.transform(rewrite);
                }
            }
            Expr::Member { base, .. } => base.transform(rewrite),
            Expr::Index { base, index } => {
                base.transform(rewrite);
                index.transform(rewrite);
            }
            Expr::InitList(items) => {
                for item in items {
                    item.transform(rewrite);
                }
            }
            Expr::ObjectInit { fields, .. } => {
                for (_, value) in fields {
                    value.transform(rewrite);
                }
            }
            Expr::Ident(_)
            | Expr::Int(_)
            | Expr::Float(_)
            | Expr::Char(_)
            | Expr::Str(_)
            | Expr::Named(_)
            | Expr::Null
            | Expr::SizeofType(_) => {}
        }
        rewrite(self);
    }

    /// Direct sub-expressions.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Unary { operand, .. }
            | Expr::Postfix { operand, .. }
            | Expr::Cast { operand, .. }
            | Expr::SizeofExpr(operand)
            | Expr::Paren(operand) => vec![operand.as_ref()],
            Expr::Binary { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Assign { target, value, .. } => vec![target.as_ref(), value.as_ref()],
            Expr::Ternary { cond, then, otherwise } => {
                vec![cond.as_ref(), then.as_ref(), otherwise.as_ref()]
            }
            Expr::Call { callee, args } => {
                let mut out = vec![callee.as_ref()];
                out.extend(args.iter());
                out
            }
            Expr::Member { base, .. } => vec![base.as_ref()],
            Expr::Index { base, index } => vec![base.as_ref(), index.as_ref()],
            Expr::InitList(items) => items.iter().collect(),
            Expr::ObjectInit { fields, .. } => fields.iter().map(|(_, v)| v).collect(),
            _ => Vec::new(),
        }
    }

    /// Height of the tree rooted here, measured with an explicit stack.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((expr, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(expr.children().into_iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Direct sub-expressions, for passes that need to stop descending early.
    pub fn children_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Expr::Unary { operand, .. }
            | Expr::Postfix { operand, .. }
            | Expr::Cast { operand, .. }
            | Expr::SizeofExpr(operand)
            | Expr::Paren(operand) => vec![operand.as_mut()],
            Expr::Binary { lhs, rhs, .. } => vec![lhs.as_mut(), rhs.as_mut()],
            Expr::Assign { target, value, .. } => vec![target.as_mut(), value.as_mut()],
            Expr::Ternary { cond, then, otherwise } => {
                vec![cond.as_mut(), then.as_mut(), otherwise.as_mut()]
            }
            Expr::Call { callee, args } => {
                let mut out = vec![callee.as_mut()];
                out.extend(args.iter_mut());
                out
            }
            Expr::Member { base, .. } => vec![base.as_mut()],
            Expr::Index { base, index } => vec![base.as_mut(), index.as_mut()],
            Expr::InitList(items) => items.iter_mut().collect(),
            Expr::ObjectInit { fields, .. } => fields.iter_mut().map(|(_, v)| v).collect(),
            _ => Vec::new(),
        }
    }

    /// Type names mentioned directly by this node (casts and `sizeof`).
    pub fn type_name_mut(&mut self) -> Option<&mut TypeName> {
        match self {
            Expr::Cast { ty, .. } | Expr::SizeofType(ty) => Some(ty),
            _ => None,
        }
    }
}

/// How a declaration states its type in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclStyle {
    /// `T name = ...;` as in the source.
    Explicit,
    /// `var name = ...;`
    Inferred,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    /// Extra `*` levels written on the declarator itself (`int *p`).
    pub pointers: usize,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub ty: TypeName,
    pub declarators: Vec<Declarator>,
    pub style: DeclStyle,
}

impl Declaration {
    /// Full type of one declarator (base type plus declarator pointers).
    pub fn declarator_type(&self, declarator: &Declarator) -> TypeName {
        let mut ty = self.ty.clone();
        ty.pointers.extend(std::iter::repeat(false).take(declarator.pointers));
        ty
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Decl(Declaration),
    Expr(Expr),
    Return(Option<Expr>),
    If { cond: Expr, then: Box<Stmt>, otherwise: Option<Box<Stmt>> },
    While { cond: Expr, body: Box<Stmt> },
    DoWhile { body: Box<Stmt>, cond: Expr },
    For { init: Option<Box<Stmt>>, cond: Option<Expr>, step: Option<Expr>, body: Box<Stmt> },
    Break,
    Continue,
    Block(Block),
    Empty,
}

impl Stmt {
    /// Expressions owned by this statement itself, not by nested statements.
    pub fn own_exprs(&self) -> Vec<&Expr> {
        match self {
            Stmt::Decl(decl) => decl.declarators.iter().filter_map(|d| d.init.as_ref()).collect(),
            Stmt::Expr(expr) | Stmt::Return(Some(expr)) => vec![expr],
            Stmt::If { cond, .. } | Stmt::While { cond, .. } | Stmt::DoWhile { cond, .. } => {
                vec![cond]
            }
            Stmt::For { cond, step, .. } => cond.iter().chain(step.iter()).collect(),
            Stmt::Return(None) | Stmt::Break | Stmt::Continue | Stmt::Block(_) | Stmt::Empty => {
                Vec::new()
            }
        }
    }

    /// Visit every expression directly owned by this statement or nested ones.
    pub fn walk_exprs<'a>(&'a self, visit: &mut dyn FnMut(&'a Expr)) {
        match self {
            Stmt::Decl(decl) => {
                for d in &decl.declarators {
                    if let Some(init) = &d.init {
                        init.walk(visit);
                    }
                }
            }
            Stmt::Expr(expr) => expr.walk(visit),
            Stmt::Return(value) => {
                if let Some(value) = value {
                    value.walk(visit);
                }
            }
            Stmt::If { cond, then, otherwise } => {
                cond.walk(visit);
                then.walk_exprs(visit);
                if let Some(otherwise) = otherwise {
                    otherwise.walk_exprs(visit);
                }
            }
            Stmt::While { cond, body } | Stmt::DoWhile { body, cond } => {
                cond.walk(visit);
                body.walk_exprs(visit);
            }
            Stmt::For { init, cond, step, body } => {
                if let Some(init) = init {
                    init.walk_exprs(visit);
                }
                if let Some(cond) = cond {
                    cond.walk(visit);
                }
                if let Some(step) = step {
                    step.walk(visit);
                }
                body.walk_exprs(visit);
            }
            Stmt::Block(block) => block.walk_exprs(visit),
            Stmt::Break | Stmt::Continue | Stmt::Empty => {}
        }
    }

    /// Visit this statement and every nested statement, parents first.
    pub fn walk_stmts<'a>(&'a self, visit: &mut dyn FnMut(&'a Stmt)) {
        visit(self);
        match self {
            Stmt::If { then, otherwise, .. } => {
                then.walk_stmts(visit);
                if let Some(otherwise) = otherwise {
                    otherwise.walk_stmts(visit);
                }
            }
            Stmt::While { body, .. } | Stmt::DoWhile { body, .. } => body.walk_stmts(visit),
            Stmt::For { init, body, .. } => {
                if let Some(init) = init {
                    init.walk_stmts(visit);
                }
                body.walk_stmts(visit);
            }
            Stmt::Block(block) => {
                for stmt in &block.stmts {
                    stmt.walk_stmts(visit);
                }
            }
            _ => {}
        }
    }

    /// Mutable pre-order statement traversal.
    pub fn visit_stmts_mut(&mut self, visit: &mut dyn FnMut(&mut Stmt)) {
        visit(self);
        match self {
            Stmt::If { then, otherwise, .. } => {
                then.visit_stmts_mut(visit);
                if let Some(otherwise) = otherwise {
                    otherwise.visit_stmts_mut(visit);
                }
            }
            Stmt::While { body, .. } | Stmt::DoWhile { body, .. } => body.visit_stmts_mut(visit),
            Stmt::For { init, body, .. } => {
                if let Some(init) = init {
                    init.visit_stmts_mut(visit);
                }
                body.visit_stmts_mut(visit);
            }
            Stmt::Block(block) => block.visit_stmts_mut(visit),
            _ => {}
        }
    }

    /// Apply `rewrite` bottom-up to every expression owned by this statement tree.
    pub fn transform_exprs(&mut self, rewrite: &mut dyn FnMut(&mut Expr)) {
        match self {
            Stmt::Decl(decl) => {
                for d in &mut decl.declarators {
                    if let Some(init) = &mut d.init {
                        init.transform(rewrite);
                    }
                }
            }
            Stmt::Expr(expr) => expr.transform(rewrite),
            Stmt::Return(value) => {
                if let Some(value) = value {
                    value.transform(rewrite);
                }
            }
            Stmt::If { cond, then, otherwise } => {
                cond.transform(rewrite);
                then.transform_exprs(rewrite);
                if let Some(otherwise) = otherwise {
                    otherwise.transform_exprs(rewrite);
                }
            }
            Stmt::While { cond, body } | Stmt::DoWhile { body, cond } => {
                cond.transform(rewrite);
                body.transform_exprs(rewrite);
            }
            Stmt::For { init, cond, step, body } => {
                if let Some(init) = init {
                    init.transform_exprs(rewrite);
                }
                if let Some(cond) = cond {
                    cond.transform(rewrite);
                }
                if let Some(step) = step {
                    step.transform(rewrite);
                }
                body.transform_exprs(rewrite);
            }
            Stmt::Block(block) => block.transform_exprs(rewrite),
            Stmt::Break | Stmt::Continue | Stmt::Empty => {}
        }
    }
}

/// Brace-delimited statement list; a whole function body is one `Block`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    pub fn walk_exprs<'a>(&'a self, visit: &mut dyn FnMut(&'a Expr)) {
        for stmt in &self.stmts {
            stmt.walk_exprs(visit);
        }
    }

    pub fn walk_stmts<'a>(&'a self, visit: &mut dyn FnMut(&'a Stmt)) {
        for stmt in &self.stmts {
            stmt.walk_stmts(visit);
        }
    }

    pub fn visit_stmts_mut(&mut self, visit: &mut dyn FnMut(&mut Stmt)) {
        for stmt in &mut self.stmts {
            stmt.visit_stmts_mut(visit);
        }
    }

    /// Mutable access to every nested statement list (this block first).
    pub fn visit_blocks_mut(&mut self, visit: &mut dyn FnMut(&mut Block)) {
        visit(self);
        for stmt in &mut self.stmts {
            stmt.visit_stmts_mut(&mut |s| {
                if let Stmt::Block(inner) = s {
                    visit(inner);
                }
            });
        }
    }

    pub fn transform_exprs(&mut self, rewrite: &mut dyn FnMut(&mut Expr)) {
        for stmt in &mut self.stmts {
            stmt.transform_exprs(rewrite);
        }
    }

    /// Every type name mentioned in declarations, casts and `sizeof`.
    pub fn visit_type_names_mut(&mut self, visit: &mut dyn FnMut(&mut TypeName)) {
        self.visit_stmts_mut(&mut |stmt| {
            if let Stmt::Decl(decl) = stmt {
                visit(&mut decl.ty);
            }
        });
        self.transform_exprs(&mut |expr| {
            if let Some(ty) = expr.type_name_mut() {
                visit(ty);
            }
        });
    }
}
