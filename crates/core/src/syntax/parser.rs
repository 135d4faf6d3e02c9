//! Recursive-descent parser for inline function bodies.

use super::ast::{
    BinaryOp, Block, DeclStyle, Declaration, Declarator, Expr, PostfixOp, Stmt, TypeName, TypeTag,
    UnaryOp,
};
use super::lexer::{tokenize, Token, TokenKind};
use super::{SyntaxError, SyntaxResult};

const TYPE_KEYWORDS: &[&str] =
    &["void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "_Bool"];

/// Qualifiers and storage classes that carry no meaning for the translation.
const IGNORED_QUALIFIERS: &[&str] = &["volatile", "static", "register", "inline", "restrict"];

const UNSUPPORTED_KEYWORDS: &[&str] = &["switch", "case", "default", "goto", "asm", "__asm__"];

/// Bound on parser recursion (statements, sub-expressions, initializer lists).
const MAX_NESTING: usize = 256;

/// Bound on the depth of any parsed expression tree, including the left-leaning
/// chains (`a + b + c`, `p->x->y`) the parser builds in a loop.
const MAX_EXPR_DEPTH: usize = 256;

/// Parse a C function body, with or without its enclosing braces.
pub fn parse_body(source: &str) -> SyntaxResult<Block> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0, end_offset: source.len(), depth: 0 };

    if parser.at_punct("{") {
        let block = parser.parse_block()?;
        if parser.at_end() {
            check_expr_depth(&block, source.len())?;
            return Ok(block);
        }
        parser.pos = 0;
    }

    let mut stmts = Vec::new();
    while !parser.at_end() {
        stmts.push(parser.parse_stmt()?);
    }
    let block = Block::new(stmts);
    check_expr_depth(&block, source.len())?;
    Ok(block)
}

fn check_expr_depth(block: &Block, end_offset: usize) -> SyntaxResult<()> {
    let mut deepest = 0;
    block.walk_stmts(&mut |stmt| {
        for expr in stmt.own_exprs() {
            deepest = deepest.max(expr.depth());
        }
    });
    if deepest > MAX_EXPR_DEPTH {
        return Err(SyntaxError::new(
            format!("expression nesting depth {deepest} exceeds {MAX_EXPR_DEPTH}"),
            end_offset,
        ));
    }
    Ok(())
}

/// Heuristic for "this identifier names a type": catalog-style `_t` names and
/// CamelCase aggregate names (`AVRational`). All-caps names are macros.
pub fn is_type_like(name: &str) -> bool {
    if TYPE_KEYWORDS.contains(&name) || name.ends_with("_t") {
        return true;
    }
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && name.chars().any(|c| c.is_ascii_lowercase())
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end_offset: usize,
    depth: usize,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|t| t.offset).unwrap_or(self.end_offset)
    }

    fn error<T>(&self, message: impl Into<String>) -> SyntaxResult<T> {
        Err(SyntaxError::new(message, self.offset()))
    }

    /// Height of a loop-built node over a left operand of `height`; rejects
    /// chains past `MAX_EXPR_DEPTH` before they grow any further.
    fn grow(&self, height: usize, other_child: usize) -> SyntaxResult<usize> {
        let grown = height.max(other_child) + 1;
        if grown > MAX_EXPR_DEPTH {
            return self.error(format!("expression nesting deeper than {MAX_EXPR_DEPTH} levels"));
        }
        Ok(grown)
    }

    fn nested<T>(&mut self, parse: fn(&mut Self) -> SyntaxResult<T>) -> SyntaxResult<T> {
        if self.depth >= MAX_NESTING {
            return self.error(format!("nesting deeper than {MAX_NESTING} levels"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn at_punct(&self, p: &str) -> bool {
        matches!(self.peek(), Some(TokenKind::Punct(q)) if *q == p)
    }

    fn punct_at(&self, ahead: usize, p: &str) -> bool {
        matches!(self.peek_at(ahead), Some(TokenKind::Punct(q)) if *q == p)
    }

    fn at_keyword(&self, kw: &str) -> bool {
        self.ident_at(0) == Some(kw)
    }

    fn ident_at(&self, ahead: usize) -> Option<&str> {
        match self.peek_at(ahead) {
            Some(TokenKind::Ident(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.at_punct(p) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> SyntaxResult<()> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            self.error(format!("expected '{p}'"))
        }
    }

    fn expect_ident(&mut self) -> SyntaxResult<String> {
        match self.peek() {
            Some(TokenKind::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => self.error("expected identifier"),
        }
    }

    // ---- statements -------------------------------------------------------

    fn parse_block(&mut self) -> SyntaxResult<Block> {
        self.expect_punct("{")?;
        let mut stmts = Vec::new();
        while !self.at_punct("}") {
            if self.at_end() {
                return self.error("unterminated block");
            }
            stmts.push(self.parse_stmt()?);
        }
        self.expect_punct("}")?;
        Ok(Block::new(stmts))
    }

    fn parse_stmt(&mut self) -> SyntaxResult<Stmt> {
        self.nested(Self::parse_stmt_inner)
    }

    fn parse_stmt_inner(&mut self) -> SyntaxResult<Stmt> {
        if self.at_punct("{") {
            return Ok(Stmt::Block(self.parse_block()?));
        }
        if self.eat_punct(";") {
            return Ok(Stmt::Empty);
        }

        if let Some(word) = self.ident_at(0) {
            if UNSUPPORTED_KEYWORDS.contains(&word) {
                return self.error(format!("unsupported statement '{word}'"));
            }
        }

        if self.eat_keyword("return") {
            if self.eat_punct(";") {
                return Ok(Stmt::Return(None));
            }
            let value = self.parse_expr()?;
            self.expect_punct(";")?;
            return Ok(Stmt::Return(Some(value)));
        }

        if self.eat_keyword("if") {
            let cond = self.parse_condition()?;
            let then = Box::new(self.parse_stmt()?);
            let otherwise =
                if self.eat_keyword("else") { Some(Box::new(self.parse_stmt()?)) } else { None };
            return Ok(Stmt::If { cond, then, otherwise });
        }

        if self.eat_keyword("while") {
            let cond = self.parse_condition()?;
            let body = Box::new(self.parse_stmt()?);
            return Ok(Stmt::While { cond, body });
        }

        if self.eat_keyword("do") {
            let body = Box::new(self.parse_stmt()?);
            if !self.eat_keyword("while") {
                return self.error("expected 'while' after do body");
            }
            let cond = self.parse_condition()?;
            self.expect_punct(";")?;
            return Ok(Stmt::DoWhile { body, cond });
        }

        if self.eat_keyword("for") {
            return self.parse_for();
        }

        if self.eat_keyword("break") {
            self.expect_punct(";")?;
            return Ok(Stmt::Break);
        }

        if self.eat_keyword("continue") {
            self.expect_punct(";")?;
            return Ok(Stmt::Continue);
        }

        if self.at_declaration() {
            return Ok(Stmt::Decl(self.parse_declaration()?));
        }

        let expr = self.parse_expr()?;
        self.expect_punct(";")?;
        Ok(Stmt::Expr(expr))
    }

    fn parse_condition(&mut self) -> SyntaxResult<Expr> {
        self.expect_punct("(")?;
        let cond = self.parse_expr()?;
        self.expect_punct(")")?;
        Ok(cond)
    }

    fn parse_for(&mut self) -> SyntaxResult<Stmt> {
        self.expect_punct("(")?;
        let init = if self.eat_punct(";") {
            None
        } else if self.at_declaration() {
            Some(Box::new(Stmt::Decl(self.parse_declaration()?)))
        } else {
            let expr = self.parse_expr()?;
            self.expect_punct(";")?;
            Some(Box::new(Stmt::Expr(expr)))
        };
        let cond = if self.at_punct(";") { None } else { Some(self.parse_expr()?) };
        self.expect_punct(";")?;
        let step = if self.at_punct(")") { None } else { Some(self.parse_expr()?) };
        self.expect_punct(")")?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::For { init, cond, step, body })
    }

    /// Decide whether the statement at the cursor declares variables.
    fn at_declaration(&self) -> bool {
        let Some(first) = self.ident_at(0) else {
            return false;
        };
        if first == "const"
            || first == "struct"
            || first == "union"
            || first == "enum"
            || TYPE_KEYWORDS.contains(&first)
            || IGNORED_QUALIFIERS.contains(&first)
        {
            return true;
        }
        // `T name ...`
        if self.ident_at(1).is_some() {
            return true;
        }
        // `T *name = ...` with a type-looking T; `a * b;` stays an expression.
        if is_type_like(first) {
            let mut ahead = 1;
            while self.punct_at(ahead, "*") {
                ahead += 1;
            }
            return ahead > 1
                && self.ident_at(ahead).is_some()
                && ["=", ";", ",", "["].iter().any(|p| self.punct_at(ahead + 1, p));
        }
        false
    }

    fn parse_declaration(&mut self) -> SyntaxResult<Declaration> {
        let ty = self.parse_type()?;
        let mut declarators = Vec::new();
        loop {
            let mut pointers = 0;
            while self.eat_punct("*") {
                pointers += 1;
                self.eat_keyword("const");
            }
            let name = self.expect_ident()?;
            if self.at_punct("[") {
                return self.error("array declarations are not supported");
            }
            let init = if self.eat_punct("=") { Some(self.parse_initializer()?) } else { None };
            declarators.push(Declarator { name, pointers, init });
            if self.eat_punct(",") {
                continue;
            }
            self.expect_punct(";")?;
            break;
        }
        Ok(Declaration { ty, declarators, style: DeclStyle::Explicit })
    }

    fn parse_initializer(&mut self) -> SyntaxResult<Expr> {
        if self.at_punct("{") {
            self.parse_init_list()
        } else {
            self.parse_assignment()
        }
    }

    fn parse_init_list(&mut self) -> SyntaxResult<Expr> {
        self.nested(Self::parse_init_list_inner)
    }

    fn parse_init_list_inner(&mut self) -> SyntaxResult<Expr> {
        self.expect_punct("{")?;
        let mut items = Vec::new();
        while !self.at_punct("}") {
            if self.at_punct(".") {
                return self.error("designated initializers are not supported");
            }
            items.push(self.parse_initializer()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct("}")?;
        Ok(Expr::InitList(items))
    }

    /// Parse a type name: qualifiers, tag or keyword/identifier base, pointer levels.
    fn parse_type(&mut self) -> SyntaxResult<TypeName> {
        let mut ty = TypeName::named("");
        self.skip_qualifiers(&mut ty);

        let tag = match self.ident_at(0) {
            Some("struct") => Some(TypeTag::Struct),
            Some("union") => Some(TypeTag::Union),
            Some("enum") => Some(TypeTag::Enum),
            _ => None,
        };

        if let Some(tag) = tag {
            self.pos += 1;
            ty.tag = Some(tag);
            ty.base = self.expect_ident()?;
        } else if self.ident_at(0).is_some_and(|w| TYPE_KEYWORDS.contains(&w)) {
            let mut words = Vec::new();
            while let Some(word) = self.ident_at(0) {
                if TYPE_KEYWORDS.contains(&word) {
                    words.push(word.to_string());
                    self.pos += 1;
                } else if word == "const" {
                    ty.is_const = true;
                    self.pos += 1;
                } else {
                    break;
                }
            }
            ty.base = words.join(" ");
        } else {
            ty.base = self.expect_ident()?;
        }

        self.skip_qualifiers(&mut ty);
        while self.at_punct("*") && !self.star_starts_declarator() {
            self.pos += 1;
            let level_const = self.eat_keyword("const");
            ty.pointers.push(level_const);
        }
        Ok(ty)
    }

    /// In a declaration, `*` binds to the declarator; keep those for it so
    /// `int *a, b;` gives `a` one pointer level and `b` none.
    fn star_starts_declarator(&self) -> bool {
        let mut ahead = 0;
        while self.punct_at(ahead, "*") || self.ident_at(ahead) == Some("const") {
            ahead += 1;
        }
        self.ident_at(ahead).is_some()
    }

    fn skip_qualifiers(&mut self, ty: &mut TypeName) {
        while let Some(word) = self.ident_at(0) {
            if word == "const" {
                ty.is_const = true;
                self.pos += 1;
            } else if IGNORED_QUALIFIERS.contains(&word) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Parse a parenthesised type (cast or `sizeof`) with pointers kept on the type.
    fn parse_abstract_type(&mut self) -> SyntaxResult<TypeName> {
        let mut ty = self.parse_type()?;
        while self.eat_punct("*") {
            let level_const = self.eat_keyword("const");
            ty.pointers.push(level_const);
        }
        Ok(ty)
    }

    /// At `(`: does a type name follow, making this a cast or `sizeof(type)`?
    fn paren_starts_type(&self) -> bool {
        let Some(first) = self.ident_at(1) else {
            return false;
        };
        if matches!(first, "const" | "struct" | "union" | "enum" | "volatile")
            || TYPE_KEYWORDS.contains(&first)
        {
            return true;
        }
        let mut ahead = 2;
        let mut saw_star = false;
        loop {
            if self.punct_at(ahead, "*") {
                saw_star = true;
            } else if self.ident_at(ahead) != Some("const") {
                break;
            }
            ahead += 1;
        }
        self.punct_at(ahead, ")") && (saw_star || is_type_like(first))
    }

    // ---- expressions ------------------------------------------------------

    fn parse_expr(&mut self) -> SyntaxResult<Expr> {
        let expr = self.parse_assignment()?;
        if self.at_punct(",") {
            return self.error("comma expressions are not supported");
        }
        Ok(expr)
    }

    fn parse_assignment(&mut self) -> SyntaxResult<Expr> {
        self.nested(Self::parse_assignment_inner)
    }

    fn parse_assignment_inner(&mut self) -> SyntaxResult<Expr> {
        let target = self.parse_ternary()?;
        let op = match self.peek() {
            Some(TokenKind::Punct("=")) => None,
            Some(TokenKind::Punct(p)) if p.len() >= 2 && p.ends_with('=') => {
                let symbol: &str = p;
                match BinaryOp::from_symbol(&symbol[..symbol.len() - 1]) {
                    Some(op) if !op.is_comparison() && !op.is_logical() => Some(op),
                    _ => return Ok(target),
                }
            }
            _ => return Ok(target),
        };
        self.pos += 1;
        let value =
            if self.at_punct("{") { self.parse_init_list()? } else { self.parse_assignment()? };
        Ok(Expr::Assign { op, target: target.boxed(), value: value.boxed() })
    }

    fn parse_ternary(&mut self) -> SyntaxResult<Expr> {
        self.nested(Self::parse_ternary_inner)
    }

    fn parse_ternary_inner(&mut self) -> SyntaxResult<Expr> {
        let cond = self.parse_binary(1)?;
        if !self.eat_punct("?") {
            return Ok(cond);
        }
        let then = self.parse_assignment()?;
        self.expect_punct(":")?;
        let otherwise = self.parse_ternary()?;
        Ok(Expr::Ternary { cond: cond.boxed(), then: then.boxed(), otherwise: otherwise.boxed() })
    }

    fn parse_binary(&mut self, min_prec: u8) -> SyntaxResult<Expr> {
        let mut lhs = self.parse_unary()?;
        let mut height = lhs.depth();
        loop {
            let op = match self.peek() {
                Some(TokenKind::Punct(p)) => match BinaryOp::from_symbol(p) {
                    Some(op) if op.precedence() >= min_prec => op,
                    _ => break,
                },
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_binary(op.precedence() + 1)?;
            height = self.grow(height, rhs.depth())?;
            lhs = Expr::Binary { op, lhs: lhs.boxed(), rhs: rhs.boxed() };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> SyntaxResult<Expr> {
        self.nested(Self::parse_unary_inner)
    }

    fn parse_unary_inner(&mut self) -> SyntaxResult<Expr> {
        let op = match self.peek() {
            Some(TokenKind::Punct("-")) => Some(UnaryOp::Neg),
            Some(TokenKind::Punct("+")) => Some(UnaryOp::Plus),
            Some(TokenKind::Punct("!")) => Some(UnaryOp::Not),
            Some(TokenKind::Punct("~")) => Some(UnaryOp::Complement),
            Some(TokenKind::Punct("*")) => Some(UnaryOp::Deref),
            Some(TokenKind::Punct("&")) => Some(UnaryOp::AddrOf),
            Some(TokenKind::Punct("++")) => Some(UnaryOp::PreInc),
            Some(TokenKind::Punct("--")) => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary { op, operand: operand.boxed() });
        }

        if self.eat_keyword("sizeof") {
            if self.at_punct("(") && self.paren_starts_type() {
                self.pos += 1;
                let ty = self.parse_abstract_type()?;
                self.expect_punct(")")?;
                return Ok(Expr::SizeofType(ty));
            }
            let operand = self.parse_unary()?;
            return Ok(Expr::SizeofExpr(operand.boxed()));
        }

        if self.at_punct("(") && self.paren_starts_type() {
            self.pos += 1;
            let ty = self.parse_abstract_type()?;
            self.expect_punct(")")?;
            let operand =
                if self.at_punct("{") { self.parse_init_list()? } else { self.parse_unary()? };
            return Ok(Expr::Cast { ty, operand: operand.boxed() });
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> SyntaxResult<Expr> {
        let mut expr = self.parse_primary()?;
        let mut height = expr.depth();
        loop {
            if self.eat_punct("(") {
                let mut args = Vec::new();
                if !self.at_punct(")") {
                    loop {
                        args.push(self.parse_assignment()?);
                        if !self.eat_punct(",") {
                            break;
                        }
                    }
                }
                self.expect_punct(")")?;
                let widest = args.iter().map(Expr::depth).max().unwrap_or(0);
                height = self.grow(height, widest)?;
                expr = Expr::Call { callee: expr.boxed(), args };
            } else if self.eat_punct("[") {
                let index = self.parse_expr()?;
                self.expect_punct("]")?;
                height = self.grow(height, index.depth())?;
                expr = Expr::Index { base: expr.boxed(), index: index.boxed() };
            } else if self.eat_punct(".") {
                let field = self.expect_ident()?;
                height = self.grow(height, 0)?;
                expr = Expr::Member { base: expr.boxed(), field, arrow: false };
            } else if self.eat_punct("->") {
                let field = self.expect_ident()?;
                height = self.grow(height, 0)?;
                expr = Expr::Member { base: expr.boxed(), field, arrow: true };
            } else if self.eat_punct("++") {
                height = self.grow(height, 0)?;
                expr = Expr::Postfix { op: PostfixOp::Inc, operand: expr.boxed() };
            } else if self.eat_punct("--") {
                height = self.grow(height, 0)?;
                expr = Expr::Postfix { op: PostfixOp::Dec, operand: expr.boxed() };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> SyntaxResult<Expr> {
        let Some(kind) = self.peek().cloned() else {
            return self.error("unexpected end of body");
        };
        let expr = match kind {
            TokenKind::Ident(name) => Expr::Ident(name),
            TokenKind::Int(lit) => Expr::Int(lit),
            TokenKind::Float(text) => Expr::Float(text),
            TokenKind::Char(text) => Expr::Char(text),
            TokenKind::Str(text) => Expr::Str(text),
            TokenKind::Punct("(") => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                self.expect_punct(")")?;
                return Ok(Expr::Paren(inner.boxed()));
            }
            TokenKind::Punct(p) => return self.error(format!("unexpected '{p}'")),
        };
        self.pos += 1;
        Ok(expr)
    }
}
