use inline_port_core::syntax::ast::{BinaryOp, DeclStyle, LongWidth, TypeTag};
use inline_port_core::syntax::lexer::{tokenize, TokenKind};
use inline_port_core::syntax::{parse_body, render_block, Expr, Stmt};

#[test]
fn lexer_keeps_integer_suffixes_structured() {
    let tokens = tokenize("0x7fULL 10u 3l").unwrap();
    let lits: Vec<_> = tokens
        .iter()
        .map(|t| match &t.kind {
            TokenKind::Int(lit) => lit.clone(),
            other => panic!("unexpected token {other:?}"),
        })
        .collect();
    assert_eq!(lits[0].digits, "0x7f");
    assert!(lits[0].suffix.unsigned);
    assert_eq!(lits[0].suffix.long, LongWidth::LongLong);
    assert_eq!(lits[0].value(), Some(127));
    assert!(lits[1].suffix.unsigned && lits[1].suffix.long == LongWidth::None);
    assert_eq!(lits[2].suffix.long, LongWidth::Long);
}

#[test]
fn lexer_prefers_longest_punctuator_and_skips_comments() {
    let tokens = tokenize("a <<= b; /* note */ c->d // tail\n").unwrap();
    let puncts: Vec<&str> = tokens
        .iter()
        .filter_map(|t| match t.kind {
            TokenKind::Punct(p) => Some(p),
            _ => None,
        })
        .collect();
    assert_eq!(puncts, vec!["<<=", ";", "->"]);
}

#[test]
fn preprocessor_directive_is_a_syntax_error() {
    let err = parse_body("{\n#ifdef X\nreturn 1;\n#endif\n}").unwrap_err();
    assert!(err.message.contains("preprocessor"));
    assert_eq!(err.offset, 2);
}

#[test]
fn unsupported_statements_are_errors() {
    assert!(parse_body("{ switch (a) { case 1: return 1; } return 0; }").is_err());
    assert!(parse_body("{ int a[4]; return a[0]; }").is_err());
    assert!(parse_body("{ return a, b; }").is_err());
    assert!(parse_body("{ return a; ").is_err());
}

#[test]
fn body_may_omit_enclosing_braces() {
    let with = parse_body("{ return a + 1; }").unwrap();
    let without = parse_body("return a + 1;").unwrap();
    assert_eq!(with, without);
}

#[test]
fn binary_precedence_follows_c() {
    let block = parse_body("{ return a + b * c << 1 == d && e; }").unwrap();
    let Stmt::Return(Some(Expr::Binary { op, lhs, .. })) = &block.stmts[0] else {
        panic!("unexpected tree {block:?}");
    };
    assert_eq!(*op, BinaryOp::LogicalAnd);
    let Expr::Binary { op, lhs, .. } = lhs.as_ref() else { panic!() };
    assert_eq!(*op, BinaryOp::Eq);
    let Expr::Binary { op, lhs, .. } = lhs.as_ref() else { panic!() };
    assert_eq!(*op, BinaryOp::Shl);
    let Expr::Binary { op, rhs, .. } = lhs.as_ref() else { panic!() };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(rhs.as_ref(), Expr::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn cast_and_parenthesised_expression_are_told_apart() {
    let block =
        parse_body("{ x = (uint8_t)a; y = (a) - b; z = (AVRational *)p; w = (foo *)q; }").unwrap();
    let values: Vec<&Expr> = block
        .stmts
        .iter()
        .map(|s| match s {
            Stmt::Expr(Expr::Assign { value, .. }) => value.as_ref(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert!(matches!(values[0], Expr::Cast { .. }));
    assert!(matches!(values[1], Expr::Binary { op: BinaryOp::Sub, .. }));
    assert!(matches!(
        values[2],
        Expr::Cast { ty, .. } if ty.base == "AVRational" && ty.pointer_depth() == 1
    ));
    assert!(matches!(values[3], Expr::Cast { ty, .. } if ty.base == "foo"));
}

#[test]
fn declarations_keep_tags_qualifiers_and_pointers() {
    let block =
        parse_body("{ const union av_intfloat32 v; unsigned int n = 0, *p = &n; }").unwrap();
    let Stmt::Decl(first) = &block.stmts[0] else { panic!() };
    assert_eq!(first.ty.tag, Some(TypeTag::Union));
    assert!(first.ty.is_const);
    assert_eq!(first.style, DeclStyle::Explicit);

    let Stmt::Decl(second) = &block.stmts[1] else { panic!() };
    assert_eq!(second.ty.base, "unsigned int");
    assert_eq!(second.declarators.len(), 2);
    assert_eq!(second.declarator_type(&second.declarators[1]).pointer_depth(), 1);
}

#[test]
fn renderer_adds_parentheses_only_where_needed() {
    let block = parse_body("{ return (a + b) * c + d; }").unwrap();
    assert_eq!(render_block(&block), "{ return (a + b) * c + d; }");

    let block = parse_body("{ if (a < b) { x = -(-a); } else x = y ? 1 : 2; }").unwrap();
    assert_eq!(render_block(&block), "{ if (a < b) { x = -(-a); } else x = y ? 1 : 2; }");
}

#[test]
fn control_flow_statements_parse() {
    let body = "{ int i; for (i = 0; i < n; i++) { if (i == 3) continue; if (i > 5) break; } do { n--; } while (n > 0); while (n < 3) n++; return n; }";
    let block = parse_body(body).unwrap();
    assert_eq!(block.stmts.len(), 5);
    assert!(matches!(block.stmts[1], Stmt::For { .. }));
    assert!(matches!(block.stmts[2], Stmt::DoWhile { .. }));
    assert!(matches!(block.stmts[3], Stmt::While { .. }));
}

#[test]
fn nesting_depth_is_bounded() {
    let nested =
        |depth: usize| format!("{{ return {}a{}; }}", "(".repeat(depth), ")".repeat(depth));
    assert!(parse_body(&nested(40)).is_ok());
    let err = parse_body(&nested(2000)).unwrap_err();
    assert!(err.message.contains("nesting deeper than 256 levels"), "{err}");

    let blocks = format!("{}{}", "{ ".repeat(300), "} ".repeat(300));
    assert!(parse_body(&blocks).is_err());

    let negations = format!("{{ return {}a; }}", "-".repeat(1000));
    assert!(parse_body(&negations).is_err());
}

#[test]
fn long_operator_and_member_chains_are_bounded() {
    let sum = |terms: usize| format!("{{ return a{}; }}", " + a".repeat(terms));
    assert!(parse_body(&sum(100)).is_ok());
    let err = parse_body(&sum(1000)).unwrap_err();
    assert!(err.message.contains("expression nesting deeper than 256 levels"), "{err}");

    let members = format!("{{ return p{}; }}", "->next".repeat(1000));
    assert!(parse_body(&members).is_err());
}

#[test]
fn octal_literals_keep_their_octal_value() {
    let tokens = tokenize("010 0 0755").unwrap();
    let lits: Vec<_> = tokens
        .iter()
        .filter_map(|t| match &t.kind {
            TokenKind::Int(lit) => Some(lit.clone()),
            _ => None,
        })
        .collect();
    assert!(lits[0].is_octal());
    assert_eq!(lits[0].value(), Some(8));
    assert!(!lits[1].is_octal());
    assert_eq!(lits[2].value(), Some(493));
    assert!(tokenize("09").is_err());
}
