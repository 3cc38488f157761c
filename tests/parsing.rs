use cool_lang::ast::{BinaryOp, Expression, Feature};
use cool_lang::parser;

use test_utils::parse;

fn main_body(source: &str) -> Expression<()> {
    let program = parse(source);
    let class = &program.classes[0];
    let Feature::Method(method) = &class.features[0] else {
        panic!("expected a method");
    };
    method.body.clone()
}

#[test]
fn keywords_are_case_insensitive() {
    parse("CLASS Main INHERITS IO { main(): Object { IF true THEN 1 ELSE 2 FI }; };");
}

#[test]
fn comments_are_skipped() {
    parse(
        "-- line comment
         (* block (* nested *) comment *)
         class Main { main(): Object { 0 }; };",
    );
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let body = main_body("class Main { main(): Int { 1 + 2 * 3 }; };");

    let Expression::Binary(binary) = body else {
        panic!("expected a binary expression");
    };
    assert_eq!(binary.op, BinaryOp::Plus);

    let Expression::Binary(rhs) = *binary.rhs else {
        panic!("expected the product on the right");
    };
    assert_eq!(rhs.op, BinaryOp::Times);
}

#[test]
fn dispatch_chains_fold_left() {
    let body = main_body("class Main { main(): Object { self.a().b() }; };");

    let Expression::Dispatch(outer) = body else {
        panic!("expected a dispatch");
    };
    assert_eq!(outer.method, "b");

    let Expression::Dispatch(inner) = *outer.receiver.unwrap() else {
        panic!("expected a nested dispatch receiver");
    };
    assert_eq!(inner.method, "a");
}

#[test]
fn static_dispatch_records_the_parent() {
    let body = main_body("class Main { main(): Object { self@Object.copy() }; };");

    let Expression::Dispatch(dispatch) = body else {
        panic!("expected a dispatch");
    };
    assert_eq!(dispatch.static_parent.unwrap().value, "Object");
}

#[test]
fn string_escapes_are_decoded() {
    let body = main_body(r#"class Main { main(): String { "a\nb" }; };"#);

    let Expression::Str(string) = body else {
        panic!("expected a string literal");
    };
    assert_eq!(string.value, "a\nb");
}

#[test]
fn let_extends_to_the_right() {
    let body = main_body("class Main { main(): Int { let x: Int <- 1 in x + 1 }; };");

    let Expression::Let(let_expr) = body else {
        panic!("expected a let");
    };
    assert!(matches!(*let_expr.body, Expression::Binary(_)));
}

#[test]
fn syntax_errors_carry_positions() {
    let error = parser::parse("class Main {\n  main(): Object { }; };").unwrap_err();

    assert_eq!(error.position.0, 2);
    assert!(error.to_string().contains("SyntacticError"));
}

#[test]
fn missing_semicolon_is_a_syntax_error() {
    assert!(parser::parse("class Main { main(): Object { 0 } };").is_err());
}
