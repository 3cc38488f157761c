use cool_lang::semant::ErrorKind;

use test_utils::{assert_analyzes, assert_fails};

const MAIN_STUB: &str = "class Main { main(): Object { 0 }; };";

#[test]
fn duplicate_class_is_reported() {
    assert_fails(
        &format!("class A {{ }}; class A {{ }}; {MAIN_STUB}"),
        ErrorKind::Semantic,
        "already in context",
    );
}

#[test]
fn redefining_a_builtin_is_reported() {
    assert_fails(
        &format!("class Int {{ }}; {MAIN_STUB}"),
        ErrorKind::Semantic,
        "Int",
    );
}

#[test]
fn inheritance_cycle_is_reported_per_member() {
    let diagnostics = assert_fails(
        &format!("class A inherits B {{ }}; class B inherits A {{ }}; {MAIN_STUB}"),
        ErrorKind::Semantic,
        "cycle",
    );

    let cycle_members = diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.message.contains("cycle"))
        .count();
    assert_eq!(cycle_members, 2);
}

#[test]
fn inheriting_from_a_sealed_class_is_reported() {
    assert_fails(
        &format!("class A inherits Int {{ }}; {MAIN_STUB}"),
        ErrorKind::Semantic,
        "cannot inherit from 'Int'",
    );
    assert_fails(
        &format!("class A inherits Bool {{ }}; {MAIN_STUB}"),
        ErrorKind::Semantic,
        "cannot inherit from 'Bool'",
    );
    assert_fails(
        &format!("class A inherits String {{ }}; {MAIN_STUB}"),
        ErrorKind::Semantic,
        "cannot inherit from 'String'",
    );
}

#[test]
fn inheriting_from_an_undefined_class_is_reported() {
    assert_fails(
        &format!("class A inherits Missing {{ }}; {MAIN_STUB}"),
        ErrorKind::Semantic,
        "undefined class Missing",
    );
}

#[test]
fn inheriting_from_self_type_is_reported() {
    assert_fails(
        &format!("class A inherits SELF_TYPE {{ }}; {MAIN_STUB}"),
        ErrorKind::Semantic,
        "SELF_TYPE",
    );
}

#[test]
fn attribute_redefinition_is_reported() {
    assert_fails(
        &format!("class A {{ a: Int; a: Bool; }}; {MAIN_STUB}"),
        ErrorKind::Semantic,
        "already defined",
    );
}

#[test]
fn inherited_attribute_redefinition_is_reported() {
    assert_fails(
        &format!(
            "class A {{ a: Int; }}; class B inherits A {{ a: Int; }}; {MAIN_STUB}"
        ),
        ErrorKind::Semantic,
        "already defined",
    );
}

#[test]
fn duplicate_method_is_reported() {
    assert_fails(
        &format!("class A {{ f(): Int {{ 0 }}; f(): Int {{ 1 }}; }}; {MAIN_STUB}"),
        ErrorKind::Semantic,
        "already defined",
    );
}

#[test]
fn override_with_identical_signature_is_accepted() {
    assert_analyzes(
        "class A { f(x: Int): Bool { true }; };
         class B inherits A { f(x: Int): Bool { false }; };
         class Main { main(): Object { 0 }; };",
    );
}

#[test]
fn override_with_different_signature_is_reported() {
    assert_fails(
        "class A { f(x: Int): Bool { true }; };
         class B inherits A { f(x: String): Bool { false }; };
         class Main { main(): Object { 0 }; };",
        ErrorKind::Semantic,
        "different signature",
    );

    assert_fails(
        "class A { f(x: Int): Bool { true }; };
         class B inherits A { f(x: Int): Int { 0 }; };
         class Main { main(): Object { 0 }; };",
        ErrorKind::Semantic,
        "different signature",
    );
}

#[test]
fn self_as_attribute_name_is_reported() {
    assert_fails(
        &format!("class A {{ self: Int; }}; {MAIN_STUB}"),
        ErrorKind::Semantic,
        "'self' cannot be the name of an attribute",
    );
}

#[test]
fn self_as_formal_name_is_reported() {
    assert_fails(
        &format!("class A {{ f(self: Int): Int {{ 0 }}; }}; {MAIN_STUB}"),
        ErrorKind::Semantic,
        "'self' cannot be the name of a formal parameter",
    );
}

#[test]
fn duplicate_formal_name_is_reported() {
    assert_fails(
        &format!("class A {{ f(x: Int, x: Int): Int {{ 0 }}; }}; {MAIN_STUB}"),
        ErrorKind::Semantic,
        "multiply defined",
    );
}

#[test]
fn undefined_attribute_type_is_reported() {
    assert_fails(
        &format!("class A {{ a: Missing; }}; {MAIN_STUB}"),
        ErrorKind::Type,
        "Missing",
    );
}

#[test]
fn self_type_as_formal_type_is_reported() {
    assert_fails(
        &format!("class A {{ f(x: SELF_TYPE): Int {{ 0 }}; }}; {MAIN_STUB}"),
        ErrorKind::Type,
        "SELF_TYPE",
    );
}

#[test]
fn missing_main_class_is_reported() {
    assert_fails("class A { };", ErrorKind::Semantic, "Class Main is not defined");
}

#[test]
fn missing_main_method_is_reported() {
    assert_fails(
        "class Main { };",
        ErrorKind::Semantic,
        "Method 'main' is not defined",
    );
}

#[test]
fn main_with_arguments_is_reported() {
    assert_fails(
        "class Main { main(x: Int): Object { 0 }; };",
        ErrorKind::Semantic,
        "must not take arguments",
    );
}
