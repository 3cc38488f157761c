use cool_lang::semant::ErrorKind;

use test_utils::{assert_analyzes, assert_fails, method, method_body};

#[test]
fn minimal_io_program_is_well_typed() {
    let analysis = assert_analyzes(
        r#"class Main inherits IO { main(): Object { out_string("hi") }; };"#,
    );

    let main = method(&analysis, "Main", "main");
    assert_eq!(main.name.info.computed_type, "Object");

    // out_string returns SELF_TYPE; on the implicit self receiver the
    // dispatch keeps it.
    assert_eq!(main.body.info().computed_type, "SELF_TYPE");

    let signature = analysis
        .context
        .get_type("Main")
        .unwrap()
        .get_method("out_string", &analysis.context)
        .unwrap()
        .clone();
    assert_eq!(signature.param_types, vec!["String".to_owned()]);
}

#[test]
fn undefined_identifier_is_a_name_error() {
    assert_fails(
        "class Main { main(): Object { missing }; };",
        ErrorKind::Name,
        "missing",
    );
}

#[test]
fn assigning_to_self_is_reported() {
    assert_fails(
        "class Main { main(): Object { self <- new Main }; };",
        ErrorKind::Semantic,
        "Cannot assign to 'self'",
    );
}

#[test]
fn non_conforming_assignment_is_reported() {
    assert_fails(
        "class Main { a: Int; main(): Object { a <- \"nope\" }; };",
        ErrorKind::Type,
        "does not conform",
    );
}

#[test]
fn assignment_has_the_type_of_its_value() {
    let analysis = assert_analyzes(
        "class A { };
         class B inherits A { };
         class Main { a: A; main(): A { a <- new B }; };",
    );

    assert_eq!(method_body(&analysis, "Main", "main").info().computed_type, "B");
}

#[test]
fn arithmetic_requires_int_operands() {
    assert_fails(
        "class Main { main(): Int { 1 + \"two\" }; };",
        ErrorKind::Type,
        "'Int'",
    );
}

#[test]
fn comparison_yields_bool() {
    let analysis = assert_analyzes("class Main { main(): Bool { 1 < 2 }; };");
    assert_eq!(method_body(&analysis, "Main", "main").info().computed_type, "Bool");

    assert_analyzes("class Main { main(): Bool { 1 <= 2 }; };");
}

#[test]
fn equality_on_mixed_basic_types_is_reported() {
    assert_fails(
        "class Main { main(): Bool { 1 = \"one\" }; };",
        ErrorKind::Type,
        "basic type",
    );
    assert_fails(
        "class Main { main(): Bool { true = 1 }; };",
        ErrorKind::Type,
        "basic type",
    );
}

#[test]
fn equality_between_objects_is_permitted() {
    assert_analyzes(
        "class A { };
         class B { };
         class Main { main(): Bool { new A = new B }; };",
    );
}

#[test]
fn not_requires_bool() {
    assert_fails(
        "class Main { main(): Bool { not 1 }; };",
        ErrorKind::Type,
        "'Bool'",
    );
}

#[test]
fn complement_requires_int() {
    assert_fails(
        "class Main { main(): Int { ~true }; };",
        ErrorKind::Type,
        "'Int'",
    );
}

#[test]
fn isvoid_accepts_anything() {
    let analysis = assert_analyzes("class Main { main(): Bool { isvoid self }; };");
    assert_eq!(method_body(&analysis, "Main", "main").info().computed_type, "Bool");
}

#[test]
fn if_requires_bool_condition() {
    assert_fails(
        "class Main { main(): Int { if 1 then 2 else 3 fi }; };",
        ErrorKind::Type,
        "'Bool'",
    );
}

#[test]
fn if_joins_its_branches() {
    let analysis = assert_analyzes(
        "class A { };
         class B inherits A { };
         class C inherits A { };
         class Main { main(): A { if true then new B else new C fi }; };",
    );

    assert_eq!(method_body(&analysis, "Main", "main").info().computed_type, "A");
}

#[test]
fn while_has_type_object() {
    let analysis = assert_analyzes("class Main { main(): Object { while false loop 0 pool }; };");
    assert_eq!(
        method_body(&analysis, "Main", "main").info().computed_type,
        "Object"
    );
}

#[test]
fn block_takes_the_last_expression_type() {
    let analysis = assert_analyzes("class Main { main(): Int { { true; \"s\"; 42; } }; };");
    assert_eq!(method_body(&analysis, "Main", "main").info().computed_type, "Int");
}

#[test]
fn let_binding_is_visible_to_later_bindings_and_body() {
    let analysis = assert_analyzes(
        "class Main { main(): Int { let x: Int <- 1, y: Int <- x + 1 in x + y }; };",
    );
    assert_eq!(method_body(&analysis, "Main", "main").info().computed_type, "Int");
}

#[test]
fn let_initializer_does_not_see_its_own_binding() {
    // The inner x's initializer refers to the attribute, not to itself.
    let analysis = assert_analyzes(
        "class Main { x: Int <- 5; main(): Int { let x: Int <- x + 1 in x }; };",
    );
    assert_eq!(method_body(&analysis, "Main", "main").info().computed_type, "Int");

    // Without any outer x the same initializer is an undefined identifier.
    assert_fails(
        "class Main { main(): Int { let x: Int <- x + 1 in x }; };",
        ErrorKind::Name,
        "'x'",
    );
}

#[test]
fn let_shadows_outer_bindings() {
    assert_analyzes(
        "class Main { main(): String { let x: Int <- 1 in let x: String <- \"s\" in x }; };",
    );
}

#[test]
fn non_conforming_let_initializer_is_reported() {
    assert_fails(
        "class Main { main(): Int { let x: Int <- \"s\" in x }; };",
        ErrorKind::Type,
        "does not conform",
    );
}

#[test]
fn undefined_let_type_is_reported() {
    assert_fails(
        "class Main { main(): Int { let x: Missing in 0 }; };",
        ErrorKind::Type,
        "Missing",
    );
}

#[test]
fn formals_shadow_attributes() {
    assert_analyzes(
        "class Main { x: String; f(x: Int): Int { x + 1 }; main(): Int { f(1) }; };",
    );
}

#[test]
fn case_joins_branch_bodies() {
    let analysis = assert_analyzes(
        "class A { };
         class B inherits A { };
         class C inherits A { };
         class Main {
             main(): A {
                 case new B of
                     b: B => new B;
                     c: C => new C;
                 esac
             };
         };",
    );

    assert_eq!(method_body(&analysis, "Main", "main").info().computed_type, "A");
}

#[test]
fn case_branch_types_must_be_distinct() {
    assert_fails(
        "class Main {
             main(): Int {
                 case 1 of
                     a: Int => 1;
                     b: Int => 2;
                 esac
             };
         };",
        ErrorKind::Semantic,
        "Duplicate branch",
    );
}

#[test]
fn case_branch_type_cannot_be_self_type() {
    assert_fails(
        "class Main {
             main(): Int {
                 case 1 of
                     a: SELF_TYPE => 1;
                 esac
             };
         };",
        ErrorKind::Type,
        "SELF_TYPE",
    );
}

#[test]
fn new_undefined_type_is_reported() {
    assert_fails(
        "class Main { main(): Object { new Missing }; };",
        ErrorKind::Type,
        "Missing",
    );
}

#[test]
fn new_self_type_evaluates_to_self_type() {
    let analysis = assert_analyzes("class Main { main(): SELF_TYPE { new SELF_TYPE }; };");
    assert_eq!(
        method_body(&analysis, "Main", "main").info().computed_type,
        "SELF_TYPE"
    );
}

#[test]
fn self_type_attribute_accepts_only_self_type_values() {
    assert_analyzes("class Main { me: SELF_TYPE <- self; main(): Object { 0 }; };");

    assert_fails(
        "class Main { me: SELF_TYPE <- new Main; main(): Object { 0 }; };",
        ErrorKind::Type,
        "does not conform",
    );
}

#[test]
fn unknown_method_is_an_attribute_error() {
    assert_fails(
        "class Main { main(): Object { self.missing() }; };",
        ErrorKind::Attribute,
        "missing",
    );
}

#[test]
fn dispatch_arity_mismatch_is_reported() {
    assert_fails(
        "class Main inherits IO { main(): Object { out_int(1, 2) }; };",
        ErrorKind::Semantic,
        "argument",
    );
}

#[test]
fn dispatch_argument_must_conform() {
    assert_fails(
        "class Main inherits IO { main(): Object { out_int(\"one\") }; };",
        ErrorKind::Type,
        "does not conform",
    );
}

#[test]
fn self_type_return_is_covariant_with_the_receiver() {
    let analysis = assert_analyzes(
        "class C { };
         class Main { main(): C { (new C).copy() }; };",
    );

    assert_eq!(method_body(&analysis, "Main", "main").info().computed_type, "C");
}

#[test]
fn static_dispatch_uses_the_named_parent() {
    let analysis = assert_analyzes(
        "class A { f(): Int { 1 }; };
         class B inherits A { f(): Int { 2 }; };
         class Main { main(): Int { (new B)@A.f() }; };",
    );

    assert_eq!(method_body(&analysis, "Main", "main").info().computed_type, "Int");
}

#[test]
fn static_dispatch_receiver_must_conform() {
    assert_fails(
        "class A { f(): Int { 1 }; };
         class B { };
         class Main { main(): Int { (new B)@A.f() }; };",
        ErrorKind::Type,
        "does not conform",
    );
}

#[test]
fn a_single_error_does_not_cascade() {
    let diagnostics = assert_fails(
        "class Main {
             f(): Int { \"not an int\" + 1 };
             g(): Int { 1 + 2 };
             main(): Int { g() };
         };",
        ErrorKind::Type,
        "'Int'",
    );

    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn diagnostics_carry_positions_and_the_stable_format() {
    let diagnostics = assert_fails(
        "class Main {\n    main(): Object { missing };\n};",
        ErrorKind::Name,
        "missing",
    );

    let rendered = diagnostics[0].to_string();
    assert_eq!(diagnostics[0].position.0, 2);
    assert!(
        rendered.starts_with("(2, "),
        "unexpected rendering: {rendered}"
    );
    assert!(rendered.contains(" - NameError: "), "unexpected rendering: {rendered}");
}
