use cool_lang::semant::{ErrorKind, AUTO_TYPE};

use test_utils::{assert_analyzes, assert_fails, method_body};

fn assert_no_auto_left(analysis: &cool_lang::semant::Analysis) {
    for ty in analysis.context.types() {
        for attribute in ty.attributes() {
            assert_ne!(
                attribute.ty, AUTO_TYPE,
                "attribute {}.{} kept AUTO_TYPE",
                ty.name(),
                attribute.name
            );
            assert!(attribute.idx.is_none());
        }
        for method in ty.methods() {
            assert!(!method.param_types.iter().any(|ty| ty == AUTO_TYPE));
            assert_ne!(method.return_type, AUTO_TYPE);
            assert!(method.param_idx.iter().all(Option::is_none));
            assert!(method.ridx.is_none());
        }
    }
}

#[test]
fn parameter_used_as_int_is_inferred_as_int() {
    let analysis = assert_analyzes(
        "class Main {
             f(x: AUTO_TYPE): Int { x + 1 };
             main(): Int { f(2) };
         };",
    );

    let signature = analysis
        .context
        .get_type("Main")
        .unwrap()
        .local_method("f")
        .unwrap()
        .clone();
    assert_eq!(signature.param_types, vec!["Int".to_owned()]);
    assert_no_auto_left(&analysis);
}

#[test]
fn unconstrained_parameter_falls_back_to_object() {
    // Upper bound {Object}, lower bound {Main}; the candidate comes from
    // the upper bounds, so this infers Object rather than Main.
    let analysis = assert_analyzes(
        "class Main {
             f(x: AUTO_TYPE): Object { x };
             main(): Object { f(self) };
         };",
    );

    let signature = analysis
        .context
        .get_type("Main")
        .unwrap()
        .local_method("f")
        .unwrap()
        .clone();
    assert_eq!(signature.param_types, vec!["Object".to_owned()]);
    assert_no_auto_left(&analysis);
}

#[test]
fn auto_return_type_is_inferred_from_the_body() {
    let analysis = assert_analyzes(
        "class Main {
             f(): AUTO_TYPE { 1 + 2 };
             main(): Int { f() };
         };",
    );

    let signature = analysis
        .context
        .get_type("Main")
        .unwrap()
        .local_method("f")
        .unwrap()
        .clone();
    assert_eq!(signature.return_type, "Int");
    assert_no_auto_left(&analysis);
}

#[test]
fn auto_attribute_used_as_int_is_inferred_as_int() {
    let analysis = assert_analyzes(
        "class Main {
             a: AUTO_TYPE <- 5;
             main(): Int { a + 1 };
         };",
    );

    let attribute = analysis
        .context
        .get_type("Main")
        .unwrap()
        .local_attribute("a")
        .unwrap()
        .clone();
    assert_eq!(attribute.ty, "Int");
    assert_no_auto_left(&analysis);
}

#[test]
fn auto_attribute_without_uses_falls_back_to_object() {
    let analysis = assert_analyzes(
        "class Main {
             a: AUTO_TYPE <- 5;
             main(): Object { a };
         };",
    );

    let attribute = analysis
        .context
        .get_type("Main")
        .unwrap()
        .local_attribute("a")
        .unwrap()
        .clone();
    assert_eq!(attribute.ty, "Object");
}

#[test]
fn constraints_propagate_between_auto_slots() {
    // y flows into x, so y picks up x's Int upper bound transitively.
    let analysis = assert_analyzes(
        "class Main {
             f(x: AUTO_TYPE): Int { x + 1 };
             g(y: AUTO_TYPE): Int { f(y) };
             main(): Int { g(3) };
         };",
    );

    let main = analysis.context.get_type("Main").unwrap();
    let f = main.local_method("f").unwrap().clone();
    let g = main.local_method("g").unwrap().clone();
    assert_eq!(f.param_types, vec!["Int".to_owned()]);
    assert_eq!(g.param_types, vec!["Int".to_owned()]);
    assert_no_auto_left(&analysis);
}

#[test]
fn inherited_auto_attribute_is_constrained_by_subclass_uses() {
    let analysis = assert_analyzes(
        "class A { a: AUTO_TYPE <- 1; };
         class B inherits A { f(): Int { a + 1 }; };
         class Main { main(): Object { 0 }; };",
    );

    let attribute = analysis
        .context
        .get_type("A")
        .unwrap()
        .local_attribute("a")
        .unwrap()
        .clone();
    assert_eq!(attribute.ty, "Int");
}

#[test]
fn incompatible_constraints_are_an_inference_error() {
    assert_fails(
        "class Main {
             g(i: Int): Int { i };
             h(s: String): String { s };
             f(x: AUTO_TYPE): Object { { g(x); h(x); x; } };
             main(): Object { 0 };
         };",
        ErrorKind::TypeInference,
        "no type satisfies",
    );
}

#[test]
fn lower_bound_violating_the_candidate_is_an_inference_error() {
    // x must conform to Int, but a String value flows into it.
    assert_fails(
        "class Main {
             g(i: Int): Int { i };
             f(x: AUTO_TYPE): Object { g(x) };
             main(): Object { f(\"s\") };
         };",
        ErrorKind::TypeInference,
        "does not conform",
    );
}

#[test]
fn let_auto_binding_takes_the_initializer_type() {
    let analysis = assert_analyzes(
        "class Main { main(): Int { let x: AUTO_TYPE <- 3 in x + 1 }; };",
    );
    assert_eq!(method_body(&analysis, "Main", "main").info().computed_type, "Int");
}

#[test]
fn let_auto_binding_without_initializer_is_an_inference_error() {
    assert_fails(
        "class Main { main(): Int { let x: AUTO_TYPE in 0 }; };",
        ErrorKind::TypeInference,
        "without an initializer",
    );
}
