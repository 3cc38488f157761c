use cool_lang::cil::{CoolToCil, Instruction};
use cool_lang::mips::{MipsGenerator, RUNTIME};

use test_utils::assert_analyzes;

const HELLO: &str = r#"class Main inherits IO { main(): Object { out_string("hi") }; };"#;

#[test]
fn lowering_emits_a_function_per_method_and_the_entry() {
    let analysis = assert_analyzes(HELLO);
    let cil = CoolToCil::new(&analysis.context).lower(&analysis.program);

    let names: Vec<&str> = cil
        .functions
        .iter()
        .map(|function| function.name.as_str())
        .collect();

    assert!(names.contains(&"main"));
    assert!(names.contains(&"function_main_at_Main"));
    assert!(names.contains(&"function_out_string_at_IO"));
    assert!(names.contains(&"__init_at_Main"));
}

#[test]
fn lowering_collects_string_literals() {
    let analysis = assert_analyzes(HELLO);
    let cil = CoolToCil::new(&analysis.context).lower(&analysis.program);

    assert!(cil.data.iter().any(|data| data.value == "hi"));
}

#[test]
fn method_slots_are_stable_across_the_hierarchy() {
    let analysis = assert_analyzes(
        "class A { f(): Int { 1 }; g(): Int { 2 }; };
         class B inherits A { g(): Int { 3 }; h(): Int { 4 }; };
         class Main { main(): Object { 0 }; };",
    );
    let cil = CoolToCil::new(&analysis.context).lower(&analysis.program);

    let slot = |class: &str, method: &str| {
        cil.types
            .iter()
            .find(|ty| ty.name == class)
            .unwrap()
            .methods
            .iter()
            .position(|(name, _)| name == method)
            .unwrap()
    };

    assert_eq!(slot("A", "f"), slot("B", "f"));
    assert_eq!(slot("A", "g"), slot("B", "g"));

    let implementation = |class: &str, method: &str| {
        cil.types
            .iter()
            .find(|ty| ty.name == class)
            .unwrap()
            .methods
            .iter()
            .find(|(name, _)| name == method)
            .unwrap()
            .1
            .clone()
    };

    assert_eq!(implementation("A", "g"), "function_g_at_A");
    assert_eq!(implementation("B", "g"), "function_g_at_B");
    assert_eq!(implementation("B", "f"), "function_f_at_A");
}

#[test]
fn string_equality_lowers_to_the_string_comparison() {
    let analysis = assert_analyzes(
        r#"class Main { main(): Bool { "a" = "b" }; };"#,
    );
    let cil = CoolToCil::new(&analysis.context).lower(&analysis.program);

    let main = cil
        .functions
        .iter()
        .find(|function| function.name == "function_main_at_Main")
        .unwrap();
    assert!(main
        .instructions
        .iter()
        .any(|instruction| matches!(instruction, Instruction::EqualStr { .. })));
}

#[test]
fn attribute_initializers_run_in_the_init_function() {
    let analysis = assert_analyzes(
        "class Main { a: Int <- 41; main(): Int { a + 1 }; };",
    );
    let cil = CoolToCil::new(&analysis.context).lower(&analysis.program);

    let init = cil
        .functions
        .iter()
        .find(|function| function.name == "__init_at_Main")
        .unwrap();
    let set_attrs = init
        .instructions
        .iter()
        .filter(|instruction| matches!(instruction, Instruction::SetAttr { .. }))
        .count();

    // one default plus one declared initializer
    assert_eq!(set_attrs, 2);
}

#[test]
fn cil_formatter_prints_all_three_sections() {
    let analysis = assert_analyzes(HELLO);
    let cil = CoolToCil::new(&analysis.context).lower(&analysis.program);
    let printed = cil.to_string();

    assert!(printed.contains(".TYPES"));
    assert!(printed.contains(".DATA"));
    assert!(printed.contains(".CODE"));
    assert!(printed.contains("function function_main_at_Main {"));
}

#[test]
fn mips_output_is_self_contained_with_the_runtime() {
    let analysis = assert_analyzes(HELLO);
    let cil = CoolToCil::new(&analysis.context).lower(&analysis.program);
    let assembly = format!("{}{}", MipsGenerator::new(&cil).generate(), RUNTIME);

    assert!(assembly.contains(".globl main"));
    assert!(assembly.contains("main:"));
    assert!(assembly.contains("function_main_at_Main:"));
    assert!(assembly.contains("_type_Main:"));
    assert!(assembly.contains("__strlen:"));
    assert!(assembly.contains("syscall"));
}

#[test]
fn dynamic_dispatch_goes_through_the_table_with_a_void_guard() {
    let analysis = assert_analyzes(
        "class A { f(): Int { 1 }; };
         class Main { a: A; main(): Int { a.f() }; };",
    );
    let cil = CoolToCil::new(&analysis.context).lower(&analysis.program);

    let main = cil
        .functions
        .iter()
        .find(|function| function.name == "function_main_at_Main")
        .unwrap();

    assert!(main
        .instructions
        .iter()
        .any(|instruction| matches!(instruction, Instruction::DynamicCall { ty, method, .. }
            if ty == "A" && method == "f")));
    assert!(main
        .instructions
        .iter()
        .any(|instruction| matches!(instruction, Instruction::Error { .. })));
}
