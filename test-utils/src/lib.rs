//! Helpers shared by the integration tests: parse and analyze COOL sources
//! in-process and make assertions over the outcome.
use cool_lang::{
    ast::{Expression, Feature, MethodDecl, Program},
    parser,
    semant::{self, Analysis, Diagnostic, ErrorKind, TypeInfo},
};

/// Parse a source or panic with the parser's diagnostic.
pub fn parse(source: &str) -> Program<()> {
    parser::parse(source).unwrap_or_else(|error| panic!("parse failed: {error}"))
}

/// Run the full semantic pipeline over a source.
pub fn analyze(source: &str) -> Result<Analysis, Vec<Diagnostic>> {
    semant::analyze(&parse(source))
}

/// Expect a clean analysis.
pub fn assert_analyzes(source: &str) -> Analysis {
    match analyze(source) {
        Ok(analysis) => analysis,
        Err(diagnostics) => panic!(
            "expected clean analysis, got:\n{}",
            render(&diagnostics)
        ),
    }
}

/// Expect the analysis to fail with a diagnostic of `kind` whose message
/// contains `fragment`. Returns all diagnostics for further inspection.
pub fn assert_fails(source: &str, kind: ErrorKind, fragment: &str) -> Vec<Diagnostic> {
    match analyze(source) {
        Ok(_) => panic!("expected {kind} mentioning '{fragment}', but analysis succeeded"),
        Err(diagnostics) => {
            assert!(
                diagnostics
                    .iter()
                    .any(|diagnostic| diagnostic.kind == kind
                        && diagnostic.message.contains(fragment)),
                "no {kind} mentioning '{fragment}' in:\n{}",
                render(&diagnostics)
            );
            diagnostics
        }
    }
}

/// The typed declaration of `class.method` out of an analysis.
pub fn method<'a>(analysis: &'a Analysis, class: &str, method: &str) -> &'a MethodDecl<TypeInfo> {
    analysis
        .program
        .classes
        .iter()
        .find(|decl| decl.name.value == class)
        .unwrap_or_else(|| panic!("no class '{class}' in typed program"))
        .features
        .iter()
        .find_map(|feature| match feature {
            Feature::Method(decl) if decl.name.value == method => Some(decl),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no method '{method}' in class '{class}'"))
}

/// The typed body of `class.method`.
pub fn method_body<'a>(
    analysis: &'a Analysis,
    class: &str,
    name: &str,
) -> &'a Expression<TypeInfo> {
    &method(analysis, class, name).body
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
