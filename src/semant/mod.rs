//! Semantic analysis for COOL.
//!
//! Four passes over the AST share a [`Context`] (the type registry), a tree
//! of [`Scope`]s and an [`InferencerManager`] (the `AUTO_TYPE` constraint
//! store):
//!
//! 1. [`TypeCollector`] registers every declared class name.
//! 2. [`TypeBuilder`] resolves parents and member signatures.
//! 3. [`TypeChecker`] enforces the typing rules and annotates the AST.
//! 4. [`TypeInferencer`] iterates the checker to a fixed point, solves the
//!    `AUTO_TYPE` slots and commits them, after which the checker runs once
//!    more with nothing left to infer.
//!
//! Passes accumulate positioned diagnostics instead of failing fast; the
//! first pass that ends up with a non-empty list aborts the pipeline.
mod builder;
mod builtins;
mod checker;
mod collector;
mod context;
mod error;
mod inferencer;
mod info;
mod scope;
mod types;

pub use self::builder::TypeBuilder;
pub use self::builtins::{install_builtins, BuiltinClass, BuiltinMethod, BUILTIN_CLASSES};
pub use self::checker::TypeChecker;
pub use self::collector::TypeCollector;
pub use self::context::Context;
pub use self::error::{Diagnostic, ErrorKind, SemanticError};
pub use self::inferencer::{InferencerManager, TypeInferencer};
pub use self::info::TypeInfo;
pub use self::scope::{Scope, VariableInfo};
pub use self::types::{
    Attribute, Method, Type, AUTO_TYPE, BOOL, ERROR, INT, IO, OBJECT, SELF_TYPE, STRING,
};

use log::debug;

use crate::ast::Program;

/// Everything the semantic phase hands to the lowering.
#[derive(Debug)]
pub struct Analysis {
    pub program: Program<TypeInfo>,
    pub context: Context,
    pub scope: Scope,
}

/// Run the full pass pipeline over a parsed program.
pub fn analyze(program: &Program<()>) -> Result<Analysis, Vec<Diagnostic>> {
    let mut collector = TypeCollector::new();
    collector.visit(program);
    if !collector.errors.is_empty() {
        return Err(collector.errors);
    }
    let mut context = collector.context;
    debug!("collected {} types", context.len());

    let mut manager = InferencerManager::default();
    {
        let mut builder = TypeBuilder::new(&mut context, &mut manager);
        builder.visit(program);
        if !builder.errors.is_empty() {
            return Err(builder.errors);
        }
    }

    {
        let checker = TypeChecker::new(&context, &mut manager);
        let (_, _, errors) = checker.check(program);
        if !errors.is_empty() {
            return Err(errors);
        }
    }

    {
        let mut inferencer = TypeInferencer::new(&mut context, &mut manager);
        inferencer.infer(program);
        if !inferencer.errors.is_empty() {
            return Err(inferencer.errors);
        }
    }

    // Second checker run: every signature is concrete now, so this can only
    // surface true static errors.
    let checker = TypeChecker::new(&context, &mut manager);
    let (typed, scope, errors) = checker.check(program);
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(Analysis {
        program: typed,
        context,
        scope,
    })
}
