use crate::ast::Program;

use super::{
    builtins::install_builtins,
    context::Context,
    error::{Diagnostic, ErrorKind},
};

/// First pass: install the built-ins and register every declared class name.
/// Parents, attributes and methods are untouched here.
pub struct TypeCollector {
    pub context: Context,
    pub errors: Vec<Diagnostic>,
}

impl TypeCollector {
    pub fn new() -> Self {
        let mut context = Context::default();
        install_builtins(&mut context);

        Self {
            context,
            errors: vec![],
        }
    }

    pub fn visit(&mut self, program: &Program<()>) {
        for class in &program.classes {
            if let Err(error) = self.context.create_type(&class.name.value) {
                self.errors.push(Diagnostic::new(
                    ErrorKind::Semantic,
                    class.name.position,
                    error.to_string(),
                ));
            }
        }
    }
}

impl Default for TypeCollector {
    fn default() -> Self {
        Self::new()
    }
}
