use crate::ast::{AttributeDecl, ClassDecl, Feature, MethodDecl, Program};

use super::{
    context::Context,
    error::{Diagnostic, ErrorKind},
    inferencer::InferencerManager,
    types::{AUTO_TYPE, ERROR, OBJECT, SELF_TYPE},
};

/// Second pass: resolve parents, reject malformed hierarchies, and register
/// every attribute and method signature. `AUTO_TYPE` slots get their
/// inference ids here.
pub struct TypeBuilder<'a> {
    context: &'a mut Context,
    manager: &'a mut InferencerManager,
    pub errors: Vec<Diagnostic>,
}

impl<'a> TypeBuilder<'a> {
    pub fn new(context: &'a mut Context, manager: &'a mut InferencerManager) -> Self {
        Self {
            context,
            manager,
            errors: vec![],
        }
    }

    pub fn visit(&mut self, program: &Program<()>) {
        for class in &program.classes {
            self.resolve_parent(class);
        }

        self.detect_cycles(program);

        for class in &program.classes {
            for feature in &class.features {
                match feature {
                    Feature::Attribute(attribute) => {
                        self.build_attribute(&class.name.value, attribute)
                    }
                    Feature::Method(method) => self.build_method(&class.name.value, method),
                }
            }
        }
    }

    fn error(&mut self, kind: ErrorKind, position: (usize, usize), message: String) {
        self.errors.push(Diagnostic::new(kind, position, message));
    }

    fn resolve_parent(&mut self, class: &ClassDecl<()>) {
        let name = &class.name.value;
        let parent = class
            .parent
            .as_ref()
            .map(|parent| parent.value.as_str())
            .unwrap_or(OBJECT);
        let position = class
            .parent
            .as_ref()
            .map(|parent| parent.position)
            .unwrap_or(class.position);

        if parent == SELF_TYPE || parent == AUTO_TYPE {
            self.error(
                ErrorKind::Semantic,
                position,
                format!("Class {name} cannot inherit from '{parent}'."),
            );
            return;
        }

        match self.context.get_type(parent) {
            Err(_) => self.error(
                ErrorKind::Semantic,
                position,
                format!("Class {name} inherits from undefined class {parent}."),
            ),
            Ok(parent_ty) if !parent_ty.can_be_inherited() => self.error(
                ErrorKind::Semantic,
                position,
                format!("Class {name} cannot inherit from '{parent}'."),
            ),
            Ok(_) => {
                let result = self
                    .context
                    .get_type_mut(name)
                    .and_then(|ty| ty.set_parent(parent));
                if let Err(error) = result {
                    self.error(ErrorKind::Semantic, class.position, error.to_string());
                }
            }
        }
    }

    /// Trace each class's parent chain; a chain that comes back around to
    /// its start is a cycle, reported once per member.
    fn detect_cycles(&mut self, program: &Program<()>) {
        let mut cycles = vec![];

        for class in &program.classes {
            let name = &class.name.value;

            let mut current = self
                .context
                .get_type(name)
                .ok()
                .and_then(|ty| ty.parent().map(str::to_owned));
            let mut steps = 0;

            while let Some(ancestor) = current {
                if &ancestor == name {
                    cycles.push((name.clone(), class.name.position));
                    break;
                }
                steps += 1;
                if steps > self.context.len() {
                    break;
                }
                current = self
                    .context
                    .get_type(&ancestor)
                    .ok()
                    .and_then(|ty| ty.parent().map(str::to_owned));
            }
        }

        for (name, position) in cycles {
            self.error(
                ErrorKind::Semantic,
                position,
                format!("Class {name} participates in an inheritance cycle."),
            );
        }
    }

    /// Resolve a declared type name, `SELF_TYPE` included or not depending
    /// on the position; unknown names degrade to `<error>`.
    fn declared_type(
        &mut self,
        declared: &str,
        position: (usize, usize),
        self_type_allowed: bool,
        what: impl FnOnce() -> String,
    ) -> String {
        if declared == SELF_TYPE && !self_type_allowed {
            self.error(
                ErrorKind::Type,
                position,
                format!("SELF_TYPE cannot be the type of {}.", what()),
            );
            return ERROR.to_owned();
        }

        if self.context.get_type(declared).is_err() {
            self.error(
                ErrorKind::Type,
                position,
                format!("Type '{declared}' of {} is not defined.", what()),
            );
            return ERROR.to_owned();
        }

        declared.to_owned()
    }

    fn build_attribute(&mut self, class_name: &str, attribute: &AttributeDecl<()>) {
        let name = &attribute.name.value;

        if name == "self" {
            self.error(
                ErrorKind::Semantic,
                attribute.name.position,
                "'self' cannot be the name of an attribute.".to_owned(),
            );
            return;
        }

        let ty = self.declared_type(
            &attribute.type_annotation.value,
            attribute.type_annotation.position,
            true,
            || format!("attribute '{name}'"),
        );

        let Ok(class_ty) = self.context.get_type(class_name) else {
            return;
        };
        if class_ty.get_attribute(name, self.context).is_ok() {
            self.error(
                ErrorKind::Semantic,
                attribute.name.position,
                format!("Attribute '{name}' is already defined in {class_name} or an ancestor."),
            );
            return;
        }

        let idx = (ty == AUTO_TYPE).then(|| self.manager.assign_id());

        if let Err(error) = self
            .context
            .get_type_mut(class_name)
            .and_then(|class_ty| class_ty.define_attribute(name, &ty, idx).map(|_| ()))
        {
            self.error(ErrorKind::Semantic, attribute.position, error.to_string());
        }
    }

    fn build_method(&mut self, class_name: &str, method: &MethodDecl<()>) {
        let name = &method.name.value;

        let mut param_names: Vec<String> = vec![];
        let mut param_types = vec![];
        let mut param_idx = vec![];

        for formal in &method.params {
            if formal.name == "self" {
                self.error(
                    ErrorKind::Semantic,
                    formal.position,
                    "'self' cannot be the name of a formal parameter.".to_owned(),
                );
            }
            if param_names.contains(&formal.name) {
                self.error(
                    ErrorKind::Semantic,
                    formal.position,
                    format!(
                        "Formal parameter '{}' is multiply defined in method '{name}'.",
                        formal.name
                    ),
                );
            }

            let ty = self.declared_type(
                &formal.type_annotation.value,
                formal.type_annotation.position,
                false,
                || format!("formal parameter '{}'", formal.name),
            );

            param_idx.push((ty == AUTO_TYPE).then(|| self.manager.assign_id()));
            param_names.push(formal.name.clone());
            param_types.push(ty);
        }

        let return_type = self.declared_type(
            &method.return_type.value,
            method.return_type.position,
            true,
            || format!("the return value of method '{name}'"),
        );
        let ridx = (return_type == AUTO_TYPE).then(|| self.manager.assign_id());

        let Ok(class_ty) = self.context.get_type(class_name) else {
            return;
        };

        if class_ty.local_method(name).is_some() {
            self.error(
                ErrorKind::Semantic,
                method.name.position,
                format!("Method '{name}' is already defined in {class_name}."),
            );
            return;
        }

        if let Ok(inherited) = class_ty.get_method(name, self.context) {
            let same = inherited.param_types == param_types
                && inherited.return_type == return_type;
            if !same {
                self.error(
                    ErrorKind::Semantic,
                    method.name.position,
                    format!(
                        "Method '{name}' is already defined in an ancestor of {class_name} \
                         with a different signature."
                    ),
                );
                return;
            }
        }

        if let Err(error) = self.context.get_type_mut(class_name).and_then(|class_ty| {
            class_ty
                .define_method(name, param_names, param_types, &return_type, param_idx, ridx)
                .map(|_| ())
        }) {
            self.error(ErrorKind::Semantic, method.position, error.to_string());
        }
    }
}
