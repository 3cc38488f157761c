use indexmap::IndexMap;

use super::{
    error::SemanticError,
    types::{Type, ERROR, OBJECT},
};

/// The type registry: an arena of types keyed by name, iterated in
/// insertion order (built-ins first, then declaration order) so diagnostics
/// and emitted code are deterministic.
#[derive(Debug, Clone, Default)]
pub struct Context {
    types: IndexMap<String, Type>,
}

impl Context {
    /// Create a fresh user-defined type.
    pub fn create_type(&mut self, name: &str) -> Result<&mut Type, SemanticError> {
        if self.types.contains_key(name) {
            return Err(SemanticError::new(format!(
                "Type with the same name ({name}) already in context."
            )));
        }

        Ok(self
            .types
            .entry(name.to_owned())
            .or_insert(Type::with_flags(name, true, false)))
    }

    pub(crate) fn install(&mut self, ty: Type) {
        self.types.insert(ty.name().to_owned(), ty);
    }

    pub fn get_type(&self, name: &str) -> Result<&Type, SemanticError> {
        self.types
            .get(name)
            .ok_or_else(|| SemanticError::new(format!("Type \"{name}\" is not defined.")))
    }

    pub fn get_type_mut(&mut self, name: &str) -> Result<&mut Type, SemanticError> {
        self.types
            .get_mut(name)
            .ok_or_else(|| SemanticError::new(format!("Type \"{name}\" is not defined.")))
    }

    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.types.values()
    }

    pub(crate) fn types_mut(&mut self) -> impl Iterator<Item = &mut Type> {
        self.types.values_mut()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The chain `[name, parent, ..., root]`. Lookups through this are
    /// bounded by the arena size, so a cyclic graph mid-construction cannot
    /// hang them.
    pub fn ancestors(&self, name: &str) -> Vec<&Type> {
        let mut chain = vec![];
        let mut current = self.types.get(name);

        while let Some(ty) = current {
            chain.push(ty);
            if chain.len() > self.types.len() {
                break;
            }
            current = ty.parent().and_then(|parent| self.types.get(parent));
        }

        chain
    }

    /// Number of proper ancestors between `name` and the root.
    pub fn depth(&self, name: &str) -> usize {
        self.ancestors(name).len().saturating_sub(1)
    }

    /// Conformance: reflexive-transitive closure of the parent relation,
    /// with the bypass types conforming both ways.
    pub fn conforms(&self, lhs: &str, rhs: &str) -> bool {
        if let Ok(ty) = self.get_type(lhs) {
            if ty.bypass() {
                return true;
            }
        }
        if let Ok(ty) = self.get_type(rhs) {
            if ty.bypass() {
                return true;
            }
        }

        self.ancestors(lhs).iter().any(|ty| ty.name() == rhs)
    }

    /// Least upper bound: the deepest common ancestor. Joining with a bypass
    /// type (or an unknown name) yields the other operand.
    pub fn join(&self, lhs: &str, rhs: &str) -> String {
        let lhs_bypass = self.get_type(lhs).map(|ty| ty.bypass()).unwrap_or(true);
        let rhs_bypass = self.get_type(rhs).map(|ty| ty.bypass()).unwrap_or(true);

        if lhs_bypass {
            return rhs.to_owned();
        }
        if rhs_bypass || lhs == rhs {
            return lhs.to_owned();
        }

        let lhs_chain: Vec<&str> = self.ancestors(lhs).iter().map(|ty| ty.name()).collect();

        for ancestor in self.ancestors(rhs) {
            if lhs_chain.contains(&ancestor.name()) {
                return ancestor.name().to_owned();
            }
        }

        OBJECT.to_owned()
    }

    /// Whether `name` names one of the pseudo-types that never exist at
    /// runtime.
    pub fn is_pseudo(name: &str) -> bool {
        matches!(name, super::types::SELF_TYPE | super::types::AUTO_TYPE | ERROR)
    }

    /// The concrete classes: everything except the pseudo-types.
    pub fn classes(&self) -> impl Iterator<Item = &Type> {
        self.types
            .values()
            .filter(|ty| !Self::is_pseudo(ty.name()))
    }
}

#[cfg(test)]
mod tests {
    use crate::semant::builtins::install_builtins;
    use crate::semant::types::{AUTO_TYPE, BOOL, INT, IO, OBJECT, STRING};

    use super::*;

    fn context_with(classes: &[(&str, &str)]) -> Context {
        let mut context = Context::default();
        install_builtins(&mut context);

        for (name, _) in classes {
            context.create_type(name).unwrap();
        }
        for (name, parent) in classes {
            context.get_type_mut(name).unwrap().set_parent(parent).unwrap();
        }

        context
    }

    #[test]
    fn conformance_is_reflexive() {
        let context = context_with(&[("A", OBJECT), ("B", "A")]);

        for name in [OBJECT, IO, INT, STRING, BOOL, "A", "B"] {
            assert!(context.conforms(name, name));
        }
    }

    #[test]
    fn conformance_is_transitive() {
        let context = context_with(&[("A", OBJECT), ("B", "A"), ("C", "B")]);

        assert!(context.conforms("C", "B"));
        assert!(context.conforms("B", "A"));
        assert!(context.conforms("C", "A"));
        assert!(context.conforms("C", OBJECT));
        assert!(!context.conforms("A", "C"));
    }

    #[test]
    fn bypass_conforms_both_ways() {
        let context = context_with(&[("A", OBJECT)]);

        assert!(context.conforms(ERROR, "A"));
        assert!(context.conforms("A", ERROR));
        assert!(context.conforms(AUTO_TYPE, INT));
        assert!(context.conforms(INT, AUTO_TYPE));
    }

    #[test]
    fn join_is_deepest_common_ancestor() {
        let context = context_with(&[("A", OBJECT), ("B", "A"), ("C", "A"), ("D", "B")]);

        assert_eq!(context.join("B", "C"), "A");
        assert_eq!(context.join("D", "C"), "A");
        assert_eq!(context.join("D", "B"), "B");
        assert_eq!(context.join("A", INT), OBJECT);
    }

    #[test]
    fn join_with_error_yields_other_operand() {
        let context = context_with(&[("A", OBJECT)]);

        assert_eq!(context.join(ERROR, "A"), "A");
        assert_eq!(context.join("A", ERROR), "A");
    }

    #[test]
    fn duplicate_type_is_rejected() {
        let mut context = context_with(&[("A", OBJECT)]);

        assert!(context.create_type("A").is_err());
        assert!(context.create_type(INT).is_err());
    }
}
