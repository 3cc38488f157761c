use super::{context::Context, error::SemanticError};

pub const OBJECT: &str = "Object";
pub const IO: &str = "IO";
pub const INT: &str = "Int";
pub const STRING: &str = "String";
pub const BOOL: &str = "Bool";
pub const SELF_TYPE: &str = "SELF_TYPE";
pub const AUTO_TYPE: &str = "AUTO_TYPE";
pub const ERROR: &str = "<error>";

/// An attribute slot of a type. `idx` is the inference id of an
/// `AUTO_TYPE`-declared attribute while inference is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub ty: String,
    pub idx: Option<usize>,
}

/// A method signature. `param_idx`/`ridx` are the inference ids of
/// `AUTO_TYPE`-declared parameter and return slots while inference is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub param_names: Vec<String>,
    pub param_types: Vec<String>,
    pub return_type: String,
    pub param_idx: Vec<Option<usize>>,
    pub ridx: Option<usize>,
}

impl Method {
    /// Signature identity for the override rule: same arity, same parameter
    /// types, same return type. A literal `SELF_TYPE` return compares equal
    /// across the hierarchy, which is exactly its covariant reading.
    pub fn same_signature(&self, other: &Method) -> bool {
        self.name == other.name
            && self.param_types == other.param_types
            && self.return_type == other.return_type
    }
}

/// A named type in the Context arena. `parent` is a name, never a direct
/// reference, so the graph tolerates cycles during construction.
#[derive(Debug, Clone)]
pub struct Type {
    name: String,
    parent: Option<String>,
    attributes: Vec<Attribute>,
    methods: Vec<Method>,
    inheritable: bool,
    bypass: bool,
}

impl Type {
    pub(crate) fn with_flags(name: &str, inheritable: bool, bypass: bool) -> Type {
        Type {
            name: name.to_owned(),
            parent: None,
            attributes: vec![],
            methods: vec![],
            inheritable,
            bypass,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Whether this type conforms to and is conformed to by everything.
    pub fn bypass(&self) -> bool {
        self.bypass
    }

    pub fn can_be_inherited(&self) -> bool {
        self.inheritable
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Set the parent; a parent can only ever be set once.
    pub fn set_parent(&mut self, parent: &str) -> Result<(), SemanticError> {
        if self.parent.is_some() {
            return Err(SemanticError::new(format!(
                "Parent type is already set for {}.",
                self.name
            )));
        }
        self.parent = Some(parent.to_owned());
        Ok(())
    }

    pub fn local_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn local_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// Look up an attribute along the parent chain.
    pub fn get_attribute<'ctx>(
        &'ctx self,
        name: &str,
        context: &'ctx Context,
    ) -> Result<&'ctx Attribute, SemanticError> {
        for ty in context.ancestors(&self.name) {
            if let Some(attribute) = ty.local_attribute(name) {
                return Ok(attribute);
            }
        }

        Err(SemanticError::new(format!(
            "Attribute \"{name}\" is not defined in {}.",
            self.name
        )))
    }

    /// Look up a method along the parent chain.
    pub fn get_method<'ctx>(
        &'ctx self,
        name: &str,
        context: &'ctx Context,
    ) -> Result<&'ctx Method, SemanticError> {
        for ty in context.ancestors(&self.name) {
            if let Some(method) = ty.local_method(name) {
                return Ok(method);
            }
        }

        Err(SemanticError::new(format!(
            "Method \"{name}\" is not defined in {}.",
            self.name
        )))
    }

    /// Define an attribute on this type. Inherited duplicates are the
    /// caller's concern (they need the full Context).
    pub fn define_attribute(
        &mut self,
        name: &str,
        ty: &str,
        idx: Option<usize>,
    ) -> Result<&Attribute, SemanticError> {
        if self.local_attribute(name).is_some() {
            return Err(SemanticError::new(format!(
                "Attribute \"{name}\" is already defined in {}.",
                self.name
            )));
        }

        self.attributes.push(Attribute {
            name: name.to_owned(),
            ty: ty.to_owned(),
            idx,
        });
        Ok(self.attributes.last().unwrap())
    }

    pub fn define_method(
        &mut self,
        name: &str,
        param_names: Vec<String>,
        param_types: Vec<String>,
        return_type: &str,
        param_idx: Vec<Option<usize>>,
        ridx: Option<usize>,
    ) -> Result<&Method, SemanticError> {
        if self.local_method(name).is_some() {
            return Err(SemanticError::new(format!(
                "Method \"{name}\" already defined in {}.",
                self.name
            )));
        }

        self.methods.push(Method {
            name: name.to_owned(),
            param_names,
            param_types,
            return_type: return_type.to_owned(),
            param_idx,
            ridx,
        });
        Ok(self.methods.last().unwrap())
    }

    /// All attributes of this type, root-most ancestor first. A redeclaring
    /// child would keep the ancestor's slot; the builder rejects that case,
    /// so in practice this is plain concatenation in inheritance order.
    pub fn all_attributes<'ctx>(&self, context: &'ctx Context) -> Vec<(&'ctx Attribute, &'ctx str)> {
        let mut linearized: Vec<(&Attribute, &str)> = vec![];

        for ty in context.ancestors(&self.name).into_iter().rev() {
            for attribute in ty.attributes() {
                match linearized
                    .iter_mut()
                    .find(|(known, _)| known.name == attribute.name)
                {
                    Some(slot) => *slot = (attribute, ty.name()),
                    None => linearized.push((attribute, ty.name())),
                }
            }
        }

        linearized
    }

    /// All methods of this type, root-most ancestor first. An overriding
    /// child replaces the ancestor's entry in place, so method order (and
    /// with it the dispatch-table slot) is stable across the hierarchy.
    pub fn all_methods<'ctx>(&self, context: &'ctx Context) -> Vec<(&'ctx Method, &'ctx str)> {
        let mut linearized: Vec<(&Method, &str)> = vec![];

        for ty in context.ancestors(&self.name).into_iter().rev() {
            for method in ty.methods() {
                match linearized
                    .iter_mut()
                    .find(|(known, _)| known.name == method.name)
                {
                    Some(slot) => *slot = (method, ty.name()),
                    None => linearized.push((method, ty.name())),
                }
            }
        }

        linearized
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut [Attribute] {
        &mut self.attributes
    }

    pub(crate) fn methods_mut(&mut self) -> &mut [Method] {
        &mut self.methods
    }
}

impl PartialEq for Type {
    /// Types are interned by name; the bypass types compare equal to
    /// everything, which is what makes error recovery cascade-free.
    fn eq(&self, other: &Self) -> bool {
        self.bypass || other.bypass || self.name == other.name
    }
}
