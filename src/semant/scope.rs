use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

/// A variable binding: name, type name, and the inference id of an
/// `AUTO_TYPE`-declared slot while inference is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableInfo {
    pub name: String,
    pub ty: String,
    pub idx: Option<usize>,
}

#[derive(Debug, Default)]
struct ScopeData {
    locals: Vec<VariableInfo>,
    parent: Option<Weak<RefCell<ScopeData>>>,
    children: Vec<Scope>,
    index: usize,
}

/// A node of the lexical scope tree.
///
/// `index` records how many locals the parent had when this child was
/// created: a parent lookup from the child only sees locals below that
/// bound, so variables the parent introduces later stay invisible. That is
/// what keeps `let x : Int <- x` from seeing its own binding while
/// `let x : Int <- 1 in let x : Int <- x + 1` sees the outer one.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    data: Rc<RefCell<ScopeData>>,
}

impl Scope {
    pub fn new() -> Scope {
        Scope::default()
    }

    pub fn create_child(&self) -> Scope {
        let child = Scope {
            data: Rc::new(RefCell::new(ScopeData {
                locals: vec![],
                parent: Some(Rc::downgrade(&self.data)),
                children: vec![],
                index: self.data.borrow().locals.len(),
            })),
        };

        self.data.borrow_mut().children.push(child.clone());
        child
    }

    pub fn define_variable(&self, name: &str, ty: &str, idx: Option<usize>) -> VariableInfo {
        let info = VariableInfo {
            name: name.to_owned(),
            ty: ty.to_owned(),
            idx,
        };

        self.data.borrow_mut().locals.push(info.clone());
        info
    }

    pub fn find_variable(&self, name: &str) -> Option<VariableInfo> {
        Self::find_bounded(&self.data, name, None)
    }

    fn find_bounded(
        data: &Rc<RefCell<ScopeData>>,
        name: &str,
        bound: Option<usize>,
    ) -> Option<VariableInfo> {
        let scope = data.borrow();
        let visible = bound.unwrap_or(scope.locals.len());

        if let Some(info) = scope
            .locals
            .iter()
            .take(visible)
            .find(|info| info.name == name)
        {
            return Some(info.clone());
        }

        let parent = scope.parent.as_ref()?.upgrade()?;
        let index = scope.index;
        drop(scope);

        Self::find_bounded(&parent, name, Some(index))
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.find_variable(name).is_some()
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.data
            .borrow()
            .locals
            .iter()
            .any(|info| info.name == name)
    }

    pub fn len(&self) -> usize {
        self.data.borrow().locals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn children(&self) -> Vec<Scope> {
        self.data.borrow().children.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_variable_walks_to_the_parent() {
        let root = Scope::new();
        root.define_variable("x", "Int", None);

        let child = root.create_child();
        child.define_variable("y", "Bool", None);

        assert_eq!(child.find_variable("y").unwrap().ty, "Bool");
        assert_eq!(child.find_variable("x").unwrap().ty, "Int");
        assert!(root.find_variable("y").is_none());
    }

    #[test]
    fn locals_added_after_child_creation_are_invisible() {
        let root = Scope::new();
        root.define_variable("x", "Int", None);

        let child = root.create_child();
        root.define_variable("y", "Bool", None);

        assert!(child.find_variable("x").is_some());
        assert!(child.find_variable("y").is_none());
    }

    #[test]
    fn chained_let_scopes_shadow_outer_bindings() {
        // let x : Int <- 1 in let x : String <- ... in x
        let root = Scope::new();
        let first = root.create_child();
        first.define_variable("x", "Int", None);
        let second = first.create_child();
        second.define_variable("x", "String", None);

        assert_eq!(second.find_variable("x").unwrap().ty, "String");
        assert_eq!(first.find_variable("x").unwrap().ty, "Int");
    }

    #[test]
    fn initializer_scope_does_not_see_its_own_binding() {
        // let x : Int <- x — the initializer is checked in the scope the
        // binding's child was created from.
        let root = Scope::new();
        let binding_scope = root.create_child();
        binding_scope.define_variable("x", "Int", None);

        assert!(root.find_variable("x").is_none());
        assert!(binding_scope.is_local("x"));
    }

    #[test]
    fn sibling_scopes_are_invisible_to_each_other() {
        let root = Scope::new();
        let left = root.create_child();
        left.define_variable("x", "Int", None);
        let right = root.create_child();

        assert!(right.find_variable("x").is_none());
    }
}
