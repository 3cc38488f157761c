use std::collections::HashSet;

use log::debug;

use crate::ast::{Feature, Position, Program};

use super::{
    checker::TypeChecker,
    context::Context,
    error::{Diagnostic, ErrorKind},
    types::{AUTO_TYPE, ERROR, OBJECT, SELF_TYPE},
};

/// The constraint store for `AUTO_TYPE` slots.
///
/// For the slot with id `i`, every name in `conforms_to[i]` is an upper
/// bound (the slot must conform to it) and every name in `conformed_by[i]`
/// is a lower bound (it must conform to the slot). Both sets only ever
/// grow, which is what makes the fixed-point iteration terminate.
#[derive(Debug, Default)]
pub struct InferencerManager {
    conforms_to: Vec<HashSet<String>>,
    conformed_by: Vec<HashSet<String>>,
    dirty: bool,
}

impl InferencerManager {
    /// Allocate a fresh slot, upper-bounded by `Object`.
    pub fn assign_id(&mut self) -> usize {
        let idx = self.conforms_to.len();
        self.conforms_to.push(HashSet::from([OBJECT.to_owned()]));
        self.conformed_by.push(HashSet::new());
        idx
    }

    pub fn count(&self) -> usize {
        self.conforms_to.len()
    }

    pub fn conforms_to(&self, idx: usize) -> &HashSet<String> {
        &self.conforms_to[idx]
    }

    pub fn conformed_by(&self, idx: usize) -> &HashSet<String> {
        &self.conformed_by[idx]
    }

    /// Names that never constrain anything: the bypass types conform both
    /// ways and `SELF_TYPE` is resolved before registration.
    fn is_bound(name: &str) -> bool {
        name != ERROR && name != AUTO_TYPE && name != SELF_TYPE
    }

    /// Record that slot `idx` must conform to `ty`. Returns whether the set
    /// grew.
    pub fn auto_to_type(&mut self, idx: usize, ty: &str) -> bool {
        if !Self::is_bound(ty) {
            return false;
        }
        let grown = self.conforms_to[idx].insert(ty.to_owned());
        self.dirty |= grown;
        grown
    }

    /// Record that `ty` must conform to slot `idx`. Returns whether the set
    /// grew.
    pub fn type_to_auto(&mut self, idx: usize, ty: &str) -> bool {
        if !Self::is_bound(ty) {
            return false;
        }
        let grown = self.conformed_by[idx].insert(ty.to_owned());
        self.dirty |= grown;
        grown
    }

    pub fn upd_conforms_to(&mut self, idx: usize, other: &HashSet<String>) -> bool {
        let before = self.conforms_to[idx].len();
        self.conforms_to[idx].extend(other.iter().cloned());
        let grown = self.conforms_to[idx].len() != before;
        self.dirty |= grown;
        grown
    }

    pub fn upd_conformed_by(&mut self, idx: usize, other: &HashSet<String>) -> bool {
        let before = self.conformed_by[idx].len();
        self.conformed_by[idx].extend(other.iter().cloned());
        let grown = self.conformed_by[idx].len() != before;
        self.dirty |= grown;
        grown
    }

    /// Record that slot `sub` must conform to slot `sup`: `sub` inherits
    /// `sup`'s upper bounds and `sup` inherits `sub`'s lower bounds.
    pub fn link(&mut self, sub: usize, sup: usize) {
        let uppers = self.conforms_to[sup].clone();
        self.upd_conforms_to(sub, &uppers);

        let lowers = self.conformed_by[sub].clone();
        self.upd_conformed_by(sup, &lowers);
    }

    /// Whether any set grew since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Fourth pass: iterate the checker to a fixed point of the constraint
/// store, then solve every slot and commit the solutions into the Context
/// signatures.
pub struct TypeInferencer<'a> {
    context: &'a mut Context,
    manager: &'a mut InferencerManager,
    pub errors: Vec<Diagnostic>,
}

impl<'a> TypeInferencer<'a> {
    pub fn new(context: &'a mut Context, manager: &'a mut InferencerManager) -> Self {
        Self {
            context,
            manager,
            errors: vec![],
        }
    }

    pub fn infer(&mut self, program: &Program<()>) {
        if self.manager.count() == 0 {
            return;
        }

        let mut rounds = 0;
        loop {
            self.manager.take_dirty();
            let checker = TypeChecker::new(self.context, self.manager);
            let _ = checker.check(program);
            rounds += 1;

            if !self.manager.take_dirty() {
                break;
            }
        }
        debug!(
            "inference reached a fixed point after {rounds} rounds over {} slots",
            self.manager.count()
        );

        let mut inferred: Vec<Option<String>> = vec![None; self.manager.count()];
        for idx in 0..self.manager.count() {
            inferred[idx] = self.solve(idx).ok();
        }

        self.report_failures(program, &inferred);
        self.commit(&inferred);
    }

    /// Solve one slot: the candidate is the most-derived member of the
    /// upper-bound set that conforms to every other member; a non-empty
    /// lower-bound set only validates the candidate (its join must conform
    /// to it), it never changes it.
    fn solve(&self, idx: usize) -> Result<String, String> {
        let uppers = self.manager.conforms_to(idx);
        let lowers = self.manager.conformed_by(idx);

        let mut candidates: Vec<&str> = uppers
            .iter()
            .filter(|ty| uppers.iter().all(|upper| self.context.conforms(ty, upper)))
            .map(String::as_str)
            .collect();
        candidates.sort_unstable();

        if candidates.is_empty() {
            let mut bounds: Vec<&str> = uppers.iter().map(String::as_str).collect();
            bounds.sort_unstable();
            return Err(format!(
                "no type satisfies the constraints {{{}}}",
                bounds.join(", ")
            ));
        }

        let deepest = candidates
            .iter()
            .map(|ty| self.context.depth(ty))
            .max()
            .unwrap();
        candidates.retain(|ty| self.context.depth(ty) == deepest);

        if candidates.len() > 1 {
            return Err(format!(
                "the constraints admit multiple incomparable types {{{}}}",
                candidates.join(", ")
            ));
        }

        let candidate = candidates[0];

        if !lowers.is_empty() {
            let lower_join = lowers
                .iter()
                .fold(ERROR.to_owned(), |join, ty| self.context.join(&join, ty));
            if !self.context.conforms(&lower_join, candidate) {
                return Err(format!(
                    "type '{lower_join}' required by usage does not conform to '{candidate}'"
                ));
            }
        }

        Ok(candidate.to_owned())
    }

    /// Attach a `TypeInferenceError` to the declaration site of every slot
    /// that could not be solved.
    fn report_failures(&mut self, program: &Program<()>, inferred: &[Option<String>]) {
        let mut sites: Vec<(usize, String, Position)> = vec![];

        for class in &program.classes {
            let Ok(class_ty) = self.context.get_type(&class.name.value) else {
                continue;
            };

            for feature in &class.features {
                match feature {
                    Feature::Attribute(attribute)
                        if attribute.type_annotation.value == AUTO_TYPE =>
                    {
                        if let Some(idx) = class_ty
                            .local_attribute(&attribute.name.value)
                            .and_then(|attr| attr.idx)
                        {
                            sites.push((
                                idx,
                                format!("attribute '{}'", attribute.name.value),
                                attribute.type_annotation.position,
                            ));
                        }
                    }
                    Feature::Method(method) => {
                        let Some(signature) = class_ty.local_method(&method.name.value) else {
                            continue;
                        };

                        for (formal, idx) in method.params.iter().zip(&signature.param_idx) {
                            if formal.type_annotation.value == AUTO_TYPE {
                                if let Some(idx) = idx {
                                    sites.push((
                                        *idx,
                                        format!("parameter '{}'", formal.name),
                                        formal.type_annotation.position,
                                    ));
                                }
                            }
                        }

                        if method.return_type.value == AUTO_TYPE {
                            if let Some(idx) = signature.ridx {
                                sites.push((
                                    idx,
                                    format!("the return value of method '{}'", method.name.value),
                                    method.return_type.position,
                                ));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        for (idx, what, position) in sites {
            if inferred[idx].is_none() {
                let reason = self.solve(idx).unwrap_err();
                self.errors.push(Diagnostic::new(
                    ErrorKind::TypeInference,
                    position,
                    format!("Cannot infer type of {what}: {reason}."),
                ));
            }
        }
    }

    /// Replace every `AUTO_TYPE` placeholder in the Context signatures with
    /// its solution and clear the inference ids. Unsolved slots degrade to
    /// `<error>`; their diagnostics abort the pipeline anyway.
    fn commit(&mut self, inferred: &[Option<String>]) {
        let committed = |idx: usize| {
            inferred[idx]
                .clone()
                .unwrap_or_else(|| ERROR.to_owned())
        };

        for ty in self.context.types_mut() {
            for attribute in ty.attributes_mut() {
                if let Some(idx) = attribute.idx.take() {
                    attribute.ty = committed(idx);
                }
            }

            for method in ty.methods_mut() {
                for (param_ty, idx) in method
                    .param_types
                    .iter_mut()
                    .zip(method.param_idx.iter_mut())
                {
                    if let Some(idx) = idx.take() {
                        *param_ty = committed(idx);
                    }
                }
                if let Some(idx) = method.ridx.take() {
                    method.return_type = committed(idx);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_id_seeds_object_upper_bound() {
        let mut manager = InferencerManager::default();
        let idx = manager.assign_id();

        assert_eq!(idx, 0);
        assert!(manager.conforms_to(idx).contains(OBJECT));
        assert!(manager.conformed_by(idx).is_empty());
    }

    #[test]
    fn updates_report_growth_exactly_once() {
        let mut manager = InferencerManager::default();
        let idx = manager.assign_id();

        assert!(manager.auto_to_type(idx, "Int"));
        assert!(!manager.auto_to_type(idx, "Int"));
        assert!(manager.type_to_auto(idx, "Bool"));
        assert!(!manager.type_to_auto(idx, "Bool"));
    }

    #[test]
    fn bypass_names_never_become_bounds() {
        let mut manager = InferencerManager::default();
        let idx = manager.assign_id();

        assert!(!manager.auto_to_type(idx, ERROR));
        assert!(!manager.auto_to_type(idx, AUTO_TYPE));
        assert!(!manager.type_to_auto(idx, SELF_TYPE));
        assert_eq!(manager.conforms_to(idx).len(), 1);
    }

    #[test]
    fn link_propagates_both_bound_sets() {
        let mut manager = InferencerManager::default();
        let sub = manager.assign_id();
        let sup = manager.assign_id();

        manager.auto_to_type(sup, "Int");
        manager.type_to_auto(sub, "Bool");
        manager.take_dirty();

        manager.link(sub, sup);

        assert!(manager.conforms_to(sub).contains("Int"));
        assert!(manager.conformed_by(sup).contains("Bool"));
        assert!(manager.take_dirty());
    }
}
