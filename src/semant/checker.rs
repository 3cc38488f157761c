use std::collections::HashSet;

use crate::ast::{
    Assign, AttributeDecl, BinaryExpr, BinaryOp, Block, Boolean, Case, CaseBranch, ClassDecl,
    Dispatch, Expression, Feature, Ident, If, Integer, Let, LetBinding, MethodDecl, New, Position,
    Program, Str, UnaryExpr, UnaryOp, While,
};

use super::{
    context::Context,
    error::{Diagnostic, ErrorKind},
    inferencer::InferencerManager,
    info::TypeInfo,
    scope::Scope,
    types::{AUTO_TYPE, BOOL, ERROR, INT, OBJECT, SELF_TYPE, STRING},
};

/// Third pass: build the scope tree, enforce COOL's typing rules, and
/// annotate every expression with its computed type.
///
/// Errors accumulate; a failing expression is typed `<error>`, which
/// conforms both ways, so one mistake does not cascade. Wherever an
/// `AUTO_TYPE` slot meets a concrete expectation the checker feeds the
/// InferencerManager instead of failing.
pub struct TypeChecker<'a> {
    context: &'a Context,
    manager: &'a mut InferencerManager,
    current_type: String,
    errors: Vec<Diagnostic>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(context: &'a Context, manager: &'a mut InferencerManager) -> Self {
        Self {
            context,
            manager,
            current_type: OBJECT.to_owned(),
            errors: vec![],
        }
    }

    pub fn check(mut self, program: &Program<()>) -> (Program<TypeInfo>, Scope, Vec<Diagnostic>) {
        let scope = Scope::new();

        let classes = program
            .classes
            .iter()
            .map(|class| self.check_class(class, &scope))
            .collect();

        self.check_main();

        (Program { classes }, scope, self.errors)
    }

    fn error(&mut self, kind: ErrorKind, position: Position, message: String) {
        self.errors.push(Diagnostic::new(kind, position, message));
    }

    /// `SELF_TYPE` read as a value of the class currently being checked.
    fn resolve(&self, name: &str) -> String {
        if name == SELF_TYPE {
            self.current_type.clone()
        } else {
            name.to_owned()
        }
    }

    /// Conformance as the checker sees it: an expected `SELF_TYPE` is only
    /// met by `SELF_TYPE` itself; an actual `SELF_TYPE` means the current
    /// class everywhere else.
    fn conforms(&self, sub: &str, sup: &str) -> bool {
        if sup == SELF_TYPE {
            return sub == SELF_TYPE || sub == ERROR || sub == AUTO_TYPE;
        }
        self.context.conforms(&self.resolve(sub), sup)
    }

    fn join(&self, lhs: &str, rhs: &str) -> String {
        if lhs == SELF_TYPE && rhs == SELF_TYPE {
            return SELF_TYPE.to_owned();
        }
        self.context.join(&self.resolve(lhs), &self.resolve(rhs))
    }

    /// The one place all "value flows into a typed slot" checks go through.
    /// Auto-typed sides register constraints instead of erroring.
    fn expect_conforms(
        &mut self,
        actual: &TypeInfo,
        expected: &str,
        expected_idx: Option<usize>,
        position: Position,
        message: impl FnOnce() -> String,
    ) {
        match (actual.idx, expected_idx) {
            (Some(sub), Some(sup)) => self.manager.link(sub, sup),
            (Some(sub), None) => {
                self.manager.auto_to_type(sub, &self.resolve(expected));
            }
            (None, Some(sup)) => {
                self.manager
                    .type_to_auto(sup, &self.resolve(&actual.computed_type));
            }
            (None, None) => {
                if !self.conforms(&actual.computed_type, expected) {
                    self.error(ErrorKind::Type, position, message());
                }
            }
        }
    }

    /// Require a concrete built-in operand type (`Int`, `Bool`). An
    /// auto-typed operand picks the requirement up as an upper bound.
    fn require(
        &mut self,
        actual: &TypeInfo,
        expected: &str,
        position: Position,
        message: impl FnOnce() -> String,
    ) -> bool {
        if let Some(idx) = actual.idx {
            self.manager.auto_to_type(idx, expected);
            return true;
        }
        if self.conforms(&actual.computed_type, expected) {
            return true;
        }
        self.error(ErrorKind::Type, position, message());
        false
    }

    fn check_main(&mut self) {
        let Ok(main_class) = self.context.get_type("Main") else {
            self.error(
                ErrorKind::Semantic,
                (0, 0),
                "Class Main is not defined.".to_owned(),
            );
            return;
        };

        match main_class.get_method("main", self.context) {
            Ok(main) if !main.param_names.is_empty() => self.error(
                ErrorKind::Semantic,
                (0, 0),
                "Method 'main' of class Main must not take arguments.".to_owned(),
            ),
            Ok(_) => {}
            Err(_) => self.error(
                ErrorKind::Semantic,
                (0, 0),
                "Method 'main' is not defined in class Main.".to_owned(),
            ),
        }
    }

    fn check_class(&mut self, class: &ClassDecl<()>, scope: &Scope) -> ClassDecl<TypeInfo> {
        self.current_type = class.name.value.clone();

        let class_scope = scope.create_child();
        class_scope.define_variable("self", SELF_TYPE, None);

        if let Ok(class_ty) = self.context.get_type(&class.name.value) {
            for (attribute, _) in class_ty.all_attributes(self.context) {
                class_scope.define_variable(&attribute.name, &attribute.ty, attribute.idx);
            }
        }

        let features = class
            .features
            .iter()
            .map(|feature| match feature {
                Feature::Attribute(attribute) => {
                    Feature::Attribute(self.check_attribute(attribute, &class_scope))
                }
                Feature::Method(method) => Feature::Method(self.check_method(method, &class_scope)),
            })
            .collect();

        ClassDecl {
            name: class.name.clone(),
            parent: class.parent.clone(),
            features,
            position: class.position,
        }
    }

    fn check_attribute(
        &mut self,
        attribute: &AttributeDecl<()>,
        scope: &Scope,
    ) -> AttributeDecl<TypeInfo> {
        // The builder-registered slot, so committed inference results are
        // what the second run sees.
        let (declared, idx) = self
            .context
            .get_type(&self.current_type)
            .ok()
            .and_then(|ty| ty.local_attribute(&attribute.name.value))
            .map(|attr| (attr.ty.clone(), attr.idx))
            .unwrap_or_else(|| (ERROR.to_owned(), None));

        let init = attribute.init.as_ref().map(|init| {
            let typed = self.check_expression(init, scope);
            let info = typed.info();
            self.expect_conforms(&info, &declared, idx, init.position(), || {
                format!(
                    "Inferred type '{}' of the initializer of attribute '{}' does not conform \
                     to declared type '{declared}'.",
                    info.computed_type, attribute.name.value
                )
            });
            typed
        });

        AttributeDecl {
            name: Ident {
                value: attribute.name.value.clone(),
                position: attribute.name.position,
                info: TypeInfo::with_idx(declared, idx),
            },
            type_annotation: attribute.type_annotation.clone(),
            init,
            position: attribute.position,
        }
    }

    fn check_method(&mut self, method: &MethodDecl<()>, class_scope: &Scope) -> MethodDecl<TypeInfo> {
        let scope = class_scope.create_child();

        let signature = self
            .context
            .get_type(&self.current_type)
            .ok()
            .and_then(|ty| ty.local_method(&method.name.value))
            .cloned();

        match &signature {
            Some(signature) => {
                for ((formal, ty), idx) in method
                    .params
                    .iter()
                    .zip(&signature.param_types)
                    .zip(&signature.param_idx)
                {
                    scope.define_variable(&formal.name, ty, *idx);
                }
            }
            // The builder dropped the signature; fall back to the declared
            // annotations so the body still gets checked.
            None => {
                for formal in &method.params {
                    scope.define_variable(&formal.name, &formal.type_annotation.value, None);
                }
            }
        }

        let body = self.check_expression(&method.body, &scope);

        let (return_type, ridx) = signature
            .map(|signature| (signature.return_type, signature.ridx))
            .unwrap_or_else(|| (method.return_type.value.clone(), None));

        let info = body.info();
        self.expect_conforms(&info, &return_type, ridx, method.body.position(), || {
            format!(
                "Inferred return type '{}' of method '{}' does not conform to declared return \
                 type '{return_type}'.",
                info.computed_type, method.name.value
            )
        });

        MethodDecl {
            name: Ident {
                value: method.name.value.clone(),
                position: method.name.position,
                info: TypeInfo::new(return_type),
            },
            params: method.params.clone(),
            return_type: method.return_type.clone(),
            body,
            position: method.position,
        }
    }

    fn check_expression(&mut self, expression: &Expression<()>, scope: &Scope) -> Expression<TypeInfo> {
        match expression {
            Expression::Integer(Integer {
                value, position, ..
            }) => Expression::Integer(Integer {
                value: *value,
                position: *position,
                info: TypeInfo::new(INT),
            }),
            Expression::Str(Str {
                value, position, ..
            }) => Expression::Str(Str {
                value: value.clone(),
                position: *position,
                info: TypeInfo::new(STRING),
            }),
            Expression::Boolean(Boolean {
                value, position, ..
            }) => Expression::Boolean(Boolean {
                value: *value,
                position: *position,
                info: TypeInfo::new(BOOL),
            }),
            Expression::Ident(ident) => Expression::Ident(self.check_ident(ident, scope)),
            Expression::Assign(assign) => Expression::Assign(self.check_assign(assign, scope)),
            Expression::Binary(binary) => Expression::Binary(self.check_binary(binary, scope)),
            Expression::Unary(unary) => Expression::Unary(self.check_unary(unary, scope)),
            Expression::If(if_expr) => Expression::If(self.check_if(if_expr, scope)),
            Expression::While(while_expr) => {
                Expression::While(self.check_while(while_expr, scope))
            }
            Expression::Block(block) => Expression::Block(self.check_block(block, scope)),
            Expression::Let(let_expr) => Expression::Let(self.check_let(let_expr, scope)),
            Expression::Case(case) => Expression::Case(self.check_case(case, scope)),
            Expression::New(new) => Expression::New(self.check_new(new)),
            Expression::Dispatch(dispatch) => {
                Expression::Dispatch(self.check_dispatch(dispatch, scope))
            }
        }
    }

    fn check_ident(&mut self, ident: &Ident<()>, scope: &Scope) -> Ident<TypeInfo> {
        let info = if ident.value == "self" {
            TypeInfo::new(SELF_TYPE)
        } else {
            match scope.find_variable(&ident.value) {
                Some(variable) => TypeInfo::with_idx(variable.ty, variable.idx),
                None => {
                    self.error(
                        ErrorKind::Name,
                        ident.position,
                        format!(
                            "Variable '{}' is not defined in '{}'.",
                            ident.value, self.current_type
                        ),
                    );
                    TypeInfo::new(ERROR)
                }
            }
        };

        Ident {
            value: ident.value.clone(),
            position: ident.position,
            info,
        }
    }

    fn check_assign(&mut self, assign: &Assign<()>, scope: &Scope) -> Assign<TypeInfo> {
        let value = self.check_expression(&assign.value, scope);
        let value_info = value.info();

        let target_info = if assign.target.value == "self" {
            self.error(
                ErrorKind::Semantic,
                assign.target.position,
                "Cannot assign to 'self'.".to_owned(),
            );
            TypeInfo::new(ERROR)
        } else {
            match scope.find_variable(&assign.target.value) {
                Some(variable) => {
                    self.expect_conforms(
                        &value_info,
                        &variable.ty,
                        variable.idx,
                        assign.position,
                        || {
                            format!(
                                "Inferred type '{}' of assigned expression does not conform to \
                                 declared type '{}' of variable '{}'.",
                                value_info.computed_type, variable.ty, assign.target.value
                            )
                        },
                    );
                    TypeInfo::with_idx(variable.ty, variable.idx)
                }
                None => {
                    self.error(
                        ErrorKind::Name,
                        assign.target.position,
                        format!(
                            "Variable '{}' is not defined in '{}'.",
                            assign.target.value, self.current_type
                        ),
                    );
                    TypeInfo::new(ERROR)
                }
            }
        };

        Assign {
            target: Ident {
                value: assign.target.value.clone(),
                position: assign.target.position,
                info: target_info,
            },
            info: value_info,
            value: Box::new(value),
            position: assign.position,
        }
    }

    fn check_binary(&mut self, binary: &BinaryExpr<()>, scope: &Scope) -> BinaryExpr<TypeInfo> {
        let lhs = self.check_expression(&binary.lhs, scope);
        let rhs = self.check_expression(&binary.rhs, scope);
        let lhs_info = lhs.info();
        let rhs_info = rhs.info();

        let info = if binary.op.is_arithmetic() || matches!(binary.op, BinaryOp::Less | BinaryOp::LessEqual)
        {
            let result = if binary.op.is_arithmetic() { INT } else { BOOL };
            let message = |side: &TypeInfo| {
                let op = binary.op;
                let found = side.computed_type.clone();
                move || {
                    format!("Operation '{op}' expects operands of type 'Int', found '{found}'.")
                }
            };

            let lhs_ok = self.require(&lhs_info, INT, binary.lhs.position(), message(&lhs_info));
            let rhs_ok = self.require(&rhs_info, INT, binary.rhs.position(), message(&rhs_info));

            if lhs_ok && rhs_ok {
                TypeInfo::new(result)
            } else {
                TypeInfo::new(ERROR)
            }
        } else {
            self.check_equality(&lhs_info, &rhs_info, binary.position)
        };

        BinaryExpr {
            op: binary.op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            position: binary.position,
            info,
        }
    }

    /// `=` is unrestricted on non-basic types; if either side is `Int`,
    /// `String` or `Bool`, both sides must be that same basic type.
    fn check_equality(&mut self, lhs: &TypeInfo, rhs: &TypeInfo, position: Position) -> TypeInfo {
        let basic = [INT, STRING, BOOL];
        let lhs_ty = self.resolve(&lhs.computed_type);
        let rhs_ty = self.resolve(&rhs.computed_type);

        let lhs_basic = basic.contains(&lhs_ty.as_str());
        let rhs_basic = basic.contains(&rhs_ty.as_str());

        if lhs_basic || rhs_basic {
            match (lhs.idx, rhs.idx) {
                (Some(idx), None) => {
                    self.manager.auto_to_type(idx, &rhs_ty);
                }
                (None, Some(idx)) => {
                    self.manager.auto_to_type(idx, &lhs_ty);
                }
                _ => {
                    let comparable = lhs_ty == rhs_ty
                        || lhs_ty == ERROR
                        || rhs_ty == ERROR
                        || lhs_ty == AUTO_TYPE
                        || rhs_ty == AUTO_TYPE;
                    if !comparable {
                        self.error(
                            ErrorKind::Type,
                            position,
                            format!(
                                "Illegal comparison between '{lhs_ty}' and '{rhs_ty}': a basic \
                                 type can only be compared with itself."
                            ),
                        );
                        return TypeInfo::new(ERROR);
                    }
                }
            }
        }

        TypeInfo::new(BOOL)
    }

    fn check_unary(&mut self, unary: &UnaryExpr<()>, scope: &Scope) -> UnaryExpr<TypeInfo> {
        let operand = self.check_expression(&unary.operand, scope);
        let operand_info = operand.info();

        let info = match unary.op {
            UnaryOp::IsVoid => TypeInfo::new(BOOL),
            UnaryOp::Not => {
                let found = operand_info.computed_type.clone();
                if self.require(&operand_info, BOOL, unary.operand.position(), || {
                    format!("Operation 'not' expects an operand of type 'Bool', found '{found}'.")
                }) {
                    TypeInfo::new(BOOL)
                } else {
                    TypeInfo::new(ERROR)
                }
            }
            UnaryOp::Complement => {
                let found = operand_info.computed_type.clone();
                if self.require(&operand_info, INT, unary.operand.position(), || {
                    format!("Operation '~' expects an operand of type 'Int', found '{found}'.")
                }) {
                    TypeInfo::new(INT)
                } else {
                    TypeInfo::new(ERROR)
                }
            }
        };

        UnaryExpr {
            op: unary.op,
            operand: Box::new(operand),
            position: unary.position,
            info,
        }
    }

    fn check_if(&mut self, if_expr: &If<()>, scope: &Scope) -> If<TypeInfo> {
        let condition = self.check_expression(&if_expr.condition, scope);
        let condition_info = condition.info();
        let found = condition_info.computed_type.clone();
        self.require(&condition_info, BOOL, if_expr.condition.position(), || {
            format!("Condition of 'if' must be of type 'Bool', found '{found}'.")
        });

        let then_branch = self.check_expression(&if_expr.then_branch, scope);
        let else_branch = self.check_expression(&if_expr.else_branch, scope);

        let info = TypeInfo::new(self.join(
            &then_branch.info().computed_type,
            &else_branch.info().computed_type,
        ));

        If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            position: if_expr.position,
            info,
        }
    }

    fn check_while(&mut self, while_expr: &While<()>, scope: &Scope) -> While<TypeInfo> {
        let condition = self.check_expression(&while_expr.condition, scope);
        let condition_info = condition.info();
        let found = condition_info.computed_type.clone();
        self.require(&condition_info, BOOL, while_expr.condition.position(), || {
            format!("Condition of 'while' must be of type 'Bool', found '{found}'.")
        });

        let body = self.check_expression(&while_expr.body, scope);

        While {
            condition: Box::new(condition),
            body: Box::new(body),
            position: while_expr.position,
            info: TypeInfo::new(OBJECT),
        }
    }

    fn check_block(&mut self, block: &Block<()>, scope: &Scope) -> Block<TypeInfo> {
        let block_scope = scope.create_child();

        let expressions: Vec<_> = block
            .expressions
            .iter()
            .map(|expression| self.check_expression(expression, &block_scope))
            .collect();

        let info = expressions
            .last()
            .map(|last| last.info())
            .unwrap_or_else(|| TypeInfo::new(ERROR));

        Block {
            expressions,
            position: block.position,
            info,
        }
    }

    fn check_let(&mut self, let_expr: &Let<()>, scope: &Scope) -> Let<TypeInfo> {
        let mut current = scope.clone();
        let mut bindings = vec![];

        for binding in &let_expr.bindings {
            bindings.push(self.check_let_binding(binding, &mut current));
        }

        let body = self.check_expression(&let_expr.body, &current);
        let info = body.info();

        Let {
            bindings,
            body: Box::new(body),
            position: let_expr.position,
            info,
        }
    }

    /// Check one binding and chain a fresh child scope holding it; the
    /// initializer runs in the scope *before* the child, so a binding never
    /// sees itself.
    fn check_let_binding(
        &mut self,
        binding: &LetBinding<()>,
        scope: &mut Scope,
    ) -> LetBinding<TypeInfo> {
        let declared_name = &binding.type_annotation.value;

        if binding.name.value == "self" {
            self.error(
                ErrorKind::Semantic,
                binding.name.position,
                "'self' cannot be bound in a 'let' expression.".to_owned(),
            );
        }

        let mut declared = if self.context.get_type(declared_name).is_err() {
            self.error(
                ErrorKind::Type,
                binding.type_annotation.position,
                format!(
                    "Type '{declared_name}' of let-bound variable '{}' is not defined.",
                    binding.name.value
                ),
            );
            ERROR.to_owned()
        } else {
            declared_name.clone()
        };
        let mut idx = None;

        let init = binding.init.as_ref().map(|init| self.check_expression(init, scope));

        if declared == AUTO_TYPE {
            // A let slot has no builder-assigned id; it takes the
            // initializer's static type.
            match &init {
                Some(typed) => {
                    let info = typed.info();
                    declared = info.computed_type;
                    idx = info.idx;
                }
                None => {
                    self.error(
                        ErrorKind::TypeInference,
                        binding.position,
                        format!(
                            "Cannot infer type of let-bound variable '{}' without an initializer.",
                            binding.name.value
                        ),
                    );
                    declared = ERROR.to_owned();
                }
            }
        } else if let Some(typed) = &init {
            let info = typed.info();
            self.expect_conforms(&info, &declared, None, binding.position, || {
                format!(
                    "Inferred type '{}' of the initializer of '{}' does not conform to declared \
                     type '{declared}'.",
                    info.computed_type, binding.name.value
                )
            });
        }

        *scope = scope.create_child();
        scope.define_variable(&binding.name.value, &declared, idx);

        LetBinding {
            name: Ident {
                value: binding.name.value.clone(),
                position: binding.name.position,
                info: TypeInfo::with_idx(declared, idx),
            },
            type_annotation: binding.type_annotation.clone(),
            init,
            position: binding.position,
        }
    }

    fn check_case(&mut self, case: &Case<()>, scope: &Scope) -> Case<TypeInfo> {
        let scrutinee = self.check_expression(&case.scrutinee, scope);

        let mut seen: HashSet<String> = HashSet::new();
        let mut result: Option<String> = None;
        let mut branches = vec![];

        for branch in &case.branches {
            let branch_ty = self.check_case_branch_type(branch, &mut seen);

            let branch_scope = scope.create_child();
            branch_scope.define_variable(&branch.name.value, &branch_ty, None);

            let body = self.check_expression(&branch.body, &branch_scope);
            let body_ty = body.info().computed_type;

            result = Some(match result {
                None => body_ty,
                Some(previous) => self.join(&previous, &body_ty),
            });

            branches.push(CaseBranch {
                name: Ident {
                    value: branch.name.value.clone(),
                    position: branch.name.position,
                    info: TypeInfo::new(branch_ty),
                },
                type_annotation: branch.type_annotation.clone(),
                body,
                position: branch.position,
            });
        }

        Case {
            scrutinee: Box::new(scrutinee),
            branches,
            position: case.position,
            info: TypeInfo::new(result.unwrap_or_else(|| ERROR.to_owned())),
        }
    }

    /// A branch type must name a real declared class and be distinct from
    /// every other branch of the same case.
    fn check_case_branch_type(&mut self, branch: &CaseBranch<()>, seen: &mut HashSet<String>) -> String {
        let declared = &branch.type_annotation.value;

        if declared == SELF_TYPE || declared == AUTO_TYPE {
            self.error(
                ErrorKind::Type,
                branch.type_annotation.position,
                format!("'{declared}' cannot be the type of a case branch."),
            );
            return ERROR.to_owned();
        }

        if self.context.get_type(declared).is_err() {
            self.error(
                ErrorKind::Type,
                branch.type_annotation.position,
                format!("Type '{declared}' of case branch is not defined."),
            );
            return ERROR.to_owned();
        }

        if !seen.insert(declared.clone()) {
            self.error(
                ErrorKind::Semantic,
                branch.type_annotation.position,
                format!("Duplicate branch type '{declared}' in case expression."),
            );
        }

        declared.clone()
    }

    fn check_new(&mut self, new: &New<()>) -> New<TypeInfo> {
        let name = &new.type_name.value;

        let info = if name == AUTO_TYPE {
            self.error(
                ErrorKind::Type,
                new.type_name.position,
                "Cannot instantiate 'AUTO_TYPE'.".to_owned(),
            );
            TypeInfo::new(ERROR)
        } else if self.context.get_type(name).is_err() {
            self.error(
                ErrorKind::Type,
                new.type_name.position,
                format!("Cannot instantiate undefined type '{name}'."),
            );
            TypeInfo::new(ERROR)
        } else {
            TypeInfo::new(name.clone())
        };

        New {
            type_name: new.type_name.clone(),
            position: new.position,
            info,
        }
    }

    fn check_dispatch(&mut self, dispatch: &Dispatch<()>, scope: &Scope) -> Dispatch<TypeInfo> {
        let receiver = dispatch
            .receiver
            .as_ref()
            .map(|receiver| Box::new(self.check_expression(receiver, scope)));
        let receiver_ty = receiver
            .as_ref()
            .map(|receiver| receiver.info().computed_type)
            .unwrap_or_else(|| SELF_TYPE.to_owned());

        let lookup_ty = match &dispatch.static_parent {
            Some(parent) => {
                if parent.value == SELF_TYPE || parent.value == AUTO_TYPE {
                    self.error(
                        ErrorKind::Type,
                        parent.position,
                        format!("Static dispatch cannot be through '{}'.", parent.value),
                    );
                    ERROR.to_owned()
                } else if self.context.get_type(&parent.value).is_err() {
                    self.error(
                        ErrorKind::Type,
                        parent.position,
                        format!("Static dispatch through undefined type '{}'.", parent.value),
                    );
                    ERROR.to_owned()
                } else {
                    if !self.conforms(&receiver_ty, &parent.value) {
                        self.error(
                            ErrorKind::Type,
                            dispatch.position,
                            format!(
                                "Expression of type '{receiver_ty}' does not conform to declared \
                                 static dispatch type '{}'.",
                                parent.value
                            ),
                        );
                    }
                    parent.value.clone()
                }
            }
            None => self.resolve(&receiver_ty),
        };

        let method = self
            .context
            .get_type(&lookup_ty)
            .ok()
            .filter(|ty| !ty.bypass())
            .map(|ty| ty.get_method(&dispatch.method, self.context).cloned());

        let info;
        let mut args = vec![];

        match method {
            // Receiver already poisoned (or auto); type the arguments and
            // keep quiet.
            None => {
                for arg in &dispatch.args {
                    args.push(self.check_expression(arg, scope));
                }
                info = if lookup_ty == AUTO_TYPE {
                    TypeInfo::new(AUTO_TYPE)
                } else {
                    TypeInfo::new(ERROR)
                };
            }
            Some(Err(_)) => {
                self.error(
                    ErrorKind::Attribute,
                    dispatch.position,
                    format!(
                        "Method '{}' is not defined in '{lookup_ty}'.",
                        dispatch.method
                    ),
                );
                for arg in &dispatch.args {
                    args.push(self.check_expression(arg, scope));
                }
                info = TypeInfo::new(ERROR);
            }
            Some(Ok(method)) => {
                if method.param_types.len() != dispatch.args.len() {
                    self.error(
                        ErrorKind::Semantic,
                        dispatch.position,
                        format!(
                            "Method '{}' of '{lookup_ty}' expects {} argument(s), got {}.",
                            dispatch.method,
                            method.param_types.len(),
                            dispatch.args.len()
                        ),
                    );
                }

                for (position, arg) in dispatch.args.iter().enumerate() {
                    let typed = self.check_expression(arg, scope);

                    if let (Some(param_ty), Some(param_idx)) = (
                        method.param_types.get(position),
                        method.param_idx.get(position),
                    ) {
                        let arg_info = typed.info();
                        self.expect_conforms(
                            &arg_info,
                            param_ty,
                            *param_idx,
                            arg.position(),
                            || {
                                format!(
                                    "Inferred type '{}' of argument '{}' of method '{}' does not \
                                     conform to declared type '{param_ty}'.",
                                    arg_info.computed_type,
                                    method.param_names[position],
                                    dispatch.method
                                )
                            },
                        );
                    }

                    args.push(typed);
                }

                info = if method.return_type == SELF_TYPE {
                    // SELF_TYPE returns are covariant: the result is the
                    // receiver's static type.
                    TypeInfo::new(receiver_ty.clone())
                } else {
                    TypeInfo::with_idx(method.return_type.clone(), method.ridx)
                };
            }
        }

        Dispatch {
            receiver,
            static_parent: dispatch.static_parent.clone(),
            method: dispatch.method.clone(),
            args,
            position: dispatch.position,
            info,
        }
    }
}
