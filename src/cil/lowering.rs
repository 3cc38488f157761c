use std::collections::HashMap;

use indexmap::IndexMap;
use log::debug;

use crate::ast::{
    Assign, AttributeDecl, BinaryExpr, BinaryOp, Block, Case, ClassDecl, Dispatch, Expression,
    Feature, If, Let, MethodDecl, New, UnaryExpr, UnaryOp, While,
};
use crate::semant::{Context, TypeInfo, BOOL, INT, IO, OBJECT, SELF_TYPE, STRING};

use super::{Data, Function, Instruction, Program, TypeDecl, Value};

const ABORT_MESSAGE: &str = "Abort called from class ";
const NEWLINE: &str = "\n";
const CASE_VOID: &str = "Runtime error: case on void\n";
const CASE_MISMATCH: &str = "Runtime error: no branch of case matched\n";
const DISPATCH_VOID: &str = "Runtime error: dispatch on void\n";

/// Lowers a type-checked program into CIL.
///
/// Every class gets a type record (attribute layout plus dispatch table), an
/// `__init_at_*` function chaining to the parent's, and one function per
/// method; the built-in methods get bodies over the IR primitives. The
/// entry function allocates `Main` and dispatches `main` on it.
pub struct CoolToCil<'a> {
    context: &'a Context,
    types: Vec<TypeDecl>,
    data: IndexMap<String, String>,
    functions: Vec<Function>,
    current_class: String,
    params: Vec<String>,
    locals: Vec<String>,
    instructions: Vec<Instruction>,
    scopes: Vec<HashMap<String, String>>,
    label_count: usize,
    local_count: usize,
}

impl<'a> CoolToCil<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self {
            context,
            types: vec![],
            data: IndexMap::new(),
            functions: vec![],
            current_class: OBJECT.to_owned(),
            params: vec![],
            locals: vec![],
            instructions: vec![],
            scopes: vec![],
            label_count: 0,
            local_count: 0,
        }
    }

    pub fn lower(mut self, program: &crate::ast::Program<TypeInfo>) -> Program {
        self.collect_types();
        self.emit_builtin_bodies();

        for class in &program.classes {
            self.emit_init(class);
        }
        for builtin in self.context.classes().filter(|ty| Self::is_builtin(ty.name())) {
            let name = builtin.name().to_owned();
            self.begin_function(vec!["self".to_owned()]);
            self.current_class = name.clone();
            self.instructions.push(Instruction::Return(Value::Void));
            self.finish_function(&Self::init_label(&name));
        }

        for class in &program.classes {
            self.current_class = class.name.value.clone();
            for feature in &class.features {
                if let Feature::Method(method) = feature {
                    self.emit_method(&class.name.value, method);
                }
            }
        }

        self.emit_entry();

        debug!(
            "lowered {} classes into {} functions",
            self.types.len(),
            self.functions.len()
        );

        Program {
            types: self.types,
            data: self
                .data
                .into_iter()
                .map(|(value, name)| Data { name, value })
                .collect(),
            functions: self.functions,
        }
    }

    fn is_builtin(name: &str) -> bool {
        matches!(name, OBJECT | IO | INT | STRING | BOOL)
    }

    fn is_value_class(name: &str) -> bool {
        matches!(name, INT | STRING | BOOL)
    }

    fn init_label(class: &str) -> String {
        format!("__init_at_{class}")
    }

    /// The function implementing `method` when dispatched on `class`.
    /// `Object`'s methods get per-value-class specializations because the
    /// basic values are unboxed.
    fn method_label(method: &str, owner: &str, class: &str) -> String {
        if Self::is_value_class(class) && owner == OBJECT {
            format!("function_{method}_at_{class}")
        } else {
            format!("function_{method}_at_{owner}")
        }
    }

    fn collect_types(&mut self) {
        for ty in self.context.classes() {
            let attributes = ty
                .all_attributes(self.context)
                .into_iter()
                .map(|(attribute, _)| attribute.name.clone())
                .collect();
            let methods = ty
                .all_methods(self.context)
                .into_iter()
                .map(|(method, owner)| {
                    (
                        method.name.clone(),
                        Self::method_label(&method.name, owner, ty.name()),
                    )
                })
                .collect();

            self.types.push(TypeDecl {
                name: ty.name().to_owned(),
                attributes,
                init: Self::init_label(ty.name()),
                methods,
            });
        }
    }

    // --- function assembly helpers ---

    fn begin_function(&mut self, params: Vec<String>) {
        let base: HashMap<String, String> = params
            .iter()
            .map(|param| (param.clone(), param.clone()))
            .collect();

        self.params = params;
        self.locals = vec![];
        self.instructions = vec![];
        self.scopes = vec![base];
        self.local_count = 0;
    }

    fn finish_function(&mut self, name: &str) {
        self.functions.push(Function {
            name: name.to_owned(),
            params: std::mem::take(&mut self.params),
            locals: std::mem::take(&mut self.locals),
            instructions: std::mem::take(&mut self.instructions),
        });
    }

    fn local(&mut self) -> String {
        let name = format!("local_{}", self.local_count);
        self.local_count += 1;
        self.locals.push(name.clone());
        name
    }

    fn fresh_label(&mut self, hint: &str) -> String {
        let label = format!("{hint}_{}", self.label_count);
        self.label_count += 1;
        label
    }

    fn string_data(&mut self, value: &str) -> String {
        let next = format!("data_{}", self.data.len());
        self.data
            .entry(value.to_owned())
            .or_insert(next)
            .clone()
    }

    fn lookup_variable(&self, name: &str) -> Option<String> {
        self.scopes
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).cloned())
    }

    /// Force a value into a named local so instructions taking an object
    /// operand can refer to it.
    fn materialize(&mut self, value: Value) -> String {
        match value {
            Value::Var(name) => name,
            other => {
                let dest = self.local();
                self.instructions.push(Instruction::Assign {
                    dest: dest.clone(),
                    source: other,
                });
                dest
            }
        }
    }

    /// The uninitialized value of a declared type.
    fn default_value(&mut self, ty: &str) -> Value {
        match ty {
            INT | BOOL => Value::Int(0),
            STRING => {
                let data = self.string_data("");
                let dest = self.local();
                self.instructions.push(Instruction::Load {
                    dest: dest.clone(),
                    data,
                });
                Value::var(dest)
            }
            _ => Value::Void,
        }
    }

    fn static_type(&self, info: &TypeInfo) -> String {
        if info.computed_type == SELF_TYPE {
            self.current_class.clone()
        } else if self.context.get_type(&info.computed_type).is_err() {
            OBJECT.to_owned()
        } else {
            info.computed_type.clone()
        }
    }

    fn runtime_error(&mut self, message: &str) -> Instruction {
        let data = self.string_data(message);
        Instruction::Error { data }
    }

    // --- functions ---

    fn emit_init(&mut self, class: &ClassDecl<TypeInfo>) {
        let name = class.name.value.clone();
        self.begin_function(vec!["self".to_owned()]);
        self.current_class = name.clone();

        if let Some(parent) = self
            .context
            .get_type(&name)
            .ok()
            .and_then(|ty| ty.parent().map(str::to_owned))
        {
            self.instructions.push(Instruction::Arg(Value::var("self")));
            let dest = self.local();
            self.instructions.push(Instruction::StaticCall {
                function: Self::init_label(&parent),
                dest,
            });
        }

        // Defaults for every own attribute, then the declared initializers
        // in declaration order.
        if let Ok(ty) = self.context.get_type(&name) {
            for attribute in ty.attributes().to_vec() {
                let value = self.default_value(&attribute.ty);
                self.instructions.push(Instruction::SetAttr {
                    obj: "self".to_owned(),
                    attr: attribute.name.clone(),
                    value,
                    ty: name.clone(),
                });
            }
        }

        for feature in &class.features {
            let Feature::Attribute(AttributeDecl {
                name: attr_name,
                init: Some(init),
                ..
            }) = feature
            else {
                continue;
            };

            let value = self.lower_expression(init);
            self.instructions.push(Instruction::SetAttr {
                obj: "self".to_owned(),
                attr: attr_name.value.clone(),
                value,
                ty: name.clone(),
            });
        }

        self.instructions.push(Instruction::Return(Value::Void));
        self.finish_function(&Self::init_label(&name));
    }

    fn emit_method(&mut self, class: &str, method: &MethodDecl<TypeInfo>) {
        let mut params = vec!["self".to_owned()];
        params.extend(method.params.iter().map(|formal| formal.name.clone()));

        self.begin_function(params);
        let value = self.lower_expression(&method.body);
        self.instructions.push(Instruction::Return(value));
        self.finish_function(&format!("function_{}_at_{class}", method.name.value));
    }

    fn emit_entry(&mut self) {
        self.begin_function(vec![]);
        self.current_class = "Main".to_owned();

        let main = self.local();
        self.instructions.push(Instruction::Allocate {
            dest: main.clone(),
            ty: "Main".to_owned(),
        });
        self.instructions.push(Instruction::Arg(Value::var(main.as_str())));
        let dest = self.local();
        self.instructions.push(Instruction::StaticCall {
            function: Self::init_label("Main"),
            dest,
        });

        self.instructions.push(Instruction::Arg(Value::var(main.as_str())));
        let result = self.local();
        self.instructions.push(Instruction::DynamicCall {
            ty: "Main".to_owned(),
            method: "main".to_owned(),
            dest: result,
        });

        self.instructions.push(Instruction::Exit);
        self.finish_function("main");
    }

    /// Bodies for the built-in methods, including the per-value-class
    /// specializations of `Object`'s methods.
    fn emit_builtin_bodies(&mut self) {
        // Object
        self.begin_function(vec!["self".to_owned()]);
        let msg = self.string_data(ABORT_MESSAGE);
        let dest = self.local();
        self.instructions.push(Instruction::Load {
            dest: dest.clone(),
            data: msg,
        });
        self.instructions.push(Instruction::PrintStr {
            value: Value::var(dest),
        });
        let name = self.local();
        self.instructions.push(Instruction::TypeName {
            dest: name.clone(),
            obj: "self".to_owned(),
        });
        self.instructions.push(Instruction::PrintStr {
            value: Value::var(name),
        });
        let error = self.runtime_error(NEWLINE);
        self.instructions.push(error);
        self.finish_function("function_abort_at_Object");

        self.begin_function(vec!["self".to_owned()]);
        let name = self.local();
        self.instructions.push(Instruction::TypeName {
            dest: name.clone(),
            obj: "self".to_owned(),
        });
        self.instructions.push(Instruction::Return(Value::var(name)));
        self.finish_function("function_type_name_at_Object");

        self.begin_function(vec!["self".to_owned()]);
        let copy = self.local();
        self.instructions.push(Instruction::Copy {
            dest: copy.clone(),
            obj: "self".to_owned(),
        });
        self.instructions.push(Instruction::Return(Value::var(copy)));
        self.finish_function("function_copy_at_Object");

        // IO
        self.begin_function(vec!["self".to_owned(), "x".to_owned()]);
        self.instructions.push(Instruction::PrintStr {
            value: Value::var("x"),
        });
        self.instructions
            .push(Instruction::Return(Value::var("self")));
        self.finish_function("function_out_string_at_IO");

        self.begin_function(vec!["self".to_owned(), "x".to_owned()]);
        self.instructions.push(Instruction::PrintInt {
            value: Value::var("x"),
        });
        self.instructions
            .push(Instruction::Return(Value::var("self")));
        self.finish_function("function_out_int_at_IO");

        self.begin_function(vec!["self".to_owned()]);
        let input = self.local();
        self.instructions.push(Instruction::ReadStr {
            dest: input.clone(),
        });
        self.instructions.push(Instruction::Return(Value::var(input)));
        self.finish_function("function_in_string_at_IO");

        self.begin_function(vec!["self".to_owned()]);
        let input = self.local();
        self.instructions.push(Instruction::ReadInt {
            dest: input.clone(),
        });
        self.instructions.push(Instruction::Return(Value::var(input)));
        self.finish_function("function_in_int_at_IO");

        // String
        self.begin_function(vec!["self".to_owned()]);
        let length = self.local();
        self.instructions.push(Instruction::Length {
            dest: length.clone(),
            source: "self".to_owned(),
        });
        self.instructions
            .push(Instruction::Return(Value::var(length)));
        self.finish_function("function_length_at_String");

        self.begin_function(vec!["self".to_owned(), "s".to_owned()]);
        let concat = self.local();
        self.instructions.push(Instruction::Concat {
            dest: concat.clone(),
            prefix: "self".to_owned(),
            suffix: "s".to_owned(),
        });
        self.instructions
            .push(Instruction::Return(Value::var(concat)));
        self.finish_function("function_concat_at_String");

        self.begin_function(vec!["self".to_owned(), "i".to_owned(), "l".to_owned()]);
        let substr = self.local();
        self.instructions.push(Instruction::Substring {
            dest: substr.clone(),
            source: "self".to_owned(),
            index: Value::var("i"),
            length: Value::var("l"),
        });
        self.instructions
            .push(Instruction::Return(Value::var(substr)));
        self.finish_function("function_substr_at_String");

        // Object's methods on the unboxed basic values.
        for class in [INT, STRING, BOOL] {
            self.begin_function(vec!["self".to_owned()]);
            let msg = self.string_data(ABORT_MESSAGE);
            let dest = self.local();
            self.instructions.push(Instruction::Load {
                dest: dest.clone(),
                data: msg,
            });
            self.instructions.push(Instruction::PrintStr {
                value: Value::var(dest),
            });
            let class_name = self.string_data(class);
            let name = self.local();
            self.instructions.push(Instruction::Load {
                dest: name.clone(),
                data: class_name,
            });
            self.instructions.push(Instruction::PrintStr {
                value: Value::var(name),
            });
            let error = self.runtime_error(NEWLINE);
            self.instructions.push(error);
            self.finish_function(&format!("function_abort_at_{class}"));

            self.begin_function(vec!["self".to_owned()]);
            let class_name = self.string_data(class);
            let name = self.local();
            self.instructions.push(Instruction::Load {
                dest: name.clone(),
                data: class_name,
            });
            self.instructions.push(Instruction::Return(Value::var(name)));
            self.finish_function(&format!("function_type_name_at_{class}"));

            self.begin_function(vec!["self".to_owned()]);
            self.instructions
                .push(Instruction::Return(Value::var("self")));
            self.finish_function(&format!("function_copy_at_{class}"));
        }
    }

    // --- expressions ---

    fn lower_expression(&mut self, expression: &Expression<TypeInfo>) -> Value {
        match expression {
            Expression::Integer(integer) => Value::Int(integer.value),
            Expression::Boolean(boolean) => Value::Int(boolean.value as i64),
            Expression::Str(string) => {
                let data = self.string_data(&string.value);
                let dest = self.local();
                self.instructions.push(Instruction::Load {
                    dest: dest.clone(),
                    data,
                });
                Value::var(dest)
            }
            Expression::Ident(ident) => self.lower_ident(&ident.value),
            Expression::Assign(assign) => self.lower_assign(assign),
            Expression::Binary(binary) => self.lower_binary(binary),
            Expression::Unary(unary) => self.lower_unary(unary),
            Expression::If(if_expr) => self.lower_if(if_expr),
            Expression::While(while_expr) => self.lower_while(while_expr),
            Expression::Block(block) => self.lower_block(block),
            Expression::Let(let_expr) => self.lower_let(let_expr),
            Expression::Case(case) => self.lower_case(case),
            Expression::New(new) => self.lower_new(new),
            Expression::Dispatch(dispatch) => self.lower_dispatch(dispatch),
        }
    }

    fn lower_ident(&mut self, name: &str) -> Value {
        if let Some(local) = self.lookup_variable(name) {
            return Value::var(local);
        }

        let dest = self.local();
        self.instructions.push(Instruction::GetAttr {
            dest: dest.clone(),
            obj: "self".to_owned(),
            attr: name.to_owned(),
            ty: self.current_class.clone(),
        });
        Value::var(dest)
    }

    fn lower_assign(&mut self, assign: &Assign<TypeInfo>) -> Value {
        let value = self.lower_expression(&assign.value);

        match self.lookup_variable(&assign.target.value) {
            Some(local) => self.instructions.push(Instruction::Assign {
                dest: local,
                source: value.clone(),
            }),
            None => self.instructions.push(Instruction::SetAttr {
                obj: "self".to_owned(),
                attr: assign.target.value.clone(),
                value: value.clone(),
                ty: self.current_class.clone(),
            }),
        }

        value
    }

    fn lower_binary(&mut self, binary: &BinaryExpr<TypeInfo>) -> Value {
        let left = self.lower_expression(&binary.lhs);
        let right = self.lower_expression(&binary.rhs);
        let dest = self.local();

        let instruction = match binary.op {
            BinaryOp::Plus => Instruction::Plus {
                dest: dest.clone(),
                left,
                right,
            },
            BinaryOp::Minus => Instruction::Minus {
                dest: dest.clone(),
                left,
                right,
            },
            BinaryOp::Times => Instruction::Star {
                dest: dest.clone(),
                left,
                right,
            },
            BinaryOp::Divide => Instruction::Div {
                dest: dest.clone(),
                left,
                right,
            },
            BinaryOp::Less => Instruction::Less {
                dest: dest.clone(),
                left,
                right,
            },
            BinaryOp::LessEqual => Instruction::Leq {
                dest: dest.clone(),
                left,
                right,
            },
            BinaryOp::Equal => {
                let string_eq = self.static_type(&binary.lhs.info()) == STRING
                    || self.static_type(&binary.rhs.info()) == STRING;
                if string_eq {
                    Instruction::EqualStr {
                        dest: dest.clone(),
                        left,
                        right,
                    }
                } else {
                    Instruction::Equal {
                        dest: dest.clone(),
                        left,
                        right,
                    }
                }
            }
        };

        self.instructions.push(instruction);
        Value::var(dest)
    }

    fn lower_unary(&mut self, unary: &UnaryExpr<TypeInfo>) -> Value {
        let operand = self.lower_expression(&unary.operand);
        let dest = self.local();

        let instruction = match unary.op {
            UnaryOp::Not => Instruction::Equal {
                dest: dest.clone(),
                left: operand,
                right: Value::Int(0),
            },
            UnaryOp::IsVoid => Instruction::Equal {
                dest: dest.clone(),
                left: operand,
                right: Value::Void,
            },
            UnaryOp::Complement => Instruction::Complement {
                dest: dest.clone(),
                operand,
            },
        };

        self.instructions.push(instruction);
        Value::var(dest)
    }

    fn lower_if(&mut self, if_expr: &If<TypeInfo>) -> Value {
        let result = self.local();
        let then_label = self.fresh_label("then");
        let else_label = self.fresh_label("else");
        let end_label = self.fresh_label("endif");

        let condition = self.lower_expression(&if_expr.condition);
        self.instructions.push(Instruction::GotoIf {
            condition,
            label: then_label.clone(),
        });
        self.instructions.push(Instruction::Goto(else_label.clone()));

        self.instructions.push(Instruction::Label(then_label));
        let then_value = self.lower_expression(&if_expr.then_branch);
        self.instructions.push(Instruction::Assign {
            dest: result.clone(),
            source: then_value,
        });
        self.instructions.push(Instruction::Goto(end_label.clone()));

        self.instructions.push(Instruction::Label(else_label));
        let else_value = self.lower_expression(&if_expr.else_branch);
        self.instructions.push(Instruction::Assign {
            dest: result.clone(),
            source: else_value,
        });

        self.instructions.push(Instruction::Label(end_label));
        Value::var(result)
    }

    fn lower_while(&mut self, while_expr: &While<TypeInfo>) -> Value {
        let start_label = self.fresh_label("while");
        let body_label = self.fresh_label("loop");
        let end_label = self.fresh_label("pool");

        self.instructions.push(Instruction::Label(start_label.clone()));
        let condition = self.lower_expression(&while_expr.condition);
        self.instructions.push(Instruction::GotoIf {
            condition,
            label: body_label.clone(),
        });
        self.instructions.push(Instruction::Goto(end_label.clone()));

        self.instructions.push(Instruction::Label(body_label));
        self.lower_expression(&while_expr.body);
        self.instructions.push(Instruction::Goto(start_label));

        self.instructions.push(Instruction::Label(end_label));
        Value::Void
    }

    fn lower_block(&mut self, block: &Block<TypeInfo>) -> Value {
        let mut last = Value::Void;
        for expression in &block.expressions {
            last = self.lower_expression(expression);
        }
        last
    }

    fn lower_let(&mut self, let_expr: &Let<TypeInfo>) -> Value {
        self.scopes.push(HashMap::new());

        for binding in &let_expr.bindings {
            let value = match &binding.init {
                Some(init) => self.lower_expression(init),
                None => {
                    let declared = binding.name.info.computed_type.clone();
                    self.default_value(&declared)
                }
            };

            let local = self.local();
            self.instructions.push(Instruction::Assign {
                dest: local.clone(),
                source: value,
            });
            self.scopes
                .last_mut()
                .unwrap()
                .insert(binding.name.value.clone(), local);
        }

        let value = self.lower_expression(&let_expr.body);
        self.scopes.pop();
        value
    }

    fn lower_case(&mut self, case: &Case<TypeInfo>) -> Value {
        let scrutinee = self.lower_expression(&case.scrutinee);
        let subject = self.materialize(scrutinee);
        let result = self.local();
        let end_label = self.fresh_label("endcase");

        let scrutinee_ty = self.static_type(&case.scrutinee.info());

        if Self::is_value_class(&scrutinee_ty) {
            // The static type of a basic value is exact; the branch can be
            // selected right here.
            let best = case
                .branches
                .iter()
                .filter(|branch| {
                    self.context
                        .conforms(&scrutinee_ty, &branch.type_annotation.value)
                })
                .max_by_key(|branch| self.context.depth(&branch.type_annotation.value));

            match best {
                Some(branch) => {
                    let local = self.local();
                    self.instructions.push(Instruction::Assign {
                        dest: local.clone(),
                        source: Value::var(subject.as_str()),
                    });
                    self.scopes.push(HashMap::from([(
                        branch.name.value.clone(),
                        local,
                    )]));
                    let value = self.lower_expression(&branch.body);
                    self.scopes.pop();
                    self.instructions.push(Instruction::Assign {
                        dest: result.clone(),
                        source: value,
                    });
                }
                None => {
                    let error = self.runtime_error(CASE_MISMATCH);
                    self.instructions.push(error);
                }
            }

            self.instructions.push(Instruction::Label(end_label));
            return Value::var(result);
        }

        let void_label = self.fresh_label("casevoid");
        let mismatch_label = self.fresh_label("casemismatch");

        let void_check = self.local();
        self.instructions.push(Instruction::Equal {
            dest: void_check.clone(),
            left: Value::var(subject.as_str()),
            right: Value::Void,
        });
        self.instructions.push(Instruction::GotoIf {
            condition: Value::var(void_check),
            label: void_label.clone(),
        });

        let type_of = self.local();
        self.instructions.push(Instruction::TypeOf {
            dest: type_of.clone(),
            obj: subject.clone(),
        });

        let branch_labels: Vec<String> = case
            .branches
            .iter()
            .map(|_| self.fresh_label("branch"))
            .collect();

        // Each concrete heap class jumps to the deepest branch it conforms
        // to; anything unmatched is a runtime error.
        let classes: Vec<String> = self
            .context
            .classes()
            .filter(|ty| !Self::is_value_class(ty.name()))
            .map(|ty| ty.name().to_owned())
            .collect();

        for class in classes {
            let best = case
                .branches
                .iter()
                .enumerate()
                .filter(|(_, branch)| self.context.conforms(&class, &branch.type_annotation.value))
                .max_by_key(|(_, branch)| self.context.depth(&branch.type_annotation.value));

            if let Some((index, _)) = best {
                let descriptor = self.local();
                self.instructions.push(Instruction::Name {
                    dest: descriptor.clone(),
                    ty: class,
                });
                let matches = self.local();
                self.instructions.push(Instruction::Equal {
                    dest: matches.clone(),
                    left: Value::var(type_of.as_str()),
                    right: Value::var(descriptor),
                });
                self.instructions.push(Instruction::GotoIf {
                    condition: Value::var(matches),
                    label: branch_labels[index].clone(),
                });
            }
        }
        self.instructions.push(Instruction::Goto(mismatch_label.clone()));

        for (branch, label) in case.branches.iter().zip(&branch_labels) {
            self.instructions.push(Instruction::Label(label.clone()));

            let local = self.local();
            self.instructions.push(Instruction::Assign {
                dest: local.clone(),
                source: Value::var(subject.as_str()),
            });
            self.scopes
                .push(HashMap::from([(branch.name.value.clone(), local)]));
            let value = self.lower_expression(&branch.body);
            self.scopes.pop();

            self.instructions.push(Instruction::Assign {
                dest: result.clone(),
                source: value,
            });
            self.instructions.push(Instruction::Goto(end_label.clone()));
        }

        self.instructions.push(Instruction::Label(void_label));
        let error = self.runtime_error(CASE_VOID);
        self.instructions.push(error);

        self.instructions.push(Instruction::Label(mismatch_label));
        let error = self.runtime_error(CASE_MISMATCH);
        self.instructions.push(error);

        self.instructions.push(Instruction::Label(end_label));
        Value::var(result)
    }

    fn lower_new(&mut self, new: &New<TypeInfo>) -> Value {
        match new.type_name.value.as_str() {
            SELF_TYPE => {
                let dest = self.local();
                self.instructions.push(Instruction::AllocateDynamic {
                    dest: dest.clone(),
                    obj: "self".to_owned(),
                });
                Value::var(dest)
            }
            INT | BOOL => Value::Int(0),
            STRING => {
                let data = self.string_data("");
                let dest = self.local();
                self.instructions.push(Instruction::Load {
                    dest: dest.clone(),
                    data,
                });
                Value::var(dest)
            }
            name => {
                let dest = self.local();
                self.instructions.push(Instruction::Allocate {
                    dest: dest.clone(),
                    ty: name.to_owned(),
                });
                self.instructions.push(Instruction::Arg(Value::var(dest.as_str())));
                let ignored = self.local();
                self.instructions.push(Instruction::StaticCall {
                    function: Self::init_label(name),
                    dest: ignored,
                });
                Value::var(dest)
            }
        }
    }

    fn emit_void_guard(&mut self, receiver: &Value) {
        let error_label = self.fresh_label("voiddispatch");
        let ok_label = self.fresh_label("dispatch");

        let check = self.local();
        self.instructions.push(Instruction::Equal {
            dest: check.clone(),
            left: receiver.clone(),
            right: Value::Void,
        });
        self.instructions.push(Instruction::GotoIf {
            condition: Value::var(check),
            label: error_label.clone(),
        });
        self.instructions.push(Instruction::Goto(ok_label.clone()));

        self.instructions.push(Instruction::Label(error_label));
        let error = self.runtime_error(DISPATCH_VOID);
        self.instructions.push(error);

        self.instructions.push(Instruction::Label(ok_label));
    }

    fn lower_dispatch(&mut self, dispatch: &Dispatch<TypeInfo>) -> Value {
        let receiver = match &dispatch.receiver {
            Some(receiver) => self.lower_expression(receiver),
            None => Value::var("self"),
        };
        let receiver_ty = match &dispatch.receiver {
            Some(receiver) => self.static_type(&receiver.info()),
            None => self.current_class.clone(),
        };

        let args: Vec<Value> = dispatch
            .args
            .iter()
            .map(|arg| self.lower_expression(arg))
            .collect();

        let lookup_ty = dispatch
            .static_parent
            .as_ref()
            .map(|parent| parent.value.clone())
            .unwrap_or_else(|| receiver_ty.clone());

        // Static dispatch, and any dispatch on an unboxed basic value,
        // resolves to a concrete function; everything else goes through the
        // dispatch table, guarded against a void receiver.
        let static_target = if dispatch.static_parent.is_some() || Self::is_value_class(&lookup_ty)
        {
            self.context
                .get_type(&lookup_ty)
                .ok()
                .and_then(|ty| {
                    ty.all_methods(self.context)
                        .into_iter()
                        .find(|(method, _)| method.name == dispatch.method)
                        .map(|(_, owner)| Self::method_label(&dispatch.method, owner, &lookup_ty))
                })
        } else {
            None
        };

        if static_target.is_none()
            && dispatch.receiver.is_some()
            && !Self::is_value_class(&receiver_ty)
        {
            self.emit_void_guard(&receiver);
        }

        self.instructions.push(Instruction::Arg(receiver));
        for arg in args {
            self.instructions.push(Instruction::Arg(arg));
        }

        let dest = self.local();
        match static_target {
            Some(function) => self.instructions.push(Instruction::StaticCall {
                function,
                dest: dest.clone(),
            }),
            None => self.instructions.push(Instruction::DynamicCall {
                ty: receiver_ty,
                method: dispatch.method.clone(),
                dest: dest.clone(),
            }),
        }

        Value::var(dest)
    }
}
