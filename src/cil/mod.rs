//! CIL, the three-address IR between the semantic phase and the MIPS
//! backend.
//!
//! A [`Program`] is three sections: type records (attribute layout and
//! dispatch table per class), string data, and functions of flat
//! [`Instruction`]s over named params/locals.
mod lowering;

pub use self::lowering::CoolToCil;

use std::fmt::Display;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub types: Vec<TypeDecl>,
    pub data: Vec<Data>,
    pub functions: Vec<Function>,
}

/// Runtime layout of one class: attribute order fixes slot offsets, method
/// order fixes dispatch-table slots (stable along the inheritance chain).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub attributes: Vec<String>,
    pub init: String,
    /// `(method name, implementing function label)` pairs.
    pub methods: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub locals: Vec<String>,
    pub instructions: Vec<Instruction>,
}

/// An operand: a named param/local, an integer constant, or void (the null
/// reference).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Var(String),
    Int(i64),
    Void,
}

impl Value {
    pub fn var(name: impl Into<String>) -> Value {
        Value::Var(name.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Assign { dest: String, source: Value },
    Plus { dest: String, left: Value, right: Value },
    Minus { dest: String, left: Value, right: Value },
    Star { dest: String, left: Value, right: Value },
    Div { dest: String, left: Value, right: Value },
    Less { dest: String, left: Value, right: Value },
    Leq { dest: String, left: Value, right: Value },
    Equal { dest: String, left: Value, right: Value },
    /// String equality compares contents, not pointers.
    EqualStr { dest: String, left: Value, right: Value },
    GetAttr { dest: String, obj: String, attr: String, ty: String },
    SetAttr { obj: String, attr: String, value: Value, ty: String },
    Allocate { dest: String, ty: String },
    /// Allocate an instance of the *runtime* type of `obj` and run its
    /// initializer; this is what `new SELF_TYPE` lowers to.
    AllocateDynamic { dest: String, obj: String },
    Copy { dest: String, obj: String },
    TypeOf { dest: String, obj: String },
    TypeName { dest: String, obj: String },
    /// The type descriptor of a class, for runtime type comparisons.
    Name { dest: String, ty: String },
    Label(String),
    Goto(String),
    GotoIf { condition: Value, label: String },
    StaticCall { function: String, dest: String },
    DynamicCall { ty: String, method: String, dest: String },
    Arg(Value),
    Return(Value),
    Load { dest: String, data: String },
    Length { dest: String, source: String },
    Concat { dest: String, prefix: String, suffix: String },
    Substring { dest: String, source: String, index: Value, length: Value },
    ReadStr { dest: String },
    ReadInt { dest: String },
    PrintStr { value: Value },
    PrintInt { value: Value },
    Complement { dest: String, operand: Value },
    /// Print the message at `data` and terminate with a failure code.
    Error { data: String },
    Exit,
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Var(name) => f.write_str(name),
            Value::Int(value) => write!(f, "{value}"),
            Value::Void => f.write_str("VOID"),
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Instruction::*;

        match self {
            Assign { dest, source } => write!(f, "{dest} = {source}"),
            Plus { dest, left, right } => write!(f, "{dest} = {left} + {right}"),
            Minus { dest, left, right } => write!(f, "{dest} = {left} - {right}"),
            Star { dest, left, right } => write!(f, "{dest} = {left} * {right}"),
            Div { dest, left, right } => write!(f, "{dest} = {left} / {right}"),
            Less { dest, left, right } => write!(f, "{dest} = {left} < {right}"),
            Leq { dest, left, right } => write!(f, "{dest} = {left} <= {right}"),
            Equal { dest, left, right } => write!(f, "{dest} = {left} == {right}"),
            EqualStr { dest, left, right } => write!(f, "{dest} = STREQ {left} {right}"),
            GetAttr { dest, obj, attr, ty } => write!(f, "{dest} = GETATTR {obj} {ty}.{attr}"),
            SetAttr { obj, attr, value, ty } => write!(f, "SETATTR {obj} {ty}.{attr} = {value}"),
            Allocate { dest, ty } => write!(f, "{dest} = ALLOCATE {ty}"),
            AllocateDynamic { dest, obj } => write!(f, "{dest} = ALLOCATE TYPEOF {obj}"),
            Copy { dest, obj } => write!(f, "{dest} = COPY {obj}"),
            TypeOf { dest, obj } => write!(f, "{dest} = TYPEOF {obj}"),
            TypeName { dest, obj } => write!(f, "{dest} = TYPENAME {obj}"),
            Name { dest, ty } => write!(f, "{dest} = NAME {ty}"),
            Label(label) => write!(f, "LABEL {label}:"),
            Goto(label) => write!(f, "GOTO {label}"),
            GotoIf { condition, label } => write!(f, "IF {condition} GOTO {label}"),
            StaticCall { function, dest } => write!(f, "{dest} = CALL {function}"),
            DynamicCall { ty, method, dest } => write!(f, "{dest} = VCALL {ty} {method}"),
            Arg(value) => write!(f, "ARG {value}"),
            Return(value) => write!(f, "RETURN {value}"),
            Load { dest, data } => write!(f, "{dest} = LOAD {data}"),
            Length { dest, source } => write!(f, "{dest} = LENGTH {source}"),
            Concat { dest, prefix, suffix } => write!(f, "{dest} = CONCAT {prefix} {suffix}"),
            Substring {
                dest,
                source,
                index,
                length,
            } => write!(f, "{dest} = SUBSTRING {source} {index} {length}"),
            ReadStr { dest } => write!(f, "{dest} = READSTR"),
            ReadInt { dest } => write!(f, "{dest} = READINT"),
            PrintStr { value } => write!(f, "PRINTSTR {value}"),
            PrintInt { value } => write!(f, "PRINTINT {value}"),
            Complement { dest, operand } => write!(f, "{dest} = ~ {operand}"),
            Error { data } => write!(f, "ERROR {data}"),
            Exit => write!(f, "EXIT"),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, ".TYPES")?;
        for ty in &self.types {
            writeln!(f, "type {} {{", ty.name)?;
            for attribute in &ty.attributes {
                writeln!(f, "\tattribute {attribute} ;")?;
            }
            for (method, function) in &ty.methods {
                writeln!(f, "\tmethod {method} : {function} ;")?;
            }
            writeln!(f, "}}")?;
        }

        writeln!(f, ".DATA")?;
        for data in &self.data {
            writeln!(f, "{} = {:?} ;", data.name, data.value)?;
        }

        writeln!(f, ".CODE")?;
        for function in &self.functions {
            writeln!(f, "function {} {{", function.name)?;
            for param in &function.params {
                writeln!(f, "\tPARAM {param} ;")?;
            }
            for local in &function.locals {
                writeln!(f, "\tLOCAL {local} ;")?;
            }
            for instruction in &function.instructions {
                writeln!(f, "\t{instruction} ;")?;
            }
            writeln!(f, "}}")?;
        }

        Ok(())
    }
}
