//! MIPS backend: renders a CIL program to SPIM/MARS assembly.
//!
//! Objects are heap records `[descriptor, attributes...]`. A descriptor is
//! a `.data` word table `[name, size in bytes, init, methods...]`, so the
//! descriptor address doubles as the runtime type tag. Functions keep
//! params above and locals below a `$fp` frame; arguments are pushed
//! receiver-first and results come back in `$v0`.
mod runtime;

pub use self::runtime::RUNTIME;

use std::collections::HashMap;
use std::fmt::Display;

use log::debug;

use crate::cil::{self, Instruction as Cil, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    V0,
    A0,
    A1,
    A2,
    T0,
    T1,
    T2,
    Sp,
    Fp,
    Ra,
}

impl Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Reg::V0 => "$v0",
            Reg::A0 => "$a0",
            Reg::A1 => "$a1",
            Reg::A2 => "$a2",
            Reg::T0 => "$t0",
            Reg::T1 => "$t1",
            Reg::T2 => "$t2",
            Reg::Sp => "$sp",
            Reg::Fp => "$fp",
            Reg::Ra => "$ra",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Comment(String),
    Label(String),
    Li(Reg, i64),
    La(Reg, String),
    Move(Reg, Reg),
    Lw(Reg, i64, Reg),
    Sw(Reg, i64, Reg),
    Add(Reg, Reg, Reg),
    Addiu(Reg, Reg, i64),
    Sub(Reg, Reg, Reg),
    Mul(Reg, Reg, Reg),
    Div(Reg, Reg, Reg),
    Neg(Reg, Reg),
    Slt(Reg, Reg, Reg),
    Sle(Reg, Reg, Reg),
    Seq(Reg, Reg, Reg),
    Beqz(Reg, String),
    Bnez(Reg, String),
    J(String),
    Jal(String),
    Jalr(Reg),
    Jr(Reg),
    Syscall,
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Instruction::*;

        let value = match self {
            Comment(comment) => format!("\t# {comment}"),
            Label(label) => format!("{label}:"),
            Li(dest, value) => format!("\tli {dest}, {value}"),
            La(dest, label) => format!("\tla {dest}, {label}"),
            Move(dest, source) => format!("\tmove {dest}, {source}"),
            Lw(dest, offset, base) => format!("\tlw {dest}, {offset}({base})"),
            Sw(source, offset, base) => format!("\tsw {source}, {offset}({base})"),
            Add(dest, lhs, rhs) => format!("\tadd {dest}, {lhs}, {rhs}"),
            Addiu(dest, source, value) => format!("\taddiu {dest}, {source}, {value}"),
            Sub(dest, lhs, rhs) => format!("\tsub {dest}, {lhs}, {rhs}"),
            Mul(dest, lhs, rhs) => format!("\tmul {dest}, {lhs}, {rhs}"),
            Div(dest, lhs, rhs) => format!("\tdiv {dest}, {lhs}, {rhs}"),
            Neg(dest, source) => format!("\tneg {dest}, {source}"),
            Slt(dest, lhs, rhs) => format!("\tslt {dest}, {lhs}, {rhs}"),
            Sle(dest, lhs, rhs) => format!("\tsle {dest}, {lhs}, {rhs}"),
            Seq(dest, lhs, rhs) => format!("\tseq {dest}, {lhs}, {rhs}"),
            Beqz(reg, label) => format!("\tbeqz {reg}, {label}"),
            Bnez(reg, label) => format!("\tbnez {reg}, {label}"),
            J(label) => format!("\tj {label}"),
            Jal(label) => format!("\tjal {label}"),
            Jalr(reg) => format!("\tjalr {reg}"),
            Jr(reg) => format!("\tjr {reg}"),
            Syscall => "\tsyscall".to_owned(),
        };

        f.write_str(&value)
    }
}

/// Where the dispatch-table methods start inside a descriptor:
/// `[name, size, init]` come first.
const METHODS_OFFSET: i64 = 12;

pub struct MipsGenerator<'a> {
    program: &'a cil::Program,
    /// attribute byte offsets per class
    attributes: HashMap<String, HashMap<String, i64>>,
    /// dispatch-table slots per class
    slots: HashMap<String, HashMap<String, i64>>,
    /// frame offsets of the current function's params and locals
    frame: HashMap<String, i64>,
    pending_args: i64,
    instructions: Vec<Instruction>,
}

impl<'a> MipsGenerator<'a> {
    pub fn new(program: &'a cil::Program) -> Self {
        let mut attributes = HashMap::new();
        let mut slots = HashMap::new();

        for ty in &program.types {
            let offsets = ty
                .attributes
                .iter()
                .enumerate()
                .map(|(index, name)| (name.clone(), 4 + 4 * index as i64))
                .collect();
            attributes.insert(ty.name.clone(), offsets);

            let table = ty
                .methods
                .iter()
                .enumerate()
                .map(|(index, (name, _))| (name.clone(), METHODS_OFFSET + 4 * index as i64))
                .collect();
            slots.insert(ty.name.clone(), table);
        }

        Self {
            program,
            attributes,
            slots,
            frame: HashMap::new(),
            pending_args: 0,
            instructions: vec![],
        }
    }

    /// Render the whole program. The caller appends [`RUNTIME`] to the
    /// result to obtain a self-contained assembly file.
    pub fn generate(mut self) -> String {
        let mut output = String::from(".data\n");

        for ty in &self.program.types {
            output.push_str(&format!("_name_{0}: .asciiz \"{0}\"\n", ty.name));
            let size = 4 + 4 * ty.attributes.len();
            let methods: Vec<&str> = ty.methods.iter().map(|(_, label)| label.as_str()).collect();
            let mut words = vec![
                format!("_name_{}", ty.name),
                size.to_string(),
                ty.init.clone(),
            ];
            words.extend(methods.iter().map(|label| (*label).to_owned()));
            output.push_str(&format!("_type_{}: .word {}\n", ty.name, words.join(", ")));
        }

        for data in &self.program.data {
            output.push_str(&format!(
                "{}: .asciiz \"{}\"\n",
                data.name,
                escape(&data.value)
            ));
        }

        output.push_str("\n.text\n.globl main\n");

        for function in &self.program.functions {
            self.emit_function(function);
        }
        for instruction in &self.instructions {
            output.push_str(&format!("{instruction}\n"));
        }

        debug!(
            "emitted {} MIPS instructions for {} functions",
            self.instructions.len(),
            self.program.functions.len()
        );

        output
    }

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn emit_function(&mut self, function: &cil::Function) {
        use Instruction::*;

        self.frame.clear();
        self.pending_args = 0;

        // Arguments are pushed first-to-last, so the first param sits
        // highest above the saved frame.
        let params = function.params.len() as i64;
        for (index, param) in function.params.iter().enumerate() {
            self.frame
                .insert(param.clone(), 8 + 4 * (params - 1 - index as i64));
        }
        for (index, local) in function.locals.iter().enumerate() {
            self.frame.insert(local.clone(), -4 * (index as i64 + 1));
        }

        self.emit(Label(function.name.clone()));
        self.emit(Addiu(Reg::Sp, Reg::Sp, -8));
        self.emit(Sw(Reg::Ra, 4, Reg::Sp));
        self.emit(Sw(Reg::Fp, 0, Reg::Sp));
        self.emit(Move(Reg::Fp, Reg::Sp));
        let frame_size = 4 * function.locals.len() as i64;
        if frame_size > 0 {
            self.emit(Addiu(Reg::Sp, Reg::Sp, -frame_size));
        }

        for instruction in &function.instructions {
            self.emit_instruction(instruction);
        }
    }

    fn offset(&self, name: &str) -> i64 {
        *self
            .frame
            .get(name)
            .unwrap_or_else(|| panic!("unknown frame slot '{name}'"))
    }

    fn load(&mut self, value: &Value, reg: Reg) {
        match value {
            Value::Int(constant) => self.emit(Instruction::Li(reg, *constant)),
            Value::Void => self.emit(Instruction::Li(reg, 0)),
            Value::Var(name) => {
                let offset = self.offset(name);
                self.emit(Instruction::Lw(reg, offset, Reg::Fp));
            }
        }
    }

    fn store(&mut self, name: &str, reg: Reg) {
        let offset = self.offset(name);
        self.emit(Instruction::Sw(reg, offset, Reg::Fp));
    }

    fn epilogue(&mut self) {
        use Instruction::*;

        self.emit(Move(Reg::Sp, Reg::Fp));
        self.emit(Lw(Reg::Fp, 0, Reg::Sp));
        self.emit(Lw(Reg::Ra, 4, Reg::Sp));
        self.emit(Addiu(Reg::Sp, Reg::Sp, 8));
        self.emit(Jr(Reg::Ra));
    }

    fn binary(
        &mut self,
        dest: &str,
        left: &Value,
        right: &Value,
        op: impl FnOnce(Reg, Reg, Reg) -> Instruction,
    ) {
        self.load(left, Reg::T0);
        self.load(right, Reg::T1);
        self.emit(op(Reg::T2, Reg::T0, Reg::T1));
        self.store(dest, Reg::T2);
    }

    fn finish_call(&mut self, dest: &str) {
        if self.pending_args > 0 {
            self.emit(Instruction::Addiu(Reg::Sp, Reg::Sp, 4 * self.pending_args));
            self.pending_args = 0;
        }
        self.store(dest, Reg::V0);
    }

    fn emit_instruction(&mut self, instruction: &Cil) {
        use Instruction::*;

        match instruction {
            Cil::Assign { dest, source } => {
                self.load(source, Reg::T0);
                self.store(dest, Reg::T0);
            }
            Cil::Plus { dest, left, right } => self.binary(dest, left, right, Add),
            Cil::Minus { dest, left, right } => self.binary(dest, left, right, Sub),
            Cil::Star { dest, left, right } => self.binary(dest, left, right, Mul),
            Cil::Div { dest, left, right } => self.binary(dest, left, right, Div),
            Cil::Less { dest, left, right } => self.binary(dest, left, right, Slt),
            Cil::Leq { dest, left, right } => self.binary(dest, left, right, Sle),
            Cil::Equal { dest, left, right } => self.binary(dest, left, right, Seq),
            Cil::EqualStr { dest, left, right } => {
                self.load(left, Reg::A0);
                self.load(right, Reg::A1);
                self.emit(Jal("__strcmp".to_owned()));
                self.store(dest, Reg::V0);
            }
            Cil::GetAttr { dest, obj, attr, ty } => {
                let offset = self.attributes[ty][attr];
                let obj_offset = self.offset(obj);
                self.emit(Lw(Reg::T0, obj_offset, Reg::Fp));
                self.emit(Lw(Reg::T1, offset, Reg::T0));
                self.store(dest, Reg::T1);
            }
            Cil::SetAttr { obj, attr, value, ty } => {
                let offset = self.attributes[ty][attr];
                let obj_offset = self.offset(obj);
                self.load(value, Reg::T1);
                self.emit(Lw(Reg::T0, obj_offset, Reg::Fp));
                self.emit(Sw(Reg::T1, offset, Reg::T0));
            }
            Cil::Allocate { dest, ty } => {
                let size = self
                    .program
                    .types
                    .iter()
                    .find(|decl| &decl.name == ty)
                    .map(|decl| 4 + 4 * decl.attributes.len() as i64)
                    .unwrap_or(4);
                self.emit(Li(Reg::A0, size));
                self.emit(Li(Reg::V0, 9));
                self.emit(Syscall);
                self.emit(La(Reg::T0, format!("_type_{ty}")));
                self.emit(Sw(Reg::T0, 0, Reg::V0));
                self.store(dest, Reg::V0);
            }
            Cil::AllocateDynamic { dest, obj } => {
                let obj_offset = self.offset(obj);
                self.emit(Lw(Reg::T0, obj_offset, Reg::Fp));
                self.emit(Lw(Reg::T1, 0, Reg::T0));
                self.emit(Lw(Reg::A0, 4, Reg::T1));
                self.emit(Li(Reg::V0, 9));
                self.emit(Syscall);
                self.emit(Sw(Reg::T1, 0, Reg::V0));
                self.store(dest, Reg::V0);
                // run the dynamic type's initializer on the fresh object
                self.emit(Addiu(Reg::Sp, Reg::Sp, -4));
                self.emit(Sw(Reg::V0, 0, Reg::Sp));
                self.emit(Lw(Reg::T2, 8, Reg::T1));
                self.emit(Jalr(Reg::T2));
                self.emit(Addiu(Reg::Sp, Reg::Sp, 4));
            }
            Cil::Copy { dest, obj } => {
                let obj_offset = self.offset(obj);
                self.emit(Lw(Reg::T0, obj_offset, Reg::Fp));
                self.emit(Lw(Reg::T1, 0, Reg::T0));
                self.emit(Lw(Reg::A0, 4, Reg::T1));
                self.emit(Li(Reg::V0, 9));
                self.emit(Syscall);
                self.emit(Move(Reg::A0, Reg::T0));
                self.emit(Move(Reg::A1, Reg::V0));
                self.emit(Lw(Reg::A2, 4, Reg::T1));
                self.emit(Jal("__memcpy".to_owned()));
                self.store(dest, Reg::V0);
            }
            Cil::TypeOf { dest, obj } => {
                let obj_offset = self.offset(obj);
                self.emit(Lw(Reg::T0, obj_offset, Reg::Fp));
                self.emit(Lw(Reg::T0, 0, Reg::T0));
                self.store(dest, Reg::T0);
            }
            Cil::TypeName { dest, obj } => {
                let obj_offset = self.offset(obj);
                self.emit(Lw(Reg::T0, obj_offset, Reg::Fp));
                self.emit(Lw(Reg::T0, 0, Reg::T0));
                self.emit(Lw(Reg::T0, 0, Reg::T0));
                self.store(dest, Reg::T0);
            }
            Cil::Name { dest, ty } => {
                self.emit(La(Reg::T0, format!("_type_{ty}")));
                self.store(dest, Reg::T0);
            }
            Cil::Label(label) => self.emit(Label(label.clone())),
            Cil::Goto(label) => self.emit(J(label.clone())),
            Cil::GotoIf { condition, label } => {
                self.load(condition, Reg::T0);
                self.emit(Bnez(Reg::T0, label.clone()));
            }
            Cil::StaticCall { function, dest } => {
                self.emit(Jal(function.clone()));
                self.finish_call(dest);
            }
            Cil::DynamicCall { ty, method, dest } => {
                let slot = self.slots[ty][method];
                // the receiver was pushed first, so it is the deepest arg
                let receiver_offset = 4 * (self.pending_args - 1);
                self.emit(Lw(Reg::T0, receiver_offset, Reg::Sp));
                self.emit(Lw(Reg::T1, 0, Reg::T0));
                self.emit(Lw(Reg::T1, slot, Reg::T1));
                self.emit(Jalr(Reg::T1));
                self.finish_call(dest);
            }
            Cil::Arg(value) => {
                self.load(value, Reg::T0);
                self.emit(Addiu(Reg::Sp, Reg::Sp, -4));
                self.emit(Sw(Reg::T0, 0, Reg::Sp));
                self.pending_args += 1;
            }
            Cil::Return(value) => {
                self.load(value, Reg::V0);
                self.epilogue();
            }
            Cil::Load { dest, data } => {
                self.emit(La(Reg::T0, data.clone()));
                self.store(dest, Reg::T0);
            }
            Cil::Length { dest, source } => {
                let offset = self.offset(source);
                self.emit(Lw(Reg::A0, offset, Reg::Fp));
                self.emit(Jal("__strlen".to_owned()));
                self.store(dest, Reg::V0);
            }
            Cil::Concat { dest, prefix, suffix } => {
                let prefix_offset = self.offset(prefix);
                let suffix_offset = self.offset(suffix);
                self.emit(Lw(Reg::A0, prefix_offset, Reg::Fp));
                self.emit(Lw(Reg::A1, suffix_offset, Reg::Fp));
                self.emit(Jal("__concat".to_owned()));
                self.store(dest, Reg::V0);
            }
            Cil::Substring {
                dest,
                source,
                index,
                length,
            } => {
                let source_offset = self.offset(source);
                self.emit(Lw(Reg::A0, source_offset, Reg::Fp));
                self.load(index, Reg::A1);
                self.load(length, Reg::A2);
                self.emit(Jal("__substr".to_owned()));
                self.store(dest, Reg::V0);
            }
            Cil::ReadStr { dest } => {
                self.emit(Jal("__read_str".to_owned()));
                self.store(dest, Reg::V0);
            }
            Cil::ReadInt { dest } => {
                self.emit(Li(Reg::V0, 5));
                self.emit(Syscall);
                self.store(dest, Reg::V0);
            }
            Cil::PrintStr { value } => {
                self.load(value, Reg::A0);
                self.emit(Li(Reg::V0, 4));
                self.emit(Syscall);
            }
            Cil::PrintInt { value } => {
                self.load(value, Reg::A0);
                self.emit(Li(Reg::V0, 1));
                self.emit(Syscall);
            }
            Cil::Complement { dest, operand } => {
                self.load(operand, Reg::T0);
                self.emit(Neg(Reg::T1, Reg::T0));
                self.store(dest, Reg::T1);
            }
            Cil::Error { data } => {
                self.emit(La(Reg::A0, data.clone()));
                self.emit(Li(Reg::V0, 4));
                self.emit(Syscall);
                self.emit(Li(Reg::A0, 1));
                self.emit(Li(Reg::V0, 17));
                self.emit(Syscall);
            }
            Cil::Exit => {
                self.emit(Li(Reg::V0, 10));
                self.emit(Syscall);
            }
        }
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            other => escaped.push(other),
        }
    }
    escaped
}
