#[macro_use]
extern crate pest_derive;

pub mod ast;
pub mod cil;
pub mod mips;
pub mod parser;
pub mod semant;
