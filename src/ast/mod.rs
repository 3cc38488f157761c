//! Internal representation of COOL programs.
//!
//! One file per node. Every node carries its source position and an `info`
//! slot which is `()` after parsing and `TypeInfo` after type checking.
mod assign;
mod attribute;
mod binary_expr;
mod binary_op;
mod block;
mod boolean;
mod case_expr;
mod class_decl;
mod dispatch;
mod expression;
mod feature;
mod formal;
mod ident;
mod if_expr;
mod integer;
mod let_expr;
mod method;
mod new_expr;
mod str;
mod type_name;
mod unary_expr;
mod unary_op;
mod while_expr;

pub use self::assign::*;
pub use self::attribute::*;
pub use self::binary_expr::*;
pub use self::binary_op::*;
pub use self::block::*;
pub use self::boolean::*;
pub use self::case_expr::*;
pub use self::class_decl::*;
pub use self::dispatch::*;
pub use self::expression::*;
pub use self::feature::*;
pub use self::formal::*;
pub use self::ident::*;
pub use self::if_expr::*;
pub use self::integer::*;
pub use self::let_expr::*;
pub use self::method::*;
pub use self::new_expr::*;
pub use self::str::*;
pub use self::type_name::*;
pub use self::unary_expr::*;
pub use self::unary_op::*;
pub use self::while_expr::*;

use pest::iterators::Pair;

use crate::parser::Rule;

/// A position within a source file (line, column).
pub type Position = (usize, usize);

/// A single COOL program: a list of class declarations.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Program<T> {
    pub classes: Vec<ClassDecl<T>>,
}

impl Program<()> {
    pub fn from_pair(pair: Pair<Rule>) -> Program<()> {
        assert_eq!(pair.as_rule(), Rule::program);

        let classes = pair
            .into_inner()
            .filter(|inner| inner.as_rule() == Rule::class_decl)
            .map(ClassDecl::from_pair)
            .collect();

        Self { classes }
    }
}
