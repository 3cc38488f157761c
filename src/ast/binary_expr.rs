use super::{BinaryOp, Expression, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr<T> {
    pub op: BinaryOp,
    pub lhs: Box<Expression<T>>,
    pub rhs: Box<Expression<T>>,
    pub position: Position,
    pub info: T,
}
