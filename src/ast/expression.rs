use pest::iterators::Pair;

use crate::parser::Rule;

use super::{
    Assign, BinaryExpr, BinaryOp, Block, Boolean, Case, Dispatch, Ident, If, Integer, Let, New,
    Position, Str, UnaryExpr, UnaryOp, While,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression<T> {
    Assign(Assign<T>),
    Binary(BinaryExpr<T>),
    Unary(UnaryExpr<T>),
    If(If<T>),
    While(While<T>),
    Block(Block<T>),
    Let(Let<T>),
    Case(Case<T>),
    New(New<T>),
    Dispatch(Dispatch<T>),
    Ident(Ident<T>),
    Integer(Integer<T>),
    Str(Str<T>),
    Boolean(Boolean<T>),
}

impl Expression<()> {
    pub fn from_pair(pair: Pair<Rule>) -> Expression<()> {
        match pair.as_rule() {
            Rule::expr | Rule::unary => Self::from_pair(pair.into_inner().next().unwrap()),
            Rule::let_expr => Expression::Let(Let::from_pair(pair)),
            Rule::assign => Expression::Assign(Assign::from_pair(pair)),
            Rule::not_expr => Self::from_not_pair(pair),
            Rule::comparison | Rule::additive | Rule::multiplicative => {
                Self::from_binary_chain(pair)
            }
            Rule::isvoid_expr => Self::from_unary_pair(pair, UnaryOp::IsVoid),
            Rule::complement_expr => Self::from_unary_pair(pair, UnaryOp::Complement),
            Rule::postfix => Self::from_postfix_pair(pair),
            Rule::if_expr => Expression::If(If::from_pair(pair)),
            Rule::while_expr => Expression::While(While::from_pair(pair)),
            Rule::case_expr => Expression::Case(Case::from_pair(pair)),
            Rule::block_expr => Expression::Block(Block::from_pair(pair)),
            Rule::new_expr => Expression::New(New::from_pair(pair)),
            Rule::self_dispatch => Expression::Dispatch(Dispatch::from_self_call(pair)),
            Rule::object_id => Expression::Ident(Ident::from_pair(pair)),
            Rule::integer => Expression::Integer(Integer::from_pair(pair)),
            Rule::string => Expression::Str(Str::from_pair(pair)),
            Rule::bool_lit => Expression::Boolean(Boolean::from_pair(pair)),
            rule => unreachable!("cannot build expression from rule {rule:?}"),
        }
    }

    fn from_not_pair(pair: Pair<Rule>) -> Expression<()> {
        let position = pair.line_col();
        let mut inner = pair.into_inner();
        let first = inner.next().unwrap();

        if first.as_rule() == Rule::kw_not {
            Expression::Unary(UnaryExpr {
                op: UnaryOp::Not,
                operand: Box::new(Self::from_pair(inner.next().unwrap())),
                position,
                info: (),
            })
        } else {
            Self::from_pair(first)
        }
    }

    fn from_unary_pair(pair: Pair<Rule>, op: UnaryOp) -> Expression<()> {
        let position = pair.line_col();
        let operand = pair
            .into_inner()
            .find(|inner| inner.as_rule() == Rule::unary)
            .unwrap();

        Expression::Unary(UnaryExpr {
            op,
            operand: Box::new(Self::from_pair(operand)),
            position,
            info: (),
        })
    }

    /// Fold `operand (op operand)*` chains into left-associated binary nodes.
    fn from_binary_chain(pair: Pair<Rule>) -> Expression<()> {
        let position = pair.line_col();
        let mut inner = pair.into_inner();

        let mut lhs = Self::from_pair(inner.next().unwrap());

        while let Some(op_pair) = inner.next() {
            let rhs = Self::from_pair(inner.next().unwrap());
            lhs = Expression::Binary(BinaryExpr {
                op: BinaryOp::from_pair(op_pair),
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                position,
                info: (),
            });
        }

        lhs
    }

    fn from_postfix_pair(pair: Pair<Rule>) -> Expression<()> {
        let mut inner = pair.into_inner();
        let mut lhs = Self::from_pair(inner.next().unwrap());

        for suffix in inner {
            lhs = Expression::Dispatch(Dispatch::from_suffix(lhs, suffix));
        }

        lhs
    }

    pub fn position(&self) -> Position {
        match self {
            Expression::Assign(Assign { position, .. })
            | Expression::Binary(BinaryExpr { position, .. })
            | Expression::Unary(UnaryExpr { position, .. })
            | Expression::If(If { position, .. })
            | Expression::While(While { position, .. })
            | Expression::Block(Block { position, .. })
            | Expression::Let(Let { position, .. })
            | Expression::Case(Case { position, .. })
            | Expression::New(New { position, .. })
            | Expression::Dispatch(Dispatch { position, .. })
            | Expression::Ident(Ident { position, .. })
            | Expression::Integer(Integer { position, .. })
            | Expression::Str(Str { position, .. })
            | Expression::Boolean(Boolean { position, .. }) => *position,
        }
    }
}

impl<T> Expression<T>
where
    T: Clone,
{
    pub fn info(&self) -> T {
        match self {
            Expression::Assign(Assign { info, .. })
            | Expression::Binary(BinaryExpr { info, .. })
            | Expression::Unary(UnaryExpr { info, .. })
            | Expression::If(If { info, .. })
            | Expression::While(While { info, .. })
            | Expression::Block(Block { info, .. })
            | Expression::Let(Let { info, .. })
            | Expression::Case(Case { info, .. })
            | Expression::New(New { info, .. })
            | Expression::Dispatch(Dispatch { info, .. })
            | Expression::Ident(Ident { info, .. })
            | Expression::Integer(Integer { info, .. })
            | Expression::Str(Str { info, .. })
            | Expression::Boolean(Boolean { info, .. }) => info.clone(),
        }
    }
}
