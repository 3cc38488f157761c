use pest::iterators::Pair;

use crate::parser::Rule;

use super::{Expression, Position, TypeName};

/// A method dispatch.
///
/// `receiver` is `None` for the implicit `self` form `m(args)`;
/// `static_parent` is the `@T` of a static dispatch `e@T.m(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch<T> {
    pub receiver: Option<Box<Expression<T>>>,
    pub static_parent: Option<TypeName>,
    pub method: String,
    pub args: Vec<Expression<T>>,
    pub position: Position,
    pub info: T,
}

impl Dispatch<()> {
    /// Build from a `.m(args)` / `@T.m(args)` suffix applied to `receiver`.
    pub fn from_suffix(receiver: Expression<()>, pair: Pair<Rule>) -> Dispatch<()> {
        assert_eq!(pair.as_rule(), Rule::dispatch_suffix);

        let position = pair.line_col();

        let mut static_parent = None;
        let mut method = None;
        let mut args = vec![];

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::static_parent => {
                    static_parent = inner.into_inner().next().map(TypeName::from_pair)
                }
                Rule::object_id => method = Some(inner.as_str().to_owned()),
                Rule::expr => args.push(Expression::from_pair(inner)),
                rule => unreachable!("unexpected rule {rule:?} in dispatch suffix"),
            }
        }

        Dispatch {
            receiver: Some(Box::new(receiver)),
            static_parent,
            method: method.unwrap(),
            args,
            position,
            info: (),
        }
    }

    /// Build from the implicit-self form `m(args)`.
    pub fn from_self_call(pair: Pair<Rule>) -> Dispatch<()> {
        assert_eq!(pair.as_rule(), Rule::self_dispatch);

        let position = pair.line_col();
        let mut inner = pair.into_inner();

        let method = inner.next().unwrap().as_str().to_owned();
        let args = inner.map(Expression::from_pair).collect();

        Dispatch {
            receiver: None,
            static_parent: None,
            method,
            args,
            position,
            info: (),
        }
    }
}
