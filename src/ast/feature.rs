use pest::iterators::Pair;

use crate::parser::Rule;

use super::{AttributeDecl, MethodDecl};

#[derive(Debug, Clone, PartialEq)]
pub enum Feature<T> {
    Attribute(AttributeDecl<T>),
    Method(MethodDecl<T>),
}

impl Feature<()> {
    pub fn from_pair(pair: Pair<Rule>) -> Feature<()> {
        match pair.as_rule() {
            Rule::attribute_decl => Feature::Attribute(AttributeDecl::from_pair(pair)),
            Rule::method_decl => Feature::Method(MethodDecl::from_pair(pair)),
            rule => unreachable!("cannot build class feature from rule {rule:?}"),
        }
    }
}
