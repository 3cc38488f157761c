use pest::iterators::Pair;

use crate::parser::Rule;

use super::{Feature, Position, TypeName};

/// A single `class C inherits P { ... };` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl<T> {
    pub name: TypeName,
    pub parent: Option<TypeName>,
    pub features: Vec<Feature<T>>,
    pub position: Position,
}

impl ClassDecl<()> {
    pub fn from_pair(pair: Pair<Rule>) -> ClassDecl<()> {
        assert_eq!(pair.as_rule(), Rule::class_decl);

        let position = pair.line_col();

        let mut name = None;
        let mut parent = None;
        let mut features = vec![];

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::type_id if name.is_none() => name = Some(TypeName::from_pair(inner)),
                Rule::type_id => parent = Some(TypeName::from_pair(inner)),
                Rule::method_decl | Rule::attribute_decl => {
                    features.push(Feature::from_pair(inner))
                }
                _ => {}
            }
        }

        ClassDecl {
            name: name.unwrap(),
            parent,
            features,
            position,
        }
    }
}
