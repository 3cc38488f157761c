/// Type information the checker attaches to every AST node.
///
/// `computed_type` is a type name; `idx` carries the inference id when the
/// node's type is still an unsolved `AUTO_TYPE` slot, so uses of the node
/// can register constraints against the right slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeInfo {
    pub computed_type: String,
    pub idx: Option<usize>,
}

impl TypeInfo {
    pub fn new(computed_type: impl Into<String>) -> Self {
        Self {
            computed_type: computed_type.into(),
            idx: None,
        }
    }

    pub fn with_idx(computed_type: impl Into<String>, idx: Option<usize>) -> Self {
        Self {
            computed_type: computed_type.into(),
            idx,
        }
    }
}
