use once_cell::sync::Lazy;

use super::{
    context::Context,
    types::{Type, AUTO_TYPE, BOOL, ERROR, INT, IO, OBJECT, SELF_TYPE, STRING},
};

pub struct BuiltinMethod {
    pub name: &'static str,
    pub params: Vec<(&'static str, &'static str)>,
    pub return_type: &'static str,
}

pub struct BuiltinClass {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    pub inheritable: bool,
    pub methods: Vec<BuiltinMethod>,
}

/// The built-in classes of COOL and their method signatures; the CIL
/// lowering emits a body for every method listed here.
pub static BUILTIN_CLASSES: Lazy<Vec<BuiltinClass>> = Lazy::new(|| {
    vec![
        BuiltinClass {
            name: OBJECT,
            parent: None,
            inheritable: true,
            methods: vec![
                BuiltinMethod {
                    name: "abort",
                    params: vec![],
                    return_type: OBJECT,
                },
                BuiltinMethod {
                    name: "type_name",
                    params: vec![],
                    return_type: STRING,
                },
                BuiltinMethod {
                    name: "copy",
                    params: vec![],
                    return_type: SELF_TYPE,
                },
            ],
        },
        BuiltinClass {
            name: IO,
            parent: Some(OBJECT),
            inheritable: true,
            methods: vec![
                BuiltinMethod {
                    name: "out_string",
                    params: vec![("x", STRING)],
                    return_type: SELF_TYPE,
                },
                BuiltinMethod {
                    name: "out_int",
                    params: vec![("x", INT)],
                    return_type: SELF_TYPE,
                },
                BuiltinMethod {
                    name: "in_string",
                    params: vec![],
                    return_type: STRING,
                },
                BuiltinMethod {
                    name: "in_int",
                    params: vec![],
                    return_type: INT,
                },
            ],
        },
        BuiltinClass {
            name: INT,
            parent: Some(OBJECT),
            inheritable: false,
            methods: vec![],
        },
        BuiltinClass {
            name: STRING,
            parent: Some(OBJECT),
            inheritable: false,
            methods: vec![
                BuiltinMethod {
                    name: "length",
                    params: vec![],
                    return_type: INT,
                },
                BuiltinMethod {
                    name: "concat",
                    params: vec![("s", STRING)],
                    return_type: STRING,
                },
                BuiltinMethod {
                    name: "substr",
                    params: vec![("i", INT), ("l", INT)],
                    return_type: STRING,
                },
            ],
        },
        BuiltinClass {
            name: BOOL,
            parent: Some(OBJECT),
            inheritable: false,
            methods: vec![],
        },
    ]
});

/// Install the built-in classes and the pseudo-types into a fresh Context.
pub fn install_builtins(context: &mut Context) {
    for class in BUILTIN_CLASSES.iter() {
        let mut ty = Type::with_flags(class.name, class.inheritable, false);
        if let Some(parent) = class.parent {
            ty.set_parent(parent).unwrap();
        }

        for method in &class.methods {
            let param_names = method.params.iter().map(|(name, _)| (*name).to_owned());
            let param_types = method.params.iter().map(|(_, ty)| (*ty).to_owned());
            let param_idx = vec![None; method.params.len()];

            ty.define_method(
                method.name,
                param_names.collect(),
                param_types.collect(),
                method.return_type,
                param_idx,
                None,
            )
            .unwrap();
        }

        context.install(ty);
    }

    context.install(Type::with_flags(SELF_TYPE, false, false));
    context.install(Type::with_flags(AUTO_TYPE, false, true));
    context.install(Type::with_flags(ERROR, false, true));
}
