//! Built-in node schemas
//!
//! Every fact type the parsers produce is declared here once, as a static. Schemas that
//! only differ by the type of one nested field (`PyInfo`, `PySetupInfo`, `PyInitInfo`) are
//! separate statics so that an update can never cross from one to the other.

use super::field::{
    FLAG, LINENO, NON_NULL_SINGLE_LINE_STR, OFFSET, RST_SYMBOL_STR, SINGLE_LINE_STR, STR,
};
use super::node::{FieldDef, FieldKind, NodeSchema};
use super::patch::PatchRule;

pub static TEXT: NodeSchema = NodeSchema {
    name: "TextInfo",
    fields: &[
        FieldDef {
            name: "text",
            kind: FieldKind::Scalar(&STR),
        },
        FieldDef {
            name: "lineno",
            kind: FieldKind::Scalar(&LINENO),
        },
    ],
    patch: PatchRule::ReplaceText,
};

pub static SINGLE_LINE_TEXT: NodeSchema = NodeSchema {
    name: "SingleLineTextInfo",
    fields: &[
        FieldDef {
            name: "text",
            kind: FieldKind::Scalar(&NON_NULL_SINGLE_LINE_STR),
        },
        FieldDef {
            name: "lineno",
            kind: FieldKind::Scalar(&LINENO),
        },
    ],
    patch: PatchRule::ReplaceText,
};

pub static RST_TITLE: NodeSchema = NodeSchema {
    name: "RstTitleInfo",
    fields: &[
        FieldDef {
            name: "text",
            kind: FieldKind::Scalar(&NON_NULL_SINGLE_LINE_STR),
        },
        FieldDef {
            name: "symbol",
            kind: FieldKind::Scalar(&RST_SYMBOL_STR),
        },
        FieldDef {
            name: "has_overline",
            kind: FieldKind::Scalar(&FLAG),
        },
        FieldDef {
            name: "lineno",
            kind: FieldKind::Scalar(&LINENO),
        },
    ],
    patch: PatchRule::RstTitle,
};

pub static RST_SCRIPT: NodeSchema = NodeSchema {
    name: "RstScriptInfo",
    fields: &[FieldDef {
        name: "title",
        kind: FieldKind::Node(&RST_TITLE),
    }],
    patch: PatchRule::None,
};

pub static PY_DOCSTRING: NodeSchema = NodeSchema {
    name: "PyDocstringInfo",
    fields: &[
        FieldDef {
            name: "title",
            kind: FieldKind::Node(&RST_TITLE),
        },
        FieldDef {
            name: "copyright",
            kind: FieldKind::Node(&SINGLE_LINE_TEXT),
        },
        FieldDef {
            name: "license",
            kind: FieldKind::Node(&SINGLE_LINE_TEXT),
        },
    ],
    patch: PatchRule::None,
};

pub static CODE: NodeSchema = NodeSchema {
    name: "CodeInfo",
    fields: &[],
    patch: PatchRule::None,
};

pub static PY_INFO: NodeSchema = NodeSchema {
    name: "PyInfo",
    fields: &[
        FieldDef {
            name: "docstring",
            kind: FieldKind::Node(&PY_DOCSTRING),
        },
        FieldDef {
            name: "code",
            kind: FieldKind::Node(&CODE),
        },
        FieldDef {
            name: "docstring_lineno",
            kind: FieldKind::Scalar(&OFFSET),
        },
    ],
    patch: PatchRule::None,
};

pub static KWARG: NodeSchema = NodeSchema {
    name: "KwargInfo",
    fields: &[
        FieldDef {
            name: "arg",
            kind: FieldKind::Scalar(&NON_NULL_SINGLE_LINE_STR),
        },
        FieldDef {
            name: "value",
            kind: FieldKind::Scalar(&SINGLE_LINE_STR),
        },
        FieldDef {
            name: "lineno",
            kind: FieldKind::Scalar(&LINENO),
        },
        FieldDef {
            name: "column",
            kind: FieldKind::Scalar(&LINENO),
        },
    ],
    patch: PatchRule::QuotedValue {
        key: "arg",
        value: "value",
    },
};

pub static SETUP_KWARGS: NodeSchema = NodeSchema {
    name: "SetupKwargsInfo",
    fields: &[
        FieldDef {
            name: "name",
            kind: FieldKind::Node(&KWARG),
        },
        FieldDef {
            name: "version",
            kind: FieldKind::Node(&KWARG),
        },
        FieldDef {
            name: "url",
            kind: FieldKind::Node(&KWARG),
        },
        FieldDef {
            name: "author",
            kind: FieldKind::Node(&KWARG),
        },
        FieldDef {
            name: "author_email",
            kind: FieldKind::Node(&KWARG),
        },
        FieldDef {
            name: "description",
            kind: FieldKind::Node(&KWARG),
        },
        FieldDef {
            name: "packages",
            kind: FieldKind::Sequence(&KWARG),
        },
    ],
    patch: PatchRule::None,
};

pub static SETUP: NodeSchema = NodeSchema {
    name: "SetupInfo",
    fields: &[FieldDef {
        name: "setup",
        kind: FieldKind::Node(&SETUP_KWARGS),
    }],
    patch: PatchRule::None,
};

pub static PY_SETUP: NodeSchema = NodeSchema {
    name: "PySetupInfo",
    fields: &[
        FieldDef {
            name: "docstring",
            kind: FieldKind::Node(&PY_DOCSTRING),
        },
        FieldDef {
            name: "code",
            kind: FieldKind::Node(&SETUP),
        },
        FieldDef {
            name: "docstring_lineno",
            kind: FieldKind::Scalar(&OFFSET),
        },
    ],
    patch: PatchRule::None,
};

pub static VAR: NodeSchema = NodeSchema {
    name: "VarInfo",
    fields: &[
        FieldDef {
            name: "var",
            kind: FieldKind::Scalar(&NON_NULL_SINGLE_LINE_STR),
        },
        FieldDef {
            name: "value",
            kind: FieldKind::Scalar(&SINGLE_LINE_STR),
        },
        FieldDef {
            name: "lineno",
            kind: FieldKind::Scalar(&LINENO),
        },
        FieldDef {
            name: "column",
            kind: FieldKind::Scalar(&LINENO),
        },
    ],
    patch: PatchRule::Assignment {
        key: "var",
        value: "value",
    },
};

pub static INIT: NodeSchema = NodeSchema {
    name: "InitInfo",
    fields: &[FieldDef {
        name: "version",
        kind: FieldKind::Node(&VAR),
    }],
    patch: PatchRule::None,
};

pub static PY_INIT: NodeSchema = NodeSchema {
    name: "PyInitInfo",
    fields: &[
        FieldDef {
            name: "docstring",
            kind: FieldKind::Node(&PY_DOCSTRING),
        },
        FieldDef {
            name: "code",
            kind: FieldKind::Node(&INIT),
        },
        FieldDef {
            name: "docstring_lineno",
            kind: FieldKind::Scalar(&OFFSET),
        },
    ],
    patch: PatchRule::None,
};

/// Every built-in schema, for lookups by name
pub static ALL: &[&NodeSchema] = &[
    &TEXT,
    &SINGLE_LINE_TEXT,
    &RST_TITLE,
    &RST_SCRIPT,
    &PY_DOCSTRING,
    &CODE,
    &PY_INFO,
    &KWARG,
    &SETUP_KWARGS,
    &SETUP,
    &PY_SETUP,
    &VAR,
    &INIT,
    &PY_INIT,
];

/// Find a built-in schema by its name (`"PySetupInfo"`, `"RstScriptInfo"`, ...)
pub fn by_name(name: &str) -> Option<&'static NodeSchema> {
    ALL.iter().copied().find(|schema| schema.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert!(by_name("PySetupInfo").is_some_and(|s| s.is(&PY_SETUP)));
        assert!(by_name("Nope").is_none());
    }

    #[test]
    fn test_python_variants_are_distinct() {
        assert!(!PY_INFO.is(&PY_SETUP));
        assert!(!PY_SETUP.is(&PY_INIT));
        assert_eq!(
            PY_SETUP.field_names().collect::<Vec<_>>(),
            vec!["docstring", "code", "docstring_lineno"]
        );
    }
}
