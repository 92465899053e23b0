//! Output fragment definitions
//!
//! The emitter produces a flat sequence of these fragments; a formatter turns
//! them into text. Each fragment knows its own C spelling as a list of lines
//! with depths relative to where the fragment sits.

use mpgen_common::{ArgKind, CallShape};
use std::fmt;

use crate::naming::qstr;

/// Coarse category of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// File header comment block
    Header,
    /// Preprocessor lines
    Directive,
    /// File-scope declarations, definitions and spacing
    Declaration,
    /// Statement inside a function body
    Statement,
    /// Row of an argument or map table
    TableRow,
    /// Author-supplied C, spliced unchecked
    Raw,
}

/// Parameter list of a generated entry point
#[derive(Debug, Clone, PartialEq)]
pub enum EntryParams {
    /// One `mp_obj_t` per argument, `void` when empty
    Fixed(Vec<String>),
    /// Positional array, consumed directly
    Array,
    /// Positional array, parsed against an argument table
    ParsedArray,
    /// Positional array plus keyword map
    KeywordMap,
    /// Type constructor signature
    MakeNew,
}

impl fmt::Display for EntryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryParams::Fixed(names) if names.is_empty() => write!(f, "void"),
            EntryParams::Fixed(names) => {
                let params: Vec<String> = names.iter().map(|n| format!("mp_obj_t {}", n)).collect();
                write!(f, "{}", params.join(", "))
            }
            EntryParams::Array => write!(f, "size_t n_args, const mp_obj_t *args"),
            EntryParams::ParsedArray => write!(f, "size_t n_args, const mp_obj_t *pos_args"),
            EntryParams::KeywordMap => {
                write!(f, "size_t n_args, const mp_obj_t *pos_args, mp_map_t *kw_args")
            }
            EntryParams::MakeNew => write!(
                f,
                "const mp_obj_type_t *type, size_t n_args, size_t n_kw, const mp_obj_t *args"
            ),
        }
    }
}

/// Value side of a ROM map entry
#[derive(Debug, Clone, PartialEq)]
pub enum MapValue {
    /// Address of a C object
    Ptr(String),
    /// Interned string
    Qstr(String),
}

/// Generated C output fragments
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    // File structure
    Header {
        module: String,
        author: Option<String>,
        year: Option<u32>,
    },
    Include(String),
    If(String),
    EndIf(String),
    Blank,
    Comment(String),

    // Function units
    EntryBegin {
        name: String,
        params: EntryParams,
    },
    SlotEnum(Vec<String>),
    ArgTableBegin,
    ArgRow {
        name: String,
        required: bool,
        keyword_only: bool,
        kind: ArgKind,
        initializer: Option<String>,
    },
    ArgTableEnd,
    ArgParse {
        keywords: bool,
    },
    ArityCheck {
        min: usize,
        max: Option<usize>,
        keywords: bool,
    },
    Allocate {
        layout: String,
    },
    Placeholder(String),
    Raw(String),
    Return(String),
    BlockEnd,
    FunObject {
        object: String,
        entry: String,
        shape: CallShape,
    },

    // Class and module tables
    InstanceLayout {
        name: String,
    },
    MapBegin {
        name: String,
    },
    MapEntry {
        key: String,
        value: MapValue,
    },
    MapEnd,
    DictDefine {
        name: String,
        table: String,
    },
    TypeDefine {
        name: String,
        class: String,
        make_new: Option<String>,
        locals: Option<String>,
    },
    ModuleDefine {
        name: String,
        globals: String,
    },
    Register {
        module: String,
        object: String,
        flag: String,
    },
}

impl Fragment {
    pub fn kind(&self) -> FragmentKind {
        match self {
            Fragment::Header { .. } => FragmentKind::Header,
            Fragment::Include(_) | Fragment::If(_) | Fragment::EndIf(_) => FragmentKind::Directive,
            Fragment::SlotEnum(_)
            | Fragment::ArgTableBegin
            | Fragment::ArgTableEnd
            | Fragment::ArgParse { .. }
            | Fragment::ArityCheck { .. }
            | Fragment::Allocate { .. }
            | Fragment::Placeholder(_)
            | Fragment::Return(_) => FragmentKind::Statement,
            Fragment::ArgRow { .. } | Fragment::MapEntry { .. } => FragmentKind::TableRow,
            Fragment::Raw(_) => FragmentKind::Raw,
            _ => FragmentKind::Declaration,
        }
    }

    /// Nesting depth at which the fragment is placed
    pub fn depth(&self) -> usize {
        match (self.kind(), self) {
            (FragmentKind::TableRow, Fragment::ArgRow { .. }) => 2,
            (FragmentKind::Statement | FragmentKind::Raw | FragmentKind::TableRow, _) => 1,
            _ => 0,
        }
    }

    /// The fragment's C text as `(relative depth, line)` pairs
    pub fn lines(&self) -> Vec<(usize, String)> {
        match self {
            Fragment::Header { module, author, year } => {
                let mut lines = vec![
                    (0, "/*".to_string()),
                    (0, format!(" * Native bindings for the '{}' module.", block_comment_text(module))),
                ];
                let copyright = match (year, author) {
                    (Some(year), Some(author)) => Some(format!("{} {}", year, author)),
                    (Some(year), None) => Some(year.to_string()),
                    (None, Some(author)) => Some(author.clone()),
                    (None, None) => None,
                };
                if let Some(holder) = copyright {
                    lines.push((0, " *".to_string()));
                    lines.push((0, format!(" * Copyright (c) {}", block_comment_text(&holder))));
                }
                lines.push((0, " *".to_string()));
                lines.push((0, " * Generated by mpgen. Function bodies are placeholders.".to_string()));
                lines.push((0, " */".to_string()));
                lines
            }

            Fragment::InstanceLayout { name } => vec![
                (0, format!("typedef struct _{} {{", name)),
                (1, "mp_obj_base_t base;".to_string()),
                (0, format!("}} {};", name)),
            ],

            Fragment::ArgParse { keywords } => {
                let parse = if *keywords {
                    "mp_arg_parse_all(n_args, pos_args, kw_args, MP_ARRAY_SIZE(allowed_args), allowed_args, args);"
                } else {
                    "mp_arg_parse_all_kw_array(n_args, 0, pos_args, MP_ARRAY_SIZE(allowed_args), allowed_args, args);"
                };
                vec![
                    (0, "mp_arg_val_t args[MP_ARRAY_SIZE(allowed_args)];".to_string()),
                    (0, parse.to_string()),
                ]
            }

            Fragment::TypeDefine { name, class, make_new, locals } => {
                let mut fields = vec![name.clone(), qstr(class), "MP_TYPE_FLAG_NONE".to_string()];
                if let Some(make_new) = make_new {
                    fields.push(format!("make_new, {}", make_new));
                }
                if let Some(locals) = locals {
                    fields.push(format!("locals_dict, &{}", locals));
                }

                let last = fields.len() - 1;
                let mut lines = vec![(0, "MP_DEFINE_CONST_OBJ_TYPE(".to_string())];
                for (i, field) in fields.into_iter().enumerate() {
                    let sep = if i == last { "" } else { "," };
                    lines.push((1, format!("{}{}", field, sep)));
                }
                lines.push((0, ");".to_string()));
                lines
            }

            Fragment::ModuleDefine { name, globals } => vec![
                (0, format!("const mp_obj_module_t {} = {{", name)),
                (1, ".base = { &mp_type_module },".to_string()),
                (1, format!(".globals = (mp_obj_dict_t *)&{},", globals)),
                (0, "};".to_string()),
            ],

            single => vec![(0, single.to_string())],
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Include(header) => write!(f, "#include \"{}\"", header),
            Fragment::If(flag) => write!(f, "#if {}", flag),
            Fragment::EndIf(flag) => write!(f, "#endif // {}", flag),
            Fragment::Blank => Ok(()),
            Fragment::Comment(text) => write!(f, "// {}", text.replace('\n', " ")),

            Fragment::EntryBegin { name, params } => {
                write!(f, "static mp_obj_t {}({}) {{", name, params)
            }
            Fragment::SlotEnum(slots) => write!(f, "enum {{ {} }};", slots.join(", ")),
            Fragment::ArgTableBegin => write!(f, "static const mp_arg_t allowed_args[] = {{"),
            Fragment::ArgRow { name, required, keyword_only, kind, initializer } => {
                let mut flags = Vec::new();
                if *required {
                    flags.push("MP_ARG_REQUIRED");
                }
                if *keyword_only {
                    flags.push("MP_ARG_KW_ONLY");
                }
                flags.push(arg_kind_flag(*kind));

                write!(f, "{{ {}, {}", qstr(name), flags.join(" | "))?;
                if let Some(init) = initializer {
                    write!(f, ", {}", init)?;
                }
                write!(f, " }},")
            }
            Fragment::ArgTableEnd | Fragment::MapEnd => write!(f, "}};"),
            Fragment::ArityCheck { min, max, keywords } => {
                let max = match max {
                    Some(n) => n.to_string(),
                    None => "MP_OBJ_FUN_ARGS_MAX".to_string(),
                };
                write!(f, "mp_arg_check_num(n_args, n_kw, {}, {}, {});", min, max, keywords)
            }
            Fragment::Allocate { layout } => {
                write!(f, "{} *self = mp_obj_malloc({}, type);", layout, layout)
            }
            Fragment::Placeholder(what) => write!(
                f,
                "mp_raise_NotImplementedError(MP_ERROR_TEXT(\"{} is not implemented\"));",
                what
            ),
            Fragment::Raw(text) => write!(f, "{}", text),
            Fragment::Return(value) => write!(f, "return {};", value),
            Fragment::BlockEnd => write!(f, "}}"),
            Fragment::FunObject { object, entry, shape } => match shape {
                CallShape::Fixed(n) => {
                    write!(f, "static MP_DEFINE_CONST_FUN_OBJ_{}({}, {});", n, object, entry)
                }
                CallShape::VarBetween { min, max } => write!(
                    f,
                    "static MP_DEFINE_CONST_FUN_OBJ_VAR_BETWEEN({}, {}, {}, {});",
                    object, min, max, entry
                ),
                CallShape::VarArgs { min } => {
                    write!(f, "static MP_DEFINE_CONST_FUN_OBJ_VAR({}, {}, {});", object, min, entry)
                }
                CallShape::Keyword { min } => {
                    write!(f, "static MP_DEFINE_CONST_FUN_OBJ_KW({}, {}, {});", object, min, entry)
                }
            },

            Fragment::MapBegin { name } => {
                write!(f, "static const mp_rom_map_elem_t {}[] = {{", name)
            }
            Fragment::MapEntry { key, value } => {
                let value = match value {
                    MapValue::Ptr(target) => format!("MP_ROM_PTR(&{})", target),
                    MapValue::Qstr(name) => format!("MP_ROM_QSTR({})", qstr(name)),
                };
                write!(f, "{{ MP_ROM_QSTR({}), {} }},", qstr(key), value)
            }
            Fragment::DictDefine { name, table } => {
                write!(f, "static MP_DEFINE_CONST_DICT({}, {});", name, table)
            }
            Fragment::Register { module, object, flag } => {
                write!(f, "MP_REGISTER_MODULE({}, {}, {});", qstr(module), object, flag)
            }

            multi => {
                let lines: Vec<String> = multi
                    .lines()
                    .into_iter()
                    .map(|(depth, line)| format!("{}{}", "    ".repeat(depth), line))
                    .collect();
                write!(f, "{}", lines.join("\n"))
            }
        }
    }
}

/// Text that cannot open or close a `/* */` comment or break its line prefix
fn block_comment_text(text: &str) -> String {
    text.replace("*/", "* /").replace("/*", "/ *").replace(|c: char| c == '\r' || c == '\n', " ")
}

/// `mp_arg_t` flag for an argument kind
pub fn arg_kind_flag(kind: ArgKind) -> &'static str {
    match kind {
        ArgKind::Integer => "MP_ARG_INT",
        ArgKind::Boolean => "MP_ARG_BOOL",
        ArgKind::Object | ArgKind::NullableObject => "MP_ARG_OBJ",
    }
}
