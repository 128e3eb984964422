//! Canonicalization of tool-descriptor type expressions.
//!
//! Descriptors spell types in five shapes: bare strings (`File`), strings
//! with `?`/`[]` suffixes, alternative lists containing `'null'`, enum and
//! array wrapper objects, and record objects (alone or in a union).
//! `normalize` folds all of them into one closed sum type. Unrecognized
//! shapes degrade to `Any` rather than failing, so a descriptor another
//! tool can still interpret never stops compilation.

use serde_json::Value;

/// Canonical type shape. The variants correspond to the mutually exclusive
/// array/enum/record classifications; `Any` is the unconstrained type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    Any,
    /// Base type name: `File`, `Directory`, `string`, `int`, `float`, ...
    Primitive(String),
    /// Array with the item's base type name.
    Array(String),
    Enum(Vec<String>),
    /// Record alternatives retained verbatim (mutually exclusive
    /// parameter groups).
    Record(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedType {
    pub nullable: bool,
    pub shape: TypeShape,
}

impl NormalizedType {
    pub fn any() -> Self {
        NormalizedType {
            nullable: false,
            shape: TypeShape::Any,
        }
    }

    pub fn is_file_like(&self) -> bool {
        matches!(&self.shape, TypeShape::Primitive(b) | TypeShape::Array(b)
            if b == "File" || b == "Directory")
    }

    pub fn is_array(&self) -> bool {
        matches!(self.shape, TypeShape::Array(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self.shape, TypeShape::Record(_))
    }

    /// Base type name ignoring nullable/array markers. `None` for enum,
    /// record, and `Any`.
    pub fn base_type(&self) -> Option<&str> {
        match &self.shape {
            TypeShape::Primitive(b) | TypeShape::Array(b) => Some(b),
            _ => None,
        }
    }

    /// Render back to the CWL short form (`File`, `File[]`, `string?`,
    /// `File[]?`). Enum and record shapes have no short form and render
    /// as `Any`.
    pub fn short_form(&self) -> String {
        let core = match &self.shape {
            TypeShape::Primitive(b) => b.clone(),
            TypeShape::Array(item) => format!("{}[]", item),
            TypeShape::Any | TypeShape::Enum(_) | TypeShape::Record(_) => "Any".to_string(),
        };
        if self.nullable {
            format!("{}?", core)
        } else {
            core
        }
    }
}

/// Parse a CWL short-form type string.
pub fn parse_short(s: &str) -> NormalizedType {
    let mut rest = s.trim();
    let mut nullable = false;

    if let Some(stripped) = rest.strip_suffix('?') {
        nullable = true;
        rest = stripped;
    }

    if rest == "null" {
        return NormalizedType {
            nullable: true,
            shape: TypeShape::Any,
        };
    }

    let shape = if let Some(item) = rest.strip_suffix("[]") {
        TypeShape::Array(item.to_string())
    } else if rest == "Any" || rest.is_empty() {
        TypeShape::Any
    } else {
        TypeShape::Primitive(rest.to_string())
    };

    NormalizedType { nullable, shape }
}

/// Normalize a raw descriptor type expression into its canonical shape.
pub fn normalize(raw: &Value) -> NormalizedType {
    match raw {
        Value::String(s) => parse_short(s),
        Value::Array(alts) => normalize_alternatives(alts),
        Value::Object(obj) => normalize_object(obj),
        _ => NormalizedType::any(),
    }
}

fn normalize_alternatives(alts: &[Value]) -> NormalizedType {
    let nullable = alts
        .iter()
        .any(|v| matches!(v, Value::String(s) if s == "null"));

    let remaining: Vec<&Value> = alts
        .iter()
        .filter(|v| !matches!(v, Value::String(s) if s == "null"))
        .collect();

    let records: Vec<Value> = remaining
        .iter()
        .filter(|v| is_record_object(v))
        .map(|v| (*v).clone())
        .collect();

    // Any record alternative classifies the whole union as a record type;
    // all record alternatives are retained.
    if !records.is_empty() {
        return NormalizedType {
            nullable,
            shape: TypeShape::Record(records),
        };
    }

    match remaining.as_slice() {
        [] => NormalizedType {
            nullable,
            shape: TypeShape::Any,
        },
        [single] => {
            let mut inner = normalize(single);
            inner.nullable |= nullable;
            inner
        }
        // More than one non-record alternative: unconstrained.
        _ => NormalizedType {
            nullable,
            shape: TypeShape::Any,
        },
    }
}

fn normalize_object(obj: &serde_json::Map<String, Value>) -> NormalizedType {
    match obj.get("type").and_then(Value::as_str) {
        Some("enum") => {
            let symbols = obj
                .get("symbols")
                .and_then(Value::as_array)
                .map(|a| {
                    a.iter()
                        .filter_map(Value::as_str)
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();
            NormalizedType {
                nullable: false,
                shape: TypeShape::Enum(symbols),
            }
        }
        Some("array") => {
            let item = match obj.get("items") {
                Some(Value::String(s)) => parse_short(s)
                    .base_type()
                    .unwrap_or("Any")
                    .to_string(),
                _ => "Any".to_string(),
            };
            NormalizedType {
                nullable: false,
                shape: TypeShape::Array(item),
            }
        }
        Some("record") => NormalizedType {
            nullable: false,
            shape: TypeShape::Record(vec![Value::Object(obj.clone())]),
        },
        _ => NormalizedType::any(),
    }
}

/// Wrap a short-form type in an array: `File` -> `File[]`.
pub fn array_wrap(short: &str) -> String {
    format!("{}[]", short)
}

/// Make a short-form type nullable: `string` -> `string?`.
pub fn nullable_wrap(short: &str) -> String {
    if short.ends_with('?') {
        short.to_string()
    } else {
        format!("{}?", short)
    }
}

pub fn is_file_like(short: &str) -> bool {
    parse_short(short).is_file_like()
}

fn is_record_object(v: &Value) -> bool {
    v.as_object()
        .and_then(|o| o.get("type"))
        .and_then(Value::as_str)
        == Some("record")
}
