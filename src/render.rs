//! Hive-style text for a finished lattice node.
//!
//! Four views, all read-only over the node:
//! - `Display for Ty`: compact one-liner, `struct<a:int,b:array<string>>`.
//! - pretty: indented form used for the fields of a table declaration.
//! - [`table`]: `create table` declaration; needs a struct at the top.
//! - [`flat`]: one `path: type` line per leaf, rooted at `root`.
//!
//! An absent schema (no records) renders as `void` everywhere.
use std::fmt;

use crate::error::{InferError, Result};
use crate::inference::{StructC, Ty};

pub const INDENT: usize = 3;
pub const ROOT: &str = "root";

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Null => f.write_str("null"),
            Ty::Bool => f.write_str("boolean"),
            Ty::Int(r) => f.write_str(r.hive_name()),
            Ty::Float(r) => f.write_str(r.hive_name()),
            Ty::Str => f.write_str("string"),
            Ty::Binary => f.write_str("binary"),
            Ty::Timestamp => f.write_str("timestamp"),
            Ty::Struct(s) => {
                f.write_str("struct<")?;
                for (i, (name, ty)) in s.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{name}:{ty}")?;
                }
                f.write_str(">")
            }
            Ty::List(item) => write!(f, "array<{item}>"),
            Ty::Union(children) => {
                f.write_str("uniontype<")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(">")
            }
        }
    }
}

// -------------------------------- Pretty ---------------------------------- //

/// Indented form of one node; nested lines start at `margin`.
struct Pretty<'a> {
    ty: Option<&'a Ty>,
    margin: usize,
}

impl fmt::Display for Pretty<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pretty(f, self.ty, self.margin)
    }
}

fn write_pretty(f: &mut fmt::Formatter<'_>, ty: Option<&Ty>, margin: usize) -> fmt::Result {
    let Some(ty) = ty else {
        return f.write_str("void");
    };
    match ty {
        Ty::Struct(s) if s.fields.is_empty() => f.write_str("struct <>"),
        Ty::Struct(s) => {
            f.write_str("struct <\n")?;
            for (i, (name, field)) in s.fields.iter().enumerate() {
                if i > 0 {
                    f.write_str(",\n")?;
                }
                write!(f, "{:margin$}{name}: ", "")?;
                write_pretty(f, Some(field), margin + INDENT)?;
            }
            f.write_str(">")
        }
        Ty::List(item) => {
            f.write_str("array <")?;
            write_pretty(f, Some(item), margin + INDENT)?;
            f.write_str(">")
        }
        Ty::Union(children) => {
            f.write_str("uniontype <")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write_pretty(f, Some(child), margin + INDENT)?;
            }
            f.write_str(">")
        }
        scalar => write!(f, "{scalar}"),
    }
}

// -------------------------------- Table ----------------------------------- //

pub struct Table<'a> {
    schema: Option<&'a StructC>,
    name: &'a str,
}

/// Table view of the accumulated schema. Fails for a non-struct top level;
/// flat mode is the only way to print those.
pub fn table<'a>(ty: Option<&'a Ty>, name: &'a str) -> Result<Table<'a>> {
    let schema = match ty {
        None => None,
        Some(Ty::Struct(s)) => Some(s),
        Some(other) => return Err(InferError::NotAStruct { found: other.kind() }),
    };
    Ok(Table { schema, name })
}

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "create table {} (", self.name)?;
        let fields = self.schema.map(|s| &s.fields);
        for (i, (name, ty)) in fields.into_iter().flatten().enumerate() {
            if i > 0 {
                f.write_str(",\n")?;
            }
            let field = Pretty { ty: Some(ty), margin: 2 * INDENT };
            write!(f, "{:INDENT$}{name} {field}", "")?;
        }
        if fields.is_some_and(|m| !m.is_empty()) {
            f.write_str("\n")?;
        }
        f.write_str(")")
    }
}

// --------------------------------- Flat ----------------------------------- //

pub struct Flat<'a>(Option<&'a Ty>);

pub fn flat(ty: Option<&Ty>) -> Flat<'_> {
    Flat(ty)
}

impl Flat<'_> {
    /// `(path, leaf)` pairs in field order. Struct fields extend the path with
    /// `.name`, list elements with `.list`; unions and empty structs are leaves.
    pub fn leaves(&self) -> Vec<(String, &Ty)> {
        fn walk<'t>(path: String, ty: &'t Ty, out: &mut Vec<(String, &'t Ty)>) {
            match ty {
                Ty::Struct(s) if !s.fields.is_empty() => {
                    for (name, field) in &s.fields {
                        walk(format!("{path}.{name}"), field, out);
                    }
                }
                Ty::List(item) => walk(format!("{path}.list"), item, out),
                leaf => out.push((path, leaf)),
            }
        }
        let mut out = Vec::new();
        if let Some(ty) = self.0 {
            walk(ROOT.to_owned(), ty, &mut out);
        }
        out
    }
}

impl fmt::Display for Flat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_none() {
            return write!(f, "{ROOT}: void");
        }
        for (i, (path, ty)) in self.leaves().into_iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{path}: {ty}")?;
        }
        Ok(())
    }
}
