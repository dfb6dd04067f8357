//! Type lattice, value classifier and join (⊔).
//!
//! Stream JSON records in, classify each one into a lattice node with
//! [`observe_value`], and fold the nodes with [`join`] into a single schema.
//!
//! Lattice shape:
//! - `Null` is bottom and disappears into whatever it meets.
//! - Integer ⊑ FloatingPoint, Binary ⊑ String; numeric ranges widen on join.
//! - Structs join key-wise, lists join element-wise.
//! - Anything else becomes a `Union` holding one child per family.
//!
//! Join is associative, commutative and idempotent up to structural equality,
//! and union children are kept in kind order, so the rendered schema does not
//! depend on record order either.
pub mod arr;
pub mod num;
pub mod obj;
pub mod str;
pub mod union;

use std::fmt;

use serde_json::Value;

pub use num::{FloatRange, IntRange};
pub use obj::StructC;

use crate::error::Result;

// ------------------------------ Lattice ----------------------------------- //

/// Discriminant of a [`Ty`]. Declaration order is the canonical order of
/// union children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Integer,
    FloatingPoint,
    String,
    Binary,
    Timestamp,
    Struct,
    List,
    Union,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::FloatingPoint => "floating point",
            Kind::String => "string",
            Kind::Binary => "binary",
            Kind::Timestamp => "timestamp",
            Kind::Struct => "struct",
            Kind::List => "list",
            Kind::Union => "union",
        })
    }
}

/// One lattice node. Nodes are plain owned values: [`join`] consumes both
/// sides and hands back the result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ty {
    Null,
    Bool,
    Int(IntRange),
    Float(FloatRange),
    Str,
    Binary,
    Timestamp,
    Struct(StructC),
    List(Box<Ty>),
    /// ≥ 2 children, one per family, sorted by [`Kind`]; never holds `Null`
    /// or another `Union`.
    Union(Vec<Ty>),
}

impl Ty {
    pub fn kind(&self) -> Kind {
        match self {
            Ty::Null => Kind::Null,
            Ty::Bool => Kind::Boolean,
            Ty::Int(_) => Kind::Integer,
            Ty::Float(_) => Kind::FloatingPoint,
            Ty::Str => Kind::String,
            Ty::Binary => Kind::Binary,
            Ty::Timestamp => Kind::Timestamp,
            Ty::Struct(_) => Kind::Struct,
            Ty::List(_) => Kind::List,
            Ty::Union(_) => Kind::Union,
        }
    }

    pub fn as_struct(&self) -> Option<&StructC> {
        match self {
            Ty::Struct(s) => Some(s),
            _ => None,
        }
    }
}

// ------------------------------ Observe ---------------------------------- //

/// Classify one JSON value on its own, no history involved.
///
/// Fails only on numeric literals the lattice cannot hold; nothing partial is
/// ever returned.
pub fn observe_value(v: &Value) -> Result<Ty> {
    match v {
        Value::Null => Ok(Ty::Null),
        Value::Bool(_) => Ok(Ty::Bool),
        // arbitrary_precision keeps the literal text intact
        Value::Number(n) => num::observe_number(&n.to_string()),
        Value::String(s) => Ok(str::observe_string(s)),
        Value::Array(xs) => arr::observe_array(xs),
        Value::Object(m) => StructC::observe(m).map(Ty::Struct),
    }
}

// -------------------------------- Join (⊔) -------------------------------- //

pub fn join(a: Ty, b: Ty) -> Ty {
    match (a, b) {
        (Ty::Int(x), Ty::Int(y)) => Ty::Int(IntRange::join(x, y)),
        (Ty::Float(x), Ty::Float(y)) => Ty::Float(FloatRange::join(x, y)),
        (Ty::Int(i), Ty::Float(f)) | (Ty::Float(f), Ty::Int(i)) => Ty::Float(f.widen(i)),
        (Ty::Str, Ty::Binary) | (Ty::Binary, Ty::Str) => Ty::Str,
        (Ty::Null, x) | (x, Ty::Null) => x,
        (Ty::Struct(x), Ty::Struct(y)) => Ty::Struct(StructC::join(x, y)),
        (Ty::List(x), Ty::List(y)) => Ty::List(arr::join_items(x, y)),
        (Ty::Union(x), Ty::Union(y)) => Ty::Union(union::join_unions(x, y)),
        (Ty::Union(mut children), x) | (x, Ty::Union(mut children)) => {
            union::insert_child(&mut children, x);
            Ty::Union(children)
        }
        // payload-free kinds: Bool, Str, Binary, Timestamp
        (a, b) if a.kind() == b.kind() => a,
        (a, b) => union::pair(a, b),
    }
}

/// Join where `None` means "nothing observed yet".
pub fn join_opt(a: Option<Ty>, b: Option<Ty>) -> Option<Ty> {
    match (a, b) {
        (None, x) | (x, None) => x,
        (Some(a), Some(b)) => Some(join(a, b)),
    }
}

// ------------------------------- Front API -------------------------------- //

/// Running accumulator for one record stream (or one partition of it).
#[derive(Clone, Debug, Default)]
pub struct Inference {
    state: Option<Ty>,
    records: u64,
}

impl Inference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify and fold one record. On error the accumulator is untouched,
    /// so the caller may skip the record and carry on.
    pub fn observe_value(&mut self, v: &Value) -> Result<()> {
        let obs = observe_value(v)?;
        self.state = join_opt(self.state.take(), Some(obs));
        self.records += 1;
        Ok(())
    }

    /// Fold another partition's accumulator into this one.
    pub fn combine(self, other: Self) -> Self {
        Self {
            state: join_opt(self.state, other.state),
            records: self.records + other.records,
        }
    }

    /// Number of records folded in.
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn schema(&self) -> Option<&Ty> {
        self.state.as_ref()
    }

    pub fn into_schema(self) -> Option<Ty> {
        self.state
    }
}

pub fn infer_from_values<'a, I>(values: I) -> Result<Option<Ty>>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut st = Inference::new();
    for v in values {
        st.observe_value(v)?;
    }
    Ok(st.into_schema())
}

// ------------------------------- Tests ------------------------------------ //
