use serde_json::Value;

use super::Ty;
use crate::error::Result;

/// Fold every element into one element type; `[]` contributes `Null`, which
/// the first non-null element of any later array absorbs.
pub(super) fn observe_array(xs: &[Value]) -> Result<Ty> {
    let mut item: Option<Ty> = None;
    for el in xs {
        item = super::join_opt(item, Some(super::observe_value(el)?));
    }
    Ok(Ty::List(Box::new(item.unwrap_or(Ty::Null))))
}

pub(super) fn join_items(a: Box<Ty>, b: Box<Ty>) -> Box<Ty> {
    Box::new(super::join(*a, *b))
}
