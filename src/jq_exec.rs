use anyhow::{anyhow, Context, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Compile `filter_src` once and run it over every input record; each jq
/// output is handed to `apply` as a fresh record.
///
/// A runtime error ends the outputs of that one record and reaches `apply` as
/// `Err`, so the caller decides between skipping and aborting. Input and
/// compile errors are returned directly.
pub fn run_jaq_each<I>(
    filter_src: &str,
    inputs: I,
    mut apply: impl FnMut(Result<Value>) -> Result<()>,
) -> Result<()>
where
    I: IntoIterator<Item = Result<Value>>,
{
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(format_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let rc_inputs = RcIter::new(core::iter::empty());
    for input in inputs {
        let input = input?;
        let mut it = filter.run((Ctx::new([], &rc_inputs), Val::from(input)));
        while let Some(item) = it.next() {
            let v = match item {
                Ok(v) => v,
                Err(e) => {
                    apply(Err(anyhow!(format!("jq: {e:?}"))))?; // stringify jaq error
                    break;
                }
            };
            // Val: Display -> JSON text; re-read so numbers keep their literal form
            let record = serde_json::from_str::<Value>(&format!("{v}"))
                .context("jq output is not valid JSON")?;
            apply(Ok(record))?;
        }
    }
    Ok(())
}

fn format_parse_errors(
    errs: Vec<(load::File<&str, ()>, load::Error<&str>)>,
) -> anyhow::Error {
    let mut s = String::new();
    for (file, err) in errs {
        s.push_str(&format!("parse error: {err:?} in `{}`\n", file.code));
    }
    anyhow::anyhow!(s)
}

fn format_undefined_errors(
    errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>,
) -> anyhow::Error {
    let mut s = String::new();
    for (file, list) in errs {
        for (name, undef) in list {
            s.push_str(&format!("undefined `{name}`: {undef:?} in `{}`\n", file.code));
        }
    }
    anyhow::anyhow!(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(filter: &str, inputs: Vec<Value>) -> Result<Vec<Value>> {
        let mut out = Vec::new();
        run_jaq_each(filter, inputs.into_iter().map(Ok), |v| {
            out.push(v?);
            Ok(())
        })?;
        Ok(out)
    }

    #[test]
    fn every_output_becomes_a_record() {
        let out = run(".items[]", vec![json!({"items": [1, 2]}), json!({"items": [3]})]).unwrap();
        assert_eq!(out, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn runtime_error_ends_only_that_record() {
        let inputs = [json!({"rows": [1]}), json!({}), json!({"rows": [2, 3]})];
        let mut seen = Vec::new();
        run_jaq_each(".rows[]", inputs.into_iter().map(Ok), |v| {
            seen.push(v.map_err(|e| e.to_string()));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], Ok(json!(1)));
        assert!(seen[1].as_ref().is_err_and(|e| e.starts_with("jq:")), "{:?}", seen[1]);
        assert_eq!(seen[2..], [Ok(json!(2)), Ok(json!(3))]);
    }

    #[test]
    fn bad_filter_is_reported() {
        assert!(run(".[", vec![json!(1)]).is_err());
        assert!(run("no_such_function", vec![json!(1)]).is_err());
    }
}
