//! CLI: infer → (table | flat), plus the shred/dict column tools
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::dict;
use crate::inference::Inference;
use crate::render;
use crate::shred::Shredder;
use crate::source::{resolve_sources, Source};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer a Hive schema from a stream of JSON records, or shred records into per-path columns
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// infer and print a `create table` declaration (or the flat path listing)
    Infer(InferOut),
    /// flatten every record into one text file per leaf path
    Shred(ShredOut),
    /// dictionary-encode shredded column files
    Dict(DictOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select a subnode in each record (e.g. /data/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each record; every output is a record.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct InferOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// print every leaf as `root.path: type` instead of a table declaration
    #[arg(long)]
    flat: bool,

    /// table name used in the declaration
    #[arg(long, default_value = "tbl")]
    table_name: String,

    /// also print the key sets observed on top-level records
    #[arg(long)]
    shapes: bool,

    /// skip records with out-of-range numbers or a failing jq filter instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// worker threads for multi-file input (defaults to one per core)
    #[arg(long)]
    jobs: Option<usize>,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ShredOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// directory receiving one `<path>.txt` file per leaf path
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(clap::Parser, Debug)]
struct DictOut {
    /// shredded column files (literal paths or quoted glob patterns)
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// lines per independently encoded stripe
    #[arg(long, default_value_t = dict::DEFAULT_STRIPE_SIZE)]
    stripe_size: usize,
}

/// Per-partition result of folding one source.
#[derive(Debug, Default)]
struct Fold {
    inference: Inference,
    read: u64,
    skipped: u64,
}

impl Fold {
    fn combine(self, other: Self) -> Self {
        debug!(left = self.read, right = other.read, "combining partitions");
        Self {
            inference: self.inference.combine(other.inference),
            read: self.read + other.read,
            skipped: self.skipped + other.skipped,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Stream the records of one source through the pointer and jq stages.
    /// `apply` sees `Err` only for a record the jq filter failed on.
    fn load_process(
        &self,
        source: &Source,
        mut apply: impl FnMut(Result<Value>) -> Result<()>,
    ) -> Result<()> {
        info!("reading {source}");
        let pointer = self.json_pointer.as_deref();
        let selected = source.records()?.filter_map(move |record| match (record, pointer) {
            (Err(error), _) => Some(Err(error)),
            (Ok(value), None) => Some(Ok(value)),
            (Ok(mut value), Some(pointer)) => {
                let hit = value.pointer_mut(pointer).map(Value::take);
                if hit.is_none() {
                    debug!(pointer, "pointer did not resolve, record skipped");
                }
                hit.map(Ok)
            }
        });
        match self.jq_expr.as_deref() {
            None => {
                for value in selected {
                    apply(Ok(value?))?;
                }
                Ok(())
            }
            Some(jq_expr) => crate::jq_exec::run_jaq_each(jq_expr, selected, apply)
                .with_context(|| format!("failed to apply jq expression to {source}")),
        }
    }

    fn fold(&self, source: &Source, skip_invalid: bool) -> Result<Fold> {
        let mut fold = Fold::default();
        self.load_process(source, |value| {
            fold.read += 1;
            let observed = value.and_then(|value| Ok(fold.inference.observe_value(&value)?));
            match observed {
                Ok(()) => Ok(()),
                Err(error) if skip_invalid => {
                    warn!(record = fold.read, "{source}: skipping record: {error}");
                    fold.skipped += 1;
                    Ok(())
                }
                Err(error) => Err(error).with_context(|| format!("{source}: record {}", fold.read)),
            }
        })?;
        Ok(fold)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Infer(target) => {
                let text = target.run()?;
                write_output(target.out.as_deref(), &text)
            }
            Command::Shred(target) => target.run(),
            Command::Dict(target) => target.run(),
        }
    }
}

impl InferOut {
    fn run(&self) -> Result<String> {
        let sources = resolve_sources(&self.input_settings.input)?;

        // 1) fold every source as its own partition, then combine in input order
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .build()?;
        let fold = pool.install(|| {
            sources
                .par_iter()
                .map(|source| self.input_settings.fold(source, self.skip_invalid))
                .try_reduce(Fold::default, |a, b| Ok(a.combine(b)))
        })?;
        if fold.skipped > 0 {
            warn!("skipped {} of {} records", fold.skipped, fold.read);
        }

        // 2) render
        let schema = fold.inference.schema();
        let mut text = format!("{} records read\n\n", fold.read);
        if self.flat {
            writeln!(text, "{}", render::flat(schema))?;
        } else {
            writeln!(text, "{}", render::table(schema, &self.table_name)?)?;
        }

        // 3) diagnostics
        if self.shapes {
            match schema.and_then(|ty| ty.as_struct()) {
                Some(s) => {
                    writeln!(text, "\n{} shapes at {}:", s.shapes.len(), render::ROOT)?;
                    for shape in &s.shapes {
                        writeln!(text, "{:w$}{}", "", shape.join(","), w = render::INDENT)?;
                    }
                }
                None => writeln!(text, "\nno struct at {}", render::ROOT)?,
            }
        }
        Ok(text)
    }
}

impl ShredOut {
    fn run(&self) -> Result<()> {
        let sources = resolve_sources(&self.input_settings.input)?;
        let mut shredder = Shredder::new(&self.out_dir)
            .with_context(|| format!("failed to create {}", self.out_dir.display()))?;
        let mut read = 0u64;
        for source in &sources {
            self.input_settings.load_process(source, |value| {
                read += 1;
                let value = value.with_context(|| format!("record {read} of {source}"))?;
                shredder
                    .shred(&value)
                    .with_context(|| format!("failed to shred record {read} of {source}"))
            })?;
        }
        let written = shredder.finish()?;
        info!("wrote {} column files to {}", written.len(), self.out_dir.display());
        println!("{read} records read");
        Ok(())
    }
}

impl DictOut {
    fn run(&self) -> Result<()> {
        for source in resolve_sources(&self.input)? {
            let Source::File(path) = source else {
                bail!("dict writes its output next to each input file; stdin is not supported");
            };
            info!("processing {}", path.display());
            let reports = dict::encode_file(&path, self.stripe_size)
                .with_context(|| format!("failed to encode {}", path.display()))?;
            for report in reports {
                println!("{}: {report}", path.display());
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            print!("{text}");
            Ok(())
        }
    }
}
