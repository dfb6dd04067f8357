//! Column shredding: every scalar of every record goes to the text file of its
//! path (`root.a.list.b.txt`), one value per line.
//!
//! Nulls are dropped, arrays add a `.list` segment, object keys add `.<key>`.
//! Files open on first use and stay in first-seen order.
//!
//! Keys are percent-escaped (`%`, `/`, `\`, NUL) so every column stays a
//! single file inside the output directory. In string values `\`, newline and
//! carriage return are backslash-escaped, one value per line.
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde_json::Value;

use crate::render::ROOT;

pub struct Shredder {
    dir: PathBuf,
    files: IndexMap<String, BufWriter<File>>,
}

impl Shredder {
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, files: IndexMap::new() })
    }

    pub fn shred(&mut self, record: &Value) -> io::Result<()> {
        self.shred_at(ROOT, record)
    }

    fn shred_at(&mut self, path: &str, v: &Value) -> io::Result<()> {
        match v {
            Value::Null => Ok(()),
            Value::Bool(b) => self.emit(path, if *b { "true" } else { "false" }),
            Value::Number(n) => self.emit(path, &n.to_string()),
            Value::String(s) => self.emit(path, &escape_line(s)),
            Value::Array(xs) => {
                let child = format!("{path}.list");
                for x in xs {
                    self.shred_at(&child, x)?;
                }
                Ok(())
            }
            Value::Object(m) => {
                for (k, x) in m {
                    self.shred_at(&format!("{path}.{}", escape_key(k)), x)?;
                }
                Ok(())
            }
        }
    }

    fn emit(&mut self, path: &str, line: &str) -> io::Result<()> {
        let out = match self.files.entry(path.to_owned()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let file = File::create(column_file(&self.dir, path))?;
                e.insert(BufWriter::new(file))
            }
        };
        writeln!(out, "{line}")
    }

    /// Flush everything; returns the files written, in first-seen order.
    pub fn finish(self) -> io::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());
        for (path, mut out) in self.files {
            out.flush()?;
            written.push(column_file(&self.dir, &path));
        }
        Ok(written)
    }
}

fn escape_key(key: &str) -> Cow<'_, str> {
    if !key.contains(['%', '/', '\\', '\0']) {
        return Cow::Borrowed(key);
    }
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '\\' => out.push_str("%5C"),
            '\0' => out.push_str("%00"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn escape_line(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', '\n', '\r']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn column_file(dir: &Path, path: &str) -> PathBuf {
    dir.join(format!("{path}.txt"))
}
