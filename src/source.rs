//! Record sources: literal paths, quoted globs, or `-` for stdin.
//!
//! Every source is a stream of concatenated JSON values (NDJSON is just the
//! newline-separated case), pulled one record at a time. Files ending in `.gz`
//! are decompressed on the fly.
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;
use serde_json::de::IoRead;
use serde_json::{StreamDeserializer, Value};

pub const STDIN: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin => f.write_str("<stdin>"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Source {
    pub fn open(&self) -> Result<Box<dyn BufRead>> {
        match self {
            Source::Stdin => Ok(Box::new(io::stdin().lock())),
            Source::File(path) => {
                let file = File::open(path)
                    .with_context(|| format!("failed to read source file {}", path.display()))?;
                if path.extension().is_some_and(|ext| ext == "gz") {
                    Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
                } else {
                    Ok(Box::new(BufReader::new(file)))
                }
            }
        }
    }

    pub fn records(&self) -> Result<Records> {
        let reader = self.open()?;
        Ok(Records {
            inner: serde_json::Deserializer::from_reader(reader).into_iter(),
            label: self.to_string(),
        })
    }
}

/// Pull-based record iterator; yields an error (and then stops) on malformed
/// JSON.
pub struct Records {
    inner: StreamDeserializer<'static, IoRead<Box<dyn BufRead>>, Value>,
    label: String,
}

impl Iterator for Records {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let label = &self.label;
        self.inner
            .next()
            .map(|record| record.with_context(|| format!("failed to parse JSON in {label}")))
    }
}

pub fn resolve_sources<I>(patterns: I) -> Result<Vec<Source>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<Source>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if pattern == STDIN {
            out.push(Source::Stdin);
        } else if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
                matched_any = true;
                out.push(Source::File(entry?));
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(Source::File(PathBuf::from(pattern)));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn concatenated_and_newline_separated_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.json");
        fs::write(&path, "{\"a\": 1} {\"a\": 2}\n[1,\n 2]\n\"tail\"").unwrap();

        let records: Vec<Value> = Source::File(path)
            .records()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[3], Value::String("tail".into()));
    }

    #[test]
    fn gzip_files_are_decompressed() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.json.gz");
        let mut gz = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        gz.write_all(b"{\"a\": 1}\n{\"a\": \"x\"}\n").unwrap();
        gz.finish().unwrap();

        let records: Vec<Value> = Source::File(path)
            .records()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records, [serde_json::json!({"a": 1}), serde_json::json!({"a": "x"})]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"a\": 1}\n{\"a\": }").unwrap();

        let mut records = Source::File(path).records().unwrap();
        assert!(records.next().unwrap().is_ok());
        let err = records.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("bad.json"), "{err}");
    }

    #[test]
    fn globs_stdin_and_literals() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "1").unwrap();
        fs::write(dir.path().join("b.json"), "2").unwrap();
        let glob = format!("{}/*.json", dir.path().display());

        let sources = resolve_sources([glob.as_str(), "-", "plain.json"]).unwrap();
        assert_eq!(sources.len(), 4);
        assert_eq!(sources[2], Source::Stdin);
        assert_eq!(sources[3], Source::File(PathBuf::from("plain.json")));
    }

    #[test]
    fn empty_glob_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let glob = format!("{}/*.nothing", dir.path().display());
        assert!(resolve_sources([glob]).is_err());
    }
}
