//! Dictionary encoding of shredded string columns.
//!
//! Lines are cut into stripes. A stripe whose distinct share is at most
//! [`MAX_UNIQUE_PERCENT`] is dictionary-encoded: the lengths of the sorted
//! distinct strings go to `<file>.dict-len` and each line's sorted position to
//! `<file>.dict-data`. Other stripes are direct-encoded as one byte length per
//! line in `<file>.len`.
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_STRIPE_SIZE: usize = 1_000_000;
pub const MAX_UNIQUE_PERCENT: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Dictionary,
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripeReport {
    pub distinct: usize,
    pub lines: usize,
    pub encoding: Encoding,
}

impl StripeReport {
    pub fn unique_percent(&self) -> usize {
        self.distinct * 100 / self.lines
    }
}

impl fmt::Display for StripeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dictionary = {} of {} = {} ({:?})",
            self.distinct,
            self.lines,
            self.unique_percent(),
            self.encoding
        )
    }
}

/// Output files of one column, created on first write.
struct ColumnFiles {
    base: PathBuf,
    len: Option<BufWriter<File>>,
    dict_len: Option<BufWriter<File>>,
    dict_data: Option<BufWriter<File>>,
}

impl ColumnFiles {
    fn new(base: &Path) -> Self {
        Self { base: base.to_owned(), len: None, dict_len: None, dict_data: None }
    }

    fn open<'a>(
        slot: &'a mut Option<BufWriter<File>>,
        base: &Path,
        ext: &str,
    ) -> io::Result<&'a mut BufWriter<File>> {
        let out = match slot.take() {
            Some(out) => out,
            None => BufWriter::new(File::create(sibling(base, ext))?),
        };
        Ok(slot.insert(out))
    }

    fn finish(self) -> io::Result<()> {
        for mut out in [self.len, self.dict_len, self.dict_data].into_iter().flatten() {
            out.flush()?;
        }
        Ok(())
    }
}

/// `<base>.<ext>`, keeping whatever extension `base` already has.
pub fn sibling(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

#[derive(Default)]
struct Stripe {
    /// distinct line → id in first-seen order
    index: BTreeMap<String, usize>,
    lengths: Vec<usize>,
    data: Vec<usize>,
}

impl Stripe {
    fn add(&mut self, line: String) {
        let Stripe { index, lengths, data } = self;
        let next = lengths.len();
        let id = *index.entry(line).or_insert_with_key(|k| {
            lengths.push(k.len());
            next
        });
        data.push(id);
    }

    fn write(self, files: &mut ColumnFiles) -> io::Result<Option<StripeReport>> {
        let lines = self.data.len();
        if lines == 0 {
            return Ok(None);
        }
        let distinct = self.index.len();
        let encoding = if distinct * 100 / lines <= MAX_UNIQUE_PERCENT {
            // first-seen id → position in sorted order
            let mut translation = vec![0; distinct];
            let dict_len = ColumnFiles::open(&mut files.dict_len, &files.base, "dict-len")?;
            for (position, (s, id)) in self.index.iter().enumerate() {
                writeln!(dict_len, "{}", s.len())?;
                translation[*id] = position;
            }
            let dict_data = ColumnFiles::open(&mut files.dict_data, &files.base, "dict-data")?;
            for id in &self.data {
                writeln!(dict_data, "{}", translation[*id])?;
            }
            Encoding::Dictionary
        } else {
            let len = ColumnFiles::open(&mut files.len, &files.base, "len")?;
            for id in &self.data {
                writeln!(len, "{}", self.lengths[*id])?;
            }
            Encoding::Direct
        };
        Ok(Some(StripeReport { distinct, lines, encoding }))
    }
}

/// Encode one line-per-value file; output files sit next to it.
pub fn encode_file(path: &Path, stripe_size: usize) -> io::Result<Vec<StripeReport>> {
    let stripe_size = stripe_size.max(1);
    let reader = BufReader::new(File::open(path)?);
    let mut files = ColumnFiles::new(path);
    let mut reports = Vec::new();
    let mut stripe = Stripe::default();
    for line in reader.lines() {
        stripe.add(line?);
        if stripe.data.len() >= stripe_size {
            reports.extend(std::mem::take(&mut stripe).write(&mut files)?);
        }
    }
    reports.extend(stripe.write(&mut files)?);
    files.finish()?;
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn column(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("root.a.txt");
        fs::write(&path, body).unwrap();
        path
    }

    fn read(path: &Path, ext: &str) -> String {
        fs::read_to_string(sibling(path, ext)).unwrap()
    }

    #[test]
    fn repetitive_column_uses_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let path = column(dir.path(), "pear\nfig\npear\npear\n");
        let reports = encode_file(&path, DEFAULT_STRIPE_SIZE).unwrap();
        assert_eq!(
            reports,
            [StripeReport { distinct: 2, lines: 4, encoding: Encoding::Dictionary }]
        );
        // sorted: fig, pear
        assert_eq!(read(&path, "dict-len"), "3\n4\n");
        assert_eq!(read(&path, "dict-data"), "1\n0\n1\n1\n");
        assert!(!sibling(&path, "len").exists());
    }

    #[test]
    fn unique_column_is_direct() {
        let dir = tempfile::tempdir().unwrap();
        let path = column(dir.path(), "aa\nb\nccc\n");
        let reports = encode_file(&path, DEFAULT_STRIPE_SIZE).unwrap();
        assert_eq!(reports[0].encoding, Encoding::Direct);
        assert_eq!(reports[0].unique_percent(), 100);
        assert_eq!(read(&path, "len"), "2\n1\n3\n");
        assert!(!sibling(&path, "dict-len").exists());
    }

    #[test]
    fn stripes_decide_independently() {
        let dir = tempfile::tempdir().unwrap();
        let path = column(dir.path(), "x\nx\ny\nz\n");
        let reports = encode_file(&path, 2).unwrap();
        let encodings: Vec<_> = reports.iter().map(|r| r.encoding).collect();
        assert_eq!(encodings, [Encoding::Dictionary, Encoding::Direct]);
        assert_eq!(read(&path, "dict-len"), "1\n");
        assert_eq!(read(&path, "dict-data"), "0\n0\n");
        assert_eq!(read(&path, "len"), "1\n1\n");
    }

    #[test]
    fn empty_file_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = column(dir.path(), "");
        assert!(encode_file(&path, DEFAULT_STRIPE_SIZE).unwrap().is_empty());
        assert!(!sibling(&path, "len").exists());
    }

    #[test]
    fn report_line() {
        let r = StripeReport { distinct: 2, lines: 4, encoding: Encoding::Dictionary };
        assert_eq!(r.to_string(), "Dictionary = 2 of 4 = 50 (Dictionary)");
    }
}
