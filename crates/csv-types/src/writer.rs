//! Record writer over any `io::Write` sink.

use crate::escape::encode_record;
use std::io::{self, Write};

/// Writes encoded CSV records to a sink.
///
/// Each record is encoded in full before it touches the sink, so a failed
/// write never leaves half of a record behind from this writer's side.
/// I/O errors are returned unchanged.
pub struct CsvRecordWriter<W: Write> {
    inner: W,
    records_written: u64,
}

impl<W: Write> CsvRecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            records_written: 0,
        }
    }

    /// Write one record. An empty field list writes nothing and returns `false`.
    pub fn write_record<I, S>(&mut self, fields: I) -> io::Result<bool>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let Some(line) = encode_record(fields) else {
            return Ok(false);
        };
        self.inner.write_all(line.as_bytes())?;
        self.records_written += 1;
        Ok(true)
    }

    /// Number of records written so far, header included.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_all(records: &[Vec<&str>]) -> String {
        let mut writer = CsvRecordWriter::new(Vec::new());
        for record in records {
            writer
                .write_record(record.iter().map(|f| Some(*f)))
                .unwrap();
        }
        String::from_utf8(writer.into_inner()).unwrap()
    }

    fn read_back(data: &str) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_bytes());
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    fn assert_round_trip(records: Vec<Vec<&str>>) {
        let data = write_all(&records);
        let loaded = read_back(&data);
        assert_eq!(loaded.len(), records.len());
        for (expected, actual) in records.iter().zip(loaded.iter()) {
            assert_eq!(expected, actual);
        }
    }

    #[test]
    fn test_plain_fields_round_trip() {
        assert_round_trip(vec![
            vec!["hello", "world", "123"],
            vec!["with space", "leading ", " trailing"],
        ]);
    }

    #[test]
    fn test_separators_and_line_breaks_round_trip() {
        assert_round_trip(vec![
            vec!["a,b,c", "simple", "field"],
            vec!["line\nbreak", "multi\nline\nfield", "ok"],
        ]);
    }

    #[test]
    fn test_quotes_round_trip() {
        assert_round_trip(vec![
            vec!["with space", "nothing", "13.455"],
            vec!["with\nnew line", " with a \"quote\"", "\""],
            vec![
                "with\nnew \"line\"",
                "random,separator,",
                "   with,\n\"all the,,,stuff \n\n  \"",
            ],
        ]);
    }

    #[test]
    fn test_absent_fields_are_empty() {
        let mut writer = CsvRecordWriter::new(Vec::new());
        writer
            .write_record([Some("a"), None::<&str>, Some("c")])
            .unwrap();
        assert_eq!(writer.get_ref().as_slice(), b"a,,c\n");
    }

    #[test]
    fn test_empty_record_writes_nothing() {
        let mut writer = CsvRecordWriter::new(Vec::new());
        let written = writer.write_record(Vec::<Option<String>>::new()).unwrap();
        assert!(!written);
        assert_eq!(writer.records_written(), 0);
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn test_sink_error_propagates() {
        struct FailingSink;

        impl Write for FailingSink {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("disk full"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut writer = CsvRecordWriter::new(FailingSink);
        let err = writer.write_record([Some("a")]).unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(writer.records_written(), 0);
    }
}
