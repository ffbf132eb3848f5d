//! Artifact record codec.
//!
//! An artifact is a headerless stream of records, each laid out as
//!
//! ```text
//! key_len: u16 LE | key: key_len bytes of UTF-8 | count: u64 LE
//! ```
//!
//! Every mapper and reducer links this module, so the layout is the same
//! for every producer and consumer in a run.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const LEN_WIDTH: usize = 2;
const COUNT_WIDTH: usize = 8;

pub struct RecordWriter<W> {
    inner: W,
    path: PathBuf,
    offset: u64,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W, path: impl AsRef<Path>) -> Self {
        Self {
            inner,
            path: path.as_ref().to_path_buf(),
            offset: 0,
        }
    }

    pub fn write_record(&mut self, key: &str, count: u64) -> Result<()> {
        let klen = u16::try_from(key.len())
            .map_err(|_| {
                Error::format(&self.path, self.offset, format!("key of {} bytes", key.len()))
            })?;
        self.put(&klen.to_le_bytes())?;
        self.put(key.as_bytes())?;
        self.put(&count.to_le_bytes())
    }

    pub fn finish(mut self) -> Result<W> {
        self.inner
            .flush()
            .map_err(|e| Error::io(&self.path, e))?;
        Ok(self.inner)
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner
            .write_all(bytes)
            .map_err(|e| Error::io(&self.path, e))?;
        self.offset += bytes.len() as u64;
        Ok(())
    }
}

pub struct RecordReader<R> {
    inner: R,
    path: PathBuf,
    offset: u64,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R, path: impl AsRef<Path>) -> Self {
        Self {
            inner,
            path: path.as_ref().to_path_buf(),
            offset: 0,
        }
    }

    /// Returns `Ok(None)` on a clean end of stream at a record boundary.
    pub fn next_record(&mut self) -> Result<Option<(String, u64)>> {
        let start = self.offset;

        let mut len_buf = [0u8; LEN_WIDTH];
        match self.fill(&mut len_buf)? {
            0 => return Ok(None),
            LEN_WIDTH => {}
            _ => return Err(self.truncated(start)),
        }
        let klen = u16::from_le_bytes(len_buf) as usize;

        let mut key_buf = vec![0u8; klen];
        if self.fill(&mut key_buf)? != klen {
            return Err(self.truncated(start));
        }

        let mut count_buf = [0u8; COUNT_WIDTH];
        if self.fill(&mut count_buf)? != COUNT_WIDTH {
            return Err(self.truncated(start));
        }

        let key = String::from_utf8(key_buf)
            .map_err(|e| Error::format(&self.path, start, format!("key is not UTF-8: {e}")))?;
        Ok(Some((key, u64::from_le_bytes(count_buf))))
    }

    /// Reads until `buf` is full or the stream ends; returns bytes read.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut read = 0;
        while read < buf.len() {
            match self.inner.read(&mut buf[read..]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io(&self.path, e)),
            }
        }
        self.offset += read as u64;
        Ok(read)
    }

    fn truncated(&self, start: u64) -> Error {
        Error::format(&self.path, start, "truncated record")
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<(String, u64)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(records: &[(&str, u64)]) -> Vec<u8> {
        let mut w = RecordWriter::new(Vec::new(), "mem");
        for (k, c) in records {
            w.write_record(k, *c).unwrap();
        }
        w.finish().unwrap()
    }

    #[test]
    fn record_layout_is_length_prefixed() {
        let bytes = encode(&[("10.0.0.1", 3)]);
        assert_eq!(&bytes[..2], &8u16.to_le_bytes());
        assert_eq!(&bytes[2..10], b"10.0.0.1");
        assert_eq!(&bytes[10..], &3u64.to_le_bytes());
    }

    #[test]
    fn reads_back_every_record() {
        let bytes = encode(&[("a", 1), ("", 0), ("192.168.1.1", u64::MAX)]);
        let records: Vec<_> = RecordReader::new(bytes.as_slice(), "mem")
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            records,
            vec![
                ("a".to_string(), 1),
                ("".to_string(), 0),
                ("192.168.1.1".to_string(), u64::MAX)
            ]
        );
    }

    #[test]
    fn empty_stream_has_no_records() {
        let mut r = RecordReader::new(&[0u8; 0][..], "mem");
        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn truncation_is_a_format_error() {
        let bytes = encode(&[("10.0.0.1", 3), ("10.0.0.2", 4)]);
        assert_eq!(bytes.len(), 36);
        // inside the length prefix, the key and the count of the second record
        for cut in [19, 23, 35] {
            let mut r = RecordReader::new(&bytes[..cut], "mem");
            assert!(r.next_record().unwrap().is_some());
            match r.next_record() {
                Err(Error::Format { offset, .. }) => assert_eq!(offset, 18),
                other => panic!("expected format error, got {other:?}"),
            }
        }
    }

    #[test]
    fn overlong_key_reports_its_record_offset() {
        let mut w = RecordWriter::new(Vec::new(), "mem");
        w.write_record("10.0.0.1", 1).unwrap();
        let key = "k".repeat(usize::from(u16::MAX) + 1);
        match w.write_record(&key, 1) {
            Err(Error::Format { offset, .. }) => assert_eq!(offset, 18),
            other => panic!("expected format error, got {other:?}"),
        }
        // nothing of the rejected record was written
        assert_eq!(w.finish().unwrap().len(), 18);
    }

    #[test]
    fn non_utf8_key_is_a_format_error() {
        let mut bytes = 2u16.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(&1u64.to_le_bytes());
        let mut r = RecordReader::new(bytes.as_slice(), "mem");
        assert!(matches!(r.next_record(), Err(Error::Format { .. })));
    }
}
