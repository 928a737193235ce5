use crate::error::RunError;

use std::{fmt, fs, ops::Range, path::Path};

/// Newline-delimited records, stored contiguously.
///
/// The whole input is kept in a single buffer and each record is a range of
/// it. Records are never modified once loaded.
#[derive(Clone, Default)]
pub struct Records {
    data: Vec<u8>,
    spans: Vec<Range<usize>>,
}

impl Records {
    /// Reads the file at `path` and splits it into records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RunError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| RunError::io(path, e))?;
        Ok(Self::from_bytes(data))
    }

    /// Splits `data` on `\n`.
    ///
    /// A `\r` before the newline is not part of the record. A last line
    /// without a newline is still a record, while a trailing newline does not
    /// start an empty one.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let mut spans = Vec::new();
        let mut start = 0;

        for (i, &byte) in data.iter().enumerate() {
            if byte == b'\n' {
                spans.push(line_span(&data, start, i));
                start = i + 1;
            }
        }
        if start < data.len() {
            spans.push(line_span(&data, start, data.len()));
        }

        Self { data, spans }
    }

    /// Builds records from in-memory lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut data = Vec::new();
        let mut spans = Vec::new();
        for line in lines {
            let start = data.len();
            data.extend_from_slice(line.as_ref());
            spans.push(start..data.len());
        }
        Self { data, spans }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.spans.get(index).map(|span| &self.data[span.clone()])
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.spans.iter().map(|span| &self.data[span.clone()])
    }

    /// Returns a view of every record, ready to be handed to
    /// [`dispatch`](./fn.dispatch.html).
    pub fn views(&self) -> Vec<&[u8]> {
        self.iter().collect()
    }
}

fn line_span(data: &[u8], start: usize, end: usize) -> Range<usize> {
    if end > start && data[end - 1] == b'\r' {
        start..end - 1
    } else {
        start..end
    }
}

impl fmt::Debug for Records {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(String::from_utf8_lossy))
            .finish()
    }
}
