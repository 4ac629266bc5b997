//! Byte-offset field access for the delimiter-free GHCN layouts.

use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub(crate) enum FieldError {
    #[error("field '{name}' at columns {start}..{end} is cut off, line has {len} bytes")]
    Truncated {
        name: &'static str,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("field '{name}' at column {start} is not valid text")]
    NotText { name: &'static str, start: usize },

    #[error("field '{name}' holds '{value}', expected a number")]
    NotNumeric { name: &'static str, value: String },
}

/// One physical line of a fixed-width file, with a trailing carriage return removed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedWidthLine<'a> {
    bytes: &'a [u8],
}

impl<'a> FixedWidthLine<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        Self { bytes }
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.bytes.iter().all(u8::is_ascii_whitespace)
    }

    /// The trimmed text of a field that must be fully present on the line.
    pub(crate) fn text(
        &self,
        name: &'static str,
        start: usize,
        width: usize,
    ) -> Result<&'a str, FieldError> {
        let end = start + width;
        let raw = self.bytes.get(start..end).ok_or(FieldError::Truncated {
            name,
            start,
            end,
            len: self.bytes.len(),
        })?;
        Self::decode(name, start, raw)
    }

    /// Like [`Self::text`], but a field running past the end of the line is clipped, and a
    /// field starting beyond it is empty. Publishers strip trailing blanks from lines whose
    /// last columns are unused.
    pub(crate) fn text_or_empty(
        &self,
        name: &'static str,
        start: usize,
        width: usize,
    ) -> Result<&'a str, FieldError> {
        let len = self.bytes.len();
        if start >= len {
            return Ok("");
        }
        Self::decode(name, start, &self.bytes[start..(start + width).min(len)])
    }

    pub(crate) fn number<T: FromStr>(
        &self,
        name: &'static str,
        start: usize,
        width: usize,
    ) -> Result<T, FieldError> {
        let text = self.text(name, start, width)?;
        text.parse().map_err(|_| FieldError::NotNumeric {
            name,
            value: text.to_string(),
        })
    }

    /// A single-character code; blank yields `None`.
    pub(crate) fn flag(&self, name: &'static str, start: usize) -> Result<Option<char>, FieldError> {
        Ok(self.text(name, start, 1)?.chars().next())
    }

    fn decode(name: &'static str, start: usize, raw: &'a [u8]) -> Result<&'a str, FieldError> {
        std::str::from_utf8(raw)
            .map(str::trim)
            .map_err(|_| FieldError::NotText { name, start })
    }
}
