//! Captured standard output
//!
//! A snippet never writes to the process's stdout. Output built-ins append
//! to the [`CaptureBuffer`] the interpreter was constructed with, and the
//! caller decides what to do with the text once the run is over.
//!
//! The buffer holds raw bytes, as C's stdout does. Text is decoded once,
//! lossily, when it is read back.

use std::borrow::Cow;
use std::fmt;

/// In-memory stand-in for a program's stdout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureBuffer {
    bytes: Vec<u8>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        CaptureBuffer { bytes: Vec::new() }
    }

    /// Print without newline
    pub fn print(&mut self, text: &str) {
        self.bytes.extend_from_slice(text.as_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn put_byte(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Everything printed so far, invalid UTF-8 replaced with U+FFFD
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_string(self) -> String {
        match String::from_utf8(self.bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}

impl fmt::Write for CaptureBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_print_accumulates() {
        let mut out = CaptureBuffer::new();
        out.print("a");
        write!(out, "{}\n", 1).unwrap();
        out.put_byte(b'z');
        assert_eq!(out.text(), "a1\nz");
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_multibyte_sequences_survive_split_writes() {
        let mut out = CaptureBuffer::new();
        for byte in "é".bytes() {
            out.put_byte(byte);
        }
        assert_eq!(out.into_string(), "é");
    }

    #[test]
    fn test_invalid_bytes_decoded_lossily() {
        let mut out = CaptureBuffer::new();
        out.write_bytes(b"ok ");
        out.put_byte(200);
        assert_eq!(out.len(), 4);
        assert_eq!(out.into_string(), "ok \u{FFFD}");
    }
}
