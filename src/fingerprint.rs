//! Content fingerprinting for deduplication.
//!
//! A fingerprint is two independent streaming xxHash64 values over the full
//! byte content, concatenated into a fixed-width 32-hex-character string.
//! It is a speed-oriented identity for multi-gigabyte streams, not a
//! security primitive.

use std::hash::Hasher;
use std::io::Read;
use twox_hash::XxHash64;

const SEED_HIGH: u64 = 0;
const SEED_LOW: u64 = 1;

/// Reader wrapper that fingerprints every byte flowing through it.
///
/// Bytes are passed to the downstream consumer unaltered; both hash
/// accumulators are updated on every read path. The fingerprint is only
/// final once the underlying stream has been fully consumed.
pub struct FingerprintingReader<R> {
    inner: R,
    high: XxHash64,
    low: XxHash64,
}

impl<R: Read> FingerprintingReader<R> {
    /// Wraps a byte source.
    pub fn new(inner: R) -> Self {
        FingerprintingReader {
            inner,
            high: XxHash64::with_seed(SEED_HIGH),
            low: XxHash64::with_seed(SEED_LOW),
        }
    }

    /// Returns the fingerprint of all bytes read so far.
    ///
    /// Idempotent: calling this multiple times after end-of-stream yields
    /// the same value. Call only after the stream is fully consumed if the
    /// result is meant to identify the whole content.
    pub fn fingerprint(&self) -> String {
        format!("{:016x}{:016x}", self.high.finish(), self.low.finish())
    }
}

impl<R: Read> Read for FingerprintingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let bytes_read = self.inner.read(buf)?;
        if bytes_read > 0 {
            self.high.write(&buf[..bytes_read]);
            self.low.write(&buf[..bytes_read]);
        }
        Ok(bytes_read)
    }
}

/// Fingerprints a byte slice already held in memory.
///
/// Produces the same value the streaming wrapper would for the same bytes.
pub fn fingerprint_bytes(data: &[u8]) -> String {
    let mut high = XxHash64::with_seed(SEED_HIGH);
    let mut low = XxHash64::with_seed(SEED_LOW);
    high.write(data);
    low.write(data);
    format!("{:016x}{:016x}", high.finish(), low.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_fingerprint_is_32_hex_chars() {
        let fp = fingerprint_bytes(b"hello");
        assert_eq!(fp.len(), 32);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_streaming_matches_buffered() {
        let data = b"Reference,AccountNumber,Description,Start Balance,Mutation,End Balance\n";

        let mut reader = FingerprintingReader::new(Cursor::new(data.to_vec()));
        let mut sink = Vec::new();
        reader.read_to_end(&mut sink).unwrap();

        assert_eq!(sink, data);
        assert_eq!(reader.fingerprint(), fingerprint_bytes(data));
    }

    #[test]
    fn test_fingerprint_is_idempotent() {
        let mut reader = FingerprintingReader::new(Cursor::new(b"abc".to_vec()));
        let mut sink = Vec::new();
        reader.read_to_end(&mut sink).unwrap();

        let first = reader.fingerprint();
        let second = reader.fingerprint();
        assert_eq!(first, second);
    }

    #[test]
    fn test_small_reads_match_single_read() {
        let data = b"some statement content split across many reads";

        let mut reader = FingerprintingReader::new(Cursor::new(data.to_vec()));
        let mut buf = [0u8; 3];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
        }

        assert_eq!(reader.fingerprint(), fingerprint_bytes(data));
    }

    #[test]
    fn test_distinct_content_distinct_fingerprint() {
        assert_ne!(fingerprint_bytes(b"a"), fingerprint_bytes(b"b"));
    }

    #[test]
    fn test_empty_input_has_stable_fingerprint() {
        assert_eq!(fingerprint_bytes(b""), fingerprint_bytes(b""));
        assert_eq!(fingerprint_bytes(b"").len(), 32);
    }
}
