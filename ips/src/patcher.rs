//! Copy-then-overlay patch application
//!
//! The original file is copied into the output sink first, then each
//! decoded record is written over it at its declared offset.

use std::io::{self, Read, Seek, SeekFrom, Write};
use tracing::debug;

use crate::{RecordReader, Result};

/// Applies an IPS patch to an original file, producing the patched
/// result in a caller-provided seekable sink.
pub struct Patcher<P: Read, F: Read> {
    patch: P,
    file: F,
}

impl<P: Read, F: Read> Patcher<P, F> {
    /// Pair a patch stream with the original file. No I/O happens
    /// until [`apply`](Self::apply) runs.
    pub fn new(patch: P, file: F) -> Self {
        Self { patch, file }
    }

    /// Write the patched file into `output`.
    ///
    /// Copies the original byte for byte, then applies each record in
    /// stream order; later records overwrite earlier overlapping ones.
    /// Offsets are not checked against the original's length, so a
    /// record past end-of-file grows the output. Returns the total
    /// bytes written by records, not counting the initial copy. On
    /// error the sink is left partially written and the count is not
    /// reported.
    pub fn apply<W: Write + Seek>(mut self, output: &mut W) -> Result<u64> {
        let copied = io::copy(&mut self.file, output)?;
        debug!("Copied {copied} original bytes, applying records");

        let mut written = 0u64;
        let mut reader = RecordReader::new(self.patch);
        reader.records(true, |record| {
            output.seek(SeekFrom::Start(u64::from(record.offset)))?;
            output.write_all(record.data)?;
            written += record.data.len() as u64;
            Ok(())
        })?;

        debug!("Patch applied: {written} bytes written");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Cursor;

    fn apply(patch: Vec<u8>, original: Vec<u8>) -> Result<(Vec<u8>, u64)> {
        let mut output = Cursor::new(Vec::new());
        let written = Patcher::new(Cursor::new(patch), Cursor::new(original)).apply(&mut output)?;
        Ok((output.into_inner(), written))
    }

    #[test]
    fn test_literal_record_over_zero_file() {
        // PATCH + offset 0x000010 + size 3 + AA BB CC + EOF
        let mut patch = b"PATCH".to_vec();
        patch.extend_from_slice(&[0x00, 0x00, 0x10, 0x00, 0x03, 0xAA, 0xBB, 0xCC]);
        patch.extend_from_slice(b"EOF");

        let (result, written) = apply(patch, vec![0; 32]).unwrap();
        assert_eq!(written, 3);
        assert_eq!(result.len(), 32);
        assert_eq!(&result[16..19], &[0xAA, 0xBB, 0xCC]);
        assert!(result[..16].iter().all(|&b| b == 0));
        assert!(result[19..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rle_record() {
        // PATCH + offset 0x000005 + size 0 + run 4 + fill 0x7F + EOF
        let mut patch = b"PATCH".to_vec();
        patch.extend_from_slice(&[0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x04, 0x7F]);
        patch.extend_from_slice(b"EOF");

        let (result, written) = apply(patch, vec![0x11; 9]).unwrap();
        assert_eq!(written, 4);
        assert_eq!(&result[5..9], &[0x7F; 4]);
        assert_eq!(&result[..5], &[0x11; 5]);
    }

    #[test]
    fn test_zero_record_patch_copies_file() {
        let mut patch = b"PATCH".to_vec();
        patch.extend_from_slice(b"EOF");

        let original = vec![0xAB; 64];
        let (result, written) = apply(patch, original.clone()).unwrap();
        assert_eq!(written, 0);
        assert_eq!(result, original);
    }

    #[test]
    fn test_record_grows_output() {
        let mut patch = b"PATCH".to_vec();
        patch.extend_from_slice(&[0x00, 0x00, 0x08, 0x00, 0x02, 0xDE, 0xAD]);
        patch.extend_from_slice(b"EOF");

        let (result, written) = apply(patch, vec![0x22; 4]).unwrap();
        assert_eq!(written, 2);
        assert_eq!(result.len(), 10);
        assert_eq!(&result[..4], &[0x22; 4]);
        // Gap between old EOF and the record offset is zero filler.
        assert_eq!(&result[4..8], &[0, 0, 0, 0]);
        assert_eq!(&result[8..], &[0xDE, 0xAD]);
    }

    #[test]
    fn test_later_record_wins_overlap() {
        let mut patch = b"PATCH".to_vec();
        patch.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x03, 0x01, 0x01, 0x01]);
        patch.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x02, 0x02, 0x02]);
        patch.extend_from_slice(b"EOF");

        let (result, written) = apply(patch, vec![0; 4]).unwrap();
        assert_eq!(written, 5);
        assert_eq!(result, vec![0x01, 0x02, 0x02, 0]);
    }

    #[test]
    fn test_bad_magic_fails() {
        let err = apply(b"BOGUS".to_vec(), vec![0; 8]).unwrap_err();
        assert!(matches!(err, Error::InvalidMagic(_)));
    }
}
