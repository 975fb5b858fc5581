//! IPS record stream decoding
//!
//! An IPS patch is a 5-byte `PATCH` magic, a sequence of records, and
//! a 3-byte `EOF` terminator. Each record is a 24-bit big-endian
//! offset and a 16-bit big-endian size, followed by `size` literal
//! payload bytes. A zero size instead marks an RLE record: a 16-bit
//! run length and a single fill byte.

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io::{ErrorKind, Read};
use tracing::trace;

use crate::{EOF_MARKER, Error, MAGIC, Result};

/// One decoded IPS record: `data` written verbatim at `offset`.
///
/// The payload borrows the reader's decode buffer, so a record is only
/// valid for the duration of the handler call it is passed to. Clone
/// the data inside the handler to keep it.
#[derive(Debug, PartialEq, Eq)]
pub struct Record<'a> {
    /// Target write offset, 24 bits on the wire (0..=16_777_215).
    pub offset: u32,
    /// Bytes to write at `offset`.
    pub data: &'a [u8],
}

/// Streaming decoder for an IPS patch.
pub struct RecordReader<R: Read> {
    patch: R,
}

impl<R: Read> RecordReader<R> {
    /// Create a reader over a raw patch stream. No bytes are consumed
    /// until [`records`](Self::records) runs.
    pub fn new(patch: R) -> Self {
        Self { patch }
    }

    /// Validate the 5-byte magic.
    ///
    /// A stream that ends before 5 bytes counts as an invalid magic,
    /// not an I/O error.
    fn check_magic(&mut self) -> Result<()> {
        let mut magic = [0u8; 5];
        let mut filled = 0;
        while filled < magic.len() {
            match self.patch.read(&mut magic[filled..]) {
                Ok(0) => return Err(Error::InvalidMagic(magic)),
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        if magic == MAGIC {
            Ok(())
        } else {
            Err(Error::InvalidMagic(magic))
        }
    }

    /// Decode every record in the stream, invoking `handle` for each.
    ///
    /// With `reuse_buffer` set, successive records decode into one
    /// shared scratch buffer, avoiding a fresh allocation per record;
    /// with it unset every record gets its own allocation. Either way
    /// the payload borrow ends with the handler call.
    ///
    /// Decoding stops at the `EOF` terminator. A short read anywhere
    /// after the magic surfaces as [`Error::Io`], and the handler is
    /// never invoked for a partial record. An error returned by the
    /// handler aborts decoding and propagates.
    pub fn records<F>(&mut self, reuse_buffer: bool, mut handle: F) -> Result<()>
    where
        F: FnMut(Record<'_>) -> Result<()>,
    {
        self.check_magic()?;

        let mut scratch = Vec::new();

        loop {
            let mut hdr = [0u8; 3];
            self.patch.read_exact(&mut hdr)?;
            if hdr == EOF_MARKER {
                return Ok(());
            }
            let offset = BigEndian::read_u24(&hdr);
            let size = self.patch.read_u16::<BigEndian>()?;

            let mut fresh = Vec::new();
            let data = if reuse_buffer { &mut scratch } else { &mut fresh };

            if size == 0 {
                // RLE record: 16-bit run length, then the fill byte.
                let mut run = [0u8; 3];
                self.patch.read_exact(&mut run)?;
                let run_length = usize::from(BigEndian::read_u16(&run[..2]));
                data.clear();
                data.resize(run_length, run[2]);
                trace!("RLE record: offset={offset}, length={run_length}, fill={:#04x}", run[2]);
            } else {
                data.clear();
                data.resize(usize::from(size), 0);
                self.patch.read_exact(data)?;
                trace!("Literal record: offset={offset}, length={size}");
            }

            handle(Record { offset, data: &data[..] })?;
        }
    }
}
