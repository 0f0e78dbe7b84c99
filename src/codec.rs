use crate::error::Error;
use bytes::{Bytes, BytesMut};
use compression_codecs::{EncodeV2, gzip::GzipEncoder};
use compression_core::Level;
use compression_core::util::{PartialBuffer, WriteBuffer};
use std::io;

const OUTPUT_BUFFER_SIZE: usize = 8 * 1024; // 8KB scratch buffer

/// Default gzip compression level.
pub const DEFAULT_LEVEL: u32 = 6;

/// Lowest accepted gzip compression level (stored blocks, no compression).
pub const MIN_LEVEL: u32 = 0;

/// Highest accepted gzip compression level.
pub const MAX_LEVEL: u32 = 9;

/// Content-Encoding token for gzip.
pub const GZIP: &str = "gzip";

/// Returns whether an Accept-Encoding value mentions gzip.
pub fn accepts_gzip(accept_encoding: &[u8]) -> bool {
    accept_encoding
        .windows(GZIP.len())
        .any(|w| w == GZIP.as_bytes())
}

/// A gzip encoder at a fixed compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gzip {
    level: u32,
}

impl Gzip {
    /// Creates a gzip codec, rejecting levels outside `0..=9`.
    pub fn new(level: u32) -> Result<Self, Error> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            return Err(Error::InvalidLevel(level));
        }
        Ok(Self { level })
    }

    /// The configured compression level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Drains `chunks` through a fresh encoder and returns the whole gzip stream.
    pub fn compress<I>(&self, chunks: I) -> Result<Bytes, Error>
    where
        I: IntoIterator<Item = Bytes>,
    {
        let mut encoder = GzipEncoder::new(Level::Precise(self.level as i32).into());
        let mut scratch = vec![0u8; OUTPUT_BUFFER_SIZE];
        let mut compressed = BytesMut::new();

        for chunk in chunks {
            encode_chunk(&mut encoder, &chunk, &mut scratch, &mut compressed)?;
        }

        loop {
            let mut output = WriteBuffer::new_initialized(scratch.as_mut_slice());
            let done = encoder.finish(&mut output).map_err(Error::Compression)?;
            let written = output.written_len();
            compressed.extend_from_slice(&scratch[..written]);
            if done {
                break;
            }
        }

        Ok(compressed.freeze())
    }
}

impl Default for Gzip {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
        }
    }
}

/// Feeds one chunk to the encoder, collecting whatever output it produces.
fn encode_chunk<E: EncodeV2 + ?Sized>(
    encoder: &mut E,
    input: &[u8],
    scratch: &mut [u8],
    compressed: &mut BytesMut,
) -> Result<(), Error> {
    let mut input_buf = PartialBuffer::new(input);

    // Keep encoding until all input is consumed
    while input_buf.written_len() < input.len() {
        let mut output = WriteBuffer::new_initialized(&mut *scratch);
        let before = input_buf.written_len();

        encoder
            .encode(&mut input_buf, &mut output)
            .map_err(Error::Compression)?;

        let written = output.written_len();
        compressed.extend_from_slice(&scratch[..written]);

        if written == 0 && input_buf.written_len() == before {
            return Err(Error::Compression(io::Error::other(format!(
                "encoder stalled with {} of {} input bytes unconsumed",
                input.len() - before,
                input.len()
            ))));
        }
    }

    Ok(())
}
