use crate::error::WavError;

/// Size of the canonical PCM WAV header.
pub const WAV_HEADER_LEN: usize = 44;

const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// Sample layout of a linear PCM buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Mono, 16-bit signed little-endian. This is what Gemini TTS returns.
    pub fn mono16(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
            bits_per_sample: 16,
        }
    }

    /// Checks the preconditions and returns `(block_align, byte_rate)`.
    fn derived(&self) -> Result<(u16, u32), WavError> {
        if self.sample_rate == 0 {
            return Err(WavError::ZeroSampleRate);
        }
        if self.channels == 0 {
            return Err(WavError::ZeroChannels);
        }
        if self.bits_per_sample == 0 || self.bits_per_sample % 8 != 0 {
            return Err(WavError::UnsupportedBitDepth(self.bits_per_sample));
        }

        let block_align = self
            .channels
            .checked_mul(self.bits_per_sample / 8)
            .ok_or_else(|| WavError::TooLarge(format!("block align of {:?}", self)))?;
        let byte_rate = self
            .sample_rate
            .checked_mul(block_align as u32)
            .ok_or_else(|| WavError::TooLarge(format!("byte rate of {:?}", self)))?;

        Ok((block_align, byte_rate))
    }
}

/// Wraps raw PCM bytes in a RIFF/WAVE container.
///
/// The buffer length is authoritative for both size fields: nothing is
/// padded or truncated, so a buffer holding a partial frame is rejected.
pub fn encode_wav(pcm: &[u8], format: WavFormat) -> Result<Vec<u8>, WavError> {
    let (block_align, byte_rate) = format.derived()?;

    if pcm.len() % block_align as usize != 0 {
        return Err(WavError::PartialFrame {
            len: pcm.len(),
            block_align,
        });
    }

    let data_len = u32::try_from(pcm.len())
        .ok()
        .filter(|len| *len <= u32::MAX - 36)
        .ok_or_else(|| WavError::TooLarge(format!("{} bytes of PCM", pcm.len())))?;

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    wav.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    wav.extend_from_slice(&format.channels.to_le_bytes());
    wav.extend_from_slice(&format.sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);

    Ok(wav)
}

/// Fields recovered from a canonical 44-byte header.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub format: WavFormat,
    pub riff_len: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub data_len: u32,
}

#[cfg(test)]
impl WavHeader {
    /// Reads back the header written by [`encode_wav`].
    pub fn parse(bytes: &[u8]) -> Result<Self, WavError> {
        if bytes.len() < WAV_HEADER_LEN {
            return Err(WavError::MalformedHeader("shorter than 44 bytes"));
        }
        if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(WavError::MalformedHeader("missing RIFF/WAVE tags"));
        }
        if &bytes[12..16] != b"fmt " || read_u32(bytes, 16) != FMT_CHUNK_LEN {
            return Err(WavError::MalformedHeader("fmt chunk is not 16-byte PCM"));
        }
        if read_u16(bytes, 20) != FORMAT_PCM {
            return Err(WavError::MalformedHeader("format code is not linear PCM"));
        }
        if &bytes[36..40] != b"data" {
            return Err(WavError::MalformedHeader("missing data tag"));
        }

        Ok(Self {
            format: WavFormat {
                channels: read_u16(bytes, 22),
                sample_rate: read_u32(bytes, 24),
                bits_per_sample: read_u16(bytes, 34),
            },
            riff_len: read_u32(bytes, 4),
            byte_rate: read_u32(bytes, 28),
            block_align: read_u16(bytes, 32),
            data_len: read_u32(bytes, 40),
        })
    }
}

#[cfg(test)]
fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[cfg(test)]
fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
