//! WAV reading and writing for waveforms.
//!
//! Multi-channel files are mixed down to mono on read by averaging the
//! channels of each frame. Output is always mono.

use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::core::types::{Sample, Waveform};
use crate::error::{PitchError, Result};

/// Sample encoding used when writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavFormat {
    /// 16-bit signed PCM.
    #[default]
    Pcm16,
    /// 32-bit IEEE float.
    Float32,
}

impl WavFormat {
    fn spec(self, sample_rate: u32) -> WavSpec {
        let (bits_per_sample, sample_format) = match self {
            WavFormat::Pcm16 => (16, SampleFormat::Int),
            WavFormat::Float32 => (32, SampleFormat::Float),
        };
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample,
            sample_format,
        }
    }
}

/// Reads a WAV stream into a mono waveform.
pub fn read_wav<R: Read>(reader: R) -> Result<Waveform> {
    let mut reader = WavReader::new(reader)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(PitchError::InvalidFormat("WAV declares zero channels".to_string()));
    }

    let interleaved: Vec<Sample> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, bits @ 1..=32) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v as f64 * scale) as f32))
                .collect::<std::result::Result<_, _>>()?
        }
        (format, bits) => {
            return Err(PitchError::InvalidFormat(format!(
                "unsupported WAV sample format: {:?} with {} bits",
                format, bits
            )))
        }
    };

    let samples = downmix(&interleaved, spec.channels as usize);
    tracing::debug!(
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        frames = samples.len(),
        "read WAV"
    );
    Waveform::new(samples, spec.sample_rate)
}

/// Reads a WAV file from disk into a mono waveform.
pub fn read_wav_file<P: AsRef<Path>>(path: P) -> Result<Waveform> {
    let file = std::fs::File::open(path.as_ref())?;
    read_wav(std::io::BufReader::new(file))
}

/// Writes a waveform as a mono WAV stream.
///
/// Samples are clamped to [-1, 1] before integer encoding.
pub fn write_wav<W: Write + Seek>(writer: W, waveform: &Waveform, format: WavFormat) -> Result<()> {
    let mut writer = WavWriter::new(writer, format.spec(waveform.sample_rate()))?;
    match format {
        WavFormat::Pcm16 => {
            for &sample in waveform.samples() {
                let clamped = sample.clamp(-1.0, 1.0);
                writer.write_sample((clamped * 32767.0) as i16)?;
            }
        }
        WavFormat::Float32 => {
            for &sample in waveform.samples() {
                writer.write_sample(sample)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Encodes a waveform into an in-memory WAV file.
pub fn write_wav_bytes(waveform: &Waveform, format: WavFormat) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_wav(&mut cursor, waveform, format)?;
    Ok(cursor.into_inner())
}

/// Writes a waveform to a WAV file on disk.
pub fn write_wav_file<P: AsRef<Path>>(path: P, waveform: &Waveform, format: WavFormat) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_wav(std::io::BufWriter::new(file), waveform, format)?;
    tracing::debug!(path = %path.display(), samples = waveform.len(), "wrote WAV");
    Ok(())
}

/// Averages interleaved channels into one.
fn downmix(interleaved: &[Sample], channels: usize) -> Vec<Sample> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<Sample>() / channels as Sample)
        .collect()
}
