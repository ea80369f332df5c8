//! Audio file decoding.
//!
//! WAV, FLAC and Ogg Vorbis go through their dedicated decoders (`hound`,
//! `claxon`, `lewton`); everything else is probed by symphonia. The container
//! is recognised from its magic bytes, so a mislabelled extension still
//! decodes. Output is always mono at the requested engine rate.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::DecodeError;
use crate::resample::resample_mono;
use crate::types::AudioSignal;

/// Extensions offered in the file picker filter.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg", "m4a", "mp4", "aac"];

/// File picker pattern, e.g. `*.wav *.mp3 *.flac ...`.
pub fn file_filter_pattern() -> String {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| format!("*.{ext}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Source of decoded audio. The session holds one of these so that the
/// decode path can be swapped out or observed.
pub trait AudioDecoder {
    fn decode(&self, path: &Path) -> Result<AudioSignal, DecodeError>;
}

/// Decodes files from the local filesystem and resamples them to `target_rate`.
#[derive(Clone, Debug)]
pub struct FileDecoder {
    pub target_rate: u32,
}

impl FileDecoder {
    pub fn new(target_rate: u32) -> Self {
        Self { target_rate }
    }
}

impl AudioDecoder for FileDecoder {
    fn decode(&self, path: &Path) -> Result<AudioSignal, DecodeError> {
        decode_file(path, self.target_rate)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Container {
    Wav,
    Flac,
    Ogg,
    Other,
}

fn sniff(header: &[u8]) -> Container {
    if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WAVE" {
        Container::Wav
    } else if header.starts_with(b"fLaC") {
        Container::Flac
    } else if header.starts_with(b"OggS") {
        Container::Ogg
    } else {
        Container::Other
    }
}

/// Interleaved samples straight out of a codec.
struct Decoded {
    interleaved: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

/// Decode `path`, mix down to mono and resample to `target_rate`.
pub fn decode_file(path: &Path, target_rate: u32) -> Result<AudioSignal, DecodeError> {
    let open_err = |source| DecodeError::Open {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(open_err)?;
    let mut header = [0u8; 12];
    let n = read_header(&mut file, &mut header).map_err(open_err)?;
    file.seek(SeekFrom::Start(0)).map_err(open_err)?;

    let container = sniff(&header[..n]);
    log::debug!("decoding {} as {:?}", path.display(), container);

    let decoded = match container {
        Container::Wav => decode_wav(path, file)?,
        Container::Flac => decode_flac(path, file)?,
        Container::Ogg => match decode_vorbis(path, file) {
            Ok(d) => d,
            Err(e) => {
                // Ogg can carry codecs other than Vorbis.
                log::debug!("lewton rejected {}: {e}; probing with symphonia", path.display());
                decode_symphonia(path, File::open(path).map_err(open_err)?)?
            }
        },
        Container::Other => decode_symphonia(path, file)?,
    };

    if decoded.sample_rate == 0 {
        return Err(DecodeError::Corrupt {
            path: path.to_path_buf(),
            reason: "sample rate is zero".into(),
        });
    }

    let mono = mix_to_mono(&decoded.interleaved, decoded.channels as usize);
    if mono.is_empty() {
        return Err(DecodeError::NoAudio {
            path: path.to_path_buf(),
        });
    }

    let samples = resample_mono(&mono, decoded.sample_rate, target_rate)?;
    log::debug!(
        "decoded {}: {} ch @ {} Hz -> {} mono samples @ {} Hz",
        path.display(),
        decoded.channels,
        decoded.sample_rate,
        samples.len(),
        target_rate
    );

    Ok(AudioSignal {
        samples: samples.into(),
        sample_rate: target_rate,
        source_channels: decoded.channels,
        source_sample_rate: decoded.sample_rate,
    })
}

/// Fill as much of `buf` as the file allows.
fn read_header(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Average interleaved frames into a single channel.
pub fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn corrupt(path: &Path, reason: impl ToString) -> DecodeError {
    DecodeError::Corrupt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn unsupported(path: &Path) -> DecodeError {
    DecodeError::UnsupportedFormat {
        path: path.to_path_buf(),
    }
}

fn from_hound(path: &Path, e: hound::Error) -> DecodeError {
    match e {
        hound::Error::IoError(source) => DecodeError::Open {
            path: path.to_path_buf(),
            source,
        },
        hound::Error::Unsupported => unsupported(path),
        other => corrupt(path, other),
    }
}

fn from_claxon(path: &Path, e: claxon::Error) -> DecodeError {
    match e {
        claxon::Error::IoError(source) => DecodeError::Open {
            path: path.to_path_buf(),
            source,
        },
        claxon::Error::Unsupported(_) => unsupported(path),
        other => corrupt(path, other),
    }
}

fn decode_wav(path: &Path, file: File) -> Result<Decoded, DecodeError> {
    let reader = hound::WavReader::new(BufReader::new(file)).map_err(|e| from_hound(path, e))?;
    let spec = reader.spec();

    let interleaved = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>(),
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<Vec<_>, _>>()
        }
    }
    .map_err(|e| from_hound(path, e))?;

    Ok(Decoded {
        interleaved,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}

fn decode_flac(path: &Path, file: File) -> Result<Decoded, DecodeError> {
    let mut reader =
        claxon::FlacReader::new(BufReader::new(file)).map_err(|e| from_claxon(path, e))?;
    let info = reader.streaminfo();
    let scale = 1.0 / (1i64 << (info.bits_per_sample.max(1) - 1)) as f32;

    let interleaved = reader
        .samples()
        .map(|s| s.map(|v| v as f32 * scale))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| from_claxon(path, e))?;

    Ok(Decoded {
        interleaved,
        channels: info.channels as u16,
        sample_rate: info.sample_rate,
    })
}

fn decode_vorbis(path: &Path, file: File) -> Result<Decoded, DecodeError> {
    let mut reader = lewton::inside_ogg::OggStreamReader::new(BufReader::new(file))
        .map_err(|e| corrupt(path, e))?;
    let channels = reader.ident_hdr.audio_channels as u16;
    let sample_rate = reader.ident_hdr.audio_sample_rate;

    let mut interleaved = Vec::new();
    while let Some(packet) = reader.read_dec_packet_itl().map_err(|e| corrupt(path, e))? {
        interleaved.extend(packet.iter().map(|&s| s as f32 / 32768.0));
    }

    Ok(Decoded {
        interleaved,
        channels,
        sample_rate,
    })
}

fn decode_symphonia(path: &Path, file: File) -> Result<Decoded, DecodeError> {
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|_| unsupported(path))?;
    let mut format = probed.format;

    let track = format.default_track().ok_or_else(|| unsupported(path))?.clone();
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| corrupt(path, "unknown sample rate"))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|_| unsupported(path))?;

    let mut interleaved = Vec::new();
    let mut channels = track.codec_params.channels.map(|c| c.count() as u16);

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(corrupt(path, e)),
        };

        if packet.track_id() != track.id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Skip damaged packets, keep the rest of the stream.
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(corrupt(path, e)),
        };

        let spec = *decoded.spec();
        channels.get_or_insert(spec.channels.count() as u16);

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(sample_buf.samples());
    }

    Ok(Decoded {
        interleaved,
        channels: channels.unwrap_or(1),
        sample_rate,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn sniffs_magic_bytes() {
        assert_eq!(sniff(b"RIFF\0\0\0\0WAVE"), Container::Wav);
        assert_eq!(sniff(b"fLaC\0\0\0\0"), Container::Flac);
        assert_eq!(sniff(b"OggS\0"), Container::Ogg);
        assert_eq!(sniff(b"ID3\x04"), Container::Other);
        assert_eq!(sniff(b""), Container::Other);
    }

    #[test]
    fn mixes_stereo_to_mono() {
        let mono = mix_to_mono(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2);
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn decodes_wav_at_engine_rate() {
        let path = temp_path("decode-native.wav");
        write_wav(&path, &sine(440.0, 22_050, 0.5), 22_050, 2);

        let signal = decode_file(&path, 22_050).unwrap();
        assert_eq!(signal.sample_rate, 22_050);
        assert_eq!(signal.source_channels, 2);
        assert_eq!(signal.samples.len(), 11_025);
        let peak = signal.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.5).abs() < 0.01, "peak {peak}");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn resamples_to_engine_rate() {
        let path = temp_path("decode-44k.wav");
        write_wav(&path, &sine(440.0, 44_100, 1.0), 44_100, 1);

        let signal = decode_file(&path, 22_050).unwrap();
        assert_eq!(signal.sample_rate, 22_050);
        assert_eq!(signal.source_sample_rate, 44_100);
        assert_eq!(signal.samples.len(), 22_050);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = decode_file(Path::new("/nonexistent/sonogram/missing.wav"), 22_050).unwrap_err();
        assert!(matches!(err, DecodeError::Open { .. }), "{err:?}");
    }

    #[test]
    fn garbage_is_unsupported() {
        let path = temp_path("garbage.bin");
        std::fs::write(&path, b"this is definitely not audio, just some text bytes").unwrap();

        let err = decode_file(&path, 22_050).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat { .. }), "{err:?}");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn empty_wav_has_no_audio() {
        let path = temp_path("empty.wav");
        write_wav(&path, &[], 22_050, 1);

        let err = decode_file(&path, 22_050).unwrap_err();
        assert!(matches!(err, DecodeError::NoAudio { .. }), "{err:?}");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn float_and_int_wav_agree() {
        let samples = sine(440.0, 22_050, 0.25);
        let int_path = temp_path("agree-int.wav");
        let float_path = temp_path("agree-float.wav");
        write_wav(&int_path, &samples, 22_050, 1);

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&float_path, spec).unwrap();
        for &s in &samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let a = decode_file(&int_path, 22_050).unwrap();
        let b = decode_file(&float_path, 22_050).unwrap();
        assert_eq!(a.samples.len(), b.samples.len());
        let max_diff = a
            .samples
            .iter()
            .zip(b.samples.iter())
            .fold(0.0f32, |m, (x, y)| m.max((x - y).abs()));
        assert!(max_diff < 1e-3, "max diff {max_diff}");

        std::fs::remove_file(&int_path).ok();
        std::fs::remove_file(&float_path).ok();
    }

    /// Single BOS+EOS Ogg page around `packet`.
    fn ogg_page(packet: &[u8]) -> Vec<u8> {
        let mut page = b"OggS".to_vec();
        page.extend_from_slice(&[0, 0x06]);
        page.extend_from_slice(&0u64.to_le_bytes());
        page.extend_from_slice(&0x1234u32.to_le_bytes());
        page.extend_from_slice(&0u32.to_le_bytes());
        page.extend_from_slice(&[0; 4]);
        page.push(1);
        page.push(packet.len() as u8);
        page.extend_from_slice(packet);

        let mut crc = 0u32;
        for &b in &page {
            crc ^= (b as u32) << 24;
            for _ in 0..8 {
                crc = if crc & 0x8000_0000 != 0 { (crc << 1) ^ 0x04c1_1db7 } else { crc << 1 };
            }
        }
        page[22..26].copy_from_slice(&crc.to_le_bytes());
        page
    }

    #[test]
    fn ogg_without_vorbis_is_rejected() {
        let path = temp_path("not-vorbis.ogg");
        std::fs::write(&path, ogg_page(b"\x7fUNKNOWNcodec header")).unwrap();

        let err = decode_file(&path, 22_050).unwrap_err();
        assert!(
            matches!(
                err,
                DecodeError::UnsupportedFormat { .. }
                    | DecodeError::Corrupt { .. }
                    | DecodeError::NoAudio { .. }
            ),
            "{err:?}"
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn file_filter_lists_required_formats() {
        let pattern = file_filter_pattern();
        for ext in ["*.wav", "*.mp3", "*.flac"] {
            assert!(pattern.contains(ext), "{pattern}");
        }
    }
}
