use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::models::config::{EXPORT_CHANNELS, EXPORT_SAMPLE_RATE};
use crate::models::error::CaptureError;
use crate::models::export::{ExportReport, ExportResult};

/// WAV layout of every export: mono, 44.1 kHz, IEEE float 32-bit.
pub fn export_spec() -> hound::WavSpec {
    hound::WavSpec {
        channels: EXPORT_CHANNELS,
        sample_rate: EXPORT_SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    }
}

/// Write `samples` to `destination` as a WAV file.
///
/// An empty slice is rejected with `EmptyBuffer` before the file system is
/// touched. Missing parent directories are created.
pub fn export(samples: &[f32], destination: &Path) -> ExportResult {
    if samples.is_empty() {
        return Err(CaptureError::EmptyBuffer);
    }

    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(CaptureError::write_failed)?;
        }
    }

    let spec = export_spec();
    let file = File::create(destination).map_err(CaptureError::write_failed)?;
    write_or_discard(samples, destination, BufWriter::new(file))?;

    let checksum = sha256_file(destination)?;
    let report = ExportReport {
        file_path: destination.to_path_buf(),
        sample_count: samples.len(),
        sample_rate: spec.sample_rate,
        duration_secs: samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64),
        checksum,
    };

    log::info!(
        "Exported {} samples ({:.2}s) to {}",
        report.sample_count,
        report.duration_secs,
        destination.display()
    );
    Ok(report)
}

/// Encode `samples` into `out`, removing `destination` if encoding fails so
/// no truncated WAV is left behind.
fn write_or_discard<W: Write + Seek>(
    samples: &[f32],
    destination: &Path,
    out: W,
) -> Result<(), CaptureError> {
    let Err(e) = encode(samples, out) else {
        return Ok(());
    };
    if let Err(remove_err) = fs::remove_file(destination) {
        log::warn!("Failed to remove partial export {}: {}", destination.display(), remove_err);
    }
    Err(CaptureError::write_failed(e))
}

fn encode<W: Write + Seek>(samples: &[f32], out: W) -> hound::Result<()> {
    let mut writer = hound::WavWriter::new(out, export_spec())?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, CaptureError> {
    let data = fs::read(path)
        .map_err(|e| CaptureError::write_failed(format!("failed to read back file: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, SeekFrom};
    use std::path::PathBuf;

    use approx::assert_relative_eq;

    use super::*;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tap_capture_test_{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    fn sine(len: usize) -> Vec<f32> {
        let step = 440.0 * std::f32::consts::TAU / EXPORT_SAMPLE_RATE as f32;
        (0..len).map(|i| (i as f32 * step).sin() * 0.5).collect()
    }

    #[test]
    fn empty_buffer_writes_nothing() {
        let path = temp_file_path("empty.wav");
        assert_eq!(export(&[], &path), Err(CaptureError::EmptyBuffer));
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
    }

    #[test]
    fn round_trip_preserves_count_rate_and_values() {
        let path = temp_file_path("sine.wav");
        let samples = sine(350);
        let report = export(&samples, &path).unwrap();

        assert_eq!(report.file_path, path);
        assert_eq!(report.sample_count, 350);
        assert_eq!(report.sample_rate, 44_100);

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_format, hound::SampleFormat::Float);
        assert_eq!(reader.len(), 350);

        let decoded: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded.len(), samples.len());
        for (a, b) in decoded.iter().zip(&samples) {
            assert_relative_eq!(*a, *b, epsilon = 1e-6);
        }

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn report_duration_and_checksum() {
        let path = temp_file_path("one_second.wav");
        let report = export(&vec![0.0; 44_100], &path).unwrap();

        assert_relative_eq!(report.duration_secs, 1.0);
        assert_eq!(report.checksum.len(), 64);
        assert_eq!(report.checksum, sha256_file(&path).unwrap());

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn unwritable_destination_is_write_failure() {
        let dir = temp_file_path("blocker");
        fs::create_dir_all(dir.parent().unwrap()).unwrap();
        // A regular file where a directory is expected.
        fs::write(&dir, b"not a directory").unwrap();

        let err = export(&[0.1, 0.2], &dir.join("out.wav")).unwrap_err();
        assert!(matches!(err, CaptureError::WriteFailed { .. }));

        fs::remove_dir_all(dir.parent().unwrap()).ok();
    }

    /// Accepts `budget` bytes, then fails every write like a full disk.
    struct ShortWriter {
        inner: Cursor<Vec<u8>>,
        budget: u64,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.inner.position() + buf.len() as u64 > self.budget {
                return Err(io::Error::other("no space left on device"));
            }
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for ShortWriter {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn failed_write_removes_partial_file() {
        let path = temp_file_path("partial.wav");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"RIFF").unwrap();

        let out = ShortWriter {
            inner: Cursor::new(Vec::new()),
            budget: 128,
        };
        let err = write_or_discard(&sine(1_000), &path, out).unwrap_err();

        assert!(matches!(err, CaptureError::WriteFailed { .. }));
        assert!(!path.exists());

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn successful_write_keeps_the_file() {
        let path = temp_file_path("kept.wav");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"").unwrap();

        write_or_discard(&sine(10), &path, Cursor::new(Vec::new())).unwrap();
        assert!(path.exists());

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
