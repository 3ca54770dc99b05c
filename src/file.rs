//! Whole-file encode and decode.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::CoderConfig;
use crate::decoder::decode_stream;
use crate::encoder::encode_stream;
use crate::error::{Error, Result};

/// Direction of a file run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compress.
    Encode,
    /// Decompress.
    Decode,
}

impl Mode {
    /// Suffix appended to the input path when no output is given.
    pub fn suffix(self) -> &'static str {
        match self {
            Mode::Encode => ".arith",
            Mode::Decode => ".decoded",
        }
    }
}

/// `input` with the mode's suffix appended, e.g. `notes.txt.arith`.
pub fn default_output(input: &Path, mode: Mode) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(mode.suffix());
    PathBuf::from(name)
}

/// Sizes and timing of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileStats {
    /// Direction of the run.
    pub mode: Mode,
    /// Bytes read from the input file.
    pub input_bytes: u64,
    /// Bytes written to the output file.
    pub output_bytes: u64,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl FileStats {
    /// Uncompressed size over compressed size, whichever direction ran.
    /// Infinite when the compressed side is empty.
    pub fn ratio(&self) -> f64 {
        let (plain, packed) = match self.mode {
            Mode::Encode => (self.input_bytes, self.output_bytes),
            Mode::Decode => (self.output_bytes, self.input_bytes),
        };
        plain as f64 / packed as f64
    }
}

/// Compress `input` into `output`.
///
/// If the run fails after creating `output`, the partial file is removed.
pub fn encode_file(input: &Path, output: &Path, config: CoderConfig) -> Result<FileStats> {
    run(Mode::Encode, input, output, |source, input_bytes, sink| {
        let sink = encode_stream(source, input_bytes, sink, config)?;
        Ok(sink.get_ref().metadata()?.len())
    })
}

/// Decompress `input` into `output`.
///
/// If the run fails after creating `output`, the partial file is removed.
pub fn decode_file(input: &Path, output: &Path, config: CoderConfig) -> Result<FileStats> {
    run(Mode::Decode, input, output, |source, _, sink| {
        decode_stream(source, sink, config)
    })
}

fn run<F>(mode: Mode, input: &Path, output: &Path, body: F) -> Result<FileStats>
where
    F: FnOnce(BufReader<File>, u64, BufWriter<File>) -> Result<u64>,
{
    let begin = Instant::now();

    // Creating the output would truncate the input before it is read.
    if output.exists() && fs::canonicalize(input)? == fs::canonicalize(output)? {
        return Err(Error::SameFile {
            path: output.to_path_buf(),
        });
    }

    info!(path = %input.display(), "opening file");
    let source = File::open(input)?;
    let input_bytes = source.metadata()?.len();

    info!(path = %output.display(), "creating file");
    let sink = File::create(output)?;

    match body(BufReader::new(source), input_bytes, BufWriter::new(sink)) {
        Ok(output_bytes) => Ok(FileStats {
            mode,
            input_bytes,
            output_bytes,
            elapsed: begin.elapsed(),
        }),
        Err(e) => {
            if let Err(remove) = fs::remove_file(output) {
                warn!(path = %output.display(), error = %remove, "could not remove partial output");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_appends_suffix() {
        assert_eq!(
            default_output(Path::new("dir/notes.txt"), Mode::Encode),
            PathBuf::from("dir/notes.txt.arith")
        );
        assert_eq!(
            default_output(Path::new("notes.txt.arith"), Mode::Decode),
            PathBuf::from("notes.txt.arith.decoded")
        );
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("input.bin");
        let data: Vec<u8> = b"the rain in spain stays mainly in the plain. "
            .iter()
            .copied()
            .cycle()
            .take(50_000)
            .collect();
        fs::write(&original, &data).unwrap();

        let packed = default_output(&original, Mode::Encode);
        let stats = encode_file(&original, &packed, CoderConfig::default()).unwrap();
        assert_eq!(stats.input_bytes, 50_000);
        assert_eq!(stats.output_bytes, fs::metadata(&packed).unwrap().len());
        assert!(stats.ratio() > 1.0);
        let encode_ratio = stats.ratio();

        let unpacked = default_output(&packed, Mode::Decode);
        let stats = decode_file(&packed, &unpacked, CoderConfig::default()).unwrap();
        assert_eq!(stats.output_bytes, 50_000);
        assert_eq!(stats.ratio(), encode_ratio);
        assert_eq!(fs::read(&unpacked).unwrap(), data);
    }

    #[test]
    fn test_failed_decode_removes_output() {
        let dir = tempfile::tempdir().unwrap();
        let packed = dir.path().join("short.arith");
        let mut bytes = crate::encode(&[7u8; 5000]).unwrap();
        // Claim far more symbols than the payload can hold.
        bytes[..8].copy_from_slice(&u64::MAX.to_be_bytes());
        fs::write(&packed, &bytes).unwrap();

        let out = default_output(&packed, Mode::Decode);
        let err = decode_file(&packed, &out, CoderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let out = dir.path().join("nope.arith");
        let err = encode_file(&missing, &out, CoderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_input_leaves_existing_output_alone() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let keep = dir.path().join("keep.txt");
        fs::write(&keep, b"do not touch").unwrap();

        let err = encode_file(&missing, &keep, CoderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(fs::read(&keep).unwrap(), b"do not touch");
    }

    #[test]
    fn test_same_input_and_output_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let data = vec![42u8; 1000];
        fs::write(&path, &data).unwrap();

        let err = encode_file(&path, &path, CoderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::SameFile { .. }));
        assert_eq!(fs::read(&path).unwrap(), data);

        // Same file reached through a different spelling of the path.
        let dotted = dir.path().join(".").join("data.bin");
        let err = decode_file(&path, &dotted, CoderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::SameFile { .. }));
        assert_eq!(fs::read(&path).unwrap(), data);
    }

    #[test]
    fn test_ratio_follows_direction() {
        let encode = FileStats {
            mode: Mode::Encode,
            input_bytes: 1000,
            output_bytes: 250,
            elapsed: Duration::ZERO,
        };
        let decode = FileStats {
            mode: Mode::Decode,
            input_bytes: 250,
            output_bytes: 1000,
            elapsed: Duration::ZERO,
        };
        assert_eq!(encode.ratio(), 4.0);
        assert_eq!(decode.ratio(), 4.0);
    }
}
