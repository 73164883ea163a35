//! WAV file loading for CLI-supplied recordings
//!
//! Audio capture itself lives outside this crate; the CLI takes an
//! already-recorded WAV file and only sanity-checks it before upload.

use std::path::Path;

use crate::{Error, Result};

/// Read a WAV recording from disk, validating the header
///
/// The raw bytes are forwarded to the STT provider as-is; decoding is only
/// used to reject non-WAV input early with a useful error.
///
/// # Errors
///
/// Returns error if the file is missing, unreadable, empty, or not WAV.
pub fn read_recording<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;

    if bytes.is_empty() {
        return Err(Error::Audio(format!(
            "recording is empty: {}",
            path.display()
        )));
    }

    let reader = hound::WavReader::new(std::io::Cursor::new(&bytes))
        .map_err(|e| Error::Audio(format!("not a WAV file ({e}): {}", path.display())))?;

    let spec = reader.spec();
    let duration_secs = f64::from(reader.duration()) / f64::from(spec.sample_rate);
    tracing::debug!(
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        duration_secs,
        "loaded recording"
    );

    Ok(bytes)
}
