// src/sound.rs

use log::{debug, info};
use rodio::{Decoder, OutputStream, OutputStreamHandle, PlayError, Sink, StreamError};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SoundError {
    #[error("no audio output device: {0}")]
    Stream(#[from] StreamError),
    #[error("could not start playback: {0}")]
    Play(#[from] PlayError),
    #[error("could not open sound file: {0}")]
    Io(#[from] io::Error),
    #[error("unsupported sound file: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

/**
 * Loops the alert sound until it is stopped. The output stream is opened on
 * first use and held until `release`.
 */
#[derive(Default)]
pub struct AlertPlayer {
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
}

impl AlertPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts looping `path`. An unset or missing file is skipped and
    /// reported as `Ok(false)`.
    pub fn play(&mut self, path: Option<&Path>) -> Result<bool, SoundError> {
        let Some(path) = path else {
            debug!("No alert sound configured");
            return Ok(false);
        };
        if !path.is_file() {
            debug!("Alert sound {} not found, skipping", path.display());
            return Ok(false);
        }

        self.stop();
        let source = Decoder::new_looped(BufReader::new(File::open(path)?))?;
        let sink: Sink = Sink::try_new(self.handle()?)?;
        sink.append(source);
        info!("Playing alert sound {}", path.display());
        self.sink = Some(sink);
        Ok(true)
    }

    fn handle(&mut self) -> Result<&OutputStreamHandle, SoundError> {
        let output = match self.output.take() {
            Some(output) => output,
            None => OutputStream::try_default()?,
        };
        Ok(&self.output.insert(output).1)
    }

    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    #[cfg(test)]
    pub fn is_silent(&self) -> bool {
        self.sink.is_none()
    }

    #[cfg(test)]
    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    /// Stops playback and closes the audio device.
    pub fn release(&mut self) {
        self.stop();
        self.output = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unset_sound_is_skipped() {
        let mut player: AlertPlayer = AlertPlayer::new();
        assert!(!player.play(None).unwrap());
        assert!(player.sink.is_none());
    }

    #[test]
    fn test_missing_sound_is_skipped() {
        let dir: TempDir = TempDir::new().unwrap();
        let mut player: AlertPlayer = AlertPlayer::new();
        let missing = dir.path().join("bell.mp3");
        assert!(!player.play(Some(missing.as_path())).unwrap());
        assert!(player.output.is_none());
    }

    #[test]
    fn test_directory_is_not_a_sound() {
        let dir: TempDir = TempDir::new().unwrap();
        let mut player: AlertPlayer = AlertPlayer::new();
        assert!(!player.play(Some(dir.path())).unwrap());
    }

    #[test]
    fn test_stop_and_release_without_playback() {
        let mut player: AlertPlayer = AlertPlayer::new();
        player.stop();
        player.release();
        assert!(player.sink.is_none());
        assert!(player.output.is_none());
    }
}
