//! Audio output lifecycle and the positional playback API.
//!
//! [`AudioEngine::new`] opens the default output device, builds a stream in
//! the device's native sample format and drives the [`mixer::Mixer`] from
//! the callback thread. Dropping the engine stops the stream and releases
//! the device.

pub mod mixer;
pub mod wav;

use std::sync::{Arc, Mutex};

use cgmath::{Point3, Vector3};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};

pub use mixer::{Listener, Mixer, SourceId, StreamInfo};
pub use wav::Sound;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no sound device")]
    NoDevice,
    #[error("no default stream config: {0}")]
    NoStreamConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("could not build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("could not start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("wav decode failed: {0}")]
    Wav(#[from] hound::Error),
}

/// Owns the output stream and hands out playback handles.
///
/// The stream keeps playing for as long as the engine is alive; the mixer
/// state is shared with the callback thread behind a mutex. Per-source
/// operations on a retired [`SourceId`] are no-ops.
pub struct AudioEngine {
    // Held for its Drop: dropping the stream stops playback.
    _stream: cpal::Stream,
    mixer: Arc<Mutex<Mixer>>,
    stream_info: StreamInfo,
}

impl AudioEngine {
    /// Open the default output device and start the stream.
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let stream_info = StreamInfo {
            channels: config.channels,
            sample_rate: config.sample_rate.0,
        };
        log::info!(
            "audio device: {} ({} ch, {} Hz, {sample_format})",
            device.name().unwrap_or_else(|_| "<unknown>".into()),
            stream_info.channels,
            stream_info.sample_rate,
        );

        let mixer = Arc::new(Mutex::new(Mixer::new()));

        let stream = match sample_format {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &config, stream_info, mixer.clone())
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &config, stream_info, mixer.clone())
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &config, stream_info, mixer.clone())
            }
            other => {
                log::warn!("unusual output sample format {other}, converting from f32");
                build_stream::<f32>(&device, &config, stream_info, mixer.clone())
            }
        }?;
        stream.play()?;

        Ok(Self {
            _stream: stream,
            mixer,
            stream_info,
        })
    }

    pub fn stream_info(&self) -> StreamInfo {
        self.stream_info
    }

    /// Play a sound flat: no attenuation, centre pan.
    pub fn play(&self, sound: &Sound) -> SourceId {
        self.mixer
            .lock()
            .unwrap()
            .spawn(sound.clone(), None, 1.0, false)
    }

    /// Play a sound at a world position relative to the listener.
    pub fn play_spatial(&self, sound: &Sound, position: Point3<f32>) -> SourceId {
        self.mixer
            .lock()
            .unwrap()
            .spawn(sound.clone(), Some(position), 1.0, false)
    }

    /// Play a sound that loops until stopped.
    pub fn play_looping(&self, sound: &Sound) -> SourceId {
        self.mixer
            .lock()
            .unwrap()
            .spawn(sound.clone(), None, 1.0, true)
    }

    pub fn stop(&self, id: SourceId) {
        self.mixer.lock().unwrap().stop(id);
    }

    pub fn is_playing(&self, id: SourceId) -> bool {
        self.mixer.lock().unwrap().is_playing(id)
    }

    pub fn set_volume(&self, id: SourceId, volume: f32) {
        self.mixer.lock().unwrap().set_volume(id, volume);
    }

    pub fn set_looping(&self, id: SourceId, looping: bool) {
        self.mixer.lock().unwrap().set_looping(id, looping);
    }

    pub fn set_source_position(&self, id: SourceId, position: Point3<f32>) {
        self.mixer.lock().unwrap().set_position(id, position);
    }

    /// Move the point of audition. The engine loop calls this each frame
    /// with the camera position and right vector.
    pub fn set_listener(&self, position: Point3<f32>, right: Vector3<f32>) {
        self.mixer
            .lock()
            .unwrap()
            .set_listener(Listener { position, right });
    }
}

impl std::fmt::Debug for AudioEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioEngine")
            .field("stream_info", &self.stream_info)
            .finish_non_exhaustive()
    }
}

/// Build an output stream in the device's sample format, mixing in f32 and
/// converting per sample on the way out.
fn build_stream<T: SizedSample + FromSample<f32>>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    stream_info: StreamInfo,
    mixer: Arc<Mutex<Mixer>>,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    let mut scratch: Vec<f32> = Vec::new();
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            scratch.resize(data.len(), 0.0);
            mixer.lock().unwrap().mix(&mut scratch, &stream_info);
            for (out, mixed) in data.iter_mut().zip(&scratch) {
                *out = T::from_sample(*mixed);
            }
        },
        |err| log::error!("audio stream error: {err}"),
        None,
    )
}
