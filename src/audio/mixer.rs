//! The positional software mixer.
//!
//! Runs on the audio callback thread behind a mutex. Each voice keeps a
//! fractional cursor into its sound; mixing linearly resamples to the output
//! rate, applies inverse-square distance attenuation and constant-power
//! panning against the listener's right vector, and clamps the final mix.

use cgmath::{InnerSpace, Point3, Vector3};

use super::wav::Sound;

/// Identifies a playing (or finished) source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub(crate) u64);

/// Output stream properties the mixer writes against.
#[derive(Debug, Clone, Copy)]
pub struct StreamInfo {
    pub channels: u16,
    pub sample_rate: u32,
}

/// The point of audition. Position attenuates, the right vector pans.
#[derive(Debug, Clone, Copy)]
pub struct Listener {
    pub position: Point3<f32>,
    pub right: Vector3<f32>,
}

impl Default for Listener {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            right: Vector3::unit_x(),
        }
    }
}

#[derive(Debug)]
struct Voice {
    id: SourceId,
    sound: Sound,
    volume: f32,
    looping: bool,
    /// `None` plays flat (no attenuation, centre pan).
    position: Option<Point3<f32>>,
    cursor: f32,
}

#[derive(Debug, Default)]
pub struct Mixer {
    listener: Listener,
    voices: Vec<Voice>,
    next_id: u64,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_listener(&mut self, listener: Listener) {
        self.listener = listener;
    }

    pub fn spawn(
        &mut self,
        sound: Sound,
        position: Option<Point3<f32>>,
        volume: f32,
        looping: bool,
    ) -> SourceId {
        let id = SourceId(self.next_id);
        self.next_id += 1;
        self.voices.push(Voice {
            id,
            sound,
            volume,
            looping,
            position,
            cursor: 0.0,
        });
        id
    }

    pub fn stop(&mut self, id: SourceId) {
        self.voices.retain(|v| v.id != id);
    }

    pub fn is_playing(&self, id: SourceId) -> bool {
        self.voices.iter().any(|v| v.id == id)
    }

    pub fn set_volume(&mut self, id: SourceId, volume: f32) {
        if let Some(voice) = self.voices.iter_mut().find(|v| v.id == id) {
            voice.volume = volume;
        }
    }

    pub fn set_looping(&mut self, id: SourceId, looping: bool) {
        if let Some(voice) = self.voices.iter_mut().find(|v| v.id == id) {
            voice.looping = looping;
        }
    }

    pub fn set_position(&mut self, id: SourceId, position: Point3<f32>) {
        if let Some(voice) = self.voices.iter_mut().find(|v| v.id == id) {
            voice.position = Some(position);
        }
    }

    /// Mix all voices into `output` (interleaved, `stream.channels` wide).
    /// Finished non-looping voices are retired.
    pub fn mix(&mut self, output: &mut [f32], stream: &StreamInfo) {
        output.fill(0.0);

        let out_channels = stream.channels.max(1) as usize;
        let frames_to_write = output.len() / out_channels;
        let listener = self.listener;

        for voice in &mut self.voices {
            let num_frames = voice.sound.frames();
            if num_frames == 0 {
                voice.cursor = f32::INFINITY;
                continue;
            }

            let resample_ratio = voice.sound.sample_rate as f32 / stream.sample_rate as f32;
            let (mut volume, mut pan) = (voice.volume, 0.5);

            if let Some(source_pos) = voice.position {
                let to_source = source_pos - listener.position;
                let distance = to_source.magnitude();
                volume *= 1.0 / (1.0 + distance * distance);
                if distance > 0.001 {
                    pan = (to_source.normalize().dot(listener.right) + 1.0) * 0.5;
                }
            }

            let vol_l = volume * (1.0 - pan).sqrt();
            let vol_r = volume * pan.sqrt();

            for i in 0..frames_to_write {
                if voice.cursor >= num_frames as f32 {
                    if voice.looping {
                        voice.cursor %= num_frames as f32;
                    } else {
                        break;
                    }
                }

                let cursor_floor = voice.cursor.floor() as usize;
                let cursor_fract = voice.cursor.fract();
                let next_frame = (cursor_floor + 1) % num_frames;

                let s1 = frame_mono(&voice.sound, cursor_floor);
                let s2 = frame_mono(&voice.sound, next_frame);
                let sample = s1 + (s2 - s1) * cursor_fract;

                let out_idx = i * out_channels;
                if out_channels >= 2 {
                    output[out_idx] += sample * vol_l;
                    output[out_idx + 1] += sample * vol_r;
                } else {
                    output[out_idx] += sample * volume;
                }

                voice.cursor += resample_ratio;
            }
        }

        self.voices
            .retain(|v| v.looping || v.cursor < v.sound.frames() as f32);

        // Limiter
        for sample in output.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }
}

/// Downmix one interleaved frame to mono.
fn frame_mono(sound: &Sound, frame: usize) -> f32 {
    let channels = sound.channels.max(1) as usize;
    let start = frame * channels;
    let frame_samples = &sound.samples[start..(start + channels).min(sound.samples.len())];
    if frame_samples.is_empty() {
        return 0.0;
    }
    frame_samples.iter().sum::<f32>() / frame_samples.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEREO_OUT: StreamInfo = StreamInfo {
        channels: 2,
        sample_rate: 48000,
    };

    fn constant_sound(value: f32, len: usize, sample_rate: u32) -> Sound {
        Sound::new(vec![value; len], 1, sample_rate)
    }

    fn mix_one_buffer(mixer: &mut Mixer, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames * 2];
        mixer.mix(&mut out, &STEREO_OUT);
        out
    }

    #[test]
    fn flat_voice_is_centred() {
        let mut mixer = Mixer::new();
        mixer.spawn(constant_sound(0.5, 48000, 48000), None, 1.0, false);
        let out = mix_one_buffer(&mut mixer, 64);
        // Centre pan: both channels carry the same energy.
        assert!((out[0] - out[1]).abs() < 1e-6);
        assert!(out[0] > 0.0);
    }

    #[test]
    fn distance_attenuates() {
        let mut mixer = Mixer::new();
        mixer.spawn(
            constant_sound(0.5, 48000, 48000),
            Some(Point3::new(0.0, 0.0, -1.0)),
            1.0,
            false,
        );
        let near = mix_one_buffer(&mut mixer, 16)[0];

        let mut mixer = Mixer::new();
        mixer.spawn(
            constant_sound(0.5, 48000, 48000),
            Some(Point3::new(0.0, 0.0, -10.0)),
            1.0,
            false,
        );
        let far = mix_one_buffer(&mut mixer, 16)[0];

        assert!(near > far, "near {near} should be louder than far {far}");
        // Inverse-square: 1/(1+d^2).
        assert!((near / far - 101.0 / 2.0).abs() < 0.5);
    }

    #[test]
    fn source_to_the_right_pans_right() {
        let mut mixer = Mixer::new();
        mixer.spawn(
            constant_sound(0.5, 48000, 48000),
            Some(Point3::new(1.0, 0.0, 0.0)),
            1.0,
            false,
        );
        let out = mix_one_buffer(&mut mixer, 16);
        let (left, right) = (out[0], out[1]);
        assert!(right > left, "right {right} should exceed left {left}");
        // Fully to the right: the left channel is silent.
        assert!(left.abs() < 1e-6);
    }

    #[test]
    fn non_looping_voice_retires_at_end() {
        let mut mixer = Mixer::new();
        let id = mixer.spawn(constant_sound(0.5, 8, 48000), None, 1.0, false);
        assert!(mixer.is_playing(id));
        mix_one_buffer(&mut mixer, 64);
        assert!(!mixer.is_playing(id));
    }

    #[test]
    fn looping_voice_wraps_and_keeps_playing() {
        let mut mixer = Mixer::new();
        let id = mixer.spawn(constant_sound(0.5, 8, 48000), None, 1.0, true);
        let out = mix_one_buffer(&mut mixer, 64);
        assert!(mixer.is_playing(id));
        // Every frame got audio, including past the wrap point.
        assert!(out.chunks(2).all(|frame| frame[0] > 0.0));
    }

    #[test]
    fn stop_silences_a_voice() {
        let mut mixer = Mixer::new();
        let id = mixer.spawn(constant_sound(0.5, 48000, 48000), None, 1.0, true);
        mixer.stop(id);
        let out = mix_one_buffer(&mut mixer, 16);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn limiter_clamps_the_sum() {
        let mut mixer = Mixer::new();
        for _ in 0..8 {
            mixer.spawn(constant_sound(0.9, 48000, 48000), None, 1.0, true);
        }
        let out = mix_one_buffer(&mut mixer, 16);
        assert!(out.iter().all(|s| *s <= 1.0 && *s >= -1.0));
        assert!((out[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn resamples_across_rates() {
        // 24kHz sound on a 48kHz stream advances the cursor at half speed,
        // so a 10-frame sound lasts about 20 output frames.
        let mut mixer = Mixer::new();
        let id = mixer.spawn(constant_sound(0.5, 10, 24000), None, 1.0, false);
        let mut out = vec![0.0; 18 * 2];
        mixer.mix(&mut out, &STEREO_OUT);
        assert!(mixer.is_playing(id));
        mix_one_buffer(&mut mixer, 8);
        assert!(!mixer.is_playing(id));
    }

    #[test]
    fn empty_sound_retires_immediately() {
        let mut mixer = Mixer::new();
        let id = mixer.spawn(Sound::new(vec![], 1, 44100), None, 1.0, false);
        mix_one_buffer(&mut mixer, 16);
        assert!(!mixer.is_playing(id));
    }
}
