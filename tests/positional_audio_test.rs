//! Decode-to-mix path of the audio subsystem, no output device required.

use lumin::audio::{Listener, Mixer, Sound, StreamInfo};
use lumin::camera::Camera;
use lumin::{Point3, Vector3};

// A WAV file 16-bit, mono, 44100Hz, containing 4 samples: the i16 values
// 3277, -3277, 6554, -6554, i.e. roughly 0.1, -0.1, 0.2, -0.2.
const TEST_WAV_BYTES: &[u8] = &[
    82, 73, 70, 70, 44, 0, 0, 0, 87, 65, 86, 69, 102, 109, 116, 32, 16, 0, 0, 0, 1, 0, 1, 0, 68,
    172, 0, 0, 136, 88, 1, 0, 2, 0, 16, 0, 100, 97, 116, 97, 8, 0, 0, 0, 205, 12, 51, 243, 154,
    25, 102, 230,
];

const OUT: StreamInfo = StreamInfo {
    channels: 2,
    sample_rate: 44100,
};

fn channel_energy(buffer: &[f32]) -> (f32, f32) {
    let mut left = 0.0;
    let mut right = 0.0;
    for frame in buffer.chunks(2) {
        left += frame[0].abs();
        right += frame[1].abs();
    }
    (left, right)
}

#[test]
fn decoded_wav_plays_through_the_mixer() {
    let sound = Sound::from_wav_bytes(TEST_WAV_BYTES).expect("decode failed");
    let mut mixer = Mixer::new();
    let id = mixer.spawn(sound, None, 1.0, false);

    let mut buffer = vec![0.0f32; 16];
    mixer.mix(&mut buffer, &OUT);

    assert!(buffer.iter().any(|s| *s != 0.0), "mix produced silence");
    assert!(!mixer.is_playing(id), "4-frame sound should have finished");
}

#[test]
fn listener_orientation_from_camera_pans_sources() {
    let sound = Sound::from_wav_bytes(TEST_WAV_BYTES).expect("decode failed");

    // Camera at the origin looking down -Z; its right vector is +X.
    let camera = Camera::default();
    let mut mixer = Mixer::new();
    mixer.set_listener(Listener {
        position: camera.position,
        right: camera.right(),
    });
    mixer.spawn(sound, Some(Point3::new(2.0, 0.0, 0.0)), 1.0, true);

    let mut buffer = vec![0.0f32; 64];
    mixer.mix(&mut buffer, &OUT);
    let (left, right) = channel_energy(&buffer);
    assert!(
        right > left,
        "source on the +X side should favour the right channel ({left} vs {right})"
    );
}

#[test]
fn turning_the_camera_flips_the_pan() {
    let sound = Sound::from_wav_bytes(TEST_WAV_BYTES).expect("decode failed");

    // Looking down +Z instead: the camera's right vector is -X, so a source
    // at +X now sits on the listener's left.
    let camera = Camera::look_at(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Vector3::unit_y(),
    );
    let mut mixer = Mixer::new();
    mixer.set_listener(Listener {
        position: camera.position,
        right: camera.right(),
    });
    mixer.spawn(sound, Some(Point3::new(2.0, 0.0, 0.0)), 1.0, true);

    let mut buffer = vec![0.0f32; 64];
    mixer.mix(&mut buffer, &OUT);
    let (left, right) = channel_energy(&buffer);
    assert!(
        left > right,
        "source behind the turned camera's right should favour the left channel ({left} vs {right})"
    );
}

#[test]
fn moving_the_listener_away_attenuates() {
    let sound = Sound::from_wav_bytes(TEST_WAV_BYTES).expect("decode failed");
    let position = Some(Point3::new(0.0, 0.0, -1.0));

    let mut near = Mixer::new();
    near.spawn(sound.clone(), position, 1.0, true);
    let mut buffer = vec![0.0f32; 64];
    near.mix(&mut buffer, &OUT);
    let (near_l, near_r) = channel_energy(&buffer);

    let mut far = Mixer::new();
    far.set_listener(Listener {
        position: Point3::new(0.0, 0.0, 20.0),
        right: Vector3::unit_x(),
    });
    far.spawn(sound, position, 1.0, true);
    let mut buffer = vec![0.0f32; 64];
    far.mix(&mut buffer, &OUT);
    let (far_l, far_r) = channel_energy(&buffer);

    assert!(near_l + near_r > 10.0 * (far_l + far_r));
}
