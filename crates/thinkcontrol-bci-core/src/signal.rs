//! Synthetic sensorimotor EEG
//!
//! Each channel is a sum of a mu-band (10 Hz) and a beta-band (20 Hz)
//! sinusoid plus uniform noise. Motor imagery suppresses the mu rhythm over
//! the contralateral hemisphere, so the C3/C4 mu amplitudes swap with the
//! label while Cz stays fixed:
//!
//! | Channel | mu amplitude (Left / Right) | mu phase | beta amplitude |
//! |---------|-----------------------------|----------|----------------|
//! | C3      | 0.3 / 0.8                   | 0        | 0.20           |
//! | C4      | 0.8 / 0.3                   | π/4      | 0.20           |
//! | Cz      | 0.5 / 0.5                   | π/2      | 0.15           |

use core::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use heapless::Deque;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{Channel, Label};

/// Samples retained per channel
pub const WINDOW_CAPACITY: usize = 100;

/// Mu rhythm frequency (Hz)
pub const MU_FREQUENCY_HZ: f64 = 10.0;

/// Beta rhythm frequency (Hz)
pub const BETA_FREQUENCY_HZ: f64 = 20.0;

/// Half-width of the uniform noise band
pub const NOISE_AMPLITUDE: f64 = 0.05;

/// Mu amplitude over the hemisphere ipsilateral to the imagined hand
const MU_AMPLITUDE_HIGH: f64 = 0.8;
/// Mu amplitude over the desynchronized (contralateral) hemisphere
const MU_AMPLITUDE_LOW: f64 = 0.3;
/// Midline mu amplitude
const MU_AMPLITUDE_MIDLINE: f64 = 0.5;

const BETA_AMPLITUDE_LATERAL: f64 = 0.2;
const BETA_AMPLITUDE_MIDLINE: f64 = 0.15;

/// Oscillator parameters of one channel for one label.
#[derive(Copy, Clone, Debug, PartialEq)]
struct ChannelProfile {
    mu_amplitude: f64,
    mu_phase: f64,
    beta_amplitude: f64,
}

impl ChannelProfile {
    const fn for_channel(channel: Channel, label: Label) -> Self {
        match channel {
            Channel::C3 => Self {
                mu_amplitude: match label {
                    Label::Right => MU_AMPLITUDE_HIGH,
                    Label::Left => MU_AMPLITUDE_LOW,
                },
                mu_phase: 0.0,
                beta_amplitude: BETA_AMPLITUDE_LATERAL,
            },
            Channel::C4 => Self {
                mu_amplitude: match label {
                    Label::Left => MU_AMPLITUDE_HIGH,
                    Label::Right => MU_AMPLITUDE_LOW,
                },
                mu_phase: FRAC_PI_4,
                beta_amplitude: BETA_AMPLITUDE_LATERAL,
            },
            Channel::Cz => Self {
                mu_amplitude: MU_AMPLITUDE_MIDLINE,
                mu_phase: FRAC_PI_2,
                beta_amplitude: BETA_AMPLITUDE_MIDLINE,
            },
        }
    }

    fn value(&self, time_secs: f64, noise: f64) -> f64 {
        self.mu_amplitude * libm::sin(TAU * MU_FREQUENCY_HZ * time_secs + self.mu_phase)
            + self.beta_amplitude * libm::sin(TAU * BETA_FREQUENCY_HZ * time_secs)
            + noise
    }
}

/// One synthetic sample for every channel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSample {
    /// C3 value
    pub c3: f64,
    /// C4 value
    pub c4: f64,
    /// Cz value
    pub cz: f64,
}

impl ChannelSample {
    /// Value for a channel
    #[must_use]
    pub const fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::C3 => self.c3,
            Channel::C4 => self.c4,
            Channel::Cz => self.cz,
        }
    }
}

/// FIFO of the most recent samples of one channel.
///
/// Holds at most [`WINDOW_CAPACITY`] samples; the oldest is evicted before a
/// new one is appended.
#[derive(Clone, Debug, Default)]
pub struct SampleWindow {
    samples: Deque<f64, WINDOW_CAPACITY>,
}

impl SampleWindow {
    /// Create an empty window
    #[must_use]
    pub const fn new() -> Self {
        Self {
            samples: Deque::new(),
        }
    }

    /// Append a sample, evicting the oldest at capacity.
    pub fn push(&mut self, value: f64) {
        if self.samples.is_full() {
            self.samples.pop_front();
        }
        // Room was made above, so this cannot be rejected.
        let _ = self.samples.push_back(value);
    }

    /// Number of samples held
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }
}

/// Produces one sample per channel per tick and keeps the rolling windows.
#[derive(Clone, Debug, Default)]
pub struct SignalSynthesizer {
    windows: [SampleWindow; Channel::COUNT],
}

impl SignalSynthesizer {
    /// Create a synthesizer with empty windows
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute a sample for every channel without touching the windows.
    ///
    /// Draws one noise value per channel from `rng`, in channel order.
    pub fn sample<R: Rng + ?Sized>(time_secs: f64, label: Label, rng: &mut R) -> ChannelSample {
        let mut values = [0.0; Channel::COUNT];
        for channel in Channel::ALL {
            let noise = rng.gen_range(-NOISE_AMPLITUDE..=NOISE_AMPLITUDE);
            values[channel.index()] =
                ChannelProfile::for_channel(channel, label).value(time_secs, noise);
        }
        ChannelSample {
            c3: values[Channel::C3.index()],
            c4: values[Channel::C4.index()],
            cz: values[Channel::Cz.index()],
        }
    }

    /// Compute a sample for every channel and append it to the windows.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        time_secs: f64,
        label: Label,
        rng: &mut R,
    ) -> ChannelSample {
        let sample = Self::sample(time_secs, label, rng);
        for channel in Channel::ALL {
            self.windows[channel.index()].push(sample.get(channel));
        }
        sample
    }

    /// Rolling window of a channel
    #[must_use]
    pub fn window(&self, channel: Channel) -> &SampleWindow {
        &self.windows[channel.index()]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Peak-to-peak amplitude of a channel over one mu period, noise-free.
    fn mu_swing(channel: Channel, label: Label) -> f64 {
        let profile = ChannelProfile::for_channel(channel, label);
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for i in 0..1000 {
            let t = f64::from(i) / 10_000.0;
            let v = profile.value(t, 0.0);
            min = libm::fmin(min, v);
            max = libm::fmax(max, v);
        }
        max - min
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut window = SampleWindow::new();
        for i in 0..150 {
            window.push(f64::from(i));
            assert!(window.len() <= WINDOW_CAPACITY);
        }
        assert_eq!(window.len(), WINDOW_CAPACITY);
        assert_eq!(window.iter().next(), Some(50.0));
        assert_eq!(window.latest(), Some(149.0));
    }

    #[test]
    fn test_generate_appends_to_every_window() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut synth = SignalSynthesizer::new();

        let sample = synth.generate(0.25, Label::Right, &mut rng);
        for channel in Channel::ALL {
            assert_eq!(synth.window(channel).len(), 1);
            assert_eq!(synth.window(channel).latest(), Some(sample.get(channel)));
        }
    }

    #[test]
    fn test_windows_bounded_over_long_run() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut synth = SignalSynthesizer::new();
        for tick in 0..500 {
            let label = if tick % 7 < 3 { Label::Left } else { Label::Right };
            synth.generate(f64::from(tick) * 0.1, label, &mut rng);
            for channel in Channel::ALL {
                assert!(synth.window(channel).len() <= WINDOW_CAPACITY);
            }
        }
        assert_eq!(synth.window(Channel::Cz).len(), WINDOW_CAPACITY);
    }

    #[test]
    fn test_noise_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(3);
        for i in 0..2000 {
            let t = f64::from(i) * 0.0137;
            let noisy = SignalSynthesizer::sample(t, Label::Left, &mut rng);
            for channel in Channel::ALL {
                let clean = ChannelProfile::for_channel(channel, Label::Left).value(t, 0.0);
                let noise = noisy.get(channel) - clean;
                assert!(libm::fabs(noise) <= NOISE_AMPLITUDE + 1e-12);
            }
        }
    }

    #[test]
    fn test_contralateral_mu_modulation() {
        // Right-hand imagery: C3 carries the strong mu rhythm, C4 the weak one.
        assert!(mu_swing(Channel::C3, Label::Right) > mu_swing(Channel::C4, Label::Right));
        // Left-hand imagery mirrors it.
        assert!(mu_swing(Channel::C4, Label::Left) > mu_swing(Channel::C3, Label::Left));
        // Cz ignores the label.
        let cz_left = mu_swing(Channel::Cz, Label::Left);
        let cz_right = mu_swing(Channel::Cz, Label::Right);
        assert!(libm::fabs(cz_left - cz_right) < 1e-12);
    }

    #[test]
    fn test_cz_quarter_phase_offset() {
        // At t = 0 the beta term vanishes; Cz sits at its mu peak, C3 at zero.
        let cz = ChannelProfile::for_channel(Channel::Cz, Label::Left).value(0.0, 0.0);
        let c3 = ChannelProfile::for_channel(Channel::C3, Label::Left).value(0.0, 0.0);
        assert!(libm::fabs(cz - MU_AMPLITUDE_MIDLINE) < 1e-12);
        assert!(libm::fabs(c3) < 1e-12);
    }
}
