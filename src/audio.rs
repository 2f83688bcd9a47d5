//! Audio cues using Web Audio API
//!
//! Every cue is a short procedurally generated tone; no asset files.
//! Audio failures are never surfaced to gameplay.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::Cue;

/// Tone parameters for one cue
struct Tone {
    freq: f32,
    /// Frequency at the end of the envelope
    end_freq: f32,
    osc_type: OscillatorType,
    peak: f32,
    duration: f64,
}

fn tone_for(cue: Cue) -> Tone {
    match cue {
        Cue::Pickup => Tone {
            freq: 880.0,
            end_freq: 1320.0,
            osc_type: OscillatorType::Sine,
            peak: 0.3,
            duration: 0.12,
        },
        Cue::Hit => Tone {
            freq: 220.0,
            end_freq: 80.0,
            osc_type: OscillatorType::Sawtooth,
            peak: 0.4,
            duration: 0.2,
        },
        Cue::Chop => Tone {
            freq: 330.0,
            end_freq: 120.0,
            osc_type: OscillatorType::Square,
            peak: 0.25,
            duration: 0.08,
        },
        Cue::Victory => Tone {
            freq: 660.0,
            end_freq: 990.0,
            osc_type: OscillatorType::Triangle,
            peak: 0.4,
            duration: 0.6,
        },
        Cue::Portal => Tone {
            freq: 520.0,
            end_freq: 260.0,
            osc_type: OscillatorType::Sine,
            peak: 0.3,
            duration: 0.3,
        },
        Cue::Shoot => Tone {
            freq: 700.0,
            end_freq: 200.0,
            osc_type: OscillatorType::Square,
            peak: 0.2,
            duration: 0.06,
        },
    }
}

/// Plays cues emitted by the simulation
pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx, volume: 0.8 }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.effective_volume();
    }

    pub fn play(&self, cue: Cue) {
        if self.volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let tone = tone_for(cue);
        let Some((osc, gain)) = self.create_osc(ctx, tone.freq, tone.osc_type) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(self.volume * tone.peak, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + tone.duration)
            .ok();
        osc.frequency().set_value_at_time(tone.freq, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(tone.end_freq, t + tone.duration)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + tone.duration + 0.05).ok();
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }
}
