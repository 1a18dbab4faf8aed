//! Voice presets and their application to a running chain.
//!
//! A preset is applied one node at a time in a fixed order (pitch, ring
//! modulator, vibrato, chorus, flanger, delay). Each write is an independent
//! atomic store, so the audio context may see a mix of old and new settings for at
//! most one buffer. Nothing is locked across nodes.

use crate::chain::{ids, ChainControl};
use crate::Error;
use voxmod_core::ParamValue;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PitchSettings {
    /// Semitones
    pub shift: f32,
    pub formant_preserve: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingModSettings {
    pub enabled: bool,
    pub carrier_frequency: f32,
    pub mix: f32,
}

impl RingModSettings {
    pub const OFF: Self = Self {
        enabled: false,
        carrier_frequency: 0.0,
        mix: 0.0,
    };

    pub const fn on(carrier_frequency: f32, mix: f32) -> Self {
        Self {
            enabled: true,
            carrier_frequency,
            mix,
        }
    }
}

/// Settings for chorus, flanger or vibrato.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModulationSettings {
    pub enabled: bool,
    /// Seconds
    pub sweep_width: f32,
    /// Hz
    pub frequency: f32,
}

impl ModulationSettings {
    pub const OFF: Self = Self {
        enabled: false,
        sweep_width: 0.0,
        frequency: 0.0,
    };

    pub const fn on(sweep_width: f32, frequency: f32) -> Self {
        Self {
            enabled: true,
            sweep_width,
            frequency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DelaySettings {
    pub enabled: bool,
    pub delay_ms: i32,
    pub feedback: f32,
    pub wet_mix: f32,
}

impl DelaySettings {
    pub const OFF: Self = Self {
        enabled: false,
        delay_ms: 0,
        feedback: 0.0,
        wet_mix: 0.0,
    };

    pub const fn on(delay_ms: i32, feedback: f32, wet_mix: f32) -> Self {
        Self {
            enabled: true,
            delay_ms,
            feedback,
            wet_mix,
        }
    }
}

/// Named bundle of parameter assignments for the whole chain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoicePreset {
    pub name: String,
    pub description: String,
    pub pitch: PitchSettings,
    pub ring_mod: RingModSettings,
    pub chorus: ModulationSettings,
    pub flanger: ModulationSettings,
    pub vibrato: ModulationSettings,
    pub delay: DelaySettings,
    pub output_gain: f32,
}

/// Parameter name and value pairs for one node.
pub type NodeWrites = Vec<(&'static str, ParamValue)>;

/// Outcome of applying a preset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Parameter writes that succeeded
    pub applied: usize,
    /// Nodes the preset covers but the chain does not contain
    pub missing_nodes: Vec<&'static str>,
    /// Writes rejected by a node (unknown name or wrong type)
    pub rejected: Vec<Error>,
}

impl ApplyReport {
    pub fn is_complete(&self) -> bool {
        self.missing_nodes.is_empty() && self.rejected.is_empty()
    }
}

impl VoicePreset {
    /// Parameter writes for each node, in application order.
    pub fn assignments(&self) -> Vec<(&'static str, NodeWrites)> {
        let mut writes: Vec<(&'static str, NodeWrites)> = vec![(
            ids::PITCH_SHIFT,
            vec![
                ("pitchShift", self.pitch.shift.into()),
                ("formantPreserve", self.pitch.formant_preserve.into()),
                ("outputGain", self.output_gain.into()),
            ],
        )];

        // A disabled ring modulator is silenced through its mix
        let ring: NodeWrites = if self.ring_mod.enabled {
            vec![
                ("carrierFrequency", self.ring_mod.carrier_frequency.into()),
                ("mix", self.ring_mod.mix.into()),
            ]
        } else {
            vec![("mix", 0.0f32.into())]
        };
        writes.push((ids::RING_MOD, ring));

        for (id, settings) in [
            (ids::VIBRATO, &self.vibrato),
            (ids::CHORUS, &self.chorus),
            (ids::FLANGER, &self.flanger),
        ] {
            let mut node: NodeWrites = vec![("isEnabled", settings.enabled.into())];
            if settings.enabled {
                node.push(("sweepWidth", settings.sweep_width.into()));
                node.push(("frequency", settings.frequency.into()));
            }
            writes.push((id, node));
        }

        let mut delay: NodeWrites = vec![("isEnabled", self.delay.enabled.into())];
        if self.delay.enabled {
            delay.extend([
                ("delayMs", self.delay.delay_ms.into()),
                ("feedbackLevel", self.delay.feedback.into()),
                ("wetMix", self.delay.wet_mix.into()),
                ("dryMix", 1.0f32.into()),
            ]);
        }
        writes.push((ids::DELAY, delay));

        writes
    }

    /// Write this preset into the chain behind `control`.
    ///
    /// Nodes absent from the chain are skipped. A rejected write is logged and
    /// skipped; the remaining writes still happen.
    pub fn apply(&self, control: &ChainControl) -> ApplyReport {
        let mut report = ApplyReport::default();
        for (id, writes) in self.assignments() {
            if !control.contains(id) {
                report.missing_nodes.push(id);
                continue;
            }
            for (name, value) in writes {
                match control.set_value(id, name, value) {
                    Ok(()) => report.applied += 1,
                    Err(err) => {
                        tracing::warn!(
                            preset = %self.name,
                            node = id,
                            param = name,
                            %err,
                            "preset write rejected"
                        );
                        report.rejected.push(err);
                    }
                }
            }
        }
        tracing::debug!(
            preset = %self.name,
            applied = report.applied,
            missing = report.missing_nodes.len(),
            "preset applied"
        );
        report
    }
}

/// The ten built-in voices.
pub fn builtin_presets() -> Vec<VoicePreset> {
    use DelaySettings as Delay;
    use ModulationSettings as Mod;
    use RingModSettings as Ring;

    let preset = |name: &str,
                  description: &str,
                  (shift, formant_preserve): (f32, f32),
                  ring_mod: Ring,
                  chorus: Mod,
                  flanger: Mod,
                  vibrato: Mod,
                  delay: Delay,
                  output_gain: f32| VoicePreset {
        name: name.to_string(),
        description: description.to_string(),
        pitch: PitchSettings {
            shift,
            formant_preserve,
        },
        ring_mod,
        chorus,
        flanger,
        vibrato,
        delay,
        output_gain,
    };

    vec![
        preset(
            "Deep Villain",
            "Menacing deep voice with echo",
            (-8.0, 1.0),
            Ring::OFF,
            Mod::OFF,
            Mod::OFF,
            Mod::OFF,
            Delay::on(180, 0.35, 0.3),
            1.3,
        ),
        preset(
            "Chipmunk",
            "High-pitched squeaky voice with vibrato",
            (12.0, 0.0),
            Ring::OFF,
            Mod::OFF,
            Mod::OFF,
            Mod::on(0.003, 6.0),
            Delay::OFF,
            1.1,
        ),
        preset(
            "Robot",
            "Metallic robotic voice",
            (0.0, 1.0),
            Ring::on(180.0, 0.65),
            Mod::OFF,
            Mod::on(0.008, 0.3),
            Mod::OFF,
            Delay::OFF,
            1.4,
        ),
        preset(
            "Alien",
            "Warbling otherworldly voice",
            (5.0, 0.5),
            Ring::on(65.0, 0.5),
            Mod::OFF,
            Mod::OFF,
            Mod::on(0.006, 4.5),
            Delay::on(120, 0.45, 0.35),
            1.3,
        ),
        preset(
            "Monster",
            "Deep growling beast voice",
            (-14.0, 0.85),
            Ring::on(25.0, 0.4),
            Mod::on(0.02, 0.4),
            Mod::OFF,
            Mod::OFF,
            Delay::OFF,
            1.6,
        ),
        preset(
            "Radio",
            "Classic warm radio announcer",
            (-2.0, 0.9),
            Ring::OFF,
            Mod::on(0.008, 0.25),
            Mod::OFF,
            Mod::OFF,
            Delay::on(45, 0.15, 0.2),
            1.15,
        ),
        preset(
            "Demon",
            "Hellish demonic voice from the depths",
            (-10.0, 0.75),
            Ring::on(35.0, 0.35),
            Mod::on(0.025, 0.6),
            Mod::on(0.012, 0.15),
            Mod::OFF,
            Delay::on(250, 0.5, 0.4),
            1.5,
        ),
        preset(
            "Ghost",
            "Ethereal haunting spectral voice",
            (4.0, 0.4),
            Ring::OFF,
            Mod::on(0.03, 1.2),
            Mod::on(0.015, 0.2),
            Mod::on(0.004, 3.0),
            Delay::on(200, 0.6, 0.5),
            1.2,
        ),
        preset(
            "Giant",
            "Massive thundering giant voice",
            (-18.0, 0.95),
            Ring::OFF,
            Mod::on(0.015, 0.3),
            Mod::OFF,
            Mod::OFF,
            Delay::on(300, 0.4, 0.35),
            1.8,
        ),
        preset(
            "Cyborg",
            "Glitchy malfunctioning android",
            (-4.0, 0.6),
            Ring::on(220.0, 0.55),
            Mod::OFF,
            Mod::on(0.01, 0.8),
            Mod::on(0.005, 7.0),
            Delay::on(80, 0.55, 0.4),
            1.35,
        ),
    ]
}

/// Built-in preset by index; out-of-range indices give the first preset.
pub fn preset(index: usize) -> VoicePreset {
    let mut presets = builtin_presets();
    if index < presets.len() {
        presets.swap_remove(index)
    } else {
        presets.swap_remove(0)
    }
}

/// Built-in preset by name, ignoring case.
pub fn preset_by_name(name: &str) -> Option<VoicePreset> {
    builtin_presets()
        .into_iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
}
