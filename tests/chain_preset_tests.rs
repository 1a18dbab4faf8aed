//! End-to-end tests: full voice chain, built-in presets and the preset controller.
//!
//! Run with:
//! ```bash
//! cargo test -p voxmod --test chain_preset_tests
//! ```

#[path = "helpers/mod.rs"]
mod helpers;

use helpers::tolerances::*;
use helpers::*;
use voxmod::chain::ids;
use voxmod::prelude::*;
use voxmod::{builtin_presets, voice_chain, voice_registry};

fn mono_changer(preset: usize) -> VoiceChanger {
    VoiceChanger::builder()
        .sample_rate(TEST_SAMPLE_RATE)
        .channels(1)
        .frames_per_buffer(TEST_BUFFER_SIZE)
        .preset(preset)
        .build()
        .expect("build voice changer")
}

#[test]
fn test_presets_are_audibly_distinct() {
    init_tracing();
    let input = generate_harmonic_tone(180.0, WARMUP_FRAMES * 2);

    let renders: Vec<Vec<f32>> = (0..builtin_presets().len())
        .map(|i| {
            let (mut chain, _) = mono_changer(i).into_parts();
            render_chain(&mut chain, &input)[WARMUP_FRAMES..].to_vec()
        })
        .collect();
    assert_eq!(renders.len(), 10);

    for (i, render) in renders.iter().enumerate() {
        assert!(render.iter().all(|s| s.is_finite()), "preset {i} produced non-finite samples");
        assert_has_audio(render, 0.01);
    }

    let mut pairs = 0;
    let mut distinct = 0;
    for i in 0..renders.len() {
        for j in i + 1..renders.len() {
            pairs += 1;
            if rms_difference(&renders[i], &renders[j]) > DISTINCT_RMS {
                distinct += 1;
            }
        }
    }
    assert!(
        distinct * 10 >= pairs * 8,
        "only {distinct} of {pairs} preset pairs differ"
    );
}

#[test]
fn test_same_preset_renders_identically() {
    let input = generate_harmonic_tone(180.0, 8192);
    let (mut a, _) = mono_changer(6).into_parts();
    let (mut b, _) = mono_changer(6).into_parts();
    assert_eq!(render_chain(&mut a, &input), render_chain(&mut b, &input));
}

#[test]
fn test_controller_switches_presets_on_live_chain() {
    let (mut chain, controller) = mono_changer(0).into_parts();
    let input = generate_harmonic_tone(200.0, 4096);

    let worker = {
        let controller = controller.clone();
        std::thread::spawn(move || {
            for _ in 0..25 {
                controller.next().unwrap();
            }
        })
    };
    for _ in 0..4 {
        let out = render_chain(&mut chain, &input);
        assert!(out.iter().all(|s| s.is_finite()));
    }
    worker.join().unwrap();

    assert_eq!(controller.current_index(), 5);
    assert_eq!(
        chain.get_value(ids::PITCH_SHIFT, "pitchShift").unwrap(),
        ParamValue::Float(-2.0)
    );
}

#[test]
fn test_controller_navigation() {
    let changer = mono_changer(9);
    let controller = changer.controller();
    assert_eq!(controller.current().name, "Cyborg");

    controller.next().unwrap();
    assert_eq!(controller.current().name, "Deep Villain");
    controller.previous().unwrap();
    controller.previous().unwrap();
    assert_eq!(controller.current().name, "Giant");

    assert!(controller.select(10).is_err());
    assert_eq!(controller.current().name, "Giant");
}

#[test]
fn test_switching_preset_resets_disabled_effects() {
    let changer = mono_changer(6); // Demon: everything on
    let chain = changer.chain();
    assert_eq!(chain.get_value(ids::FLANGER, "isEnabled").unwrap(), ParamValue::Bool(true));

    changer.controller().select_by_name("chipmunk").unwrap();
    assert_eq!(chain.get_value(ids::RING_MOD, "mix").unwrap(), ParamValue::Float(0.0));
    assert_eq!(chain.get_value(ids::FLANGER, "isEnabled").unwrap(), ParamValue::Bool(false));
    assert_eq!(chain.get_value(ids::DELAY, "isEnabled").unwrap(), ParamValue::Bool(false));
    assert_eq!(chain.get_value(ids::VIBRATO, "isEnabled").unwrap(), ParamValue::Bool(true));
    assert_eq!(chain.get_value(ids::VIBRATO, "frequency").unwrap(), ParamValue::Float(6.0));
}

#[test]
fn test_chain_without_modulation_effects() {
    init_tracing();
    let changer = VoiceChanger::builder()
        .channels(1)
        .modulation_effects(false)
        .preset_named("Ghost")
        .build()
        .unwrap();
    assert_eq!(changer.chain().len(), 2);

    let report = changer.controller().select_by_name("Alien").unwrap();
    assert_eq!(report.missing_nodes.len(), 4);
    assert!(report.rejected.is_empty());
    assert_eq!(
        changer.chain().get_value(ids::RING_MOD, "carrierFrequency").unwrap(),
        ParamValue::Float(65.0)
    );
}

#[test]
fn test_custom_chain_from_registry() {
    let registry = voice_registry();
    let mut chain = voice_chain(&registry, true).unwrap();
    chain.negotiate_format(mono_format()).unwrap();
    assert_eq!(chain.latency_frames(), 1536);

    // Untouched defaults: no pitch change, full ring modulation at 100 Hz
    let input = generate_sine(440.0, 0.5, 4096);
    let output = render_chain(&mut chain, &input);
    assert!(output.iter().all(|s| s.is_finite()));
}

#[test]
fn test_empty_chain_passes_audio_through() {
    let mut chain = EffectChain::new();
    chain.negotiate_format(mono_format()).unwrap();
    let input = generate_sine(440.0, 0.5, 2048);
    assert_eq!(render_chain(&mut chain, &input), input);
}

#[test]
fn test_oversized_buffer_is_rejected() {
    let (mut chain, _) = mono_changer(0).into_parts();
    let input = AudioBuffer::new(1, TEST_BUFFER_SIZE * 2);
    let mut output = AudioBuffer::new(1, TEST_BUFFER_SIZE * 2);
    assert!(matches!(
        chain.process(&input.view(), &mut output.view_mut()),
        Err(Error::Core(voxmod::core::Error::BufferMismatch { .. }))
    ));
}

#[cfg(feature = "serde")]
#[test]
fn test_preset_from_json() {
    let json = r#"{
        "name": "Whisper",
        "description": "Soft and close",
        "pitch": { "shift": 2.0, "formant_preserve": 1.0 },
        "ring_mod": { "enabled": false, "carrier_frequency": 0.0, "mix": 0.0 },
        "chorus": { "enabled": true, "sweep_width": 0.01, "frequency": 0.7 },
        "flanger": { "enabled": false, "sweep_width": 0.0, "frequency": 0.0 },
        "vibrato": { "enabled": false, "sweep_width": 0.0, "frequency": 0.0 },
        "delay": { "enabled": false, "delay_ms": 0, "feedback": 0.0, "wet_mix": 0.0 },
        "output_gain": 0.9
    }"#;
    let preset: VoicePreset = serde_json::from_str(json).unwrap();

    let mut presets = builtin_presets();
    presets.push(preset);
    let changer = VoiceChanger::builder()
        .presets(presets)
        .preset_named("whisper")
        .build()
        .unwrap();
    assert_eq!(changer.controller().current_index(), 10);
    assert_eq!(
        changer.chain().get_value(ids::CHORUS, "frequency").unwrap(),
        ParamValue::Float(0.7)
    );
}
