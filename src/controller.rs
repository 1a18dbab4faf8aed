//! Preset selection from the control context.

use crate::chain::ChainControl;
use crate::preset::{ApplyReport, VoicePreset};
use crate::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Cycles through a fixed list of presets and writes the selected one into a chain.
///
/// Cloning shares the current selection.
#[derive(Clone)]
pub struct PresetController {
    control: ChainControl,
    presets: Arc<[VoicePreset]>,
    current: Arc<AtomicUsize>,
}

impl PresetController {
    /// Create a controller. Nothing is applied until a preset is selected.
    pub fn new(control: ChainControl, presets: Vec<VoicePreset>) -> Result<Self> {
        if presets.is_empty() {
            return Err(Error::EmptyPresetList);
        }
        Ok(Self {
            control,
            presets: presets.into(),
            current: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn presets(&self) -> &[VoicePreset] {
        &self.presets
    }

    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    pub fn current(&self) -> &VoicePreset {
        &self.presets[self.current_index()]
    }

    pub fn control(&self) -> &ChainControl {
        &self.control
    }

    /// Select and apply the preset at `index`.
    pub fn select(&self, index: usize) -> Result<ApplyReport> {
        let preset = self
            .presets
            .get(index)
            .ok_or_else(|| Error::UnknownPreset(index.to_string()))?;
        self.current.store(index, Ordering::Release);
        tracing::info!(index, preset = %preset.name, "selecting preset");
        Ok(preset.apply(&self.control))
    }

    /// Select by name, ignoring case.
    pub fn select_by_name(&self, name: &str) -> Result<ApplyReport> {
        let index = self
            .presets
            .iter()
            .position(|preset| preset.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownPreset(name.to_string()))?;
        self.select(index)
    }

    /// Advance to the next preset, wrapping to the first.
    pub fn next(&self) -> Result<ApplyReport> {
        self.select((self.current_index() + 1) % self.presets.len())
    }

    /// Step back to the previous preset, wrapping to the last.
    pub fn previous(&self) -> Result<ApplyReport> {
        let len = self.presets.len();
        self.select((self.current_index() + len - 1) % len)
    }

    /// Re-apply the current preset.
    pub fn reapply(&self) -> ApplyReport {
        self.current().apply(&self.control)
    }
}
