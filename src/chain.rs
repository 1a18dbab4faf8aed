//! Linear effect chain and its control-side handle.
//!
//! Audio flows through the nodes in insertion order; node *i*'s output is node
//! *i+1*'s input. The chain does no mixing of its own. Two scratch buffers sized at
//! negotiation carry the intermediate signal, so `process` never allocates.

use crate::{Error, Result};
use std::sync::Arc;
use voxmod_core::{
    check_buffers, AudioBuffer, AudioBufferMut, AudioBufferRef, AudioBusFormat, EffectNode,
    ParamValue, ParameterStore,
};

/// Node ids used by the standard voice chain.
pub mod ids {
    pub const PITCH_SHIFT: &str = "pitchShift";
    pub const RING_MOD: &str = "ringMod";
    pub const VIBRATO: &str = "vibrato";
    pub const CHORUS: &str = "chorus";
    pub const FLANGER: &str = "flanger";
    pub const DELAY: &str = "delay";
}

struct Slot {
    id: String,
    node: Box<dyn EffectNode>,
}

/// Ordered, fixed list of effect nodes.
pub struct EffectChain {
    slots: Vec<Slot>,
    format: Option<AudioBusFormat>,
    scratch: [AudioBuffer; 2],
}

impl EffectChain {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            format: None,
            scratch: [AudioBuffer::default(), AudioBuffer::default()],
        }
    }

    /// Append a node. Invalidates any negotiated format.
    pub fn push(&mut self, id: impl Into<String>, node: Box<dyn EffectNode>) -> Result<()> {
        let id = id.into();
        if self.contains(&id) {
            return Err(Error::DuplicateNode(id));
        }
        self.slots.push(Slot { id, node });
        self.format = None;
        Ok(())
    }

    pub fn with_node(mut self, id: impl Into<String>, node: Box<dyn EffectNode>) -> Result<Self> {
        self.push(id, node)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    /// Node ids in processing order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.id.as_str())
    }

    pub fn node(&self, id: &str) -> Option<&dyn EffectNode> {
        self.slots
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| slot.node.as_ref())
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Box<dyn EffectNode>> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id)
            .map(|slot| &mut slot.node)
    }

    /// Negotiate `format` with every node in order and size the scratch buffers.
    ///
    /// Every node must hand back the format it was given.
    pub fn negotiate_format(&mut self, format: AudioBusFormat) -> Result<AudioBusFormat> {
        format.validate()?;
        self.format = None;
        for slot in &mut self.slots {
            let negotiated = slot.node.negotiate_format(format)?;
            if negotiated != format {
                return Err(voxmod_core::Error::InvalidFormat(format!(
                    "node '{}' changed the bus format",
                    slot.id
                ))
                .into());
            }
        }
        self.scratch = [
            AudioBuffer::new(format.channels, format.frames_per_buffer),
            AudioBuffer::new(format.channels, format.frames_per_buffer),
        ];
        self.format = Some(format);
        tracing::info!(
            nodes = self.slots.len(),
            sample_rate = format.sample_rate,
            channels = format.channels,
            frames = format.frames_per_buffer,
            "effect chain negotiated"
        );
        Ok(format)
    }

    pub fn format(&self) -> Option<AudioBusFormat> {
        self.format
    }

    /// Run one buffer through every node. Any node failure fails the whole call.
    pub fn process(
        &mut self,
        input: &AudioBufferRef<'_>,
        output: &mut AudioBufferMut<'_>,
    ) -> Result<()> {
        let format = self.format.ok_or(voxmod_core::Error::NotConfigured)?;
        let frames = check_buffers(&format, input, output)?;

        if self.slots.is_empty() {
            output.copy_from(input);
            return Ok(());
        }

        let last = self.slots.len() - 1;
        let [even, odd] = &mut self.scratch;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if i == 0 {
                if last == 0 {
                    slot.node.process(input, output)?;
                } else {
                    slot.node.process(input, &mut even.view_mut_frames(frames))?;
                }
                continue;
            }

            // Odd nodes write the odd buffer, even nodes the even one
            let (src, dst) = if i % 2 == 1 {
                (&*even, &mut *odd)
            } else {
                (&*odd, &mut *even)
            };
            if i == last {
                slot.node.process(&src.view_frames(frames), output)?;
            } else {
                slot.node
                    .process(&src.view_frames(frames), &mut dst.view_mut_frames(frames))?;
            }
        }

        Ok(())
    }

    pub fn set_value(&self, id: &str, name: &str, value: impl Into<ParamValue>) -> Result<()> {
        let node = self.node(id).ok_or_else(|| Error::UnknownNode(id.to_string()))?;
        Ok(node.set_value(name, value.into())?)
    }

    pub fn get_value(&self, id: &str, name: &str) -> Result<ParamValue> {
        let node = self.node(id).ok_or_else(|| Error::UnknownNode(id.to_string()))?;
        Ok(node.get_value(name)?)
    }

    /// Sum of node latencies.
    pub fn latency_frames(&self) -> usize {
        self.slots.iter().map(|slot| slot.node.latency_frames()).sum()
    }

    /// Clear every node's processing history.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.node.reset();
        }
        for buffer in &mut self.scratch {
            buffer.clear();
        }
    }

    /// Handle for writing parameters from the control context.
    pub fn control(&self) -> ChainControl {
        ChainControl {
            nodes: self
                .slots
                .iter()
                .map(|slot| (slot.id.clone(), Arc::clone(slot.node.parameters())))
                .collect(),
        }
    }
}

impl Default for EffectChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameter access to a chain's nodes without owning the chain.
///
/// Holds the nodes' shared parameter stores, so it can live on a control thread
/// while the chain itself is moved into the audio callback.
#[derive(Clone)]
pub struct ChainControl {
    nodes: Arc<[(String, Arc<ParameterStore>)]>,
}

impl ChainControl {
    pub fn contains(&self, id: &str) -> bool {
        self.store(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|(id, _)| id.as_str())
    }

    pub fn store(&self, id: &str) -> Option<&Arc<ParameterStore>> {
        self.nodes
            .iter()
            .find(|(node_id, _)| node_id == id)
            .map(|(_, store)| store)
    }

    pub fn set_value(&self, id: &str, name: &str, value: impl Into<ParamValue>) -> Result<()> {
        let store = self.store(id).ok_or_else(|| Error::UnknownNode(id.to_string()))?;
        Ok(store.set(name, value.into())?)
    }

    pub fn get_value(&self, id: &str, name: &str) -> Result<ParamValue> {
        let store = self.store(id).ok_or_else(|| Error::UnknownNode(id.to_string()))?;
        Ok(store.get(name)?)
    }
}
