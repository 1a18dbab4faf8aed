//! The effect node contract.
//!
//! A node is driven in two phases: [`EffectNode::negotiate_format`] once from a
//! non-real-time setup context (this is where buffers are allocated), then
//! [`EffectNode::process`] once per buffer from the audio context. Parameters live
//! in the node's shared [`ParameterStore`] and may be written from a control
//! context at any time.

use crate::{
    AudioBufferMut, AudioBufferRef, AudioBusFormat, Error, ParamValue, ParameterStore, Result,
};
use std::sync::Arc;

/// Uniform lifecycle shared by every effect.
///
/// `process` must fully overwrite the output, must not allocate or block, and must
/// fail with [`Error::NotConfigured`] when no format has been negotiated.
pub trait EffectNode: Send {
    /// Registry type name, e.g. `"RingMod"`.
    fn type_name(&self) -> &'static str;

    /// Validate `input`, (re)allocate internal buffers and return the output format.
    ///
    /// Calling again with the same format is safe and replaces previous allocations.
    fn negotiate_format(&mut self, input: AudioBusFormat) -> Result<AudioBusFormat>;

    /// The negotiated format, if any.
    fn format(&self) -> Option<AudioBusFormat>;

    /// Process one buffer.
    fn process(
        &mut self,
        input: &AudioBufferRef<'_>,
        output: &mut AudioBufferMut<'_>,
    ) -> Result<()>;

    /// Parameter cells shared with control handles.
    fn parameters(&self) -> &Arc<ParameterStore>;

    /// Store a parameter value, clamping numeric values into range.
    fn set_value(&self, name: &str, value: ParamValue) -> Result<()> {
        self.parameters().set(name, value)
    }

    /// Last stored value of a parameter.
    fn get_value(&self, name: &str) -> Result<ParamValue> {
        self.parameters().get(name)
    }

    /// Frames of delay between input and output.
    fn latency_frames(&self) -> usize {
        0
    }

    /// Clear processing history. Parameters and format are kept.
    fn reset(&mut self) {}
}

/// Check a pair of buffers against the negotiated format and return the frame count.
///
/// Buffers shorter than `frames_per_buffer` are accepted; input and output must
/// agree on length.
pub fn check_buffers(
    format: &AudioBusFormat,
    input: &AudioBufferRef<'_>,
    output: &AudioBufferMut<'_>,
) -> Result<usize> {
    if input.channels() == 0 || output.channels() == 0 {
        return Err(Error::MissingBuffer);
    }
    let frames = input.frames();
    for (channels, len) in [
        (input.channels(), frames),
        (output.channels(), output.frames()),
    ] {
        if channels != format.channels || len > format.frames_per_buffer || len != frames {
            return Err(Error::BufferMismatch {
                expected_channels: format.channels,
                actual_channels: channels,
                max_frames: format.frames_per_buffer,
                frames: len,
            });
        }
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AudioBuffer, ParamSpec};

    struct Passthrough {
        params: Arc<ParameterStore>,
        format: Option<AudioBusFormat>,
    }

    impl EffectNode for Passthrough {
        fn type_name(&self) -> &'static str {
            "Passthrough"
        }

        fn negotiate_format(&mut self, input: AudioBusFormat) -> Result<AudioBusFormat> {
            input.validate()?;
            self.format = Some(input);
            Ok(input)
        }

        fn format(&self) -> Option<AudioBusFormat> {
            self.format
        }

        fn process(
            &mut self,
            input: &AudioBufferRef<'_>,
            output: &mut AudioBufferMut<'_>,
        ) -> Result<()> {
            let format = self.format.ok_or(Error::NotConfigured)?;
            check_buffers(&format, input, output)?;
            output.copy_from(input);
            Ok(())
        }

        fn parameters(&self) -> &Arc<ParameterStore> {
            &self.params
        }
    }

    fn passthrough() -> Passthrough {
        Passthrough {
            params: Arc::new(ParameterStore::new(
                "Passthrough",
                vec![ParamSpec::float("gain", 0.0, 2.0, 1.0)],
            )),
            format: None,
        }
    }

    #[test]
    fn test_default_value_access() {
        let node = passthrough();
        node.set_value("gain", 3.0.into()).unwrap();
        assert_eq!(node.get_value("gain").unwrap(), ParamValue::Float(2.0));
        assert!(node.get_value("missing").is_err());
        assert_eq!(node.latency_frames(), 0);
    }

    #[test]
    fn test_process_before_negotiation() {
        let mut node = passthrough();
        let input = AudioBuffer::new(2, 64);
        let mut output = AudioBuffer::new(2, 64);
        let result = node.process(&input.view(), &mut output.view_mut());
        assert_eq!(result, Err(Error::NotConfigured));
    }

    #[test]
    fn test_check_buffers() {
        let format = AudioBusFormat::new(48000, 2, 64);
        let input = AudioBuffer::new(2, 64);
        let mut output = AudioBuffer::new(2, 64);
        assert_eq!(
            check_buffers(&format, &input.view_frames(32), &output.view_mut_frames(32)),
            Ok(32)
        );

        let empty = AudioBuffer::new(0, 0);
        assert_eq!(
            check_buffers(&format, &empty.view(), &output.view_mut()),
            Err(Error::MissingBuffer)
        );

        let mono = AudioBuffer::new(1, 64);
        assert!(matches!(
            check_buffers(&format, &mono.view(), &output.view_mut()),
            Err(Error::BufferMismatch { actual_channels: 1, .. })
        ));

        let long = AudioBuffer::new(2, 128);
        let mut long_out = AudioBuffer::new(2, 128);
        assert!(matches!(
            check_buffers(&format, &long.view(), &long_out.view_mut()),
            Err(Error::BufferMismatch { frames: 128, .. })
        ));
    }
}
