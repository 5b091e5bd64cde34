//! Render node trait.

/// A unit of audio processing in an [`AudioGraph`](crate::AudioGraph).
///
/// Nodes are driven one frame at a time from the render thread. `tick` must
/// not allocate, lock, or block. Parameters reach a node through shared
/// atomics it captured at construction, never through `&mut` access from the
/// control thread.
pub trait RenderNode: Send {
    /// Number of mono input ports.
    fn inputs(&self) -> usize;

    /// Number of output channels.
    fn outputs(&self) -> usize;

    /// Process one frame. `input.len() == self.inputs()`,
    /// `output.len() == self.outputs()`.
    fn tick(&mut self, input: &[f32], output: &mut [f32]);

    /// Called once when the graph is built, before the first `tick`.
    fn set_sample_rate(&mut self, _sample_rate: f64) {}

    /// Drop internal state (delay lines, play heads, ramps).
    fn reset(&mut self) {}

    /// Short name for diagnostics.
    fn name(&self) -> &'static str;
}
