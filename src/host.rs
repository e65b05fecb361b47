//! Capability interface between the SPU core and the rest of the emulator

/// Collaborators the SPU reaches while it runs.
///
/// The SPU never owns the scheduler, DMA controller, interrupt controller or
/// audio sink; it borrows them through this trait for the duration of a call.
/// Everything here runs on the emulator's single cooperative thread.
pub trait Host {
    /// Drive the external scheduler until every subsystem has caught up with
    /// the current cycle. Called before a register write changes audible
    /// state so the pre-write and post-write epochs are cleanly separated.
    fn synchronize(&mut self);

    /// Push finalized stereo frames (interleaved left/right) to the audio
    /// sink. One frame per generated sample, in source clock order.
    fn write_samples(&mut self, frames: &[i16]);

    /// Drive the SPU DMA request line.
    fn set_dma_request(&mut self, request: bool);

    /// Assert the SPU interrupt (IRQ9) at the interrupt controller.
    fn trigger_irq(&mut self);

    /// Drop anything still buffered in the audio sink. Called when a save
    /// state is restored so stale samples don't play over the new timeline.
    fn empty_audio_buffers(&mut self);
}
