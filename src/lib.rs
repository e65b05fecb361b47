//! Sound Processing Unit core
//!
//! Cycle-driven emulation of the console's 24-voice ADPCM synthesizer:
//! per-voice ADSR envelopes, 4-tap Gaussian resampling, 512KiB of dedicated
//! audio RAM behind a memory-mapped register window, and DMA/programmed-I/O
//! transfer paths. The external scheduler drives [`Spu::execute`] with source
//! clock ticks and the SPU pushes one stereo frame to the audio sink every
//! 0x300 ticks (44.1kHz).
//!
//! The rest of the machine (scheduler, DMA controller, interrupt controller,
//! audio sink) is reached through the [`Host`] capability trait.

pub mod error;
pub mod host;
pub mod save_state;
pub mod spu;

#[cfg(test)]
mod tests;

/// Count of source clock ticks, signed so scheduling arithmetic can borrow
pub type CycleCount = i32;

pub use error::{Result, SpuError};
pub use host::Host;
pub use spu::{AdsrPhase, Spu};
