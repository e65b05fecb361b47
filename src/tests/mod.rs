// Test suite for the SPU core

use crate::host::Host;

#[cfg(test)]
mod save_state_tests;


/// Host stub that records everything the SPU pushes out
pub struct TestHost {
    pub frames: Vec<(i16, i16)>,
    pub irq_count: u32,
    pub sync_count: u32,
    pub dma_requests: Vec<bool>,
    pub audio_flushes: u32,
}

impl TestHost {
    pub fn new() -> TestHost {
        TestHost {
            frames: Vec::new(),
            irq_count: 0,
            sync_count: 0,
            dma_requests: Vec::new(),
            audio_flushes: 0,
        }
    }
}

impl Host for TestHost {
    fn synchronize(&mut self) {
        self.sync_count += 1;
    }

    fn write_samples(&mut self, frames: &[i16]) {
        for pair in frames.chunks(2) {
            self.frames.push((pair[0], pair[1]));
        }
    }

    fn set_dma_request(&mut self, request: bool) {
        self.dma_requests.push(request);
    }

    fn trigger_irq(&mut self) {
        self.irq_count += 1;
    }

    fn empty_audio_buffers(&mut self) {
        self.audio_flushes += 1;
    }
}
