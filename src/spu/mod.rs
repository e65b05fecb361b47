//! Sound Processing Unit
//!
//! The SPU owns 512KiB of private sample RAM and 24 voices, each decoding a
//! 4-bit ADPCM stream resampled through a Gaussian kernel and shaped by an
//! ADSR envelope. The CPU sees a window of 16-bit registers; bulk sample
//! uploads go through a shared transfer cursor, either programmed-I/O or DMA.
//! Every 0x300 source clock ticks the unit mixes all voices (plus the CD
//! audio stream) into one stereo frame for the audio sink.

mod fifo;
mod gauss;
mod voice;

use crate::host::Host;
use crate::CycleCount;
use fifo::CdFifo;
use log::{debug, error, trace, warn};
use serde::{Deserialize, Serialize};
use voice::{AdpcmBlock, Voice};

pub use voice::AdsrPhase;

/// Offset into the SPU internal RAM, in bytes
pub type RamIndex = u32;

/// SPU RAM size in bytes
pub const RAM_SIZE: usize = 512 * 1024;
/// Mask applied to every RAM index
pub const RAM_MASK: u32 = RAM_SIZE as u32 - 1;
/// Number of hardware voices
pub const NUM_VOICES: usize = 24;
/// Source clock ticks per generated sample: 33.8688MHz / 44.1kHz
pub const SYSCLK_TICKS_PER_SAMPLE: CycleCount = 0x300;
/// Voice addresses count 8-byte units of RAM
const VOICE_ADDRESS_SHIFT: u32 = 3;
/// An encoded ADPCM block: shift/filter byte, flags byte, 14 nibble pairs
pub const ADPCM_BLOCK_SIZE: usize = 16;
/// Samples decoded from one block
pub const SAMPLES_PER_ADPCM_BLOCK: usize = 28;

/// RAM access mode requested through SPUCNT bits 4-5
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RamTransferMode {
    Stop,
    ManualWrite,
    DmaWrite,
    DmaRead,
}

/// SPUCNT control word, stored raw with derived fields computed on read
#[derive(Serialize, Deserialize, Copy, Clone, Default)]
struct SpuControl(u16);

impl SpuControl {
    fn bits(self) -> u16 {
        self.0
    }

    fn enabled(self) -> bool {
        self.0 & (1 << 15) != 0
    }

    fn irq9_enabled(self) -> bool {
        self.0 & (1 << 6) != 0
    }

    fn cd_audio_enabled(self) -> bool {
        self.0 & 1 != 0
    }

    fn ram_transfer_mode(self) -> RamTransferMode {
        match (self.0 >> 4) & 3 {
            0 => RamTransferMode::Stop,
            1 => RamTransferMode::ManualWrite,
            2 => RamTransferMode::DmaWrite,
            _ => RamTransferMode::DmaRead,
        }
    }
}

/// SPUSTAT status word
#[derive(Serialize, Deserialize, Copy, Clone, Default)]
struct SpuStatus(u16);

impl SpuStatus {
    fn bits(self) -> u16 {
        self.0
    }

    fn irq9_flag(self) -> bool {
        self.0 & (1 << 6) != 0
    }

    fn set_irq9_flag(&mut self, set: bool) {
        if set {
            self.0 |= 1 << 6;
        } else {
            self.0 &= !(1 << 6);
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct Spu {
    control: SpuControl,
    status: SpuStatus,
    /// Last value written to the transfer address register
    transfer_address_reg: u16,
    /// Live transfer cursor, in bytes
    transfer_address: RamIndex,
    /// RAM address that triggers the interrupt, in voice address units
    irq_address: u16,
    /// Main volume, stored but not applied to the mix
    main_volume_left: u16,
    main_volume_right: u16,
    /// Reverb output volume, stored only (reverb is not synthesized)
    reverb_out_volume_left: u16,
    reverb_out_volume_right: u16,
    /// Start of the reverb working area, stored only
    reverb_base: u16,
    /// Transfer mangling control, 4 is the only sane value
    transfer_control: u16,
    cd_volume_left: u16,
    cd_volume_right: u16,
    ext_volume_left: u16,
    ext_volume_right: u16,
    /// Key-on latch, one bit per voice, retained for readback
    key_on_register: u32,
    /// Key-off latch, one bit per voice, retained for readback
    key_off_register: u32,
    /// Bit per voice, set when a non-repeating loop end is reached
    endx_register: u32,
    /// Voices fed to the reverb unit, stored only
    reverb_on_register: u32,
    /// Voices with pitch modulation requested, stored only
    pitch_modulation_enable: u32,
    /// Voices in noise mode, stored only
    noise_mode_enable: u32,
    /// Source clock remainder below one sample period
    ticks_carry: CycleCount,
    voices: [Voice; NUM_VOICES],
    #[serde(with = "serde_big_array::BigArray")]
    ram: [u8; RAM_SIZE],
    /// Stereo samples pushed by the CD controller, mixed into the output
    cd_fifo: CdFifo,
}

impl Spu {
    pub fn new() -> Spu {
        Spu {
            control: SpuControl::default(),
            status: SpuStatus::default(),
            transfer_address_reg: 0,
            transfer_address: 0,
            irq_address: 0,
            main_volume_left: 0,
            main_volume_right: 0,
            reverb_out_volume_left: 0,
            reverb_out_volume_right: 0,
            reverb_base: 0,
            transfer_control: 0,
            cd_volume_left: 0,
            cd_volume_right: 0,
            ext_volume_left: 0,
            ext_volume_right: 0,
            key_on_register: 0,
            key_off_register: 0,
            endx_register: 0,
            reverb_on_register: 0,
            pitch_modulation_enable: 0,
            noise_mode_enable: 0,
            ticks_carry: 0,
            voices: std::array::from_fn(|_| Voice::new()),
            ram: [0; RAM_SIZE],
            cd_fifo: CdFifo::new(),
        }
    }

    /// Return the SPU to its power-on state
    pub fn reset(&mut self) {
        self.control = SpuControl::default();
        self.status = SpuStatus::default();
        self.transfer_address_reg = 0;
        self.transfer_address = 0;
        self.irq_address = 0;
        self.main_volume_left = 0;
        self.main_volume_right = 0;
        self.reverb_out_volume_left = 0;
        self.reverb_out_volume_right = 0;
        self.reverb_base = 0;
        self.transfer_control = 0;
        self.cd_volume_left = 0;
        self.cd_volume_right = 0;
        self.ext_volume_left = 0;
        self.ext_volume_right = 0;
        self.key_on_register = 0;
        self.key_off_register = 0;
        self.endx_register = 0;
        self.reverb_on_register = 0;
        self.pitch_modulation_enable = 0;
        self.noise_mode_enable = 0;
        self.ticks_carry = 0;
        for voice in &mut self.voices {
            *voice = Voice::new();
        }
        self.ram.fill(0);
        self.cd_fifo = CdFifo::new();
    }

    /// Run the SPU for `ticks` source clock cycles, generating one stereo
    /// frame per elapsed 0x300-tick sample period
    pub fn execute(&mut self, ticks: CycleCount, host: &mut dyn Host) {
        let num_samples = (ticks + self.ticks_carry) / SYSCLK_TICKS_PER_SAMPLE;
        self.ticks_carry = (ticks + self.ticks_carry) % SYSCLK_TICKS_PER_SAMPLE;

        if num_samples == 0 || (!self.control.enabled() && !self.control.cd_audio_enabled()) {
            return;
        }

        for _ in 0..num_samples {
            self.generate_sample(host);
        }
    }

    fn generate_sample(&mut self, host: &mut dyn Host) {
        let mut left_sum = 0i32;
        let mut right_sum = 0i32;

        if self.control.enabled() {
            for i in 0..NUM_VOICES {
                let (left, right) = self.sample_voice(i, host);
                left_sum += left;
                right_sum += right;
            }
        }

        // TODO: scale the CD stream by cd_volume_left/right
        if self.control.cd_audio_enabled() && !self.cd_fifo.is_empty() {
            left_sum += i32::from(self.cd_fifo.pop());
            right_sum += i32::from(self.cd_fifo.pop());
        }

        let frame = [saturate_to_i16(left_sum), saturate_to_i16(right_sum)];
        host.write_samples(&frame);
    }

    /// Produce the next stereo contribution of one voice
    fn sample_voice(&mut self, voice_index: usize, host: &mut dyn Host) -> (i32, i32) {
        debug_assert!(voice_index < NUM_VOICES);

        if !self.voices[voice_index].is_on() {
            return (0, 0);
        }

        if !self.voices[voice_index].has_samples {
            let address = self.voices[voice_index].current_address;
            let block = self.read_adpcm_block(address, host);

            let voice = &mut self.voices[voice_index];
            voice.decode_block(&block);

            if voice.current_block_flags.loop_start() {
                trace!("Voice {} loop start @ {:#06x}", voice_index, address);
                voice.latch_repeat_address();
            }
        }

        let block_ended = {
            let voice = &mut self.voices[voice_index];
            voice.advance_counter();

            if voice.sample_index() >= SAMPLES_PER_ADPCM_BLOCK {
                voice.start_next_block();

                if voice.current_block_flags.loop_end() {
                    if voice.current_block_flags.loop_repeat() {
                        trace!(
                            "Voice {} loop end+repeat @ {:#06x}",
                            voice_index,
                            voice.current_address
                        );
                        voice.take_loop();
                        false
                    } else {
                        trace!(
                            "Voice {} loop end+mute @ {:#06x}",
                            voice_index,
                            voice.current_address
                        );
                        voice.key_off();
                        true
                    }
                } else {
                    voice.advance_block();
                    false
                }
            } else {
                false
            }
        };

        if block_ended {
            self.endx_register |= 1 << voice_index;
        }

        let voice = &mut self.voices[voice_index];
        let sample = apply_volume(i32::from(voice.interpolate()), voice.regs.adsr_volume);
        voice.tick_adsr();

        let left = apply_volume(sample, voice.regs.volume_left.volume());
        let right = apply_volume(sample, voice.regs.volume_right.volume());
        (left, right)
    }

    /// Fetch the 16-byte block at `address` (in voice address units),
    /// raising the interrupt when the fetch touches the IRQ address
    fn read_adpcm_block(&mut self, address: u16, host: &mut dyn Host) -> AdpcmBlock {
        let ram_address = (u32::from(address) << VOICE_ADDRESS_SHIFT) & RAM_MASK;

        // A block covers two 8-byte voice address units
        if self.control.irq9_enabled()
            && (self.irq_address == address || self.irq_address == address.wrapping_add(1))
        {
            debug!("SPU IRQ on block fetch at {:#07x}", ram_address);
            self.raise_irq(host);
        }

        let mut bytes = [0u8; ADPCM_BLOCK_SIZE];
        let start = ram_address as usize;
        if start + ADPCM_BLOCK_SIZE <= RAM_SIZE {
            bytes.copy_from_slice(&self.ram[start..start + ADPCM_BLOCK_SIZE]);
        } else {
            for (i, byte) in bytes.iter_mut().enumerate() {
                *byte = self.ram[(start + i) & RAM_MASK as usize];
            }
        }

        AdpcmBlock { bytes }
    }

    /// Latch the sticky IRQ flag, asserting the line on the transition only
    fn raise_irq(&mut self, host: &mut dyn Host) {
        if !self.status.irq9_flag() {
            self.status.set_irq9_flag(true);
            host.trigger_irq();
        }
    }

    fn update_dma_request(&mut self, host: &mut dyn Host) {
        let request = matches!(
            self.control.ram_transfer_mode(),
            RamTransferMode::DmaWrite | RamTransferMode::DmaRead
        );
        host.set_dma_request(request);
    }

    /// Pop 16 bits from RAM at the transfer cursor
    fn transfer_read(&mut self) -> u16 {
        let index = self.transfer_address as usize;
        let lsb = self.ram[index];
        let msb = self.ram[(index + 1) & RAM_MASK as usize];
        self.transfer_address = (self.transfer_address + 2) & RAM_MASK;

        u16::from_le_bytes([lsb, msb])
    }

    /// Push 16 bits into RAM at the transfer cursor
    fn transfer_write(&mut self, value: u16) {
        trace!(
            "SPU RAM @ {:#07x} (voice {:#06x}) <- {:#06x}",
            self.transfer_address,
            self.transfer_address >> VOICE_ADDRESS_SHIFT,
            value
        );

        let [lsb, msb] = value.to_le_bytes();
        let index = self.transfer_address as usize;
        self.ram[index] = lsb;
        self.ram[(index + 1) & RAM_MASK as usize] = msb;
        self.transfer_address = (self.transfer_address + 2) & RAM_MASK;
    }

    /// DMA bulk read from the transfer cursor
    pub fn dma_read(&mut self, words: &mut [u32]) {
        let byte_count = words.len() * 4;
        let start = self.transfer_address as usize;

        if start + byte_count <= RAM_SIZE {
            for (i, word) in words.iter_mut().enumerate() {
                let b = start + i * 4;
                *word = u32::from_le_bytes([
                    self.ram[b],
                    self.ram[b + 1],
                    self.ram[b + 2],
                    self.ram[b + 3],
                ]);
            }
            self.transfer_address = ((start + byte_count) as u32) & RAM_MASK;
        } else {
            // The window wraps, fall back to halfword transfers
            for word in words.iter_mut() {
                let lsb = self.transfer_read();
                let msb = self.transfer_read();
                *word = u32::from(lsb) | (u32::from(msb) << 16);
            }
        }
    }

    /// DMA bulk write to the transfer cursor
    pub fn dma_write(&mut self, words: &[u32]) {
        let byte_count = words.len() * 4;
        let start = self.transfer_address as usize;

        if start + byte_count <= RAM_SIZE {
            for (i, word) in words.iter().enumerate() {
                let b = start + i * 4;
                self.ram[b..b + 4].copy_from_slice(&word.to_le_bytes());
            }
            self.transfer_address = ((start + byte_count) as u32) & RAM_MASK;
        } else {
            for &word in words {
                self.transfer_write(word as u16);
                self.transfer_write((word >> 16) as u16);
            }
        }
    }

    /// Queue stereo CD audio (interleaved left/right) for mixing
    pub fn push_cd_samples(&mut self, samples: &[i16]) {
        debug_assert!(samples.len() % 2 == 0);
        self.cd_fifo.push_slice(samples);
    }

    pub fn read_register(&mut self, offset: u32) -> u16 {
        if offset < regmap::MAIN_VOLUME_LEFT {
            return self.read_voice_register(offset);
        }

        match offset {
            regmap::MAIN_VOLUME_LEFT => self.main_volume_left,
            regmap::MAIN_VOLUME_RIGHT => self.main_volume_right,
            regmap::REVERB_VOLUME_LEFT => self.reverb_out_volume_left,
            regmap::REVERB_VOLUME_RIGHT => self.reverb_out_volume_right,
            regmap::KEY_ON_LO => self.key_on_register as u16,
            regmap::KEY_ON_HI => (self.key_on_register >> 16) as u16,
            regmap::KEY_OFF_LO => self.key_off_register as u16,
            regmap::KEY_OFF_HI => (self.key_off_register >> 16) as u16,
            regmap::PITCH_MOD_ON_LO => self.pitch_modulation_enable as u16,
            regmap::PITCH_MOD_ON_HI => (self.pitch_modulation_enable >> 16) as u16,
            regmap::NOISE_MODE_ON_LO => self.noise_mode_enable as u16,
            regmap::NOISE_MODE_ON_HI => (self.noise_mode_enable >> 16) as u16,
            regmap::REVERB_ON_LO => self.reverb_on_register as u16,
            regmap::REVERB_ON_HI => (self.reverb_on_register >> 16) as u16,
            regmap::ENDX_LO => self.endx_register as u16,
            regmap::ENDX_HI => (self.endx_register >> 16) as u16,
            regmap::REVERB_BASE => self.reverb_base,
            regmap::IRQ_ADDRESS => self.irq_address,
            regmap::TRANSFER_ADDRESS => self.transfer_address_reg,
            regmap::TRANSFER_DATA => {
                error!("SPU transfer data register read");
                0xFFFF
            }
            regmap::CONTROL => self.control.bits(),
            regmap::TRANSFER_CONTROL => self.transfer_control,
            regmap::STATUS => self.status.bits(),
            regmap::CD_VOLUME_LEFT => self.cd_volume_left,
            regmap::CD_VOLUME_RIGHT => self.cd_volume_right,
            regmap::EXT_VOLUME_LEFT => self.ext_volume_left,
            regmap::EXT_VOLUME_RIGHT => self.ext_volume_right,
            _ => {
                error!("Unknown SPU register read: offset {:#05x}", offset);
                0xFFFF
            }
        }
    }

    pub fn write_register(&mut self, offset: u32, value: u16, host: &mut dyn Host) {
        if offset < regmap::MAIN_VOLUME_LEFT {
            self.write_voice_register(offset, value, host);
            return;
        }

        match offset {
            regmap::MAIN_VOLUME_LEFT => {
                debug!("SPU main volume left <- {:#06x}", value);
                host.synchronize();
                self.main_volume_left = value;
            }
            regmap::MAIN_VOLUME_RIGHT => {
                debug!("SPU main volume right <- {:#06x}", value);
                host.synchronize();
                self.main_volume_right = value;
            }
            regmap::REVERB_VOLUME_LEFT => self.reverb_out_volume_left = value,
            regmap::REVERB_VOLUME_RIGHT => self.reverb_out_volume_right = value,
            regmap::KEY_ON_LO => {
                debug!("SPU key on low <- {:#06x}", value);
                host.synchronize();
                self.key_on_register = (self.key_on_register & 0xFFFF_0000) | u32::from(value);
                self.key_voices(value, 0, Voice::key_on);
            }
            regmap::KEY_ON_HI => {
                debug!("SPU key on high <- {:#06x}", value);
                host.synchronize();
                self.key_on_register =
                    (self.key_on_register & 0x0000_FFFF) | (u32::from(value) << 16);
                self.key_voices(value, 16, Voice::key_on);
            }
            regmap::KEY_OFF_LO => {
                debug!("SPU key off low <- {:#06x}", value);
                host.synchronize();
                self.key_off_register = (self.key_off_register & 0xFFFF_0000) | u32::from(value);
                self.key_voices(value, 0, Voice::key_off);
            }
            regmap::KEY_OFF_HI => {
                debug!("SPU key off high <- {:#06x}", value);
                host.synchronize();
                self.key_off_register =
                    (self.key_off_register & 0x0000_FFFF) | (u32::from(value) << 16);
                self.key_voices(value, 16, Voice::key_off);
            }
            regmap::PITCH_MOD_ON_LO => {
                self.pitch_modulation_enable =
                    (self.pitch_modulation_enable & 0xFFFF_0000) | u32::from(value);
            }
            regmap::PITCH_MOD_ON_HI => {
                self.pitch_modulation_enable =
                    (self.pitch_modulation_enable & 0x0000_FFFF) | (u32::from(value) << 16);
            }
            regmap::NOISE_MODE_ON_LO => {
                self.noise_mode_enable = (self.noise_mode_enable & 0xFFFF_0000) | u32::from(value);
            }
            regmap::NOISE_MODE_ON_HI => {
                self.noise_mode_enable =
                    (self.noise_mode_enable & 0x0000_FFFF) | (u32::from(value) << 16);
            }
            regmap::REVERB_ON_LO => {
                debug!("SPU reverb on low <- {:#06x}", value);
                host.synchronize();
                self.reverb_on_register = (self.reverb_on_register & 0xFFFF_0000) | u32::from(value);
            }
            regmap::REVERB_ON_HI => {
                debug!("SPU reverb on high <- {:#06x}", value);
                host.synchronize();
                self.reverb_on_register =
                    (self.reverb_on_register & 0x0000_FFFF) | (u32::from(value) << 16);
            }
            regmap::ENDX_LO | regmap::ENDX_HI => {
                debug!("SPU write to read-only ENDX register: {:#06x}", value);
            }
            regmap::REVERB_BASE => self.reverb_base = value,
            regmap::IRQ_ADDRESS => {
                debug!("SPU IRQ address <- {:#06x}", value);
                self.irq_address = value;
            }
            regmap::TRANSFER_ADDRESS => {
                debug!("SPU transfer address register <- {:#06x}", value);
                self.transfer_address_reg = value;
                self.transfer_address = (u32::from(value) << VOICE_ADDRESS_SHIFT) & RAM_MASK;
            }
            regmap::TRANSFER_DATA => {
                trace!(
                    "SPU transfer data register <- {:#06x} (RAM offset {:#07x})",
                    value,
                    self.transfer_address
                );
                self.transfer_write(value);
            }
            regmap::CONTROL => {
                debug!("SPU control register <- {:#06x}", value);
                self.control = SpuControl(value);
                self.update_dma_request(host);
            }
            regmap::TRANSFER_CONTROL => {
                if value != 4 {
                    // Anything else makes the hardware repeat bytes in odd
                    // patterns during transfers
                    warn!("SPU transfer control set to {:#x}", value);
                }
                self.transfer_control = value;
            }
            regmap::STATUS => (),
            regmap::CD_VOLUME_LEFT => self.cd_volume_left = value,
            regmap::CD_VOLUME_RIGHT => self.cd_volume_right = value,
            regmap::EXT_VOLUME_LEFT => self.ext_volume_left = value,
            regmap::EXT_VOLUME_RIGHT => self.ext_volume_right = value,
            _ => {
                error!(
                    "Unknown SPU register write: offset {:#05x} value {:#06x}",
                    offset, value
                );
            }
        }
    }

    /// Apply `action` to every voice whose bit is set in `bits`
    fn key_voices(&mut self, bits: u16, first_voice: usize, action: fn(&mut Voice)) {
        let mut bits = bits;
        for i in first_voice..(first_voice + 16).min(NUM_VOICES) {
            if bits & 1 != 0 {
                debug!("Voice {} keyed", i);
                action(&mut self.voices[i]);
            }
            bits >>= 1;
        }
    }

    fn read_voice_register(&self, offset: u32) -> u16 {
        let voice_index = (offset / 0x10) as usize;
        debug_assert!(voice_index < NUM_VOICES);
        let voice = &self.voices[voice_index];

        match offset % 0x10 {
            0x00 => voice.regs.volume_left.0,
            0x02 => voice.regs.volume_right.0,
            0x04 => voice.regs.adpcm_sample_rate,
            0x06 => voice.regs.adpcm_start_address,
            0x08 => voice.regs.adsr_lo,
            0x0A => voice.regs.adsr_hi,
            0x0C => voice.regs.adsr_volume as u16,
            0x0E => voice.regs.adpcm_repeat_address,
            _ => {
                error!("Unknown SPU voice {} register read: {:#05x}", voice_index, offset);
                0xFFFF
            }
        }
    }

    fn write_voice_register(&mut self, offset: u32, value: u16, host: &mut dyn Host) {
        let voice_index = (offset / 0x10) as usize;
        debug_assert!(voice_index < NUM_VOICES);

        // Writes to a playing voice are audible, keep them sample-accurate
        if self.voices[voice_index].is_on() {
            host.synchronize();
        }

        let voice = &mut self.voices[voice_index];
        match offset % 0x10 {
            0x00 => {
                let volume = voice::VolumeRegister(value);
                if volume.sweep_mode() {
                    warn!(
                        "SPU voice {} volume left sweep requested (unimplemented): {:#06x}",
                        voice_index, value
                    );
                }
                voice.regs.volume_left = volume;
            }
            0x02 => {
                let volume = voice::VolumeRegister(value);
                if volume.sweep_mode() {
                    warn!(
                        "SPU voice {} volume right sweep requested (unimplemented): {:#06x}",
                        voice_index, value
                    );
                }
                voice.regs.volume_right = volume;
            }
            0x04 => voice.regs.adpcm_sample_rate = value,
            0x06 => voice.regs.adpcm_start_address = value,
            0x08 => voice.regs.adsr_lo = value,
            0x0A => voice.regs.adsr_hi = value,
            0x0C => voice.regs.adsr_volume = value as i16,
            0x0E => voice.regs.adpcm_repeat_address = value,
            _ => {
                error!(
                    "Unknown SPU voice {} register write: {:#05x} value {:#06x}",
                    voice_index, offset, value
                );
            }
        }
    }

    /// Snapshot of one voice for an external debug UI
    pub fn voice_debug(&self, voice_index: usize) -> VoiceDebug {
        let voice = &self.voices[voice_index];
        VoiceDebug {
            adsr_phase: voice.adsr_phase,
            adsr_volume: voice.regs.adsr_volume,
            current_address: voice.current_address,
            start_address: voice.regs.adpcm_start_address,
            repeat_address: voice.regs.adpcm_repeat_address,
            sample_rate: voice.regs.adpcm_sample_rate,
            volume_left: voice.regs.volume_left.0,
            volume_right: voice.regs.volume_right.0,
            interpolation_index: ((voice.counter >> 4) & 0xFF) as u16,
            sample_index: (voice.counter >> 12) as u16,
        }
    }
}

impl Default for Spu {
    fn default() -> Spu {
        Spu::new()
    }
}

/// Read-only view of one voice
#[derive(Debug, Clone, Copy)]
pub struct VoiceDebug {
    pub adsr_phase: AdsrPhase,
    pub adsr_volume: i16,
    pub current_address: u16,
    pub start_address: u16,
    pub repeat_address: u16,
    pub sample_rate: u16,
    pub volume_left: u16,
    pub volume_right: u16,
    pub interpolation_index: u16,
    pub sample_index: u16,
}

/// Multiply a sample by a 15-bit volume without saturating
fn apply_volume(sample: i32, volume: i16) -> i32 {
    (sample * i32::from(volume)) >> 15
}

/// Saturating cast from i32 to i16
pub(crate) fn saturate_to_i16(v: i32) -> i16 {
    v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

pub mod regmap {
    //! Global register map: byte offsets from the SPU base address.
    //! Everything below 0x180 addresses the per-voice register blocks.

    pub const MAIN_VOLUME_LEFT: u32 = 0x180;
    pub const MAIN_VOLUME_RIGHT: u32 = 0x182;
    pub const REVERB_VOLUME_LEFT: u32 = 0x184;
    pub const REVERB_VOLUME_RIGHT: u32 = 0x186;
    pub const KEY_ON_LO: u32 = 0x188;
    pub const KEY_ON_HI: u32 = 0x18A;
    pub const KEY_OFF_LO: u32 = 0x18C;
    pub const KEY_OFF_HI: u32 = 0x18E;
    pub const PITCH_MOD_ON_LO: u32 = 0x190;
    pub const PITCH_MOD_ON_HI: u32 = 0x192;
    pub const NOISE_MODE_ON_LO: u32 = 0x194;
    pub const NOISE_MODE_ON_HI: u32 = 0x196;
    pub const REVERB_ON_LO: u32 = 0x198;
    pub const REVERB_ON_HI: u32 = 0x19A;
    pub const ENDX_LO: u32 = 0x19C;
    pub const ENDX_HI: u32 = 0x19E;
    pub const REVERB_BASE: u32 = 0x1A2;
    pub const IRQ_ADDRESS: u32 = 0x1A4;
    pub const TRANSFER_ADDRESS: u32 = 0x1A6;
    pub const TRANSFER_DATA: u32 = 0x1A8;
    pub const CONTROL: u32 = 0x1AA;
    pub const TRANSFER_CONTROL: u32 = 0x1AC;
    pub const STATUS: u32 = 0x1AE;
    pub const CD_VOLUME_LEFT: u32 = 0x1B0;
    pub const CD_VOLUME_RIGHT: u32 = 0x1B2;
    pub const EXT_VOLUME_LEFT: u32 = 0x1B4;
    pub const EXT_VOLUME_RIGHT: u32 = 0x1B6;
}
