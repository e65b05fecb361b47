// Save state tests

use crate::error::SpuError;
use crate::save_state;
use crate::spu::{regmap, Spu};
use crate::tests::TestHost;

fn populated_spu(host: &mut TestHost) -> Box<Spu> {
    let mut spu = Box::new(Spu::new());

    // Some RAM content and a playing voice
    spu.write_register(regmap::TRANSFER_ADDRESS, 0x0040, host);
    let pattern: Vec<u32> = (0..256u32).map(|i| i.wrapping_mul(0x0101_0101)).collect();
    spu.dma_write(&pattern);

    spu.write_register(0x04, 0x1800, host);
    spu.write_register(0x06, 0x0040, host);
    spu.write_register(0x08, 0x288E, host);
    spu.write_register(regmap::MAIN_VOLUME_LEFT, 0x3FFF, host);
    spu.write_register(regmap::IRQ_ADDRESS, 0x0123, host);
    spu.write_register(regmap::CONTROL, 1 << 15, host);
    spu.write_register(regmap::KEY_ON_LO, 1, host);

    for _ in 0..500 {
        spu.execute(0x300, host);
    }

    spu
}

#[test]
fn round_trip_restores_identical_state() {
    let mut host = TestHost::new();
    let mut spu = populated_spu(&mut host);

    let snapshot = save_state::save(&spu).unwrap();

    let mut restored = Box::new(Spu::new());
    save_state::load(&snapshot, &mut restored, &mut host).unwrap();
    assert_eq!(host.audio_flushes, 1);

    // Bitwise-identical state serializes to identical bytes
    assert_eq!(save_state::save(&restored).unwrap(), snapshot);

    // And the two instances keep producing the same audio
    let mut host_a = TestHost::new();
    let mut host_b = TestHost::new();
    for _ in 0..500 {
        spu.execute(0x300, &mut host_a);
        restored.execute(0x300, &mut host_b);
    }
    assert_eq!(host_a.frames, host_b.frames);
}

#[test]
fn reset_then_load_round_trips_through_the_same_instance() {
    let mut host = TestHost::new();
    let mut spu = populated_spu(&mut host);

    let snapshot = save_state::save(&spu).unwrap();
    spu.reset();
    assert_ne!(save_state::save(&spu).unwrap(), snapshot);

    save_state::load(&snapshot, &mut spu, &mut host).unwrap();
    assert_eq!(save_state::save(&spu).unwrap(), snapshot);

    // Spot-check a register and the RAM through the register interface
    assert_eq!(spu.read_register(regmap::MAIN_VOLUME_LEFT), 0x3FFF);
    assert_eq!(spu.read_register(regmap::IRQ_ADDRESS), 0x0123);
    spu.write_register(regmap::TRANSFER_ADDRESS, 0x0040, &mut host);
    let mut words = [0u32; 4];
    spu.dma_read(&mut words);
    assert_eq!(words[1], 0x0101_0101);
}

#[test]
fn save_is_deterministic() {
    let mut host = TestHost::new();
    let spu = populated_spu(&mut host);

    assert_eq!(
        save_state::save(&spu).unwrap(),
        save_state::save(&spu).unwrap()
    );
}

#[test]
fn load_rejects_garbage() {
    let mut spu = Spu::new();
    let mut host = TestHost::new();

    let result = save_state::load(&[0x12, 0x34, 0x56], &mut spu, &mut host);
    assert!(matches!(
        result,
        Err(SpuError::SaveStateError { .. }) | Err(SpuError::IoError(..))
    ));
    assert_eq!(host.audio_flushes, 0);
}

#[test]
fn load_rejects_corrupted_body() {
    use flate2::read::GzDecoder;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Read, Write};

    let mut host = TestHost::new();
    let spu = populated_spu(&mut host);
    let snapshot = save_state::save(&spu).unwrap();

    // Decompress, flip one body byte, recompress
    let mut raw = Vec::new();
    GzDecoder::new(&snapshot[..]).read_to_end(&mut raw).unwrap();
    let last = raw.len() - 1;
    raw[last] ^= 0xFF;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw).unwrap();
    let corrupted = encoder.finish().unwrap();

    let mut restored = Box::new(Spu::new());
    let result = save_state::load(&corrupted, &mut restored, &mut host);
    assert!(matches!(result, Err(SpuError::SaveStateError { .. })));
}

#[test]
fn load_rejects_wrong_magic() {
    use flate2::read::GzDecoder;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Read, Write};

    let mut host = TestHost::new();
    let snapshot = save_state::save(&Spu::new()).unwrap();

    let mut raw = Vec::new();
    GzDecoder::new(&snapshot[..]).read_to_end(&mut raw).unwrap();
    raw[0] ^= 0xFF;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw).unwrap();
    let corrupted = encoder.finish().unwrap();

    let mut spu = Spu::new();
    let result = save_state::load(&corrupted, &mut spu, &mut host);
    assert!(matches!(result, Err(SpuError::SaveStateError { .. })));
}
