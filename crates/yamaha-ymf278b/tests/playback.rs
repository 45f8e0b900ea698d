mod common;

use common::{
    Header, SAMPLE_BASE, chip, chip_with_ram, key_off, key_on, pcm_write, set_pitch, store_header,
};
use yamaha_ymf278b::slot::ENV_SILENT;
use yamaha_ymf278b::{
    EnvelopePhase, LD_CLOCKS, PCM_BUSY_CLOCKS, STATUS_BUSY, STATUS_LD, SampleFormat, WaveMemory,
};

const MIX_SCALE: f32 = 65536.0 * 32768.0;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

/// Slot 0 playing a constant 8-bit sample of 0x40 at full level.
fn steady_voice(pan_bits: u8) -> common::Chip {
    let mut c = chip();
    c.memory_mut().load(SAMPLE_BASE, &[0x40; 0x100]);
    store_header(&mut c, 0, &Header::sustained(SAMPLE_BASE, 0, 0x100));
    key_on(&mut c, 0, 0, pan_bits);
    c
}

#[test]
fn header_load_fills_the_slot() {
    let mut c = chip();
    let header = Header {
        format: 1,
        start: 0x01_2345,
        loop_point: 0x0102,
        end: 0x0300,
        lfo_vib: 0x2B,
        ar_d1r: 0x5A,
        dl_d2r: 0x37,
        rc_rr: 0x9C,
        am: 0x06,
    };
    store_header(&mut c, 5, &header);
    pcm_write(&mut c, 0x08 + 3, 5);

    let s = c.slot(3);
    assert_eq!(s.wave(), 5);
    assert_eq!(s.format(), SampleFormat::Bits12);
    assert_eq!(s.start(), 0x01_2345);
    assert_eq!(s.loop_addr(), 0x0102 << 16);
    assert_eq!(s.end_addr(), 0x0300 << 16);
    assert_eq!(s.modulation(), (5, 3, 6));
    assert!(!s.is_active());
    assert_eq!(c.pcm_register(0x80 + 3), 0x2B);
    assert_eq!(c.pcm_register(0x98 + 3), 0x5A);
    assert_eq!(c.pcm_register(0xB0 + 3), 0x37);
    assert_eq!(c.pcm_register(0xC8 + 3), 0x9C);
    assert_eq!(c.pcm_register(0xE0 + 3), 0x06);
}

#[test]
fn header_load_raises_ld() {
    let mut c = chip();
    pcm_write(&mut c, 0x08, 0);
    assert_eq!(c.read(0), STATUS_BUSY | STATUS_LD);
    c.advance_clocks(LD_CLOCKS);
    assert_eq!(c.read(0), STATUS_BUSY);
    c.advance_clocks(PCM_BUSY_CLOCKS - LD_CLOCKS);
    assert_eq!(c.read(0), 0);
}

#[test]
fn banked_headers_above_wave_384() {
    let mut c = chip_with_ram(0x10_0000);
    let banked = Header::sustained(0x2_0000, 0, 16);
    let plain = Header::sustained(0x3_0000, 0, 16);
    c.memory_mut().load(0x8_0000, &banked.encode());
    store_header(&mut c, 384, &plain);

    // Wave number bit 8 lives in group 1.
    pcm_write(&mut c, 0x20, 0x01);
    pcm_write(&mut c, 0x08, 0x80);
    assert_eq!(c.slot(0).wave(), 384);
    assert_eq!(c.slot(0).start(), 0x3_0000);

    pcm_write(&mut c, 0x02, 1 << 2);
    assert_eq!(c.header_bank(), 1);
    pcm_write(&mut c, 0x08, 0x80);
    assert_eq!(c.slot(0).start(), 0x2_0000);
}

#[test]
fn voice_mixes_into_do2_with_mix_level() {
    let mut c = steady_voice(0);
    assert!(c.slot(0).is_active());
    let frame = c.generate_sample();
    // 0x4000 at unity gain, >> 17
    let gain = c.tables().mix_level[0] as f32 / MIX_SCALE;
    assert!(close(frame[0], 8192.0 * gain));
    assert!(close(frame[1], 8192.0 * gain));
    assert!(close(frame[4], 0.0));
    assert!(close(frame[5], 0.0));
}

#[test]
fn do2_mix_level_seven_mutes() {
    let mut c = steady_voice(0);
    pcm_write(&mut c, 0xF9, 0x3F);
    let frame = c.generate_sample();
    assert!(close(frame[0], 0.0));
    assert!(close(frame[1], 0.0));
}

#[test]
fn do1_routing_and_hard_pan() {
    let mut c = steady_voice(0x10 | 7);
    let frame = c.generate_sample();
    assert!(close(frame[0], 0.0));
    assert!(close(frame[1], 0.0));
    assert!(close(frame[4], 0.0));
    assert!(close(frame[5], 0.25));

    let mut c = steady_voice(0x10 | 9);
    let frame = c.generate_sample();
    assert!(close(frame[4], 0.25));
    assert!(close(frame[5], 0.0));
}

#[test]
fn total_level_attenuates() {
    let mut c = chip();
    c.memory_mut().load(SAMPLE_BASE, &[0x40; 0x100]);
    store_header(&mut c, 0, &Header::sustained(SAMPLE_BASE, 0, 0x100));
    // TL 8 = -3 dB
    pcm_write(&mut c, 0x50, 8 << 1);
    key_on(&mut c, 0, 0, 0x10);
    let frame = c.generate_sample();
    assert!(close(frame[4], 5792.0 / 32768.0));
    assert_eq!(c.slot(0).total_level(), 8);
}

#[test]
fn loop_replays_from_loop_point() {
    let mut c = chip();
    c.memory_mut().load(SAMPLE_BASE, &[0x10, 0x20, 0x30, 0x40]);
    store_header(&mut c, 0, &Header::sustained(SAMPLE_BASE, 1, 4));
    // Octave 1: one sample per output frame.
    set_pitch(&mut c, 0, 1, 0);
    key_on(&mut c, 0, 0, 0x10);
    assert_eq!(c.slot(0).step(), 0x1_0000);

    let played: Vec<f32> = (0..8).map(|_| c.generate_sample()[4]).collect();
    let expected = [0x10u8, 0x20, 0x30, 0x40, 0x20, 0x30, 0x40, 0x20].map(|b| f32::from(b) / 256.0);
    for (got, want) in played.iter().zip(expected) {
        assert!(close(*got, want), "{played:?}");
    }
}

#[test]
fn twelve_bit_samples_unpack() {
    let mut c = chip();
    c.memory_mut().load(SAMPLE_BASE, &[0xAB, 0xCD, 0xEF]);
    let mut header = Header::sustained(SAMPLE_BASE, 0, 2);
    header.format = 1;
    store_header(&mut c, 0, &header);
    set_pitch(&mut c, 0, 1, 0);
    key_on(&mut c, 0, 0, 0x10);

    // 0xABD0 and 0xEFC0 as signed 16-bit, >> 1 after unity gain.
    assert!(close(c.generate_sample()[4], -10776.0 / 32768.0));
    assert!(close(c.generate_sample()[4], -2080.0 / 32768.0));
}

#[test]
fn reserved_format_is_silent() {
    let mut c = chip();
    c.memory_mut().load(SAMPLE_BASE, &[0x7F; 16]);
    let mut header = Header::sustained(SAMPLE_BASE, 0, 16);
    header.format = 3;
    store_header(&mut c, 0, &header);
    key_on(&mut c, 0, 0, 0x10);
    assert!(c.slot(0).is_active());
    assert!(close(c.generate_sample()[4], 0.0));
}

#[test]
fn key_off_releases_then_silences() {
    let mut c = steady_voice(0x10);
    for _ in 0..10 {
        c.generate_sample();
    }
    assert_eq!(c.slot(0).env_phase(), EnvelopePhase::Decay2);
    key_off(&mut c, 0);
    assert!(!c.slot(0).key_on());
    assert_eq!(c.slot(0).env_phase(), EnvelopePhase::Release);

    // Rate 63 release: 2^31 / 240 per sample.
    for _ in 0..240 {
        c.generate_sample();
    }
    assert_eq!(c.slot(0).env_phase(), EnvelopePhase::Release);
    assert!(c.slot(0).is_active());
    c.generate_sample();
    assert_eq!(c.slot(0).env_phase(), EnvelopePhase::ReleaseDone);
    assert!(!c.slot(0).is_active());
    assert!(close(c.generate_sample()[4], 0.0));
}

#[test]
fn envelope_walks_every_phase() {
    let mut c = chip();
    c.memory_mut().load(SAMPLE_BASE, &[0x40; 0x100]);
    let mut header = Header::sustained(SAMPLE_BASE, 0, 0x100);
    header.ar_d1r = 0xCC;
    header.dl_d2r = 0x4C;
    header.rc_rr = 0xFD;
    store_header(&mut c, 0, &header);
    key_on(&mut c, 0, 0, 0);

    let mut phases = vec![c.slot(0).env_phase()];
    for _ in 0..5000 {
        c.generate_sample();
        let phase = c.slot(0).env_phase();
        if phases.last() != Some(&phase) {
            phases.push(phase);
        }
    }
    assert_eq!(
        phases,
        [
            EnvelopePhase::Attack,
            EnvelopePhase::Decay1,
            EnvelopePhase::Decay2,
            EnvelopePhase::Decay2Done,
        ]
    );
    assert!(!c.slot(0).is_active());
    assert_eq!(c.slot(0).env_volume(), ENV_SILENT);

    // Decay 1 targets the decay level, 4 * 3 dB down.
    key_on(&mut c, 1, 0, 0);
    while c.slot(1).env_phase() != EnvelopePhase::Decay1 {
        c.generate_sample();
    }
    assert_eq!(c.slot(1).env_limit(), 32 << 23);
    key_off(&mut c, 1);
    assert_eq!(c.slot(1).env_phase(), EnvelopePhase::Release);
    while c.slot(1).is_active() {
        c.generate_sample();
    }
    assert_eq!(c.slot(1).env_phase(), EnvelopePhase::ReleaseDone);
}

#[test]
fn damp_while_keyed_speeds_up_the_envelope() {
    let mut c = steady_voice(0);
    assert_eq!(c.slot(0).env_step(), 0);
    pcm_write(&mut c, 0x68, 0x80 | 0x40);
    assert!(c.slot(0).key_on());
    assert_eq!(c.slot(0).env_phase(), EnvelopePhase::Decay2);
    assert_eq!(c.slot(0).env_step(), ENV_SILENT / c.tables().lut_dr[56]);
}

#[test]
fn mute_octave_silences_a_playing_voice() {
    let mut c = steady_voice(0x10);
    assert!(c.generate_sample()[4] > 0.0);
    pcm_write(&mut c, 0x38, 0x80);
    assert!(!c.slot(0).is_active());
    assert!(close(c.generate_sample()[4], 0.0));
}

#[test]
fn pitch_change_applies_immediately() {
    let mut c = steady_voice(0);
    assert_eq!(c.slot(0).step(), 0x8000);
    set_pitch(&mut c, 0, 2, 0x200);
    assert_eq!(c.slot(0).f_number(), 0x200);
    assert_eq!(c.slot(0).step(), (1536 << 10) >> 3);
}

#[test]
fn reloading_the_wave_while_keyed_restarts() {
    let mut c = steady_voice(0);
    for _ in 0..5 {
        c.generate_sample();
    }
    assert_eq!(c.slot(0).position(), 5 * 0x8000);
    pcm_write(&mut c, 0x08, 0);
    assert_eq!(c.slot(0).position(), 0);
    assert!(c.slot(0).is_active());

    key_off(&mut c, 0);
    assert!(c.slot(0).is_active());
    pcm_write(&mut c, 0x08, 0);
    assert!(!c.slot(0).is_active());
    assert_eq!(c.slot(0).env_phase(), EnvelopePhase::ReleaseDone);
}

#[test]
fn reset_silences_and_leaves_opl4_mode() {
    let mut c = steady_voice(0);
    pcm_write(&mut c, 0xF9, 0x12);
    c.memory_mut().load(0, &[0x99]);
    c.generate_sample();
    c.reset();
    assert!(c.slots().iter().all(|s| !s.is_active()));
    assert_eq!(c.pcm_register(0xF8), 0x1B);
    assert_eq!(c.mix_codes(), (3, 3, 0, 0));
    // Wave memory byte 0 is cleared by the reset's register 6 write.
    assert_eq!(c.memory().read_byte(0), 0);
    pcm_write(&mut c, 0xF9, 0x3F);
    assert_eq!(c.mix_codes(), (3, 3, 0, 0));
}
