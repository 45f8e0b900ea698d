//! Fake peripherals wired around the glue.

#![allow(dead_code)]

use emu_core::Ticks;
use machine_mac128::peripherals::{
    AdbTransceiver, FloppyController, FloppyDrive, MainCpu, MouseInputs, RealTimeClock, Scc,
    SoundDac, Via,
};
use machine_mac128::scsi::Ncr5380n;
use machine_mac128::{Mac128, MacBus, MacConfig, MacModel, MacRaster, ScsiPort};

#[derive(Default)]
pub struct FakeCpu {
    pub cycles: u64,
    pub lines: [bool; 8],
    pub line_log: Vec<(u8, bool)>,
}

impl MainCpu for FakeCpu {
    fn total_cycles(&self) -> u64 {
        self.cycles
    }
    fn adjust_icount(&mut self, delta: i64) {
        self.cycles = self.cycles.wrapping_add_signed(-delta);
    }
    fn set_irq_line(&mut self, level: u8, asserted: bool) {
        self.lines[usize::from(level)] = asserted;
        self.line_log.push((level, asserted));
    }
}

impl FakeCpu {
    pub fn asserted_levels(&self) -> Vec<u8> {
        (0..8u8).filter(|&l| self.lines[usize::from(l)]).collect()
    }
}

#[derive(Default)]
pub struct FakeVia {
    pub regs: [u8; 16],
    pub writes: Vec<(u8, u8)>,
    pub ca1: Vec<bool>,
    pub ca2: Vec<bool>,
    pub pb6: Vec<bool>,
}

impl Via for FakeVia {
    fn read(&mut self, reg: u8) -> u8 {
        self.regs[usize::from(reg)]
    }
    fn write(&mut self, reg: u8, data: u8) {
        self.writes.push((reg, data));
    }
    fn write_ca1(&mut self, state: bool) {
        self.ca1.push(state);
    }
    fn write_ca2(&mut self, state: bool) {
        self.ca2.push(state);
    }
    fn write_pb6(&mut self, state: bool) {
        self.pb6.push(state);
    }
}

#[derive(Default)]
pub struct FakeScc {
    pub value: u8,
    pub reads: Vec<u32>,
    pub writes: Vec<(u32, u8)>,
    pub dcda: Vec<bool>,
    pub dcdb: Vec<bool>,
}

impl Scc for FakeScc {
    fn read(&mut self, offset: u32) -> u8 {
        self.reads.push(offset);
        self.value
    }
    fn write(&mut self, offset: u32, data: u8) {
        self.writes.push((offset, data));
    }
    fn dcda_w(&mut self, state: bool) {
        self.dcda.push(state);
    }
    fn dcdb_w(&mut self, state: bool) {
        self.dcdb.push(state);
    }
}

#[derive(Default)]
pub struct FakeIwm {
    pub regs: [u8; 16],
    pub writes: Vec<(u8, u8)>,
    pub syncs: u32,
    pub selected: Vec<Option<usize>>,
}

impl FloppyController for FakeIwm {
    fn read(&mut self, reg: u8) -> u8 {
        self.regs[usize::from(reg)]
    }
    fn write(&mut self, reg: u8, data: u8) {
        self.writes.push((reg, data));
    }
    fn sync(&mut self) {
        self.syncs += 1;
    }
    fn set_floppy(&mut self, drive: Option<usize>) {
        self.selected.push(drive);
    }
}

#[derive(Default)]
pub struct FakeDrive {
    pub variable_speed: bool,
    pub rpms: Vec<f32>,
    pub heads: Vec<bool>,
    pub phases: Vec<u8>,
}

impl FloppyDrive for FakeDrive {
    fn is_variable_speed(&self) -> bool {
        self.variable_speed
    }
    fn set_rpm(&mut self, rpm: f32) {
        self.rpms.push(rpm);
    }
    fn ss_w(&mut self, head: bool) {
        self.heads.push(head);
    }
    fn seek_phase_w(&mut self, phases: u8) {
        self.phases.push(phases);
    }
}

#[derive(Default)]
pub struct FakeRtc {
    pub data_out: bool,
    pub ce: bool,
    pub data_in: bool,
    pub clk: bool,
}

impl RealTimeClock for FakeRtc {
    fn data_r(&self) -> bool {
        self.data_out
    }
    fn ce_w(&mut self, state: bool) {
        self.ce = state;
    }
    fn data_w(&mut self, state: bool) {
        self.data_in = state;
    }
    fn clk_w(&mut self, state: bool) {
        self.clk = state;
    }
}

#[derive(Default)]
pub struct FakeAdb {
    pub vblanks: u32,
    pub actions: Vec<u8>,
    pub state: u8,
}

impl AdbTransceiver for FakeAdb {
    fn vblank(&mut self) {
        self.vblanks += 1;
    }
    fn new_action(&mut self, state: u8) {
        self.actions.push(state);
    }
    fn state(&self) -> u8 {
        self.state
    }
}

#[derive(Default)]
pub struct FakeDac {
    pub samples: Vec<u8>,
    pub gain: Option<f32>,
}

impl SoundDac for FakeDac {
    fn write(&mut self, sample: u8) {
        self.samples.push(sample);
    }
    fn set_output_gain(&mut self, gain: f32) {
        self.gain = Some(gain);
    }
}

#[derive(Default)]
pub struct FakeMouse {
    pub button: bool,
    pub x: u8,
    pub y: u8,
}

impl MouseInputs for FakeMouse {
    fn button(&self) -> bool {
        self.button
    }
    fn x(&self) -> u8 {
        self.x
    }
    fn y(&self) -> u8 {
        self.y
    }
}

#[derive(Default)]
pub struct FakeNcr5380n {
    pub regs: [u8; 16],
    pub dma_in: u8,
    pub dma_out: Vec<u8>,
    pub writes: Vec<(u8, u8)>,
}

impl Ncr5380n for FakeNcr5380n {
    fn read(&mut self, reg: u8) -> u8 {
        self.regs[usize::from(reg)]
    }
    fn write(&mut self, reg: u8, data: u8) {
        self.writes.push((reg, data));
    }
    fn dma_r(&mut self) -> u8 {
        self.dma_in
    }
    fn dma_w(&mut self, data: u8) {
        self.dma_out.push(data);
    }
}

/// A machine with every peripheral faked.
pub struct Rig {
    pub mac: Mac128,
    pub cpu: FakeCpu,
    pub via: FakeVia,
    pub scc: FakeScc,
    pub iwm: FakeIwm,
    pub drives: [FakeDrive; 2],
    pub scsi: Option<FakeNcr5380n>,
    pub adb: Option<FakeAdb>,
    pub rtc: FakeRtc,
    pub dac: FakeDac,
    pub raster: MacRaster,
    pub mouse: FakeMouse,
}

/// ROM whose word at offset `n` is `n ^ 0xA5A5`.
pub fn test_rom(bytes: usize) -> Vec<u8> {
    (0..bytes / 2).flat_map(|n| rom_word(n as u32).to_be_bytes()).collect()
}

pub fn rom_word(offset: u32) -> u16 {
    (offset as u16) ^ 0xA5A5
}

impl Rig {
    pub fn new(model: MacModel) -> Self {
        let mac = Mac128::new(&MacConfig::new(model, test_rom(0x2_0000))).expect("valid config");
        let caps = mac.capabilities();
        Self {
            mac,
            cpu: FakeCpu::default(),
            via: FakeVia::default(),
            scc: FakeScc::default(),
            iwm: FakeIwm::default(),
            drives: [FakeDrive::default(), FakeDrive::default()],
            scsi: (caps.scsi == machine_mac128::ScsiKind::Ncr5380n)
                .then(FakeNcr5380n::default),
            adb: (caps.pointer == machine_mac128::PointerInterface::Adb)
                .then(FakeAdb::default),
            rtc: FakeRtc::default(),
            dac: FakeDac::default(),
            raster: MacRaster::new(),
            mouse: FakeMouse::default(),
        }
    }

    pub fn bus(&mut self) -> MacBus<'_> {
        let [d0, d1] = &mut self.drives;
        MacBus {
            mac: &mut self.mac,
            cpu: &mut self.cpu,
            via: &mut self.via,
            scc: &mut self.scc,
            iwm: &mut self.iwm,
            drives: [
                Some(d0 as &mut dyn FloppyDrive),
                Some(d1 as &mut dyn FloppyDrive),
            ],
            scsi: match self.scsi.as_mut() {
                Some(chip) => ScsiPort::Ncr5380n(chip as &mut dyn Ncr5380n),
                None => ScsiPort::Absent,
            },
            adb: self
                .adb
                .as_mut()
                .map(|adb| adb as &mut dyn AdbTransceiver),
            rtc: &mut self.rtc,
            dac: &mut self.dac,
            screen: &self.raster,
            mouse: &self.mouse,
        }
    }

    /// Move the beam and the timer queue to `now` without firing timers.
    pub fn set_time(&mut self, now: Ticks) {
        self.raster.set_time(now);
        self.mac.timers.advance_to(now);
    }

    /// Reset at the current beam position.
    pub fn reset(&mut self) {
        self.bus().reset();
    }

    /// Fire every glue timer due up to `until`.
    pub fn run_until(&mut self, until: Ticks) {
        while let Some(fired) = self.mac.timers.pop_due(until) {
            self.raster.set_time(fired.at);
            self.bus().on_timer(fired);
        }
        self.mac.timers.advance_to(until);
        self.raster.set_time(until);
    }
}
