//! Device callbacks: timers, interrupt inputs, VIA ports and drive select.

use crate::bus::MacBus;
use crate::config::ViaRouting;
use crate::video::{self, H_VISIBLE, MacTimer, V_VISIBLE};
use crate::VBLANKS_PER_SECOND;
use emu_core::Fired;
use log::trace;

impl MacBus<'_> {
    /// Board reset. Arms the line timer for the beam's next line.
    pub fn reset(&mut self) {
        let mac = &mut *self.mac;
        mac.memory.overlay = true;
        mac.screen_buffer = true;
        mac.irq.reset();
        mac.sound_enabled = false;
        mac.main_sound_buffer = true;
        mac.volume = 3;
        mac.vblank_count = 0;
        mac.ca2 = false;
        mac.adb_irq_pending = false;
        mac.drive_select = false;
        mac.scsi_irq_enable = false;
        mac.pwm.reset();
        mac.scsi_drq = false;

        let next_line = (self.screen.vpos() + 1) % self.screen.height();
        let delay = self.screen.time_until_pos(next_line, 0);
        self.mac.timers.adjust(MacTimer::Scanline, delay, next_line);
        if self.screen.vblank() {
            self.via.write_pb6(false);
        }
    }

    /// Cold-start initialisation: RAM cleared, SCSI interrupt input low.
    pub fn driver_init(&mut self) {
        self.mac.memory.clear_ram();
        self.mac.scsi_irq = false;
    }

    /// Dispatch an expired glue timer.
    pub fn on_timer(&mut self, fired: Fired<MacTimer>) {
        match fired.id {
            MacTimer::Scanline => self.scanline(fired.param),
            MacTimer::HBlank => self.via.write_pb6(false),
        }
    }

    fn scanline(&mut self, line: u32) {
        if line == V_VISIBLE {
            self.vblank_irq();
        }

        // Beam inside the picture until the end of the visible part of the line.
        if line < V_VISIBLE {
            self.via.write_pb6(true);
            let delay = self.screen.time_until_pos(line, H_VISIBLE);
            self.mac.timers.adjust(MacTimer::HBlank, delay, 0);
        }

        if line % 10 == 0 && self.adb.is_none() {
            self.mouse_callback();
        }

        let word = video::sound_word(&self.mac.memory, self.mac.main_sound_buffer, line);
        self.dac.write((word >> 8) as u8);
        self.pwm_push(word as u8);

        let next = line + 1;
        let delay = self.screen.time_until_pos(next, 0);
        self.mac
            .timers
            .adjust(MacTimer::Scanline, delay, next % self.screen.height());
    }

    fn vblank_irq(&mut self) {
        if let Some(adb) = self.adb.as_deref_mut() {
            adb.vblank();
        }

        self.mac.vblank_count += 1;
        if self.mac.vblank_count == VBLANKS_PER_SECOND {
            self.mac.vblank_count = 0;
            self.mac.ca2 = !self.mac.ca2;
            self.via.write_ca2(self.mac.ca2);
        }
    }

    fn mouse_callback(&mut self) {
        let edges = self.mac.mouse.poll(self.mouse.x(), self.mouse.y());
        if let Some(level) = edges.x {
            self.scc.dcda_w(level);
        }
        if let Some(level) = edges.y {
            self.scc.dcdb_w(level);
        }
    }

    fn pwm_push(&mut self, value: u8) {
        let Some(rpm) = self.mac.pwm.push(value) else {
            return;
        };
        let Some(index) = self.mac.cur_floppy else {
            return;
        };
        if let Some(drive) = self.drives.get_mut(index).and_then(|d| d.as_deref_mut()) {
            if drive.is_variable_speed() {
                self.iwm.sync();
                drive.set_rpm(rpm);
            }
        }
    }

    /// Display vertical blank line, wired to VIA CA1.
    pub fn vblank_w(&mut self, state: bool) {
        self.via.write_ca1(state);
    }

    pub fn set_via_interrupt(&mut self, state: bool) {
        self.mac.irq.set_via(state).apply(&mut *self.cpu);
    }

    pub fn set_scc_interrupt(&mut self, state: bool) {
        self.mac.irq.set_scc(state).apply(&mut *self.cpu);
    }

    /// SCSI controller IRQ output. SE-class boards gate it with VIA PB6.
    pub fn set_scsi_interrupt(&mut self, state: bool) {
        self.mac.scsi_irq = state;
        self.refresh_scsi_interrupt();
    }

    fn refresh_scsi_interrupt(&mut self) {
        let gated = match self.mac.caps.via {
            ViaRouting::Classic => self.mac.scsi_irq,
            ViaRouting::Se => self.mac.scsi_irq && self.mac.scsi_irq_enable,
        };
        if gated != self.mac.irq.inputs().2 {
            self.mac.irq.set_scsi(gated).apply(&mut *self.cpu);
        }
    }

    pub fn scsi_drq_w(&mut self, state: bool) {
        self.mac.scsi_drq = state;
    }

    pub fn adb_irq_w(&mut self, state: bool) {
        self.mac.adb_irq_pending = state;
    }

    fn update_volume(&mut self) {
        let gain = self.mac.volume_gain();
        self.mac.gain = gain;
        self.dac.set_output_gain(gain);
    }

    /// VIA port A input.
    #[must_use]
    pub fn via_in_a(&self) -> u8 {
        0x81
    }

    /// VIA port B input.
    pub fn via_in_b(&mut self) -> u8 {
        let rtc = u8::from(self.rtc.data_r());
        match self.mac.caps.via {
            ViaRouting::Classic => {
                let (x2, y2) = self.mac.mouse.direction_bits();
                0x40 | u8::from(y2) << 5
                    | u8::from(x2) << 4
                    | u8::from(!self.mouse.button()) << 3
                    | rtc
            }
            ViaRouting::Se => {
                let adb_state = self.adb.as_deref().map_or(0, |adb| adb.state() & 3);
                adb_state << 4 | u8::from(!self.mac.adb_irq_pending) << 3 | rtc
            }
        }
    }

    /// VIA port A output.
    pub fn via_out_a(&mut self, data: u8) {
        self.mac.screen_buffer = data & 0x40 != 0;

        let head = data & 0x20 != 0;
        if head != self.mac.head_select {
            if let Some(drive) = self.current_drive() {
                drive.ss_w(head);
            }
            self.mac.head_select = head;
        }

        if self.mac.caps.via == ViaRouting::Classic {
            self.mac.main_sound_buffer = data & 0x08 != 0;
        }
        self.mac.volume = data & 0x07;
        self.update_volume();

        match self.mac.caps.via {
            ViaRouting::Classic => self.mac.memory.overlay = data & 0x10 != 0,
            ViaRouting::Se => {
                let external = data & 0x10 != 0;
                if external != self.mac.drive_select {
                    self.mac.drive_select = external;
                    self.devsel_w(self.mac.devsel);
                }
            }
        }
    }

    /// VIA port B output.
    pub fn via_out_b(&mut self, data: u8) {
        self.mac.sound_enabled = data & 0x80 == 0;
        self.update_volume();

        if self.mac.caps.via == ViaRouting::Se {
            self.mac.scsi_irq_enable = data & 0x40 == 0;
            self.refresh_scsi_interrupt();
            if let Some(adb) = self.adb.as_deref_mut() {
                adb.new_action((data & 0x30) >> 4);
            }
        }

        self.rtc.ce_w(data & 0x04 != 0);
        self.rtc.data_w(data & 0x01 != 0);
        self.rtc.clk_w(data & 0x02 != 0);
    }

    /// Floppy controller device-select output.
    pub fn devsel_w(&mut self, devsel: u8) {
        let external = self.mac.caps.via == ViaRouting::Se && self.mac.drive_select;
        self.mac.cur_floppy = match devsel {
            1 if !external => Some(0),
            2 if !external => Some(1),
            _ => None,
        };
        if self.mac.caps.via == ViaRouting::Se {
            self.mac.devsel = devsel;
        }
        trace!("devsel {devsel} -> drive {:?}", self.mac.cur_floppy);

        self.iwm.set_floppy(self.mac.cur_floppy);
        let head = self.mac.head_select;
        let rpm = self.mac.pwm.current_rpm();
        if let Some(drive) = self.current_drive() {
            drive.ss_w(head);
            if drive.is_variable_speed() {
                drive.set_rpm(rpm);
            }
        }
    }

    /// Floppy controller stepper phase output.
    pub fn phases_w(&mut self, phases: u8) {
        if let Some(drive) = self.current_drive() {
            drive.seek_phase_w(phases);
        }
    }

    fn current_drive(&mut self) -> Option<&mut dyn crate::peripherals::FloppyDrive> {
        let index = self.mac.cur_floppy?;
        let drive = self.drives.get_mut(index)?.as_mut()?;
        Some(&mut **drive)
    }
}
