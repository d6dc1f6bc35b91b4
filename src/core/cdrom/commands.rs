// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CD-ROM command implementations
//!
//! Commands are single bytes written to the command register; parameters
//! are pre-loaded into the parameter FIFO. Execution is synchronous: both
//! the interrupt and response FIFOs are cleared on entry, responses are
//! enqueued, and the parameter FIFO is cleared on exit.

use super::{
    bcd_to_dec, dec_to_bcd, CdPosition, CdromDrive, DriveState, ResponseType, MAX_FIFO_SIZE,
};

impl CdromDrive {
    /// Execute a CD-ROM command
    ///
    /// Consumes parameters from the parameter FIFO and enqueues responses
    /// into the response and interrupt FIFOs.
    ///
    /// # Example
    ///
    /// ```
    /// use echo_cdrom::core::cdrom::CdromDrive;
    ///
    /// let mut drive = CdromDrive::new();
    /// drive.execute_command(0x01); // Getstat
    /// assert_ne!(drive.read_reg(0) & 0x20, 0); // response queued
    /// ```
    pub fn execute_command(&mut self, cmd: u8) {
        self.irq_fifo.clear();
        self.resp_fifo.clear();

        log::debug!(
            "CD-ROM command issued: {} (0x{:02X})",
            Self::command_name(cmd),
            cmd
        );

        if !self.param_fifo.is_empty() {
            log::trace!("Parameters: {:02X?}", self.param_fifo);
        }

        match cmd {
            0x01 => self.cmd_getstat(),
            0x02 => self.cmd_setloc(),
            // GetlocP returns position data from the previous sector on
            // real hardware; treating it like Play keeps the handshake
            // alive without sub-channel Q emulation
            0x03 | 0x11 => self.cmd_play(),
            0x06 => self.cmd_readn(),
            0x07 => self.cmd_motor_on(),
            0x08 => self.cmd_stop(),
            0x09 => self.cmd_pause(),
            0x0A => self.cmd_init(),
            0x0B => self.cmd_mute(),
            0x0C => self.cmd_demute(),
            0x0D => self.cmd_setfilter(),
            0x0E => self.cmd_setmode(),
            0x0F => self.cmd_getparam(),
            0x13 => self.cmd_gettn(),
            0x14 => self.cmd_gettd(),
            0x15 => self.cmd_seekl(),
            0x19 => self.cmd_test(),
            0x1A => self.cmd_getid(),
            0x1B => self.cmd_reads(),
            _ => {
                log::warn!("Unhandled command 0x{:02X}", cmd);
                self.command_error();
            }
        }

        if !self.resp_fifo.is_empty() {
            log::trace!("Response: {:02X?}", self.resp_fifo);
        }

        self.param_fifo.clear();

        self.reg_status.set_transmit_busy(true);
        self.reg_status.set_param_fifo_empty(true);
        self.reg_status.set_param_fifo_write_ready(true);
        self.reg_status.set_adpcm_fifo_empty(false);
    }

    /// Command 0x01: Getstat
    fn cmd_getstat(&mut self) {
        self.push_response_stat(ResponseType::FirstInt3);
    }

    /// Command 0x02: Setloc
    ///
    /// Latches the seek target from 3 BCD parameter bytes (MM:SS:FF).
    fn cmd_setloc(&mut self) {
        let mm = bcd_to_dec(self.get_param());
        let ss = bcd_to_dec(self.get_param());
        let ff = bcd_to_dec(self.get_param());

        let pos = CdPosition::new(mm, ss, ff);
        self.seek_sector = pos.to_lba() as u32;

        log::debug!("Setloc {:02}:{:02}:{:02}", mm, ss, ff);

        self.push_response_stat(ResponseType::FirstInt3);
    }

    /// Command 0x03: Play (also 0x11, GetlocP)
    fn cmd_play(&mut self) {
        // The optional track-number parameter is not handled
        debug_assert!(self.param_fifo.is_empty(), "Play with parameters");

        self.read_sector = self.seek_sector;
        self.stat_code.set_state(DriveState::Playing);

        self.push_response_stat(ResponseType::FirstInt3);
    }

    /// Command 0x06: ReadN
    fn cmd_readn(&mut self) {
        self.read_sector = self.seek_sector;
        self.stat_code.set_state(DriveState::Reading);

        self.push_response_stat(ResponseType::FirstInt3);
    }

    /// Command 0x07: MotorOn
    fn cmd_motor_on(&mut self) {
        self.stat_code.set_spindle_motor_on(true);

        self.push_response_stat(ResponseType::FirstInt3);
        self.push_response_stat(ResponseType::SecondInt2);
    }

    /// Command 0x08: Stop
    fn cmd_stop(&mut self) {
        self.stat_code.set_state(DriveState::Stopped);
        self.stat_code.set_spindle_motor_on(false);

        self.push_response_stat(ResponseType::FirstInt3);
        self.push_response_stat(ResponseType::SecondInt2);
    }

    /// Command 0x09: Pause
    ///
    /// The first ack still carries the reading/playing state; the second
    /// one reports the stopped drive.
    fn cmd_pause(&mut self) {
        self.push_response_stat(ResponseType::FirstInt3);

        self.stat_code.set_state(DriveState::Stopped);

        self.push_response_stat(ResponseType::SecondInt2);
    }

    /// Command 0x0A: Init
    fn cmd_init(&mut self) {
        self.push_response_stat(ResponseType::FirstInt3);

        self.stat_code.reset();
        self.stat_code.set_spindle_motor_on(true);

        self.mode.reset();

        self.push_response_stat(ResponseType::SecondInt2);
    }

    /// Command 0x0B: Mute
    fn cmd_mute(&mut self) {
        self.muted = true;

        self.push_response_stat(ResponseType::FirstInt3);
    }

    /// Command 0x0C: Demute
    fn cmd_demute(&mut self) {
        self.muted = false;

        self.push_response_stat(ResponseType::FirstInt3);
    }

    /// Command 0x0D: Setfilter
    ///
    /// Records the XA file/channel filter bytes. Nothing consumes them;
    /// XA-audio channel filtering is out of scope.
    fn cmd_setfilter(&mut self) {
        let file = bcd_to_dec(self.get_param());
        let channel = bcd_to_dec(self.get_param());

        self.filter_file = file;
        self.filter_channel = channel;

        let stat = self.stat_code.byte();
        self.push_response(
            ResponseType::FirstInt3,
            &[stat, dec_to_bcd(file), dec_to_bcd(channel)],
        );
    }

    /// Command 0x0E: Setmode
    fn cmd_setmode(&mut self) {
        self.push_response_stat(ResponseType::FirstInt3);

        let param = self.get_param();
        debug_assert!(param & 0b1_0000 == 0, "Setmode with bit 4 set");
        self.mode.set_byte(param);

        log::debug!("Setmode 0x{:02X}", param);
    }

    /// Command 0x0F: Getparam
    fn cmd_getparam(&mut self) {
        let stat = self.stat_code.byte();
        self.push_response(ResponseType::FirstInt3, &[stat, 0x00, 0x00]);
    }

    /// Command 0x13: GetTN
    fn cmd_gettn(&mut self) {
        let index = dec_to_bcd(0x01);
        let track_count = dec_to_bcd(self.disk.track_count());

        let stat = self.stat_code.byte();
        self.push_response(ResponseType::FirstInt3, &[stat, index, track_count]);
    }

    /// Command 0x14: GetTD
    ///
    /// Track 0 has a special meaning: the end of the last track (total
    /// disc size).
    fn cmd_gettd(&mut self) {
        let track_number = bcd_to_dec(self.get_param());

        let disk_pos = if track_number == 0 {
            self.disk.size()
        } else {
            self.disk.get_track_start(track_number).unwrap_or_else(|| {
                log::warn!("GetTD for missing track {}", track_number);
                self.disk.size()
            })
        };

        let stat = self.stat_code.byte();
        self.push_response(
            ResponseType::FirstInt3,
            &[stat, dec_to_bcd(disk_pos.minute), dec_to_bcd(disk_pos.second)],
        );
    }

    /// Command 0x15: SeekL
    fn cmd_seekl(&mut self) {
        self.push_response_stat(ResponseType::FirstInt3);

        self.read_sector = self.seek_sector;
        self.stat_code.set_state(DriveState::Seeking);

        self.push_response_stat(ResponseType::SecondInt2);
    }

    /// Command 0x19: Test
    fn cmd_test(&mut self) {
        let subfunction = self.get_param();

        log::debug!("Test subfunction 0x{:02X}", subfunction);

        match subfunction {
            // CDROM BIOS date/version: PU-7 board, 19 Sep 1994, version C0
            0x20 => self.push_response(ResponseType::FirstInt3, &[0x94, 0x09, 0x19, 0xC0]),
            _ => {
                self.command_error();
                log::warn!("Unhandled Test subfunction 0x{:02X}", subfunction);
            }
        }
    }

    /// Command 0x1A: GetID
    fn cmd_getid(&mut self) {
        let has_disk = !self.disk.is_empty();

        if self.stat_code.shell_open() {
            self.push_response(ResponseType::ErrorInt5, &[0x11, 0x80]);
        } else if has_disk {
            self.push_response_stat(ResponseType::FirstInt3);
            self.push_response(
                ResponseType::SecondInt2,
                &[0x02, 0x00, 0x20, 0x00, b'S', b'C', b'E', b'A'],
            );
        } else {
            self.push_response_stat(ResponseType::FirstInt3);
            self.push_response(
                ResponseType::ErrorInt5,
                &[0x08, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            );
        }
    }

    /// Command 0x1B: ReadS
    fn cmd_reads(&mut self) {
        self.read_sector = self.seek_sector;
        self.stat_code.set_state(DriveState::Reading);

        self.push_response_stat(ResponseType::FirstInt3);
    }

    /// Reject the command: INT5 with the generic error payload
    fn command_error(&mut self) {
        self.push_response(ResponseType::ErrorInt5, &[0x11, 0x40]);
    }

    /// Pop one parameter from the head of the parameter FIFO
    ///
    /// Underflow is a host protocol violation.
    fn get_param(&mut self) -> u8 {
        debug_assert!(!self.param_fifo.is_empty(), "parameter FIFO underflow");

        let param = self.param_fifo.pop_front().unwrap_or(0);

        self.reg_status
            .set_param_fifo_empty(self.param_fifo.is_empty());
        self.reg_status.set_param_fifo_write_ready(true);

        param
    }

    /// Enqueue a response: the cause code goes into the interrupt FIFO,
    /// the payload bytes into the response FIFO
    pub(super) fn push_response(&mut self, response_type: ResponseType, bytes: &[u8]) {
        self.irq_fifo.push_back(response_type as u8);

        for &byte in bytes {
            if self.resp_fifo.len() < MAX_FIFO_SIZE {
                self.resp_fifo.push_back(byte);
                self.reg_status.set_response_fifo_not_empty(true);
            } else {
                log::warn!("Response byte 0x{:02X} lost, FIFO was full", byte);
            }
        }
    }

    /// Enqueue a response whose only payload is the drive status byte
    fn push_response_stat(&mut self, response_type: ResponseType) {
        let stat = self.stat_code.byte();
        self.push_response(response_type, &[stat]);
    }

    /// Human-readable command name for the debug log
    fn command_name(cmd: u8) -> &'static str {
        const NAMES: [&str; 32] = [
            "Sync", "Getstat", "Setloc", "Play", "Forward", "Backward", "ReadN", "MotorOn",
            "Stop", "Pause", "Init", "Mute", "Demute", "Setfilter", "Setmode", "Getparam",
            "GetlocL", "GetlocP", "SetSession", "GetTN", "GetTD", "SeekL", "SeekP", "-", "-",
            "Test", "GetID", "ReadS", "Reset", "GetQ", "ReadTOC", "VideoCD",
        ];

        if cmd <= 0x1F {
            return NAMES[cmd as usize];
        }
        if (0x50..=0x57).contains(&cmd) {
            return "Secret";
        }
        "<unknown>"
    }
}
