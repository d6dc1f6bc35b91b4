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

//! CD-ROM drive emulation for PlayStation 1
//!
//! This module emulates the CD-ROM controller as the host CPU sees it:
//! four byte-wide registers, multiplexed by a 2-bit bank index written to
//! register 0.
//!
//! # Register map (reads)
//!
//! | Reg | Bank | Meaning                              |
//! |-----|------|--------------------------------------|
//! | 0   | any  | Status register                      |
//! | 1   | any  | Response FIFO (pop one byte)         |
//! | 2   | any  | Data FIFO (one byte of the sector)   |
//! | 3   | 0, 2 | Interrupt Enable register            |
//! | 3   | 1, 3 | Interrupt Flag register              |
//!
//! # Register map (writes)
//!
//! | Reg | Bank | Meaning                              |
//! |-----|------|--------------------------------------|
//! | 0   | any  | Bank index select                    |
//! | 1   | 0    | Command register                     |
//! | 1   | 1-3  | Sound map / CD audio volume (ignored)|
//! | 2   | 0    | Parameter FIFO push                  |
//! | 2   | 1    | Interrupt Enable register            |
//! | 2   | 2-3  | CD audio volume (ignored)            |
//! | 3   | 0    | Request register (data transfer)     |
//! | 3   | 1    | Interrupt Flag register (ack)        |
//! | 3   | 2-3  | CD audio volume / apply (ignored)    |
//!
//! # Interrupt protocol
//!
//! Commands enqueue cause codes (INT1/INT2/INT3/INT5) into a small
//! interrupt FIFO. Only the head is visible through the Interrupt Flag
//! register; the host acknowledges it with a write, which pops the FIFO so
//! the next queued cause can assert the CDROM line on the next
//! [`CdromDrive::step`].

use std::collections::VecDeque;
use std::mem;
use std::path::Path;

use crate::core::error::Result;
use crate::core::interrupt::{InterruptController, IrqLine};

mod commands;
pub mod disc;
mod position;
mod registers;


pub use disc::{DiscImage, SectorKind, Track};
pub use position::{bcd_to_dec, dec_to_bcd, CdPosition};
pub use registers::{DriveState, ModeRegister, StatCode, StatusRegister};

/// Maximum FIFO depth (parameter, response and interrupt FIFOs)
pub const MAX_FIFO_SIZE: usize = 16;

/// Raw sector size: 12-byte sync + 4-byte header + 2336-byte payload
pub const SECTOR_SIZE: usize = 2352;

/// Host steps between two sector fetches while reading/playing.
///
/// With the embedder stepping the drive once per 33.8688 MHz CPU clock
/// tick, this paces sectors at 75 Hz (1x drive speed).
pub const READ_SECTOR_DELAY_STEPS: u32 = 33_868_800 / 75;

/// Sync pattern opening every data sector
const SYNC_MAGIC: [u8; 12] = [
    0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00,
];

/// Interrupt cause codes, as queued in the interrupt FIFO
///
/// Two acks from one command are two separate FIFO entries; the host must
/// acknowledge each before the next becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Data-ready notification from the sector pump
    SecondInt1 = 1,
    /// Completion of a deferred effect (second ack)
    SecondInt2 = 2,
    /// Acknowledgement of a command (first ack)
    FirstInt3 = 3,
    /// Command rejected
    ErrorInt5 = 5,
}

/// CD-ROM drive controller
///
/// Owns the disc image, the four FIFOs and the bit-packed registers. The
/// embedder maps [`CdromDrive::read_reg`]/[`CdromDrive::write_reg`] into
/// its I/O window (0x1F801800 on the PSX bus) and calls
/// [`CdromDrive::step`] once per host tick.
pub struct CdromDrive {
    /// Host-visible status register (CDREG0)
    reg_status: StatusRegister,
    /// Interrupt Enable register, low 3 bits gate the CDROM line
    reg_int_enable: u8,

    /// Drive status byte, first byte of most responses
    stat_code: StatCode,
    /// Mode register, set by Setmode
    mode: ModeRegister,

    /// Parameter FIFO (host to drive, up to 16 bytes)
    param_fifo: VecDeque<u8>,
    /// Response FIFO (drive to host, up to 16 bytes)
    resp_fifo: VecDeque<u8>,
    /// Interrupt FIFO (cause codes, head visible in the flag register)
    irq_fifo: VecDeque<u8>,

    /// Most recent sector fetched by the pump
    read_buf: Vec<u8>,
    /// Sector currently streamed out through the data FIFO
    data_buf: Vec<u8>,
    /// Byte cursor into `data_buf`
    data_buffer_index: usize,

    /// LBA target of the last Setloc
    seek_sector: u32,
    /// LBA of the next sector the pump fetches
    read_sector: u32,
    /// Countdown to the next sector fetch
    steps_until_read_sect: u32,

    /// CD audio muted (Mute/Demute)
    muted: bool,
    /// XA filter bytes recorded by Setfilter
    filter_file: u8,
    filter_channel: u8,

    /// Inserted disc image (empty until `insert_disk_file`)
    disk: DiscImage,
}

impl CdromDrive {
    /// Create a drive with no disc inserted
    pub fn new() -> Self {
        Self {
            reg_status: StatusRegister::new(),
            reg_int_enable: 0,
            stat_code: StatCode::new(),
            mode: ModeRegister::new(),
            param_fifo: VecDeque::with_capacity(MAX_FIFO_SIZE),
            resp_fifo: VecDeque::with_capacity(MAX_FIFO_SIZE),
            irq_fifo: VecDeque::with_capacity(MAX_FIFO_SIZE),
            read_buf: Vec::new(),
            data_buf: Vec::new(),
            data_buffer_index: 0,
            seek_sector: 0,
            read_sector: 0,
            steps_until_read_sect: READ_SECTOR_DELAY_STEPS,
            muted: false,
            filter_file: 0,
            filter_channel: 0,
            disk: DiscImage::new(),
        }
    }

    /// Insert a disc image, replacing any current one
    ///
    /// Dispatches on the (case-insensitive) file extension: `.cue` sheets
    /// go through the sheet parser, anything else is treated as a bare
    /// `.bin`. Clears `shell_open` on success. Callers are expected to
    /// quiesce the drive first; no in-flight command recovery is attempted.
    pub fn insert_disk_file(&mut self, path: &Path) -> Result<()> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        self.disk = if ext == "cue" {
            DiscImage::from_cue(path)?
        } else {
            DiscImage::from_bin(path)?
        };
        self.stat_code.set_shell_open(false);

        Ok(())
    }

    /// Inserted disc image
    pub fn disk(&self) -> &DiscImage {
        &self.disk
    }

    /// True while CD audio output is muted (Mute/Demute commands)
    ///
    /// Consumed by the embedder's audio mixer; the core only records it.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// XA (file, channel) filter bytes recorded by Setfilter
    pub fn xa_filter(&self) -> (u8, u8) {
        (self.filter_file, self.filter_channel)
    }

    /// Advance the drive by one host tick
    ///
    /// Raises the CDROM line when the interrupt FIFO head passes the
    /// enable mask, and runs the sector-read pump while the drive is
    /// reading or playing.
    pub fn step(&mut self, interrupts: &mut InterruptController) {
        self.reg_status.set_transmit_busy(false);

        if let Some(&irq) = self.irq_fifo.front() {
            let irq_triggered = irq & 0b111;
            let irq_mask = self.reg_int_enable & 0b111;

            if irq_triggered & irq_mask != 0 {
                interrupts.request(IrqLine::CdRom);
            }
        }

        if self.stat_code.reading() || self.stat_code.playing() {
            self.steps_until_read_sect -= 1;
            if self.steps_until_read_sect == 0 {
                self.steps_until_read_sect = READ_SECTOR_DELAY_STEPS;

                let pos_to_read = CdPosition::from_lba(self.read_sector as i32);
                let (sector, sector_kind) = self.disk.read(pos_to_read);
                self.read_buf = sector;

                self.read_sector = self.read_sector.wrapping_add(1);

                if sector_kind == SectorKind::Invalid {
                    return;
                }

                let sync_match = self.read_buf[..SYNC_MAGIC.len()] == SYNC_MAGIC;

                if self.stat_code.playing() && sector_kind == SectorKind::Audio {
                    if sync_match {
                        log::warn!("Sync pattern found in audio sector");
                    }
                } else if self.stat_code.reading() && sector_kind == SectorKind::Data {
                    if !sync_match {
                        log::warn!("Sync pattern mismatch in data sector");
                    }

                    // ack more data
                    let stat = self.stat_code.byte();
                    self.push_response(ResponseType::SecondInt1, &[stat]);
                }
            }
        }
    }

    /// Read one of the four drive registers
    ///
    /// `addr_rebased` is the register offset (0..=3) within the I/O window.
    pub fn read_reg(&mut self, addr_rebased: u32) -> u8 {
        let reg = addr_rebased as u8;
        let reg_index = self.reg_status.index();

        let val = if reg == 0 {
            // Status Register
            self.reg_status.byte()
        } else if reg == 1 {
            // Response FIFO
            match self.resp_fifo.pop_front() {
                Some(byte) => {
                    if self.resp_fifo.is_empty() {
                        self.reg_status.set_response_fifo_not_empty(false);
                    }
                    byte
                }
                None => 0,
            }
        } else if reg == 2 {
            // Data FIFO
            self.read_byte()
        } else if reg == 3 && (reg_index == 0 || reg_index == 2) {
            // Interrupt Enable Register
            self.reg_int_enable
        } else if reg == 3 && (reg_index == 1 || reg_index == 3) {
            // Interrupt Flag Register; the high bits read back as set
            let mut val = 0b1110_0000;
            if let Some(&irq) = self.irq_fifo.front() {
                val |= irq & 0b111;
            }
            val
        } else {
            log::warn!("Unhandled read, CDREG{}.{}", reg, reg_index);
            0
        };

        log::trace!(
            "CD-ROM read {} (CDREG{}.{}) val: 0x{:02X}",
            Self::register_name(reg, reg_index, true),
            reg,
            reg_index,
            val
        );

        val
    }

    /// Write one of the four drive registers
    pub fn write_reg(&mut self, addr_rebased: u32, val: u8) {
        let reg = addr_rebased as u8;
        let reg_index = self.reg_status.index();

        if reg == 0 {
            // Index Register
            self.reg_status.set_index(val);
            return; // Don't log in this case
        } else if reg == 1 && reg_index == 0 {
            // Command Register
            self.execute_command(val);
        } else if reg == 1 && reg_index == 1 {
            // Sound Map Data Out
        } else if reg == 1 && reg_index == 2 {
            // Sound Map Coding Info
        } else if reg == 1 && reg_index == 3 {
            // Audio Volume for Right-CD-Out to Right-SPU-Input
        } else if reg == 2 && reg_index == 0 {
            // Parameter FIFO
            debug_assert!(
                self.param_fifo.len() < MAX_FIFO_SIZE,
                "parameter FIFO overflow"
            );

            self.param_fifo.push_back(val);
            self.reg_status.set_param_fifo_empty(false);
            self.reg_status
                .set_param_fifo_write_ready(self.param_fifo.len() < MAX_FIFO_SIZE);
        } else if reg == 2 && reg_index == 1 {
            // Interrupt Enable Register
            self.reg_int_enable = val;
        } else if reg == 2 && reg_index == 2 {
            // Audio Volume for Left-CD-Out to Left-SPU-Input
        } else if reg == 2 && reg_index == 3 {
            // Audio Volume for Right-CD-Out to Left-SPU-Input
        } else if reg == 3 && reg_index == 0 {
            // Request Register
            if val & 0x80 != 0 {
                // Want data; only load a new sector once the previous one
                // has been fully drained
                if self.is_data_buf_empty() {
                    self.data_buf = mem::take(&mut self.read_buf);
                    self.data_buffer_index = 0;
                    self.reg_status.set_data_fifo_not_empty(true);
                }
            } else {
                self.data_buf.clear();
                self.data_buffer_index = 0;
                self.reg_status.set_data_fifo_not_empty(false);
            }
        } else if reg == 3 && reg_index == 1 {
            // Interrupt Flag Register
            if val & 0x40 != 0 {
                // Reset Parameter FIFO
                self.param_fifo.clear();
                self.reg_status.set_param_fifo_empty(true);
                self.reg_status.set_param_fifo_write_ready(true);
            }
            // Acknowledge the current cause so the next one can surface
            self.irq_fifo.pop_front();
        } else if reg == 3 && reg_index == 2 {
            // Audio Volume for Left-CD-Out to Right-SPU-Input
        } else if reg == 3 && reg_index == 3 {
            // Audio Volume Apply Changes
        } else {
            log::warn!("Unhandled write, CDREG{}.{} val: 0x{:02X}", reg, reg_index, val);
        }

        log::trace!(
            "CD-ROM write {} (CDREG{}.{}) val: 0x{:02X}",
            Self::register_name(reg, reg_index, false),
            reg,
            reg_index,
            val
        );
    }

    /// True when the data buffer has been fully drained (or never filled)
    fn is_data_buf_empty(&self) -> bool {
        if self.data_buf.is_empty() {
            return true;
        }

        self.data_buffer_index >= self.mode.sector_size()
    }

    /// Pop one byte from the data stream
    ///
    /// The payload window depends on the mode: whole-sector transfers skip
    /// only the 12-byte sync pattern, data-only transfers also skip the
    /// header and subheader (offset 24).
    pub fn read_byte(&mut self) -> u8 {
        if self.is_data_buf_empty() {
            log::warn!("Tried to read with an empty data buffer");
            return 0;
        }

        // TODO: guard the payload window when the host rewrites the mode
        // mid-transfer
        let data_only = self.mode.sector_size() == 0x800;
        let data_offset = if data_only { 24 } else { 12 };

        let data = self.data_buf[data_offset + self.data_buffer_index];
        self.data_buffer_index += 1;

        if self.is_data_buf_empty() {
            self.reg_status.set_data_fifo_not_empty(false);
        }

        data
    }

    /// Pop four bytes from the data stream, packed little-endian
    ///
    /// 16/32-bit host accesses to the data FIFO are synthesized from
    /// successive 8-bit reads.
    pub fn read_word(&mut self) -> u32 {
        let mut data = self.read_byte() as u32;
        data |= (self.read_byte() as u32) << 8;
        data |= (self.read_byte() as u32) << 16;
        data |= (self.read_byte() as u32) << 24;
        data
    }

    /// Human-readable register name for the trace log
    fn register_name(reg: u8, index: u8, is_read: bool) -> &'static str {
        if is_read {
            match (reg, index) {
                (0, _) => "Status Register",
                (1, _) => "Response FIFO",
                (2, _) => "Data FIFO",
                (3, 0) | (3, 2) => "Interrupt Enable Register",
                (3, 1) | (3, 3) => "Interrupt Flag Register",
                _ => "<unknown>",
            }
        } else {
            match (reg, index) {
                (0, _) => "Index Register",
                (1, 0) => "Command Register",
                (1, 1) => "Sound Map Data Out",
                (1, 2) => "Sound Map Coding Info",
                (1, 3) => "Audio Volume for Right-CD-Out to Right-SPU-Input",
                (2, 0) => "Parameter FIFO",
                (2, 1) => "Interrupt Enable Register",
                (2, 2) => "Audio Volume for Left-CD-Out to Left-SPU-Input",
                (2, 3) => "Audio Volume for Right-CD-Out to Left-SPU-Input",
                (3, 0) => "Request Register",
                (3, 1) => "Interrupt Flag Register",
                (3, 2) => "Audio Volume for Left-CD-Out to Right-SPU-Input",
                (3, 3) => "Audio Volume Apply Changes",
                _ => "<unknown>",
            }
        }
    }
}

impl Default for CdromDrive {
    fn default() -> Self {
        Self::new()
    }
}
