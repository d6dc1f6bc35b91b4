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

//! Bit-packed drive registers
//!
//! The wire contract is byte-level, so each register is a single backing
//! byte with named accessors rather than a bitfield struct.
//!
//! ## Status Register (read at CDREG0)
//!
//! ```text
//! Bit 0-1: Index (register bank select, 0-3)
//! Bit 2: ADPCM FIFO empty
//! Bit 3: Parameter FIFO empty (1=Empty)
//! Bit 4: Parameter FIFO write ready (1=Not Full)
//! Bit 5: Response FIFO not empty (1=Not Empty)
//! Bit 6: Data FIFO not empty (1=Not Empty)
//! Bit 7: Transmit busy
//! ```
//!
//! ## Stat Code (drive status byte, first byte of most responses)
//!
//! ```text
//! Bit 0: Error
//! Bit 1: Spindle motor on
//! Bit 2: Seek error
//! Bit 3: ID error
//! Bit 4: Shell open
//! Bit 5: Reading
//! Bit 6: Seeking
//! Bit 7: Playing
//! ```

const STATUS_INDEX: u8 = 0b0000_0011;
const STATUS_ADPCM_FIFO_EMPTY: u8 = 1 << 2;
const STATUS_PARAM_FIFO_EMPTY: u8 = 1 << 3;
const STATUS_PARAM_FIFO_WRITE_READY: u8 = 1 << 4;
const STATUS_RESPONSE_FIFO_NOT_EMPTY: u8 = 1 << 5;
const STATUS_DATA_FIFO_NOT_EMPTY: u8 = 1 << 6;
const STATUS_TRANSMIT_BUSY: u8 = 1 << 7;

const STAT_ERROR: u8 = 1 << 0;
const STAT_SPINDLE_MOTOR_ON: u8 = 1 << 1;
const STAT_SEEK_ERROR: u8 = 1 << 2;
const STAT_ID_ERROR: u8 = 1 << 3;
const STAT_SHELL_OPEN: u8 = 1 << 4;
const STAT_READING: u8 = 1 << 5;
const STAT_SEEKING: u8 = 1 << 6;
const STAT_PLAYING: u8 = 1 << 7;

const MODE_SECTOR_SIZE_WHOLE: u8 = 1 << 5;

#[inline]
fn with_bit(byte: u8, mask: u8, on: bool) -> u8 {
    if on {
        byte | mask
    } else {
        byte & !mask
    }
}

/// Host-visible status register (CDREG0 reads)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRegister {
    byte: u8,
}

impl StatusRegister {
    /// Power-on state: parameter FIFO empty and writable, everything else clear
    pub fn new() -> Self {
        Self {
            byte: STATUS_PARAM_FIFO_EMPTY | STATUS_PARAM_FIFO_WRITE_READY,
        }
    }

    /// Raw register byte
    pub fn byte(&self) -> u8 {
        self.byte
    }

    /// Current register bank index (0-3)
    pub fn index(&self) -> u8 {
        self.byte & STATUS_INDEX
    }

    pub fn set_index(&mut self, index: u8) {
        self.byte = (self.byte & !STATUS_INDEX) | (index & STATUS_INDEX);
    }

    pub fn set_adpcm_fifo_empty(&mut self, on: bool) {
        self.byte = with_bit(self.byte, STATUS_ADPCM_FIFO_EMPTY, on);
    }

    pub fn param_fifo_empty(&self) -> bool {
        self.byte & STATUS_PARAM_FIFO_EMPTY != 0
    }

    pub fn set_param_fifo_empty(&mut self, on: bool) {
        self.byte = with_bit(self.byte, STATUS_PARAM_FIFO_EMPTY, on);
    }

    pub fn param_fifo_write_ready(&self) -> bool {
        self.byte & STATUS_PARAM_FIFO_WRITE_READY != 0
    }

    pub fn set_param_fifo_write_ready(&mut self, on: bool) {
        self.byte = with_bit(self.byte, STATUS_PARAM_FIFO_WRITE_READY, on);
    }

    pub fn response_fifo_not_empty(&self) -> bool {
        self.byte & STATUS_RESPONSE_FIFO_NOT_EMPTY != 0
    }

    pub fn set_response_fifo_not_empty(&mut self, on: bool) {
        self.byte = with_bit(self.byte, STATUS_RESPONSE_FIFO_NOT_EMPTY, on);
    }

    pub fn data_fifo_not_empty(&self) -> bool {
        self.byte & STATUS_DATA_FIFO_NOT_EMPTY != 0
    }

    pub fn set_data_fifo_not_empty(&mut self, on: bool) {
        self.byte = with_bit(self.byte, STATUS_DATA_FIFO_NOT_EMPTY, on);
    }

    pub fn transmit_busy(&self) -> bool {
        self.byte & STATUS_TRANSMIT_BUSY != 0
    }

    pub fn set_transmit_busy(&mut self, on: bool) {
        self.byte = with_bit(self.byte, STATUS_TRANSMIT_BUSY, on);
    }
}

impl Default for StatusRegister {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive read state, encoded in stat-code bits 5-7
///
/// At most one of {reading, seeking, playing} is set at any moment;
/// [`StatCode::set_state`] enforces the exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveState {
    Stopped,
    Seeking,
    Reading,
    Playing,
}

/// Drive status byte, returned as the first byte of most responses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatCode {
    byte: u8,
}

impl StatCode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw status byte
    pub fn byte(&self) -> u8 {
        self.byte
    }

    /// Restore the power-on state (everything clear, motor off)
    pub fn reset(&mut self) {
        self.byte = 0;
    }

    pub fn error(&self) -> bool {
        self.byte & STAT_ERROR != 0
    }

    pub fn set_error(&mut self, on: bool) {
        self.byte = with_bit(self.byte, STAT_ERROR, on);
    }

    pub fn spindle_motor_on(&self) -> bool {
        self.byte & STAT_SPINDLE_MOTOR_ON != 0
    }

    pub fn set_spindle_motor_on(&mut self, on: bool) {
        self.byte = with_bit(self.byte, STAT_SPINDLE_MOTOR_ON, on);
    }

    pub fn seek_error(&self) -> bool {
        self.byte & STAT_SEEK_ERROR != 0
    }

    pub fn set_seek_error(&mut self, on: bool) {
        self.byte = with_bit(self.byte, STAT_SEEK_ERROR, on);
    }

    pub fn id_error(&self) -> bool {
        self.byte & STAT_ID_ERROR != 0
    }

    pub fn set_id_error(&mut self, on: bool) {
        self.byte = with_bit(self.byte, STAT_ID_ERROR, on);
    }

    pub fn shell_open(&self) -> bool {
        self.byte & STAT_SHELL_OPEN != 0
    }

    pub fn set_shell_open(&mut self, on: bool) {
        self.byte = with_bit(self.byte, STAT_SHELL_OPEN, on);
    }

    pub fn reading(&self) -> bool {
        self.byte & STAT_READING != 0
    }

    pub fn seeking(&self) -> bool {
        self.byte & STAT_SEEKING != 0
    }

    pub fn playing(&self) -> bool {
        self.byte & STAT_PLAYING != 0
    }

    /// Set the drive state; the three state bits are mutually exclusive
    pub fn set_state(&mut self, state: DriveState) {
        self.byte &= !(STAT_READING | STAT_SEEKING | STAT_PLAYING);
        match state {
            DriveState::Stopped => {}
            DriveState::Seeking => self.byte |= STAT_SEEKING,
            DriveState::Reading => self.byte |= STAT_READING,
            DriveState::Playing => self.byte |= STAT_PLAYING,
        }
    }
}

/// Mode register, set by the Setmode command
///
/// Only bit 5 (sector size) is interpreted by the core; the remaining bits
/// are stored for the host to read back. Bit 4 must be zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeRegister {
    byte: u8,
}

impl ModeRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw mode byte
    pub fn byte(&self) -> u8 {
        self.byte
    }

    pub fn set_byte(&mut self, byte: u8) {
        self.byte = byte;
    }

    /// Restore the power-on mode (all bits clear)
    pub fn reset(&mut self) {
        self.byte = 0;
    }

    /// Bytes the host fetches per sector: 0x924 (whole sector past the
    /// sync pattern) when bit 5 is set, 0x800 (data only) otherwise
    pub fn sector_size(&self) -> usize {
        if self.byte & MODE_SECTOR_SIZE_WHOLE != 0 {
            0x924
        } else {
            0x800
        }
    }
}
