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

//! Bit-packed register tests

use super::super::*;

#[test]
fn test_status_register_power_on() {
    let status = StatusRegister::new();

    // Parameter FIFO empty and writable, everything else clear
    assert_eq!(status.byte(), 0b0001_1000);
    assert_eq!(status.index(), 0);
    assert!(status.param_fifo_empty());
    assert!(status.param_fifo_write_ready());
    assert!(!status.response_fifo_not_empty());
    assert!(!status.data_fifo_not_empty());
    assert!(!status.transmit_busy());
}

#[test]
fn test_index_write_touches_only_index_bits() {
    let mut drive = CdromDrive::new();
    let before = drive.reg_status.byte();

    drive.write_reg(0, 0xFF);

    assert_eq!(drive.reg_status.index(), 0b11);
    assert_eq!(drive.reg_status.byte(), (before & !0b11) | 0b11);

    drive.write_reg(0, 0x01);
    assert_eq!(drive.reg_status.index(), 1);
}

#[test]
fn test_param_fifo_flags_track_pushes() {
    let mut drive = CdromDrive::new();

    drive.write_reg(0, 0);
    drive.write_reg(2, 0x12);

    assert_eq!(drive.param_fifo.len(), 1);
    assert!(!drive.reg_status.param_fifo_empty());
    assert!(drive.reg_status.param_fifo_write_ready());

    // Fill the FIFO; the write-ready flag drops at 16 entries
    for i in 1..MAX_FIFO_SIZE {
        drive.write_reg(2, i as u8);
    }
    assert_eq!(drive.param_fifo.len(), MAX_FIFO_SIZE);
    assert!(!drive.reg_status.param_fifo_write_ready());
}

#[test]
fn test_stat_code_state_bits_are_exclusive() {
    let mut stat = StatCode::new();

    stat.set_state(DriveState::Reading);
    assert!(stat.reading() && !stat.seeking() && !stat.playing());

    stat.set_state(DriveState::Seeking);
    assert!(!stat.reading() && stat.seeking() && !stat.playing());

    stat.set_state(DriveState::Playing);
    assert!(!stat.reading() && !stat.seeking() && stat.playing());

    stat.set_state(DriveState::Stopped);
    assert!(!stat.reading() && !stat.seeking() && !stat.playing());
}

#[test]
fn test_stat_code_state_keeps_other_bits() {
    let mut stat = StatCode::new();

    stat.set_spindle_motor_on(true);
    stat.set_state(DriveState::Reading);

    assert!(stat.spindle_motor_on());
    assert_eq!(stat.byte(), 0b0010_0010);
}

#[test]
fn test_stat_code_byte_layout() {
    let mut stat = StatCode::new();
    assert_eq!(stat.byte(), 0);

    stat.set_error(true);
    assert_eq!(stat.byte() & 0x01, 0x01);

    stat.set_shell_open(true);
    assert_eq!(stat.byte() & 0x10, 0x10);

    stat.reset();
    assert_eq!(stat.byte(), 0);
}

#[test]
fn test_mode_register_sector_size() {
    let mut mode = ModeRegister::new();

    // Power-on: data-only transfers
    assert_eq!(mode.sector_size(), 0x800);

    mode.set_byte(0x20);
    assert_eq!(mode.sector_size(), 0x924);

    mode.reset();
    assert_eq!(mode.sector_size(), 0x800);
}

#[test]
fn test_mode_register_byte_round_trip() {
    let mut mode = ModeRegister::new();
    mode.set_byte(0xA3);
    assert_eq!(mode.byte(), 0xA3);
}
