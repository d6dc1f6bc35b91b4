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

//! Sector pump and data streaming tests

use tempfile::TempDir;

use super::super::*;
use crate::core::interrupt::{InterruptController, IrqLine};

/// A data sector: sync pattern, then `fill` everywhere else
fn data_sector(fill: u8) -> Vec<u8> {
    let mut sector = vec![fill; SECTOR_SIZE];
    sector[..SYNC_MAGIC.len()].copy_from_slice(&SYNC_MAGIC);
    sector
}

/// Drive loaded with a 4-sector data-only bin (sync-patterned sectors)
fn data_disc_drive() -> (TempDir, CdromDrive) {
    let dir = tempfile::tempdir().unwrap();
    let mut data = Vec::new();
    for i in 0..4 {
        data.extend_from_slice(&data_sector(i));
    }
    let bin_path = dir.path().join("game.bin");
    std::fs::write(&bin_path, &data).unwrap();

    let mut drive = CdromDrive::new();
    drive.insert_disk_file(&bin_path).unwrap();
    (dir, drive)
}

/// Acknowledge the current interrupt cause through the flag register
fn ack_irq(drive: &mut CdromDrive) {
    drive.write_reg(0, 1);
    drive.write_reg(3, 0);
    drive.write_reg(0, 0);
}

#[test]
fn test_setloc_readn_drives_the_pump() {
    let (_dir, mut drive) = data_disc_drive();
    let mut interrupts = InterruptController::new();

    // Setloc 00:02:00 -> LBA 0
    drive.write_reg(0, 0);
    drive.write_reg(2, 0x00);
    drive.write_reg(2, 0x02);
    drive.write_reg(2, 0x00);
    drive.write_reg(1, 0x02);
    ack_irq(&mut drive);

    drive.write_reg(1, 0x06); // ReadN
    assert!(drive.stat_code.reading());
    assert_eq!(drive.read_sector, 0);
    ack_irq(&mut drive);

    for _ in 0..READ_SECTOR_DELAY_STEPS {
        drive.step(&mut interrupts);
    }

    // The pump fetched sector 0 and announced data-ready
    assert_eq!(drive.read_sector, 1);
    assert_eq!(drive.read_buf, data_sector(0));
    assert_eq!(drive.irq_fifo.front(), Some(&1));

    let resp = drive.read_reg(1);
    assert_eq!(resp & 0x20, 0x20); // stat byte with the reading bit
}

#[test]
fn test_pump_advances_across_sectors() {
    let (_dir, mut drive) = data_disc_drive();
    let mut interrupts = InterruptController::new();

    drive.execute_command(0x06); // ReadN at LBA 0
    ack_irq(&mut drive);

    for sector in 0..3u8 {
        for _ in 0..READ_SECTOR_DELAY_STEPS {
            drive.step(&mut interrupts);
        }
        assert_eq!(drive.read_buf, data_sector(sector));
        ack_irq(&mut drive); // release INT1 for the next one
    }
    assert_eq!(drive.read_sector, 3);
}

#[test]
fn test_pump_raises_cdrom_line_when_enabled() {
    let mut drive = CdromDrive::new();
    let mut interrupts = InterruptController::new();
    interrupts.write_mask(IrqLine::CdRom.mask() as u32);

    // Enable all drive causes
    drive.write_reg(0, 1);
    drive.write_reg(2, 0b111);
    drive.write_reg(0, 0);

    drive.write_reg(1, 0x01); // Getstat -> INT3 queued
    drive.step(&mut interrupts);

    assert!(interrupts.is_pending());
}

#[test]
fn test_pump_respects_interrupt_enable_mask() {
    let mut drive = CdromDrive::new();
    let mut interrupts = InterruptController::new();
    interrupts.write_mask(IrqLine::CdRom.mask() as u32);

    // All causes masked off in the drive
    drive.write_reg(0, 0);
    drive.write_reg(1, 0x01);
    drive.step(&mut interrupts);

    assert!(!interrupts.is_pending());
}

#[test]
fn test_step_clears_transmit_busy() {
    let mut drive = CdromDrive::new();
    let mut interrupts = InterruptController::new();

    drive.execute_command(0x01);
    assert!(drive.reg_status.transmit_busy());

    drive.step(&mut interrupts);
    assert!(!drive.reg_status.transmit_busy());
}

#[test]
fn test_interrupt_causes_surface_one_at_a_time() {
    let mut drive = CdromDrive::new();

    drive.execute_command(0x0A); // Init -> INT3, INT2

    drive.write_reg(0, 1);
    assert_eq!(drive.read_reg(3), 0b1110_0011);

    drive.write_reg(3, 0);
    assert_eq!(drive.read_reg(3), 0b1110_0010);

    drive.write_reg(3, 0);
    assert_eq!(drive.read_reg(3), 0b1110_0000);
}

#[test]
fn test_interrupt_flag_write_can_reset_param_fifo() {
    let mut drive = CdromDrive::new();

    drive.write_reg(0, 0);
    drive.write_reg(2, 0x11);
    drive.write_reg(2, 0x22);

    drive.write_reg(0, 1);
    drive.write_reg(3, 0x40);

    assert!(drive.param_fifo.is_empty());
    assert!(drive.reg_status.param_fifo_empty());
    assert!(drive.reg_status.param_fifo_write_ready());
}

#[test]
fn test_request_register_moves_read_buffer() {
    let mut drive = CdromDrive::new();
    drive.read_buf = data_sector(0xAB);

    drive.write_reg(0, 0);
    drive.write_reg(3, 0x80);

    assert!(drive.read_buf.is_empty());
    assert_eq!(drive.data_buf.len(), SECTOR_SIZE);
    assert_eq!(drive.data_buffer_index, 0);
    assert!(drive.reg_status.data_fifo_not_empty());
}

#[test]
fn test_request_register_keeps_undrained_buffer() {
    let mut drive = CdromDrive::new();
    drive.read_buf = data_sector(0x01);

    drive.write_reg(0, 0);
    drive.write_reg(3, 0x80);
    let first = drive.read_byte();
    assert_eq!(first, 0x01);

    // A fresh sector arrives, but the host has not drained the buffer
    drive.read_buf = data_sector(0x02);
    drive.write_reg(3, 0x80);

    assert_eq!(drive.data_buffer_index, 1);
    assert_eq!(drive.read_byte(), 0x01); // still the old sector
    assert_eq!(drive.read_buf, data_sector(0x02));
}

#[test]
fn test_request_register_clear() {
    let mut drive = CdromDrive::new();
    drive.read_buf = data_sector(0xCD);

    drive.write_reg(0, 0);
    drive.write_reg(3, 0x80);
    drive.write_reg(3, 0x00);

    assert!(drive.data_buf.is_empty());
    assert_eq!(drive.data_buffer_index, 0);
    assert!(!drive.reg_status.data_fifo_not_empty());
}

#[test]
fn test_data_window_in_data_only_mode() {
    let mut drive = CdromDrive::new();

    // Default mode: 0x800 bytes per sector, payload starts at offset 24
    let mut sector = data_sector(0);
    for (i, byte) in sector.iter_mut().enumerate() {
        *byte = (i % 251) as u8;
    }
    drive.read_buf = sector.clone();

    drive.write_reg(0, 0);
    drive.write_reg(3, 0x80);

    for i in 0..0x800usize {
        assert_eq!(drive.read_reg(2), sector[24 + i]);
    }

    // Fully drained: the flag clears and further reads return zero
    assert!(!drive.reg_status.data_fifo_not_empty());
    assert_eq!(drive.read_reg(2), 0);
}

#[test]
fn test_data_window_in_whole_sector_mode() {
    let mut drive = CdromDrive::new();

    drive.write_reg(0, 0);
    drive.write_reg(2, 0x20);
    drive.execute_command(0x0E); // Setmode: whole-sector transfers

    let mut sector = data_sector(0);
    for (i, byte) in sector.iter_mut().enumerate() {
        *byte = (i % 251) as u8;
    }
    drive.read_buf = sector.clone();

    drive.write_reg(3, 0x80);

    // Payload starts right after the sync pattern
    assert_eq!(drive.read_byte(), sector[12]);

    for _ in 1..0x924usize {
        drive.read_byte();
    }
    assert!(drive.is_data_buf_empty());
    assert!(!drive.reg_status.data_fifo_not_empty());
}

#[test]
fn test_read_word_packs_little_endian() {
    let mut drive = CdromDrive::new();

    let mut sector = data_sector(0);
    sector[24] = 0x11;
    sector[25] = 0x22;
    sector[26] = 0x33;
    sector[27] = 0x44;
    drive.read_buf = sector;

    drive.write_reg(0, 0);
    drive.write_reg(3, 0x80);

    assert_eq!(drive.read_word(), 0x4433_2211);
    assert_eq!(drive.data_buffer_index, 4);
}

#[test]
fn test_pump_skips_invalid_positions() {
    let mut drive = CdromDrive::new(); // no disc
    let mut interrupts = InterruptController::new();

    drive.execute_command(0x06); // ReadN
    ack_irq(&mut drive);

    for _ in 0..READ_SECTOR_DELAY_STEPS {
        drive.step(&mut interrupts);
    }

    // The cursor advances but no data-ready is announced
    assert_eq!(drive.read_sector, 1);
    assert!(drive.irq_fifo.is_empty());
}

#[test]
fn test_pump_does_not_announce_audio_sectors() {
    let dir = tempfile::tempdir().unwrap();
    let bin_path = dir.path().join("audio.bin");
    std::fs::write(&bin_path, vec![0x55u8; SECTOR_SIZE * 4]).unwrap();

    let cue_path = dir.path().join("audio.cue");
    std::fs::write(
        &cue_path,
        r#"FILE "audio.bin" BINARY
  TRACK 01 AUDIO
    INDEX 01 00:00:00
"#,
    )
    .unwrap();

    let mut drive = CdromDrive::new();
    drive.insert_disk_file(&cue_path).unwrap();
    let mut interrupts = InterruptController::new();

    drive.execute_command(0x03); // Play at LBA 0
    ack_irq(&mut drive);

    for _ in 0..READ_SECTOR_DELAY_STEPS {
        drive.step(&mut interrupts);
    }

    assert_eq!(drive.read_buf, vec![0x55u8; SECTOR_SIZE]);
    assert!(drive.irq_fifo.is_empty()); // audio sectors never push INT1
}

#[test]
fn test_pause_stops_the_pump() {
    let (_dir, mut drive) = data_disc_drive();
    let mut interrupts = InterruptController::new();

    drive.execute_command(0x06);
    ack_irq(&mut drive);

    for _ in 0..READ_SECTOR_DELAY_STEPS {
        drive.step(&mut interrupts);
    }
    assert_eq!(drive.read_sector, 1);
    ack_irq(&mut drive); // INT1

    drive.execute_command(0x09); // Pause
    ack_irq(&mut drive); // INT3
    ack_irq(&mut drive); // INT2

    for _ in 0..READ_SECTOR_DELAY_STEPS {
        drive.step(&mut interrupts);
    }

    assert_eq!(drive.read_sector, 1); // no further fetches
    assert!(drive.irq_fifo.is_empty());
}
