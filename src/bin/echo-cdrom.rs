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

//! Disc inspection and drive smoke-test tool
//!
//! Loads a .cue/.bin image into an emulated drive, prints the track table,
//! then talks to the drive through its MMIO window the way a host would:
//! GetID/GetTN handshakes, a Setloc+ReadN, and a pump run that streams the
//! first data sector out of the data FIFO.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use echo_cdrom::core::cdrom::{CdromDrive, READ_SECTOR_DELAY_STEPS};
use echo_cdrom::core::interrupt::{InterruptController, IrqLine};

/// PlayStation CD-ROM drive emulation smoke test
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Disc image to load (.cue sheet or raw .bin)
    image: PathBuf,

    /// MSF position to read from, e.g. 00:02:00
    #[arg(long, default_value = "00:02:00")]
    position: String,
}

/// Issue a command and collect its responses, acknowledging each cause
fn run_command(drive: &mut CdromDrive, cmd: u8, params: &[u8]) -> Vec<(u8, Vec<u8>)> {
    drive.write_reg(0, 0);
    for &param in params {
        drive.write_reg(2, param);
    }
    drive.write_reg(1, cmd);

    let mut acks = Vec::new();
    loop {
        drive.write_reg(0, 1);
        let cause = drive.read_reg(3) & 0b111;
        if cause == 0 {
            break;
        }

        let mut payload = Vec::new();
        drive.write_reg(0, 0);
        while drive.read_reg(0) & 0b10_0000 != 0 {
            payload.push(drive.read_reg(1));
        }

        drive.write_reg(0, 1);
        drive.write_reg(3, 0); // acknowledge
        acks.push((cause, payload));
    }
    drive.write_reg(0, 0);
    acks
}

fn parse_msf(s: &str) -> anyhow::Result<[u8; 3]> {
    let fields: Vec<u8> = s
        .split(':')
        .map(|f| f.parse())
        .collect::<Result<_, _>>()
        .with_context(|| format!("invalid MSF position '{}'", s))?;
    anyhow::ensure!(fields.len() == 3, "expected MM:SS:FF, got '{}'", s);
    Ok([fields[0], fields[1], fields[2]])
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    info!("echo-cdrom v{}", env!("CARGO_PKG_VERSION"));

    let mut drive = CdromDrive::new();
    let mut interrupts = InterruptController::new();
    interrupts.write_mask(IrqLine::CdRom.mask() as u32);

    drive
        .insert_disk_file(&args.image)
        .with_context(|| format!("failed to load '{}'", args.image.display()))?;

    for track in drive.disk().tracks() {
        let start = drive.disk().get_track_start(track.number);
        info!(
            "Track {:02}: {:?}, {} sectors, starts at {:?}",
            track.number,
            track.kind,
            track.sector_count(),
            start
        );
    }

    // Enable all interrupt causes
    drive.write_reg(0, 1);
    drive.write_reg(2, 0b111);

    for (cause, payload) in run_command(&mut drive, 0x1A, &[]) {
        info!("GetID INT{}: {:02X?}", cause, payload);
    }
    for (cause, payload) in run_command(&mut drive, 0x13, &[]) {
        info!("GetTN INT{}: {:02X?}", cause, payload);
    }

    // Seek to the requested position and stream one sector
    let [mm, ss, ff] = parse_msf(&args.position)?;
    let to_bcd = |v: u8| ((v / 10) << 4) | (v % 10);
    run_command(&mut drive, 0x02, &[to_bcd(mm), to_bcd(ss), to_bcd(ff)]);
    run_command(&mut drive, 0x06, &[]); // ReadN

    // One extra step: the cause queued by the pump asserts the line on the
    // following tick
    let mut fetched = false;
    for _ in 0..=READ_SECTOR_DELAY_STEPS {
        drive.step(&mut interrupts);
        if interrupts.is_pending() {
            interrupts.write_status(IrqLine::CdRom.mask() as u32);
            drive.write_reg(0, 1);
            if drive.read_reg(3) & 0b111 == 1 {
                drive.write_reg(3, 0); // ack INT1
                fetched = true;
                break;
            }
        }
    }
    anyhow::ensure!(fetched, "the pump produced no data sector; audio track?");

    // Pull the sector into the data FIFO and dump its first bytes
    drive.write_reg(0, 0);
    drive.write_reg(3, 0x80);

    let mut head = Vec::with_capacity(16);
    for _ in 0..4 {
        head.extend_from_slice(&drive.read_word().to_le_bytes());
    }
    info!("Sector head at {}: {:02X?}", args.position, head);

    Ok(())
}
