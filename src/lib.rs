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

//! PlayStation 1 CD-ROM drive emulation core
//!
//! This library emulates the PSX CD-ROM controller as seen from the host
//! CPU: the four-register MMIO window at 0x1F801800, the command processor
//! with its parameter/response/interrupt FIFOs, the sector-read pump, and
//! the .cue/.bin disc image reader that feeds it.
//!
//! The CPU core, bus decoder and SPU mixer are external collaborators; the
//! embedder maps [`core::cdrom::CdromDrive::read_reg`] /
//! [`core::cdrom::CdromDrive::write_reg`] into its I/O window and calls
//! [`core::cdrom::CdromDrive::step`] once per host tick.
//!
//! # Example
//!
//! ```no_run
//! use echo_cdrom::core::cdrom::CdromDrive;
//! use echo_cdrom::core::interrupt::InterruptController;
//!
//! let mut drive = CdromDrive::new();
//! let mut interrupts = InterruptController::new();
//!
//! drive.insert_disk_file("game.cue".as_ref()).unwrap();
//!
//! // Issue Getstat through the MMIO window
//! drive.write_reg(0, 0); // select bank 0
//! drive.write_reg(1, 0x01); // command register
//! drive.step(&mut interrupts);
//! ```

pub mod core;
