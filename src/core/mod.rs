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

//! Core emulation components
//!
//! This module contains the CD-ROM subsystem and its collaborators:
//! - CD-ROM drive (registers, FIFOs, command processor, sector pump)
//! - Disc image reader (.cue/.bin)
//! - Interrupt controller (IRQ line management, consumed by the embedder)

pub mod cdrom;
pub mod error;
pub mod interrupt;

// Re-export commonly used types
pub use cdrom::{CdromDrive, DiscImage};
pub use error::{CdRomError, Result};
pub use interrupt::InterruptController;
