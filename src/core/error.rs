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

/// CD-ROM subsystem error types
use std::fmt;

/// Result type for CD-ROM operations
pub type Result<T> = std::result::Result<T, CdRomError>;

/// CD-ROM subsystem error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdRomError {
    /// I/O error (file operations)
    IoError {
        /// Error message
        message: String,
    },

    /// Malformed or unsupported .cue sheet
    CueParseError {
        /// Error message
        message: String,
    },

    /// Image data inconsistent with the sheet or unreadable
    DiscLoadError {
        /// Error message
        message: String,
    },
}

impl fmt::Display for CdRomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CdRomError::IoError { message } => {
                write!(f, "I/O error: {}", message)
            }
            CdRomError::CueParseError { message } => {
                write!(f, "Cue sheet error: {}", message)
            }
            CdRomError::DiscLoadError { message } => {
                write!(f, "Disc load error: {}", message)
            }
        }
    }
}

impl std::error::Error for CdRomError {}

impl From<std::io::Error> for CdRomError {
    fn from(err: std::io::Error) -> Self {
        CdRomError::IoError {
            message: err.to_string(),
        }
    }
}
