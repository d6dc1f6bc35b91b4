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

//! Disc image loading and sector access
//!
//! Loads CD-ROM images either from a .cue sheet referencing one or more
//! .bin files, or from a bare .bin (treated as a single data track).
//! Sectors are raw 2352-byte units; the drive decides how much of each
//! sector the host sees.

use std::path::Path;

use super::position::CdPosition;
use super::SECTOR_SIZE;
use crate::core::error::{CdRomError, Result};

/// What kind of sector a disc position holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorKind {
    /// MODE1/MODE2 data sector (sync pattern + header + payload)
    Data,
    /// CD-DA audio sector (raw samples)
    Audio,
    /// Position outside every track
    Invalid,
}

/// A single track: its place on the disc and its raw sector data
#[derive(Debug, Clone)]
pub struct Track {
    /// Track number (1-99)
    pub number: u8,
    /// Data or Audio
    pub kind: SectorKind,
    /// First sector of the track, as a disc LBA
    pub start_lba: u32,
    /// Raw 2352-byte sectors
    data: Vec<u8>,
}

impl Track {
    /// Number of sectors in this track
    pub fn sector_count(&self) -> u32 {
        (self.data.len() / SECTOR_SIZE) as u32
    }
}

/// Disc image loaded from .cue/.bin files
///
/// # Example
///
/// ```no_run
/// use echo_cdrom::core::cdrom::{CdPosition, DiscImage};
///
/// let disc = DiscImage::from_cue("game.cue".as_ref()).unwrap();
/// let (sector, kind) = disc.read(CdPosition::new(0, 2, 0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DiscImage {
    tracks: Vec<Track>,
}

/// Track parsed from a cue sheet, before its file data has been sliced
struct CueTrack {
    number: u8,
    kind: SectorKind,
    /// INDEX 01 position, in sectors relative to the start of the FILE
    index: Option<u32>,
}

impl DiscImage {
    /// An empty disc (no tracks); what an open drive exposes
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a disc image from a .cue sheet
    ///
    /// The sheet may reference several .bin files; they occupy consecutive
    /// sector ranges on the disc in sheet order. Bin paths resolve relative
    /// to the sheet's parent directory.
    pub fn from_cue(cue_path: &Path) -> Result<Self> {
        let cue_data = std::fs::read_to_string(cue_path)?;
        let parent = cue_path.parent().unwrap_or_else(|| Path::new(""));

        let mut tracks: Vec<Track> = Vec::new();
        let mut disc_lba: u32 = 0;
        let mut file_data: Option<Vec<u8>> = None;
        let mut cue_tracks: Vec<CueTrack> = Vec::new();

        for line in cue_data.lines() {
            let line = line.trim();

            if line.starts_with("FILE") {
                if let Some(data) = file_data.take() {
                    Self::slice_file_tracks(data, &mut cue_tracks, &mut tracks, &mut disc_lba)?;
                }

                let bin_name = Self::quoted_field(line).ok_or_else(|| {
                    CdRomError::CueParseError {
                        message: format!("FILE entry without a quoted name: '{}'", line),
                    }
                })?;
                let bin_path = parent.join(bin_name);
                let data = std::fs::read(&bin_path).map_err(|e| CdRomError::DiscLoadError {
                    message: format!("failed to read bin file '{}': {}", bin_path.display(), e),
                })?;
                file_data = Some(data);
            } else if line.starts_with("TRACK") {
                if file_data.is_none() {
                    return Err(CdRomError::CueParseError {
                        message: "TRACK entry before any FILE entry".to_string(),
                    });
                }

                let parts: Vec<&str> = line.split_whitespace().collect();
                let number = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(1);
                let kind = match parts.get(2) {
                    Some(&"AUDIO") => SectorKind::Audio,
                    Some(&"MODE1/2352") | Some(&"MODE2/2352") => SectorKind::Data,
                    other => {
                        log::warn!("Unknown track type {:?}, assuming data", other);
                        SectorKind::Data
                    }
                };

                cue_tracks.push(CueTrack {
                    number,
                    kind,
                    index: None,
                });
            } else if line.starts_with("INDEX 01") {
                if let Some(track) = cue_tracks.last_mut() {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    if let Some(time_str) = parts.get(2) {
                        let pos = Self::parse_msf(time_str)?;
                        // File-relative offset; no lead-in correction here
                        track.index = Some(
                            (pos.minute as u32 * 60 + pos.second as u32) * 75 + pos.frame as u32,
                        );
                    }
                }
            }
        }

        if let Some(data) = file_data.take() {
            Self::slice_file_tracks(data, &mut cue_tracks, &mut tracks, &mut disc_lba)?;
        }

        if tracks.is_empty() {
            return Err(CdRomError::CueParseError {
                message: "cue sheet contains no tracks".to_string(),
            });
        }

        log::info!(
            "Loaded disc image: {} tracks, {} sectors",
            tracks.len(),
            disc_lba
        );

        Ok(Self { tracks })
    }

    /// Load a bare .bin image as a single data track starting at LBA 0
    pub fn from_bin(bin_path: &Path) -> Result<Self> {
        let data = std::fs::read(bin_path)?;

        let sectors = data.len() / SECTOR_SIZE;
        if data.len() % SECTOR_SIZE != 0 {
            log::warn!(
                "Bin file '{}' is not a whole number of sectors, truncating",
                bin_path.display()
            );
        }

        log::info!(
            "Loaded disc image: 1 track, {} sectors ({} MB)",
            sectors,
            data.len() / 1024 / 1024
        );

        Ok(Self {
            tracks: vec![Track {
                number: 1,
                kind: SectorKind::Data,
                start_lba: 0,
                data: data[..sectors * SECTOR_SIZE].to_vec(),
            }],
        })
    }

    /// Slice one FILE's data among the tracks declared for it
    fn slice_file_tracks(
        data: Vec<u8>,
        cue_tracks: &mut Vec<CueTrack>,
        tracks: &mut Vec<Track>,
        disc_lba: &mut u32,
    ) -> Result<()> {
        let file_sectors = (data.len() / SECTOR_SIZE) as u32;
        if data.len() % SECTOR_SIZE != 0 {
            log::warn!("Bin file is not a whole number of sectors, truncating");
        }

        let drained: Vec<CueTrack> = cue_tracks.drain(..).collect();
        for (i, cue_track) in drained.iter().enumerate() {
            let start = cue_track.index.ok_or_else(|| CdRomError::CueParseError {
                message: format!("track {} has no INDEX 01 entry", cue_track.number),
            })?;
            let end = match drained.get(i + 1) {
                Some(next) => next.index.unwrap_or(file_sectors),
                None => file_sectors,
            };
            if start > end || end > file_sectors {
                return Err(CdRomError::DiscLoadError {
                    message: format!(
                        "track {} spans sectors {}..{} outside its bin file ({} sectors)",
                        cue_track.number, start, end, file_sectors
                    ),
                });
            }

            tracks.push(Track {
                number: cue_track.number,
                kind: cue_track.kind,
                start_lba: *disc_lba + start,
                data: data[start as usize * SECTOR_SIZE..end as usize * SECTOR_SIZE].to_vec(),
            });
        }

        *disc_lba += file_sectors;
        Ok(())
    }

    /// First string between double quotes on a line
    fn quoted_field(line: &str) -> Option<&str> {
        let start = line.find('"')?;
        let end = line[start + 1..].find('"')?;
        Some(&line[start + 1..start + 1 + end])
    }

    /// Parse an MSF time field (MM:SS:FF)
    fn parse_msf(msf: &str) -> Result<CdPosition> {
        let parts: Vec<&str> = msf.split(':').collect();
        if parts.len() != 3 {
            return Err(CdRomError::CueParseError {
                message: format!("invalid MSF field: '{}'", msf),
            });
        }

        let field = |i: usize, name: &str| -> Result<u8> {
            parts[i].parse().map_err(|_| CdRomError::CueParseError {
                message: format!("invalid {} in MSF field: '{}'", name, msf),
            })
        };

        Ok(CdPosition {
            minute: field(0, "minute")?,
            second: field(1, "second")?,
            frame: field(2, "frame")?,
        })
    }

    /// Read the 2352-byte sector at the given position
    ///
    /// Positions outside every track return a zeroed buffer and
    /// [`SectorKind::Invalid`]; callers are expected to bail out on it.
    pub fn read(&self, position: CdPosition) -> (Vec<u8>, SectorKind) {
        let lba = position.to_lba();

        if lba >= 0 {
            let lba = lba as u32;
            for track in &self.tracks {
                if lba >= track.start_lba && lba < track.start_lba + track.sector_count() {
                    let offset = (lba - track.start_lba) as usize * SECTOR_SIZE;
                    return (
                        track.data[offset..offset + SECTOR_SIZE].to_vec(),
                        track.kind,
                    );
                }
            }
        }

        log::trace!(
            "Sector read outside all tracks: {:02}:{:02}:{:02}",
            position.minute,
            position.second,
            position.frame
        );
        (vec![0; SECTOR_SIZE], SectorKind::Invalid)
    }

    /// True when no image has been inserted
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Number of tracks on the disc
    pub fn track_count(&self) -> u8 {
        self.tracks.len() as u8
    }

    /// Start position of a track (1-based), if it exists
    pub fn get_track_start(&self, number: u8) -> Option<CdPosition> {
        self.tracks
            .iter()
            .find(|t| t.number == number)
            .map(|t| CdPosition::from_lba(t.start_lba as i32))
    }

    /// End of the last track; what GetTD reports for track 0
    pub fn size(&self) -> CdPosition {
        let end = self
            .tracks
            .last()
            .map(|t| t.start_lba + t.sector_count())
            .unwrap_or(0);
        CdPosition::from_lba(end as i32)
    }

    /// Track table, in sheet order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}
