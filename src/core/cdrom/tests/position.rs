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

//! MSF/LBA codec and BCD conversion tests

use super::super::*;

#[test]
fn test_msf_to_lba() {
    let pos = CdPosition::new(0, 2, 0);
    assert_eq!(pos.to_lba(), 0); // Start of data, after the 2-second lead-in

    let pos = CdPosition::new(0, 3, 0);
    assert_eq!(pos.to_lba(), 75); // 1 second after start

    // Positions inside the lead-in go negative
    let pos = CdPosition::new(0, 0, 16);
    assert_eq!(pos.to_lba(), -134);
}

#[test]
fn test_lba_to_msf() {
    let pos = CdPosition::from_lba(0);
    assert_eq!(pos, CdPosition::new(0, 2, 0));

    let pos = CdPosition::from_lba(75);
    assert_eq!(pos, CdPosition::new(0, 3, 0));

    let pos = CdPosition::from_lba(4500 - 150);
    assert_eq!(pos, CdPosition::new(1, 0, 0));
}

#[test]
fn test_msf_round_trip_all_positions() {
    for minute in 0..100u8 {
        for second in 0..60u8 {
            for frame in 0..75u8 {
                let pos = CdPosition::new(minute, second, frame);
                assert_eq!(CdPosition::from_lba(pos.to_lba()), pos);
            }
        }
    }
}

#[test]
fn test_lba_round_trip_whole_range() {
    // Every LBA representable as a valid MSF position, lead-in included
    let last = CdPosition::new(99, 59, 74).to_lba();
    for lba in -150..=last {
        assert_eq!(CdPosition::from_lba(lba).to_lba(), lba);
    }
}

#[test]
fn test_bcd_conversion() {
    assert_eq!(bcd_to_dec(0x23), 23);
    assert_eq!(bcd_to_dec(0x00), 0);
    assert_eq!(bcd_to_dec(0x99), 99);

    assert_eq!(dec_to_bcd(23), 0x23);
    assert_eq!(dec_to_bcd(0), 0x00);
    assert_eq!(dec_to_bcd(99), 0x99);
}

#[test]
fn test_bcd_round_trip() {
    for n in 0..=99u8 {
        assert_eq!(bcd_to_dec(dec_to_bcd(n)), n);
    }
}
