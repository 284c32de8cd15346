//! Translation between PDG particle codes and PHITS kf-codes.
//!
//! PHITS uses PDG codes for elementary particles but encodes nuclei as
//! `Z*1000000 + A`, while PDG uses `100ZZZAAAI`. Both functions are total:
//! 0 means the code has no counterpart and the particle must be skipped.

const PHITS_NUCLEUS_BASE: i32 = 1_000_000;
const PDG_NUCLEUS_BASE: i32 = 1_000_000_000;
/// Upper bound of the `10LZZZAAAI` range.
const PDG_NUCLEUS_END: i32 = 1_100_000_000;
const MAX_NUCLEON_NUMBER: i32 = 1000;

const PDG_PROTON: i32 = 2212;
const PDG_NEUTRON: i32 = 2112;

/// Converts a PHITS kf-code into a PDG code, or 0 when no mapping exists.
pub fn phits_to_pdg(kf: i32) -> i32 {
    if kf == 0 {
        return 0;
    }
    if kf.unsigned_abs() < PHITS_NUCLEUS_BASE as u32 {
        return kf;
    }
    if kf < 0 {
        // No anti-nuclei in PHITS dumps
        return 0;
    }
    let z = kf / PHITS_NUCLEUS_BASE;
    let a = kf % PHITS_NUCLEUS_BASE;
    if z < 1 || a < z || a >= MAX_NUCLEON_NUMBER || z >= MAX_NUCLEON_NUMBER {
        return 0;
    }
    if z == 1 && a == 1 {
        return PDG_PROTON;
    }
    PDG_NUCLEUS_BASE + z * 10_000 + a * 10
}

/// Converts a PDG code into a PHITS kf-code, or 0 when PHITS cannot represent it.
pub fn pdg_to_phits(pdg: i32) -> i32 {
    if pdg == 0 {
        return 0;
    }
    if pdg.unsigned_abs() < PHITS_NUCLEUS_BASE as u32 {
        return pdg;
    }
    if !(PDG_NUCLEUS_BASE..PDG_NUCLEUS_END).contains(&pdg) {
        return 0;
    }
    if pdg % 10 != 0 || (pdg / 10_000_000) % 10 != 0 {
        // excited isomer or hypernucleus
        return 0;
    }
    let a = (pdg / 10) % MAX_NUCLEON_NUMBER;
    let z = (pdg / 10_000) % MAX_NUCLEON_NUMBER;
    match (z, a) {
        (0, 1) => PDG_NEUTRON,
        (1, 1) => PDG_PROTON,
        _ if z < 1 || a < z => 0,
        _ => z * PHITS_NUCLEUS_BASE + a,
    }
}
