// src/mode.rs

//! The fixed mode catalog.
//!
//! This adapter advertises exactly one display timing: 720p at 60 Hz
//! (74.25 MHz pixel clock over a 1650x750 total raster). The canonical
//! entry lives here as immutable shared data; sinks hand out duplicates
//! of it, never references into it, so a caller can mutate or drop its
//! copy without touching the catalog.

use bitflags::bitflags;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

bitflags! {
    /// Sync polarity and scan layout of a display timing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ModeFlags: u32 {
        const HSYNC_POSITIVE = 1 << 0;
        const VSYNC_POSITIVE = 1 << 1;
        const HSYNC_NEGATIVE = 1 << 2;
        const VSYNC_NEGATIVE = 1 << 3;
        const INTERLACE = 1 << 4;
        const DOUBLESCAN = 1 << 5;
    }
}

bitflags! {
    /// Provenance and ranking of a timing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ModeKind: u32 {
        /// Defined by the sink itself rather than read from a display.
        const DRIVER = 1 << 0;
        /// The timing a host should pick when it has no better opinion.
        const PREFERRED = 1 << 1;
    }
}

/// Name of the single catalog entry.
pub const MODE_NAME: &str = "1280x720";

/// A complete description of one display refresh timing.
///
/// Field layout follows the usual scan-out convention: active region,
/// then sync start/end, then total raster including blanking, for each
/// axis. All figures are in pixels except `clock_khz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMode {
    /// Pixel clock in kHz.
    pub clock_khz: u32,
    pub hdisplay: u32,
    pub hsync_start: u32,
    pub hsync_end: u32,
    pub htotal: u32,
    pub vdisplay: u32,
    pub vsync_start: u32,
    pub vsync_end: u32,
    pub vtotal: u32,
    pub flags: ModeFlags,
    pub kind: ModeKind,
    /// Human-readable name, e.g. "1280x720".
    pub name: String,
}

impl DisplayMode {
    /// Synthesizes a plausible timing for an arbitrary resolution.
    ///
    /// Blanking intervals are rough estimates, good enough for hosts
    /// that only need a candidate to validate or log. Real scan-out
    /// timings come from the catalog, not from here.
    pub fn new(width: u32, height: u32, refresh_hz: u32) -> Self {
        let htotal = width + width / 10;
        let vtotal = height + height / 20;

        DisplayMode {
            clock_khz: (htotal * vtotal * refresh_hz) / 1000,
            hdisplay: width,
            hsync_start: width + 10,
            hsync_end: width + 10 + 40,
            htotal,
            vdisplay: height,
            vsync_start: height + 3,
            vsync_end: height + 3 + 6,
            vtotal,
            flags: ModeFlags::empty(),
            kind: ModeKind::empty(),
            name: format!("{}x{}", width, height),
        }
    }

    /// Vertical refresh rate in Hz, derived from clock and raster totals.
    pub fn vrefresh(&self) -> u32 {
        if self.htotal == 0 || self.vtotal == 0 {
            return 0;
        }
        (u64::from(self.clock_khz) * 1000 / (u64::from(self.htotal) * u64::from(self.vtotal)))
            as u32
    }

    pub fn is_preferred(&self) -> bool {
        self.kind.contains(ModeKind::PREFERRED)
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.vrefresh())
    }
}

/// The catalog entry could not be duplicated for the caller.
///
/// Callers degrade rather than abort: a sink that cannot hand out its
/// timing simply offers zero modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("display mode unavailable")]
pub struct ModeUnavailable;

static PREFERRED_MODE: Lazy<DisplayMode> = Lazy::new(|| DisplayMode {
    clock_khz: 74_250,
    hdisplay: 1280,
    hsync_start: 1280 + 110,
    hsync_end: 1280 + 110 + 40,
    htotal: 1280 + 110 + 40 + 220,
    vdisplay: 720,
    vsync_start: 720 + 5,
    vsync_end: 720 + 5 + 5,
    vtotal: 720 + 5 + 5 + 20,
    flags: ModeFlags::HSYNC_POSITIVE.union(ModeFlags::VSYNC_POSITIVE),
    kind: ModeKind::DRIVER.union(ModeKind::PREFERRED),
    name: String::from(MODE_NAME),
});

/// Borrowed view of the canonical 720p entry.
pub fn preferred() -> &'static DisplayMode {
    &PREFERRED_MODE
}

/// Duplicates the canonical entry into caller-owned storage.
///
/// The name buffer is allocated fresh on every call, so two duplicates
/// never share memory. Allocation failure is reported instead of
/// aborting the process.
pub fn duplicate_preferred() -> Result<DisplayMode, ModeUnavailable> {
    let canonical = preferred();

    let mut name = String::new();
    name.try_reserve_exact(canonical.name.len())
        .map_err(|_| ModeUnavailable)?;
    name.push_str(&canonical.name);

    Ok(DisplayMode {
        clock_khz: canonical.clock_khz,
        hdisplay: canonical.hdisplay,
        hsync_start: canonical.hsync_start,
        hsync_end: canonical.hsync_end,
        htotal: canonical.htotal,
        vdisplay: canonical.vdisplay,
        vsync_start: canonical.vsync_start,
        vsync_end: canonical.vsync_end,
        vtotal: canonical.vtotal,
        flags: canonical.flags,
        kind: canonical.kind,
        name,
    })
}
