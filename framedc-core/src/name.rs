//! Frame filename parsing.
//!
//! Frame files follow the fixed convention
//! `SITE-FRAMETYPE-GPSSTART-DURATION.EXTENSION`, e.g.
//! `H-R-1000000000-16.gwf`. Everything else in a scanned directory is
//! simply not a frame file: parsing failure is a skip, not an error, and
//! callers are expected to move on without logging.

use std::fmt;

/// A parsed frame filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameName {
    /// Observatory site prefix (nonempty, no `-`).
    pub site: String,
    /// Frame type / stream name (nonempty, no `-`).
    pub frametype: String,
    /// GPS start time in seconds.
    pub gpsstart: u64,
    /// Coverage duration in seconds. Always >= 1: a zero-length frame
    /// would denote the degenerate interval `[s, s)` and a zero file
    /// count divisor, so it is rejected at the parse seam.
    pub duration: u64,
    /// File extension without the dot (nonempty, no further `.`).
    pub extension: String,
}

impl FrameName {
    /// Parse a filename against the frame naming convention.
    ///
    /// Returns `None` for any deviation: wrong number of `-` fields,
    /// wrong number of `.` fields in the last one, empty components,
    /// non-numeric or zero duration, non-numeric start.
    pub fn parse(name: &str) -> Option<FrameName> {
        let mut fields = name.split('-');
        let site = fields.next()?;
        let frametype = fields.next()?;
        let gpsstart_s = fields.next()?;
        let dur_ext = fields.next()?;
        if fields.next().is_some() {
            return None;
        }

        let mut tail = dur_ext.split('.');
        let dur_s = tail.next()?;
        let extension = tail.next()?;
        if tail.next().is_some() {
            return None;
        }

        if site.is_empty() || frametype.is_empty() || extension.is_empty() {
            return None;
        }

        let gpsstart: u64 = gpsstart_s.parse().ok()?;
        let duration: u64 = dur_s.parse().ok()?;
        if duration == 0 {
            return None;
        }

        Some(FrameName {
            site: site.to_string(),
            frametype: frametype.to_string(),
            gpsstart,
            duration,
            extension: extension.to_string(),
        })
    }

    /// GPS end time: `gpsstart + duration` (half-open).
    pub fn gpsend(&self) -> u64 {
        self.gpsstart + self.duration
    }
}

impl fmt::Display for FrameName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}.{}",
            self.site, self.frametype, self.gpsstart, self.duration, self.extension
        )
    }
}
