//! Size-string parsing for platform upload limits
//!
//! Platform limits are configured as a magnitude followed by a unit suffix, e.g. `2M`
//! or `1G`. The effective default limit for an upload is the smaller of the per-file
//! limit and the request-body limit, since a file has to fit within both.

use serde::Serialize;

use crate::constants::{DEFAULT_POST_MAX_SIZE, DEFAULT_UPLOAD_MAX_FILESIZE};

pub const MIB: u64 = 1024 * 1024;
pub const GIB: u64 = 1024 * MIB;

/// Convert a size string into bytes.
///
/// The last character selects the unit: `G` for gigabytes, `M` for megabytes.
/// Anything else, lowercase letters included, means the string is a raw byte count. The magnitude is the
/// leading run of decimal digits and falls back to 1 when there is none.
///
/// ```
/// use intake_core::parse_size;
///
/// assert_eq!(parse_size("2M"), 2_097_152);
/// assert_eq!(parse_size("1G"), 1_073_741_824);
/// assert_eq!(parse_size("512"), 512);
/// ```
pub fn parse_size(value: &str) -> u64 {
    let value = value.trim();

    let multiplier = match value.chars().last() {
        Some('G') => GIB,
        Some('M') => MIB,
        _ => 1,
    };

    let digits_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let digits = &value[..digits_end];

    let magnitude = if digits.is_empty() {
        1
    } else {
        // Only overflow can fail here: the slice is all ASCII digits.
        digits.parse::<u64>().unwrap_or(u64::MAX)
    };

    magnitude.saturating_mul(multiplier)
}

/// Size limits imposed by the hosting platform, kept in their configured string form
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlatformLimits {
    pub upload_max_filesize: String,
    pub post_max_size: String,
}

impl PlatformLimits {
    pub fn new(upload_max_filesize: impl Into<String>, post_max_size: impl Into<String>) -> Self {
        Self {
            upload_max_filesize: upload_max_filesize.into(),
            post_max_size: post_max_size.into(),
        }
    }

    /// Per-file limit in bytes
    pub fn upload_limit(&self) -> u64 {
        parse_size(&self.upload_max_filesize)
    }

    /// Request-body limit in bytes
    pub fn post_limit(&self) -> u64 {
        parse_size(&self.post_max_size)
    }

    /// The limit a single uploaded file must stay under
    pub fn effective_limit(&self) -> u64 {
        self.upload_limit().min(self.post_limit())
    }
}

impl Default for PlatformLimits {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_MAX_FILESIZE, DEFAULT_POST_MAX_SIZE)
    }
}
