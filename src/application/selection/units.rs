use std::fmt;

pub const MEBIBYTE: u64 = 1 << 20;
pub const GIBIBYTE: u64 = 1 << 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Mb,
    Gb,
}

impl SizeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeUnit::Mb => "MB",
            SizeUnit::Gb => "GB",
        }
    }

    fn divisor(&self) -> u64 {
        match self {
            SizeUnit::Mb => MEBIBYTE,
            SizeUnit::Gb => GIBIBYTE,
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn appropriate_unit(bytes: u64) -> SizeUnit {
    if bytes >= GIBIBYTE {
        SizeUnit::Gb
    } else {
        SizeUnit::Mb
    }
}

/// Converts to `unit`, rounded half-up to one decimal place.
pub fn bytes_to_unit(bytes: u64, unit: SizeUnit) -> f64 {
    let value = bytes as f64 / unit.divisor() as f64;
    (value * 10.0).round() / 10.0
}

/// Human-readable limit such as `5 MB` or `1.5 GB`.
pub fn format_limit(bytes: u64) -> String {
    let unit = appropriate_unit(bytes);
    format!("{} {}", bytes_to_unit(bytes, unit), unit)
}

/// Size shown next to a selected file, always in MB with two decimals.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / MEBIBYTE as f64)
}
