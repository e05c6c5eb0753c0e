//! Memory budgeting.
//!
//! # Environment Variables
//!
//! - `PIXDIFF_MEM_MB` - Explicit memory limit in megabytes
//! - `PIXDIFF_RAM_MAX` - Maximum RAM usage in bytes
//! - `PIXDIFF_RAM_PCT` - Maximum RAM as percentage (10-95)

use std::env;
use std::sync::OnceLock;

use pixdiff_core::BYTES_PER_PIXEL;

/// Default safety margin - use at most 80% of system memory.
pub const SAFE_MEMORY_FRACTION: f64 = 0.80;

static SYSTEM_MEMORY: OnceLock<u64> = OnceLock::new();

/// Detect total system RAM in bytes.
pub fn system_memory() -> u64 {
    *SYSTEM_MEMORY.get_or_init(|| {
        sys_info::mem_info()
            .map(|m| m.total * 1024) // KB to bytes
            .unwrap_or(8 * 1024 * 1024 * 1024) // 8 GB fallback
    })
}

/// Memory overrides read from the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryOverrides {
    /// `PIXDIFF_MEM_MB`
    pub mem_mb: Option<u64>,
    /// `PIXDIFF_RAM_MAX`
    pub ram_max: Option<u64>,
    /// `PIXDIFF_RAM_PCT`
    pub ram_pct: Option<u64>,
}

impl MemoryOverrides {
    /// Reads the overrides; unparsable values are ignored.
    pub fn from_env() -> Self {
        Self {
            mem_mb: env_u64("PIXDIFF_MEM_MB"),
            ram_max: env_u64("PIXDIFF_RAM_MAX"),
            ram_pct: env_u64("PIXDIFF_RAM_PCT"),
        }
    }

    /// Resolves a budget against `system` bytes of RAM.
    ///
    /// Priority: `mem_mb`, then `ram_max`, then `ram_pct` (clamped to
    /// 10-95), then [`SAFE_MEMORY_FRACTION`].
    pub fn resolve(&self, system: u64) -> u64 {
        if let Some(mb) = self.mem_mb {
            return mb.saturating_mul(1024 * 1024);
        }
        if let Some(bytes) = self.ram_max {
            return bytes;
        }
        let pct = self
            .ram_pct
            .unwrap_or((SAFE_MEMORY_FRACTION * 100.0) as u64)
            .clamp(10, 95);
        system.saturating_mul(pct) / 100
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Available RAM considering environment overrides.
pub fn available_memory() -> u64 {
    MemoryOverrides::from_env().resolve(system_memory())
}

/// Working set of a dispatch in bytes.
///
/// Count-only dispatches hold a few atomics. Recording dispatches hold a
/// per-unit mask, the expanded per-pixel mask and the output image.
pub fn dispatch_memory(pixels: u64, units: u64, record: bool) -> u64 {
    if !record {
        return 64;
    }
    units + pixels + pixels * BYTES_PER_PIXEL as u64
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GB: u64 = 1024 * 1024 * 1024;

    #[test]
    fn test_system_memory() {
        assert!(system_memory() > 0);
    }

    #[test]
    fn test_resolve_priority() {
        let o = MemoryOverrides {
            mem_mb: Some(512),
            ram_max: Some(1),
            ram_pct: Some(50),
        };
        assert_eq!(o.resolve(8 * GB), 512 * 1024 * 1024);

        let o = MemoryOverrides {
            mem_mb: None,
            ram_max: Some(1000),
            ram_pct: Some(50),
        };
        assert_eq!(o.resolve(8 * GB), 1000);

        let o = MemoryOverrides {
            ram_pct: Some(50),
            ..Default::default()
        };
        assert_eq!(o.resolve(8 * GB), 4 * GB);
    }

    #[test]
    fn test_resolve_default_and_clamp() {
        assert_eq!(MemoryOverrides::default().resolve(100 * GB), 80 * GB);

        let low = MemoryOverrides {
            ram_pct: Some(1),
            ..Default::default()
        };
        assert_eq!(low.resolve(100 * GB), 10 * GB);

        let high = MemoryOverrides {
            ram_pct: Some(100),
            ..Default::default()
        };
        assert_eq!(high.resolve(100 * GB), 95 * GB);
    }

    #[test]
    fn test_dispatch_memory() {
        assert_eq!(dispatch_memory(81, 81, false), 64);
        assert_eq!(dispatch_memory(81, 81, true), 81 + 81 + 324);
        assert_eq!(dispatch_memory(81, 9, true), 9 + 81 + 324);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1500), "1 KB");
        assert_eq!(format_bytes(1_500_000), "1.4 MB");
        assert_eq!(format_bytes(1_500_000_000), "1.40 GB");
    }
}
