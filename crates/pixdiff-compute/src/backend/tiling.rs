//! Dispatch grid and host limits.
//!
//! The logical grid of a kernel is covered by square threadgroups. The
//! padded extent is a whole number of groups, so the last row and column
//! of groups may contain invocations outside the grid; those are skipped
//! before any data is touched.
//!
//! ```text
//! logical 9x9, group 4:
//!
//!   +----+----+----+
//!   |    |    |x...|   x = in bounds
//!   +----+----+----+   . = padding, skipped
//!   |    |    |x...|
//!   +----+----+----+
//!   |xxxx|xxxx|x...|
//!   |....|....|....|
//!   +----+----+----+
//! ```

use super::memory::available_memory;

/// Default threadgroup edge.
pub const THREADGROUP_SIZE: u32 = 16;

/// Resource limits of an execution host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Worker threads that can run groups concurrently.
    pub threads: usize,
    /// Memory budget for dispatch working sets, in bytes.
    pub available_memory: u64,
}

impl Limits {
    /// Limits for a host with `threads` workers and the process memory
    /// budget (system RAM with `PIXDIFF_*` overrides applied).
    pub fn detect(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            available_memory: available_memory(),
        }
    }

    /// Same limits with the memory budget replaced.
    pub fn with_memory(self, bytes: u64) -> Self {
        Self {
            available_memory: bytes,
            ..self
        }
    }

    /// Checks that a working set fits the available memory.
    pub fn fits_memory(&self, bytes: u64) -> bool {
        bytes <= self.available_memory
    }
}

/// Threadgroup coordinates in the dispatch grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threadgroup {
    pub gx: u32,
    pub gy: u32,
}

/// A logical grid covered by square threadgroups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchGrid {
    /// Logical width in units.
    pub width: u32,
    /// Logical height in units.
    pub height: u32,
    /// Threadgroup edge.
    pub group_size: u32,
}

impl DispatchGrid {
    /// Creates a grid with the default threadgroup size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_group_size(width, height, THREADGROUP_SIZE)
    }

    /// Creates a grid with an explicit threadgroup size (at least 1).
    pub fn with_group_size(width: u32, height: u32, group_size: u32) -> Self {
        Self {
            width,
            height,
            group_size: group_size.max(1),
        }
    }

    /// Number of groups along x.
    #[inline]
    pub fn groups_x(&self) -> u32 {
        self.width.div_ceil(self.group_size)
    }

    /// Number of groups along y.
    #[inline]
    pub fn groups_y(&self) -> u32 {
        self.height.div_ceil(self.group_size)
    }

    /// Total number of threadgroups.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.groups_x() as usize * self.groups_y() as usize
    }

    /// Number of logical units.
    #[inline]
    pub fn units(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Padded extent (width, height) iterated by all groups.
    pub fn padded(&self) -> (u32, u32) {
        (
            self.groups_x() * self.group_size,
            self.groups_y() * self.group_size,
        )
    }

    /// Group at linear index `i` (row-major).
    #[inline]
    pub fn group(&self, i: usize) -> Threadgroup {
        let gx = self.groups_x().max(1) as usize;
        Threadgroup {
            gx: (i % gx) as u32,
            gy: (i / gx) as u32,
        }
    }

    /// Whether a grid position is inside the logical extent.
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Row-major unit index.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Calls `f` for every in-bounds invocation of a group.
    #[inline]
    pub fn for_each_invocation(&self, group: Threadgroup, mut f: impl FnMut(u32, u32)) {
        let x0 = group.gx * self.group_size;
        let y0 = group.gy * self.group_size;
        for ty in 0..self.group_size {
            let y = y0 + ty;
            for tx in 0..self.group_size {
                let x = x0 + tx;
                if !self.contains(x, y) {
                    continue;
                }
                f(x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_counts() {
        let g = DispatchGrid::new(9, 9);
        assert_eq!((g.groups_x(), g.groups_y()), (1, 1));
        assert_eq!(g.padded(), (16, 16));

        let g = DispatchGrid::new(33, 16);
        assert_eq!((g.groups_x(), g.groups_y()), (3, 1));
        assert_eq!(g.group_count(), 3);
        assert_eq!(g.group(2), Threadgroup { gx: 2, gy: 0 });
    }

    #[test]
    fn test_padding_skipped() {
        let g = DispatchGrid::with_group_size(9, 9, 4);
        let mut visited = vec![0u32; 81];
        for i in 0..g.group_count() {
            g.for_each_invocation(g.group(i), |x, y| visited[g.index(x, y)] += 1);
        }
        assert!(visited.iter().all(|&v| v == 1));
    }

    #[test]
    fn test_limits_memory() {
        let limits = Limits::detect(0).with_memory(1000);
        assert_eq!(limits.threads, 1);
        assert!(limits.fits_memory(1000));
        assert!(!limits.fits_memory(1001));
    }

    #[test]
    fn test_zero_group_size_clamped() {
        let g = DispatchGrid::with_group_size(3, 3, 0);
        assert_eq!(g.group_size, 1);
        assert_eq!(g.group_count(), 9);
    }
}
