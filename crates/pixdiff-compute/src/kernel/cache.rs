//! Process-wide compiled kernel cache.
//!
//! Each kernel kind is compiled once on first use and shared read-only
//! afterwards. Compilation for the perceptual kernel builds the 8-bit
//! sRGB decode table; byte-exact kernels carry no state.

use std::sync::{Arc, OnceLock};

use pixdiff_color::srgb;
use tracing::debug;

use super::KernelKind;

/// Number of distinct 8-bit channel values.
const LEVELS: usize = 256;

static SLOTS: [OnceLock<Arc<CompiledKernel>>; 3] = [const { OnceLock::new() }; 3];

/// Immutable, shareable kernel state.
#[derive(Debug)]
pub struct CompiledKernel {
    kind: KernelKind,
    decode: Option<Box<[f32; LEVELS]>>,
}

impl CompiledKernel {
    fn compile(kind: KernelKind) -> Self {
        let decode = match kind {
            KernelKind::Perceptual => {
                let mut table = Box::new([0.0f32; LEVELS]);
                for (i, v) in table.iter_mut().enumerate() {
                    *v = srgb::decode(i as f32 / 255.0);
                }
                Some(table)
            }
            KernelKind::Exact | KernelKind::Cluster => None,
        };
        debug!(kind = kind.name(), "kernel compiled");
        Self { kind, decode }
    }

    /// Kernel family this state was compiled for.
    pub fn kind(&self) -> KernelKind {
        self.kind
    }

    /// Linear value of an 8-bit sRGB channel.
    ///
    /// Falls back to evaluating the transfer function when the kernel was
    /// compiled without a table.
    #[inline]
    pub fn linear(&self, v: u8) -> f32 {
        match &self.decode {
            Some(table) => table[v as usize],
            None => srgb::decode(v as f32 / 255.0),
        }
    }
}

fn slot(kind: KernelKind) -> usize {
    match kind {
        KernelKind::Exact => 0,
        KernelKind::Cluster => 1,
        KernelKind::Perceptual => 2,
    }
}

/// Returns the compiled kernel for `kind`, compiling it on first use.
pub fn compiled(kind: KernelKind) -> Arc<CompiledKernel> {
    SLOTS[slot(kind)]
        .get_or_init(|| Arc::new(CompiledKernel::compile(kind)))
        .clone()
}
