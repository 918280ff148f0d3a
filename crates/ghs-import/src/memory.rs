//! Memory limit for raster imports.

use sysinfo::System;
use tracing::warn;

/// Source of the amount of memory currently free for imports.
pub trait MemoryProbe {
    /// Free RAM plus free swap in MB.
    fn available_mb(&self) -> u64;
}

/// Reads free memory from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMemory;

impl MemoryProbe for SystemMemory {
    fn available_mb(&self) -> u64 {
        let mut sys = System::new();
        sys.refresh_memory();
        bytes_to_mb(sys.available_memory() + sys.free_swap())
    }
}

/// A fixed amount of free memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMemory(pub u64);

impl MemoryProbe for FixedMemory {
    fn available_mb(&self) -> u64 {
        self.0
    }
}

fn bytes_to_mb(bytes: u64) -> u64 {
    (bytes as f64 / (1024.0 * 1024.0)).round() as u64
}

/// Memory to pass to the import: `requested`, lowered to what is free.
pub fn clamp_memory(requested: u64, probe: &dyn MemoryProbe) -> u64 {
    let free = probe.available_mb();
    if free < requested {
        warn!("Using {} MB but only {} MB RAM available.", requested, free);
        warn!("Set used memory to {} MB.", free);
        free
    } else {
        requested
    }
}
