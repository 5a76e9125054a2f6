use serde::Serialize;

use crate::rides::Ride;

/// Estimated memory held by a loaded ride sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Footprint {
    pub records: usize,
    pub record_size: usize,
    pub inline_bytes: usize,
    pub heap_bytes: usize,
    pub total_bytes: usize,
}

impl Footprint {
    pub fn of(rides: &[Ride]) -> Self {
        let record_size = std::mem::size_of::<Ride>();
        let inline_bytes = record_size * rides.len();
        let heap_bytes = rides
            .iter()
            .map(|r| r.route.capacity() + r.date.capacity() + r.daytype.capacity())
            .sum();

        Footprint {
            records: rides.len(),
            record_size,
            inline_bytes,
            heap_bytes,
            total_bytes: inline_bytes + heap_bytes,
        }
    }

    pub fn mib(bytes: usize) -> f64 {
        bytes as f64 / (1024.0 * 1024.0)
    }

    pub fn total_mib(&self) -> f64 {
        Self::mib(self.total_bytes)
    }
}
