//! Struct deduplication.
//!
//! Two structs merge when the shorter one is a byte-identical prefix of
//! the longer one, including every edge that falls inside that prefix.
//! The shorter struct is removed and everything that pointed at it is
//! redirected to the survivor.

use super::{Workload, WorkloadState};
use crate::graph::{Struct, StructId};
use crate::Result;

/// What a dedupe run removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DedupeStats {
    pub merged: usize,
    pub bytes_saved: usize,
}

/// Whether `removed` can be replaced by `kept`.
fn can_merge(kept: &Struct, removed: &Struct) -> bool {
    let len = removed.len();
    if len > kept.len() || kept.bsp != removed.bsp {
        return false;
    }
    if kept.data[..len] != removed.data[..] {
        return false;
    }

    let pointers = kept
        .pointers
        .iter()
        .filter(|p| p.offset < len)
        .map(|p| (p.offset, p.target));
    if !pointers.eq(removed.pointers.iter().map(|p| (p.offset, p.target))) {
        return false;
    }

    let dependencies = kept
        .dependencies
        .iter()
        .filter(|d| d.offset < len)
        .map(|d| (d.offset, d.kind, d.resolved));
    if !dependencies.eq(removed.dependencies.iter().map(|d| (d.offset, d.kind, d.resolved))) {
        return false;
    }

    let assets = kept.assets.iter().filter(|a| a.offset < len);
    assets.eq(removed.assets.iter())
}

impl Workload {
    /// Merge identical structs until a full sweep finds nothing.
    ///
    /// Pairs are visited in ascending `(i, j)` order. The shorter struct of
    /// a pair is removed; on equal length the higher index is. Running it
    /// again on its own output changes nothing.
    pub fn dedupe(&mut self) -> Result<DedupeStats> {
        self.expect_state("dedupe", &[WorkloadState::Resolving, WorkloadState::Deduping])?;
        if self.layout.is_some() {
            return Err(crate::Error::InvalidState {
                operation: "dedupe after layout",
                state: self.state,
            });
        }

        let mut stats = DedupeStats::default();
        let mut pass = 0;
        loop {
            pass += 1;
            let before = stats.merged;
            self.dedupe_pass(&mut stats);
            log::debug!("dedupe pass {pass}: {} merges", stats.merged - before);
            if stats.merged == before {
                break;
            }
        }

        log::info!(
            "dedupe merged {} structs, saving {} bytes",
            stats.merged,
            stats.bytes_saved
        );
        self.dedupe_stats.merged += stats.merged;
        self.dedupe_stats.bytes_saved += stats.bytes_saved;
        self.state = WorkloadState::Deduping;
        Ok(stats)
    }

    /// One sweep over all pairs in ascending `(i, j)` order.
    ///
    /// Equal-length pairs drop the higher index. A shorter struct can only
    /// be replaced by a longer one, so when `i` is the shorter of the pair
    /// it is `i` that is removed, even though it has the lower index: a
    /// 64-byte prefix still merges into the 96-byte struct after it instead
    /// of the pair being skipped.
    fn dedupe_pass(&mut self, stats: &mut DedupeStats) {
        let count = self.structs.len();
        for i in 0..count {
            if !self.structs[i].is_dedupe_candidate() {
                continue;
            }
            for j in i + 1..count {
                if !self.structs[j].is_dedupe_candidate() {
                    continue;
                }
                let (kept, removed) = if self.structs[j].len() <= self.structs[i].len() {
                    (i, j)
                } else {
                    (j, i)
                };
                if can_merge(&self.structs[kept], &self.structs[removed]) {
                    self.merge(kept, removed, stats);
                    if removed == i {
                        break;
                    }
                }
            }
        }
    }

    fn merge(&mut self, kept: StructId, removed: StructId, stats: &mut DedupeStats) {
        for s in &mut self.structs {
            for pointer in &mut s.pointers {
                if pointer.target == removed {
                    pointer.target = kept;
                }
            }
        }
        for tag in &mut self.tags {
            if tag.base_struct == Some(removed) {
                tag.base_struct = Some(kept);
            }
        }

        let s = &mut self.structs[removed];
        s.dead = true;
        stats.merged += 1;
        stats.bytes_saved += s.len();
        log::trace!("merged struct {removed} into {kept}");
    }
}
