//! Splitting a flat index range into work chunks.
//!
//! A [`Chunk`] covers `start, start + step, ...` for `num_steps` indices.
//! Both plans cover `0..total` exactly once.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub start: usize,
    pub step: usize,
    pub num_steps: usize,
}

impl Chunk {
    pub fn indices(&self) -> impl Iterator<Item = usize> {
        let Chunk {
            start,
            step,
            num_steps,
        } = *self;
        (0..num_steps).map(move |i| start + i * step)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Chunking {
    /// Consecutive runs, sizes differ by at most one.
    #[default]
    Contiguous,
    /// Chunk `i` takes every `n`-th index starting at `i`.
    Interleaved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    total: usize,
    chunks: Vec<Chunk>,
}

impl ChunkPlan {
    pub fn new(chunking: Chunking, total: usize, num_chunks: usize) -> Self {
        match chunking {
            Chunking::Contiguous => Self::contiguous(total, num_chunks),
            Chunking::Interleaved => Self::interleaved(total, num_chunks),
        }
    }

    pub fn contiguous(total: usize, num_chunks: usize) -> Self {
        let n = num_chunks.clamp(1, total.max(1));
        let base = total / n;
        let rem = total % n;

        let mut chunks = Vec::with_capacity(n);
        let mut start = 0usize;
        for i in 0..n {
            let len = base + usize::from(i < rem);
            if len > 0 {
                chunks.push(Chunk {
                    start,
                    step: 1,
                    num_steps: len,
                });
            }
            start += len;
        }
        Self { total, chunks }
    }

    pub fn interleaved(total: usize, num_chunks: usize) -> Self {
        let n = num_chunks.clamp(1, total.max(1));
        let chunks = (0..n.min(total))
            .map(|i| Chunk {
                start: i,
                step: n,
                num_steps: (total - i).div_ceil(n),
            })
            .collect();
        Self { total, chunks }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Chunk, ChunkPlan, Chunking};

    fn coverage(plan: &ChunkPlan) -> Vec<usize> {
        let mut hits = vec![0usize; plan.total()];
        for chunk in plan.chunks() {
            for i in chunk.indices() {
                hits[i] += 1;
            }
        }
        hits
    }

    #[test]
    fn contiguous_balances_sizes() {
        let plan = ChunkPlan::contiguous(10, 3);
        assert_eq!(
            plan.chunks(),
            &[
                Chunk {
                    start: 0,
                    step: 1,
                    num_steps: 4
                },
                Chunk {
                    start: 4,
                    step: 1,
                    num_steps: 3
                },
                Chunk {
                    start: 7,
                    step: 1,
                    num_steps: 3
                },
            ]
        );
        assert!(coverage(&plan).iter().all(|&h| h == 1));
    }

    #[test]
    fn interleaved_strides_by_chunk_count() {
        let plan = ChunkPlan::interleaved(10, 4);
        assert_eq!(plan.len(), 4);
        assert_eq!(plan.chunks()[1].indices().collect::<Vec<_>>(), vec![1, 5, 9]);
        assert_eq!(plan.chunks()[3].indices().collect::<Vec<_>>(), vec![3, 7]);
        assert!(coverage(&plan).iter().all(|&h| h == 1));
    }

    #[test]
    fn degenerate_sizes() {
        assert!(ChunkPlan::contiguous(0, 4).is_empty());
        assert!(ChunkPlan::interleaved(0, 4).is_empty());
        assert_eq!(ChunkPlan::new(Chunking::Interleaved, 3, 8).len(), 3);
        assert_eq!(ChunkPlan::new(Chunking::Contiguous, 5, 0).len(), 1);
    }
}
