//! Splits an ordered record stream into fixed-size batches.
//!
//! Partitioning is lazy: records are pulled from the source only as batches
//! are requested, so a streaming source is never materialized by the batcher
//! itself. Every batch holds `size` records except possibly the last, and
//! concatenating the batches reproduces the input order exactly.

use std::iter::{Enumerate, FusedIterator};
use std::num::NonZeroUsize;
use trading::Batch;

/// Iterator over consecutive groups of at most `size` items.
#[derive(Debug, Clone)]
pub struct Partition<I> {
    source: I,
    size: NonZeroUsize,
}

impl<I: Iterator> Iterator for Partition<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let size = self.size.get();
        let mut group = Vec::with_capacity(size);
        group.extend(self.source.by_ref().take(size));
        if group.is_empty() {
            None
        } else {
            Some(group)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.size.get();
        let (lower, upper) = self.source.size_hint();
        (lower.div_ceil(size), upper.map(|u| u.div_ceil(size)))
    }
}

impl<I: FusedIterator> FusedIterator for Partition<I> {}

/// Groups `records` into chunks of `size`, preserving order.
pub fn partition<I: IntoIterator>(records: I, size: NonZeroUsize) -> Partition<I::IntoIter> {
    Partition {
        source: records.into_iter(),
        size,
    }
}

/// Iterator over index-tagged batches.
#[derive(Debug, Clone)]
pub struct Batches<I> {
    inner: Enumerate<Partition<I>>,
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Batch<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Batch::from)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Like [`partition`], but tags each group with its position.
pub fn batches<I: IntoIterator>(records: I, size: NonZeroUsize) -> Batches<I::IntoIter> {
    Batches {
        inner: partition(records, size).enumerate(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_partition_lengths_and_order() {
        for len in [0usize, 1, 8, 9, 10, 21, 100] {
            for s in [1usize, 3, 9, 21] {
                let input: Vec<usize> = (0..len).collect();
                let groups: Vec<Vec<usize>> = partition(input.clone(), size(s)).collect();

                assert_eq!(groups.len(), len.div_ceil(s), "len={} size={}", len, s);
                if let Some((last, full)) = groups.split_last() {
                    assert!(full.iter().all(|g| g.len() == s));
                    let expected_last = if len % s == 0 { s } else { len % s };
                    assert_eq!(last.len(), expected_last);
                }
                let flattened: Vec<usize> = groups.into_iter().flatten().collect();
                assert_eq!(flattened, input);
            }
        }
    }

    #[test]
    fn test_empty_input_yields_no_batches() {
        let mut groups = partition(Vec::<u8>::new(), size(5));
        assert!(groups.next().is_none());
    }

    #[test]
    fn test_partition_is_lazy() {
        // An unbounded source still yields its first groups.
        let groups: Vec<Vec<u64>> = partition(0u64.., size(4)).take(2).collect();
        assert_eq!(groups, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
    }

    #[test]
    fn test_batches_are_indexed() {
        let tagged: Vec<Batch<u32>> = batches(1..=21u32, size(9)).collect();
        let shape: Vec<(usize, usize)> = tagged.iter().map(|b| (b.index(), b.len())).collect();
        assert_eq!(shape, vec![(0, 9), (1, 9), (2, 3)]);
        assert_eq!(tagged[2].records(), &[19, 20, 21]);
    }
}
