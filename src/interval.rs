use rand::Rng;

use std::ops::Range;

use crate::SortingArgs;

/// Disjoint, ascending index ranges into a row of coordinates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntervalSet(Vec<Range<usize>>);

impl IntervalSet {
    pub fn new(size: usize) -> Self {
        if size == 0 {
            IntervalSet(Vec::new())
        } else {
            IntervalSet(vec![0..size])
        }
    }

    /// Splits `0..size` at every index for which `is_boundary` holds.
    ///
    /// A boundary index terminates the run accumulated before it and starts
    /// none itself, so it ends up in no range at all.
    pub fn segment<F>(size: usize, mut is_boundary: F) -> Self
    where
        F: FnMut(usize) -> bool,
    {
        let mut ranges = Vec::new();
        let mut start = 0;
        for idx in 0..size {
            if is_boundary(idx) {
                if start < idx {
                    ranges.push(start..idx);
                }
                start = idx + 1;
            }
        }
        if start < size {
            ranges.push(start..size);
        }
        IntervalSet(ranges)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter<'this>(&'this self) -> impl Iterator<Item = Range<usize>> + 'this {
        self.0.iter().cloned()
    }

    /// Cuts every range into sub-intervals as dictated by `args`.
    pub fn subdivide<R>(&self, args: &SortingArgs, rng: &mut R) -> IntervalSet
    where
        R: Rng + ?Sized,
    {
        let mut ranges = Vec::with_capacity(self.0.len());
        for run in self.iter() {
            ranges.extend(split(run, args, rng));
        }
        IntervalSet(ranges)
    }
}

/// Cuts `run` into consecutive sub-intervals covering it exactly once.
///
/// With `max_interval == 0` the run stays whole. Otherwise every piece is
/// `max_interval` long, or uniformly random in `1..=max_interval` when
/// randomized, plus `progressive_amount * max_interval` for each piece that
/// came before it in this run. The last piece is cut short at the end of the
/// run.
pub fn split<R>(run: Range<usize>, args: &SortingArgs, rng: &mut R) -> Vec<Range<usize>>
where
    R: Rng + ?Sized,
{
    let max = args.max_interval;
    if max == 0 || run.start >= run.end {
        return if run.start < run.end { vec![run] } else { Vec::new() };
    }
    let growth = args.progressive_amount * max as f64;
    let mut pieces = Vec::new();
    let mut start = run.start;
    let mut n = 0;
    while start < run.end {
        let base = if args.randomize {
            rng.gen_range(1, max.saturating_add(1))
        } else {
            max
        };
        let length = (base as f64 + growth * n as f64).floor().max(1.0) as usize;
        let end = start.saturating_add(length).min(run.end);
        pieces.push(start..end);
        start = end;
        n += 1;
    }
    pieces
}
