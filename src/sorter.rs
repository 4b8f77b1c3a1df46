use image::Pixel;
use rand::Rng;

use crate::SortingArgs;

/// Reorders intervals of pixels, reusing its key buffer between intervals.
#[derive(Debug)]
pub struct Sorter<P> {
    scratch: Vec<(f64, P)>,
}

impl<P> Default for Sorter<P> {
    fn default() -> Self {
        Sorter {
            scratch: Vec::new(),
        }
    }
}

impl<P> Sorter<P>
where
    P: Pixel<Subpixel = u8>,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Stably sorts `pixels` ascending by key, then applies reversal, splicing
    /// and mirroring, in that order.
    pub fn sort<R>(&mut self, pixels: &mut [P], args: &SortingArgs, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        if pixels.is_empty() {
            return;
        }
        let (key, discretize) = (args.sort_key, args.discretize);
        self.scratch.clear();
        self.scratch
            .extend(pixels.iter().map(|p| (key.eval(p, discretize, &mut *rng), *p)));
        // `sort_by` is stable, equal keys keep their order
        self.scratch.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (dst, (_, pixel)) in pixels.iter_mut().zip(self.scratch.drain(..)) {
            *dst = pixel;
        }

        if args.reverse {
            pixels.reverse();
        }
        if args.splice_random || args.splice > 0.0 {
            let at = splice_point(pixels.len(), args.splice, args.splice_random, rng);
            splice(pixels, at);
        }
        if args.mirror {
            mirror(pixels);
        }
    }
}

/// Index the interval is spliced at: `round(splice * (len - 1))` with `splice`
/// clamped to `[0, 1]`, or uniformly random in `0..len`.
pub fn splice_point<R>(len: usize, splice: f64, random: bool, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    if len == 0 {
        0
    } else if random {
        rng.gen_range(0, len)
    } else {
        ((len - 1) as f64 * splice.max(0.0).min(1.0)).round() as usize
    }
}

/// Moves the first `at` items to the end.
pub fn splice<T>(items: &mut [T], at: usize) {
    if !items.is_empty() {
        let at = at % items.len();
        items.rotate_left(at);
    }
}

/// Overwrites the second half with the reversed first half, making the slice
/// a palindrome. The middle item of an odd-length slice stays put.
pub fn mirror<T: Copy>(items: &mut [T]) {
    let n = items.len();
    for i in 0..n / 2 {
        items[n - 1 - i] = items[i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SortKey;
    use image::Rgb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sum_args() -> SortingArgs {
        SortingArgs {
            sort_key: SortKey::Sum,
            ..SortingArgs::default()
        }
    }

    fn gray(values: &[u8]) -> Vec<Rgb<u8>> {
        values.iter().map(|&v| Rgb([v, v, v])).collect()
    }

    fn sorted(mut pixels: Vec<Rgb<u8>>, args: &SortingArgs) -> Vec<Rgb<u8>> {
        let mut rng = StdRng::seed_from_u64(0);
        Sorter::new().sort(&mut pixels, args, &mut rng);
        pixels
    }

    #[test]
    fn sorts_ascending() {
        assert_eq!(sorted(gray(&[5, 1, 4, 2]), &sum_args()), gray(&[1, 2, 4, 5]));
    }

    #[test]
    fn equal_keys_keep_order() {
        let pixels = vec![Rgb([3u8, 0, 0]), Rgb([0, 3, 0]), Rgb([0, 0, 3]), Rgb([1, 1, 1])];
        assert_eq!(sorted(pixels.clone(), &sum_args()), pixels);
    }

    #[test]
    fn discretized_buckets_keep_order() {
        // sums 180 and 150 both fall into bucket 1
        let pixels = vec![Rgb([60u8, 60, 60]), Rgb([50, 50, 50])];
        let args = SortingArgs {
            discretize: 100,
            ..sum_args()
        };
        assert_eq!(sorted(pixels.clone(), &args), pixels);
        assert_eq!(sorted(pixels.clone(), &sum_args()), vec![pixels[1], pixels[0]]);
    }

    #[test]
    fn reverse_applies_after_sorting() {
        let args = SortingArgs {
            reverse: true,
            ..sum_args()
        };
        let once = sorted(gray(&[3, 9, 1, 7]), &args);
        assert_eq!(once, gray(&[9, 7, 3, 1]));
        let mut twice = once;
        twice.reverse();
        assert_eq!(twice, sorted(gray(&[3, 9, 1, 7]), &sum_args()));
    }

    #[test]
    fn splice_rotates_sorted() {
        let args = SortingArgs {
            splice: 0.5,
            ..sum_args()
        };
        // round(0.5 * 4) = 2
        assert_eq!(sorted(gray(&[5, 4, 3, 2, 1]), &args), gray(&[3, 4, 5, 1, 2]));
    }

    #[test]
    fn splice_round_trip() {
        let original: Vec<u32> = (0..9).collect();
        for k in 0..9 {
            let mut items = original.clone();
            splice(&mut items, k);
            let back = items.len() - k;
            splice(&mut items, back);
            assert_eq!(items, original);
        }
    }

    #[test]
    fn splice_point_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(splice_point(10, 0.0, false, &mut rng), 0);
        assert_eq!(splice_point(10, 1.0, false, &mut rng), 9);
        assert_eq!(splice_point(10, 4.0, false, &mut rng), 9);
        assert_eq!(splice_point(0, 0.5, true, &mut rng), 0);
        for _ in 0..100 {
            assert!(splice_point(4, 0.0, true, &mut rng) < 4);
        }
    }

    #[test]
    fn mirror_makes_palindromes() {
        let mut even = vec![1, 2, 3, 4];
        mirror(&mut even);
        assert_eq!(even, vec![1, 2, 2, 1]);
        let mut odd = vec![1, 2, 3, 4, 5];
        mirror(&mut odd);
        assert_eq!(odd, vec![1, 2, 3, 2, 1]);
    }

    #[test]
    fn mirror_twice_is_a_fixed_point() {
        // the first half survives the first pass untouched, so the second
        // pass writes back exactly what is already there
        let mut items = vec![4, 1, 3, 2, 5, 6];
        mirror(&mut items);
        let first = items.clone();
        mirror(&mut items);
        assert_eq!(items, first);
        assert_eq!(items, vec![4, 1, 3, 3, 1, 4]);
    }

    #[test]
    fn mirror_follows_splice() {
        let args = SortingArgs {
            splice: 1.0,
            mirror: true,
            ..sum_args()
        };
        // sorted 1 2 3 4, spliced 4 1 2 3, mirrored 4 1 1 4
        assert_eq!(sorted(gray(&[2, 4, 1, 3]), &args), gray(&[4, 1, 1, 4]));
    }

    #[test]
    fn random_key_permutes() {
        let args = SortingArgs {
            sort_key: SortKey::Random,
            ..SortingArgs::default()
        };
        let input = gray(&(0..64).collect::<Vec<u8>>());
        let mut output = sorted(input.clone(), &args);
        assert_ne!(output, input);
        output.sort_by_key(|p| p.0[0]);
        assert_eq!(output, input);
    }
}
