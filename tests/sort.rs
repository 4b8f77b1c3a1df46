use image::{GrayImage, Luma, Rgb};
use rand::rngs::StdRng;
use rand::SeedableRng;

use pixelsort::{sort_pixels, Channel, Error, PathKind, SortKey, SortingArgs};

fn gray(values: &[u8]) -> Vec<Rgb<u8>> {
    values.iter().map(|&v| Rgb([v, v, v])).collect()
}

fn values(pixels: &[Rgb<u8>]) -> Vec<u8> {
    pixels.iter().map(|p| p.0[0]).collect()
}

fn sum_args() -> SortingArgs {
    SortingArgs {
        sort_key: SortKey::Sum,
        ..SortingArgs::default()
    }
}

fn sort(pixels: &[Rgb<u8>], size: (u32, u32), args: &SortingArgs) -> Vec<Rgb<u8>> {
    let mut rng = StdRng::seed_from_u64(0);
    sort_pixels(pixels, size, args, &mut rng).unwrap()
}

// 4x3, every row out of order
const GRID: [u8; 12] = [
    9, 3, 7, 1, //
    2, 8, 4, 6, //
    5, 11, 10, 0,
];

#[test]
fn horizontal_sorts_each_row() {
    let out = sort(&gray(&GRID), (4, 3), &sum_args());
    assert_eq!(values(&out), vec![1, 3, 7, 9, 2, 4, 6, 8, 0, 5, 10, 11]);
}

#[test]
fn vertical_sorts_each_column() {
    let args = SortingArgs {
        path: PathKind::Vertical.into(),
        ..sum_args()
    };
    let out = sort(&gray(&GRID), (4, 3), &args);
    assert_eq!(values(&out), vec![2, 3, 4, 0, 5, 8, 7, 1, 9, 11, 10, 6]);
}

#[test]
fn reverse_sorts_descending() {
    let args = SortingArgs {
        reverse: true,
        ..sum_args()
    };
    let out = sort(&gray(&GRID), (4, 3), &args);
    assert_eq!(values(&out), vec![9, 7, 3, 1, 8, 6, 4, 2, 11, 10, 5, 0]);
}

#[test]
fn straight_angled_lines_match_axis_paths() {
    let pixels = gray(&GRID);
    let flat = SortingArgs {
        path: "angled-line angle=0".parse().unwrap(),
        ..sum_args()
    };
    assert_eq!(sort(&pixels, (4, 3), &flat), sort(&pixels, (4, 3), &sum_args()));

    let upright = SortingArgs {
        path: "angled-line angle=90".parse().unwrap(),
        ..sum_args()
    };
    let vertical = SortingArgs {
        path: PathKind::Vertical.into(),
        ..sum_args()
    };
    assert_eq!(sort(&pixels, (4, 3), &upright), sort(&pixels, (4, 3), &vertical));
}

#[test]
fn max_interval_sorts_fixed_chunks() {
    let args = SortingArgs {
        max_interval: 2,
        ..sum_args()
    };
    let out = sort(&gray(&GRID), (4, 3), &args);
    assert_eq!(values(&out), vec![3, 9, 1, 7, 2, 8, 4, 6, 5, 11, 0, 10]);
}

#[test]
fn coarse_buckets_keep_input_order() {
    let args = SortingArgs {
        discretize: 255,
        ..sum_args()
    };
    // all sums are below 255, so every pixel lands in bucket 0
    let pixels = gray(&GRID);
    assert_eq!(sort(&pixels, (4, 3), &args), pixels);
}

#[test]
fn masked_pixels_split_rows() {
    let mask = GrayImage::from_fn(4, 3, |x, _| if x == 1 { Luma([255]) } else { Luma([0]) });
    let args = SortingArgs {
        image_mask: Some(mask),
        ..sum_args()
    };
    let out = sort(&gray(&GRID), (4, 3), &args);
    // column 1 stays put, columns 2..4 are sorted on their own
    assert_eq!(values(&out), vec![9, 3, 1, 7, 2, 8, 4, 6, 5, 11, 0, 10]);
}

#[test]
fn full_threshold_leaves_image_alone() {
    let args = SortingArgs {
        image_threshold: Some(1.0),
        ..sum_args()
    };
    let pixels = gray(&GRID);
    assert_eq!(sort(&pixels, (4, 3), &args), pixels);
}

#[test]
fn mask_must_match_image() {
    let args = SortingArgs {
        image_mask: Some(GrayImage::new(2, 2)),
        ..sum_args()
    };
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(
        sort_pixels(&gray(&GRID), (4, 3), &args, &mut rng),
        Err(Error::MaskSize {
            expected: (4, 3),
            actual: (2, 2)
        })
    );
}

#[test]
fn single_channel_sort_keeps_the_others() {
    let pixels = vec![Rgb([30u8, 1, 2]), Rgb([20, 3, 4]), Rgb([10, 5, 6])];
    let args = SortingArgs {
        sort_key: SortKey::Red,
        channel: Some(Channel::Red),
        ..SortingArgs::default()
    };
    let out = sort(&pixels, (3, 1), &args);
    assert_eq!(out, vec![Rgb([10, 1, 2]), Rgb([20, 3, 4]), Rgb([30, 5, 6])]);
}

#[test]
fn every_path_permutes_pixels() {
    let size = (7, 5);
    let pixels: Vec<Rgb<u8>> = (0..35u8).map(|v| Rgb([v * 7, 255 - v, v])).collect();
    for &kind in PathKind::ALL {
        let args = SortingArgs {
            path: kind.into(),
            sort_key: SortKey::Random,
            max_interval: 4,
            randomize: true,
            ..SortingArgs::default()
        };
        let mut out = sort(&pixels, size, &args);
        out.sort_by_key(|p| p.0);
        let mut expected = pixels.clone();
        expected.sort_by_key(|p| p.0);
        assert_eq!(out, expected, "{}", kind.name());
    }
}

#[test]
fn buffer_must_match_size() {
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(
        sort_pixels(&gray(&GRID), (5, 3), &sum_args(), &mut rng),
        Err(Error::BufferSize {
            expected: 15,
            actual: 12
        })
    );
}

#[test]
fn empty_image_is_a_no_op() {
    let mut rng = StdRng::seed_from_u64(0);
    let out = sort_pixels::<Rgb<u8>, _>(&[], (0, 4), &sum_args(), &mut rng).unwrap();
    assert!(out.is_empty());
}

#[test]
fn same_seed_same_output() {
    let size = (9, 6);
    let pixels: Vec<Rgb<u8>> = (0..54u8).map(|v| Rgb([v * 4, v, 255 - v * 3])).collect();
    for path in &["random-walk", "random-walk-horizontal", "fill-circles radius=3"] {
        let args = SortingArgs {
            path: path.parse().unwrap(),
            sort_key: SortKey::Random,
            max_interval: 5,
            randomize: true,
            splice_random: true,
            ..SortingArgs::default()
        };
        let first = sort_pixels(&pixels, size, &args, &mut StdRng::seed_from_u64(7)).unwrap();
        let second = sort_pixels(&pixels, size, &args, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(first, second, "{}", path);
    }
}

#[test]
fn gray_images_reject_missing_channels() {
    let pixels = vec![Luma([3u8]), Luma([1]), Luma([2])];
    let args = SortingArgs {
        channel: Some(Channel::Blue),
        ..sum_args()
    };
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(
        sort_pixels(&pixels, (3, 1), &args, &mut rng),
        Err(Error::MissingChannel {
            channel: Channel::Blue,
            channels: 1
        })
    );
}
