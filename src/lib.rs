//! Pixel sorting along programmable paths.
//!
//! An image is walked along a [`Path`], every row of the path is cut into
//! runs at boundary pixels (see [`mask`]), runs are cut into intervals (see
//! [`interval`]) and every interval is sorted by a [`SortKey`] before being
//! written back to the coordinates it was read from.

use image::{ImageBuffer, Pixel};
use rand::Rng;

mod args;
mod error;

pub mod animate;
pub mod channel;
pub mod interval;
pub mod mask;
pub mod path;
pub mod sorter;
pub mod sorting;
pub mod tile;

pub use self::animate::Animation;
pub use self::args::SortingArgs;
pub use self::channel::{splice_channel, Channel};
pub use self::error::{Error, Result};
pub use self::path::{Coord, Path, PathKind};
pub use self::sorting::SortKey;
pub use self::tile::{sort_tiles, TileArgs};

use self::interval::IntervalSet;
use self::mask::Boundaries;
use self::sorter::Sorter;

const PROGRESS_STEP: usize = 200_000;

#[inline]
fn index((x, y): Coord, width: u32) -> usize {
    y as usize * width as usize + x as usize
}

/// Sorts a row-major pixel buffer of the given `(width, height)` and returns
/// the result, leaving `pixels` untouched.
///
/// Intervals read their pixels from the partially sorted output, so paths
/// that visit a pixel twice sort it again.
#[tracing::instrument(level = "debug", skip(pixels, args, rng), fields(path = %args.path))]
pub fn sort_pixels<P, R>(
    pixels: &[P],
    size: (u32, u32),
    args: &SortingArgs,
    rng: &mut R,
) -> Result<Vec<P>>
where
    P: Pixel<Subpixel = u8>,
    R: Rng + ?Sized,
{
    let (width, height) = size;
    let total = width as usize * height as usize;
    if pixels.len() != total {
        return Err(Error::BufferSize {
            expected: total,
            actual: pixels.len(),
        });
    }
    if let Some(channel) = args.channel {
        channel.check::<P>()?;
    }
    let mut out = pixels.to_vec();
    if total == 0 {
        return Ok(out);
    }

    let boundaries = Boundaries::from_args(pixels, size, args)?;
    let rows = args.path.rows(size, rng);
    tracing::debug!(rows = rows.len(), "generated path");

    let mut sorter = Sorter::new();
    // allocate buffer outside to prevent frequent reallocations
    let mut scratch = Vec::new();
    let mut processed = 0;
    for row in &rows {
        let runs = match &boundaries {
            Some(boundaries) => IntervalSet::segment(row.len(), |i| boundaries.contains(row[i])),
            None => IntervalSet::new(row.len()),
        };
        for range in runs.subdivide(args, rng).iter() {
            let coords = &row[range];
            scratch.extend(coords.iter().map(|&c| out[index(c, width)]));
            sorter.sort(&mut scratch, args, rng);
            for (&c, pixel) in coords.iter().zip(scratch.drain(..)) {
                out[index(c, width)] = pixel;
            }
        }

        let before = processed / PROGRESS_STEP;
        processed += row.len();
        if processed / PROGRESS_STEP > before {
            tracing::info!(
                "sorted {} / {} pixels ({:.2}%)",
                processed,
                total,
                100.0 * processed as f64 / total as f64
            );
        }
    }

    match args.channel {
        Some(channel) => splice_channel(pixels, &out, channel),
        None => Ok(out),
    }
}

/// [`sort_pixels`] for an [`ImageBuffer`].
pub fn sort_image<P, R>(
    image: &ImageBuffer<P, Vec<u8>>,
    args: &SortingArgs,
    rng: &mut R,
) -> Result<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8> + 'static,
    R: Rng + ?Sized,
{
    let pixels: Vec<P> = image.pixels().copied().collect();
    let sorted = sort_pixels(&pixels, image.dimensions(), args, rng)?;
    Ok(from_pixels(image.dimensions(), &sorted))
}

/// Builds an image from a row-major pixel buffer. Missing pixels stay zeroed.
pub fn from_pixels<P>((width, height): (u32, u32), pixels: &[P]) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let mut image = ImageBuffer::new(width, height);
    for (dst, src) in image.pixels_mut().zip(pixels) {
        *dst = *src;
    }
    image
}
