use image::{GrayImage, Pixel};
use rand::Rng;

use crate::{sort_pixels, Error, Result, SortingArgs};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileArgs {
    pub width: u32,
    pub height: u32,
    /// Approximate fraction of tiles that get sorted.
    pub density: f64,
    /// Pick tiles at random instead of evenly spread.
    pub randomize: bool,
}

impl Default for TileArgs {
    fn default() -> Self {
        TileArgs {
            width: 100,
            height: 100,
            density: 1.0,
            randomize: false,
        }
    }
}

/// Sorts a selection of rectangular tiles of the image independently of each
/// other. Tiles at the right and bottom edges are cut short; tiles that are
/// not selected are copied through.
pub fn sort_tiles<P, R>(
    pixels: &[P],
    size: (u32, u32),
    args: &SortingArgs,
    tiles: &TileArgs,
    rng: &mut R,
) -> Result<Vec<P>>
where
    P: Pixel<Subpixel = u8>,
    R: Rng + ?Sized,
{
    let (width, height) = size;
    if tiles.width == 0 || tiles.height == 0 {
        return Err(Error::InvalidTileSize {
            width: tiles.width,
            height: tiles.height,
        });
    }
    let total = width as usize * height as usize;
    if pixels.len() != total {
        return Err(Error::BufferSize {
            expected: total,
            actual: pixels.len(),
        });
    }
    if let Some(mask) = &args.image_mask {
        if mask.dimensions() != size {
            return Err(Error::MaskSize {
                expected: size,
                actual: mask.dimensions(),
            });
        }
    }

    let mut out = pixels.to_vec();
    let mut tile_args = SortingArgs {
        image_mask: None,
        ..args.clone()
    };
    let tile_count = tiles_along(width, tiles.width) * tiles_along(height, tiles.height);
    let report_every = (200_000 / (tiles.width as usize).saturating_mul(tiles.height as usize)).max(1);
    let mut completed = 0;
    // one tile is sorted every time this reaches 1 / density
    let mut credit = 0.0;

    for y in (0..height).step_by(tiles.height as usize) {
        for x in (0..width).step_by(tiles.width as usize) {
            completed += 1;
            if completed % report_every == 0 {
                tracing::info!(
                    "completed {} / {} tiles ({:.2}%)",
                    completed,
                    tile_count,
                    100.0 * completed as f64 / tile_count as f64
                );
            }

            let selected = if tiles.randomize {
                rng.gen::<f64>() < tiles.density
            } else {
                credit += 1.0;
                if tiles.density <= 0.0 || credit < 1.0 / tiles.density {
                    false
                } else {
                    credit -= 1.0 / tiles.density;
                    true
                }
            };
            if !selected {
                continue;
            }

            let corner = (x, y);
            let tile_size = ((width - x).min(tiles.width), (height - y).min(tiles.height));
            let tile = crop(pixels, width, corner, tile_size);
            tile_args.image_mask = args
                .image_mask
                .as_ref()
                .map(|mask| crop_mask(mask, corner, tile_size));
            let sorted = sort_pixels(&tile, tile_size, &tile_args, rng)?;
            paste(&mut out, width, &sorted, corner, tile_size);
        }
    }
    Ok(out)
}

/// Number of tiles of length `tile` needed to cover `len`, the last one
/// possibly cut short.
fn tiles_along(len: u32, tile: u32) -> usize {
    (len / tile + (len % tile != 0) as u32) as usize
}

fn crop<P: Copy>(pixels: &[P], width: u32, (x, y): (u32, u32), (tw, th): (u32, u32)) -> Vec<P> {
    let mut tile = Vec::with_capacity(tw as usize * th as usize);
    for row in y..y + th {
        let start = row as usize * width as usize + x as usize;
        tile.extend_from_slice(&pixels[start..start + tw as usize]);
    }
    tile
}

fn paste<P: Copy>(
    pixels: &mut [P],
    width: u32,
    tile: &[P],
    (x, y): (u32, u32),
    (tw, th): (u32, u32),
) {
    for (row, src) in (y..y + th).zip(tile.chunks(tw as usize)) {
        let start = row as usize * width as usize + x as usize;
        pixels[start..start + tw as usize].copy_from_slice(src);
    }
}

fn crop_mask(mask: &GrayImage, (x, y): (u32, u32), (tw, th): (u32, u32)) -> GrayImage {
    GrayImage::from_fn(tw, th, |tx, ty| *mask.get_pixel(x + tx, y + ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SortKey;
    use image::Rgb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // 4x2, each row descending
    fn image() -> Vec<Rgb<u8>> {
        [8u8, 7, 6, 5, 4, 3, 2, 1]
            .iter()
            .map(|&v| Rgb([v, v, v]))
            .collect()
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

    #[test]
    fn every_tile_sorted_at_full_density() {
        let mut rng = StdRng::seed_from_u64(0);
        let tiles = TileArgs {
            width: 2,
            height: 2,
            ..TileArgs::default()
        };
        let out = sort_tiles(&image(), (4, 2), &sum_args(), &tiles, &mut rng).unwrap();
        assert_eq!(values(&out), vec![7, 8, 5, 6, 3, 4, 1, 2]);
    }

    #[test]
    fn half_density_sorts_every_other_tile() {
        let mut rng = StdRng::seed_from_u64(0);
        let tiles = TileArgs {
            width: 2,
            height: 2,
            density: 0.5,
            randomize: false,
        };
        let out = sort_tiles(&image(), (4, 2), &sum_args(), &tiles, &mut rng).unwrap();
        // first tile skipped, second sorted
        assert_eq!(values(&out), vec![8, 7, 5, 6, 4, 3, 1, 2]);
    }

    #[test]
    fn zero_density_copies_through() {
        let mut rng = StdRng::seed_from_u64(0);
        for &randomize in &[false, true] {
            let tiles = TileArgs {
                width: 3,
                height: 1,
                density: 0.0,
                randomize,
            };
            let out = sort_tiles(&image(), (4, 2), &sum_args(), &tiles, &mut rng).unwrap();
            assert_eq!(out, image());
        }
    }

    #[test]
    fn edge_tiles_are_truncated() {
        let mut rng = StdRng::seed_from_u64(0);
        let tiles = TileArgs {
            width: 3,
            height: 5,
            ..TileArgs::default()
        };
        let out = sort_tiles(&image(), (4, 2), &sum_args(), &tiles, &mut rng).unwrap();
        assert_eq!(values(&out), vec![6, 7, 8, 5, 2, 3, 4, 1]);
    }

    #[test]
    fn tile_size_must_be_positive() {
        let mut rng = StdRng::seed_from_u64(0);
        let tiles = TileArgs {
            width: 0,
            ..TileArgs::default()
        };
        assert_eq!(
            sort_tiles(&image(), (4, 2), &sum_args(), &tiles, &mut rng),
            Err(Error::InvalidTileSize {
                width: 0,
                height: 100
            })
        );
    }

    #[test]
    fn oversized_tiles_cover_whole_image() {
        let mut rng = StdRng::seed_from_u64(0);
        let tiles = TileArgs {
            width: u32::MAX,
            height: u32::MAX,
            ..TileArgs::default()
        };
        let out = sort_tiles(&image(), (4, 2), &sum_args(), &tiles, &mut rng).unwrap();
        assert_eq!(values(&out), vec![5, 6, 7, 8, 1, 2, 3, 4]);
        assert_eq!(tiles_along(4, u32::MAX), 1);
        assert_eq!(tiles_along(7, 3), 3);
        assert_eq!(tiles_along(6, 3), 2);
    }
}
