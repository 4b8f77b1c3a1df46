//! Per-pixel boundary flags that stop sorting intervals.
//!
//! Boundaries come from up to three sources which are or-ed together: the
//! Sobel edge strength of the image, an external grayscale mask and a luma
//! band outside of which pixels are left alone.

use image::{GrayImage, Pixel};

use crate::path::Coord;
use crate::sorting;
use crate::{Error, Result, SortingArgs};

/// Mask pixels brighter than this are boundaries.
pub const MASK_THRESHOLD: u8 = 128;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Boundaries {
    width: u32,
    bits: Vec<bool>,
}

impl Boundaries {
    /// Collects the boundaries `args` asks for, or `None` if it asks for none.
    pub fn from_args<P>(pixels: &[P], size: (u32, u32), args: &SortingArgs) -> Result<Option<Self>>
    where
        P: Pixel<Subpixel = u8>,
    {
        let (width, _) = size;
        let mut boundaries = None;
        let mut mark = |bits: Vec<bool>| {
            let current = boundaries.get_or_insert_with(|| Boundaries {
                width,
                bits: vec![false; bits.len()],
            });
            current.union(&bits);
        };

        if args.edge_threshold > 0.0 {
            let threshold = args.edge_threshold;
            mark(
                edge_weights(pixels, size)?
                    .into_iter()
                    .map(|weight| weight > threshold)
                    .collect(),
            );
            tracing::debug!(threshold, "limiting intervals by edges");
        }
        if let Some(mask) = &args.image_mask {
            if mask.dimensions() != size {
                return Err(Error::MaskSize {
                    expected: size,
                    actual: mask.dimensions(),
                });
            }
            mark(mask.pixels().map(|p| p.0[0] > MASK_THRESHOLD).collect());
            tracing::debug!("limiting intervals by image mask");
        }
        if let Some(threshold) = args.image_threshold {
            mark(luma_band(pixels, threshold));
            tracing::debug!(threshold, "limiting intervals by brightness");
        }
        Ok(boundaries)
    }

    fn union(&mut self, bits: &[bool]) {
        for (dst, &src) in self.bits.iter_mut().zip(bits) {
            *dst |= src;
        }
    }

    #[inline]
    pub fn contains(&self, (x, y): Coord) -> bool {
        self.bits[y as usize * self.width as usize + x as usize]
    }
}

/// Flags pixels whose luma falls outside `[t * 255 / 2, 255 - t * 255 / 2]`,
/// with `t` clamped to `[0, 1]`. A threshold of 0 flags nothing, 1 flags
/// nearly everything.
pub fn luma_band<P>(pixels: &[P], threshold: f64) -> Vec<bool>
where
    P: Pixel<Subpixel = u8>,
{
    let t = threshold.max(0.0).min(1.0) * 255.0 / 2.0;
    pixels
        .iter()
        .map(|p| {
            let brightness = sorting::luma(p);
            brightness < t || brightness > 255.0 - t
        })
        .collect()
}

pub fn grayscale<P>(pixels: &[P], (width, height): (u32, u32)) -> GrayImage
where
    P: Pixel<Subpixel = u8>,
{
    GrayImage::from_fn(width, height, |x, y| {
        pixels[y as usize * width as usize + x as usize].to_luma()
    })
}

/// Sobel gradient magnitude of the grayscale image, one weight per pixel.
#[cfg(feature = "imageproc")]
pub fn edge_weights<P>(pixels: &[P], size: (u32, u32)) -> Result<Vec<f64>>
where
    P: Pixel<Subpixel = u8>,
{
    let gray = grayscale(pixels, size);
    let gradients = imageproc::gradients::sobel_gradients(&gray);
    Ok(gradients.pixels().map(|p| f64::from(p.0[0])).collect())
}

#[cfg(not(feature = "imageproc"))]
pub fn edge_weights<P>(_pixels: &[P], _size: (u32, u32)) -> Result<Vec<f64>>
where
    P: Pixel<Subpixel = u8>,
{
    Err(Error::EdgeDetectionUnavailable)
}
