use image::Pixel;
use rand::Rng;

use std::str;

use crate::Error;

#[inline]
fn rgb<P>(pixel: &P) -> [u8; 3]
where
    P: Pixel<Subpixel = u8>,
{
    pixel.to_rgb().0
}

#[inline]
pub fn identity<P>(pixel: &P) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    // channels packed big-endian compare the same as the tuple lexicographically
    pixel
        .channels()
        .iter()
        .fold(0u64, |acc, &c| acc << 8 | u64::from(c)) as f64
}

#[inline]
pub fn red<P>(pixel: &P) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    f64::from(rgb(pixel)[0])
}

#[inline]
pub fn green<P>(pixel: &P) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    f64::from(rgb(pixel)[1])
}

#[inline]
pub fn blue<P>(pixel: &P) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    f64::from(rgb(pixel)[2])
}

#[inline]
pub fn sum<P>(pixel: &P) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    rgb(pixel).iter().map(|&c| f64::from(c)).sum()
}

#[inline]
pub fn intensity<P>(pixel: &P) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    sum(pixel) / 3.0
}

#[inline]
pub fn chan_min<P>(pixel: &P) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    f64::from(rgb(pixel).iter().copied().min().unwrap_or(0))
}

#[inline]
pub fn chan_max<P>(pixel: &P) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    f64::from(rgb(pixel).iter().copied().max().unwrap_or(255))
}

#[inline]
pub fn lightness<P>(pixel: &P) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    (chan_max(pixel) + chan_min(pixel)) / 2.0
}

/// Relative luminance after ITU-R BT.709, in `[0, 255]`.
#[inline]
pub fn luma<P>(pixel: &P) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    let [r, g, b] = rgb(pixel);
    0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b)
}

#[inline]
pub fn chroma<P>(pixel: &P) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    chan_max(pixel) - chan_min(pixel)
}

/// Hue angle in degrees, `[0, 360)`. Grays have hue 0.
pub fn hue<P>(pixel: &P) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    let [r, g, b] = rgb(pixel);
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    let max = r.max(g).max(b);
    let d = max - r.min(g).min(b);
    if d == 0.0 {
        return 0.0;
    }
    let sector = if max == r {
        (g - b) / d
    } else if max == g {
        2.0 + (b - r) / d
    } else {
        4.0 + (r - g) / d
    };
    let h = sector * 60.0;
    if h < 0.0 {
        h + 360.0
    } else {
        h
    }
}

/// Chroma relative to value, `[0, 1]`. Black has saturation 0.
#[inline]
pub fn saturation<P>(pixel: &P) -> f64
where
    P: Pixel<Subpixel = u8>,
{
    let max = chan_max(pixel);
    if max == 0.0 {
        0.0
    } else {
        chroma(pixel) / max
    }
}

/// The quantity pixels are compared by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    /// Raw channel tuple, compared lexicographically.
    Identity,
    Sum,
    Red,
    Green,
    Blue,
    Chroma,
    Hue,
    Intensity,
    Lightness,
    Luma,
    Saturation,
    Value,
    Minimum,
    /// A fresh random number every time a pixel is evaluated.
    Random,
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::Identity
    }
}

impl SortKey {
    pub const NAMES: &'static [&'static str] = &[
        "identity",
        "sum",
        "red",
        "green",
        "blue",
        "chroma",
        "hue",
        "intensity",
        "brightness",
        "lightness",
        "luma",
        "saturation",
        "value",
        "maximum",
        "minimum",
        "random",
    ];

    pub fn function<P>(self) -> Option<fn(&P) -> f64>
    where
        P: Pixel<Subpixel = u8>,
    {
        Some(match self {
            SortKey::Identity => identity,
            SortKey::Sum => sum,
            SortKey::Red => red,
            SortKey::Green => green,
            SortKey::Blue => blue,
            SortKey::Chroma => chroma,
            SortKey::Hue => hue,
            SortKey::Intensity => intensity,
            SortKey::Lightness => lightness,
            SortKey::Luma => luma,
            SortKey::Saturation => saturation,
            SortKey::Value => chan_max,
            SortKey::Minimum => chan_min,
            SortKey::Random => return None,
        })
    }

    /// Evaluates the key of `pixel`, bucketed by `discretize` when it is nonzero.
    ///
    /// Discretization does not apply to [`SortKey::Identity`], whose packed
    /// value carries no meaningful magnitude.
    pub fn eval<P, R>(self, pixel: &P, discretize: u32, rng: &mut R) -> f64
    where
        P: Pixel<Subpixel = u8>,
        R: Rng + ?Sized,
    {
        let key = match self.function::<P>() {
            Some(f) => f(pixel),
            None => rng.gen::<f64>(),
        };
        if discretize > 0 && self != SortKey::Identity {
            (key / f64::from(discretize)).floor()
        } else {
            key
        }
    }
}

impl str::FromStr for SortKey {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "identity" => Ok(SortKey::Identity),
            "sum" => Ok(SortKey::Sum),
            "red" => Ok(SortKey::Red),
            "green" => Ok(SortKey::Green),
            "blue" => Ok(SortKey::Blue),
            "chroma" => Ok(SortKey::Chroma),
            "hue" => Ok(SortKey::Hue),
            "intensity" | "brightness" => Ok(SortKey::Intensity),
            "lightness" => Ok(SortKey::Lightness),
            "luma" => Ok(SortKey::Luma),
            "saturation" => Ok(SortKey::Saturation),
            "value" | "maximum" => Ok(SortKey::Value),
            "minimum" => Ok(SortKey::Minimum),
            "random" => Ok(SortKey::Random),
            _ => Err(Error::UnknownSortKey(String::from(s))),
        }
    }
}
