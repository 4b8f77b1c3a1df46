use image::Pixel;

use std::str;

use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    /// Fails unless pixels of type `P` carry this channel.
    pub fn check<P: Pixel>(self) -> Result<()> {
        if self.index() < usize::from(P::CHANNEL_COUNT) {
            Ok(())
        } else {
            Err(Error::MissingChannel {
                channel: self,
                channels: P::CHANNEL_COUNT,
            })
        }
    }
}

impl str::FromStr for Channel {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "red" => Ok(Channel::Red),
            "green" => Ok(Channel::Green),
            "blue" => Ok(Channel::Blue),
            _ => Err(Error::UnknownChannel(String::from(s))),
        }
    }
}

/// Takes `channel` from `sorted` and every other channel from `original`.
pub fn splice_channel<P>(original: &[P], sorted: &[P], channel: Channel) -> Result<Vec<P>>
where
    P: Pixel<Subpixel = u8>,
{
    channel.check::<P>()?;
    if original.len() != sorted.len() {
        return Err(Error::SizeMismatch(original.len(), sorted.len()));
    }
    let idx = channel.index();
    Ok(original
        .iter()
        .zip(sorted)
        .map(|(&orig, sorted)| {
            let mut out = orig;
            out.channels_mut()[idx] = sorted.channels()[idx];
            out
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn only_selected_channel_changes() {
        let original = vec![Rgb([1u8, 2, 3]), Rgb([4, 5, 6])];
        let sorted = vec![Rgb([40u8, 50, 60]), Rgb([10, 20, 30])];
        let out = splice_channel(&original, &sorted, Channel::Green).unwrap();
        assert_eq!(out, vec![Rgb([1, 50, 3]), Rgb([4, 20, 6])]);
        for (o, s) in original.iter().zip(&out) {
            assert_eq!(o.0[0], s.0[0]);
            assert_eq!(o.0[2], s.0[2]);
        }
    }

    #[test]
    fn lengths_must_match() {
        let a = vec![Rgb([0u8, 0, 0]); 3];
        let b = vec![Rgb([0u8, 0, 0]); 2];
        assert_eq!(
            splice_channel(&a, &b, Channel::Red),
            Err(Error::SizeMismatch(3, 2))
        );
    }

    #[test]
    fn gray_pixels_have_no_green() {
        let gray = vec![Luma([1u8]), Luma([2])];
        assert_eq!(
            splice_channel(&gray, &gray, Channel::Green),
            Err(Error::MissingChannel {
                channel: Channel::Green,
                channels: 1
            })
        );
        assert_eq!(splice_channel(&gray, &gray, Channel::Red), Ok(gray.clone()));
    }

    #[test]
    fn parse_channel() {
        assert_eq!("Blue".parse::<Channel>(), Ok(Channel::Blue));
        assert_eq!(
            "alpha".parse::<Channel>(),
            Err(Error::UnknownChannel("alpha".into()))
        );
    }
}
