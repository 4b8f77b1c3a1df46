use crate::Channel;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while configuring or running a sort.
///
/// All of these are detected before any pixel is reordered.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unknown path `{0}`")]
    UnknownPath(String),

    #[error("path `{path}` has no parameter `{name}`")]
    UnknownParam { path: &'static str, name: String },

    #[error("parameter `{name}` given more than once")]
    DuplicateParam { name: String },

    #[error("path arguments must be of the form `name=value`, got `{0}`")]
    MalformedArg(String),

    #[error("parameter `{name}` expects {expected}, got `{value}`")]
    InvalidParamValue {
        name: String,
        expected: &'static str,
        value: String,
    },

    #[error("unknown sort key `{0}`")]
    UnknownSortKey(String),

    #[error("unknown channel `{0}`, expected one of red, green or blue")]
    UnknownChannel(String),

    #[error("no numeric sorting parameter `{0}`")]
    UnknownField(String),

    #[error("animation must be `<field> <start> <stop> <n_steps>`, got `{0}`")]
    MalformedAnimation(String),

    #[error("tiles must be at least one pixel wide and high, got {width}x{height}")]
    InvalidTileSize { width: u32, height: u32 },

    #[error("mask is {actual:?} but the image is {expected:?}")]
    MaskSize {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("buffer holds {actual} pixels, expected {expected} for the given size")]
    BufferSize { expected: usize, actual: usize },

    #[error("images differ in size: {0} and {1} pixels")]
    SizeMismatch(usize, usize),

    #[error("cannot sort the {channel:?} channel of pixels with {channels} channel(s)")]
    MissingChannel { channel: Channel, channels: u8 },

    #[error("edge detection requires the `imageproc` feature")]
    EdgeDetectionUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        assert!(Error::UnknownPath("spiral".into())
            .to_string()
            .contains("spiral"));
        let err = Error::UnknownParam {
            path: "angled-line",
            name: "radius".into(),
        };
        assert_eq!(
            err.to_string(),
            "path `angled-line` has no parameter `radius`"
        );
    }
}
