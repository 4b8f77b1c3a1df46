use std::str;

use crate::{Error, Result, SortingArgs};

/// Sweeps one numeric sorting field linearly from `start` to `stop` over
/// `steps` frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    /// A field name understood by [`SortingArgs::get`], e.g. `splice` or
    /// `path.angle`.
    pub field: String,
    pub start: f64,
    pub stop: f64,
    pub steps: usize,
}

impl Animation {
    pub fn delta(&self) -> f64 {
        (self.stop - self.start) / self.steps.saturating_sub(1).max(1) as f64
    }

    /// The field's value in `frame`.
    pub fn value(&self, frame: usize) -> f64 {
        self.start + frame as f64 * self.delta()
    }

    /// Calls `frame` once per step with the field set to that step's value.
    ///
    /// The field is checked before the first frame, so an unknown field fails
    /// without rendering anything.
    pub fn run<T, E, F>(&self, args: &mut SortingArgs, mut frame: F) -> std::result::Result<Vec<T>, E>
    where
        E: From<Error>,
        F: FnMut(usize, &SortingArgs) -> std::result::Result<T, E>,
    {
        args.get(&self.field)?;
        let mut frames = Vec::with_capacity(self.steps);
        for i in 0..self.steps {
            let value = self.value(i);
            args.set(&self.field, value)?;
            tracing::info!(field = %self.field, value, "sorting frame {} / {}", i + 1, self.steps);
            frames.push(frame(i, args)?);
        }
        Ok(frames)
    }
}

/// Parses `"<field> <start> <stop> <n_steps>"`.
impl str::FromStr for Animation {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::MalformedAnimation(s.to_owned());
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts[..] {
            [field, start, stop, steps] => Ok(Animation {
                field: field.to_owned(),
                start: start.parse().map_err(|_| malformed())?,
                stop: stop.parse().map_err(|_| malformed())?,
                steps: steps.parse().map_err(|_| malformed())?,
            }),
            _ => Err(malformed()),
        }
    }
}
