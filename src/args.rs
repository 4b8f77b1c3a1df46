use image::GrayImage;

use crate::{Channel, Error, Path, Result, SortKey};

/// Everything that controls a single sort.
#[derive(Clone, Debug)]
pub struct SortingArgs {
    /// Longest interval to sort, 0 sorts whole runs.
    pub max_interval: usize,
    /// Draw each interval length uniformly from `1..=max_interval`.
    pub randomize: bool,
    pub reverse: bool,
    pub sort_key: SortKey,
    /// Bucket size keys are floor-divided by, 0 disables bucketing.
    pub discretize: u32,
    /// Growth of consecutive interval lengths within a run, as a fraction of
    /// `max_interval`.
    pub progressive_amount: f64,
    /// Fraction of each sorted interval moved from its start to its end.
    pub splice: f64,
    pub splice_random: bool,
    pub path: Path,
    pub mirror: bool,
    /// Sobel magnitude above which a pixel stops an interval, 0 disables.
    pub edge_threshold: f64,
    /// Luma band in `[0, 1]` outside of which pixels stop an interval.
    pub image_threshold: Option<f64>,
    /// Pixels brighter than 128 in this mask stop an interval.
    pub image_mask: Option<GrayImage>,
    /// Keep every channel but this one from the input.
    pub channel: Option<Channel>,
}

impl Default for SortingArgs {
    fn default() -> Self {
        SortingArgs {
            max_interval: 0,
            randomize: false,
            reverse: false,
            sort_key: SortKey::default(),
            discretize: 0,
            progressive_amount: 0.0,
            splice: 0.0,
            splice_random: false,
            path: Path::default(),
            mirror: false,
            edge_threshold: 0.0,
            image_threshold: None,
            image_mask: None,
            channel: None,
        }
    }
}

impl SortingArgs {
    /// Reads the numeric field `field`, where `path.<name>` addresses a path
    /// parameter.
    pub fn get(&self, field: &str) -> Result<f64> {
        if let Some(name) = field.strip_prefix("path.") {
            return self
                .path
                .param(name)
                .ok_or_else(|| Error::UnknownField(field.to_owned()));
        }
        Ok(match field {
            "max_interval" => self.max_interval as f64,
            "discretize" => f64::from(self.discretize),
            "progressive_amount" => self.progressive_amount,
            "splice" => self.splice,
            "edge_threshold" => self.edge_threshold,
            "image_threshold" => self.image_threshold.unwrap_or(0.0),
            _ => return Err(Error::UnknownField(field.to_owned())),
        })
    }

    /// Writes the numeric field `field`. Integer fields are rounded and
    /// clamped at zero.
    pub fn set(&mut self, field: &str, value: f64) -> Result<()> {
        if let Some(name) = field.strip_prefix("path.") {
            return self.path.set_param(name, value);
        }
        let count = value.round().max(0.0);
        match field {
            "max_interval" => self.max_interval = count as usize,
            "discretize" => self.discretize = count as u32,
            "progressive_amount" => self.progressive_amount = value,
            "splice" => self.splice = value,
            "edge_threshold" => self.edge_threshold = value,
            "image_threshold" => self.image_threshold = Some(value),
            _ => return Err(Error::UnknownField(field.to_owned())),
        }
        Ok(())
    }
}
