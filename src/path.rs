//! Traversals of an image's coordinate space.
//!
//! A [`Path`] splits the pixels of a `width x height` image into an ordered
//! list of rows, each row being an ordered list of coordinates. Sorting
//! happens along rows, so the path decides the direction pixels "flow" in.
//!
//! Every coordinate a path emits lies inside the image. Most paths emit each
//! pixel exactly once; `fill-circles` emits some pixels several times and the
//! random walk emits some pixels several times while missing others.

use rand::Rng;

use std::fmt;
use std::str;

use crate::{Error, Result};

pub type Coord = (u32, u32);
pub type Row = Vec<Coord>;

/// A parsed path argument value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    /// Parses `s` as an int, a float or a bool, in that order.
    pub fn parse(s: &str) -> Option<ParamValue> {
        if let Ok(i) = s.parse() {
            return Some(ParamValue::Int(i));
        }
        if let Ok(f) = s.parse() {
            return Some(ParamValue::Float(f));
        }
        match s.to_lowercase().as_str() {
            "true" => Some(ParamValue::Bool(true)),
            "false" => Some(ParamValue::Bool(false)),
            _ => None,
        }
    }

    fn type_name(self) -> &'static str {
        match self {
            ParamValue::Int(_) => "an integer",
            ParamValue::Float(_) => "a number",
            ParamValue::Bool(_) => "a boolean",
        }
    }

    /// Converts `self` to the type of `like`, if that loses nothing.
    fn coerce_like(self, like: ParamValue) -> Option<ParamValue> {
        match (like, self) {
            (ParamValue::Int(_), ParamValue::Int(_))
            | (ParamValue::Float(_), ParamValue::Float(_))
            | (ParamValue::Bool(_), ParamValue::Bool(_)) => Some(self),
            (ParamValue::Float(_), ParamValue::Int(i)) => Some(ParamValue::Float(i as f64)),
            _ => None,
        }
    }

    pub fn as_f64(self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(i as f64),
            ParamValue::Float(f) => Some(f),
            ParamValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A named path parameter and its default.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: ParamValue,
}

const ANGLED_LINE_PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "angle",
    default: ParamValue::Float(0.0),
}];

const FILL_CIRCLES_PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "radius",
    default: ParamValue::Int(100),
}];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    AngledLine,
    Circles,
    Concentric,
    Diagonal,
    DiagonalSingle,
    FillCircles,
    Horizontal,
    RandomWalk,
    RandomWalkHorizontal,
    RandomWalkVertical,
    Vertical,
}

impl PathKind {
    pub const ALL: &'static [PathKind] = &[
        PathKind::AngledLine,
        PathKind::Circles,
        PathKind::Concentric,
        PathKind::Diagonal,
        PathKind::DiagonalSingle,
        PathKind::FillCircles,
        PathKind::Horizontal,
        PathKind::RandomWalk,
        PathKind::RandomWalkHorizontal,
        PathKind::RandomWalkVertical,
        PathKind::Vertical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PathKind::AngledLine => "angled-line",
            PathKind::Circles => "circles",
            PathKind::Concentric => "concentric",
            PathKind::Diagonal => "diagonal",
            PathKind::DiagonalSingle => "diagonal-single",
            PathKind::FillCircles => "fill-circles",
            PathKind::Horizontal => "horizontal",
            PathKind::RandomWalk => "random-walk",
            PathKind::RandomWalkHorizontal => "random-walk-horizontal",
            PathKind::RandomWalkVertical => "random-walk-vertical",
            PathKind::Vertical => "vertical",
        }
    }

    pub fn params(self) -> &'static [ParamSpec] {
        match self {
            PathKind::AngledLine => ANGLED_LINE_PARAMS,
            PathKind::FillCircles => FILL_CIRCLES_PARAMS,
            _ => &[],
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PathKind::AngledLine => "Sort pixels in lines tilted at the given angle.",
            PathKind::Circles => "Pixels are sorted in concentric circles about the center of the image.",
            PathKind::Concentric => "Pixels are sorted in concentric rectangles.",
            PathKind::Diagonal => "Pixels are sorted in diagonal lines.",
            PathKind::DiagonalSingle => {
                "Pixels sorted in a single path that moves diagonally through the image."
            }
            PathKind::FillCircles => "Covers the image in circles of the given radius.",
            PathKind::Horizontal => "Pixels sorted horizontally.",
            PathKind::RandomWalk => "Pixels sorted in random walks over the image.",
            PathKind::RandomWalkHorizontal => {
                "Pixels sorted in random walks moving horizontally over the image."
            }
            PathKind::RandomWalkVertical => {
                "Pixels sorted in random walks moving vertically over the image."
            }
            PathKind::Vertical => "Pixels sorted vertically.",
        }
    }
}

impl str::FromStr for PathKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let s = s.to_lowercase();
        PathKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or(Error::UnknownPath(s))
    }
}

/// A path kind together with its parameter values.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    kind: PathKind,
    // parallel to `kind.params()`
    values: Vec<ParamValue>,
}

impl Default for Path {
    fn default() -> Self {
        Path::from(PathKind::Horizontal)
    }
}

impl From<PathKind> for Path {
    fn from(kind: PathKind) -> Self {
        Path {
            kind,
            values: kind.params().iter().map(|p| p.default).collect(),
        }
    }
}

impl Path {
    /// Builds a path from its kind and `name=value` arguments, checked against
    /// the kind's parameter schema.
    pub fn with_args<S: AsRef<str>>(kind: PathKind, args: &[(S, ParamValue)]) -> Result<Path> {
        let schema = kind.params();
        let mut path = Path::from(kind);
        let mut seen = vec![false; schema.len()];
        for (name, value) in args {
            let name = name.as_ref();
            let idx = schema
                .iter()
                .position(|p| p.name == name)
                .ok_or_else(|| Error::UnknownParam {
                    path: kind.name(),
                    name: name.to_owned(),
                })?;
            if seen[idx] {
                return Err(Error::DuplicateParam {
                    name: name.to_owned(),
                });
            }
            seen[idx] = true;
            path.values[idx] =
                value
                    .coerce_like(schema[idx].default)
                    .ok_or_else(|| Error::InvalidParamValue {
                        name: name.to_owned(),
                        expected: schema[idx].default.type_name(),
                        value: value.to_string(),
                    })?;
        }
        Ok(path)
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.kind.params().iter().position(|p| p.name == name)
    }

    /// The numeric value of parameter `name`.
    pub fn param(&self, name: &str) -> Option<f64> {
        self.position(name).and_then(|idx| self.values[idx].as_f64())
    }

    /// Overwrites the numeric parameter `name`, rounding for integer parameters.
    pub fn set_param(&mut self, name: &str, value: f64) -> Result<()> {
        let field = || Error::UnknownField(format!("path.{}", name));
        let idx = self.position(name).ok_or_else(field)?;
        self.values[idx] = match self.values[idx] {
            ParamValue::Int(_) => ParamValue::Int(value.round() as i64),
            ParamValue::Float(_) => ParamValue::Float(value),
            ParamValue::Bool(_) => return Err(field()),
        };
        Ok(())
    }

    /// Generates the rows of this path for an image of the given size.
    ///
    /// Only the random walk paths draw from `rng`.
    pub fn rows<R>(&self, (width, height): (u32, u32), rng: &mut R) -> Vec<Row>
    where
        R: Rng + ?Sized,
    {
        if width == 0 || height == 0 {
            return Vec::new();
        }
        match self.kind {
            PathKind::AngledLine => angled_line(width, height, self.param("angle").unwrap_or(0.0)),
            PathKind::Circles => circles(width, height),
            PathKind::Concentric => concentric(width, height),
            PathKind::Diagonal => diagonal(width, height),
            PathKind::DiagonalSingle => vec![diagonal(width, height).concat()],
            PathKind::FillCircles => {
                let radius = self.param("radius").unwrap_or(100.0).max(1.0);
                fill_circles(width, height, radius as u32)
            }
            PathKind::Horizontal => horizontal(width, height),
            PathKind::RandomWalk => random_walk(width, height, rng),
            PathKind::RandomWalkHorizontal => random_walk_horizontal(width, height, rng),
            PathKind::RandomWalkVertical => random_walk_vertical(width, height, rng),
            PathKind::Vertical => vertical(width, height),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name())?;
        for (spec, value) in self.kind.params().iter().zip(&self.values) {
            write!(f, " {}={}", spec.name, value)?;
        }
        Ok(())
    }
}

/// Parses `"<path-name> [name=value ...]"`.
impl str::FromStr for Path {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let mut words = s.split_whitespace();
        let kind = words
            .next()
            .ok_or_else(|| Error::UnknownPath(String::new()))?
            .parse::<PathKind>()?;
        let args = words.map(parse_arg).collect::<Result<Vec<_>>>()?;
        Path::with_args(kind, &args)
    }
}

fn parse_arg(arg: &str) -> Result<(String, ParamValue)> {
    let malformed = || Error::MalformedArg(arg.to_owned());
    let mut parts = arg.splitn(2, '=');
    let name = parts.next().filter(|n| !n.is_empty()).ok_or_else(malformed)?;
    let value = parts
        .next()
        .filter(|v| !v.is_empty() && !v.contains('='))
        .ok_or_else(malformed)?;
    let parsed = ParamValue::parse(value).ok_or_else(|| Error::InvalidParamValue {
        name: name.to_lowercase(),
        expected: "a number or boolean",
        value: value.to_owned(),
    })?;
    Ok((name.to_lowercase(), parsed))
}

#[inline]
fn coord(x: i64, y: i64) -> Coord {
    (x as u32, y as u32)
}

fn horizontal(width: u32, height: u32) -> Vec<Row> {
    (0..height)
        .map(|y| (0..width).map(|x| (x, y)).collect())
        .collect()
}

fn vertical(width: u32, height: u32) -> Vec<Row> {
    (0..width)
        .map(|x| (0..height).map(|y| (x, y)).collect())
        .collect()
}

/// Diagonals running top-left to bottom-right, starting at the bottom-left
/// corner and ending at the top-right one.
fn diagonal(width: u32, height: u32) -> Vec<Row> {
    let (w, h) = (i64::from(width), i64::from(height));
    (1 - w..h)
        .rev()
        .map(|offset| {
            (0i64.max(-offset)..w.min(h - offset))
                .map(|x| coord(x, x + offset))
                .collect()
        })
        .collect()
}

/// Rectangle borders, outermost first, each walked clockwise from its
/// top-left corner.
fn concentric(width: u32, height: u32) -> Vec<Row> {
    let (mut min_x, mut max_x) = (0, i64::from(width));
    let (mut min_y, mut max_y) = (0, i64::from(height));
    let mut rows = Vec::new();
    while min_x < max_x && min_y < max_y {
        let mut row = Vec::new();
        row.extend((min_x..max_x).map(|x| coord(x, min_y)));
        row.extend((min_y + 1..max_y).map(|y| coord(max_x - 1, y)));
        // a one pixel high or wide rectangle has no separate bottom or left side
        if max_y - 1 > min_y {
            row.extend((min_x..max_x - 1).rev().map(|x| coord(x, max_y - 1)));
        }
        if max_x - 1 > min_x {
            row.extend((min_y + 1..max_y - 1).rev().map(|y| coord(min_x, y)));
        }
        rows.push(row);
        min_x += 1;
        min_y += 1;
        max_x -= 1;
        max_y -= 1;
    }
    rows
}

/// Parallel lines at `angle` degrees (clockwise, since y points down).
///
/// Lines advance one pixel at a time along the axis closer to the angle and
/// are sheared along the other one. Each column (or row) of the image is
/// crossed by every line exactly once, so the lines partition the image.
fn angled_line(width: u32, height: u32, angle: f64) -> Vec<Row> {
    let (w, h) = (i64::from(width), i64::from(height));
    let (dy, dx) = angle.to_radians().sin_cos();
    if dx.abs() >= dy.abs() {
        let xs: Vec<i64> = if dx >= 0.0 {
            (0..w).collect()
        } else {
            (0..w).rev().collect()
        };
        sheared_lines(&xs, dy / dx, h, |x, y| coord(x, y))
    } else {
        let ys: Vec<i64> = if dy >= 0.0 {
            (0..h).collect()
        } else {
            (0..h).rev().collect()
        };
        sheared_lines(&ys, dx / dy, w, |y, x| coord(x, y))
    }
}

fn sheared_lines<F>(major: &[i64], slope: f64, minor_len: i64, to_coord: F) -> Vec<Row>
where
    F: Fn(i64, i64) -> Coord,
{
    let shifts: Vec<i64> = major
        .iter()
        .map(|&m| (m as f64 * slope).round() as i64)
        .collect();
    let lowest = shifts.iter().copied().min().unwrap_or(0);
    let highest = shifts.iter().copied().max().unwrap_or(0);
    (-highest..minor_len - lowest)
        .map(|line| {
            major
                .iter()
                .zip(&shifts)
                .map(|(&m, &shift)| (m, line + shift))
                .filter(|&(_, n)| 0 <= n && n < minor_len)
                .map(|(m, n)| to_coord(m, n))
                .collect::<Row>()
        })
        .filter(|row| !row.is_empty())
        .collect()
}

/// Groups the pixels around `center` into rings by rounded distance, each
/// ring ordered by angle. With a `radius`, only rings up to it are built.
fn rings(width: u32, height: u32, center: (f64, f64), radius: Option<u32>) -> Vec<Row> {
    let (cx, cy) = center;
    let (x_range, y_range) = match radius {
        Some(r) => {
            let r = f64::from(r);
            let clip = |lo: f64, hi: f64, len: u32| {
                let lo = lo.floor().max(0.0) as u32;
                let hi = (hi.ceil() + 1.0).max(0.0).min(f64::from(len)) as u32;
                lo..hi
            };
            (clip(cx - r, cx + r, width), clip(cy - r, cy + r, height))
        }
        None => (0..width, 0..height),
    };

    let mut rings: Vec<Vec<(f64, Coord)>> = Vec::new();
    for y in y_range {
        for x in x_range.clone() {
            let (fx, fy) = (f64::from(x) - cx, f64::from(y) - cy);
            let ring = fx.hypot(fy).round() as usize;
            if radius.map_or(false, |r| ring > r as usize) {
                continue;
            }
            if rings.len() <= ring {
                rings.resize_with(ring + 1, Vec::new);
            }
            rings[ring].push((fy.atan2(fx), (x, y)));
        }
    }
    rings
        .into_iter()
        .filter(|ring| !ring.is_empty())
        .map(|mut ring| {
            ring.sort_by(|a, b| a.0.total_cmp(&b.0));
            ring.into_iter().map(|(_, c)| c).collect()
        })
        .collect()
}

fn circles(width: u32, height: u32) -> Vec<Row> {
    let center = (
        f64::from(width - 1) / 2.0,
        f64::from(height - 1) / 2.0,
    );
    rings(width, height, center, None)
}

/// Circles of `radius` around a square grid of centers spaced `radius` apart.
///
/// Neighbouring circles overlap and every pixel is within `radius` of some
/// center, so the image is covered with many pixels visited more than once.
fn fill_circles(width: u32, height: u32, radius: u32) -> Vec<Row> {
    let spacing = radius.max(1) as usize;
    let mut rows = Vec::new();
    for cy in (0..height).step_by(spacing) {
        for cx in (0..width).step_by(spacing) {
            let center = (f64::from(cx), f64::from(cy));
            rows.extend(rings(width, height, center, Some(radius)));
        }
    }
    rows
}

/// Self-avoiding random walks from random starting points.
///
/// Each walk steps to a random neighbour it has not visited yet and ends when
/// it steps off the image or has nowhere left to go. Walks are started until
/// they have emitted `width * height` coordinates in total, which visits
/// some pixels more than once and misses others.
fn random_walk<R>(width: u32, height: u32, rng: &mut R) -> Vec<Row>
where
    R: Rng + ?Sized,
{
    const STEPS: [(i64, i64); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
    let (w, h) = (i64::from(width), i64::from(height));
    let budget = width as usize * height as usize;
    // stamp[idx] == walk id marks a pixel visited by the current walk
    let mut stamp = vec![0u32; budget];
    let mut rows = Vec::new();
    let mut emitted = 0;
    let mut walk_id = 0u32;
    while emitted < budget {
        walk_id += 1;
        let (mut x, mut y) = (
            i64::from(rng.gen_range(0, width)),
            i64::from(rng.gen_range(0, height)),
        );
        let mut row = Vec::new();
        loop {
            row.push(coord(x, y));
            stamp[(y * w + x) as usize] = walk_id;
            let open: Vec<(i64, i64)> = STEPS
                .iter()
                .map(|&(dx, dy)| (x + dx, y + dy))
                .filter(|&(nx, ny)| {
                    let inside = 0 <= nx && nx < w && 0 <= ny && ny < h;
                    !inside || stamp[(ny * w + nx) as usize] != walk_id
                })
                .collect();
            if open.is_empty() {
                break;
            }
            let (nx, ny) = open[rng.gen_range(0, open.len())];
            if nx < 0 || nx >= w || ny < 0 || ny >= h {
                break;
            }
            x = nx;
            y = ny;
        }
        emitted += row.len();
        rows.push(row);
    }
    rows
}

/// One walk per image row, moving right one pixel per step while drifting
/// up or down by one, clamped to the image.
fn random_walk_horizontal<R>(width: u32, height: u32, rng: &mut R) -> Vec<Row>
where
    R: Rng + ?Sized,
{
    (0..height)
        .map(|start| drifting_walk(width, height, start, rng))
        .collect()
}

fn random_walk_vertical<R>(width: u32, height: u32, rng: &mut R) -> Vec<Row>
where
    R: Rng + ?Sized,
{
    (0..width)
        .map(|start| {
            drifting_walk(height, width, start, rng)
                .into_iter()
                .map(|(y, x)| (x, y))
                .collect()
        })
        .collect()
}

fn drifting_walk<R>(length: u32, breadth: u32, start: u32, rng: &mut R) -> Row
where
    R: Rng + ?Sized,
{
    let max = i64::from(breadth) - 1;
    let mut across = i64::from(start);
    let mut row = Vec::with_capacity(length as usize);
    for along in 0..length {
        row.push((along, across as u32));
        across += if rng.gen_bool(0.5) { 1 } else { -1 };
        across = across.max(0).min(max);
    }
    row
}
