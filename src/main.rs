use anyhow::{bail, Context};
use clap::{App, Arg, ArgMatches};
use image::codecs::gif::{GifDecoder, GifEncoder};
use image::{AnimationDecoder, DynamicImage, Frame, ImageFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use pixelsort::{Animation, Channel, PathKind, SortKey, SortingArgs, TileArgs};

fn main() {
    let matches = App::new("pixelsort")
        .version(clap::crate_version!())
        .author(clap::crate_authors!())
        .about("A tool for pixel-sorting images")
        .arg(
            Arg::with_name("input")
                .help("The input image to sort.")
                .required_unless("help_paths")
                .takes_value(true),
        )
        .args(&[
            arg_output(),
            arg_log(),
            arg_channel(),
            arg_discretize(),
            arg_edge_threshold(),
            arg_image_threshold(),
            arg_image_mask(),
            arg_max_interval(),
            arg_mirror(),
            arg_path(),
            arg_help_paths(),
            arg_progressive_amount(),
            arg_randomize(),
            arg_reverse(),
            arg_sortkey(),
            arg_splice(),
            arg_splice_random(),
            arg_vertical(),
            arg_use_tiles(),
            arg_tile_x(),
            arg_tile_y(),
            arg_randomize_tiles(),
            arg_tile_density(),
            arg_animate(),
            arg_save_frames(),
            arg_fix_random_seed(),
        ])
        .get_matches();

    if matches.is_present("help_paths") {
        print_paths_help();
        return;
    }

    let level = if matches.is_present("log") {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&matches) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches<'_>) -> anyhow::Result<()> {
    let input = Path::new(
        matches
            .value_of_os("input")
            .context("no input image given")?,
    );
    let output = matches
        .value_of_os("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let extension = input
                .extension()
                .and_then(std::ffi::OsStr::to_str)
                .unwrap_or("png");
            input.with_extension(["sorted", ".", extension].concat())
        });

    // everything configurable is validated before the image is touched
    let mut args = sorting_args(matches)?;
    let tiles = tile_args(matches)?;
    let animation = parse::<Animation>(matches, "animate")?;
    let save_frames = matches.is_present("save_frames");
    let mut rng = if matches.is_present("fix_random_seed") {
        StdRng::seed_from_u64(0)
    } else {
        StdRng::from_entropy()
    };

    tracing::info!("loading {}", input.display());
    let frames = load_frames(input)?;
    if let Some(mask) = &args.image_mask {
        let size = frames[0].dimensions();
        if mask.dimensions() != size {
            bail!(
                "image mask is {:?} but the input image is {:?}",
                mask.dimensions(),
                size
            );
        }
    }
    let animated_input = frames.len() > 1;

    let sorted = match animation {
        Some(mut animation) => {
            if animated_input {
                animation.steps = frames.len();
            }
            animation.run(&mut args, |i, args| {
                let frame = &frames[if animated_input { i } else { 0 }];
                sort_frame(frame, args, tiles.as_ref(), &mut rng)
            })?
        }
        None => frames
            .iter()
            .map(|frame| sort_frame(frame, &args, tiles.as_ref(), &mut rng))
            .collect::<anyhow::Result<Vec<_>>>()?,
    };

    if sorted.len() == 1 {
        sorted[0]
            .save(&output)
            .with_context(|| format!("failed to write {}", output.display()))?;
    } else {
        if save_frames {
            write_frames(&output, &sorted)?;
        }
        write_gif(&output, &sorted)?;
    }
    tracing::info!("wrote image to {}", output.display());
    Ok(())
}

fn sort_frame(
    image: &RgbImage,
    args: &SortingArgs,
    tiles: Option<&TileArgs>,
    rng: &mut StdRng,
) -> anyhow::Result<RgbImage> {
    let sorted = match tiles {
        Some(tiles) => {
            let pixels: Vec<Rgb<u8>> = image.pixels().copied().collect();
            let sorted = pixelsort::sort_tiles(&pixels, image.dimensions(), args, tiles, rng)?;
            pixelsort::from_pixels(image.dimensions(), &sorted)
        }
        None => pixelsort::sort_image(image, args, rng)?,
    };
    Ok(sorted)
}

fn sorting_args(matches: &ArgMatches<'_>) -> anyhow::Result<SortingArgs> {
    let path: pixelsort::Path = match matches.value_of("path") {
        Some(path) => path.parse()?,
        None if matches.is_present("vertical") => PathKind::Vertical.into(),
        None => PathKind::Horizontal.into(),
    };
    let image_mask = match matches.value_of_os("image_mask").map(Path::new) {
        Some(mask_path) => Some(
            image::open(mask_path)
                .with_context(|| format!("failed to read image mask {}", mask_path.display()))?
                .to_luma8(),
        ),
        None => None,
    };
    Ok(SortingArgs {
        max_interval: parse(matches, "max_interval")?.unwrap_or(0),
        randomize: matches.is_present("randomize"),
        reverse: matches.is_present("reverse"),
        sort_key: parse::<SortKey>(matches, "sortkey")?.unwrap_or_default(),
        discretize: parse(matches, "discretize")?.unwrap_or(0),
        progressive_amount: parse(matches, "progressive_amount")?.unwrap_or(0.0),
        splice: parse(matches, "splice")?.unwrap_or(0.0),
        splice_random: matches.is_present("splice_random"),
        path,
        mirror: matches.is_present("mirror"),
        edge_threshold: parse(matches, "edge_threshold")?.unwrap_or(0.0),
        image_threshold: parse(matches, "image_threshold")?,
        image_mask,
        channel: parse::<Channel>(matches, "channel")?,
    })
}

fn tile_args(matches: &ArgMatches<'_>) -> anyhow::Result<Option<TileArgs>> {
    if !matches.is_present("use_tiles") {
        return Ok(None);
    }
    let defaults = TileArgs::default();
    let tiles = TileArgs {
        width: parse(matches, "tile_x")?.unwrap_or(defaults.width),
        height: parse(matches, "tile_y")?.unwrap_or(defaults.height),
        density: parse(matches, "tile_density")?.unwrap_or(defaults.density),
        randomize: matches.is_present("randomize_tiles"),
    };
    if tiles.width == 0 || tiles.height == 0 {
        return Err(pixelsort::Error::InvalidTileSize {
            width: tiles.width,
            height: tiles.height,
        }
        .into());
    }
    Ok(Some(tiles))
}

fn parse<T>(matches: &ArgMatches<'_>, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    matches
        .value_of(name)
        .map(|value| {
            value
                .parse()
                .with_context(|| format!("invalid value `{}` for --{}", value, name.replace('_', "-")))
        })
        .transpose()
}

fn load_frames(input: &Path) -> anyhow::Result<Vec<RgbImage>> {
    let read_err = || format!("failed to read input image {}", input.display());
    if ImageFormat::from_path(input).ok() == Some(ImageFormat::Gif) {
        let file = File::open(input).with_context(read_err)?;
        let frames = GifDecoder::new(BufReader::new(file))
            .with_context(read_err)?
            .into_frames()
            .collect_frames()
            .with_context(read_err)?;
        if !frames.is_empty() {
            return Ok(frames
                .into_iter()
                .map(|frame| DynamicImage::ImageRgba8(frame.into_buffer()).to_rgb8())
                .collect());
        }
    }
    Ok(vec![image::open(input).with_context(read_err)?.to_rgb8()])
}

fn write_gif(output: &Path, frames: &[RgbImage]) -> anyhow::Result<()> {
    let write_err = || format!("failed to write {}", output.display());
    let file = File::create(output).with_context(write_err)?;
    let mut encoder = GifEncoder::new(file);
    for frame in frames {
        let rgba = DynamicImage::ImageRgb8(frame.clone()).to_rgba8();
        encoder
            .encode_frame(Frame::new(rgba))
            .with_context(write_err)?;
    }
    Ok(())
}

fn write_frames(output: &Path, frames: &[RgbImage]) -> anyhow::Result<()> {
    let name = output
        .file_name()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("frames");
    let dir = PathBuf::from(format!("{}_frames", output.display()));
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let digits = frames.len().to_string().len();
    for (i, frame) in frames.iter().enumerate() {
        let path = dir.join(format!("{}_frame_{:0width$}.png", name, i, width = digits));
        frame
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

fn print_paths_help() {
    println!(
        "Sorting paths specify in which direction pixels are sorted in the image.\n\
         By default, the path is 'horizontal'.\n\
         The syntax for specifying sort paths is: '<path-name> [arg1=val1 arg2=val2 ...]'.\n\n\
         The available path names are:"
    );
    for kind in PathKind::ALL {
        let params: Vec<String> = kind
            .params()
            .iter()
            .map(|p| format!("{}={}", p.name, p.default))
            .collect();
        let usage = if params.is_empty() {
            kind.name().to_owned()
        } else {
            format!("{} [{}]", kind.name(), params.join(" "))
        };
        println!(" - {:<32}{}", format!("{}:", usage), kind.description());
    }
}

fn arg_output() -> Arg<'static, 'static> {
    Arg::with_name("output")
        .short("o")
        .long("output")
        .help("A file path to save the output image to.")
        .takes_value(true)
}

fn arg_log() -> Arg<'static, 'static> {
    Arg::with_name("log")
        .long("log")
        .help("Prints out progress and other messages.")
}

fn arg_channel() -> Arg<'static, 'static> {
    Arg::with_name("channel")
        .long("channel")
        .help("Sort only one of the channels of this image.")
        .possible_values(&["red", "green", "blue"])
        .takes_value(true)
}

fn arg_discretize() -> Arg<'static, 'static> {
    Arg::with_name("discretize")
        .short("d")
        .long("discretize")
        .help("Bins sort keys into buckets of the given size.")
        .long_help(
            "Bins sort keys into buckets of the given size.\n\
             \n\
             Each key is divided by this amount and rounded down. Since sorting is stable,\n\
             pixels in the same bucket keep their order and small details are preserved.",
        )
        .takes_value(true)
}

fn arg_edge_threshold() -> Arg<'static, 'static> {
    Arg::with_name("edge_threshold")
        .short("e")
        .long("edge-threshold")
        .help("Stops sorting intervals at pixels whose edge strength exceeds this threshold.")
        .takes_value(true)
}

fn arg_image_threshold() -> Arg<'static, 'static> {
    Arg::with_name("image_threshold")
        .long("image-threshold")
        .help("Leaves pixels too dark or too bright unsorted, from 0 (sort all) to 1 (sort none).")
        .takes_value(true)
}

fn arg_image_mask() -> Arg<'static, 'static> {
    Arg::with_name("image_mask")
        .long("image-mask")
        .help("A file path to a gray image to mask parts of the input image.")
        .long_help(
            "A file path to a gray image to mask parts of the input image.\n\
             Bright pixels stop sorting intervals, dark pixels may be sorted.",
        )
        .takes_value(true)
}

fn arg_max_interval() -> Arg<'static, 'static> {
    Arg::with_name("max_interval")
        .short("i")
        .long("max-interval")
        .help("The size of each sorting interval in pixels, 0 sorts whole rows.")
        .long_help(
            "The size of each sorting interval in pixels, 0 sorts whole rows.\n\
             \n\
             If intervals are randomized, this is the maximum size of an interval.",
        )
        .takes_value(true)
}

fn arg_mirror() -> Arg<'static, 'static> {
    Arg::with_name("mirror")
        .short("m")
        .long("mirror")
        .help("Make sorted intervals symmetric from start to end.")
}

fn arg_path() -> Arg<'static, 'static> {
    Arg::with_name("path")
        .short("p")
        .long("path")
        .help("The type of path used to sort over the image, see --help-paths.")
        .takes_value(true)
}

fn arg_help_paths() -> Arg<'static, 'static> {
    Arg::with_name("help_paths")
        .long("help-paths")
        .help("Display info about sorting paths.")
}

fn arg_progressive_amount() -> Arg<'static, 'static> {
    Arg::with_name("progressive_amount")
        .long("progressive-amount")
        .help("How fast intervals grow along a row, as a ratio of the max interval.")
        .takes_value(true)
}

fn arg_randomize() -> Arg<'static, 'static> {
    Arg::with_name("randomize")
        .short("r")
        .long("randomize")
        .help("Whether to randomize pixel-sorting intervals.")
}

fn arg_reverse() -> Arg<'static, 'static> {
    Arg::with_name("reverse")
        .short("R")
        .long("reverse")
        .help("Whether to reverse pixel-sorting order.")
}

fn arg_sortkey() -> Arg<'static, 'static> {
    Arg::with_name("sortkey")
        .short("s")
        .long("sortkey")
        .help("Function applied to pixels to sort them.")
        .possible_values(SortKey::NAMES)
        .default_value("identity")
        .takes_value(true)
}

fn arg_splice() -> Arg<'static, 'static> {
    Arg::with_name("splice")
        .short("S")
        .long("splice")
        .help("Moves this fraction of each sorted interval from its start to its end.")
        .long_help(
            "Moves this fraction of each sorted interval from its start to its end.\n\
             \n\
             A value of 0 means no splicing is done, and 1 means all elements up to the last are moved.",
        )
        .takes_value(true)
}

fn arg_splice_random() -> Arg<'static, 'static> {
    Arg::with_name("splice_random")
        .long("splice-random")
        .help("Randomly chooses the splice point, see --splice.")
}

fn arg_vertical() -> Arg<'static, 'static> {
    Arg::with_name("vertical")
        .short("v")
        .long("vertical")
        .help("Whether to pixel-sort vertically instead of horizontally.")
        .conflicts_with("path")
}

fn arg_use_tiles() -> Arg<'static, 'static> {
    Arg::with_name("use_tiles")
        .long("use-tiles")
        .help("Whether to sort the image in tiles.")
}

fn arg_tile_x() -> Arg<'static, 'static> {
    Arg::with_name("tile_x")
        .long("tile-x")
        .help("The width of each tile, in pixels.")
        .default_value("100")
        .takes_value(true)
}

fn arg_tile_y() -> Arg<'static, 'static> {
    Arg::with_name("tile_y")
        .long("tile-y")
        .help("The height of each tile, in pixels.")
        .default_value("100")
        .takes_value(true)
}

fn arg_randomize_tiles() -> Arg<'static, 'static> {
    Arg::with_name("randomize_tiles")
        .long("randomize-tiles")
        .help("Whether to distribute tiles randomly.")
}

fn arg_tile_density() -> Arg<'static, 'static> {
    Arg::with_name("tile_density")
        .long("tile-density")
        .help("Approximately what fraction of the image is covered in tiles.")
        .default_value("1.0")
        .takes_value(true)
}

fn arg_animate() -> Arg<'static, 'static> {
    Arg::with_name("animate")
        .long("animate")
        .help("Animate a sorting parameter: '<param> <start> <stop> <n_steps>'.")
        .long_help(
            "Animate a sorting parameter: '<param> <start> <stop> <n_steps>'.\n\
             \n\
             Path parameters are addressed as `path.<name>`, e.g. 'path.angle 0 90 10'.\n\
             For animated GIF input the number of steps is the number of frames.",
        )
        .takes_value(true)
}

fn arg_save_frames() -> Arg<'static, 'static> {
    Arg::with_name("save_frames")
        .long("save-frames")
        .help("Whether to save animation frames as individual pictures.")
}

fn arg_fix_random_seed() -> Arg<'static, 'static> {
    Arg::with_name("fix_random_seed")
        .long("fix-random-seed")
        .help("Seed the random generator with 0. Useful for testing and debugging.")
}
