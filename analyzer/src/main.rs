use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use imscan::formats::{bmp, gif, jpeg, pcx, png, tiff};
use imscan::{
    FileHandle, GenericMetadata, LoadableMetadata, Locale, Messages, ScanOptions, Scanner,
};

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum Format {
    Text,
    Html,
    Json,
}

/// Loads image files and displays a table of their dimensions, resolution,
/// color depth and compression.
#[derive(Parser, Debug)]
#[command(name = "imscan", version, about, long_about = None)]
struct Args {
    /// folders or image files to scan
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// output format of the table
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// language of the table and prompts (en, ru)
    #[arg(short, long, default_value = "en")]
    locale: Locale,
    /// JSON file with message overrides; missing keys fall back to English
    #[arg(long)]
    messages: Option<PathBuf>,
    /// number of worker threads
    #[arg(short, long)]
    jobs: Option<usize>,
    /// refuse to read files larger than this many bytes
    #[arg(long)]
    max_file_size: Option<u64>,
    /// only scan the top level of folders
    #[arg(long, action)]
    no_recursive: bool,
    /// also print what the format decoders found in each file
    #[arg(short, long, action)]
    details: bool,
    /// more log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("imscan: {:#}", e);
            process::exit(2);
        }
    }
}

fn run(args: Args) -> anyhow::Result<i32> {
    let messages = match args.messages {
        Some(ref path) => Messages::from_json_file(path)
            .with_context(|| format!("cannot load messages from {}", path.display()))?,
        None => Messages::for_locale(args.locale),
    };

    let files = imscan::collect_paths(&args.paths, !args.no_recursive)
        .context("cannot list input files")?;
    let accepted = imscan::classify(files);
    eprintln!("{}", messages.files_selected(accepted.len()));

    if accepted.is_empty() {
        eprintln!("{}", messages.select_files_first);
        return Ok(1);
    }

    let scanner = Scanner::new(ScanOptions {
        jobs: args.jobs,
        max_file_bytes: args.max_file_size,
    })
    .context("cannot start worker threads")?;

    eprintln!("{}", messages.analyzing);
    let records = scanner.scan(&accepted);

    let output = match args.format {
        Format::Text => imscan::present(&records, &messages).to_text(),
        Format::Html => imscan::present(&records, &messages).to_html(),
        Format::Json => imscan::table::to_json(&records)?,
    };
    print!("{}", output);

    if args.details {
        for file in &accepted {
            print_details(file);
        }
    }

    Ok(0)
}

fn print_details(file: &imscan::DiskFile) {
    println!();
    println!("{}:", file.path().display());

    let data = match file.read_bytes(None) {
        Ok(data) => data,
        Err(e) => {
            println!("  Cannot read file: {}", e);
            return;
        }
    };

    if imscan::Strategy::for_name(file.name()) == imscan::Strategy::Tiff {
        match tiff::Metadata::load_from_buf(&data) {
            Ok(md) => print_tiff_metadata(&md),
            Err(e) => println!("  Cannot load TIFF metadata: {}", e),
        }
        return;
    }

    match imscan::generic::load_from_buf(&data) {
        Ok(GenericMetadata::Jpeg(md)) => print_jpeg_metadata(&md),
        Ok(GenericMetadata::Png(md)) => print_png_metadata(&md),
        Ok(GenericMetadata::Gif(md)) => print_gif_metadata(&md),
        Ok(GenericMetadata::Bmp(md)) => print_bmp_metadata(&md),
        Ok(GenericMetadata::Pcx(md)) => print_pcx_metadata(&md),
        Err(e) => println!("  Cannot load image metadata: {}", e),
    }
}

fn print_jpeg_metadata(md: &jpeg::Metadata) {
    println!("  JPEG image:");
    println!("    Width: {}", md.dimensions.width);
    println!("    Height: {}", md.dimensions.height);
    println!("    Sample precision: {}", md.sample_precision);
    println!("    Components: {}", md.components);
    println!("    Baseline: {}", md.baseline());
    println!("    Differential: {}", md.differential);
    println!("    Entropy coding: {}", md.entropy_coding);
    println!("    Coding process: {}", md.coding_process);
    match md.exif {
        Some(ref exif) => match imscan::exif::ExifResolution::parse(exif) {
            Ok(res) => println!("    EXIF resolution: {:?} x {:?} ({:?})", res.x, res.y, res.unit),
            Err(e) => println!("    EXIF block unreadable: {}", e),
        },
        None => println!("    EXIF block: none"),
    }
}

fn print_png_metadata(md: &png::Metadata) {
    println!("  PNG image:");
    println!("    Width: {}", md.dimensions.width);
    println!("    Height: {}", md.dimensions.height);
    println!("    Color type: {}", md.color_type);
    println!("    Color depth: {} bpp", md.color_depth);
    println!("    Interlace method: {}", md.interlace_method);
}

fn print_gif_metadata(md: &gif::Metadata) {
    println!("  GIF image:");
    println!("    Version: {}", md.version);
    println!("    Width: {}", md.dimensions.width);
    println!("    Height: {}", md.dimensions.height);
    if let Some(ref table) = md.global_color_table {
        println!("    Global color table: {} colors{}", table.size, if table.sorted { ", sorted" } else { "" });
    }
    println!("    Color resolution: {} colors", md.color_resolution);
    if let Some(ratio) = md.pixel_aspect_ratio_approx() {
        println!("    Pixel aspect ratio: {:.3}", ratio);
    }
    println!("    Frames: {}{}", md.frames.len(), if md.is_animated() { " (animated)" } else { "" });
}

fn print_bmp_metadata(md: &bmp::Metadata) {
    println!("  BMP image:");
    println!("    Width: {}", md.dimensions.width);
    println!("    Height: {}", md.dimensions.height);
    println!("    Top-down: {}", md.top_down);
    println!("    Bits per pixel: {}", md.bits_per_pixel);
    println!("    Compression: {}", md.compression);
    if let Some((x, y)) = md.pixels_per_meter {
        println!("    Pixels per meter: {} x {}", x, y);
    }
}

fn print_pcx_metadata(md: &pcx::Metadata) {
    println!("  PCX image:");
    println!("    Version: {}", md.version);
    println!("    Width: {}", md.dimensions.width);
    println!("    Height: {}", md.dimensions.height);
    println!("    Encoding: {}", if md.rle { "RLE" } else { "none" });
    println!("    Color depth: {} bpp ({} planes)", md.color_depth(), md.color_planes);
    println!("    DPI fields: {} x {}", md.dpi.0, md.dpi.1);
}

fn print_tiff_metadata(md: &tiff::Metadata) {
    println!("  TIFF image:");
    println!("    Byte order: {:?}", md.byte_order);
    println!("    Width: {}", md.dimensions.width);
    println!("    Height: {}", md.dimensions.height);
    println!("    Bits per sample: {:?}", md.bits_per_sample);
    println!("    Compression: {}", md.compression);
    println!("    Resolution: {:?} x {:?} ({:?})", md.x_resolution, md.y_resolution, md.resolution_unit);
    println!("    Directories: {}", md.ifd_count);
}
