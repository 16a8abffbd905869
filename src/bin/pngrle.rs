use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use pngrle::archive::{self, ArchiveCodec, ArchiveOptions};
use pngrle::png::{self, ReadOptions};

#[derive(Parser)]
#[command(about = "Store the image data of PNG files in RLE compressed .samet archives.")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Store archive bodies uncompressed (the original .samet layout).
    #[arg(long, global = true)]
    raw: bool,

    /// Reject PNG chunks whose CRC does not match.
    #[arg(long, global = true)]
    verify_crc: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Read a PNG file and write a .samet archive.
    Compress {
        /// PNG file; `.png` is appended when missing.
        input: PathBuf,

        /// Archive name; `.samet` is appended when missing.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Read a .samet archive and write a PNG file.
    Decompress {
        /// Archive file; `.samet` is appended when missing.
        input: PathBuf,

        /// PNG file to write (default: `<input>_decompressed.png`).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

struct Settings {
    read: ReadOptions,
    archive: ArchiveOptions,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            read: ReadOptions {
                verify_crc: self.verify_crc,
            },
            archive: ArchiveOptions {
                codec: if self.raw {
                    ArchiveCodec::Raw
                } else {
                    ArchiveCodec::Rle
                },
            },
        }
    }
}

/// PNG input and archive output, extensions filled in.
fn compress_paths(input: PathBuf, output: Option<PathBuf>) -> (PathBuf, PathBuf) {
    let input = png::with_png_extension(input);
    let output = archive::archive_path(output.unwrap_or_else(|| input.with_extension("")));
    (input, output)
}

/// Archive input and PNG output, extensions filled in.
fn decompress_paths(input: PathBuf, output: Option<PathBuf>) -> (PathBuf, PathBuf) {
    let input = archive::archive_path(input);
    let output = output.unwrap_or_else(|| archive::decompressed_png_path(&input));
    (input, output)
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();
    let settings = args.settings();

    match args.command {
        Some(Command::Compress { input, output }) => {
            let (input, output) = compress_paths(input, output);
            compress(&input, &output, &settings)
        }
        Some(Command::Decompress { input, output }) => {
            let (input, output) = decompress_paths(input, output);
            decompress(&input, &output, &settings)
        }
        None => menu(&settings),
    }
}

fn compress(input: &Path, output: &Path, settings: &Settings) -> Result<()> {
    let image = png::read_file(input, &settings.read)
        .with_context(|| format!("failed to load PNG image {}", input.display()))?;
    info!(
        "{}: {}x{} {}, {} payload bytes",
        input.display(),
        image.width(),
        image.height(),
        image.info.color_type,
        image.payload.len()
    );

    let output = archive::archive_path(output);
    archive::save_archive(&output, &image, &settings.archive)
        .with_context(|| format!("failed to write archive {}", output.display()))?;

    let original = image.payload.len();
    let compressed = fs::metadata(&output)
        .with_context(|| format!("failed to stat {}", output.display()))?
        .len();
    println!("Image compressed and saved as {}", output.display());
    println!("Original size: {original} bytes");
    println!("Compressed size: {compressed} bytes");
    if original > 0 {
        println!(
            "Compression ratio: {:.2}%",
            100.0 * compressed as f64 / original as f64
        );
    }
    Ok(())
}

fn decompress(input: &Path, output: &Path, settings: &Settings) -> Result<()> {
    let image = archive::load_archive(input, &settings.archive)
        .with_context(|| format!("failed to load archive {}", input.display()))?;
    info!(
        "{}: {}x{} with {} channels, {} payload bytes",
        input.display(),
        image.width(),
        image.height(),
        image.channels(),
        image.payload.len()
    );

    png::write_file(output, &image)
        .with_context(|| format!("failed to write PNG image {}", output.display()))?;
    println!("Image decompressed and saved as {}", output.display());
    Ok(())
}

fn menu(settings: &Settings) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut prompt = |text: &str| -> Result<Option<String>> {
        print!("{text}");
        io::stdout().flush()?;
        Ok(match lines.next() {
            Some(line) => Some(line?.trim().to_string()),
            None => None,
        })
    };

    loop {
        println!();
        println!("Image Compression Menu");
        println!("1. Compress Image");
        println!("2. Decompress Image");
        println!("3. Exit");
        let Some(choice) = prompt("Enter your choice (1-3): ")? else {
            return Ok(());
        };

        let outcome = match choice.as_str() {
            "1" => {
                let Some(input) = prompt("Enter PNG filename to compress (with or without .png): ")?
                else {
                    return Ok(());
                };
                let Some(output) = prompt("Enter output filename (without extension): ")? else {
                    return Ok(());
                };
                compress(&png::with_png_extension(input), Path::new(&output), settings)
            }
            "2" => {
                let Some(input) = prompt("Enter compressed file name (.samet): ")? else {
                    return Ok(());
                };
                let input = archive::archive_path(input);
                ensure_exists(&input)
                    .and_then(|()| decompress(&input, &archive::decompressed_png_path(&input), settings))
            }
            "3" => {
                println!("Exiting...");
                return Ok(());
            }
            _ => {
                println!("Invalid choice! Please enter a number between 1-3.");
                continue;
            }
        };

        if let Err(err) = outcome {
            println!("Error: {err:#}");
        }
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file '{}' not found", path.display());
    }
    Ok(())
}
