//! ImgFS command-line tool
//!
//! Create, inspect and modify a container file directly, without going
//! through the HTTP frontend. Every command opens the container, runs a
//! single operation and exits; the exit code is non-zero on any error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use imgfs::container::MAX_IMG_ID;
use imgfs::{Container, CreateConfig, ImgFsError, ListMode, Resolution};

/// ImgFS command-line tool
#[derive(Parser, Debug)]
#[command(name = "imgfscmd")]
#[command(about = "Single-file image store tool")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the contents of a container
    List {
        /// The container file
        file: PathBuf,
    },

    /// Create a new, empty container
    Create {
        /// The container file to create (overwritten if present)
        file: PathBuf,

        /// Maximum number of stored images
        #[arg(long = "max_files", default_value_t = 128)]
        max_files: u32,

        /// Thumbnail resolution (width height, at most 128 128)
        #[arg(long = "thumb_res", num_args = 2, value_names = ["WIDTH", "HEIGHT"],
              default_values_t = [64, 64])]
        thumb_res: Vec<u16>,

        /// Small resolution (width height, at most 512 512)
        #[arg(long = "small_res", num_args = 2, value_names = ["WIDTH", "HEIGHT"],
              default_values_t = [256, 256])]
        small_res: Vec<u16>,
    },

    /// Read an image and save it next to the current directory
    Read {
        /// The container file
        file: PathBuf,

        /// The image to read
        img_id: String,

        /// Resolution: orig|original|small|thumb|thumbnail
        #[arg(default_value = "original")]
        resolution: String,
    },

    /// Insert an image from disk
    Insert {
        /// The container file
        file: PathBuf,

        /// Identifier for the new image
        img_id: String,

        /// Path of the JPEG to insert
        image_path: PathBuf,
    },

    /// Delete an image
    Delete {
        /// The container file
        file: PathBuf,

        /// The image to delete
        img_id: String,
    },
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> imgfs::Result<()> {
    match args.command {
        Commands::List { file } => {
            let container = Container::open(&file, false)?;
            container.list(ListMode::Stdout)?;
            Ok(())
        }

        Commands::Create {
            file,
            max_files,
            thumb_res,
            small_res,
        } => {
            let config = CreateConfig::default()
                .max_files(max_files)
                .thumb_res(thumb_res[0], thumb_res[1])
                .small_res(small_res[0], small_res[1]);

            let container = Container::create(&file, &config)?;
            println!("{} item(s) written", 1 + container.header().nb_files);
            Ok(())
        }

        Commands::Read {
            file,
            img_id,
            resolution,
        } => {
            validate_img_id(&img_id)?;
            let resolution: Resolution = resolution.parse()?;

            // read-write: the first request for a derived resolution
            // materializes it inside the container
            let mut container = Container::open(&file, true)?;
            let image = container.read(&img_id, resolution)?;

            let out_name = format!("{img_id}{}.jpg", resolution.suffix());
            std::fs::write(&out_name, &image)?;
            println!("saved {} byte(s) to {out_name}", image.len());
            Ok(())
        }

        Commands::Insert {
            file,
            img_id,
            image_path,
        } => {
            validate_img_id(&img_id)?;
            let image = std::fs::read(&image_path)?;

            let mut container = Container::open(&file, true)?;
            container.insert(&image, &img_id)
        }

        Commands::Delete { file, img_id } => {
            validate_img_id(&img_id)?;
            let mut container = Container::open(&file, true)?;
            container.delete(&img_id)
        }
    }
}

/// Reject empty or over-long identifiers before touching the container
fn validate_img_id(img_id: &str) -> imgfs::Result<()> {
    if img_id.is_empty() || img_id.len() > MAX_IMG_ID {
        return Err(ImgFsError::InvalidImgId(img_id.to_string()));
    }
    Ok(())
}
