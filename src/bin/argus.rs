//! Thin CLI dispatcher (C13): parses a subcommand, calls into `argus_vlf`, prints one JSON
//! object, and sets the process exit code. All actual work happens in the library.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use argus_vlf::config::TemplateDirs;
use argus_vlf::{codec, error::Error};

#[derive(Parser)]
#[command(name = "argus", about = "Low-bandwidth colour-chart codec")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a reusable template from a source chart image.
    CreateTemplate {
        image: PathBuf,
        name: String,
        scale_x0: u32,
        scale_y0: u32,
        scale_x1: u32,
        scale_y1: u32,
        crop_top: u32,
        crop_bottom: u32,
        crop_left: u32,
        crop_right: u32,
    },
    /// Compress a chart image into a VLF text message.
    Compress {
        image: PathBuf,
        template: String,
        dtg: String,
        output: PathBuf,
    },
    /// Decompress a VLF text message back into a chart image.
    Decompress {
        message: PathBuf,
        output: PathBuf,
        template: Option<String>,
    },
    /// List every template discoverable in the resolved template directories.
    ListTemplates,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            print_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Error> {
    let dirs = TemplateDirs::resolve()?;

    match command {
        Command::CreateTemplate {
            image,
            name,
            scale_x0,
            scale_y0,
            scale_x1,
            scale_y1,
            crop_top,
            crop_bottom,
            crop_left,
            crop_right,
        } => {
            let b = (
                scale_y0.min(scale_y1),
                scale_y0.max(scale_y1),
                scale_x0.min(scale_x1),
                scale_x0.max(scale_x1),
            );
            let cr = (crop_top, crop_bottom, crop_left, crop_right);
            let result = codec::create_template(&dirs, &image, &name, b, cr)?;
            print_success(&result);
        }
        Command::Compress {
            image,
            template,
            dtg,
            output,
        } => {
            let result = codec::compress(&dirs, &image, &template, &dtg, &output)?;
            print_success(&result);
        }
        Command::Decompress {
            message,
            output,
            template,
        } => {
            let result = codec::decompress(&dirs, &message, &output, template.as_deref())?;
            print_success(&result);
        }
        Command::ListTemplates => {
            let names = codec::list_templates(&dirs);
            print_success(&json!({ "templates": names }));
        }
    }

    Ok(())
}

fn print_success<T: Serialize>(result: &T) {
    let mut value = serde_json::to_value(result).unwrap_or_else(|_| json!({}));
    if let Some(obj) = value.as_object_mut() {
        obj.insert("status".to_string(), json!("success"));
    }
    println!("{value}");
}

fn print_error(message: &str) {
    println!("{}", json!({ "status": "error", "error": message }));
}
