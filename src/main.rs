use clap::{Parser, Subcommand};
use course_cover::config::{self, CoverConfig};
use course_cover::imaging::{self, RustCodec};
use course_cover::output;
use course_cover::pipeline::{ImageTransformPipeline, TransformedUpload, UploadCandidate};
use course_cover::upload::UploadField;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "course-cover")]
#[command(about = "Square cover photos for course registration")]
#[command(long_about = "\
Square cover photos for course registration

Takes the photo picked for a course and produces the cover image the
registration form expects: a 1080x1080 JPEG, scaled to fill the square
and centre-cropped, with transparent areas flattened onto white.

Accepted uploads (checked in this order, first failure wins):
  Format:  image/jpeg, image/png, image/jpg, image/bmp
  Size:    at most 5 MB

The declared format is taken from the file extension unless --media-type
is given. All limits can be changed in course-cover.toml.

Run 'course-cover gen-config' to generate a documented course-cover.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./course-cover.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transform an image into a square cover photo
    Transform {
        /// Image to transform
        input: PathBuf,
        /// Where to write the JPEG (default: <name>-cover.jpg next to the input)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Declared media type, overriding the one implied by the extension
        #[arg(long)]
        media_type: Option<String>,
        /// Give up if the transform takes longer than this
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Show dimensions, format and size of an image
    Info {
        input: PathBuf,
    },
    /// Validate an image against upload limits and minimum dimensions
    Check {
        input: PathBuf,
        /// Declared media type, overriding the one implied by the extension
        #[arg(long)]
        media_type: Option<String>,
    },
    /// Print a stock course-cover.toml with all options documented
    GenConfig,
}

/// JSON report for a completed transform.
#[derive(Serialize)]
struct TransformReport<'a> {
    #[serde(flatten)]
    upload: &'a TransformedUpload,
    output: &'a Path,
    bytes: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Transform {
            input,
            output: output_path,
            media_type,
            timeout_secs,
        } => {
            let config = resolve_config(cli.config.as_deref())?;
            let spec = config.target_spec()?;
            let pipeline = ImageTransformPipeline::new(RustCodec::new(), config.upload_limits());
            let candidate = UploadCandidate::read(&input, media_type.as_deref()).await?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_upload_event(&event);
                }
            });

            let mut field = UploadField::new((!cli.json).then_some(tx));
            let selected = field.select(vec![candidate], &pipeline, &spec);
            let outcome = match timeout_secs {
                Some(secs) => tokio::time::timeout(Duration::from_secs(secs), selected)
                    .await
                    .map_err(|_| format!("transform timed out after {}s", secs))?,
                None => selected.await,
            };
            let upload = field.take();
            drop(field);
            printer
                .join()
                .map_err(|_| "output printer thread panicked")?;
            outcome?;

            let upload = upload.ok_or("transform produced no image")?;
            let out = output_path.unwrap_or_else(|| input.with_file_name(upload.suggested_file_name()));
            tokio::fs::write(&out, &upload.bytes).await?;

            if cli.json {
                let report = TransformReport {
                    upload: &upload,
                    output: &out,
                    bytes: upload.byte_length(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("==> Wrote {}", out.display());
            }
        }
        Command::Info { input } => {
            let bytes = tokio::fs::read(&input).await?;
            let info = imaging::image_info(&RustCodec::new(), &bytes)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                output::print_image_info(&display_name(&input), &info);
            }
        }
        Command::Check { input, media_type } => {
            let config = resolve_config(cli.config.as_deref())?;
            let candidate = UploadCandidate::read(&input, media_type.as_deref()).await?;

            let mut problems = Vec::new();
            if let Err(e) = config.upload_limits().check(&candidate) {
                problems.push(output::user_message(&e));
            }
            let info = match imaging::image_info(&RustCodec::new(), &candidate.bytes) {
                Ok(info) => {
                    if let Err(e) = imaging::validate_dimensions(&info, config.validation.min_edge) {
                        problems.push(e.to_string());
                    }
                    Some(info)
                }
                Err(e) => {
                    problems.push(format!("Could not decode image: {}", e));
                    None
                }
            };

            output::print_check_output(&candidate.name, info.as_ref(), &problems);
            if !problems.is_empty() {
                return Err(format!("{} failed {} check(s)", candidate.name, problems.len()).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the explicit config file, or `./course-cover.toml` when present.
///
/// An explicitly named file must exist; the implicit one is optional.
fn resolve_config(explicit: Option<&Path>) -> Result<CoverConfig, Box<dyn std::error::Error>> {
    match explicit {
        Some(path) if !path.exists() => {
            Err(format!("config file not found: {}", path.display()).into())
        }
        Some(path) => Ok(config::load_config(path)?),
        None => Ok(config::load_config(Path::new(config::DEFAULT_CONFIG_FILE))?),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
