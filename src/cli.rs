// Person From Vid CLI binary

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use personfromvid::config::{load_config, Config, ConfigFormat};
use personfromvid::constants;
use personfromvid::data::{CloseupDetection, FrameData, HeadPoseResult, ProcessingContext};
use personfromvid::logging::init_logging;
use personfromvid::naming::NamingEngine;

#[derive(Parser)]
#[command(name = "personfromvid")]
#[command(about = "Person From Vid - pipeline configuration and output naming", long_about = None)]
#[command(version)]
struct Cli {
    /// Force debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

impl From<OutputFormat> for ConfigFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => ConfigFormat::Yaml,
            OutputFormat::Json => ConfigFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Show {
        /// Config file (YAML or JSON); defaults plus environment if absent
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override a field, e.g. --set models.batch_size=4
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
        #[arg(long, value_enum, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Write the default configuration to a file
    Init {
        /// Destination (.yaml, .yml or .json)
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Load a config file and report validation errors
    Validate {
        path: PathBuf,
    },

    /// Create working directories and run the pre-flight checks
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },

    /// Preview output filenames for a frame
    Name {
        /// Filename prefix (usually the video stem)
        #[arg(long)]
        base: String,
        #[arg(long, default_value = "")]
        category: String,
        /// Head direction label of the frame
        #[arg(long)]
        direction: Option<String>,
        /// Shot type label of the frame
        #[arg(long)]
        shot_type: Option<String>,
        /// Produce face crop names for this head angle instead of full frames
        #[arg(long)]
        face_angle: Option<String>,
        #[arg(long, default_value = "1")]
        rank: u32,
        #[arg(long, default_value = constants::DEFAULT_IMAGE_EXTENSION)]
        ext: String,
        /// How many names to generate (repeats show collision handling)
        #[arg(long, default_value = "1")]
        count: u32,
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { config, overrides, format } => {
            let cfg = resolve_config(config.as_deref(), &overrides, cli.verbose)?;
            cmd_show(&cfg, format)
        }
        Commands::Init { path, force } => {
            start_logging(&Config::default(), cli.verbose)?;
            cmd_init(path, force)
        }
        Commands::Validate { path } => {
            start_logging(&Config::default(), cli.verbose)?;
            cmd_validate(path)
        }
        Commands::Check { config, overrides } => {
            let cfg = resolve_config(config.as_deref(), &overrides, cli.verbose)?;
            cmd_check(&cfg)
        }
        Commands::Name {
            base,
            category,
            direction,
            shot_type,
            face_angle,
            rank,
            ext,
            count,
            output_dir,
        } => {
            start_logging(&Config::default(), cli.verbose)?;
            cmd_name(
                ProcessingContext::new(base, output_dir),
                &category,
                direction,
                shot_type,
                face_angle,
                rank,
                &ext,
                count,
            )
        }
    }
}

/// Load config, apply --set overrides and --verbose, then start logging.
fn resolve_config(path: Option<&Path>, overrides: &[String], verbose: bool) -> Result<Config> {
    let mut config = load_config(path)?;

    for entry in overrides {
        let (key, value) = entry
            .split_once('=')
            .with_context(|| format!("Override must look like KEY=VALUE: {}", entry))?;
        config.set(key, value)?;
    }

    let config = with_verbose(config, verbose)?;
    init_logging(&config)?;
    Ok(config)
}

/// Start logging for subcommands that do not load a config up front.
fn start_logging(config: &Config, verbose: bool) -> Result<()> {
    init_logging(&with_verbose(config.clone(), verbose)?)?;
    Ok(())
}

fn with_verbose(mut config: Config, verbose: bool) -> Result<Config> {
    if verbose {
        config.update(|s| s.logging.verbose = true)?;
    }
    Ok(config)
}

fn cmd_show(config: &Config, format: OutputFormat) -> Result<()> {
    print!("{}", config.render(format.into())?);
    Ok(())
}

fn cmd_init(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    Config::default().to_file(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn cmd_validate(path: PathBuf) -> Result<()> {
    let config = Config::from_file(&path)?;
    println!("{} is valid", path.display());
    println!("  Device:        {}", config.models.device.as_str());
    println!("  Batch size:    {}", config.models.batch_size);
    println!("  Workers:       {}", config.processing.parallel_workers);
    println!("  Image format:  {}", config.output.image.format.extension());
    println!("  Cache:         {}", config.storage.cache_directory.display());
    Ok(())
}

fn cmd_check(config: &Config) -> Result<()> {
    config.create_directories()?;
    println!("Cache directory: {}", config.storage.cache_directory.display());
    if let Some(temp) = &config.storage.temp_directory {
        println!("Temp directory:  {}", temp.display());
    }

    let issues = config.validate_system_requirements();
    if issues.is_empty() {
        println!("System check passed");
        return Ok(());
    }

    println!("System check found {} issue(s):", issues.len());
    for issue in &issues {
        println!("  - {}", issue);
    }
    std::process::exit(1);
}

#[allow(clippy::too_many_arguments)]
fn cmd_name(
    context: ProcessingContext,
    category: &str,
    direction: Option<String>,
    shot_type: Option<String>,
    face_angle: Option<String>,
    rank: u32,
    ext: &str,
    count: u32,
) -> Result<()> {
    let mut frame = FrameData::new("cli");
    if direction.is_some() {
        frame.head_poses.push(HeadPoseResult {
            confidence: 1.0,
            direction,
            ..Default::default()
        });
    }
    if shot_type.is_some() {
        frame.closeup_detections.push(CloseupDetection {
            shot_type,
            confidence: 1.0,
            face_area_ratio: 0.0,
        });
    }

    let mut naming = NamingEngine::new(&context);
    for _ in 0..count {
        let filename = match &face_angle {
            Some(angle) => naming.get_face_crop_filename(&frame, angle, rank, ext)?,
            None => naming.get_full_frame_filename(&frame, category, rank, ext)?,
        };
        let valid = if naming.validate_filename(&filename) { "" } else { "  (invalid)" };
        println!("{}{}", naming.get_full_output_path(&filename).display(), valid);
    }

    Ok(())
}
