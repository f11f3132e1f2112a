//! Q4X light show parser CLI
//!
//! A command-line interface for inspecting, validating, and unpacking Q4X
//! window light show files.
//!
//! ## Commands
//!
//! - `info` - Display container metadata
//! - `parse` - Decode the full timeline with output format options
//! - `validate` - Validate a show (exit codes for scripting)
//! - `dump` - Write the decompressed QPR animation stream
//! - `extract-audio` - Copy the embedded soundtrack out of the container

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use q4x_parser::container::Container;
use q4x_parser::timeline::TimelineSummary;
use q4x_parser::{
    decode_animation, AudioFormat, DecoderConfig, DurationCorrection, ParserError, Timeline,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Q4X window light show parser
#[derive(Parser)]
#[command(name = "q4x-parser")]
#[command(about = "Q4X window light show parser", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON decoder configuration (matrix size, runtime cap)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log stage details to stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display container information
    Info {
        /// Path to the show file
        file: PathBuf,
    },
    /// Decode a show file
    Parse {
        /// Path to the show file
        file: PathBuf,
        /// Output format: json, pretty
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
        /// Include per-frame durations
        #[arg(long)]
        frames: bool,
        /// Include duration corrections
        #[arg(long)]
        corrections: bool,
    },
    /// Validate show format
    Validate {
        /// Path to the show file
        file: PathBuf,
        /// Verbose error reporting
        #[arg(long)]
        details: bool,
    },
    /// Write the decompressed animation stream to a file
    Dump {
        /// Path to the show file
        file: PathBuf,
        /// Output path
        #[arg(default_value = "animation.qpr")]
        output: PathBuf,
    },
    /// Write the embedded soundtrack to a file
    ExtractAudio {
        /// Path to the show file
        file: PathBuf,
        /// Output path; the extension is chosen from the audio format when omitted
        output: Option<PathBuf>,
    },
}

/// Output format options
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

// ============================================================================
// Serializable Output Structures
// ============================================================================

#[derive(Serialize)]
struct ParseOutput {
    container: ContainerInfo,
    animation: AnimationInfo,
    timeline: TimelineSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    frames: Option<Vec<FrameInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    corrections: Option<Vec<DurationCorrection>>,
}

#[derive(Serialize)]
struct ContainerInfo {
    version: String,
    file_size: usize,
    width: u16,
    height: u16,
    primary_block_size: usize,
    animation_block_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_format: Option<AudioFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_size: Option<usize>,
}

#[derive(Serialize)]
struct AnimationInfo {
    name: String,
    audio_flag: String,
    declared_duration_ms: u64,
    stream_size: usize,
    header_size: usize,
}

#[derive(Serialize)]
struct FrameInfo {
    index: usize,
    duration_secs: f64,
}

// ============================================================================
// Validation Result Structure
// ============================================================================

struct ValidationResult {
    container_valid: bool,
    decompression_valid: bool,
    animation_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn is_valid(&self) -> bool {
        self.container_valid && self.decompression_valid && self.animation_valid
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Info { file } => cmd_info(&file, &config),
        Commands::Parse {
            file,
            output,
            frames,
            corrections,
        } => cmd_parse(&file, &config, &output, frames, corrections),
        Commands::Validate { file, details } => cmd_validate(&file, &config, details),
        Commands::Dump { file, output } => cmd_dump(&file, &config, &output),
        Commands::ExtractAudio { file, output } => cmd_extract_audio(&file, &config, output),
    }
}

fn load_config(path: Option<&Path>) -> Result<DecoderConfig, ParserError> {
    match path {
        Some(path) => DecoderConfig::from_json_file(path),
        None => Ok(DecoderConfig::default()),
    }
}

fn read_container(file: &Path, config: &DecoderConfig) -> Result<(Container, usize), ParserError> {
    let data = std::fs::read(file)?;
    let container = Container::parse(&data, config)?;
    Ok((container, data.len()))
}

fn container_info(container: &Container, file_size: usize) -> ContainerInfo {
    ContainerInfo {
        version: container.version.to_string(),
        file_size,
        width: container.width,
        height: container.height,
        primary_block_size: container.primary_block.len,
        animation_block_size: container.animation_block.len(),
        audio_format: container.audio.as_ref().map(|a| a.format),
        audio_size: container.audio.as_ref().map(|a| a.len()),
    }
}

// ============================================================================
// Info Command Implementation
// ============================================================================

fn cmd_info(file: &Path, config: &DecoderConfig) -> ExitCode {
    let (container, file_size) = match read_container(file, config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading container: {e}");
            return ExitCode::FAILURE;
        }
    };

    let info = container_info(&container, file_size);

    println!("=== Show Information ===\n");
    println!("File:");
    println!("  Size: {} bytes", info.file_size);
    println!("  Version: {}", info.version);
    println!("  Matrix: {}x{}", info.width, info.height);
    println!();
    println!("Blocks:");
    println!(
        "  Primary: {} bytes at 0x{:X}",
        info.primary_block_size, container.primary_block.offset
    );
    println!("  Animation: {} bytes (compressed)", info.animation_block_size);
    match (info.audio_format, info.audio_size) {
        (Some(format), Some(size)) => println!("  Audio: {} bytes ({})", size, format.extension()),
        _ => println!("  Audio: none"),
    }

    ExitCode::SUCCESS
}

// ============================================================================
// Parse Command Implementation
// ============================================================================

fn cmd_parse(
    file: &Path,
    config: &DecoderConfig,
    output: &OutputFormat,
    include_frames: bool,
    include_corrections: bool,
) -> ExitCode {
    let output_data = match build_output(file, config, include_frames, include_corrections) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match output {
        OutputFormat::Json => print_json(&output_data),
        OutputFormat::Pretty => print_pretty(&output_data),
    }

    ExitCode::SUCCESS
}

fn build_output(
    file: &Path,
    config: &DecoderConfig,
    include_frames: bool,
    include_corrections: bool,
) -> Result<ParseOutput, ParserError> {
    let (container, file_size) = read_container(file, config)?;
    let info = container_info(&container, file_size);

    // The soundtrack is not needed for reporting, so it is never written out
    let stream = container.inflate_animation()?;
    let (header, timeline) = decode_animation(&stream, config)?;

    Ok(ParseOutput {
        container: info,
        animation: AnimationInfo {
            name: header.name,
            audio_flag: header.audio_flag,
            declared_duration_ms: header.declared_duration_ms,
            stream_size: stream.len(),
            header_size: header.byte_length,
        },
        timeline: timeline.summary(),
        frames: include_frames.then(|| frame_infos(&timeline)),
        corrections: include_corrections.then(|| timeline.corrections().to_vec()),
    })
}

fn frame_infos(timeline: &Timeline) -> Vec<FrameInfo> {
    timeline
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| FrameInfo {
            index,
            duration_secs: entry.duration_secs(),
        })
        .collect()
}

fn print_json(output: &ParseOutput) {
    match serde_json::to_string_pretty(output) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing to JSON: {e}"),
    }
}

fn print_pretty(output: &ParseOutput) {
    println!("=== Container ===");
    println!("Version: {}", output.container.version);
    println!("File Size: {} bytes", output.container.file_size);
    if let Some(format) = output.container.audio_format {
        println!("Audio: {}", format.extension());
    }
    println!();

    println!("=== Animation ===");
    println!("Name: {}", output.animation.name);
    println!("Audio Flag: {}", output.animation.audio_flag);
    println!("Declared Duration: {} ms", output.animation.declared_duration_ms);
    println!();

    let timeline = &output.timeline;
    println!("=== Timeline ===");
    println!("Frame count: {}", timeline.frame_count);
    println!("Frame duration sum: {} s", timeline.frame_duration_sum_secs);
    println!(
        "Video duration will be: {} s, {:.2} m",
        timeline.output_duration_secs, timeline.output_duration_mins
    );
    if timeline.stopped_at_cap {
        println!("Frames past the runtime cap were dropped");
    }

    if let Some(frames) = &output.frames {
        println!();
        println!("=== Frames ===");
        for frame in frames {
            println!("  [{:>5}] {} s", frame.index, frame.duration_secs);
        }
    }

    if let Some(corrections) = &output.corrections {
        println!();
        println!("=== Corrections ({}) ===", corrections.len());
        for correction in corrections {
            println!("  {correction}");
        }
    }
}

// ============================================================================
// Validate Command Implementation
// ============================================================================

fn cmd_validate(file: &Path, config: &DecoderConfig, details: bool) -> ExitCode {
    let result = validate_show(file, config);

    if details {
        print_validation_details(&result, file);
    } else if result.is_valid() {
        println!("{}: OK", file.display());
    } else {
        println!("{}: INVALID", file.display());
    }

    if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn validate_show(file: &Path, config: &DecoderConfig) -> ValidationResult {
    let mut result = ValidationResult {
        container_valid: false,
        decompression_valid: false,
        animation_valid: false,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    // Step 1: Container layout
    let container = match read_container(file, config) {
        Ok((c, _)) => {
            result.container_valid = true;
            c
        }
        Err(e) => {
            result.errors.push(format!("Container parsing failed: {e}"));
            return result;
        }
    };

    // Step 2: Decompression
    let stream = match container.inflate_animation() {
        Ok(s) => {
            result.decompression_valid = true;
            s
        }
        Err(e) => {
            result.errors.push(format!("Decompression failed: {e}"));
            return result;
        }
    };

    // Step 3: Header and frames
    match decode_animation(&stream, config) {
        Ok((_, timeline)) => {
            result.animation_valid = true;

            for correction in timeline.corrections() {
                result.warnings.push(correction.to_string());
            }
            if timeline.stopped_at_cap() {
                result
                    .warnings
                    .push(format!("frames beyond {} ms were dropped", config.max_duration_ms));
            }
            if timeline.frame_count() == 0 {
                result.warnings.push("animation has no frames".to_string());
            }
        }
        Err(e) => {
            result.errors.push(format!("Animation parsing failed: {e}"));
        }
    }

    result
}

fn print_validation_details(result: &ValidationResult, file: &Path) {
    let mark = |ok: bool| if ok { "OK" } else { "FAILED" };

    println!("=== Validation: {} ===", file.display());
    println!("  Container:     {}", mark(result.container_valid));
    println!("  Decompression: {}", mark(result.decompression_valid));
    println!("  Animation:     {}", mark(result.animation_valid));

    for error in &result.errors {
        println!("  error: {error}");
    }
    for warning in &result.warnings {
        println!("  warning: {warning}");
    }
}

// ============================================================================
// Dump / Extract Commands
// ============================================================================

fn cmd_dump(file: &Path, config: &DecoderConfig, output: &Path) -> ExitCode {
    let result = read_container(file, config)
        .and_then(|(container, _)| container.inflate_animation())
        .and_then(|stream| {
            std::fs::write(output, &stream)?;
            Ok(stream.len())
        });

    match result {
        Ok(size) => {
            eprintln!("Wrote {size} bytes to {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_extract_audio(file: &Path, config: &DecoderConfig, output: Option<PathBuf>) -> ExitCode {
    let container = match read_container(file, config) {
        Ok((c, _)) => c,
        Err(e) => {
            eprintln!("Error reading container: {e}");
            return ExitCode::FAILURE;
        }
    };

    let Some(audio) = container.audio else {
        eprintln!("{} has no soundtrack", file.display());
        return ExitCode::FAILURE;
    };

    let output = output.unwrap_or_else(|| file.with_extension(audio.format.extension()));
    match std::fs::write(&output, &audio.data) {
        Ok(()) => {
            eprintln!("Wrote {} bytes to {}", audio.len(), output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing {}: {e}", output.display());
            ExitCode::FAILURE
        }
    }
}
