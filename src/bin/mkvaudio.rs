use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use mkvaudio::{
    AbortReason, AccelerationStrategy, AudioFormat, ExtractionEvent, ExtractionRequest,
    HardwareDevice, JobOutcome, SystemTool, ToolRunner, available_hardware_devices,
    detect_tool, probe_acceleration, spawn_extraction,
};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  mkvaudio extract ~/Videos ~/Music/rips --format flac\n  mkvaudio extract ~/Videos ~/Music/rips --format mp3 --gpu --device cuda\n  mkvaudio probe --device vaapi --json\n  mkvaudio completions zsh > _mkvaudio";

const INSTALL_HINTS: &str = "Please install FFmpeg first:\n  Windows: download from ffmpeg.org\n  macOS:   brew install ffmpeg\n  Linux:   sudo apt install ffmpeg";

#[derive(Debug, Parser)]
#[command(
    name = "mkvaudio",
    version,
    about = "Extract audio tracks from a folder tree of video files with FFmpeg",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Hide the progress bar and print one line per file instead.
    #[arg(long, global = true)]
    no_progress: bool,

    /// FFmpeg executable to run (name on PATH or full path).
    #[arg(long, global = true, default_value = "ffmpeg")]
    ffmpeg: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract audio from every video file under a folder.
    #[command(
        about = "Extract audio from a folder of videos",
        after_help = "Examples:\n  mkvaudio extract videos audio --format aac\n  mkvaudio extract videos audio --format flac --overwrite --json"
    )]
    Extract {
        /// Source folder scanned recursively for video files.
        input: Option<PathBuf>,
        /// Output folder; the source layout is mirrored inside it.
        output: Option<PathBuf>,
        /// Output format: mp3 | aac | flac.
        #[arg(long, default_value = "mp3")]
        format: String,
        /// Try hardware-accelerated decoding, falling back to the CPU.
        #[arg(long)]
        gpu: bool,
        /// Hardware device used with --gpu (cuda, vaapi, qsv, videotoolbox, d3d11va, dxva2).
        #[arg(long, default_value = "cuda")]
        device: String,
        /// Replace output files that already exist.
        #[arg(long)]
        overwrite: bool,
        /// Container extension to scan for; repeat for several (default: mkv).
        #[arg(long = "extension", value_name = "EXT")]
        extensions: Vec<String>,
        /// Print the final summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Report the FFmpeg version and hardware acceleration support.
    #[command(about = "Probe FFmpeg and hardware acceleration")]
    Probe {
        /// Hardware device to check.
        #[arg(long, default_value = "cuda")]
        device: String,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_audio_format(value: &str) -> Option<AudioFormat> {
    value.parse().ok()
}

fn format_choices() -> String {
    AudioFormat::ALL
        .iter()
        .map(|format| format.extension())
        .collect::<Vec<_>>()
        .join(" | ")
}

fn parse_hardware_device(value: &str) -> Option<HardwareDevice> {
    value.parse().ok()
}

fn init_logging(global: &GlobalOptions) {
    let default_filter = if global.verbose { "mkvaudio=debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}

/// Renders worker events on the foreground thread.
struct Presenter {
    progress_bar: Option<ProgressBar>,
    show_progress: bool,
    verbose: bool,
}

impl Presenter {
    fn new(global: &GlobalOptions) -> Self {
        Self {
            progress_bar: None,
            show_progress: !global.no_progress,
            verbose: global.verbose,
        }
    }

    fn line(&self, message: String) {
        match &self.progress_bar {
            Some(pb) => pb.println(message),
            None => eprintln!("{message}"),
        }
    }

    fn handle(&mut self, event: &ExtractionEvent) -> Result<(), Box<dyn std::error::Error>> {
        match event {
            ExtractionEvent::ToolDetected { version } => {
                if self.verbose {
                    eprintln!("{} {version}", "using".cyan().bold());
                }
            }
            ExtractionEvent::AccelerationUnavailable { device } => {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("{device} acceleration is not available, extracting on the CPU")
                        .yellow()
                );
            }
            ExtractionEvent::BatchPlanned { total, format } => {
                eprintln!(
                    "{} {}",
                    "found".cyan().bold(),
                    format!("{total} video file(s), extracting {format} audio")
                );
                if self.show_progress {
                    let pb = ProgressBar::new(100);
                    let style = ProgressStyle::with_template(
                        "{spinner:.green} {bar:40.cyan/blue} {pos:>3}% {msg}",
                    )?;
                    pb.set_style(style.progress_chars("##-"));
                    self.progress_bar = Some(pb);
                }
            }
            ExtractionEvent::JobStarted {
                index,
                total,
                relative,
            } => {
                let status = format!("Extracting: {} ({}/{})", relative.display(), index + 1, total);
                match &self.progress_bar {
                    Some(pb) => pb.set_message(status),
                    None => eprintln!("{status}"),
                }
            }
            ExtractionEvent::AccelerationFallback { relative, .. } => {
                self.line(format!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!(
                        "hardware acceleration failed for {}, retrying on the CPU",
                        relative.display()
                    )
                    .yellow()
                ));
            }
            ExtractionEvent::JobFinished {
                relative,
                outcome,
                percentage,
                ..
            } => {
                if let Some(pb) = &self.progress_bar {
                    pb.set_position(percentage.round() as u64);
                }
                match outcome {
                    JobOutcome::Failed { detail, .. } => self.line(format!(
                        "{} {}: {detail}",
                        "failed".red().bold(),
                        relative.display()
                    )),
                    JobOutcome::Succeeded { .. } if self.verbose => self.line(format!(
                        "{} {}",
                        "extracted".green().bold(),
                        relative.display()
                    )),
                    JobOutcome::Succeeded { .. } => {}
                }
            }
            ExtractionEvent::Finished(result) => {
                if let Some(pb) = self.progress_bar.take() {
                    pb.finish_with_message(result.status.clone());
                }
            }
            ExtractionEvent::StateChanged(_) | ExtractionEvent::Aborted(_) => {}
        }
        Ok(())
    }
}

fn run_extract(
    global: &GlobalOptions,
    request: ExtractionRequest,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runner: Arc<dyn ToolRunner> = Arc::new(SystemTool::new(&global.ffmpeg));
    let extraction = spawn_extraction(request, runner);

    let mut presenter = Presenter::new(global);
    for event in extraction.events() {
        presenter.handle(&event)?;
    }

    let outcome = extraction
        .join()
        .map_err(|_| "extraction worker panicked")?;

    match outcome {
        Ok(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!(
                        "Audio extraction complete! Successfully extracted {} of {} files.",
                        result.succeeded, result.attempted
                    )
                    .green()
                );
                if result.fell_back > 0 {
                    println!("{} file(s) were retried on the CPU", result.fell_back);
                }
            }
            Ok(())
        }
        Err(reason @ AbortReason::ToolNotFound { .. }) => {
            eprintln!("{INSTALL_HINTS}");
            Err(reason.into())
        }
        Err(reason) if reason.is_fatal() => Err(reason.into()),
        Err(reason) => {
            eprintln!("{} {}", "info:".cyan().bold(), reason);
            Ok(())
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global);

    match cli.command {
        Commands::Extract {
            input,
            output,
            format,
            gpu,
            device,
            overwrite,
            extensions,
            json,
        } => {
            let audio_format = parse_audio_format(&format).ok_or_else(|| {
                format!("unsupported --format: {format} (expected {})", format_choices())
            })?;
            let acceleration = if gpu {
                let device = parse_hardware_device(&device)
                    .ok_or(format!("unsupported --device: {device}"))?;
                AccelerationStrategy::TryThenFallback(device)
            } else {
                AccelerationStrategy::None
            };

            let mut request = ExtractionRequest::new()
                .with_format(audio_format)
                .with_acceleration(acceleration)
                .with_overwrite(overwrite)
                .with_extensions(extensions);
            if let Some(input) = input {
                request = request.with_input_root(input);
            }
            if let Some(output) = output {
                request = request.with_output_root(output);
            }

            run_extract(&cli.global, request, json)?;
        }
        Commands::Probe { device, json } => {
            let device =
                parse_hardware_device(&device).ok_or(format!("unsupported --device: {device}"))?;
            let tool = SystemTool::new(&cli.global.ffmpeg);
            let version = detect_tool(&tool).inspect_err(|_| eprintln!("{INSTALL_HINTS}"))?;
            let devices = available_hardware_devices(&tool)?;
            let usable = probe_acceleration(&tool, device);

            if json {
                let payload = json!({
                    "version": version,
                    "hardware_devices": devices,
                    "device": device,
                    "usable": usable,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("FFmpeg: {version}");
                let names: Vec<&str> = devices.iter().map(|d| d.tool_name()).collect();
                println!(
                    "Hardware devices: {}",
                    if names.is_empty() { "none".to_string() } else { names.join(", ") }
                );
                if usable {
                    println!("{} {device} acceleration looks usable", "ok".green().bold());
                } else {
                    println!(
                        "{} {device} acceleration is not available",
                        "unavailable".yellow().bold()
                    );
                }
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "mkvaudio", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
