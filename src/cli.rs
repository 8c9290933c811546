use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use repitch::io::wav::{read_wav_file, write_wav_file};
use repitch::{
    EchoParams, Pipeline, PipelineConfig, PitchError, SynthesisMode, WavFormat, Waveform,
};
use tracing::{error, info, Level};

/// Shift the pitch of a WAV file while keeping its duration.
///
/// Without --output, every stage of the pipeline is written next to the input
/// as <stem>_<scale>_<Stage>.wav.
#[derive(Debug, Parser)]
#[command(name = "repitch", version, about)]
struct Args {
    /// Input WAV file (multi-channel files are mixed down to mono)
    input: PathBuf,

    /// Pitch scale factor (> 1 raises pitch, < 1 lowers it)
    scale: f64,

    /// Synthesizer used to restore duration
    #[arg(short, long, value_enum, default_value_t = SynthesisMode::Aligned)]
    mode: SynthesisMode,

    /// Write only the final result to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON pipeline configuration; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Echo delay in milliseconds
    #[arg(long)]
    echo_delay: Option<f64>,

    /// Echo gain (0.0 to 1.0)
    #[arg(long)]
    echo_gain: Option<f64>,

    /// Disable the echo stage
    #[arg(long, conflicts_with_all = ["echo_delay", "echo_gain"])]
    no_echo: bool,

    /// Base frame duration in milliseconds
    #[arg(long)]
    frame_ms: Option<f64>,

    /// Overlap as a fraction of the frame length (0.0 to 0.5)
    #[arg(long)]
    overlap: Option<f64>,

    /// Seek window as a fraction of the overlap (0.0 to 1.0)
    #[arg(long)]
    seek: Option<f64>,

    /// Write 32-bit float WAV instead of 16-bit PCM
    #[arg(long)]
    float: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Builds the pipeline configuration: file (or defaults), then flag overrides.
    fn pipeline_config(&self) -> Result<PipelineConfig, PitchError> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default().with_echo(EchoParams::default()),
        };

        if let Some(frame_ms) = self.frame_ms {
            config.synthesis.frame_ms = frame_ms;
        }
        if let Some(overlap) = self.overlap {
            config.synthesis.overlap_fraction = overlap;
        }
        if let Some(seek) = self.seek {
            config.synthesis.seek_fraction = seek;
        }

        if self.no_echo {
            config.echo = None;
        } else if self.echo_delay.is_some() || self.echo_gain.is_some() {
            let mut echo = config.echo.unwrap_or_default();
            if let Some(delay) = self.echo_delay {
                echo.delay_ms = delay;
            }
            if let Some(gain) = self.echo_gain {
                echo.gain = gain;
            }
            config.echo = Some(echo);
        }

        config.validate()?;
        Ok(config)
    }

    fn format(&self) -> WavFormat {
        if self.float {
            WavFormat::Float32
        } else {
            WavFormat::Pcm16
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), PitchError> {
    let config = args.pipeline_config()?;
    let pipeline = Pipeline::new(config)?;
    let format = args.format();

    let input = read_wav_file(&args.input)?;
    info!(
        "Input: {} samples, {} Hz, {:.2}s",
        input.len(),
        input.sample_rate(),
        input.duration_secs()
    );

    if let Some(output_path) = &args.output {
        let output = pipeline.process(&input, args.scale, args.mode)?;
        save(output_path, &output, format)?;
        return Ok(());
    }

    let stages = pipeline.process_stages(&input, args.scale)?;
    let named = [
        ("Resampled", Some(&stages.resampled)),
        ("Simple", Some(&stages.fixed)),
        ("SimpleOver", Some(&stages.windowed)),
        ("SimpleOverCross", Some(&stages.aligned)),
        ("SimpleOverCrossEcho", stages.echoed.as_ref()),
    ];
    for (stage, waveform) in named {
        if let Some(waveform) = waveform {
            save(&stage_output_path(&args.input, args.scale, stage), waveform, format)?;
        }
    }
    Ok(())
}

fn save(path: &Path, waveform: &Waveform, format: WavFormat) -> Result<(), PitchError> {
    write_wav_file(path, waveform, format)?;
    info!(
        "Output: {} ({} samples, {:.2}s)",
        path.display(),
        waveform.len(),
        waveform.duration_secs()
    );
    Ok(())
}

/// `<dir>/<stem>_<scale>_<stage>.wav` next to the input file.
fn stage_output_path(input: &Path, scale: f64, stage: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_{}_{}.wav", stem, scale, stage))
}
