//! `dialogue-tts` command line tool.
//!
//! ```text
//! dialogue-tts podcast.txt --model-dir models/kokoro
//! cat podcast.txt | dialogue-tts - --model-dir models/kokoro --output-dir out/
//! dialogue-tts podcast.txt --check
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use clap::Parser;
use log::{error, info};

use dialogue_tts::engines::kokoro::{KokoroEngine, KokoroModelParams};
use dialogue_tts::{DialogueStudio, StudioConfig};

#[derive(Debug, Parser)]
#[command(name = "dialogue-tts")]
#[command(about = "Synthesize a 'Speaker: Text' dialogue into one WAV file")]
struct Cli {
    /// Dialogue script, one `Speaker: Text` line per utterance. `-` reads stdin.
    script: PathBuf,
    /// Directory with the Kokoro ONNX model, voices-v1.0.bin and config.json
    #[arg(long, default_value = "models/kokoro")]
    model_dir: PathBuf,
    /// JSON file overriding the default settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where the audio file is written (replaces the config value)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// CPU threads for inference
    #[arg(long)]
    threads: Option<usize>,
    /// Only validate the script
    #[arg(long)]
    check: bool,
    /// Log per-line progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(cli) {
        error!("{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let script = read_script(&cli.script, std::io::stdin().lock())?;
    let config = load_config(&cli)?;

    if cli.check {
        let studio = DialogueStudio::new(KokoroEngine::new(), config);
        studio.check(&script)?;
        println!("Script is valid.");
        return Ok(());
    }

    let mut engine = KokoroEngine::new();
    let load_start = Instant::now();
    engine.load_model_with_params(
        &cli.model_dir,
        KokoroModelParams {
            num_threads: cli.threads,
        },
    )?;
    info!("Model loaded in {:.2?}", load_start.elapsed());

    let mut studio = DialogueStudio::new(engine, config);
    let synth_start = Instant::now();
    let artifact = studio.generate(&script)?;
    let synth_dur = synth_start.elapsed();

    let audio_duration = artifact.waveform.duration_secs();
    println!(
        "Synthesized {:.2}s audio in {:.2?} ({:.1}x real-time)",
        audio_duration,
        synth_dur,
        audio_duration / synth_dur.as_secs_f64()
    );
    for (speaker, voice) in &artifact.voices {
        println!("  {speaker}: {voice}");
    }
    println!("Saved to {}", artifact.path.display());
    Ok(())
}

/// Reads the script from `path`, or from `stdin` when the path is `-`.
fn read_script(path: &Path, mut stdin: impl Read) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut script = String::new();
        stdin.read_to_string(&mut script)?;
        Ok(script)
    } else {
        std::fs::read_to_string(path)
    }
}

fn load_config(cli: &Cli) -> dialogue_tts::Result<StudioConfig> {
    let mut config = match &cli.config {
        Some(path) => StudioConfig::from_json_file(path)?,
        None => StudioConfig::default(),
    };
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    Ok(config)
}
