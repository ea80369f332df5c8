use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use sonogram::action::{colormap_id, LOAD_ID, SAVE_ID};
use sonogram::sonogram_core::{Colormap, EngineConfig, SpectrogramEngine, SpectrogramMatrix};
use sonogram::{ActionTable, Outcome, Session};

#[derive(Parser)]
#[command(name = "sonogram-render", about = "Render a log-frequency spectrogram of an audio file to PNG")]
struct Cli {
    /// Input audio file (WAV, FLAC, Ogg Vorbis, MP3, AAC/M4A)
    #[arg(required_unless_present = "list_colormaps")]
    input: Option<PathBuf>,

    /// Colormap name, see --list-colormaps
    #[arg(short, long, default_value = "viridis")]
    colormap: String,

    /// Output PNG. Default: <input stem>_spectrogram.png next to the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Figure width in pixels (100 px per inch)
    #[arg(long, default_value_t = 1000)]
    width: u32,

    /// Figure height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// TrueType font for titles and tick labels
    #[arg(long)]
    font: Option<PathBuf>,

    /// Print a JSON summary of the spectrogram to stdout
    #[arg(long)]
    summary: bool,

    /// List the available colormaps and exit
    #[arg(long)]
    list_colormaps: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    input: &'a Path,
    output: &'a Path,
    colormap: Colormap,
    sample_rate: u32,
    fft_size: usize,
    hop_size: usize,
    bins: usize,
    frames: usize,
    duration_secs: f64,
    dominant_frequency_hz: Option<f64>,
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    input.with_file_name(format!("{stem}_spectrogram.png"))
}

fn summarize<'a>(
    input: &'a Path,
    output: &'a Path,
    colormap: Colormap,
    matrix: &SpectrogramMatrix,
) -> Summary<'a> {
    Summary {
        input,
        output,
        colormap,
        sample_rate: matrix.sample_rate,
        fft_size: matrix.fft_size,
        hop_size: matrix.hop_size,
        bins: matrix.bin_count(),
        frames: matrix.frame_count(),
        duration_secs: matrix.duration_secs(),
        dominant_frequency_hz: matrix.dominant_frequency(),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if cli.list_colormaps {
        for name in Colormap::names() {
            println!("{name}");
        }
        return Ok(());
    }

    let Some(input) = cli.input.as_deref() else {
        bail!("no input file given");
    };
    let colormap: Colormap = cli
        .colormap
        .parse()
        .with_context(|| format!("try one of: {}", Colormap::names().join(", ")))?;
    let output = cli.output.clone().unwrap_or_else(|| default_output(input));

    let config = EngineConfig {
        font_path: cli.font.clone(),
        ..EngineConfig::default()
    };
    let mut session = Session::new(SpectrogramEngine::new(config));
    let table = ActionTable::standard();

    session
        .resize(cli.width, cli.height)
        .context("Invalid figure size")?;
    table.dispatch(&mut session, &colormap_id(colormap), None)?;
    table
        .dispatch(&mut session, LOAD_ID, Some(input))
        .with_context(|| format!("Failed to render {}", input.display()))?;
    log::info!("{}", session.status_line());

    let written = match table
        .dispatch(&mut session, SAVE_ID, Some(&output))
        .with_context(|| format!("Failed to save {}", output.display()))?
    {
        Outcome::Saved(path) => path,
        other => bail!("unexpected outcome from save: {other:?}"),
    };

    if cli.summary {
        let matrix = session
            .matrix()
            .context("no spectrogram after a successful load")?;
        let summary = summarize(input, &written, colormap, matrix);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_output(Path::new("/music/take 3.flac")),
            PathBuf::from("/music/take 3_spectrogram.png")
        );
    }

    #[test]
    fn list_colormaps_needs_no_input() {
        let cli = Cli::try_parse_from(["sonogram", "--list-colormaps"]).unwrap();
        assert!(cli.list_colormaps);
        assert!(Cli::try_parse_from(["sonogram"]).is_err());
    }

    #[test]
    fn parses_render_flags() {
        let cli = Cli::try_parse_from([
            "sonogram", "in.wav", "-c", "magma_r", "-o", "out.png", "--width", "800", "--summary",
        ])
        .unwrap();
        assert_eq!(cli.input.as_deref(), Some(Path::new("in.wav")));
        assert_eq!(cli.colormap, "magma_r");
        assert_eq!(cli.width, 800);
        assert_eq!(cli.height, 600);
        assert!(cli.summary);
    }
}
