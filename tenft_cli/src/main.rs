use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use tenft::{load_players, PlayerRecord};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod chart;

use chart::{render_chart, ChartKind, ChartOptions};

#[derive(Parser, Debug)]
#[command(author, version, about = "Chart the 10ft, 1hr shooting challenge", long_about = None)]
struct Cli {
    /// Results CSV (`name,starts_throwing_at,10ft,20ft,...`)
    #[arg(default_value = "data.csv", value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output figure path (PNG, or SVG by extension)
    #[arg(short, long, default_value = "/tmp/out.png", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Also write an SVG figure here
    #[arg(long, value_hint = ValueHint::FilePath)]
    svg: Option<PathBuf>,

    /// Chart title
    #[arg(long, default_value = "Simon's 10ft, 1hr Challenge")]
    title: String,

    /// Write one CSV row per made shot
    #[arg(long, value_hint = ValueHint::FilePath)]
    samples_csv: Option<PathBuf>,

    /// Write the parsed players as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    json: Option<PathBuf>,

    /// Disable plot generation
    #[arg(long, action = ArgAction::SetTrue)]
    no_plot: bool,

    /// Verbose logging
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let t_load = Instant::now();
    let players = load_players(&cli.input)?;
    info!(
        "Loaded {} players from {} in {:.1} ms",
        players.len(),
        cli.input.display(),
        t_load.elapsed().as_secs_f64() * 1000.0
    );
    for player in &players {
        debug!(
            "{}: {} shots, furthest {} ft, throwing from {:?}",
            player.name(),
            player.samples().len(),
            player.max_distance().unwrap_or(0),
            player.starts_throwing_at()
        );
    }

    if let Some(path) = cli.samples_csv.as_ref() {
        write_samples_csv(&players, path)?;
        info!("Wrote samples CSV: {}", path.display());
    }

    if let Some(path) = cli.json.as_ref() {
        write_players_json(&players, path)?;
        info!("Wrote players JSON: {}", path.display());
    }

    if cli.no_plot {
        return Ok(());
    }

    let opts = ChartOptions {
        title: cli.title.clone(),
    };
    let t_plot = Instant::now();
    render_chart(&players, &cli.output, ChartKind::from_path(&cli.output), &opts)
        .with_context(|| format!("failed to render {}", cli.output.display()))?;
    info!(
        "Wrote plot: {} ({:.1} ms)",
        cli.output.display(),
        t_plot.elapsed().as_secs_f64() * 1000.0
    );

    if let Some(path) = cli.svg.as_ref() {
        render_chart(&players, path, ChartKind::Svg, &opts)
            .with_context(|| format!("failed to render {}", path.display()))?;
        info!("Wrote plot: {}", path.display());
    }

    Ok(())
}

fn write_samples_csv(players: &[PlayerRecord], path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    write_sample_rows(players, &mut writer)
}

fn write_sample_rows<W: Write>(players: &[PlayerRecord], writer: &mut csv::Writer<W>) -> Result<()> {
    writer.write_record(["player", "distance_ft", "elapsed_s", "elapsed_min", "throwing"])?;

    for player in players {
        for sample in player.samples() {
            let throwing = player
                .starts_throwing_at()
                .map(|d| (sample.distance_ft >= d).to_string())
                .unwrap_or_default();
            writer.write_record([
                player.name().to_string(),
                sample.distance_ft.to_string(),
                sample.elapsed_s.to_string(),
                format!("{:.2}", sample.elapsed_s as f64 / 60.0),
                throwing,
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn write_players_json(players: &[PlayerRecord], path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, players)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tenft::parse_players;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults_are_fixed_paths() {
        let cli = Cli::try_parse_from(["tenft"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("data.csv"));
        assert_eq!(cli.output, PathBuf::from("/tmp/out.png"));
        assert_eq!(cli.title, "Simon's 10ft, 1hr Challenge");
        assert!(cli.svg.is_none());
        assert!(!cli.no_plot);
    }

    #[test]
    fn test_cli_overrides() {
        let cli =
            Cli::try_parse_from(["tenft", "scores.csv", "-o", "chart.svg", "--no-plot"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("scores.csv"));
        assert_eq!(cli.output, PathBuf::from("chart.svg"));
        assert!(cli.no_plot);
    }

    #[test]
    fn test_sample_rows() {
        let players = parse_players("Simon,,44:01,,30:00\nAna,20,59:54,59:40\n").unwrap();
        let mut writer = csv::Writer::from_writer(Vec::new());
        write_sample_rows(&players, &mut writer).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "player,distance_ft,elapsed_s,elapsed_min,throwing",
                "Simon,10,959,15.98,",
                "Simon,30,1800,30.00,",
                "Ana,10,6,0.10,false",
                "Ana,20,20,0.33,true",
            ]
        );
    }

    #[test]
    fn test_players_json_file() {
        let players = parse_players("Ana,20,59:54\n").unwrap();
        let path =
            std::env::temp_dir().join(format!("tenft-cli-{}-players.json", std::process::id()));
        write_players_json(&players, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["name"], "Ana");
        assert_eq!(value[0]["samples"][0]["elapsed_s"], 6);
    }

    #[test]
    fn test_missing_input_fails_before_output() {
        let dir = std::env::temp_dir();
        let output = dir.join(format!("tenft-cli-{}-never.png", std::process::id()));
        let cli = Cli::try_parse_from([
            "tenft",
            dir.join("tenft-missing-input.csv").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();
        let err = run(cli).unwrap_err();
        assert!(err.to_string().starts_with("failed to read"));
        assert!(!output.exists());
    }
}
