use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fenmaker::annotate::SuffixPolicy;
use fenmaker::board::CastlingStyle;
use fenmaker::record::GameRecord;
use fenmaker::{uci, CommandSet, Game, ReplayConfig};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "fenmaker", author, version, about = "Rebuild UCI replay and fixed-node search commands from annotated games", long_about = None)]
struct Args {
    /// Game record files, "-" reads stdin
    #[arg(value_name = "PGN", default_value = "-")]
    inputs: Vec<PathBuf>,

    /// Starting FEN, overriding the record's FEN tag
    #[arg(long)]
    fen: Option<String>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Only print the full-game replay command
    #[arg(long, conflicts_with = "searches_only")]
    replay_only: bool,

    /// Only print the per-ply bounded search commands
    #[arg(long)]
    searches_only: bool,

    /// Replay the emitted commands on the board before printing them
    #[arg(long)]
    verify: bool,

    /// Node-count suffix rule: strict | any | oneof:<chars>
    #[arg(long)]
    node_suffix: Option<SuffixPolicy>,

    /// Castling spelling: standard | king-takes-rook
    #[arg(long)]
    castling: Option<CastlingStyle>,

    /// Worker threads for multiple records
    #[arg(long, default_value_t = 1)]
    threads: usize,
}

#[derive(Serialize)]
struct Report<'a> {
    source: String,
    game: &'a Game,
    commands: &'a CommandSet,
}

fn load_config(args: &Args) -> Result<ReplayConfig> {
    let mut cfg = match &args.config {
        Some(path) => ReplayConfig::from_json_file(path)?,
        None => ReplayConfig::default(),
    };
    cfg.apply_env()?;
    if let Some(policy) = &args.node_suffix { cfg.node_suffix = policy.clone(); }
    if let Some(style) = args.castling { cfg.castling = style; }
    if args.replay_only { cfg.emit_searches = false; }
    if args.searches_only { cfg.emit_replay = false; }
    if args.verify { cfg.verify = true; }
    Ok(cfg)
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).context("reading stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn process(source: &str, text: &str, fen: Option<&str>, cfg: &ReplayConfig, format: Format) -> Result<String> {
    let record = GameRecord::parse(text);
    let fen = fen.map(str::to_string).unwrap_or_else(|| record.start_fen());
    let game = fenmaker::build_game(&fen, &record.movetext, cfg)?;
    let commands = uci::emit(&game);
    log::info!("{source}: {} plies, {} bounded searches", game.len(), commands.searches.len());
    if cfg.verify {
        let checked = uci::verify_script(&commands.render(true, true))?;
        log::debug!("{source}: verified {checked} position commands");
    }
    match format {
        Format::Text => Ok(commands.render(cfg.emit_replay, cfg.emit_searches)),
        Format::Json => {
            let report = Report { source: source.to_string(), game: &game, commands: &commands };
            Ok(format!("{}\n", serde_json::to_string_pretty(&report)?))
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let cfg = load_config(&args)?;

    let inputs: Vec<(String, String)> = args
        .inputs
        .iter()
        .map(|p| -> Result<(String, String)> { Ok((p.display().to_string(), read_input(p)?)) })
        .collect::<Result<_>>()?;

    let pb = ProgressBar::new(inputs.len() as u64);
    if inputs.len() > 1 {
        pb.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} records")?);
    } else {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let pool = rayon::ThreadPoolBuilder::new().num_threads(args.threads.max(1)).build()?;
    let results: Vec<Result<String>> = pool.install(|| {
        inputs
            .par_iter()
            .map(|(source, text)| {
                let r = process(source, text, args.fen.as_deref(), &cfg, args.format)
                    .with_context(|| source.clone());
                pb.inc(1);
                r
            })
            .collect()
    });
    pb.finish_and_clear();

    let mut failed = 0usize;
    for result in results {
        match result {
            Ok(out) => print!("{out}"),
            Err(e) => {
                failed += 1;
                eprintln!("error: {e:#}");
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} records failed", inputs.len());
    }
    Ok(())
}
