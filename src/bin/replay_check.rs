use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "replay_check", about = "Check that every position command in a UCI script replays legally")]
struct Args {
    /// Command script, "-" reads stdin
    #[arg(value_name = "SCRIPT", default_value = "-")]
    script: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let text = if args.script.as_os_str() == "-" {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s).context("reading stdin")?;
        s
    } else {
        std::fs::read_to_string(&args.script).with_context(|| format!("reading {}", args.script.display()))?
    };
    let checked = fenmaker::uci::verify_script(&text)?;
    println!("ok: {checked} position commands replay legally");
    Ok(())
}
