//! Run the difficulty conformance checks and print the reward schedule.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cygnuslib::conformance::{DifferentialSweep, check_vectors, load_vectors};
use cygnuslib::difficulty::{calc_difficulty, calc_difficulty_u256};
use cygnuslib::reward::block_reward;
use cygnuslib::types::{EMPTY_UNCLE_HASH, Hash, Header};
use cygnuslib::util::{format_units, parse_big256};
use tracing::*;

mod util;

#[derive(Parser, Debug)]
#[command(version, about = "Difficulty and reward conformance tool")]
struct Cli {
    /// TOML file with fork activation heights
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Homestead activation height used when no config file is given
    #[arg(long, global = true, default_value_t = 1_150_000)]
    homestead_block: u64,
    /// Write logs into this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a JSON file of difficulty vectors
    Vectors { file: PathBuf },
    /// Compare the reference and fixed-width paths on random inputs
    Fuzz {
        #[arg(long, default_value_t = 5_000)]
        iterations: usize,
        #[arg(long, default_value_t = 2)]
        seed: u64,
    },
    /// Difficulty of a child block
    Difficulty {
        #[arg(long)]
        parent_number: u64,
        #[arg(long)]
        parent_time: u64,
        /// decimal or 0x-prefixed hex
        #[arg(long)]
        parent_difficulty: String,
        #[arg(long)]
        time: u64,
        /// the parent references at least one uncle
        #[arg(long)]
        uncles: bool,
    },
    /// Block reward at each height
    Reward { heights: Vec<u64> },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    util::setup_tracing(cli.log_dir.as_deref())?;
    let config = util::load_config(cli.config.as_ref(), cli.homestead_block)?;
    debug!(?config, "loaded chain config");

    match cli.command {
        Command::Vectors { file } => {
            let reader = File::open(&file)
                .with_context(|| format!("Failed to open vectors: {}", file.display()))?;
            let vectors = load_vectors(reader)?;
            let failures = check_vectors(&config, &vectors);
            info!(total = vectors.len(), failed = failures.len(), "checked difficulty vectors");
            for (name, err) in &failures {
                println!("{name}: {err}");
            }
            if !failures.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Fuzz { iterations, seed } => {
            let report = DifferentialSweep::new(seed).run(iterations);
            info!(
                agreed = report.agreed,
                out_of_range = report.out_of_range,
                diverged = report.diverged.len(),
                "differential sweep finished"
            );
            for (case, rule, outcome) in &report.diverged {
                println!(
                    "{rule:?} number={} parent_time={} time={} bomb_delay={}: {outcome:?}",
                    case.parent.number, case.parent.time, case.time, case.bomb_delay
                );
            }
            if !report.diverged.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Difficulty {
            parent_number,
            parent_time,
            parent_difficulty,
            time,
            uncles,
        } => {
            let uncle_hash = if uncles { Hash::zero() } else { EMPTY_UNCLE_HASH };
            let parent = Header::new(parent_number, parent_time, parse_big256(&parent_difficulty)?)
                .with_uncle_hash(uncle_hash);
            let rule = config.difficulty_rule(parent_number.saturating_add(1));
            println!("rule: {rule:?}");
            if rule.bomb_exceeds_256_bits(&parent) {
                warn!(?rule, number = parent_number, "bomb term exceeds 256 bits");
                println!("difficulty: wider than 256 bits, not evaluated");
            } else {
                println!("difficulty: {}", calc_difficulty(&config, time, &parent));
            }
            match calc_difficulty_u256(&config, time, &parent) {
                Ok(fixed) => println!("fixed-width: {fixed}"),
                Err(err) => println!("fixed-width: {err}"),
            }
        }
        Command::Reward { heights } => {
            for height in heights {
                let reward = block_reward(height);
                println!("{height}: {} ({reward} base units)", format_units(&reward));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
