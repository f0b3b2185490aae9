//! nestfest-qv — run quadratic voting engine operations over JSON input.

use anyhow::Context;
use clap::Parser;
use nestfest_cli::input::read_json;
use nestfest_cli::{replay, CliConfig, ReplayFile, VoteResponse};
use nestfest_quadratic::{
    calculate_cost, calculate_max_votes, calculate_voting_power, Budget, Preference,
    QuadraticEngine, VoteData, VoteRecord, WeightedVote,
};
use nestfest_types::{Credits, SubmissionId, VoterId};
use nestfest_utils::{init_logging, LogFormat};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nestfest-qv", about = "NestFest quadratic voting engine")]
struct Cli {
    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, env = "NESTFEST_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "NESTFEST_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "NESTFEST_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Credits needed to cast a number of votes on one submission.
    Cost {
        #[arg(allow_hyphen_values = true)]
        votes: i64,
    },

    /// Most votes affordable on one submission with the given credits.
    MaxVotes { credits: Credits },

    /// Apply one vote (or a revote with --previous) to a budget.
    Vote {
        #[arg(long, default_value = "voter")]
        voter: VoterId,
        #[arg(long, default_value = "submission")]
        submission: SubmissionId,
        #[arg(long)]
        total: Credits,
        #[arg(long, default_value_t = 0)]
        spent: Credits,
        #[arg(long, default_value_t = 0)]
        bonus: Credits,
        #[arg(long, allow_hyphen_values = true)]
        count: i64,
        /// Vote count previously stored for this voter and submission.
        #[arg(long)]
        previous: Option<i64>,
    },

    /// Check an allocation (JSON object submission → votes) against a credit limit.
    Validate {
        #[arg(long)]
        allocation: PathBuf,
        #[arg(long)]
        credits: Credits,
    },

    /// Suggest an allocation from preferences (JSON array of {submission_id, strength}).
    Optimize {
        #[arg(long)]
        preferences: PathBuf,
        #[arg(long)]
        budget: Credits,
    },

    /// Aggregate weighted scores (JSON array of {submission_id, vote_count, weight}).
    Scores {
        #[arg(long)]
        votes: PathBuf,
    },

    /// Voting power from base and bonus credits and multipliers.
    Power {
        #[arg(long)]
        base: Credits,
        #[arg(long, default_value_t = 0)]
        bonus: Credits,
        #[arg(long = "multiplier")]
        multipliers: Vec<f64>,
    },

    /// Scan stored vote records for anomalies.
    Audit {
        #[arg(long)]
        votes: PathBuf,
    },

    /// Summarise stored vote records.
    Insights {
        #[arg(long)]
        votes: PathBuf,
        #[arg(long)]
        eligible_voters: Option<u64>,
    },

    /// Replay a log of vote requests against in-memory budgets.
    Replay {
        #[arg(long)]
        requests: PathBuf,
    },

    /// Print the effective configuration as TOML.
    Config,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CliConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => CliConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let engine = QuadraticEngine::new(config.engine.clone()).context("invalid engine parameters")?;

    match cli.command {
        Command::Cost { votes } => print_json(&calculate_cost(votes)),
        Command::MaxVotes { credits } => print_json(&calculate_max_votes(credits)),
        Command::Vote {
            voter,
            submission,
            total,
            spent,
            bonus,
            count,
            previous,
        } => {
            let budget = Budget::new(total).with_spent(spent).with_bonus(bonus);
            let result = match previous {
                Some(prev) => {
                    let previous = VoteData {
                        vote_count: prev,
                        credits_spent: calculate_cost(prev),
                    };
                    engine.process_revote(&voter, &submission, &previous, count, &budget)
                }
                None => engine.process_vote(&voter, &submission, count, &budget),
            };
            let response = VoteResponse::from(result);
            print_json(&response)?;
            if !response.is_accepted() {
                std::process::exit(2);
            }
            Ok(())
        }
        Command::Validate {
            allocation,
            credits,
        } => {
            let allocation: HashMap<SubmissionId, i64> = read_json(&allocation)
                .with_context(|| format!("reading allocation {}", allocation.display()))?;
            print_json(&engine.validate_budget(&allocation, credits)?)
        }
        Command::Optimize {
            preferences,
            budget,
        } => {
            let prefs: Vec<Preference> = read_json(&preferences)
                .with_context(|| format!("reading preferences {}", preferences.display()))?;
            print_json(&engine.optimize_allocation(&prefs, budget))
        }
        Command::Scores { votes } => {
            let weighted: Vec<WeightedVote> = read_json(&votes)
                .with_context(|| format!("reading votes {}", votes.display()))?;
            print_json(&engine.quadratic_scores(&weighted))
        }
        Command::Power {
            base,
            bonus,
            multipliers,
        } => print_json(&calculate_voting_power(base, bonus, &multipliers)),
        Command::Audit { votes } => {
            let records: Vec<VoteRecord> = read_json(&votes)
                .with_context(|| format!("reading votes {}", votes.display()))?;
            print_json(&engine.detect_anomalies(&records))
        }
        Command::Insights {
            votes,
            eligible_voters,
        } => {
            let records: Vec<VoteRecord> = read_json(&votes)
                .with_context(|| format!("reading votes {}", votes.display()))?;
            let mut insights = engine.generate_insights(&records);
            if let Some(eligible) = eligible_voters {
                insights = insights.with_eligible_voters(eligible);
            }
            print_json(&insights)
        }
        Command::Replay { requests } => {
            let file: ReplayFile = read_json(&requests)
                .with_context(|| format!("reading requests {}", requests.display()))?;
            print_json(&replay(&engine, &file))
        }
        Command::Config => {
            print!("{}", config.to_toml_string());
            Ok(())
        }
    }
}
