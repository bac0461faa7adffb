use achievement_sync::store::PendingSubmissionQueue;
use achievement_sync::tasks::scheduler::run_with_backoff;
use achievement_sync::utils::logging::{init_logging, level_from_verbosity};
use achievement_sync::{setup, SyncConfig, SyncError, WorkResult};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::watch;

// sysexits.h EX_TEMPFAIL, understood by most schedulers as "try again later"
const EXIT_RETRY: u8 = 75;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Config file (defaults to config.json in the data directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Exchange a password for a session token and store it
    Login { username: String, password: String },
    /// Forget the stored credential and all user data
    Logout,
    /// Show the stored credential and the pending award queue
    Status,
    /// List the achievements of the title with the given hash
    Achievements {
        hash: String,
        #[arg(long)]
        hardcore: bool,
    },
    /// Make one pass over the pending award queue
    SubmitPending,
    /// Keep submitting the pending queue with backoff until it is empty
    RunWorker,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(level_from_verbosity(args.verbose));

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config_path = match args.config {
        Some(path) => path,
        None => SyncConfig::default_config_path()?,
    };
    let config = SyncConfig::load_or_default(&config_path)?;
    let context = setup::init(config)?;
    let repository = context.repository.clone();

    match args.command {
        Command::Login { username, password } => {
            repository.login(&username, &password).await?;
            println!("Logged in as {}", username);
        }
        Command::Logout => {
            repository.logout().await?;
            println!("Logged out");
        }
        Command::Status => {
            match repository.get_user_authentication() {
                Some(user_auth) => println!("User:    {}", user_auth.username),
                None => println!("User:    (not logged in)"),
            }
            let pending = context.store.list_pending().await?;
            println!("Pending: {}", pending.len());
            for submission in pending {
                println!(
                    "  achievement {} (game {}, {}) queued at {}",
                    submission.achievement_id,
                    submission.game_id,
                    if submission.for_hardcore_mode { "hardcore" } else { "casual" },
                    submission.created_at
                );
            }
        }
        Command::Achievements { hash, hardcore } => {
            let data = match repository.get_user_game_data(&hash, hardcore).await {
                Ok(data) => data,
                Err(SyncError::UnknownGame(hash)) => {
                    println!("No game matches hash {}", hash);
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e.into()),
            };

            println!("{} [{}]", data.title, data.game_id);
            for set in &data.sets {
                println!(
                    "-- {} ({})",
                    set.title.as_deref().unwrap_or(data.title.as_str()),
                    set.set_type
                );
                for entry in &set.achievements {
                    println!(
                        "  [{}] {:>4} {} ({} pts)",
                        if entry.is_unlocked { "x" } else { " " },
                        entry.achievement.id,
                        entry.achievement.title,
                        entry.achievement.points
                    );
                }
            }
        }
        Command::SubmitPending => {
            let result = context.submission_worker().run().await;
            return Ok(exit_code_for(result));
        }
        Command::RunWorker => {
            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = cancel_tx.send(true);
                }
            });

            let worker = context.submission_worker();
            let result = run_with_backoff(&worker, &context.retry_policy(), cancel_rx).await;
            return Ok(exit_code_for(result));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn exit_code_for(result: WorkResult) -> ExitCode {
    match result {
        WorkResult::Success => ExitCode::SUCCESS,
        WorkResult::Retry => ExitCode::from(EXIT_RETRY),
        WorkResult::PermanentFailure => ExitCode::FAILURE,
    }
}
