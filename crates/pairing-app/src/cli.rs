//! Command-line front end over the app shell

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use pairing_client::forms::LoginForm;
use pairing_client::ClientError;
use pairing_common::{AppConfig, AppError, ConfigError, ErrorSummary};
use pairing_realtime::{ChatUpdate, RealtimeError, Recovery, SubscriptionClient};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use uuid::Uuid;

use crate::notice::Notice;
use crate::screens::{
    statistics, AlgorithmScreen, ChatScreen, PairingsScreen, PairingsTab, StatisticsScreen,
};
use crate::shell::AppShell;

#[derive(Parser)]
#[command(name = "pairing")]
#[command(about = "Pairing app client - pairings, chat, meetings and admin tools", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    pub output: OutputFormat,

    /// Account email
    #[arg(long, global = true, env = "PAIRING_EMAIL")]
    pub email: Option<String>,

    /// Account password
    #[arg(long, global = true, env = "PAIRING_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Organization to act on (admins); defaults to your own
    #[arg(long, global = true)]
    pub organization: Option<Uuid>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the signed-in user
    Whoami,

    /// List your pairings
    Pairings {
        /// Show past pairings instead of current ones
        #[arg(long)]
        past: bool,
    },

    /// Chat with your partner; type a line and press enter to send
    Chat {
        /// Pairing ID
        pairing_id: Uuid,
    },

    /// Calendar for the coming days
    Calendar {
        /// Number of days to show
        #[arg(short, long, default_value = "7")]
        days: i64,
    },

    /// Organization statistics
    Stats,

    /// Pairing algorithm settings and runs
    #[command(subcommand)]
    Algorithm(AlgorithmCommands),
}

#[derive(Subcommand)]
pub enum AlgorithmCommands {
    /// Show the current settings
    Show,

    /// Change the settings
    Set {
        /// Pairing period in days
        #[arg(long)]
        period_days: i32,

        /// Seed for the shuffle
        #[arg(long)]
        seed: i64,
    },

    /// Run the algorithm now
    Run,
}

/// Sign in and run one command
pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let shell = Arc::new(AppShell::new(config).context("failed to set up the client")?);
    shell.bootstrap("/login").await;
    let watcher = shell.watch_session();

    let form = LoginForm {
        email: cli.email.clone().ok_or_else(|| anyhow!("--email or PAIRING_EMAIL is required"))?,
        password: cli
            .password
            .clone()
            .ok_or_else(|| anyhow!("--password or PAIRING_PASSWORD is required"))?,
    };
    let home = shell.try_sign_in(&form).await?;
    info!(home = %home, "Signed in");

    let result = dispatch(&cli, &shell).await;
    shell.sign_out().await;
    watcher.abort();
    result
}

async fn dispatch(cli: &Cli, shell: &Arc<AppShell>) -> Result<()> {
    let out = cli.output;
    match &cli.command {
        Commands::Whoami => {
            let user = shell.session().user().context("no profile loaded")?;
            match out {
                OutputFormat::Json => print_json(&user)?,
                OutputFormat::Pretty => {
                    println!("{} <{}>", user.display_name(), user.email);
                    println!("role: {}", user.role.label());
                    if let Some(header) = shell.header().await? {
                        if let Some(org) = header.organization {
                            println!("organization: {org}");
                        }
                    }
                }
            }
        }

        Commands::Pairings { past } => {
            let mut screen = PairingsScreen::new(shell.client().clone())?;
            screen.load().await?;
            let tab = if *past { PairingsTab::Past } else { PairingsTab::Active };
            let rows = screen.tab(tab, Utc::now());
            match out {
                OutputFormat::Json => print_json(&rows.iter().map(PairingLine::from).collect::<Vec<_>>())?,
                OutputFormat::Pretty if rows.is_empty() => println!("No pairings"),
                OutputFormat::Pretty => {
                    for row in rows {
                        println!(
                            "{}  {}  {} - {}  ({:?})",
                            row.pairing_id,
                            row.partner_name,
                            row.period_start.format("%Y-%m-%d"),
                            row.period_end.format("%Y-%m-%d"),
                            row.status
                        );
                    }
                }
            }
        }

        Commands::Chat { pairing_id } => chat(shell, *pairing_id).await?,

        Commands::Calendar { days } => {
            let mut screen = shell.calendar_screen()?;
            let start = Utc::now();
            let grouped = screen.load_window(start, start + Duration::days(*days)).await?;
            match out {
                OutputFormat::Json => print_json(grouped)?,
                OutputFormat::Pretty => {
                    for (day, occurrences) in grouped {
                        println!("{day}");
                        for o in occurrences {
                            println!(
                                "  {} - {}  {}",
                                o.range.start.format("%H:%M"),
                                o.range.end.format("%H:%M"),
                                o.title
                            );
                        }
                    }
                }
            }
        }

        Commands::Stats => {
            let organization_id = organization(cli, shell)?;
            let stats = StatisticsScreen::new(shell.client().clone(), organization_id)
                .load()
                .await?;
            match out {
                OutputFormat::Json => print_json(&stats)?,
                OutputFormat::Pretty => {
                    for card in statistics::cards(&stats) {
                        println!("{:<20} {}", card.label, card.value);
                    }
                }
            }
        }

        Commands::Algorithm(command) => {
            let mut screen = AlgorithmScreen::new(shell.client().clone(), organization(cli, shell)?);
            match command {
                AlgorithmCommands::Show => {
                    let settings = screen.load().await?;
                    match out {
                        OutputFormat::Json => print_json(settings)?,
                        OutputFormat::Pretty => println!(
                            "period: {} days, seed: {}",
                            settings.period_length_days, settings.random_seed
                        ),
                    }
                }
                AlgorithmCommands::Set { period_days, seed } => {
                    let form = screen.form_mut();
                    form.period_length_days = *period_days;
                    form.random_seed = *seed;
                    report(screen.save().await)?;
                }
                AlgorithmCommands::Run => {
                    report(screen.execute().await)?;
                    if let (OutputFormat::Json, Some(result)) = (out, screen.last_run()) {
                        print_json(result)?;
                    } else if let Some(result) = screen.last_run() {
                        for warning in &result.warnings {
                            println!("warning: {warning}");
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Interactive chat until stdin closes, the connection drops or ctrl-c
async fn chat(shell: &Arc<AppShell>, pairing_id: Uuid) -> Result<()> {
    let client = shell.client().clone();
    let mut pairings = PairingsScreen::new(client.clone())?;
    pairings.load().await?;
    let now = Utc::now();
    let partner = [PairingsTab::Active, PairingsTab::Past]
        .into_iter()
        .flat_map(|tab| pairings.tab(tab, now))
        .find(|row| row.pairing_id == pairing_id)
        .map(|row| row.partner_name)
        .context("pairing not found")?;

    let realtime = SubscriptionClient::connect_for(&shell.config().graphql, shell.session()).await?;
    let mut screen = ChatScreen::open(
        client,
        &realtime,
        pairing_id,
        partner.clone(),
        shell.config().timing.typing_idle(),
    )
    .await?;

    for row in screen.rows() {
        let who = if row.mine { "you" } else { partner.as_str() };
        println!("[{}] {who}: {}", row.sent_at.format("%m-%d %H:%M"), row.content);
    }

    let mut updates = screen.updates();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    screen.set_draft(line).await;
                    if let Err(notice) = screen.submit().await {
                        eprintln!("{notice}");
                    }
                }
                None => break,
            },
            update = updates.recv() => match update {
                Ok(ChatUpdate::ScrollToBottom(id) | ChatUpdate::Updated(id)) => {
                    if let Some(row) = screen.rows().into_iter().find(|r| r.id == id && !r.mine) {
                        println!("[{}] {partner}: {}", row.sent_at.format("%m-%d %H:%M"), row.content);
                    }
                }
                Ok(ChatUpdate::TypingChanged(true)) => {
                    if let Some(line) = screen.typing_line() {
                        println!("{line}");
                    }
                }
                Ok(ChatUpdate::ReadReceipts(count)) => println!("({count} seen)"),
                Ok(ChatUpdate::Disconnected(recovery)) => match recovery {
                    Recovery::Reauthenticate => {
                        screen.close().await;
                        realtime.close();
                        return Err(AppError::SessionExpired.into());
                    }
                    Recovery::Reconnect => {
                        eprintln!("Connection lost; run the command again to reconnect");
                        break;
                    }
                    Recovery::GiveUp => {
                        eprintln!("Connection closed by the server");
                        break;
                    }
                },
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    screen.close().await;
    realtime.close();
    Ok(())
}

fn organization(cli: &Cli, shell: &AppShell) -> Result<Uuid> {
    cli.organization
        .or_else(|| shell.session().organization_id())
        .context("no organization; pass --organization")
}

fn report(notice: Notice) -> Result<()> {
    if notice.is_error() {
        return Err(notice_error(notice).into());
    }
    println!("{notice}");
    Ok(())
}

fn notice_error(notice: Notice) -> AppError {
    match notice.fields {
        Some(fields) => AppError::Validation(fields.summary()),
        None => AppError::Server(notice.message),
    }
}

/// Classify a failed command by the typed error behind it
pub fn failure(err: anyhow::Error) -> AppError {
    let err = match err.downcast::<AppError>() {
        Ok(app) => return app,
        Err(err) => err,
    };
    let err = match err.downcast::<ClientError>() {
        Ok(client) => return client.into(),
        Err(err) => err,
    };
    let err = match err.downcast::<RealtimeError>() {
        Ok(realtime) => return realtime.into(),
        Err(err) => err,
    };
    match err.downcast::<ConfigError>() {
        Ok(config) => config.into(),
        Err(err) => AppError::internal(err),
    }
}

/// Report a failure on stderr in the chosen format
pub fn print_failure(err: &AppError, output: OutputFormat) {
    match output {
        OutputFormat::Json => match serde_json::to_string(&ErrorSummary::from(err)) {
            Ok(json) => eprintln!("{json}"),
            Err(_) => eprintln!("Error [{}]: {err}", err.error_code()),
        },
        OutputFormat::Pretty => eprintln!("Error [{}]: {err}", err.error_code()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PairingLine {
    pairing_id: Uuid,
    partner: String,
    period_start: chrono::DateTime<Utc>,
    period_end: chrono::DateTime<Utc>,
}

impl From<&crate::screens::PairingRow> for PairingLine {
    fn from(row: &crate::screens::PairingRow) -> Self {
        Self {
            pairing_id: row.pairing_id,
            partner: row.partner_name.clone(),
            period_start: row.period_start,
            period_end: row.period_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_algorithm_set() {
        let cli = Cli::try_parse_from([
            "pairing",
            "--email",
            "ada@example.com",
            "algorithm",
            "set",
            "--period-days",
            "7",
            "--seed",
            "3",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Algorithm(AlgorithmCommands::Set {
                period_days: 7,
                seed: 3
            })
        ));
    }

    #[test]
    fn test_chat_needs_pairing_id() {
        assert!(Cli::try_parse_from(["pairing", "chat", "not-a-uuid"]).is_err());
    }

    #[test]
    fn test_validation_notice_becomes_summary() {
        let mut fields = pairing_client::FieldErrors::new();
        fields.add("period_length_days", "Period must be between 1 and 365 days");
        let err = notice_error(Notice::invalid(fields));
        assert!(err.to_string().contains("Period must be between 1 and 365 days"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_failure_keeps_client_error_category() {
        let err = anyhow::Error::from(ClientError::InvalidCredentials);
        let app = failure(err.context("sign-in failed"));
        assert_eq!(app.error_code(), "INVALID_CREDENTIALS");
        assert_eq!(app.exit_code(), 2);
    }

    #[test]
    fn test_failure_of_lost_connection() {
        let err = anyhow::Error::from(RealtimeError::ConnectionClosed {
            code: Some(4500),
            reason: "Internal server error".into(),
        });
        let app = failure(err);
        assert_eq!(app.error_code(), "NETWORK_ERROR");
        assert_eq!(app.exit_code(), 1);
    }

    #[test]
    fn test_untyped_failure_is_internal() {
        let app = failure(anyhow!("pairing not found"));
        assert_eq!(app.error_code(), "INTERNAL_ERROR");
        assert_eq!(app.to_string(), "pairing not found");
    }
}
