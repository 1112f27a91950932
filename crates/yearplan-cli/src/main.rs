#![forbid(unsafe_code)]

mod cmd;
mod output;
mod validate;

use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use validate::ValidationError;
use yearplan_core::config::{EffectiveConfig, resolve_config};
use yearplan_core::error::{ErrorCode, PlanError};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "yp: plan your year around one big challenge",
    long_about = "yp keeps a yearly plan: a theme, one anchor challenge, goals in four \
                  life categories, six milestone experiences, protected days, weekly \
                  reviews, and a prep checklist.\n\nRun `yp` with no subcommand to show \
                  the last selected view."
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json, FORMAT, and config).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Treat this date as today (YYYY-MM-DD).
    #[arg(long, global = true, hide = true, value_name = "DATE")]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    /// Output mode from flags alone, used before config is available.
    fn flag_output_mode(&self) -> OutputMode {
        self.format.unwrap_or(if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        })
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Start a plan",
        long_about = "Create a new plan for a year with the default theme and prep checklist.",
        after_help = "EXAMPLES:\n    # Plan the current year\n    yp init\n\n    # Plan next year with a theme\n    yp init --year 2027 --theme \"Quiet Strength\"\n\n    # Start over\n    yp init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Finish setup",
        long_about = "Mark setup complete. Requires the anchor challenge to have a date.",
        after_help = "EXAMPLES:\n    yp finish"
    )]
    Finish,

    #[command(
        next_help_heading = "Read",
        about = "Show the plan dashboard",
        long_about = "Summarize the theme, anchor, goals, milestones, protected days, weekly score, and prep progress.",
        after_help = "EXAMPLES:\n    yp status\n\n    # Emit machine-readable output\n    yp status --json"
    )]
    Status,

    #[command(
        next_help_heading = "Calendar",
        about = "Show the year calendar",
        long_about = "Render the plan year as month grids starting on Monday. Anchor, milestone, and protected days are marked.",
        after_help = "EXAMPLES:\n    # Whole year\n    yp calendar\n\n    # One month\n    yp calendar --month 3"
    )]
    Calendar(cmd::calendar::CalendarArgs),

    #[command(
        next_help_heading = "Calendar",
        about = "Assign a day",
        long_about = "Assign a day to the anchor, a milestone, or the protected list, or clear it. A day belongs to at most one of them.",
        after_help = "EXAMPLES:\n    # Anchor challenge on May 9th\n    yp mark 2026-05-09 --as anchor\n\n    # Add a day to milestone 2\n    yp mark 2026-03-14 --as milestone --slot 2\n\n    # Protect day offset 200\n    yp mark 200 --as protected\n\n    # Free a day\n    yp mark 2026-03-14 --as clear"
    )]
    Mark(cmd::mark::MarkArgs),

    #[command(
        next_help_heading = "Calendar",
        about = "Toggle a protected day",
        long_about = "Protect a day, or unprotect it if it already is.",
        after_help = "EXAMPLES:\n    yp protect 2026-07-04"
    )]
    Protect(cmd::protect::ProtectArgs),

    #[command(
        next_help_heading = "Calendar",
        about = "Days until the next milestone",
        long_about = "Show the next milestone whose first day is today or later, and how many days away it is.",
        after_help = "EXAMPLES:\n    yp countdown"
    )]
    Countdown,

    #[command(
        next_help_heading = "Plan",
        about = "Show or set the theme",
        after_help = "EXAMPLES:\n    yp theme\n\n    yp theme \"Year of Yes\""
    )]
    Theme(cmd::theme::ThemeArgs),

    #[command(
        next_help_heading = "Plan",
        about = "Manage the anchor challenge",
        after_help = "EXAMPLES:\n    yp anchor show\n\n    yp anchor set --title \"Rim to rim\" --date 2026-10-03\n\n    yp anchor suggest \"trail running\" --apply"
    )]
    Anchor(cmd::anchor::AnchorArgs),

    #[command(
        next_help_heading = "Plan",
        about = "Manage goals",
        after_help = "EXAMPLES:\n    yp goal add --category health --title \"Run 3x a week\"\n\n    yp goal list --category wealth\n\n    yp goal done k2j9x0a1b"
    )]
    Goal(cmd::goal::GoalArgs),

    #[command(
        next_help_heading = "Plan",
        about = "Manage milestone experiences",
        after_help = "EXAMPLES:\n    yp milestone list\n\n    yp milestone set 1 --title \"Ski trip\"\n\n    yp milestone pick 2026-02-10 --slot 1\n\n    yp milestone suggest \"sailing\" --slot 3 --apply"
    )]
    Milestone(cmd::milestone::MilestoneArgs),

    #[command(
        next_help_heading = "Review",
        about = "Weekly reviews",
        after_help = "EXAMPLES:\n    yp week add --execution 8 --effort 9 --non-negotiable \"The First 60\" --win health=\"3 runs\" --done health\n\n    yp week list --limit 4"
    )]
    Week(cmd::week::WeekArgs),

    #[command(
        next_help_heading = "Review",
        about = "Prep checklist",
        after_help = "EXAMPLES:\n    yp prep list\n\n    yp prep toggle misogi-lock"
    )]
    Prep(cmd::prep::PrepArgs),

    #[command(
        next_help_heading = "Review",
        about = "Ask the coach",
        long_about = "Ask for advice given your plan and recent weeks. Uses the configured text-generation service; falls back to a canned answer when it is unavailable.",
        after_help = "EXAMPLES:\n    yp coach how do I get back on track after a bad week"
    )]
    Coach(cmd::coach::CoachArgs),

    #[command(
        next_help_heading = "Other",
        about = "Show or switch the default view",
        after_help = "EXAMPLES:\n    # Print the current default view\n    yp view\n\n    # Make the calendar the default and show it\n    yp view calendar"
    )]
    View(cmd::view::ViewArgs),

    #[command(
        next_help_heading = "Other",
        about = "Inspect configuration",
        after_help = "EXAMPLES:\n    yp config show"
    )]
    Config(cmd::config::ConfigArgs),

    #[command(
        next_help_heading = "Other",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    yp completions bash > ~/.local/share/bash-completion/completions/yp"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

/// Filter used when `YEARPLAN_LOG` is unset.
const fn default_filter(verbose: bool, debug: bool) -> &'static str {
    if debug {
        "yearplan=debug,yp=debug,info"
    } else if verbose {
        "yearplan=info,yp=info,warn"
    } else {
        "warn"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("YEARPLAN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(default_filter(verbose, env::var("DEBUG").is_ok()))
    });

    let format = env::var("YEARPLAN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Map any command failure to a structured CLI error.
fn to_cli_error(err: &anyhow::Error) -> CliError {
    if let Some(plan) = err.downcast_ref::<PlanError>() {
        let mut cli = CliError::from(plan);
        cli.message = format!("{err:#}");
        return cli;
    }
    if let Some(invalid) = err.downcast_ref::<ValidationError>() {
        return invalid.to_cli_error();
    }
    CliError::new(format!("{err:#}"))
}

/// Config failures happen before any command runs and carry their own code.
fn config_error(err: &anyhow::Error) -> CliError {
    let code = ErrorCode::ConfigParseError;
    CliError::with_details(
        format!("{}: {err:#}", code.message()),
        code.hint().unwrap_or("check the config file"),
        code.code(),
    )
}

fn run(cli: Cli, config: EffectiveConfig, output: OutputMode) -> anyhow::Result<()> {
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    debug!(?output, %today, "resolved invocation");

    if let Some(Commands::Completions(args)) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let ctx = cmd::Context::new(config, output, today);

    match cli.command {
        None => cmd::view::run_stored_view(&ctx),
        Some(Commands::Init(args)) => cmd::init::run_init(&args, &ctx),
        Some(Commands::Finish) => cmd::finish::run_finish(&ctx),
        Some(Commands::Status) => cmd::status::run_status(&ctx),
        Some(Commands::Calendar(args)) => cmd::calendar::run_calendar(&args, &ctx),
        Some(Commands::Mark(args)) => cmd::mark::run_mark(&args, &ctx),
        Some(Commands::Protect(args)) => cmd::protect::run_protect(&args, &ctx),
        Some(Commands::Countdown) => cmd::countdown::run_countdown(&ctx),
        Some(Commands::Theme(args)) => cmd::theme::run_theme(&args, &ctx),
        Some(Commands::Anchor(args)) => cmd::anchor::run_anchor(&args, &ctx),
        Some(Commands::Goal(args)) => cmd::goal::run_goal(&args, &ctx),
        Some(Commands::Milestone(args)) => cmd::milestone::run_milestone(&args, &ctx),
        Some(Commands::Week(args)) => cmd::week::run_week(&args, &ctx),
        Some(Commands::Prep(args)) => cmd::prep::run_prep(&args, &ctx),
        Some(Commands::Coach(args)) => cmd::coach::run_coach(&args, &ctx),
        Some(Commands::View(args)) => cmd::view::run_view(&args, &ctx),
        Some(Commands::Config(args)) => cmd::config::run_config(&args, &ctx),
        Some(Commands::Completions(_)) => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let config = match resolve_config(cli.json) {
        Ok(config) => config,
        Err(err) => {
            debug!(error = ?err, "config resolution failed");
            if render_error(cli.flag_output_mode(), &config_error(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            return ExitCode::FAILURE;
        }
    };
    let output = cli
        .format
        .unwrap_or_else(|| OutputMode::from_name(&config.resolved_output));

    match run(cli, config, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = ?err, "command failed");
            if render_error(output, &to_cli_error(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
