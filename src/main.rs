// ci-limits - Main Entry Point
//
// Command-line front end for the build limit model:
// - prints the active plan table
// - runs a limit resolution scenario for one user and one app

use anyhow::{Context, Result};
use ci_limits::config::Config;
use ci_limits::limits::{App, AppKind, AppLimits, Limit, OverrideState, Plan, PlanTable, User};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// ci-limits: build quota resolution for CI apps
#[derive(Parser, Debug)]
#[command(name = "ci-limits")]
#[command(author = "ci-limits Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Resolve effective build limits for CI apps", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to the configuration file (default: XDG config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the limits of every plan
    Plans,
    /// Resolve the effective limit of a freshly uploaded app
    Resolve(ResolveArgs),
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// Plan of the app's owner (free, developer, organization)
    #[arg(long)]
    plan: Plan,

    /// Kind of app to upload
    #[arg(long, value_enum)]
    app: Visibility,

    /// Admin-set custom limit: concurrent,minutes,builds_per_month,team_members
    #[arg(long)]
    custom: Option<Limit>,

    /// Clear the custom limit (after --custom)
    #[arg(long)]
    clear: bool,

    /// Owner opts out of the public app default (after --custom and --clear)
    #[arg(long)]
    opt_out: bool,

    /// Move the owner to another plan once the app is set up
    #[arg(long)]
    upgrade: Option<Plan>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Visibility {
    Private,
    Public,
}

#[derive(Serialize)]
struct Resolution {
    app: AppKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<OverrideState>,
    owner_plan: Limit,
    limit: Limit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    init_tracing(&config, cli.verbose)?;
    debug!("Using configuration: {:?}", config);

    let plans = Arc::new(config.plans.clone());

    match cli.command {
        Commands::Plans => show_plans(&plans, cli.json),
        Commands::Resolve(args) => resolve(plans, args, cli.json),
    }
}

fn init_tracing(config: &Config, verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { config.log_level()? };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // stdout carries command output only
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.logging.format.to_lowercase().as_str() {
        "json" => builder.json().init(),
        "pretty" => builder.pretty().init(),
        _ => builder.compact().init(),
    }

    Ok(())
}

fn show_plans(plans: &PlanTable, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(plans)?);
        return Ok(());
    }

    for plan in Plan::ALL {
        println!("{:<14}{}", plan.to_string(), plans.get(plan));
    }
    println!("{:<14}{}", "public app", plans.public_app_default());
    Ok(())
}

fn resolve(plans: Arc<PlanTable>, args: ResolveArgs, json: bool) -> Result<()> {
    let user = User::subscribe(args.plan, Arc::clone(&plans));
    let mut app: App = match args.app {
        Visibility::Private => user.upload_private_app().into(),
        Visibility::Public => user.upload_public_app().into(),
    };
    info!(user_id = %user.id(), app_id = %app.id(), plan = %args.plan, "Resolving limit");

    if let Some(custom) = args.custom {
        app.set_limit(custom).context("Failed to set custom limit")?;
    }
    if args.clear {
        app.clear_limit().context("Failed to clear custom limit")?;
    }
    if args.opt_out {
        user.request_opt_out(&mut app).context("Failed to opt out of public app limit")?;
    }
    if let Some(upgrade) = args.upgrade {
        user.set_plan(plans.get(upgrade));
    }

    let resolution = Resolution {
        app: app.kind(),
        state: app.override_state(),
        owner_plan: user.plan(),
        limit: app.limit(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        let kind = match resolution.state {
            Some(OverrideState::Custom) => format!("{} (custom limit)", resolution.app),
            Some(OverrideState::Default) => format!("{} (default limit)", resolution.app),
            None => resolution.app.to_string(),
        };
        println!("app:         {}", kind);
        println!("owner plan:  {}", resolution.owner_plan);
        println!("limit:       {}", resolution.limit);
    }

    Ok(())
}
