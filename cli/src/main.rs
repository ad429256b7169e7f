mod commands;
mod config;
mod gemini;
mod server;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_dashboard, cmd_feedback, cmd_food_add, cmd_food_delete, cmd_food_list, cmd_food_update,
    cmd_meal_delete, cmd_meal_list, cmd_meal_log, cmd_meal_save, cmd_meal_update,
    cmd_settings_set, cmd_settings_show, cmd_setup, cmd_user_create, cmd_user_token,
    cmd_weight_chart, cmd_weight_delete, cmd_weight_edit, cmd_weight_history, cmd_weight_log,
};
use crate::config::Config;
use crate::gemini::GeminiClient;
use d3tr_core::gate::{self, GateDecision, RouteKind};
use d3tr_core::models::{SettingsUpdate, SetupRequest, UserId};
use d3tr_core::service::TrackerService;

#[derive(Parser)]
#[command(
    name = "d3tr",
    version,
    about = "Gain weight, hit it farther: a golf driving-distance tracker",
    long_about = "\n\n  ██████╗ ██████╗ ████████╗██████╗
  ██╔══██╗╚════██╗╚══██╔══╝██╔══██╗
  ██║  ██║ █████╔╝   ██║   ██████╔╝
  ██║  ██║ ╚═══██╗   ██║   ██╔══██╗
  ██████╔╝██████╔╝   ██║   ██║  ██║
  ╚═════╝ ╚═════╝    ╚═╝   ╚═╝  ╚═╝
     every kilo is another four yards.
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage accounts and API tokens
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Complete the one-time initial setup
    Setup {
        /// Current body weight in kg
        #[arg(long)]
        start_weight: f64,
        /// Goal body weight in kg (must be above the start weight)
        #[arg(long)]
        target_weight: f64,
        /// Current driving distance in yards
        #[arg(long)]
        start_distance: i64,
        /// Goal driving distance in yards
        #[arg(long, default_value = "300")]
        target_distance: i64,
        /// Daily calorie goal in kcal
        #[arg(long, default_value = "3000")]
        target_calories: i64,
        /// Yards gained per kg gained
        #[arg(long, default_value = "4.0")]
        ratio: f64,
        /// Start date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change targets
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Track body weight
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },
    /// Log and review meals
    Meal {
        #[command(subcommand)]
        command: MealCommands,
    },
    /// Manage saved foods for quick meal logging
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Show distance, weight and calorie progress
    Dashboard {
        /// Date for the calorie card (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask for coaching feedback on recent progress
    Feedback {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Disable token authentication; every request acts as the local user
        #[arg(long)]
        no_auth: bool,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new account and print a token for it
    Create {
        /// Email address to attach to the account
        #[arg(long)]
        email: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Issue a new API token
    Token {
        /// Account ID (default: the local user)
        #[arg(long)]
        user: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show the profile and targets
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change targets (start values cannot be changed after setup)
    Set {
        /// Goal body weight in kg
        #[arg(long)]
        target_weight: Option<f64>,
        /// Goal driving distance in yards
        #[arg(long)]
        target_distance: Option<i64>,
        /// Daily calorie goal in kcal
        #[arg(long)]
        target_calories: Option<i64>,
        /// Yards gained per kg gained (3-5)
        #[arg(long)]
        ratio: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Record weight for a day (replaces that day's value)
    Log {
        /// Weight in kg
        weight_kg: f64,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the value of a weight log
    Edit {
        /// Weight log ID
        id: i64,
        /// New weight in kg
        weight_kg: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a weight log by ID
    Delete {
        /// Weight log ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show weight history, newest first
    History {
        /// Only show the most recent N logs
        #[arg(short, long, conflicts_with_all = ["from", "to"])]
        limit: Option<u32>,
        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the recent weight trend
    Chart {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MealCommands {
    /// Log a meal
    Log {
        /// Food name
        #[arg(required_unless_present = "food")]
        name: Option<String>,
        /// Calories in kcal
        #[arg(required_unless_present = "food")]
        calories: Option<i64>,
        /// Fill name and calories from a saved food
        #[arg(long, conflicts_with_all = ["name", "calories"])]
        food: Option<i64>,
        /// Meal type: breakfast, lunch, dinner, snack
        #[arg(short, long, default_value = "snack")]
        meal: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show meals grouped by meal type
    List {
        /// Date to show (YYYY-MM-DD, default: today)
        #[arg(long, conflicts_with = "all")]
        date: Option<String>,
        /// List every meal instead of one day
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a meal
    Update {
        /// Meal ID
        id: i64,
        /// New food name
        #[arg(long)]
        name: Option<String>,
        /// New calories in kcal
        #[arg(long)]
        calories: Option<i64>,
        /// New meal type: breakfast, lunch, dinner, snack
        #[arg(long)]
        meal: Option<String>,
        /// New date (YYYY-MM-DD or today/yesterday/tomorrow)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a meal by ID
    Delete {
        /// Meal ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a meal as a reusable food
    Save {
        /// Meal ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Add a saved food
    Add {
        /// Food name
        name: String,
        /// Calories in kcal
        calories: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List saved foods
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a saved food
    Update {
        /// Food ID
        id: i64,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New calories in kcal
        #[arg(long)]
        calories: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a saved food
    Delete {
        /// Food ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Setup-gate route for the command; `None` skips the gate.
    fn route(&self) -> Option<RouteKind> {
        match self {
            Self::User { .. } | Self::Serve { .. } => Some(RouteKind::Public),
            Self::Setup { .. } => Some(RouteKind::Setup),
            Self::Settings {
                command: SettingsCommands::Show { .. },
            } => None,
            _ => Some(RouteKind::App),
        }
    }
}

fn init_tracing(command: &Commands) {
    let default = if matches!(command, Commands::Serve { .. }) {
        "info"
    } else {
        "warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.command);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let svc = TrackerService::new(&config.db_path)?;
    let (user, created) = config.load_or_create_local_user()?;
    svc.ensure_account(&user)?;
    if created {
        info!(user = %user, "Created local user");
    }

    if let Some(route) = cli.command.route() {
        match gate::decide(svc.session_for(Some(&user))?, route) {
            GateDecision::Allow => {}
            GateDecision::RedirectToSetup => {
                bail!("Initial setup has not been completed. Run `d3tr setup` first.")
            }
            GateDecision::RedirectToApp => {
                bail!("Setup is already complete. Use `d3tr settings set` to change targets.")
            }
            GateDecision::RequireLogin => bail!("No local user"),
        }
    }

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create { email, json } => {
                cmd_user_create(&svc, email.as_deref(), json)
            }
            UserCommands::Token { user: other, json } => {
                let target = other.map_or_else(|| user.clone(), UserId::from);
                cmd_user_token(&svc, &target, json)
            }
        },
        Commands::Setup {
            start_weight,
            target_weight,
            start_distance,
            target_distance,
            target_calories,
            ratio,
            date,
            json,
        } => cmd_setup(
            &svc,
            &user,
            &SetupRequest {
                start_weight,
                target_weight,
                start_distance,
                target_distance,
                target_calories,
                kg_to_yd_ratio: ratio,
            },
            date,
            json,
        ),
        Commands::Settings { command } => match command {
            SettingsCommands::Show { json } => cmd_settings_show(&svc, &user, json),
            SettingsCommands::Set {
                target_weight,
                target_distance,
                target_calories,
                ratio,
                json,
            } => cmd_settings_set(
                &svc,
                &user,
                &SettingsUpdate {
                    target_weight,
                    target_distance,
                    target_calories,
                    kg_to_yd_ratio: ratio,
                },
                json,
            ),
        },
        Commands::Weight { command } => match command {
            WeightCommands::Log {
                weight_kg,
                date,
                json,
            } => cmd_weight_log(&svc, &user, weight_kg, date, json),
            WeightCommands::Edit {
                id,
                weight_kg,
                json,
            } => cmd_weight_edit(&svc, &user, id, weight_kg, json),
            WeightCommands::Delete { id, json } => cmd_weight_delete(&svc, &user, id, json),
            WeightCommands::History {
                limit,
                from,
                to,
                json,
            } => cmd_weight_history(&svc, &user, limit, from, to, json),
            WeightCommands::Chart { json } => cmd_weight_chart(&svc, &user, json),
        },
        Commands::Meal { command } => match command {
            MealCommands::Log {
                name,
                calories,
                food,
                meal,
                date,
                json,
            } => cmd_meal_log(&svc, &user, name, calories, food, &meal, date, json),
            MealCommands::List { date, all, json } => {
                cmd_meal_list(&svc, &user, date, all, json)
            }
            MealCommands::Update {
                id,
                name,
                calories,
                meal,
                date,
                json,
            } => cmd_meal_update(&svc, &user, id, name, calories, meal.as_deref(), date, json),
            MealCommands::Delete { id, json } => cmd_meal_delete(&svc, &user, id, json),
            MealCommands::Save { id, json } => cmd_meal_save(&svc, &user, id, json),
        },
        Commands::Food { command } => match command {
            FoodCommands::Add {
                name,
                calories,
                json,
            } => cmd_food_add(&svc, &user, name, calories, json),
            FoodCommands::List { json } => cmd_food_list(&svc, &user, json),
            FoodCommands::Update {
                id,
                name,
                calories,
                json,
            } => cmd_food_update(&svc, &user, id, name, calories, json),
            FoodCommands::Delete { id, json } => cmd_food_delete(&svc, &user, id, json),
        },
        Commands::Dashboard { date, json } => cmd_dashboard(&svc, &user, date, json),
        Commands::Feedback { json } => {
            let client = gemini_client(&config)?;
            cmd_feedback(&svc, &user, client.as_ref(), json).await
        }
        Commands::Serve {
            port,
            bind,
            no_auth,
        } => {
            let auth = if no_auth {
                server::AuthMode::Local(user)
            } else {
                eprintln!("Token authentication enabled. Issue a token with `d3tr user token`.");
                server::AuthMode::Tokens
            };
            let client = gemini_client(&config)?;
            server::start_server(svc, port, &bind, auth, client).await
        }
    }
}

fn gemini_client(config: &Config) -> Result<Option<GeminiClient>> {
    config
        .gemini_api_key
        .as_deref()
        .map(|key| GeminiClient::new(key, config.gemini_model.as_str()))
        .transpose()
}
