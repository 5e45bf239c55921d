//! SousChef - Smart recipe assistant CLI
//!
#![doc = "SousChef - Smart recipe assistant CLI"]
#![doc = "Main entry point for the SousChef application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use souschef::cli::{
    AdminCommand, AuthCommand, Cli, Commands, PantryCommand, PrefsCommand, RecipeCommand,
};
use souschef::commands;
use souschef::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    souschef::session::metrics::init_metrics_exporter();

    // Execute command
    match cli.command {
        Commands::Auth { command } => {
            match command {
                AuthCommand::Register { email, password } => {
                    tracing::info!("Registering account: {}", email);
                    commands::auth::register(&config, &email, password)?;
                }
                AuthCommand::Login { email, password } => {
                    tracing::info!("Signing in: {}", email);
                    commands::auth::login(&config, &email, password)?;
                }
                AuthCommand::Logout => {
                    tracing::info!("Signing out");
                    commands::auth::logout(&config)?;
                }
                AuthCommand::ResetPassword {
                    email,
                    new_password,
                } => {
                    tracing::info!("Resetting password: {}", email);
                    commands::auth::reset_password(&config, &email, new_password)?;
                }
                AuthCommand::Whoami => {
                    commands::auth::whoami(&config)?;
                }
            }
            Ok(())
        }
        Commands::Chat { model } => {
            tracing::info!("Starting chat session");
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }

            commands::chat::run_chat(config, model.as_deref()).await?;
            Ok(())
        }
        Commands::Recipes { command } => {
            match command {
                RecipeCommand::List { tags } => {
                    commands::recipes::list_recipes(&config, &tags)?;
                }
                RecipeCommand::Show { id } => {
                    commands::recipes::show_recipe(&config, &id)?;
                }
                RecipeCommand::Featured { count } => {
                    commands::recipes::featured_recipes(&config, count)?;
                }
            }
            Ok(())
        }
        Commands::Prefs { command } => {
            match command {
                PrefsCommand::Show => {
                    commands::prefs::show_preferences(&config)?;
                }
                PrefsCommand::Set {
                    dietary_tags,
                    kitchen_tools,
                    cooking_time,
                    budget,
                    use_weekly_specials,
                } => {
                    let update = commands::prefs::PreferencesUpdate {
                        dietary_tags,
                        kitchen_tools,
                        cooking_time,
                        budget,
                        use_weekly_specials,
                    };
                    commands::prefs::set_preferences(&config, update)?;
                }
                PrefsCommand::Pantry { command } => match command {
                    PantryCommand::Add { item } => {
                        commands::prefs::add_pantry_item(&config, &item)?;
                    }
                    PantryCommand::Remove { item } => {
                        commands::prefs::remove_pantry_item(&config, &item)?;
                    }
                },
            }
            Ok(())
        }
        Commands::Admin { command } => {
            match command {
                AdminCommand::Seed => {
                    tracing::info!("Seeding sample recipes");
                    commands::admin::seed(&config)?;
                }
                AdminCommand::Settings { command } => {
                    commands::admin::handle_settings(&config, command)?;
                }
                AdminCommand::Stats => {
                    commands::admin::stats(&config)?;
                }
                AdminCommand::SetPlan { email, plan } => {
                    tracing::info!("Changing plan for {}: {}", email, plan);
                    commands::admin::set_plan(&config, &email, &plan)?;
                }
            }
            Ok(())
        }
        Commands::Verify => {
            tracing::info!("Verifying provider connectivity");
            commands::verify::run_verify(&config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "souschef=debug"
    } else {
        "souschef=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
