//! Administrative command handlers
//!
//! Catalog seeding, freemium settings, usage statistics, and plan
//! changes. These operate directly on the local database and need no
//! signed-in account.

use crate::cli::SettingsCommand;
use crate::config::Config;
use crate::error::{Result, SousChefError};
use crate::store::types::{AdminStats, FreemiumSettings, PlanTier};

use colored::Colorize;
use prettytable::{row, Table};

use super::open_database;

/// Seed the catalog with sample recipes and persist default settings
pub fn seed(config: &Config) -> Result<()> {
    let db = open_database(config)?;

    let inserted = db.recipes().seed_samples()?;
    let settings = db.settings().load();
    db.settings().save(&settings)?;

    if inserted == 0 {
        println!("Catalog already seeded; nothing to do");
    } else {
        println!("{}", format!("Seeded {} sample recipes", inserted).green());
    }
    Ok(())
}

/// View or update freemium settings
pub fn handle_settings(config: &Config, command: SettingsCommand) -> Result<()> {
    let db = open_database(config)?;
    let store = db.settings();

    match command {
        SettingsCommand::Show => {
            print_settings(&store.load());
        }
        SettingsCommand::Set {
            session_time,
            session_frequency,
            ad_duration,
            require_email,
            show_ad,
            pdf_export,
            email_plan,
            photo_upload,
        } => {
            let mut settings = store.load();
            if let Some(seconds) = session_time {
                settings.session_time = seconds;
            }
            if let Some(days) = session_frequency {
                settings.session_frequency = days;
            }
            if let Some(seconds) = ad_duration {
                settings.ad_duration = seconds;
            }
            if let Some(flag) = require_email {
                settings.require_email = flag;
            }
            if let Some(flag) = show_ad {
                settings.show_ad = flag;
            }
            if let Some(flag) = pdf_export {
                settings.pdf_export = flag;
            }
            if let Some(flag) = email_plan {
                settings.email_plan = flag;
            }
            if let Some(flag) = photo_upload {
                settings.photo_upload = flag;
            }
            store.save(&settings)?;

            println!("{}", "Settings updated".green());
            print_settings(&settings);
        }
    }
    Ok(())
}

/// Show usage statistics
pub fn stats(config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let users = db.users();

    let stats = AdminStats {
        total_users: users.count()?,
        premium_users: users.count_premium()?,
        total_recipes: db.recipes().count()?,
        recent_users: users.recent(5)?,
    };

    println!("\n{}", "SousChef usage".bold());
    println!("  Users:    {} ({} premium)", stats.total_users, stats.premium_users);
    println!("  Recipes:  {}", stats.total_recipes);

    if stats.recent_users.is_empty() {
        println!("\nNo sessions recorded yet\n");
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(row!["Email", "Plan", "Sessions", "Last Session"]);
    for user in &stats.recent_users {
        let last = user
            .last_session
            .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "never".to_string());
        table.add_row(row![user.email, user.plan, user.session_count, last]);
    }

    println!("\nRecent activity:\n");
    table.printstd();
    println!();
    Ok(())
}

/// Change the plan for an account
pub fn set_plan(config: &Config, email: &str, plan: &str) -> Result<()> {
    let tier = PlanTier::parse_str(plan).map_err(SousChefError::Config)?;

    let db = open_database(config)?;
    db.users().set_plan(email, tier)?;

    println!("{}", format!("{} is now on the {} plan", email, tier).green());
    Ok(())
}

fn print_settings(settings: &FreemiumSettings) {
    println!("\n{}", "Freemium settings".bold());
    println!("  session_time:      {}s", settings.session_time);
    println!("  session_frequency: every {} days", settings.session_frequency);
    println!("  ad_duration:       {}s", settings.ad_duration);
    println!("  require_email:     {}", settings.require_email);
    println!("  show_ad:           {}", settings.show_ad);
    println!("  pdf_export:        {}", settings.pdf_export);
    println!("  email_plan:        {}", settings.email_plan);
    println!("  photo_upload:      {}", settings.photo_upload);
    println!();
}
