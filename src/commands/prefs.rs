//! Preference command handlers
//!
//! Cooking preferences feed the chat system prompt, so every handler
//! here requires a signed-in account.

use crate::config::Config;
use crate::error::Result;
use crate::identity;
use crate::store::types::UserPreferences;

use colored::Colorize;

use super::open_database;

/// Field updates for `prefs set`; `None` leaves the stored value alone
#[derive(Debug, Default)]
pub struct PreferencesUpdate {
    pub dietary_tags: Option<Vec<String>>,
    pub kitchen_tools: Option<Vec<String>>,
    pub cooking_time: Option<u32>,
    pub budget: Option<f64>,
    pub use_weekly_specials: Option<bool>,
}

/// Show the current preferences
pub fn show_preferences(config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let (who, _) = identity::current(&db)?;

    let prefs = db.preferences().load(&who.user_id)?;
    print_preferences(&prefs);
    Ok(())
}

/// Update preference fields
pub fn set_preferences(config: &Config, update: PreferencesUpdate) -> Result<()> {
    let db = open_database(config)?;
    let (who, _) = identity::current(&db)?;
    let store = db.preferences();

    let mut prefs = store.load(&who.user_id)?;
    if let Some(tags) = update.dietary_tags {
        prefs.dietary_tags = tags;
    }
    if let Some(tools) = update.kitchen_tools {
        prefs.kitchen_tools = tools;
    }
    if let Some(minutes) = update.cooking_time {
        prefs.cooking_time = minutes;
    }
    if let Some(dollars) = update.budget {
        prefs.budget = dollars;
    }
    if let Some(specials) = update.use_weekly_specials {
        prefs.use_weekly_specials = specials;
    }
    store.save(&who.user_id, &prefs)?;

    println!("{}", "Preferences updated".green());
    print_preferences(&prefs);
    Ok(())
}

/// Add an item to the pantry
pub fn add_pantry_item(config: &Config, item: &str) -> Result<()> {
    let db = open_database(config)?;
    let (who, _) = identity::current(&db)?;

    let prefs = db.preferences().add_pantry_item(&who.user_id, item)?;
    println!("{}", format!("Added {} to your pantry", item).green());
    println!("Pantry: {}", prefs.pantry_items.join(", "));
    Ok(())
}

/// Remove an item from the pantry
pub fn remove_pantry_item(config: &Config, item: &str) -> Result<()> {
    let db = open_database(config)?;
    let (who, _) = identity::current(&db)?;

    let prefs = db.preferences().remove_pantry_item(&who.user_id, item)?;
    println!("Removed {} from your pantry", item);
    if prefs.pantry_items.is_empty() {
        println!("Pantry: (empty)");
    } else {
        println!("Pantry: {}", prefs.pantry_items.join(", "));
    }
    Ok(())
}

fn print_preferences(prefs: &UserPreferences) {
    println!("\n{}", "Cooking preferences".bold());
    println!(
        "  Dietary tags:    {}",
        join_or_none(&prefs.dietary_tags).cyan()
    );
    println!("  Pantry items:    {}", join_or_none(&prefs.pantry_items));
    println!("  Kitchen tools:   {}", join_or_none(&prefs.kitchen_tools));
    println!("  Cooking time:    {} min", prefs.cooking_time);
    println!("  Budget:          ${:.2}/week", prefs.budget);
    println!("  Weekly specials: {}", prefs.use_weekly_specials);
    println!();
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}
