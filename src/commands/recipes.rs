//! Recipe catalog command handlers
//!
//! Table listings and full recipe cards for the local catalog. The
//! compact card renderer is shared with the chat session, which prints
//! matched recipes under assistant suggestions.

use crate::config::Config;
use crate::error::Result;
use crate::store::types::RecipeRecord;
use crate::suggestions::canonicalize_tag;

use colored::Colorize;
use prettytable::{row, Table};

use super::open_database;

/// List recipes, optionally filtered by dietary tags
pub fn list_recipes(config: &Config, tags: &[String]) -> Result<()> {
    let db = open_database(config)?;
    let recipes = db.recipes().list()?;

    let filtered: Vec<RecipeRecord> = if tags.is_empty() {
        recipes
    } else {
        // Tags are stored in canonical casing, so normalize the input
        // before comparing ("vegetarian" finds "Vegetarian").
        let wanted: Vec<String> = tags.iter().map(|t| canonicalize_tag(t)).collect();
        recipes
            .into_iter()
            .filter(|r| r.matches_any_tag(&wanted))
            .collect()
    };

    if filtered.is_empty() {
        println!("No recipes found. Run `souschef admin seed` to load samples.");
        return Ok(());
    }

    output_recipes_table(&filtered);
    Ok(())
}

/// Show a single recipe in full
pub fn show_recipe(config: &Config, id: &str) -> Result<()> {
    let db = open_database(config)?;

    match db.recipes().get(id)? {
        Some(recipe) => print_recipe_full(&recipe),
        None => println!("No recipe found with id {}", id),
    }
    Ok(())
}

/// Show the newest recipes
pub fn featured_recipes(config: &Config, count: Option<usize>) -> Result<()> {
    let db = open_database(config)?;
    let count = count.unwrap_or(config.chat.featured_count);

    // The catalog lists newest first.
    let recipes: Vec<RecipeRecord> = db.recipes().list()?.into_iter().take(count).collect();

    if recipes.is_empty() {
        println!("No recipes found. Run `souschef admin seed` to load samples.");
        return Ok(());
    }

    println!("\nFeatured recipes:\n");
    for recipe in &recipes {
        print_recipe_card(recipe);
    }
    Ok(())
}

/// Output recipes in table format
fn output_recipes_table(recipes: &[RecipeRecord]) {
    let mut table = Table::new();
    table.add_row(row![
        "Id",
        "Name",
        "Difficulty",
        "Total Time",
        "Servings",
        "Dietary Tags",
        "Est. Cost"
    ]);

    for recipe in recipes {
        table.add_row(row![
            recipe.id,
            recipe.name,
            recipe.difficulty,
            format!("{} min", recipe.total_time()),
            recipe.servings,
            recipe.dietary_tags.join(", "),
            format!("${:.2}", recipe.estimated_cost)
        ]);
    }

    println!("\n{} recipes:\n", recipes.len());
    table.printstd();
    println!();
}

/// Print a compact recipe card
///
/// Shared with the chat session for suggestion display.
pub(crate) fn print_recipe_card(recipe: &RecipeRecord) {
    println!(
        "  {} {}",
        recipe.name.green().bold(),
        recipe.difficulty.colored_tag()
    );
    println!(
        "    {} min | serves {} | ${:.2}",
        recipe.total_time(),
        recipe.servings,
        recipe.estimated_cost
    );
    if !recipe.dietary_tags.is_empty() {
        println!("    {}", recipe.dietary_tags.join(", ").cyan());
    }
    println!("    {}", recipe.description);
    println!("    id: {}", recipe.id.dimmed());
    println!();
}

/// Print a recipe with ingredients, instructions, and nutrition
fn print_recipe_full(recipe: &RecipeRecord) {
    println!(
        "\n{} {}",
        recipe.name.green().bold(),
        recipe.difficulty.colored_tag()
    );
    println!("{}\n", recipe.description);

    println!(
        "Prep {} min | Cook {} min | Total {} min | Serves {}",
        recipe.prep_time,
        recipe.cook_time,
        recipe.total_time(),
        recipe.servings
    );
    if !recipe.dietary_tags.is_empty() {
        println!("Tags: {}", recipe.dietary_tags.join(", ").cyan());
    }
    println!("Estimated cost: ${:.2}", recipe.estimated_cost);

    println!("\n{}", "Ingredients:".bold());
    for ingredient in &recipe.ingredients {
        println!(
            "  - {} {} {}",
            ingredient.amount, ingredient.unit, ingredient.name
        );
    }

    println!("\n{}", "Instructions:".bold());
    for (step, instruction) in recipe.instructions.iter().enumerate() {
        println!("  {}. {}", step + 1, instruction);
    }

    let facts = &recipe.nutrition_facts;
    println!(
        "\nPer serving: {} cal | {}g protein | {}g carbs | {}g fat",
        facts.calories, facts.protein, facts.carbs, facts.fat
    );
    println!();
}
