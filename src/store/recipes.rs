//! Recipe storage
//!
//! Recipes are read-only from the chat session's perspective. They are
//! created through the admin surface, which includes a sample seeding
//! command for fresh installs.

use super::connect;
use super::types::{Difficulty, Ingredient, NewRecipe, NutritionFacts, RecipeRecord};
use crate::error::{Result, SousChefError};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use std::path::PathBuf;
use uuid::Uuid;

/// Recipe reads needed by the suggestion lookup
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Recipes carrying at least one of the given dietary tags
    ///
    /// Tags match exactly against the canonical stored form. Newest
    /// recipes come first.
    async fn by_dietary_tags(&self, tags: &[String]) -> Result<Vec<RecipeRecord>>;

    /// The newest `count` recipes
    async fn featured(&self, count: usize) -> Result<Vec<RecipeRecord>>;
}

/// SQLite-backed recipe store
#[derive(Debug, Clone)]
pub struct SqliteRecipeStore {
    db_path: PathBuf,
}

/// Raw row values before the JSON columns are decoded
struct RecipeRow {
    id: String,
    name: String,
    description: String,
    image: String,
    prep_time: i64,
    cook_time: i64,
    servings: i64,
    difficulty: String,
    dietary_tags: String,
    ingredients: String,
    instructions: String,
    nutrition: String,
    estimated_cost: f64,
    created_at: String,
    updated_at: String,
}

impl RecipeRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            image: row.get(3)?,
            prep_time: row.get(4)?,
            cook_time: row.get(5)?,
            servings: row.get(6)?,
            difficulty: row.get(7)?,
            dietary_tags: row.get(8)?,
            ingredients: row.get(9)?,
            instructions: row.get(10)?,
            nutrition: row.get(11)?,
            estimated_cost: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }

    fn into_record(self) -> Result<RecipeRecord> {
        let dietary_tags: Vec<String> = serde_json::from_str(&self.dietary_tags)
            .context("Failed to parse dietary tags")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;
        let ingredients: Vec<Ingredient> = serde_json::from_str(&self.ingredients)
            .context("Failed to parse ingredients")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;
        let instructions: Vec<String> = serde_json::from_str(&self.instructions)
            .context("Failed to parse instructions")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;
        let nutrition_facts: NutritionFacts = serde_json::from_str(&self.nutrition)
            .context("Failed to parse nutrition facts")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;
        let difficulty = Difficulty::parse_str(&self.difficulty).map_err(SousChefError::Storage)?;

        Ok(RecipeRecord {
            id: self.id,
            name: self.name,
            description: self.description,
            image: self.image,
            prep_time: self.prep_time.max(0) as u32,
            cook_time: self.cook_time.max(0) as u32,
            servings: self.servings.max(0) as u32,
            difficulty,
            dietary_tags,
            ingredients,
            instructions,
            nutrition_facts,
            estimated_cost: self.estimated_cost,
            created_at: DateTime::parse_from_rfc3339(&self.created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            updated_at: DateTime::parse_from_rfc3339(&self.updated_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

const RECIPE_COLUMNS: &str = "id, name, description, image, prep_time, cook_time, servings, difficulty, dietary_tags, ingredients, instructions, nutrition, estimated_cost, created_at, updated_at";

impl SqliteRecipeStore {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Store a new recipe, assigning its id and timestamps
    pub fn insert(&self, recipe: NewRecipe) -> Result<RecipeRecord> {
        let conn = connect(&self.db_path)?;
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        let dietary_tags = serde_json::to_string(&recipe.dietary_tags)
            .context("Failed to serialize dietary tags")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;
        let ingredients = serde_json::to_string(&recipe.ingredients)
            .context("Failed to serialize ingredients")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;
        let instructions = serde_json::to_string(&recipe.instructions)
            .context("Failed to serialize instructions")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;
        let nutrition = serde_json::to_string(&recipe.nutrition_facts)
            .context("Failed to serialize nutrition facts")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        conn.execute(
            "INSERT INTO recipes (id, name, description, image, prep_time, cook_time, servings, difficulty, dietary_tags, ingredients, instructions, nutrition, estimated_cost, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
            params![
                id,
                recipe.name,
                recipe.description,
                recipe.image,
                recipe.prep_time,
                recipe.cook_time,
                recipe.servings,
                recipe.difficulty.to_string(),
                dietary_tags,
                ingredients,
                instructions,
                nutrition,
                recipe.estimated_cost,
                now.to_rfc3339(),
            ],
        )
        .context("Failed to insert recipe")
        .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(RecipeRecord {
            id,
            name: recipe.name,
            description: recipe.description,
            image: recipe.image,
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            servings: recipe.servings,
            difficulty: recipe.difficulty,
            dietary_tags: recipe.dietary_tags,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            nutrition_facts: recipe.nutrition_facts,
            estimated_cost: recipe.estimated_cost,
            created_at: now,
            updated_at: now,
        })
    }

    /// Look up a recipe by id
    pub fn get(&self, id: &str) -> Result<Option<RecipeRecord>> {
        let conn = connect(&self.db_path)?;

        let row = conn
            .query_row(
                &format!("SELECT {} FROM recipes WHERE id = ?1", RECIPE_COLUMNS),
                params![id],
                RecipeRow::from_row,
            )
            .optional()
            .context("Failed to query recipe")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        row.map(RecipeRow::into_record).transpose()
    }

    /// Rewrite an existing recipe, bumping `updated_at`
    ///
    /// The id and creation timestamp are immutable; everything else is
    /// replaced with the values in `recipe`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if no recipe has this id.
    pub fn update(&self, recipe: &RecipeRecord) -> Result<()> {
        let conn = connect(&self.db_path)?;

        let dietary_tags = serde_json::to_string(&recipe.dietary_tags)
            .context("Failed to serialize dietary tags")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;
        let ingredients = serde_json::to_string(&recipe.ingredients)
            .context("Failed to serialize ingredients")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;
        let instructions = serde_json::to_string(&recipe.instructions)
            .context("Failed to serialize instructions")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;
        let nutrition = serde_json::to_string(&recipe.nutrition_facts)
            .context("Failed to serialize nutrition facts")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        let rows = conn
            .execute(
                "UPDATE recipes SET name = ?1, description = ?2, image = ?3, prep_time = ?4,
                 cook_time = ?5, servings = ?6, difficulty = ?7, dietary_tags = ?8,
                 ingredients = ?9, instructions = ?10, nutrition = ?11, estimated_cost = ?12,
                 updated_at = ?13
                 WHERE id = ?14",
                params![
                    recipe.name,
                    recipe.description,
                    recipe.image,
                    recipe.prep_time,
                    recipe.cook_time,
                    recipe.servings,
                    recipe.difficulty.to_string(),
                    dietary_tags,
                    ingredients,
                    instructions,
                    nutrition,
                    recipe.estimated_cost,
                    Utc::now().to_rfc3339(),
                    recipe.id,
                ],
            )
            .context("Failed to update recipe")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        if rows == 0 {
            return Err(SousChefError::Storage(format!("No such recipe: {}", recipe.id)).into());
        }

        Ok(())
    }

    /// Remove a recipe by id
    ///
    /// Deleting an id that is not present is not an error.
    pub fn delete(&self, id: &str) -> Result<()> {
        let conn = connect(&self.db_path)?;

        conn.execute("DELETE FROM recipes WHERE id = ?1", params![id])
            .context("Failed to delete recipe")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(())
    }

    /// All recipes, newest first
    pub fn list(&self) -> Result<Vec<RecipeRecord>> {
        let conn = connect(&self.db_path)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM recipes ORDER BY created_at DESC, id",
                RECIPE_COLUMNS
            ))
            .context("Failed to prepare recipe list query")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map([], RecipeRow::from_row)
            .context("Failed to query recipes")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        let mut recipes = Vec::new();
        for row in rows {
            let raw = row
                .context("Failed to read recipe row")
                .map_err(|e| SousChefError::Storage(e.to_string()))?;
            recipes.push(raw.into_record()?);
        }

        Ok(recipes)
    }

    /// Total number of recipes
    pub fn count(&self) -> Result<u64> {
        let conn = connect(&self.db_path)?;

        let count: i64 = conn
            .query_row("SELECT count(*) FROM recipes", [], |r| r.get(0))
            .context("Failed to count recipes")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(count.max(0) as u64)
    }

    /// Insert the bundled sample recipes
    ///
    /// Recipes whose name is already present are skipped, so running
    /// the seed twice does not duplicate rows. Returns the number of
    /// recipes inserted.
    pub fn seed_samples(&self) -> Result<usize> {
        let mut inserted = 0;
        for recipe in sample_recipes() {
            if !self.exists_by_name(&recipe.name)? {
                self.insert(recipe)?;
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    fn exists_by_name(&self, name: &str) -> Result<bool> {
        let conn = connect(&self.db_path)?;

        let found: Option<String> = conn
            .query_row(
                "SELECT id FROM recipes WHERE name = ?1",
                params![name],
                |r| r.get(0),
            )
            .optional()
            .context("Failed to query recipe by name")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(found.is_some())
    }
}

#[async_trait]
impl RecipeStore for SqliteRecipeStore {
    async fn by_dietary_tags(&self, tags: &[String]) -> Result<Vec<RecipeRecord>> {
        let all = self.list()?;
        Ok(all
            .into_iter()
            .filter(|r| r.matches_any_tag(tags))
            .collect())
    }

    async fn featured(&self, count: usize) -> Result<Vec<RecipeRecord>> {
        let mut all = self.list()?;
        all.truncate(count);
        Ok(all)
    }
}

fn ingredient(name: &str, amount: &str, unit: &str) -> Ingredient {
    Ingredient {
        name: name.to_string(),
        amount: amount.to_string(),
        unit: unit.to_string(),
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The bundled sample recipes used by the admin seed command
fn sample_recipes() -> Vec<NewRecipe> {
    vec![
        NewRecipe {
            name: "Mediterranean Quinoa Bowl".to_string(),
            description: "A protein-packed bowl with fresh vegetables and tangy dressing."
                .to_string(),
            image: "/vibrant-quinoa-bowl.png".to_string(),
            prep_time: 15,
            cook_time: 20,
            servings: 2,
            difficulty: Difficulty::Easy,
            dietary_tags: to_strings(&["Vegetarian", "High-Protein", "Gluten-Free"]),
            ingredients: vec![
                ingredient("Quinoa", "1", "cup"),
                ingredient("Cherry Tomatoes", "1", "cup"),
                ingredient("Cucumber", "1", "medium"),
                ingredient("Red Onion", "1/4", "cup"),
                ingredient("Feta Cheese", "1/2", "cup"),
                ingredient("Kalamata Olives", "1/4", "cup"),
                ingredient("Olive Oil", "2", "tbsp"),
                ingredient("Lemon Juice", "1", "tbsp"),
                ingredient("Garlic", "1", "clove"),
                ingredient("Salt", "1/4", "tsp"),
                ingredient("Black Pepper", "1/4", "tsp"),
            ],
            instructions: to_strings(&[
                "Rinse quinoa under cold water and drain well.",
                "In a medium saucepan, combine quinoa with 2 cups of water. Bring to a boil, then reduce heat to low, cover, and simmer for 15 minutes until water is absorbed.",
                "While quinoa is cooking, chop tomatoes, cucumber, and red onion.",
                "In a small bowl, whisk together olive oil, lemon juice, minced garlic, salt, and pepper to make the dressing.",
                "Once quinoa is cooked, let it cool slightly, then transfer to a large bowl.",
                "Add chopped vegetables, olives, and feta cheese to the quinoa.",
                "Pour the dressing over the salad and toss gently to combine.",
                "Serve immediately or refrigerate for up to 3 days.",
            ]),
            nutrition_facts: NutritionFacts {
                calories: 420,
                protein: 15,
                carbs: 45,
                fat: 22,
            },
            estimated_cost: 12.0,
        },
        NewRecipe {
            name: "Sheet Pan Chicken & Vegetables".to_string(),
            description: "An easy weeknight dinner with minimal cleanup.".to_string(),
            image: "/colorful-sheet-pan-dinner.png".to_string(),
            prep_time: 10,
            cook_time: 35,
            servings: 4,
            difficulty: Difficulty::Easy,
            dietary_tags: to_strings(&["High-Protein", "Gluten-Free", "Dairy-Free"]),
            ingredients: vec![
                ingredient("Chicken Thighs", "4", "pieces"),
                ingredient("Broccoli", "1", "head"),
                ingredient("Bell Peppers", "2", "medium"),
                ingredient("Red Onion", "1", "medium"),
                ingredient("Olive Oil", "3", "tbsp"),
                ingredient("Garlic Powder", "1", "tsp"),
                ingredient("Paprika", "1", "tsp"),
                ingredient("Salt", "1", "tsp"),
                ingredient("Black Pepper", "1/2", "tsp"),
            ],
            instructions: to_strings(&[
                "Preheat oven to 425°F (220°C) and line a large baking sheet with parchment paper.",
                "Cut broccoli into florets, slice bell peppers and red onion.",
                "In a small bowl, mix olive oil, garlic powder, paprika, salt, and pepper.",
                "Place chicken thighs and vegetables on the baking sheet, keeping them separate.",
                "Drizzle the oil mixture over everything, tossing to coat evenly.",
                "Arrange in a single layer and bake for 30-35 minutes, until chicken is cooked through and vegetables are tender.",
                "Let rest for 5 minutes before serving.",
            ]),
            nutrition_facts: NutritionFacts {
                calories: 380,
                protein: 28,
                carbs: 18,
                fat: 24,
            },
            estimated_cost: 15.0,
        },
        NewRecipe {
            name: "Creamy Mushroom Pasta".to_string(),
            description: "A comforting pasta dish with a rich mushroom sauce.".to_string(),
            image: "/creamy-mushroom-parmesan.png".to_string(),
            prep_time: 10,
            cook_time: 20,
            servings: 4,
            difficulty: Difficulty::Medium,
            dietary_tags: to_strings(&["Vegetarian"]),
            ingredients: vec![
                ingredient("Fettuccine Pasta", "8", "oz"),
                ingredient("Mushrooms", "8", "oz"),
                ingredient("Garlic", "3", "cloves"),
                ingredient("Shallot", "1", "medium"),
                ingredient("Heavy Cream", "1", "cup"),
                ingredient("Parmesan Cheese", "1/2", "cup"),
                ingredient("Butter", "2", "tbsp"),
                ingredient("Olive Oil", "1", "tbsp"),
                ingredient("Thyme", "1", "tsp"),
                ingredient("Salt", "1/2", "tsp"),
                ingredient("Black Pepper", "1/4", "tsp"),
            ],
            instructions: to_strings(&[
                "Bring a large pot of salted water to a boil and cook pasta according to package directions.",
                "While pasta is cooking, slice mushrooms, mince garlic, and finely chop shallot.",
                "In a large skillet, heat olive oil and butter over medium heat.",
                "Add shallots and cook until translucent, about 2 minutes.",
                "Add garlic and cook for 30 seconds until fragrant.",
                "Add mushrooms and thyme, cooking until mushrooms are golden brown, about 5-7 minutes.",
                "Pour in heavy cream and bring to a simmer. Cook until slightly thickened, about 3-4 minutes.",
                "Stir in grated Parmesan cheese until melted and smooth.",
                "Drain pasta, reserving 1/4 cup of pasta water.",
                "Add pasta to the sauce, tossing to coat. If needed, add reserved pasta water to thin the sauce.",
                "Season with salt and pepper to taste. Serve with additional Parmesan cheese if desired.",
            ]),
            nutrition_facts: NutritionFacts {
                calories: 520,
                protein: 14,
                carbs: 48,
                fat: 32,
            },
            estimated_cost: 10.0,
        },
    ]
}
