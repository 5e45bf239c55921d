//! Domain types shared by the stores
//!
//! Accounts, recipes, freemium settings, and preferences as they are
//! persisted and passed between components.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Plan tier for a user account
///
/// Gates session frequency and the free-tier feature flags. Tier
/// upgrades happen through the admin surface, never from the gated
/// session flow itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Free tier: one gated session per eligibility window
    #[default]
    Free,
    /// Premium tier: unlimited sessions, no expiry timer
    Premium,
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Premium => write!(f, "premium"),
        }
    }
}

impl PlanTier {
    /// Parse a plan tier from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use souschef::store::PlanTier;
    ///
    /// let tier = PlanTier::parse_str("premium").unwrap();
    /// assert_eq!(tier, PlanTier::Premium);
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "premium" => Ok(Self::Premium),
            other => Err(format!("Unknown plan tier: {}", other)),
        }
    }

    /// Whether this tier skips the free-tier gating rules
    pub fn is_premium(&self) -> bool {
        matches!(self, Self::Premium)
    }
}

/// A user account as stored by the user store
///
/// `session_count` is monotonically non-decreasing and `last_session`,
/// once set, only moves forward; both are stamped solely by the session
/// recorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// Opaque account id (UUID v4)
    pub id: String,
    /// Email address used for sign-in
    pub email: String,
    /// Plan tier
    pub plan: PlanTier,
    /// Whether sign-in is blocked for this account
    pub disabled: bool,
    /// Start of the most recent gated session, if any
    pub last_session: Option<DateTime<Utc>>,
    /// Cumulative gated sessions; absent in storage reads as 0
    pub session_count: u32,
    /// Account creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

/// Recipe difficulty rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

impl Difficulty {
    /// Parse a difficulty from a string
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(format!("Unknown difficulty: {}", other)),
        }
    }

    /// Colored tag representation for terminal output
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Easy => format!("[{}]", "EASY".green()),
            Self::Medium => format!("[{}]", "MEDIUM".yellow()),
            Self::Hard => format!("[{}]", "HARD".red()),
        }
    }
}

/// A single ingredient line in a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
    pub unit: String,
}

/// Per-serving nutrition summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: u32,
    /// Grams of protein
    pub protein: u32,
    /// Grams of carbohydrates
    pub carbs: u32,
    /// Grams of fat
    pub fat: u32,
}

/// A recipe record as stored by the recipe store
///
/// Read-only from the gated session's perspective; created and edited
/// through the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeRecord {
    /// Opaque recipe id (UUID v4)
    pub id: String,
    pub name: String,
    pub description: String,
    /// Media reference (image path or URL)
    pub image: String,
    /// Preparation time in minutes
    pub prep_time: u32,
    /// Cooking time in minutes
    pub cook_time: u32,
    pub servings: u32,
    pub difficulty: Difficulty,
    /// Canonical dietary tags (e.g. "Vegan", "Gluten-Free")
    pub dietary_tags: Vec<String>,
    /// Ordered ingredient list
    pub ingredients: Vec<Ingredient>,
    /// Ordered instruction steps
    pub instructions: Vec<String>,
    pub nutrition_facts: NutritionFacts,
    /// Estimated cost in whole currency units
    pub estimated_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecipeRecord {
    /// Total time from counter to table, in minutes
    pub fn total_time(&self) -> u32 {
        self.prep_time + self.cook_time
    }

    /// Whether any of this recipe's dietary tags appears in `tags`
    pub fn matches_any_tag(&self, tags: &[String]) -> bool {
        self.dietary_tags.iter().any(|t| tags.contains(t))
    }
}

/// Fields for creating a recipe; the store assigns id and timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub description: String,
    pub image: String,
    pub prep_time: u32,
    pub cook_time: u32,
    pub servings: u32,
    pub difficulty: Difficulty,
    pub dietary_tags: Vec<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub nutrition_facts: NutritionFacts,
    pub estimated_cost: f64,
}

/// Admin-adjustable freemium settings, persisted as a flat record
///
/// A failed or missing load degrades to these defaults; the gating flow
/// never blocks on settings availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreemiumSettings {
    /// Free-session duration in seconds
    #[serde(default = "default_session_time")]
    pub session_time: u64,

    /// Days between free sessions
    #[serde(default = "default_session_frequency")]
    pub session_frequency: u32,

    /// Advertisement duration in seconds
    #[serde(default = "default_ad_duration")]
    pub ad_duration: u64,

    /// Require a well-formed email at registration
    #[serde(default = "default_require_email")]
    pub require_email: bool,

    /// Show the ad gate before free sessions
    #[serde(default = "default_show_ad")]
    pub show_ad: bool,

    /// Free-tier feature flag: PDF export
    #[serde(default)]
    pub pdf_export: bool,

    /// Free-tier feature flag: emailed meal plans
    #[serde(default)]
    pub email_plan: bool,

    /// Free-tier feature flag: photo upload
    #[serde(default)]
    pub photo_upload: bool,
}

fn default_session_time() -> u64 {
    30
}

fn default_session_frequency() -> u32 {
    7
}

fn default_ad_duration() -> u64 {
    15
}

fn default_require_email() -> bool {
    true
}

fn default_show_ad() -> bool {
    true
}

impl Default for FreemiumSettings {
    fn default() -> Self {
        Self {
            session_time: default_session_time(),
            session_frequency: default_session_frequency(),
            ad_duration: default_ad_duration(),
            require_email: default_require_email(),
            show_ad: default_show_ad(),
            pdf_export: false,
            email_plan: false,
            photo_upload: false,
        }
    }
}

/// Per-user meal-planning preferences
///
/// Missing rows read as the defaults; saves merge over the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub dietary_tags: Vec<String>,

    #[serde(default)]
    pub pantry_items: Vec<String>,

    #[serde(default)]
    pub kitchen_tools: Vec<String>,

    /// Preferred cooking time in minutes
    #[serde(default = "default_cooking_time")]
    pub cooking_time: u32,

    /// Weekly grocery budget in whole currency units
    #[serde(default = "default_budget")]
    pub budget: f64,

    #[serde(default)]
    pub use_weekly_specials: bool,
}

fn default_cooking_time() -> u32 {
    30
}

fn default_budget() -> f64 {
    25.0
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            dietary_tags: Vec::new(),
            pantry_items: Vec::new(),
            kitchen_tools: Vec::new(),
            cooking_time: default_cooking_time(),
            budget: default_budget(),
            use_weekly_specials: false,
        }
    }
}

/// Aggregate counts shown by the admin stats command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub premium_users: u64,
    pub total_recipes: u64,
    /// Users with a recorded session, most recent first, capped at 5
    pub recent_users: Vec<RecentUser>,
}

/// One row of the recent-activity listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentUser {
    pub email: String,
    pub plan: PlanTier,
    pub last_session: Option<DateTime<Utc>>,
    pub session_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_tier_parse_str() {
        assert_eq!(PlanTier::parse_str("free").unwrap(), PlanTier::Free);
        assert_eq!(PlanTier::parse_str("premium").unwrap(), PlanTier::Premium);
        assert_eq!(PlanTier::parse_str("PREMIUM").unwrap(), PlanTier::Premium);
        assert!(PlanTier::parse_str("gold").is_err());
    }

    #[test]
    fn test_plan_tier_display() {
        assert_eq!(PlanTier::Free.to_string(), "free");
        assert_eq!(PlanTier::Premium.to_string(), "premium");
    }

    #[test]
    fn test_plan_tier_default_is_free() {
        assert_eq!(PlanTier::default(), PlanTier::Free);
        assert!(!PlanTier::default().is_premium());
    }

    #[test]
    fn test_plan_tier_serde_lowercase() {
        let json = serde_json::to_string(&PlanTier::Premium).unwrap();
        assert_eq!(json, "\"premium\"");
        let tier: PlanTier = serde_json::from_str("\"free\"").unwrap();
        assert_eq!(tier, PlanTier::Free);
    }

    #[test]
    fn test_difficulty_parse_str() {
        assert_eq!(Difficulty::parse_str("easy").unwrap(), Difficulty::Easy);
        assert_eq!(Difficulty::parse_str("Medium").unwrap(), Difficulty::Medium);
        assert_eq!(Difficulty::parse_str("HARD").unwrap(), Difficulty::Hard);
        assert!(Difficulty::parse_str("extreme").is_err());
    }

    #[test]
    fn test_difficulty_serde_lowercase() {
        let json = serde_json::to_string(&Difficulty::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let d: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(d, Difficulty::Hard);
    }

    #[test]
    fn test_recipe_total_time() {
        let recipe = sample_recipe(vec!["Vegan".to_string()]);
        assert_eq!(recipe.total_time(), 35);
    }

    #[test]
    fn test_recipe_matches_any_tag() {
        let recipe = sample_recipe(vec!["Vegan".to_string(), "Gluten-Free".to_string()]);
        assert!(recipe.matches_any_tag(&["Vegan".to_string()]));
        assert!(recipe.matches_any_tag(&["Keto".to_string(), "Gluten-Free".to_string()]));
        assert!(!recipe.matches_any_tag(&["Keto".to_string()]));
        assert!(!recipe.matches_any_tag(&[]));
    }

    #[test]
    fn test_freemium_settings_defaults() {
        let settings = FreemiumSettings::default();
        assert_eq!(settings.session_time, 30);
        assert_eq!(settings.session_frequency, 7);
        assert_eq!(settings.ad_duration, 15);
        assert!(settings.require_email);
        assert!(settings.show_ad);
        assert!(!settings.pdf_export);
        assert!(!settings.email_plan);
        assert!(!settings.photo_upload);
    }

    #[test]
    fn test_freemium_settings_partial_json_fills_defaults() {
        let settings: FreemiumSettings = serde_json::from_str(r#"{"session_time": 60}"#).unwrap();
        assert_eq!(settings.session_time, 60);
        assert_eq!(settings.session_frequency, 7);
        assert!(settings.show_ad);
    }

    #[test]
    fn test_user_preferences_defaults() {
        let prefs = UserPreferences::default();
        assert!(prefs.dietary_tags.is_empty());
        assert!(prefs.pantry_items.is_empty());
        assert!(prefs.kitchen_tools.is_empty());
        assert_eq!(prefs.cooking_time, 30);
        assert_eq!(prefs.budget, 25.0);
        assert!(!prefs.use_weekly_specials);
    }

    #[test]
    fn test_user_preferences_partial_json_fills_defaults() {
        let prefs: UserPreferences =
            serde_json::from_str(r#"{"pantry_items": ["rice", "beans"]}"#).unwrap();
        assert_eq!(prefs.pantry_items, vec!["rice", "beans"]);
        assert_eq!(prefs.cooking_time, 30);
        assert_eq!(prefs.budget, 25.0);
    }

    fn sample_recipe(tags: Vec<String>) -> RecipeRecord {
        let now = Utc::now();
        RecipeRecord {
            id: "r-1".to_string(),
            name: "Test Bowl".to_string(),
            description: "A bowl for tests".to_string(),
            image: "/test-bowl.png".to_string(),
            prep_time: 15,
            cook_time: 20,
            servings: 2,
            difficulty: Difficulty::Easy,
            dietary_tags: tags,
            ingredients: vec![Ingredient {
                name: "Rice".to_string(),
                amount: "1".to_string(),
                unit: "cup".to_string(),
            }],
            instructions: vec!["Cook the rice.".to_string()],
            nutrition_facts: NutritionFacts {
                calories: 400,
                protein: 10,
                carbs: 60,
                fat: 8,
            },
            estimated_cost: 8.0,
            created_at: now,
            updated_at: now,
        }
    }
}
