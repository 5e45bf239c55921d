//! System prompt and canned assistant text
//!
//! The system prompt carries the assistant persona, the suggestion
//! trigger contract, and a rendering of the user's saved preferences.
//! The trigger sentence quotes [`TRIGGER_PHRASE`] so the prompt and the
//! detector cannot drift apart.

use crate::store::UserPreferences;
use crate::suggestions::TRIGGER_PHRASE;

/// First assistant message shown when a chat session opens
pub const WELCOME_MESSAGE: &str = "👋 Hi there! I'm your Smart Recipe Assistant. I can help you plan meals based on your dietary preferences, pantry items, and budget. What kind of recipes are you looking for today?";

/// Builds the system prompt for a chat session
///
/// Weaves the user's saved preferences into the persona so the model
/// can plan around their pantry and budget without being asked.
///
/// # Examples
///
/// ```
/// use souschef::prompts::build_system_prompt;
/// use souschef::store::UserPreferences;
///
/// let prompt = build_system_prompt(&UserPreferences::default());
/// assert!(prompt.contains("Here are some recipe suggestions"));
/// ```
pub fn build_system_prompt(preferences: &UserPreferences) -> String {
    format!(
        r#"You are a Smart Recipe Assistant. Your goal is to help users plan meals based on their dietary preferences, pantry items, and budget.

When suggesting recipes:
1. Consider dietary restrictions and preferences
2. Use ingredients the user already has when possible
3. Suggest budget-friendly options
4. Keep cooking time reasonable

If the user asks for recipe suggestions, respond with a message that includes the phrase "{trigger}" so recipe cards can be shown.

Keep responses friendly, concise, and focused on helping the user find the perfect recipes.
{profile}"#,
        trigger = TRIGGER_PHRASE,
        profile = preference_lines(preferences),
    )
}

/// Renders the saved preferences as prompt context, skipping empties
fn preference_lines(preferences: &UserPreferences) -> String {
    let mut lines = vec!["\nThe user's saved preferences:".to_string()];

    if !preferences.dietary_tags.is_empty() {
        lines.push(format!(
            "- Dietary preferences: {}",
            preferences.dietary_tags.join(", ")
        ));
    }
    if !preferences.pantry_items.is_empty() {
        lines.push(format!(
            "- Pantry items: {}",
            preferences.pantry_items.join(", ")
        ));
    }
    if !preferences.kitchen_tools.is_empty() {
        lines.push(format!(
            "- Kitchen tools: {}",
            preferences.kitchen_tools.join(", ")
        ));
    }
    lines.push(format!(
        "- Preferred cooking time: up to {} minutes",
        preferences.cooking_time
    ));
    lines.push(format!("- Weekly budget: ${}", preferences.budget));
    if preferences.use_weekly_specials {
        lines.push("- Prefers recipes built around weekly specials".to_string());
    }

    lines.join("\n")
}
