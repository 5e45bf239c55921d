//! Reply-to-recipe-cards flow over a seeded catalog
//!
//! Drives the trigger detector and recipe finder together on realistic
//! assistant replies, the way the chat loop consumes them.

mod common;

use souschef::suggestions::{RecipeFinder, TriggerDetector};
use std::sync::Arc;

fn seeded_finder() -> (RecipeFinder, TriggerDetector, tempfile::TempDir) {
    let (db, tmp) = common::create_seeded_database();
    let finder = RecipeFinder::new(Arc::new(db.recipes()), 3);
    (finder, TriggerDetector::new(), tmp)
}

#[tokio::test]
async fn test_vegetarian_reply_yields_matching_cards() {
    let (finder, detector, _tmp) = seeded_finder();

    let reply = "Here are some recipe suggestions for your vegetarian week:\n\
                 1. A grain bowl\n2. A pasta dish";
    let tags = detector.detect(reply).expect("reply should trigger");
    assert_eq!(tags, vec!["Vegetarian".to_string()]);

    let recipes = finder.suggestions(&tags).await;
    let names: Vec<&str> = recipes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Mediterranean Quinoa Bowl"));
    assert!(names.contains(&"Creamy Mushroom Pasta"));
}

#[tokio::test]
async fn test_unstocked_diet_falls_back_to_featured() {
    let (finder, detector, _tmp) = seeded_finder();

    // The sample catalog has no keto recipes.
    let reply = "Here are some recipe suggestions for keto dinners";
    let tags = detector.detect(reply).expect("reply should trigger");
    assert_eq!(tags, vec!["Keto".to_string()]);

    let recipes = finder.suggestions(&tags).await;
    assert_eq!(recipes.len(), 3);
}

#[tokio::test]
async fn test_plain_reply_serves_no_cards() {
    let (_finder, detector, _tmp) = seeded_finder();

    // Dietary words alone do not trigger suggestions.
    assert_eq!(detector.detect("Vegan cooking is fun"), None);
    assert_eq!(detector.detect("What do you have in your pantry?"), None);
}

#[tokio::test]
async fn test_trigger_without_tags_serves_featured() {
    let (finder, detector, _tmp) = seeded_finder();

    let reply = "Here are some recipe suggestions to get you started";
    let tags = detector.detect(reply).expect("reply should trigger");
    assert!(tags.is_empty());

    let recipes = finder.suggestions(&tags).await;
    assert_eq!(recipes.len(), 3);
}

#[tokio::test]
async fn test_any_tag_match_collects_across_diets() {
    let (finder, detector, _tmp) = seeded_finder();

    // Mixed casing in the reply still matches canonical recipe tags,
    // and any single overlapping tag admits a recipe.
    let reply = "Here are some recipe suggestions: DAIRY-FREE and high-protein options";
    let tags = detector.detect(reply).expect("reply should trigger");
    assert_eq!(
        tags,
        vec!["Dairy-Free".to_string(), "High-Protein".to_string()]
    );

    let recipes = finder.suggestions(&tags).await;
    let names: Vec<&str> = recipes.iter().map(|r| r.name.as_str()).collect();
    assert!(names.contains(&"Sheet Pan Chicken & Vegetables"));
    assert!(names.contains(&"Mediterranean Quinoa Bowl"));
}

#[tokio::test]
async fn test_empty_catalog_serves_nothing() {
    let (db, _tmp) = common::create_temp_database();
    let finder = RecipeFinder::new(Arc::new(db.recipes()), 3);
    let detector = TriggerDetector::new();

    let reply = "Here are some recipe suggestions for vegan meals";
    let tags = detector.detect(reply).expect("reply should trigger");

    // No matches and no featured recipes: the conversation goes on
    // without cards.
    let recipes = finder.suggestions(&tags).await;
    assert!(recipes.is_empty());
}
