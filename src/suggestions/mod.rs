//! Recipe suggestion pipeline
//!
//! Assistant replies are scanned for the suggestion trigger phrase;
//! when it appears, the dietary words in the reply select the recipes
//! to present. See [`detector`] for the scan and [`lookup`] for the
//! store side.

pub mod detector;
pub mod lookup;

pub use detector::{canonicalize_tag, TriggerDetector, TRIGGER_PHRASE};
pub use lookup::RecipeFinder;
