//! Interactive chat session handler
//!
//! Runs the full gated session lifecycle: eligibility check, sponsor
//! countdown, session activation and recording, then a readline loop
//! that streams assistant replies. Free-tier sessions carry an expiry
//! countdown that is checked between turns and raced against the
//! reply stream, so an expiry lands mid-reply instead of waiting for
//! the stream to finish.

use crate::config::Config;
use crate::error::{Result, SousChefError};
use crate::identity;
use crate::providers::{create_provider_with_model, ChatProvider, ChatTurn};
use crate::session::metrics::{
    record_ad_gate_wait, record_provider_error, record_session_denied, record_suggestions_served,
    SessionMetrics,
};
use crate::session::{AccessDecision, Countdown, GatedSession, SessionPolicy, SessionRecorder};
use crate::store::types::{FreemiumSettings, RecipeRecord, UserPreferences};
use crate::suggestions::{RecipeFinder, TriggerDetector};

use chrono::Utc;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use super::open_database;

/// Start an interactive chat session
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `model_override` - Optional override for the configured model
///
/// # Errors
///
/// Returns error when no account is signed in, provider setup or
/// verification fails, or the session cannot be recorded. An
/// ineligible account is not an error: the denial is printed and the
/// command exits cleanly.
pub async fn run_chat(config: Config, model_override: Option<&str>) -> Result<()> {
    let db = open_database(&config)?;
    let (who, account) = identity::current(&db)?;

    let settings = db.settings().load();
    let policy = SessionPolicy::new(settings.clone(), config.session.bypass_eligibility);
    let decision = policy.evaluate(&account, Utc::now());

    if let AccessDecision::Denied {
        reason,
        next_eligible_at,
    } = &decision
    {
        record_session_denied();
        println!("\n{}", reason.red());
        println!(
            "Next session available: {}",
            next_eligible_at.format("%Y-%m-%d %H:%M UTC")
        );
        println!("{}", "Upgrade to premium for unlimited sessions".yellow());
        return Ok(());
    }

    let provider = create_provider_with_model(&config, model_override)?;
    if config.session.skip_verification {
        tracing::debug!("Skipping provider verification");
    } else {
        provider.verify().await?;
    }
    println!(
        "{}",
        format!("Connected to {} ({})", provider.name(), provider.model()).dimmed()
    );

    let mut session = GatedSession::new(&who.user_id, &decision)?;

    let gate = match &decision {
        AccessDecision::Gated { ad: Some(ad), .. } => Some(Countdown::start(*ad)),
        _ => None,
    };
    if let Some(gate) = &gate {
        show_sponsor_banner(gate).await;
        record_ad_gate_wait(gate.duration().as_secs_f64());
    }

    let recorder = SessionRecorder::new(Arc::new(db.users()));
    let count = session.activate(&recorder, gate.as_ref()).await?;

    let metrics = SessionMetrics::new(if account.plan.is_premium() {
        "premium"
    } else {
        "free"
    });

    print_session_banner(count, &decision, &settings);

    let preferences = db.preferences().load(&who.user_id).unwrap_or_else(|e| {
        tracing::warn!("Failed to load preferences, using defaults: {}", e);
        UserPreferences::default()
    });
    let mut turns = vec![ChatTurn::system(crate::prompts::build_system_prompt(
        &preferences,
    ))];

    let detector = TriggerDetector::new();
    let finder = RecipeFinder::new(Arc::new(db.recipes()), config.chat.featured_count);

    let mut rl = DefaultEditor::new()?;

    let outcome = loop {
        if session.is_expired() {
            print_expiry_banner(&settings);
            break "expired";
        }

        match rl.readline(&chat_prompt(&session)) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
                    break "completed";
                }

                rl.add_history_entry(trimmed)?;
                turns.push(ChatTurn::user(trimmed));

                match stream_assistant_reply(provider.as_ref(), &turns, session.expiry()).await {
                    Ok(Some(reply)) => {
                        turns.push(ChatTurn::assistant(&reply));

                        if let Some(tags) = detector.detect(&reply) {
                            let matches = finder.suggestions(&tags).await;
                            if !matches.is_empty() {
                                record_suggestions_served(matches.len());
                                print_suggestions(&matches);
                            }
                        }
                    }
                    Ok(None) => {
                        // Expiry cut the reply short; drop the unanswered
                        // turn and let the loop print the banner.
                        turns.pop();
                        continue;
                    }
                    Err(e) => {
                        turns.pop();
                        print_provider_error(provider.name(), &e);
                        continue;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break "completed";
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break "completed";
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break "aborted";
            }
        }
    };

    metrics.record_close(outcome);
    session.close();

    println!("Goodbye!");
    Ok(())
}

/// Show the sponsor countdown and wait for it to finish
async fn show_sponsor_banner(gate: &Countdown) {
    println!("\n{}", "A word from our sponsors".yellow().bold());
    println!("{}", "SousChef stays free thanks to our partners.".dimmed());

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = gate.wait() => break,
            _ = ticker.tick() => {
                print!("\r  Chat unlocks in {:>2}s ", gate.remaining_secs());
                let _ = std::io::stdout().flush();
            }
        }
    }
    println!("\r  {}          ", "Chat unlocked!".green());
}

/// Stream one assistant reply to stdout
///
/// Returns the full reply text, or `None` when the session expiry
/// fires before the stream finishes. Mid-stream provider errors are
/// surfaced after whatever text already printed.
async fn stream_assistant_reply(
    provider: &dyn ChatProvider,
    turns: &[ChatTurn],
    expiry: Option<Arc<Countdown>>,
) -> Result<Option<String>> {
    use futures::StreamExt;

    let mut stream = provider.stream_reply(turns).await?;

    println!();
    let mut reply = String::new();
    loop {
        let chunk = match &expiry {
            Some(countdown) => {
                tokio::select! {
                    completed = countdown.wait() => {
                        if completed {
                            println!();
                            return Ok(None);
                        }
                        stream.next().await
                    }
                    chunk = stream.next() => chunk,
                }
            }
            None => stream.next().await,
        };

        match chunk {
            Some(Ok(text)) => {
                print!("{}", text);
                std::io::stdout().flush()?;
                reply.push_str(&text);
            }
            Some(Err(e)) => {
                println!();
                return Err(e);
            }
            None => break,
        }
    }
    println!("\n");

    Ok(Some(reply))
}

/// Readline prompt carrying the seconds left on limited sessions
fn chat_prompt(session: &GatedSession) -> String {
    match session.expiry() {
        Some(countdown) => format!("[{}s] souschef> ", countdown.remaining_secs()),
        None => "souschef> ".to_string(),
    }
}

fn print_session_banner(count: u32, decision: &AccessDecision, settings: &FreemiumSettings) {
    println!("\n{}", crate::prompts::WELCOME_MESSAGE);
    match decision {
        AccessDecision::Unlimited => {
            println!("\n{}", "Premium session - no time limit".cyan());
        }
        AccessDecision::Gated { session, .. } => {
            println!(
                "\n{}",
                format!(
                    "Session #{} - {}s on the clock, next one in {} days",
                    count,
                    session.as_secs(),
                    settings.session_frequency
                )
                .cyan()
            );
        }
        AccessDecision::Denied { .. } => {}
    }
    println!("Type 'exit' to quit\n");
}

fn print_expiry_banner(settings: &FreemiumSettings) {
    println!("\n{}", "Your free session has expired.".red().bold());
    println!(
        "Come back in {} days for your next session, or upgrade to premium for unlimited access.",
        settings.session_frequency
    );
}

fn print_suggestions(recipes: &[RecipeRecord]) {
    println!("{}", "Matching recipes from our catalog:".bold());
    println!();
    for recipe in recipes {
        super::recipes::print_recipe_card(recipe);
    }
}

fn print_provider_error(provider_name: &str, error: &anyhow::Error) {
    record_provider_error(provider_name);
    eprintln!("{}", format!("Error: {}", error).red());

    let retryable = error
        .downcast_ref::<SousChefError>()
        .map(|e| e.retryable())
        .unwrap_or(false);
    if retryable {
        eprintln!("{}", "Send your message again to retry".yellow());
    }
}
