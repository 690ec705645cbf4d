//! `tower review` - interactive draft review.

use std::path::Path;

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use serde_json::{Map, Value};
use tower_core::EntityKind;
use tower_drafts::{Dispatcher, Draft, ReviewManager, ReviewOutcome, load_proposals};

use crate::theme::Theme;

/// What happened to one draft during the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Approved,
    Rejected,
    Skipped,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Approve,
    Edit,
    Autofill,
    Reject,
    Skip,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Self::Approve => "Approve",
            Self::Edit => "Edit a field",
            Self::Autofill => "Auto-fill with assistant",
            Self::Reject => "Reject",
            Self::Skip => "Skip for now",
        }
    }
}

/// Load `file` into the store and review each draft in turn.
pub(crate) async fn run_review(manager: &ReviewManager, file: &Path, dry_run: bool) -> Result<()> {
    let drafts = load_proposals(file)
        .with_context(|| format!("Failed to load proposals from {}", file.display()))?;
    if drafts.is_empty() {
        println!("{}", Theme::warning("No usable proposals in file"));
        return Ok(());
    }

    // The store lists newest first; add in reverse to review in file order.
    for draft in drafts.into_iter().rev() {
        manager.store().add(draft);
    }

    if dry_run {
        println!(
            "{}",
            Theme::info("Dry run: approved records go to an in-memory backend")
        );
    }

    let (mut approved, mut rejected) = (0_usize, 0_usize);
    for draft in manager.store().list() {
        match review_draft(manager, &draft).await? {
            Decision::Approved => approved = approved.saturating_add(1),
            Decision::Rejected => rejected = rejected.saturating_add(1),
            Decision::Skipped => {},
        }
    }

    println!("{}", Theme::separator());
    println!(
        "{}",
        Theme::info(&format!(
            "{approved} approved, {rejected} rejected, {} still pending",
            manager.store().len()
        ))
    );
    Ok(())
}

async fn review_draft(manager: &ReviewManager, draft: &Draft) -> Result<Decision> {
    let theme = ColorfulTheme::default();
    let mut form = pinned_form(manager.dispatcher(), draft);

    let mut actions = vec![Action::Approve, Action::Edit];
    if manager.has_assistant() {
        actions.push(Action::Autofill);
    }
    actions.extend([Action::Reject, Action::Skip]);
    let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

    loop {
        print_draft(manager, draft, &form)?;

        let choice = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match actions.get(choice).copied().unwrap_or(Action::Skip) {
            Action::Approve => {
                match manager.approve(&draft.id, Some(form.clone())).await {
                    ReviewOutcome::Approved { destination, .. } => {
                        println!(
                            "{}",
                            Theme::success(&format!("{} saved", draft.kind.label()))
                        );
                        println!(
                            "{}",
                            Theme::info(&format!("Configure it now in {destination}"))
                        );
                        return Ok(Decision::Approved);
                    },
                    ReviewOutcome::Failed {
                        message,
                        missing_collection,
                    } => {
                        println!("{}", Theme::error(&message));
                        if missing_collection {
                            println!(
                                "{}",
                                Theme::dimmed("The draft is kept; skip it and return later.")
                            );
                        }
                    },
                    ReviewOutcome::NotFound => {
                        println!("{}", Theme::warning("Draft is no longer pending"));
                        return Ok(Decision::Skipped);
                    },
                    ReviewOutcome::InFlight => {
                        println!("{}", Theme::warning("This draft is already being saved"));
                    },
                }
            },
            Action::Edit => edit_field(&theme, draft.kind, &mut form)?,
            Action::Autofill => {
                let context: String = Input::with_theme(&theme)
                    .with_prompt("Brief for the assistant (optional)")
                    .allow_empty(true)
                    .interact_text()?;
                let context = Some(context.as_str()).filter(|c| !c.trim().is_empty());
                form = manager.autofill(draft.kind, form, context).await;
            },
            Action::Reject => {
                let confirmed = Confirm::with_theme(&theme)
                    .with_prompt("Discard this draft?")
                    .default(false)
                    .interact()?;
                if confirmed {
                    if manager.reject(&draft.id) {
                        println!("{}", Theme::success("Draft rejected"));
                        return Ok(Decision::Rejected);
                    }
                    println!(
                        "{}",
                        Theme::warning("This draft is being saved or no longer pending")
                    );
                    return Ok(Decision::Skipped);
                }
            },
            Action::Skip => return Ok(Decision::Skipped),
        }
    }
}

fn print_draft(manager: &ReviewManager, draft: &Draft, form: &Map<String, Value>) -> Result<()> {
    let payload = manager.dispatcher().prepare(draft.kind, form);

    println!("{}", Theme::separator());
    println!(
        "{} {}",
        Theme::kind_tag(draft.kind),
        Theme::header(&draft.summary)
    );
    println!(
        "{}",
        Theme::dimmed(&format!(
            "draft {} -> {}",
            draft.id,
            draft.kind.collection()
        ))
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("Failed to render payload")?
    );
    let dropped = dropped_fields(draft.kind, form);
    if !dropped.is_empty() {
        println!(
            "{}",
            Theme::dimmed(&format!("not persisted: {}", dropped.join(", ")))
        );
    }
    Ok(())
}

fn edit_field(theme: &ColorfulTheme, kind: EntityKind, form: &mut Map<String, Value>) -> Result<()> {
    let fields = kind.allowed_fields();
    let index = Select::with_theme(theme)
        .with_prompt("Field")
        .items(fields)
        .default(0)
        .interact()?;
    let Some(field) = fields.get(index) else {
        return Ok(());
    };

    let current = form.get(*field).map(display_value).unwrap_or_default();
    let raw: String = Input::with_theme(theme)
        .with_prompt(format!("{field} (JSON or text, empty to clear)"))
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;

    match parse_field_input(&raw) {
        Some(value) => {
            form.insert((*field).to_string(), value);
        },
        None => {
            form.remove(*field);
        },
    }
    Ok(())
}

/// The draft's data with kind fixups applied once, so generated values
/// (a stamp's `external_id`) stay the same from display to save.
pub(crate) fn pinned_form(dispatcher: &Dispatcher, draft: &Draft) -> Map<String, Value> {
    dispatcher.normalize(draft.kind, &draft.data)
}

/// Form keys that the kind's allowlist will drop.
pub(crate) fn dropped_fields(kind: EntityKind, form: &Map<String, Value>) -> Vec<String> {
    form.keys().filter(|k| !kind.allows(k)).cloned().collect()
}

/// Render a value for editing: strings bare, everything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Interpret operator input. Empty clears the field; valid JSON is kept
/// as typed; anything else is a string.
fn parse_field_input(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string())))
}
