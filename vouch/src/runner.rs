//! Runs one field's validator and applies its completion.

use std::sync::Arc;

use crate::engine::Inner;
use crate::error::{Error, Result};
use crate::join::Join;
use crate::lifecycle::{Completion, Lifecycle, Verdict};
use crate::options::StalePolicy;

/// Why a validator is being run.
#[derive(Clone)]
pub(crate) enum Run {
    /// A single field, from an event or an explicit call. Completion fires the
    /// outcome hooks and notifies subscribers.
    Single,
    /// Part of a `validate_all`. Completion only feeds the join.
    Joined(Arc<Join>),
}

/// Start validating `name`. The validator may complete before this returns.
pub(crate) fn start(inner: &Arc<Inner>, name: &str, run: Run) -> Result<()> {
    let (validate, input, seq) = inner
        .with_registry_mut(|registry| {
            registry.get_mut(name).map(|field| {
                field.issued += 1;
                (
                    Arc::clone(&field.validate),
                    field.binding.input.clone(),
                    field.issued,
                )
            })
        })
        .ok_or_else(|| Error::UnknownField(name.to_string()))?;

    let value = inner.document.value(&input).unwrap_or_default();
    log::debug!("[runner] validating '{}' (request {})", name, seq);

    let weak = Arc::downgrade(inner);
    let name = name.to_string();
    let validated = value.clone();
    let done = Completion::new(move |verdict| {
        if let Some(inner) = weak.upgrade() {
            finish(&inner, &name, &validated, seq, verdict, run);
        }
    });

    validate(value, done);
    Ok(())
}

fn finish(inner: &Arc<Inner>, name: &str, value: &str, seq: u64, verdict: Verdict, run: Run) {
    let discard = inner.options.stale == StalePolicy::DiscardSuperseded;

    log::debug!(
        "[runner] '{}' completed: valid={} message={:?}",
        name,
        verdict.valid,
        verdict.message
    );

    // State and markers change under one registry lock.
    let outcome = inner.with_registry_mut(|registry| {
        let field = registry.get_mut(name)?;
        if discard && field.issued != seq {
            log::debug!("[runner] discarding superseded completion for '{}'", name);
            return Some(Outcome::Superseded { current: field.valid });
        }
        field.valid = verdict.valid;
        if let Err(err) = inner.presenter().show(
            &field.binding,
            verdict.valid,
            verdict.message.as_deref(),
        ) {
            log::error!("[runner] {err}");
        }
        Some(Outcome::Applied(field.lifecycle.clone()))
    });

    match run {
        Run::Single => {
            if let Some(Outcome::Applied(lifecycle)) = outcome {
                lifecycle.call_outcome(verdict.valid, value);
                inner.notify();
            }
        }
        Run::Joined(join) => {
            // Superseded completions still count, with the field's current
            // validity in place of their verdict.
            let valid = match outcome {
                Some(Outcome::Superseded { current }) => current,
                _ => verdict.valid,
            };
            if let Some((all_valid, callback)) = join.record(valid) {
                inner.notify();
                callback(all_valid);
            }
        }
    }
}

enum Outcome {
    Applied(Lifecycle),
    Superseded { current: bool },
}
