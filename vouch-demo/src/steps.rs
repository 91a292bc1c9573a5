//! Three slow steps validated together on submit.

use std::time::Duration;

use tokio::sync::mpsc;
use vouch::prelude::*;

const STEPS: [&str; 3] = ["step1", "step2", "step3"];

/// How long each step's check takes, in milliseconds.
const DELAYS: [u64; 3] = [900, 300, 600];

fn page() -> Document {
    let form = STEPS.iter().fold(Element::form("async").id("async"), |form, step| {
        form.child(
            Element::div()
                .class("row")
                .child(Element::input(*step).id(*step))
                .child(
                    Element::span()
                        .id(format!("{step}-spinner"))
                        .attr("style", "display: none"),
                )
                .child(Element::span().id(format!("{step}-status"))),
        )
    });
    Document::new(
        Element::div()
            .id("page")
            .child(
                form.child(Element::button("Submit").attr("type", "submit"))
                    .child(Element::button("Reset").attr("type", "reset")),
            )
            .child(Element::text("").id("status")),
    )
}

/// A step that shows its spinner while a check of `delay` runs.
fn slow_step(document: &Document, step: &str, delay: u64) -> Lifecycle {
    let document = document.clone();
    let spinner = format!("{step}-spinner");
    Lifecycle::new().validate(move |_, done| {
        document.set_attribute(&spinner, "style", "display: inline");
        let document = document.clone();
        let spinner = spinner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            document.set_attribute(&spinner, "style", "display: none");
            done.pass(format!("valid after {} seconds!", delay as f64 / 1000.0));
        });
    })
}

pub async fn run() -> vouch::Result<()> {
    println!("== async ==");
    let document = page();
    let engine = Engine::new(
        &document,
        Options::new("async")
            .event(EventKind::Submit)
            .success_template("<i class=\"fa fa-check\"></i> {{status}}")
            .error_template("<i class=\"fa fa-times\"></i> {{status}}"),
    )?;

    let lifecycles = STEPS
        .iter()
        .zip(DELAYS)
        .map(|(step, delay)| {
            let lifecycle = slow_step(&document, step, delay);
            if *step == STEPS[0] {
                (*step, lifecycle.init(|input| input.focus()))
            } else {
                (*step, lifecycle)
            }
        });
    engine.delegate(lifecycles)?;
    println!("focused: {:?}", document.focused());

    let reset = engine.clone();
    let status = document.clone();
    engine.on_form_event(EventKind::Reset, move |_| {
        status.set_text("status", "");
        reset.reset(true);
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let submitter = engine.clone();
    let status = document.clone();
    engine.on_form_event(EventKind::Submit, move |_| {
        let tx = tx.clone();
        let status = status.clone();
        submitter.validate_all(move |valid| {
            if valid {
                status.set_text(
                    "status",
                    "<i class=\"fa fa-check\"></i> Only now would the form send.",
                );
            }
            let _ = tx.send(valid);
        });
    });

    for step in STEPS {
        document.input(step, "anything");
    }
    // Typing alone validates nothing here.
    crate::print_fields(&document, &STEPS);

    println!("-- submit --");
    document.submit("async");
    let spinning: Vec<&str> = STEPS
        .iter()
        .copied()
        .filter(|step| {
            document.attribute(&format!("{step}-spinner"), "style").as_deref()
                == Some("display: inline")
        })
        .collect();
    println!("spinning: {spinning:?}");

    let valid = rx.recv().await.unwrap_or(false);
    println!("valid: {valid}");
    crate::print_fields(&document, &STEPS);
    println!("{}", document.text("status").unwrap_or_default());

    println!("-- reset --");
    document.reset("async");
    crate::print_fields(&document, &STEPS);
    println!("state: {}", serde_json::to_string(&engine.state()).unwrap_or_default());
    Ok(())
}
