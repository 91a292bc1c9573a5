//! Signup page: rules, transforms and a slow availability check.

use std::time::Duration;

use regex::Regex;
use tokio::sync::mpsc;
use tokio::time::sleep;
use vouch::prelude::*;

const FIELDS: [&str; 4] = ["name", "username", "password_one", "password_two"];

/// Usernames the fake backend reports as taken.
const TAKEN: [&str; 3] = ["@admin", "@root", "@norpie"];

const LOOKUP_DELAY: Duration = Duration::from_millis(200);

fn page() -> Document {
    let form = FIELDS.iter().fold(Element::form("signup").id("signup"), |form, field| {
        form.child(
            Element::div()
                .class("row")
                .child(Element::label(field.replace('_', " ")))
                .child(Element::input(*field).id(*field))
                .child(Element::span().id(format!("{field}-status"))),
        )
    });
    Document::new(
        Element::div()
            .id("page")
            .child(form.child(Element::button("Sign up").attr("type", "submit")))
            .child(Element::text("").id("status")),
    )
}

fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut start = true;
    for c in name.chars() {
        if c.is_whitespace() {
            start = true;
            out.push(c);
        } else if start {
            start = false;
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

fn at_prefixed(username: &str) -> String {
    if username.contains('@') {
        username.to_string()
    } else {
        format!("@{username}")
    }
}

async fn available(username: &str) -> bool {
    sleep(LOOKUP_DELAY).await;
    !TAKEN.contains(&username)
}

fn password_rule() -> Regex {
    Regex::new(r"^\w{4,20}$").expect("valid password pattern")
}

pub async fn run() -> vouch::Result<()> {
    println!("== signup ==");
    let document = page();
    let engine = Engine::new(
        &document,
        Options::new("signup").stale(StalePolicy::DiscardSuperseded),
    )?;

    let confirm = password_rule();
    let lookup = document.clone();

    engine.delegate([
        (
            "name",
            Lifecycle::new()
                .init(|input| input.focus())
                .transform(title_case)
                .rules(
                    Rules::new()
                        .required("Full name required.")
                        .success("Full name ok."),
                ),
        ),
        (
            "username",
            Lifecycle::new().transform(at_prefixed).validate(|username, done| {
                if username.trim().is_empty() || username == "@" {
                    done.fail("Username required.");
                    return;
                }
                tokio::spawn(async move {
                    if available(&username).await {
                        done.pass("Username available.");
                    } else {
                        done.fail("Sorry, username taken.");
                    }
                });
            }),
        ),
        (
            "password_one",
            Lifecycle::new().rules(
                Rules::new()
                    .pattern(password_rule(), "Password too weak.")
                    .success("Password ok."),
            ),
        ),
        (
            "password_two",
            Lifecycle::new().validate(move |password, done| {
                let first = lookup.value("password_one").unwrap_or_default();
                if !confirm.is_match(&password) {
                    done.fail("Password too weak.");
                } else if first != password {
                    done.fail("Password mismatch.");
                } else {
                    done.pass("Password match.");
                }
            }),
        ),
    ])?;

    engine.on_state_change(|state| {
        log::info!(
            "[signup] state: {}",
            serde_json::to_string(state).unwrap_or_default()
        );
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let submitter = engine.clone();
    engine.on_form_event(EventKind::Submit, move |_| {
        let tx = tx.clone();
        submitter.validate_all(move |valid| {
            let _ = tx.send(valid);
        });
    });

    println!("focused: {:?}", document.focused());

    document.input("name", "ada LOVELACE");
    document.input("username", "admin");
    document.input("password_one", "abc");
    document.input("password_two", "abcd");
    sleep(LOOKUP_DELAY * 2).await;
    print_fields(&document);

    println!("-- submit --");
    document.submit("signup");
    let valid = rx.recv().await.unwrap_or(false);
    println!("valid: {valid}");

    document.input("username", "ada");
    document.input("password_one", "enchantress");
    document.input("password_two", "enchantress");
    sleep(LOOKUP_DELAY * 2).await;
    print_fields(&document);

    println!("-- submit --");
    document.submit("signup");
    if rx.recv().await.unwrap_or(false) {
        let values = engine.values();
        let user = values.get("username").unwrap_or_default();
        document.set_text(
            "status",
            format!("<i class=\"fa fa-smile-o\"></i> Thank you for signing up, {user}."),
        );
        println!("{}", document.text("status").unwrap_or_default());

        engine.reset(true);
        print_fields(&document);
        println!("focused: {:?}", document.focused());
    }
    Ok(())
}

fn print_fields(document: &Document) {
    crate::print_fields(document, &FIELDS);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ada LOVELACE"), "Ada Lovelace");
        assert_eq!(title_case("  grace  hopper"), "  Grace  Hopper");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_at_prefixed() {
        assert_eq!(at_prefixed("ada"), "@ada");
        assert_eq!(at_prefixed("@ada"), "@ada");
    }
}
