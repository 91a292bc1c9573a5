mod signup;
mod steps;

use std::fs::File;

use simplelog::{Config, LevelFilter, WriteLogger};
use vouch::Document;

#[tokio::main]
async fn main() {
    let log_file = File::create("vouch-demo.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
    }
}

async fn run() -> vouch::Result<()> {
    signup::run().await?;
    println!();
    steps::run().await
}

/// Print each field's value, markers and rendered status.
fn print_fields(document: &Document, fields: &[&str]) {
    for field in fields {
        let value = document.value(field).unwrap_or_default();
        let status = document.text(&format!("{field}-status")).unwrap_or_default();
        let classes = document.classes(field).join(" ");
        println!("  {field:<14} {value:<16} [{classes:<7}] {status}");
    }
}
