//! Delay profile inspection command

use anyhow::Result;
use owo_colors::OwoColorize;
use qs_core::{DelayProfile, DEFAULT_CATEGORY};
use std::path::Path;

pub async fn run(profile_path: Option<&Path>) -> Result<()> {
    let (profile, source) = match profile_path {
        Some(path) => (DelayProfile::load(path)?, path.display().to_string()),
        None => (DelayProfile::builtin(), "built-in".to_string()),
    };

    println!("{}", "Delay Profile".bold());
    println!("{}: {}\n", "Source".dimmed(), source.dimmed());

    println!("{}", "[delays]".yellow());
    for (category, delay) in profile.categories() {
        if category == DEFAULT_CATEGORY {
            println!(
                "  {} = {} {}",
                category.cyan(),
                delay,
                "(default)".dimmed()
            );
        } else {
            println!("  {} = {}", category.cyan(), delay);
        }
    }

    Ok(())
}
