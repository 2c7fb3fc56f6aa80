use std::io::{self, BufRead, Write};

use crate::config::Config;
use crate::error::Result;
use crate::types::RepoRef;

fn prompt(stdin: &mut impl BufRead, question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;

    let mut answer = String::new();
    stdin.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

fn optional(answer: String) -> Option<String> {
    (!answer.is_empty()).then_some(answer)
}

pub fn run() -> Result<()> {
    let config_path = Config::config_path()?;
    let mut stdin = io::stdin().lock();

    if config_path.exists() {
        let answer = prompt(
            &mut stdin,
            &format!(
                "Config file already exists at {}. Overwrite? [y/N] ",
                config_path.display()
            ),
        )?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("gh-kanban configuration");
    println!("=======================\n");

    let token = prompt(
        &mut stdin,
        "GitHub token (leave empty to use 'gh-kanban login' later) [optional]: ",
    )?;
    let client_id = prompt(&mut stdin, "OAuth app client ID for 'login' [optional]: ")?;

    let default_repo = loop {
        let answer = prompt(&mut stdin, "Default repository as OWNER/REPO [optional]: ")?;
        if answer.is_empty() {
            break None;
        }
        match answer.parse::<RepoRef>() {
            Ok(repo) => break Some(repo.to_string()),
            Err(e) => println!("{e}"),
        }
    };

    let config = Config {
        token: optional(token),
        default_repo,
        client_id: optional(client_id),
        ..Default::default()
    };
    config.save_to(&config_path)?;

    println!("\nConfig saved to {}", config_path.display());
    println!("You can now use 'gh-kanban' commands!");

    Ok(())
}
