use colored::Colorize;
use reqwest::Client;

use crate::auth;
use crate::client::{GitHubClient, USER_AGENT_VALUE};
use crate::config::Config;
use crate::error::Result;
use crate::output;

/// Sign in through the device flow and store the token.
pub async fn login(mut config: Config) -> Result<()> {
    let client_id = config.client_id()?;
    let http = Client::builder().user_agent(USER_AGENT_VALUE).build()?;

    let code = auth::request_device_code(&http, &client_id).await?;
    eprintln!(
        "Open {} and enter the code {}",
        code.verification_uri.cyan(),
        code.user_code.bold()
    );
    eprintln!("Waiting for authorization...");

    let token = auth::wait_for_token(&http, &client_id, &code).await?;

    let client = GitHubClient::new(token.clone(), config.api_url())?;
    let user = client.authenticated_user().await?;
    tracing::info!(login = %user.login, "signed in");

    config.token = Some(token);
    config.save()?;

    output::print_message(&format!("Logged in as @{}", user.login));
    Ok(())
}

pub fn logout(mut config: Config) -> Result<()> {
    if config.token.take().is_none() {
        output::print_message("Not logged in");
        return Ok(());
    }
    config.save()?;
    output::print_message("Logged out");
    Ok(())
}

pub async fn whoami(client: &GitHubClient) -> Result<()> {
    let user = client.authenticated_user().await?;
    output::print_item(&user, |u| {
        println!("{}", format!("@{}", u.login).bold());
        if !u.html_url.is_empty() {
            println!("{}", u.html_url.dimmed());
        }
    });
    Ok(())
}
