use tabled::Tabled;

use crate::cli::MilestoneCommands;
use crate::client::GitHubClient;
use crate::error::Result;
use crate::output::{self, format_date_only, is_json_output, state_colored, truncate};
use crate::payloads::{due_on, MilestoneUpdate, NewMilestone};
use crate::types::{Milestone, RepoRef, State};

#[derive(Tabled)]
struct MilestoneRow {
    #[tabled(rename = "#")]
    number: u64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl MilestoneRow {
    fn from_milestone(m: &Milestone) -> Self {
        Self {
            number: m.number,
            title: truncate(&m.title, 40),
            state: if is_json_output() {
                m.state.to_string()
            } else {
                state_colored(m.state.as_str())
            },
            due: m
                .due_on
                .as_deref()
                .map(format_date_only)
                .unwrap_or_else(|| "-".to_string()),
            progress: format!("{}/{}", m.closed_issues, m.open_issues + m.closed_issues),
            description: truncate(m.description.as_deref().unwrap_or(""), 40),
        }
    }
}

pub async fn run(client: &GitHubClient, repo: &RepoRef, action: MilestoneCommands) -> Result<()> {
    match action {
        MilestoneCommands::List => return list(client, repo).await,
        MilestoneCommands::Create {
            title,
            description,
            due,
        } => {
            let milestone = NewMilestone {
                title,
                description,
                due_on: due.as_deref().map(due_on).transpose()?,
            };
            let created = client.create_milestone(repo, &milestone).await?;
            output::print_status(&format!("Created milestone #{} {}", created.number, created.title));
        }
        MilestoneCommands::Update {
            number,
            title,
            description,
            due,
            state,
        } => {
            let update = MilestoneUpdate {
                title,
                description,
                due_on: due.as_deref().map(due_on).transpose()?,
                state,
            };
            let updated = client.update_milestone(repo, number, &update).await?;
            output::print_status(&format!("Updated milestone #{} {}", updated.number, updated.title));
        }
        MilestoneCommands::Delete { number } => {
            client.delete_milestone(repo, number).await?;
            output::print_status(&format!("Deleted milestone #{number}"));
        }
    }

    list(client, repo).await
}

/// Open milestones first, then closed ones.
pub async fn fetch_all(client: &GitHubClient, repo: &RepoRef) -> Result<Vec<Milestone>> {
    let mut milestones = client.list_milestones(repo, State::Open).await?;
    milestones.extend(client.list_milestones(repo, State::Closed).await?);
    Ok(milestones)
}

pub async fn list(client: &GitHubClient, repo: &RepoRef) -> Result<()> {
    let milestones = fetch_all(client, repo).await?;

    if milestones.is_empty() {
        output::print_message("No milestones found");
        return Ok(());
    }

    output::print_table(&milestones, MilestoneRow::from_milestone);
    Ok(())
}
