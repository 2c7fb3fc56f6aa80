use tabled::Tabled;

use crate::board::moves::STATUS_LABELS;
use crate::cli::LabelCommands;
use crate::client::{GitHubClient, IssueApi};
use crate::error::Result;
use crate::output::{self, is_json_output, label_colored, truncate};
use crate::payloads::{normalize_color, LabelInput, LabelUpdate};
use crate::types::{Label, RepoRef};

#[derive(Tabled)]
struct LabelRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl LabelRow {
    fn from_label(label: &Label) -> Self {
        let name = if is_json_output() {
            label.name.clone()
        } else {
            label_colored(&label.name, &label.color)
        };
        let board = STATUS_LABELS.iter().any(|s| s.name == label.name);
        Self {
            name: if board { format!("{name} (board)") } else { name },
            color: format!("#{}", label.color),
            description: truncate(label.description.as_deref().unwrap_or(""), 50),
        }
    }
}

pub async fn run(client: &GitHubClient, repo: &RepoRef, action: LabelCommands) -> Result<()> {
    match action {
        LabelCommands::List => return list(client, repo).await,
        LabelCommands::Create {
            name,
            color,
            description,
        } => {
            let input = LabelInput {
                name: name.trim().to_string(),
                color: normalize_color(&color)?,
                description: description.filter(|d| !d.is_empty()),
            };
            client.create_label(repo, &input).await?;
            output::print_status(&format!("Created label {}", input.name));
        }
        LabelCommands::Update {
            name,
            new_name,
            color,
            description,
        } => {
            let update = LabelUpdate {
                new_name,
                color: color.as_deref().map(normalize_color).transpose()?,
                description,
            };
            let label = client.update_label(repo, &name, &update).await?;
            output::print_status(&format!("Updated label {}", label.name));
        }
        LabelCommands::Delete { name } => {
            client.delete_label(repo, &name).await?;
            output::print_status(&format!("Deleted label {name}"));
        }
    }

    list(client, repo).await
}

pub async fn list(client: &GitHubClient, repo: &RepoRef) -> Result<()> {
    let mut labels = client.list_labels(repo).await?;
    labels.sort_by_key(|l| l.name.to_lowercase());

    if labels.is_empty() {
        output::print_message("No labels found");
        return Ok(());
    }

    output::print_table(&labels, LabelRow::from_label);
    Ok(())
}
