use colored::Colorize;
use serde::Serialize;

use crate::board::moves;
use crate::board::{classify, Column};
use crate::cli::{IssueCommands, IssueCreateArgs};
use crate::client::{GitHubClient, IssueApi};
use crate::error::{KanbanError, Result};
use crate::output::{self, format_date_only, format_relative, label_colored, state_colored};
use crate::payloads::{IssueUpdate, NewIssue};
use crate::types::{Issue, Label, Milestone, RepoRef, State, User, DEPARTMENT_PREFIX};

/// An issue together with what the repository lets you attach to it.
#[derive(Debug, Serialize)]
pub struct IssueDetail {
    pub issue: Issue,
    pub column: Column,
    /// Collaborators not yet assigned.
    pub assignable: Vec<String>,
    /// Repository labels the issue lacks, excluding status and department labels.
    pub addable_labels: Vec<String>,
    pub departments: Vec<String>,
    pub milestones: Vec<Milestone>,
}

impl IssueDetail {
    pub fn new(issue: Issue, collaborators: &[User], labels: &[Label], milestones: Vec<Milestone>) -> Self {
        let assignable = collaborators
            .iter()
            .filter(|u| !issue.is_assigned_to(&u.login))
            .map(|u| u.login.clone())
            .collect();
        let addable_labels = labels
            .iter()
            .filter(|l| !l.is_status() && !l.is_department() && !issue.has_label(&l.name))
            .map(|l| l.name.clone())
            .collect();
        let departments = labels
            .iter()
            .filter_map(|l| l.department_name())
            .map(String::from)
            .collect();

        Self {
            column: classify(&issue),
            issue,
            assignable,
            addable_labels,
            departments,
            milestones,
        }
    }
}

pub async fn run(client: &GitHubClient, repo: &RepoRef, action: IssueCommands) -> Result<()> {
    let updated = match action {
        IssueCommands::View { number } => return view(client, repo, number).await,
        IssueCommands::Create(args) => return create(client, repo, args).await,
        IssueCommands::Title { number, title } => set_title(client, repo, number, &title).await?,
        IssueCommands::Body { number, body } => set_body(client, repo, number, &body).await?,
        IssueCommands::Assign { number, login } => assign(client, repo, number, &login).await?,
        IssueCommands::Unassign { number, login } => unassign(client, repo, number, &login).await?,
        IssueCommands::Milestone { number, milestone, .. } => {
            set_milestone(client, repo, number, milestone).await?
        }
        IssueCommands::LabelAdd { number, name } => add_label(client, repo, number, &name).await?,
        IssueCommands::LabelRemove { number, name } => {
            remove_label(client, repo, number, &name).await?
        }
        IssueCommands::Dept { number, department, .. } => {
            change_department(client, repo, number, department.as_deref()).await?
        }
        IssueCommands::Close { number } => set_state(client, repo, number, State::Closed).await?,
        IssueCommands::Reopen { number } => set_state(client, repo, number, State::Open).await?,
    };

    output::print_item(&updated, print_issue);
    Ok(())
}

pub async fn view(client: &GitHubClient, repo: &RepoRef, number: u64) -> Result<()> {
    let (issue, collaborators, labels, milestones) = tokio::join!(
        client.get_issue(repo, number),
        client.list_collaborators(repo),
        client.list_labels(repo),
        client.list_milestones(repo, State::Open),
    );
    let issue = issue?;

    let collaborators = collaborators.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load collaborators");
        Vec::new()
    });
    let labels = labels.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load labels");
        Vec::new()
    });
    let milestones = milestones.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load milestones");
        Vec::new()
    });

    let detail = IssueDetail::new(issue, &collaborators, &labels, milestones);
    output::print_item(&detail, print_detail);
    Ok(())
}

pub async fn create(client: &GitHubClient, repo: &RepoRef, args: IssueCreateArgs) -> Result<()> {
    let title = args.title.trim();
    if title.is_empty() {
        return Err(KanbanError::EmptyTitle);
    }

    let status = moves::delta_for(args.column).add;
    if status.is_some() {
        match client.list_labels(repo).await {
            Ok(existing) => {
                moves::ensure_status_labels(client, repo, &existing).await;
            }
            Err(e) => tracing::warn!(error = %e, "could not check status labels"),
        }
    }

    let new_issue = NewIssue {
        title: title.to_string(),
        body: args.description.filter(|d| !d.trim().is_empty()),
        labels: status.map(|s| s.name.to_string()).into_iter().collect(),
    };
    let issue = client.create_issue(repo, &new_issue).await?;
    tracing::info!(number = issue.number, column = %args.column, "created issue");

    if output::is_json_output() {
        output::print_json(&issue);
    } else {
        output::print_message(&format!(
            "Created #{} in {}: {}",
            issue.number, args.column, issue.html_url
        ));
    }
    Ok(())
}

async fn update_and_refetch<A: IssueApi>(
    api: &A,
    repo: &RepoRef,
    number: u64,
    update: IssueUpdate,
) -> Result<Issue> {
    api.update_issue(repo, number, &update).await?;
    api.get_issue(repo, number).await
}

pub async fn set_title<A: IssueApi>(api: &A, repo: &RepoRef, number: u64, title: &str) -> Result<Issue> {
    let title = title.trim();
    if title.is_empty() {
        return Err(KanbanError::EmptyTitle);
    }
    let update = IssueUpdate {
        title: Some(title.to_string()),
        ..Default::default()
    };
    update_and_refetch(api, repo, number, update).await
}

pub async fn set_body<A: IssueApi>(api: &A, repo: &RepoRef, number: u64, body: &str) -> Result<Issue> {
    let update = IssueUpdate {
        body: Some(body.to_string()),
        ..Default::default()
    };
    update_and_refetch(api, repo, number, update).await
}

pub async fn set_milestone<A: IssueApi>(
    api: &A,
    repo: &RepoRef,
    number: u64,
    milestone: Option<u64>,
) -> Result<Issue> {
    let update = IssueUpdate {
        milestone: Some(milestone),
        ..Default::default()
    };
    update_and_refetch(api, repo, number, update).await
}

pub async fn set_state<A: IssueApi>(api: &A, repo: &RepoRef, number: u64, state: State) -> Result<Issue> {
    update_and_refetch(api, repo, number, IssueUpdate::state(state)).await
}

pub async fn assign<A: IssueApi>(api: &A, repo: &RepoRef, number: u64, login: &str) -> Result<Issue> {
    api.add_assignees(repo, number, &[login.to_string()]).await?;
    api.get_issue(repo, number).await
}

pub async fn unassign<A: IssueApi>(api: &A, repo: &RepoRef, number: u64, login: &str) -> Result<Issue> {
    api.remove_assignees(repo, number, &[login.to_string()]).await?;
    api.get_issue(repo, number).await
}

pub async fn add_label<A: IssueApi>(api: &A, repo: &RepoRef, number: u64, name: &str) -> Result<Issue> {
    api.add_labels(repo, number, &[name.to_string()]).await?;
    api.get_issue(repo, number).await
}

pub async fn remove_label<A: IssueApi>(api: &A, repo: &RepoRef, number: u64, name: &str) -> Result<Issue> {
    api.remove_label(repo, number, name).await?;
    api.get_issue(repo, number).await
}

/// `backend` and `dept:backend` name the same department.
fn department_label(department: &str) -> String {
    let department = department.trim();
    if department.starts_with(DEPARTMENT_PREFIX) {
        department.to_string()
    } else {
        format!("{DEPARTMENT_PREFIX}{department}")
    }
}

/// Replace the issue's department label, or drop it when `department` is `None`.
pub async fn change_department<A: IssueApi>(
    api: &A,
    repo: &RepoRef,
    number: u64,
    department: Option<&str>,
) -> Result<Issue> {
    let issue = api.get_issue(repo, number).await?;
    let wanted = department.map(department_label);

    let stale: Vec<String> = issue
        .labels
        .iter()
        .filter(|l| l.is_department() && Some(&l.name) != wanted.as_ref())
        .map(|l| l.name.clone())
        .collect();
    for name in &stale {
        api.remove_label(repo, number, name).await?;
    }

    if let Some(label) = wanted.filter(|l| !issue.has_label(l)) {
        api.add_labels(repo, number, &[label]).await?;
    }

    api.get_issue(repo, number).await
}

fn print_issue(issue: &Issue) {
    println!(
        "{} {} [{}]",
        format!("#{}", issue.number).bold(),
        issue.title.bold(),
        state_colored(issue.state.as_str())
    );
    println!("{}", issue.html_url.dimmed());
    println!();
    println!("Column:     {}", classify(issue));
    println!("Author:     @{}", issue.author());
    if let Some(dept) = issue.department() {
        println!(
            "Department: {}",
            label_colored(dept.department_name().unwrap_or(&dept.name), &dept.color)
        );
    }
    let labels: Vec<String> = issue
        .labels
        .iter()
        .filter(|l| !l.is_department())
        .map(|l| label_colored(&l.name, &l.color))
        .collect();
    if !labels.is_empty() {
        println!("Labels:     {}", labels.join(", "));
    }
    if !issue.assignees.is_empty() {
        let logins: Vec<String> = issue.assignees.iter().map(|a| format!("@{}", a.login)).collect();
        println!("Assignees:  {}", logins.join(", "));
    }
    if let Some(m) = &issue.milestone {
        println!("Milestone:  {} (#{})", m.title, m.number);
    }
    println!("Created:    {}", format_date_only(&issue.created_at));
    println!("Updated:    {}", format_relative(&issue.updated_at));

    if let Some(body) = issue.body.as_deref().filter(|b| !b.trim().is_empty()) {
        println!();
        println!("{body}");
    }
}

fn print_detail(detail: &IssueDetail) {
    print_issue(&detail.issue);
    println!();

    let list = |items: &[String]| {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(", ")
        }
    };
    println!("{}", "Available".bold());
    println!("  Assignees:   {}", list(&detail.assignable));
    println!("  Labels:      {}", list(&detail.addable_labels));
    println!("  Departments: {}", list(&detail.departments));
    let milestones: Vec<String> = detail
        .milestones
        .iter()
        .map(|m| match &m.due_on {
            Some(due) => format!("#{} {} (due {})", m.number, m.title, format_date_only(due)),
            None => format!("#{} {}", m.number, m.title),
        })
        .collect();
    println!("  Milestones:  {}", list(&milestones));
}
