use std::time::Duration;

use tabled::{builder::Builder, settings::Style};

use crate::board::moves::{self, MoveOutcome};
use crate::board::sync::{self, SyncLog};
use crate::board::{Board, BoardFilter, Column};
use crate::cli::{BoardArgs, MoveArgs};
use crate::client::{GitHubClient, IssueApi};
use crate::config::Config;
use crate::error::{KanbanError, Result};
use crate::output::{self, truncate};
use crate::types::{Issue, RepoRef, State};

/// Open issues fetched per board load.
const OPEN_PAGE: u32 = 100;

/// Recently updated closed issues fetched per board load.
const CLOSED_PAGE: u32 = 30;

/// Open issues newest first, then the most recently touched closed ones.
pub async fn fetch_issues(client: &GitHubClient, repo: &RepoRef) -> Result<Vec<Issue>> {
    let open = client
        .list_issues(repo, State::Open, "created", OPEN_PAGE)
        .await?;
    let closed = client
        .list_issues(repo, State::Closed, "updated", CLOSED_PAGE)
        .await?;

    tracing::debug!(open = open.len(), closed = closed.len(), repo = %repo, "fetched issues");

    Ok(open
        .into_iter()
        .chain(closed)
        .filter(|i| !i.is_pull_request())
        .collect())
}

/// Where the board comes from. `wait` is the consistency delay to honour
/// before fetching, if any.
#[allow(async_fn_in_trait)]
pub trait BoardSource {
    async fn load_board(
        &self,
        repo: &RepoRef,
        filter: &BoardFilter,
        wait: Option<Duration>,
    ) -> Result<Board>;
}

impl BoardSource for GitHubClient {
    async fn load_board(
        &self,
        repo: &RepoRef,
        filter: &BoardFilter,
        wait: Option<Duration>,
    ) -> Result<Board> {
        if let Some(delay) = wait {
            if let Some(waited) = sync::wait_for_consistency(repo, delay).await {
                tracing::debug!(waited_ms = waited.as_millis() as u64, "waited before fetch");
            }
        }
        let issues = fetch_issues(self, repo).await?;
        Ok(Board::organize(issues, filter))
    }
}

pub async fn show(client: &GitHubClient, config: &Config, repo: &RepoRef, args: BoardArgs) -> Result<()> {
    match client.list_labels(repo).await {
        Ok(existing) => {
            moves::ensure_status_labels(client, repo, &existing).await;
        }
        Err(e) => tracing::warn!(error = %e, "could not check status labels"),
    }

    let filter = args.filter();
    let wait = (!args.no_wait).then(|| config.sync_delay());
    let board = client.load_board(repo, &filter, wait).await?;
    if board.is_empty() && !output::is_json_output() {
        if filter.is_empty() {
            output::print_message(&format!("No issues in {repo}"));
        } else {
            output::print_message("No issues match the filters");
        }
        return Ok(());
    }
    render(&board);
    Ok(())
}

pub async fn move_issue(client: &GitHubClient, config: &Config, repo: &RepoRef, args: MoveArgs) -> Result<()> {
    let wait = (!args.no_wait).then(|| config.sync_delay());
    move_with(client, repo, &args, wait, SyncLog::load()).await
}

/// Load, move locally, push to GitHub. On success the move is recorded in
/// `log`; on failure the board is reloaded at once and the error returned.
pub async fn move_with<A: IssueApi + BoardSource>(
    api: &A,
    repo: &RepoRef,
    args: &MoveArgs,
    wait: Option<Duration>,
    log: SyncLog,
) -> Result<()> {
    let mut board = api.load_board(repo, &BoardFilter::default(), wait).await?;

    let plan = match board.move_issue(args.number, args.column, args.position)? {
        MoveOutcome::Reordered => {
            output::print_message(&format!(
                "#{} is already in {}; card order is not saved to GitHub",
                args.number, args.column
            ));
            return Ok(());
        }
        MoveOutcome::Moved(plan) => plan,
    };

    match moves::execute(api, repo, &plan).await {
        Ok(()) => {
            sync::record_move_in(log, repo);
            render(&board);
            output::print_status(&format!("Moved #{} from {} to {}", plan.number, plan.from, plan.to));
            Ok(())
        }
        Err(e) => {
            tracing::error!(number = plan.number, error = %e, "move failed, reloading board");
            output::alert(&format!(
                "Move of #{} did not finish; reloading the board from GitHub",
                plan.number
            ));
            match api.load_board(repo, &BoardFilter::default(), None).await {
                Ok(fresh) => render(&fresh),
                Err(reload) => tracing::warn!(error = %reload, "could not reload board"),
            }
            Err(KanbanError::MoveFailed {
                number: plan.number,
                source: Box::new(e),
            })
        }
    }
}

/// One card: number and title, then department and labels, then people.
fn card(issue: &Issue) -> String {
    let mut lines = vec![format!("#{} {}", issue.number, truncate(&issue.title, 34))];

    let mut tags: Vec<String> = Vec::new();
    if let Some(dept) = issue.department() {
        let name = dept.department_name().unwrap_or(&dept.name).to_uppercase();
        tags.push(output::label_colored(&format!("[{name}]"), &dept.color));
    }
    let plain: Vec<_> = issue.plain_labels().collect();
    tags.extend(
        plain
            .iter()
            .take(3)
            .map(|l| output::label_colored(&l.name, &l.color)),
    );
    if plain.len() > 3 {
        tags.push(format!("+{}", plain.len() - 3));
    }
    if !tags.is_empty() {
        lines.push(tags.join(" "));
    }

    let people = match issue.assignees.as_slice() {
        [] => "unassigned".to_string(),
        [one] => format!("@{}", one.login),
        many if many.len() > 3 => format!("{} assignees", many.len()),
        many => many
            .iter()
            .map(|a| format!("@{}", a.login))
            .collect::<Vec<_>>()
            .join(", "),
    };
    match &issue.milestone {
        Some(m) => lines.push(format!("{people} · {}", m.title)),
        None => lines.push(people),
    }

    lines.join("\n")
}

pub fn render(board: &Board) {
    if output::is_json_output() {
        output::print_json(board);
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(
        Column::ALL.map(|c| format!("{} ({})", c.title(), board.column(c).len())),
    );

    let depth = Column::ALL
        .iter()
        .map(|c| board.column(*c).len())
        .max()
        .unwrap_or(0);
    for row in 0..depth {
        builder.push_record(
            Column::ALL.map(|c| board.column(c).get(row).map(card).unwrap_or_default()),
        );
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");
}
