use crate::client::IssueApi;
use crate::error::{KanbanError, Result};
use crate::payloads::{IssueUpdate, LabelInput};
use crate::types::{Issue, Label, RepoRef, State};

use super::columns::{Board, Column};

/// A label the board owns and will create on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLabel {
    pub name: &'static str,
    pub color: &'static str,
    pub description: &'static str,
}

pub const IN_PROGRESS: StatusLabel = StatusLabel {
    name: "status:in-progress",
    color: "0366d6",
    description: "Issue is in progress",
};

pub const DONE: StatusLabel = StatusLabel {
    name: "status:done",
    color: "22863a",
    description: "Issue is completed",
};

pub const STATUS_LABELS: [StatusLabel; 2] = [IN_PROGRESS, DONE];

impl StatusLabel {
    pub fn input(&self) -> LabelInput {
        LabelInput {
            name: self.name.to_string(),
            color: self.color.to_string(),
            description: Some(self.description.to_string()),
        }
    }
}

/// What moving into a column does to labels and state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelDelta {
    pub add: Option<StatusLabel>,
    pub remove: &'static [&'static str],
    pub state: State,
}

pub fn delta_for(to: Column) -> LabelDelta {
    match to {
        Column::InProgress => LabelDelta {
            add: Some(IN_PROGRESS),
            remove: &[DONE.name],
            state: State::Open,
        },
        Column::Done => LabelDelta {
            add: Some(DONE),
            remove: &[IN_PROGRESS.name],
            state: State::Closed,
        },
        Column::Todo => LabelDelta {
            add: None,
            remove: &[IN_PROGRESS.name, DONE.name],
            state: State::Open,
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    pub number: u64,
    pub from: Column,
    pub to: Column,
    pub add: Option<StatusLabel>,
    pub remove: Vec<String>,
    pub previous_state: State,
    pub new_state: State,
}

impl MovePlan {
    pub fn state_changed(&self) -> bool {
        self.previous_state != self.new_state
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// Same column; the new order only exists locally.
    Reordered,
    Moved(MovePlan),
}

pub fn plan_move(issue: &Issue, from: Column, to: Column) -> MovePlan {
    let delta = delta_for(to);
    MovePlan {
        number: issue.number,
        from,
        to,
        add: delta.add,
        remove: delta.remove.iter().map(|s| s.to_string()).collect(),
        previous_state: issue.state,
        new_state: delta.state,
    }
}

/// The issue as it will look once the plan lands on GitHub.
pub fn apply_optimistic(issue: &Issue, plan: &MovePlan) -> Issue {
    let mut updated = issue.clone();
    updated.labels.retain(|l| !plan.remove.contains(&l.name));
    if let Some(add) = plan.add {
        if !updated.has_label(add.name) {
            updated.labels.push(Label::new(add.name, add.color));
        }
    }
    updated.state = plan.new_state;
    updated
}

impl Board {
    /// Move a card locally. `index` is the position in the destination column;
    /// `None` appends.
    pub fn move_issue(&mut self, number: u64, to: Column, index: Option<usize>) -> Result<MoveOutcome> {
        let (from, pos) = self.find(number).ok_or(KanbanError::IssueNotOnBoard(number))?;
        let issue = self.column_mut(from).remove(pos);

        let (placed, outcome) = if from == to {
            (issue, MoveOutcome::Reordered)
        } else {
            let plan = plan_move(&issue, from, to);
            (apply_optimistic(&issue, &plan), MoveOutcome::Moved(plan))
        };

        let target = self.column_mut(to);
        let index = index.unwrap_or(target.len()).min(target.len());
        target.insert(index, placed);

        Ok(outcome)
    }
}

/// Push a planned move to GitHub: drop stale labels, add the new one, flip state.
///
/// Calls run strictly in order. A failure part way leaves GitHub half-updated;
/// the caller re-fetches to find out where things stand.
pub async fn execute<A: IssueApi>(api: &A, repo: &RepoRef, plan: &MovePlan) -> Result<()> {
    tracing::info!(number = plan.number, from = %plan.from, to = %plan.to, "moving issue");

    for name in &plan.remove {
        match api.remove_label(repo, plan.number, name).await {
            Ok(()) => tracing::debug!(label = %name, "removed label"),
            Err(e) if e.is_not_found() => {
                tracing::debug!(label = %name, "label was not on the issue")
            }
            Err(e) => return Err(e),
        }
    }

    if let Some(status) = plan.add {
        let labels = vec![status.name.to_string()];
        match api.add_labels(repo, plan.number, &labels).await {
            Ok(_) => tracing::debug!(label = status.name, "added label"),
            Err(e) if e.is_validation() => {
                tracing::info!(label = status.name, "label missing from repository, creating it");
                api.create_label(repo, &status.input()).await?;
                api.add_labels(repo, plan.number, &labels).await?;
            }
            Err(e) => return Err(e),
        }
    }

    if plan.state_changed() {
        api.update_issue(repo, plan.number, &IssueUpdate::state(plan.new_state))
            .await?;
        tracing::debug!(from = %plan.previous_state, to = %plan.new_state, "updated state");
    }

    Ok(())
}

/// Create whichever board status labels the repository lacks.
///
/// Failures are logged and skipped; a missing label is created again on the next move.
pub async fn ensure_status_labels<A: IssueApi>(api: &A, repo: &RepoRef, existing: &[Label]) -> usize {
    let mut created = 0;
    for status in STATUS_LABELS {
        if existing.iter().any(|l| l.name == status.name) {
            continue;
        }
        match api.create_label(repo, &status.input()).await {
            Ok(_) => {
                tracing::info!(label = status.name, "created status label");
                created += 1;
            }
            Err(e) => tracing::warn!(label = status.name, error = %e, "failed to create status label"),
        }
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::columns::{classify, BoardFilter};
    use crate::testing::{issue, Call, FakeApi};

    fn repo() -> RepoRef {
        RepoRef::new("acme", "widgets")
    }

    fn label_names(issue: &Issue) -> Vec<&str> {
        issue.labels.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_move_into_done_closes() {
        let mut open = issue(1, &["bug", "status:in-progress"]);
        open.state = State::Open;

        let plan = plan_move(&open, Column::InProgress, Column::Done);
        let moved = apply_optimistic(&open, &plan);

        assert_eq!(label_names(&moved), vec!["bug", "status:done"]);
        assert_eq!(moved.state, State::Closed);
        assert!(plan.state_changed());
        assert_eq!(classify(&moved), Column::Done);
    }

    #[test]
    fn test_move_from_done_to_in_progress_reopens() {
        let mut closed = issue(2, &["status:done"]);
        closed.state = State::Closed;

        let plan = plan_move(&closed, Column::Done, Column::InProgress);
        let moved = apply_optimistic(&closed, &plan);

        assert_eq!(label_names(&moved), vec!["status:in-progress"]);
        assert_eq!(moved.state, State::Open);
        assert_eq!(plan.remove, vec!["status:done".to_string()]);
    }

    #[test]
    fn test_move_to_todo_strips_status_labels() {
        let mut closed = issue(3, &["status:done", "status:in-progress", "docs"]);
        closed.state = State::Closed;

        let plan = plan_move(&closed, Column::Done, Column::Todo);
        let moved = apply_optimistic(&closed, &plan);

        assert_eq!(plan.add, None);
        assert_eq!(label_names(&moved), vec!["docs"]);
        assert_eq!(moved.state, State::Open);
        assert_eq!(classify(&moved), Column::Todo);
    }

    #[test]
    fn test_open_issue_to_in_progress_keeps_state() {
        let open = issue(4, &[]);
        let plan = plan_move(&open, Column::Todo, Column::InProgress);
        assert!(!plan.state_changed());
    }

    #[test]
    fn test_optimistic_does_not_duplicate_label() {
        let already = issue(5, &["status:done"]);
        let plan = plan_move(&already, Column::Todo, Column::Done);
        let moved = apply_optimistic(&already, &plan);
        assert_eq!(label_names(&moved), vec!["status:done"]);
    }

    #[test]
    fn test_board_move_relocates_card() {
        let mut board = Board::organize(
            vec![issue(1, &[]), issue(2, &[]), issue(3, &["status:done"])],
            &BoardFilter::default(),
        );

        let outcome = board.move_issue(2, Column::Done, Some(0)).unwrap();

        assert!(matches!(outcome, MoveOutcome::Moved(ref p) if p.to == Column::Done));
        assert_eq!(board.todo.iter().map(|i| i.number).collect::<Vec<_>>(), vec![1]);
        assert_eq!(board.done.iter().map(|i| i.number).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(board.done[0].state, State::Closed);
    }

    #[test]
    fn test_board_same_column_reorders_only() {
        let mut board = Board::organize(
            vec![issue(1, &[]), issue(2, &[]), issue(3, &[])],
            &BoardFilter::default(),
        );

        let outcome = board.move_issue(3, Column::Todo, Some(0)).unwrap();

        assert_eq!(outcome, MoveOutcome::Reordered);
        assert_eq!(board.todo.iter().map(|i| i.number).collect::<Vec<_>>(), vec![3, 1, 2]);
        assert!(board.todo[0].labels.is_empty());
    }

    #[test]
    fn test_board_move_unknown_issue() {
        let mut board = Board::default();
        assert!(matches!(
            board.move_issue(42, Column::Done, None),
            Err(KanbanError::IssueNotOnBoard(42))
        ));
    }

    #[tokio::test]
    async fn test_execute_into_done_sequence() {
        let api = FakeApi::new();
        api.insert(issue(7, &["status:in-progress"]));
        api.define_labels(&["status:in-progress", "status:done"]);

        let plan = plan_move(&issue(7, &["status:in-progress"]), Column::InProgress, Column::Done);
        execute(&api, &repo(), &plan).await.unwrap();

        assert_eq!(
            api.calls(),
            vec![
                Call::RemoveLabel(7, "status:in-progress".to_string()),
                Call::AddLabels(7, vec!["status:done".to_string()]),
                Call::UpdateIssue(7, IssueUpdate::state(State::Closed)),
            ]
        );
        let stored = api.issue(7).unwrap();
        assert_eq!(label_names(&stored), vec!["status:done"]);
        assert_eq!(stored.state, State::Closed);
    }

    #[tokio::test]
    async fn test_execute_ignores_missing_label_on_remove() {
        let api = FakeApi::new();
        api.insert(issue(8, &[]));
        api.define_labels(&["status:in-progress", "status:done"]);

        let plan = plan_move(&issue(8, &[]), Column::Todo, Column::InProgress);
        let result = execute(&api, &repo(), &plan).await;

        assert!(result.is_ok());
        assert_eq!(label_names(&api.issue(8).unwrap()), vec!["status:in-progress"]);
    }

    #[tokio::test]
    async fn test_execute_creates_missing_label_and_retries_once() {
        let api = FakeApi::new();
        api.insert(issue(9, &[]));

        let plan = plan_move(&issue(9, &[]), Column::Todo, Column::Done);
        execute(&api, &repo(), &plan).await.unwrap();

        let calls = api.calls();
        let adds = calls.iter().filter(|c| matches!(c, Call::AddLabels(..))).count();
        assert_eq!(adds, 2);
        assert!(calls.contains(&Call::CreateLabel("status:done".to_string())));
        assert_eq!(api.repo_label("status:done").unwrap().color, "22863a");
        assert_eq!(label_names(&api.issue(9).unwrap()), vec!["status:done"]);
    }

    #[tokio::test]
    async fn test_execute_propagates_other_remove_failures() {
        let api = FakeApi::new();
        api.insert(issue(10, &["status:done"]));
        api.fail("remove_label", 500);

        let plan = plan_move(&issue(10, &["status:done"]), Column::Done, Column::Todo);
        let err = execute(&api, &repo(), &plan).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(!api.calls().iter().any(|c| matches!(c, Call::UpdateIssue(..))));
    }

    #[tokio::test]
    async fn test_execute_state_failure_is_reported() {
        let api = FakeApi::new();
        api.insert(issue(11, &[]));
        api.define_labels(&["status:done"]);
        api.fail("update_issue", 403);

        let plan = plan_move(&issue(11, &[]), Column::Todo, Column::Done);
        let err = execute(&api, &repo(), &plan).await.unwrap_err();

        assert_eq!(err.status(), Some(403));
        // The label already landed; only a re-fetch shows the real state.
        assert!(api.issue(11).unwrap().has_label("status:done"));
    }

    #[tokio::test]
    async fn test_ensure_status_labels_creates_only_missing() {
        let api = FakeApi::new();
        let existing = vec![Label::new("status:done", "22863a")];

        let created = ensure_status_labels(&api, &repo(), &existing).await;

        assert_eq!(created, 1);
        assert_eq!(api.calls(), vec![Call::CreateLabel("status:in-progress".to_string())]);
    }

    #[tokio::test]
    async fn test_ensure_status_labels_swallows_failures() {
        let api = FakeApi::new();
        api.fail("create_label", 403);

        let created = ensure_status_labels(&api, &repo(), &[]).await;
        assert_eq!(created, 0);
    }
}
