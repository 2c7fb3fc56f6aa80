use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::board::{BoardFilter, Column};
use crate::types::State;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Parser)]
#[command(name = "gh-kanban")]
#[command(about = "A Kanban board over GitHub Issues", version)]
#[command(after_help = "EXAMPLES:
    gh-kanban login                          Sign in with GitHub
    gh-kanban board -R acme/widgets          Show the board
    gh-kanban move 12 done                   Move issue #12 to Done
    gh-kanban issue create -t \"Title\"        Create a new issue
    gh-kanban label list                     List repository labels")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository as OWNER/REPO (defaults to default_repo in config)
    #[arg(long, short = 'R', global = true)]
    pub repo: Option<String>,

    /// Output format (table, json)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Suppress success messages
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show detailed error information and debug logs
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the board for a repository
    #[command(
        alias = "b",
        after_help = "EXAMPLES:
    gh-kanban board
    gh-kanban board acme/widgets --label bug
    gh-kanban board --author octocat --milestone v1.0"
    )]
    Board(BoardArgs),
    /// Move an issue to another column
    #[command(
        alias = "mv",
        after_help = "EXAMPLES:
    gh-kanban move 12 in-progress
    gh-kanban move 12 done
    gh-kanban move 12 todo --position 0"
    )]
    Move(MoveArgs),
    /// Manage issues
    #[command(
        alias = "i",
        after_help = "EXAMPLES:
    gh-kanban issue view 12
    gh-kanban issue create -t \"Fix login\" --column in-progress
    gh-kanban issue assign 12 octocat
    gh-kanban issue dept 12 backend
    gh-kanban issue close 12"
    )]
    Issue {
        #[command(subcommand)]
        action: IssueCommands,
    },
    /// Manage repository labels
    #[command(
        alias = "l",
        after_help = "EXAMPLES:
    gh-kanban label list
    gh-kanban label create dept:backend --color 5319e7
    gh-kanban label update bug --new-name defect
    gh-kanban label delete wontfix"
    )]
    Label {
        #[command(subcommand)]
        action: LabelCommands,
    },
    /// Manage milestones
    #[command(
        alias = "m",
        after_help = "EXAMPLES:
    gh-kanban milestone list
    gh-kanban milestone create \"v1.0\" --due 2025-06-30
    gh-kanban milestone update 3 --state closed
    gh-kanban milestone delete 3"
    )]
    Milestone {
        #[command(subcommand)]
        action: MilestoneCommands,
    },
    /// List repositories you can access
    #[command(after_help = "EXAMPLES:
    gh-kanban repos
    gh-kanban repos --search kanban")]
    Repos {
        /// Only show repositories whose name or description contains this text
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Sign in with GitHub (OAuth device flow)
    #[command(after_help = "EXAMPLES:
    gh-kanban login")]
    Login,
    /// Forget the stored GitHub token
    Logout,
    /// Show the signed-in GitHub user
    Whoami,
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    gh-kanban completions bash > ~/.bash_completion.d/gh-kanban
    gh-kanban completions zsh > ~/.zfunc/_gh-kanban
    gh-kanban completions fish > ~/.config/fish/completions/gh-kanban.fish")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    #[command(after_help = "EXAMPLES:
    gh-kanban init")]
    Init,
}

#[derive(Args, Clone)]
pub struct BoardArgs {
    /// Repository as OWNER/REPO (same as -R)
    #[arg(value_name = "REPO")]
    pub repository: Option<String>,

    /// Only issues opened by this user
    #[arg(long)]
    pub author: Option<String>,

    /// Only issues assigned to this user
    #[arg(long)]
    pub assignee: Option<String>,

    /// Only issues carrying this label
    #[arg(long)]
    pub label: Option<String>,

    /// Only issues in this milestone (by title)
    #[arg(long)]
    pub milestone: Option<String>,

    /// Fetch immediately even if a move was just made
    #[arg(long)]
    pub no_wait: bool,
}

impl BoardArgs {
    pub fn filter(&self) -> BoardFilter {
        BoardFilter {
            author: self.author.clone(),
            assignee: self.assignee.clone(),
            label: self.label.clone(),
            milestone: self.milestone.clone(),
        }
    }
}

#[derive(Args)]
pub struct MoveArgs {
    /// Issue number
    pub number: u64,

    /// Destination column
    #[arg(value_enum)]
    pub column: Column,

    /// Position in the destination column (0 = top, defaults to bottom)
    #[arg(long)]
    pub position: Option<usize>,

    /// Fetch immediately even if a move was just made
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Subcommand)]
pub enum IssueCommands {
    /// Show an issue with what can be assigned, labelled or scheduled
    #[command(alias = "v")]
    View {
        /// Issue number
        number: u64,
    },
    /// Create a new issue
    #[command(
        alias = "c",
        after_help = "EXAMPLES:
    gh-kanban issue create -t \"Fix login bug\"
    gh-kanban issue create -t \"Ship it\" -d \"Details\" --column done"
    )]
    Create(IssueCreateArgs),
    /// Change the title
    Title {
        /// Issue number
        number: u64,
        /// New title
        title: String,
    },
    /// Change the description
    Body {
        /// Issue number
        number: u64,
        /// New description (markdown supported)
        body: String,
    },
    /// Assign a user
    Assign {
        /// Issue number
        number: u64,
        /// GitHub login
        login: String,
    },
    /// Remove an assignee
    Unassign {
        /// Issue number
        number: u64,
        /// GitHub login
        login: String,
    },
    /// Set or clear the milestone
    #[command(after_help = "EXAMPLES:
    gh-kanban issue milestone 12 3
    gh-kanban issue milestone 12 --clear")]
    Milestone {
        /// Issue number
        number: u64,
        /// Milestone number
        #[arg(required_unless_present = "clear", conflicts_with = "clear")]
        milestone: Option<u64>,
        /// Remove the milestone
        #[arg(long)]
        clear: bool,
    },
    /// Add a label
    LabelAdd {
        /// Issue number
        number: u64,
        /// Label name
        name: String,
    },
    /// Remove a label
    LabelRemove {
        /// Issue number
        number: u64,
        /// Label name
        name: String,
    },
    /// Set or clear the department (a single dept: label)
    #[command(after_help = "EXAMPLES:
    gh-kanban issue dept 12 backend
    gh-kanban issue dept 12 dept:design
    gh-kanban issue dept 12 --clear")]
    Dept {
        /// Issue number
        number: u64,
        /// Department, with or without the dept: prefix
        #[arg(required_unless_present = "clear", conflicts_with = "clear")]
        department: Option<String>,
        /// Remove the department
        #[arg(long)]
        clear: bool,
    },
    /// Close an issue
    Close {
        /// Issue number
        number: u64,
    },
    /// Reopen a closed issue
    Reopen {
        /// Issue number
        number: u64,
    },
}

#[derive(Args)]
pub struct IssueCreateArgs {
    /// Issue title
    #[arg(long, short)]
    pub title: String,

    /// Issue description
    #[arg(long, short)]
    pub description: Option<String>,

    /// Column the issue starts in
    #[arg(long, value_enum, default_value = "todo")]
    pub column: Column,
}

#[derive(Subcommand)]
pub enum LabelCommands {
    /// List labels
    #[command(alias = "ls")]
    List,
    /// Create a label
    Create {
        /// Label name
        name: String,
        /// Hex color, with or without '#'
        #[arg(long, short, default_value = "0969da")]
        color: String,
        /// Label description
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Rename, recolor or redescribe a label
    Update {
        /// Current label name
        name: String,
        /// New name
        #[arg(long)]
        new_name: Option<String>,
        /// New hex color
        #[arg(long, short)]
        color: Option<String>,
        /// New description
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Delete a label
    Delete {
        /// Label name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum MilestoneCommands {
    /// List open and closed milestones
    #[command(alias = "ls")]
    List,
    /// Create a milestone
    Create {
        /// Milestone title
        title: String,
        /// Milestone description
        #[arg(long, short)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// Update a milestone
    Update {
        /// Milestone number
        number: u64,
        /// New title
        #[arg(long, short)]
        title: Option<String>,
        /// New description
        #[arg(long, short)]
        description: Option<String>,
        /// New due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// Open or close the milestone
        #[arg(long, value_enum)]
        state: Option<State>,
    },
    /// Delete a milestone
    Delete {
        /// Milestone number
        number: u64,
    },
}
