use colored::Colorize;
use shared::{
    alert::Alert,
    interaction::TaskView,
    sync::SyncState,
    types::Task,
};

const RULE: &str = "────────────────────────────────────────────────────────";

/// Task board: heading, create affordance and one card per task.
pub fn render_board(tasks: &[Task], currency: &str, connected: bool) -> String {
    let mut out = Vec::new();
    out.push(format!("{}", "Tasks".bold()));
    if connected {
        out.push(format!("{}", "[ Create Task ]".blue()));
    }
    out.push(String::new());

    if tasks.is_empty() {
        out.push(format!("{}", "No tasks yet.".dimmed()));
        return out.join("\n");
    }

    for view in TaskView::list(tasks, currency) {
        out.push(render_card(&view, connected));
    }
    out.join("\n")
}

fn render_card(view: &TaskView, connected: bool) -> String {
    let mut lines = vec![
        RULE.dimmed().to_string(),
        format!("{} {}", format!("#{}", view.index).dimmed(), view.title.bold()),
        view.summary.clone(),
    ];
    let reward = view.reward_display.bold().to_string();
    if connected {
        lines.push(format!("{reward}    {}", format!("See Task: show {}", view.index).blue()));
    } else {
        lines.push(reward);
    }
    lines.push(format!("{}", format!("Posted by: {}", view.poster_short).dimmed()));
    lines.join("\n")
}

/// Full view of one task.
pub fn render_detail(view: &TaskView) -> String {
    let status = if view.active {
        "Active".green()
    } else {
        "Closed".red()
    };
    [
        format!("{} {}", format!("#{}", view.index).dimmed(), view.title.bold()),
        RULE.dimmed().to_string(),
        view.description.clone(),
        String::new(),
        format!("Reward:    {} ({} wei)", view.reward_display.bold(), view.reward),
        format!("Status:    {status}"),
        format!("Posted by: {}", view.poster),
    ]
    .join("\n")
}

/// Alert matching a state, if the state warrants one.
pub fn state_alert(state: &SyncState) -> Option<Alert> {
    match state {
        SyncState::Failed { index, reason, .. } => {
            Some(Alert::error(format!("Failed to load task {index}: {reason}. Enter `r` to retry.")))
        }
        SyncState::WaitingForCount | SyncState::Uninitialized => {
            Some(Alert::info("Waiting for the task count..."))
        }
        SyncState::Fetching { .. } | SyncState::Ready { .. } => None,
    }
}
