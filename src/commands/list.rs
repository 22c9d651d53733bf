use git_wt::git::{Repository, Worktree};
use git_wt::path::format_path_for_display;
use git_wt::styling::{CURRENT, DIM, pad_visible, visible_width};

use crate::output;

/// Abbreviated commit length shown in the table
const SHORT_HEAD: usize = 7;

pub(crate) fn handle_list(json: bool) -> anyhow::Result<()> {
    let repo = Repository::current()?;
    let worktrees = repo.list_worktrees()?;

    if json {
        output::data(serde_json::to_string_pretty(&worktrees)?)?;
    } else {
        output::data(render_table(&worktrees))?;
    }
    Ok(())
}

/// One row per worktree: current marker, branch, short commit, path.
fn render_table(worktrees: &[Worktree]) -> String {
    let rows: Vec<[String; 4]> = worktrees.iter().map(render_row).collect();

    let mut widths = [0; 4];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(visible_width(cell));
        }
    }

    rows.iter()
        .map(|row| {
            let line = row
                .iter()
                .zip(widths)
                .map(|(cell, width)| pad_visible(cell, width))
                .collect::<Vec<_>>()
                .join("  ");
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_row(wt: &Worktree) -> [String; 4] {
    let marker = if wt.current {
        format!("{CURRENT}*{CURRENT:#}")
    } else {
        String::new()
    };

    let branch = if wt.current {
        format!("{CURRENT}{}{CURRENT:#}", wt.branch_display())
    } else {
        wt.branch_display().to_string()
    };

    let short: String = wt.head.chars().take(SHORT_HEAD).collect();
    let head = format!("{DIM}{short}{DIM:#}");

    let mut path = format_path_for_display(&wt.path);
    for (label, reason) in [("locked", &wt.locked), ("prunable", &wt.prunable)] {
        match reason.as_deref() {
            Some("") => path.push_str(&format!(" {DIM}({label}){DIM:#}")),
            Some(reason) => path.push_str(&format!(" {DIM}({label}: {reason}){DIM:#}")),
            None => {}
        }
    }

    [marker, branch, head, path]
}
