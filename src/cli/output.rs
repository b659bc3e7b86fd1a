use colored::Colorize;
use std::fmt;

use crate::domain::ControlStatus;

const BAR_WIDTH: usize = 20;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
        MessageKind::Info => text,
        MessageKind::Success => format!("[ok] {text}").bright_green().to_string(),
        MessageKind::Warning => format!("[!] {text}").bright_yellow().to_string(),
        MessageKind::Error => format!("[x] {text}").bright_red().to_string(),
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Error => eprintln!("{formatted}"),
        MessageKind::Section => println!("\n{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Status label coloured green, yellow or red.
pub fn status_label(status: ControlStatus) -> String {
    let label = status.to_string();
    match status {
        ControlStatus::Ok => label.green().to_string(),
        ControlStatus::Warning => label.yellow().bold().to_string(),
        ControlStatus::Danger => label.red().bold().to_string(),
    }
}

/// Fixed-width bar for a percentage in `[0, 100]`.
pub fn progress_bar(pct: f64, status: ControlStatus) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    let bar = format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled));
    match status {
        ControlStatus::Ok => bar.green().to_string(),
        ControlStatus::Warning => bar.yellow().to_string(),
        ControlStatus::Danger => bar.red().to_string(),
    }
}

/// Signed change, e.g. `+12.5%`; coloured when `expense_like` says growth is bad.
pub fn change_label(pct: f64, expense_like: bool) -> String {
    let text = format!("{pct:+.1}%");
    let worse = if expense_like { pct > 0.0 } else { pct < 0.0 };
    if pct == 0.0 {
        text
    } else if worse {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}
