//! Rendering helpers for the console.

use owo_colors::OwoColorize;
use parley_core::Stage;
use parley_core::conversation::{Conversation, Role};

pub const BAR_CHAR: &str = "▎";

/// The status line shown when the loop settles into a stage.
pub fn stage_line(stage: Stage) -> String {
    match stage {
        Stage::Idle => {
            format!("{} Ready - press Enter to talk", "●".dimmed())
        }
        Stage::Listening => {
            format!(
                "{} Listening... (Enter stops)",
                "●".bright_blue()
            )
        }
        Stage::Processing => {
            format!("{} Thinking...", "●".bright_yellow())
        }
        Stage::Speaking => {
            format!(
                "{} Speaking... (Enter interrupts)",
                "●".bright_green()
            )
        }
    }
}

pub fn entry_line(role: Role, content: &str) -> String {
    match role {
        Role::User => {
            format!("{}You: {content}", BAR_CHAR.bright_cyan())
        }
        Role::Assistant => {
            format!("{}Parley: {content}", BAR_CHAR.bright_green())
        }
    }
}

pub fn error_line(message: &str) -> String {
    format!("{}{}", BAR_CHAR.bright_red(), message.bright_red())
}

/// Renders the most recent exchanges, newest last.
pub fn render_recent(entries: &[(Role, String)]) -> String {
    if entries.is_empty() {
        return "No conversation yet.".to_owned();
    }
    let start = entries.len().saturating_sub(Conversation::DISPLAY_LIMIT);
    let mut out = String::from("Recent conversation:\n");
    for (role, content) in &entries[start..] {
        out.push_str(&entry_line(*role, content));
        out.push('\n');
    }
    out.pop();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_recent_shows_the_last_six() {
        let entries: Vec<_> = (0..9)
            .map(|i| (Role::User, format!("line {i}")))
            .collect();
        let rendered = render_recent(&entries);
        assert!(!rendered.contains("line 2"));
        assert!(rendered.contains("line 3"));
        assert!(rendered.contains("line 8"));
    }
}
