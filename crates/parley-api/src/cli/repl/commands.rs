//! Help text and message rendering for the REPL.

use std::io::Write;

use console::{Color, style};
use parley_types::identity::IdentityKind;
use parley_types::message::Delivery;

/// Channel or handle a delivery was published on (`<topic_base>/<name>`).
pub fn topic_name<'a>(topic_base: &str, topic: &'a str) -> &'a str {
    topic
        .strip_prefix(topic_base.trim_end_matches('/'))
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(topic)
}

fn sender_color(kind: IdentityKind) -> Color {
    match kind {
        IdentityKind::Bot => Color::Yellow,
        IdentityKind::User => Color::Cyan,
        IdentityKind::Other => Color::Magenta,
    }
}

/// `[channel] sender: body`, with the sender coloured by naming convention.
pub fn render_delivery(topic_base: &str, delivery: &Delivery) -> String {
    let sender = style(delivery.message.sender.to_string())
        .fg(sender_color(delivery.message.sender.kind()));
    format!(
        "{} {}: {}",
        style(format!("[{}]", topic_name(topic_base, &delivery.topic))).dim(),
        sender.bold(),
        delivery.message.body
    )
}

/// Print the help text listing all available commands.
pub fn print_help(out: &mut impl Write) {
    let rows = [
        ("/channel <name>", "/c change-channel", "Switch to another channel"),
        ("/channels", "/ls list-channels", "List known channels"),
        ("/help", "/h /? help", "Show this help message"),
        ("/exit", "/quit /q exit", "Leave the chat"),
    ];

    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", style("Available commands:").bold());
    let _ = writeln!(out);
    for (cmd, aliases, text) in rows {
        let _ = writeln!(
            out,
            "  {:<18} {:<20} {}",
            style(cmd).cyan(),
            style(aliases).dim(),
            text
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {}",
        style("Anything else is sent to the current channel. /admin <name> changes the server admin.").dim()
    );
    let _ = writeln!(out);
}

/// Print the channel list, marking the current one.
pub fn print_channels(out: &mut impl Write, current: &str, known: &[String]) {
    let _ = writeln!(out);
    let mut listed = false;
    for name in known {
        listed |= name == current;
        print_channel_row(out, name, name == current);
    }
    if !listed {
        print_channel_row(out, current, true);
    }
    let _ = writeln!(out);
}

fn print_channel_row(out: &mut impl Write, name: &str, current: bool) {
    if current {
        let _ = writeln!(out, "  {} {}", style("*").green().bold(), style(name).bold());
    } else {
        let _ = writeln!(out, "    {name}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::identity::Identity;
    use parley_types::message::{ChatMessage, RecipientRef};

    fn delivery(topic: &str) -> Delivery {
        Delivery {
            topic: topic.to_string(),
            message: ChatMessage {
                id: Default::default(),
                sender: Identity::from("@bob"),
                recipients: vec![RecipientRef::channel("general")],
                body: "hi all".to_string(),
                timestamp: Default::default(),
                authored_by_bot: false,
            },
        }
    }

    #[test]
    fn topic_name_strips_base() {
        assert_eq!(topic_name("parley/chat", "parley/chat/general"), "general");
        assert_eq!(topic_name("parley/chat/", "parley/chat/@alice"), "@alice");
        assert_eq!(topic_name("other", "parley/chat/general"), "parley/chat/general");
    }

    #[test]
    fn delivery_line_format() {
        console::set_colors_enabled(false);
        assert_eq!(
            render_delivery("parley/chat", &delivery("parley/chat/general")),
            "[general] @bob: hi all"
        );
    }

    #[test]
    fn bot_senders_are_highlighted() {
        assert_eq!(sender_color(Identity::from("@@llm").kind()), Color::Yellow);
        assert_eq!(sender_color(Identity::from("@bob").kind()), Color::Cyan);
        assert_eq!(sender_color(Identity::from("server").kind()), Color::Magenta);
    }

    #[test]
    fn channel_list_marks_current_even_if_unadvertised() {
        let mut out = Vec::new();
        print_channels(&mut out, "secret", &["general".to_string()]);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("general"));
        assert!(text.contains("secret"));
    }

    #[test]
    fn help_lists_every_command() {
        let mut out = Vec::new();
        print_help(&mut out);
        let text = String::from_utf8(out).unwrap();
        for cmd in ["/channel", "/channels", "/help", "/exit"] {
            assert!(text.contains(cmd), "missing {cmd}");
        }
    }
}
