//! Welcome banner display for REPL sessions.

use console::style;

/// Print the welcome banner: who you are, where you are connected, and where
/// your messages go.
pub fn print_welcome_banner(identity: &str, server_url: &str, channel: &str, admin: &str) {
    println!();
    println!("  {} {}", style("parley").cyan().bold(), style(identity).bold());
    println!();
    println!("  {}   {}", style("Server:").bold(), style(server_url).dim());
    println!("  {}  {}", style("Channel:").bold(), style(channel).dim());
    println!("  {}    {}", style("Admin:").bold(), style(admin).dim());
    println!();
    println!(
        "  {}",
        style("Type /help for commands, /exit or Ctrl+D to leave").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
