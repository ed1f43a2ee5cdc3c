use owo_colors::OwoColorize;

/// Terminal output helpers shared by all commands
#[derive(Debug, Clone, Default)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn section(&self, title: &str) {
        println!();
        println!("{}", title.bright_white().bold());
    }

    pub fn kv(&self, key: &str, value: &str) {
        println!("  {:<18} {}", format!("{key}:").dimmed(), value);
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", "!".yellow(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message.red());
    }

    pub fn status_flag(disabled: bool) -> String {
        if disabled {
            "disabled".dimmed().to_string()
        } else {
            "enabled".green().to_string()
        }
    }
}
