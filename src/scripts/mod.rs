//! Status line scripts bundled into the binary.

/// A script that can be written out with `install-script`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Script {
    pub name: &'static str,
    pub filename: &'static str,
    pub description: &'static str,
    pub content: &'static str,
    /// Whether the installed file should be marked executable on Unix
    pub executable: bool,
}

static SCRIPTS: &[Script] = &[
    Script {
        name: "bash",
        filename: "claude-limits-statusline.sh",
        description: "Bash status line script for Claude Code",
        content: include_str!("claude-limits-statusline.sh"),
        executable: true,
    },
    Script {
        name: "powershell",
        filename: "claude-limits-statusline.ps1",
        description: "PowerShell status line script for Claude Code",
        content: include_str!("claude-limits-statusline.ps1"),
        executable: false,
    },
];

pub fn get(name: &str) -> Option<&'static Script> {
    SCRIPTS.iter().find(|script| script.name == name)
}

/// Script names, sorted
pub fn list() -> Vec<&'static str> {
    let mut names: Vec<&str> = SCRIPTS.iter().map(|script| script.name).collect();
    names.sort_unstable();
    names
}
