// Interactive front end
// A generic numbered-menu engine, the banking session built on top of it,
// and the user interaction port with its terminal and scripted adapters.

pub mod menu;
pub mod scripted;
pub mod session;
pub mod terminal;

use anyhow::Result;

pub use menu::{repeat_until, run_menu, Menu, MenuHost, MenuOption, MenuSelection};
pub use scripted::ScriptedPort;
pub use session::{MenuFlow, Session};
pub use terminal::TerminalPort;

/// Text-based conversation with the user
pub trait UserPort {
    /// Ask for a line of text. `Ok(None)` means the user cancelled.
    fn prompt(&mut self, message: &str, default: Option<&str>) -> Result<Option<String>>;

    /// Show a message
    fn alert(&mut self, message: &str) -> Result<()>;

    /// Ask a yes/no question
    fn confirm(&mut self, message: &str) -> Result<bool>;
}
