pub mod logging;
pub mod output;
pub mod tui;
pub mod watch;
