pub mod app_locator;
pub mod autostart;
pub mod control;
pub mod matcher;
pub mod privilege;
pub mod snapshot;
pub mod terminator;

pub use app_locator::ApplicationLocator;
pub use autostart::AutostartSweeper;
#[cfg(target_os = "macos")]
pub use autostart::Launchctl;
pub use control::{NativeControl, ProcessControl};
pub use matcher::Matcher;
pub use privilege::has_elevated_privileges;
pub use snapshot::{ProcessSnapshot, SysinfoSnapshot};
pub use terminator::Terminator;
