//! Binary entrypoint for the session chat server.

use std::process::ExitCode;

use session_chat::start_session_chat;

/// Configure from the environment and serve until Ctrl+C.
fn main() -> ExitCode {
    start_session_chat::run()
}
