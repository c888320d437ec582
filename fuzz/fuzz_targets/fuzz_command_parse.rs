//! Fuzz target: `Command::parse`
//!
//! Feeds arbitrary UTF-8 lines to the command parser and checks:
//! - No panics under any input
//! - Blank lines are never rejected
//! - Every accepted command prints back as a vocabulary word that parses
//!   to the same command
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use envnode::app::commands::{Command, CommandError};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    match Command::parse(line) {
        Ok(Some(cmd)) => {
            assert_eq!(Command::parse(cmd.as_str()), Ok(Some(cmd)));
        }
        Ok(None) => assert!(line.trim().is_empty()),
        Err(CommandError::Unknown(text)) => {
            assert!(!text.is_empty(), "blank line reported as unknown");
        }
    }
});
