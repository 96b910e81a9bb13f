//! Per-command help text

use crate::command::{Capability, CapabilityKind};

const CONFIGURATIONS: &str = "NONE, MF_ULTRALIGHT, MF_CLASSIC_1K, MF_CLASSIC_1K_7B, \
MF_CLASSIC_4K, MF_CLASSIC_4K_7B, ISO14443A_SNIFF, ISO14443A_READER";

/// Help for the shell-local commands
fn local_help(word: &str) -> Option<&'static str> {
    let text = match word {
        "port" => "Specify the device port, for example: port /dev/ttyACM0",
        "verbose" => "Toggle debug output of the device traffic",
        "help" => "Show the command list, or help for one command: help config",
        "shell" => "Run a shell command, for example: shell ls -l",
        "exit" | "x" | "q" => "Exit the application. Shorthand: x q Ctrl-D",
        _ => return None,
    };
    Some(text)
}

/// Help for a device command
fn capability_help(capability: Capability) -> String {
    let text = match capability {
        Capability::Info => "Retrieve the firmware version",
        Capability::Uid => "Retrieve or set the current UID",
        Capability::GetUid => "Retrieve the UID of the card in range",
        Capability::Identify => "Identify the card in range",
        Capability::DumpMfu => "Dump the MIFARE Ultralight card in range",
        Capability::Config => {
            return format!(
                "Retrieve or set the current configuration: {}",
                CONFIGURATIONS
            )
        }
        Capability::Setting => "Retrieve or set the active setting slot",
        Capability::Download => "Download a card dump, for example: download card.dump",
        Capability::Upload => "Upload a card dump, for example: upload card.dump",
        Capability::Log => "Download the device log, for example: log device.log",
        Capability::LogMode => "Retrieve or set the current log mode",
        Capability::LButton => "Retrieve or set the current left button action",
        Capability::RButton => "Retrieve or set the current right button action",
        Capability::LButtonLong => "Retrieve or set the current left button long press action",
        Capability::RButtonLong => "Retrieve or set the current right button long press action",
        Capability::GreenLed => "Retrieve or set the current green LED function",
        Capability::RedLed => "Retrieve or set the current red LED function",
        Capability::Field => "Enable or disable the reader field",
        Capability::ReadOnly => "Retrieve or set the read-only mode",
        Capability::Threshold => "Retrieve or set the reader threshold",
        Capability::Upgrade => "Put the microcontroller into upgrade mode",
    };

    if capability.kind() == CapabilityKind::Settable {
        format!("{}. Use ? for the current value, ?? for the valid values", text)
    } else {
        text.to_string()
    }
}

/// Help text for `help <word>`
pub fn for_command(word: &str) -> Option<String> {
    if let Some(text) = local_help(word) {
        return Some(text.to_string());
    }
    Capability::from_word(word).map(capability_help)
}

/// Command overview for a bare `help`
pub fn overview() -> String {
    let device: Vec<&str> = Capability::ALL.iter().map(|cap| cap.word()).collect();
    format!(
        "Device commands: {}\nShell commands: port, verbose, help, shell, exit\n\
Type help <command> for details",
        device.join(", ")
    )
}
