//! Capability table: shell command word, device command and message labels

use chameleon_protocol::DeviceCommand;

/// How a capability is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    /// Pure query with no argument
    Read,
    /// Fire-and-report device action
    Action,
    /// Query / suggest / set through the shared policy
    Settable,
    /// Binary image from the device into a file
    Download,
    /// Binary image from a file to the device
    Upload,
}

/// Wording used for set results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrasing {
    /// "<Label> has been set to .." / "Setting <label> to .. failed: .."
    Set,
    /// "<Label> has been changed to .." / "Changing <label> to .. failed: .."
    Change,
}

/// Everything the rendering policy needs to know about one capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    pub label: &'static str,
    pub command: DeviceCommand,
    pub phrasing: Phrasing,
}

impl CapabilityDescriptor {
    /// Label with its first character upper-cased, for sentence starts
    pub fn title(&self) -> String {
        let mut chars = self.label.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Device-facing shell commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Info,
    Uid,
    GetUid,
    Identify,
    DumpMfu,
    Config,
    Setting,
    Download,
    Upload,
    Log,
    LogMode,
    LButton,
    RButton,
    LButtonLong,
    RButtonLong,
    GreenLed,
    RedLed,
    Field,
    ReadOnly,
    Threshold,
    Upgrade,
}

impl Capability {
    pub const ALL: [Capability; 21] = [
        Capability::Info,
        Capability::Uid,
        Capability::GetUid,
        Capability::Identify,
        Capability::DumpMfu,
        Capability::Config,
        Capability::Setting,
        Capability::Download,
        Capability::Upload,
        Capability::Log,
        Capability::LogMode,
        Capability::LButton,
        Capability::RButton,
        Capability::LButtonLong,
        Capability::RButtonLong,
        Capability::GreenLed,
        Capability::RedLed,
        Capability::Field,
        Capability::ReadOnly,
        Capability::Threshold,
        Capability::Upgrade,
    ];

    /// Look up a capability by its (case-sensitive) shell command word
    pub fn from_word(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cap| cap.word() == word)
    }

    /// Shell command word
    pub fn word(self) -> &'static str {
        match self {
            Capability::Info => "info",
            Capability::Uid => "uid",
            Capability::GetUid => "getuid",
            Capability::Identify => "identify",
            Capability::DumpMfu => "dumpmfu",
            Capability::Config => "config",
            Capability::Setting => "setting",
            Capability::Download => "download",
            Capability::Upload => "upload",
            Capability::Log => "log",
            Capability::LogMode => "logmode",
            Capability::LButton => "lbutton",
            Capability::RButton => "rbutton",
            Capability::LButtonLong => "lbuttonlong",
            Capability::RButtonLong => "rbuttonlong",
            Capability::GreenLed => "gled",
            Capability::RedLed => "rled",
            Capability::Field => "field",
            Capability::ReadOnly => "readonly",
            Capability::Threshold => "threshold",
            Capability::Upgrade => "upgrade",
        }
    }

    pub fn kind(self) -> CapabilityKind {
        match self {
            Capability::Info => CapabilityKind::Read,
            Capability::GetUid | Capability::Identify | Capability::DumpMfu => {
                CapabilityKind::Action
            }
            Capability::Upgrade => CapabilityKind::Action,
            Capability::Download | Capability::Log => CapabilityKind::Download,
            Capability::Upload => CapabilityKind::Upload,
            _ => CapabilityKind::Settable,
        }
    }

    /// Label, device command and phrasing for this capability
    pub fn descriptor(self) -> CapabilityDescriptor {
        let (label, command, phrasing) = match self {
            Capability::Info => ("version query", DeviceCommand::Version, Phrasing::Set),
            Capability::Uid => ("UID", DeviceCommand::Uid, Phrasing::Set),
            Capability::GetUid => ("UID read", DeviceCommand::GetUid, Phrasing::Set),
            Capability::Identify => ("identify", DeviceCommand::Identify, Phrasing::Set),
            Capability::DumpMfu => ("Ultralight dump", DeviceCommand::DumpMfu, Phrasing::Set),
            Capability::Config => ("configuration", DeviceCommand::Config, Phrasing::Change),
            Capability::Setting => ("setting", DeviceCommand::Setting, Phrasing::Change),
            Capability::Download => ("dump download", DeviceCommand::Download, Phrasing::Set),
            Capability::Upload => ("dump upload", DeviceCommand::Upload, Phrasing::Set),
            Capability::Log => ("log download", DeviceCommand::LogDownload, Phrasing::Set),
            Capability::LogMode => ("log mode", DeviceCommand::LogMode, Phrasing::Set),
            Capability::LButton => ("left button action", DeviceCommand::LButton, Phrasing::Set),
            Capability::RButton => ("right button action", DeviceCommand::RButton, Phrasing::Set),
            Capability::LButtonLong => (
                "long press left button action",
                DeviceCommand::LButtonLong,
                Phrasing::Set,
            ),
            Capability::RButtonLong => (
                "long press right button action",
                DeviceCommand::RButtonLong,
                Phrasing::Set,
            ),
            Capability::GreenLed => ("green LED function", DeviceCommand::LedGreen, Phrasing::Set),
            Capability::RedLed => ("red LED function", DeviceCommand::LedRed, Phrasing::Set),
            Capability::Field => ("reader field", DeviceCommand::Field, Phrasing::Set),
            Capability::ReadOnly => ("read-only mode", DeviceCommand::ReadOnly, Phrasing::Set),
            Capability::Threshold => ("threshold", DeviceCommand::Threshold, Phrasing::Set),
            Capability::Upgrade => ("upgrade", DeviceCommand::Upgrade, Phrasing::Set),
        };

        CapabilityDescriptor {
            label,
            command,
            phrasing,
        }
    }
}
