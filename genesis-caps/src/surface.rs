//! Wire names for everything a client can advertise. These strings are part
//! of the gateway protocol and must stay stable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Commands a node can be asked to invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCommand {
    #[serde(rename = "canvas.present")]
    CanvasPresent,
    #[serde(rename = "canvas.hide")]
    CanvasHide,
    #[serde(rename = "canvas.navigate")]
    CanvasNavigate,
    #[serde(rename = "canvas.eval")]
    CanvasEval,
    #[serde(rename = "canvas.snapshot")]
    CanvasSnapshot,
    #[serde(rename = "canvas.a2ui.push")]
    CanvasA2uiPush,
    #[serde(rename = "canvas.a2ui.pushJSONL")]
    CanvasA2uiPushJsonl,
    #[serde(rename = "canvas.a2ui.reset")]
    CanvasA2uiReset,
    #[serde(rename = "screen.record")]
    ScreenRecord,
    #[serde(rename = "camera.snap")]
    CameraSnap,
    #[serde(rename = "camera.clip")]
    CameraClip,
    #[serde(rename = "location.get")]
    LocationGet,
    #[serde(rename = "sms.send")]
    SmsSend,
    #[serde(rename = "debug.logs")]
    DebugLogs,
    #[serde(rename = "debug.ed25519")]
    DebugEd25519,
    #[serde(rename = "app.update")]
    AppUpdate,
}

impl NodeCommand {
    /// Always advertised by a node, in this order.
    pub const BASELINE: [Self; 9] = [
        Self::CanvasPresent,
        Self::CanvasHide,
        Self::CanvasNavigate,
        Self::CanvasEval,
        Self::CanvasSnapshot,
        Self::CanvasA2uiPush,
        Self::CanvasA2uiPushJsonl,
        Self::CanvasA2uiReset,
        Self::ScreenRecord,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CanvasPresent => "canvas.present",
            Self::CanvasHide => "canvas.hide",
            Self::CanvasNavigate => "canvas.navigate",
            Self::CanvasEval => "canvas.eval",
            Self::CanvasSnapshot => "canvas.snapshot",
            Self::CanvasA2uiPush => "canvas.a2ui.push",
            Self::CanvasA2uiPushJsonl => "canvas.a2ui.pushJSONL",
            Self::CanvasA2uiReset => "canvas.a2ui.reset",
            Self::ScreenRecord => "screen.record",
            Self::CameraSnap => "camera.snap",
            Self::CameraClip => "camera.clip",
            Self::LocationGet => "location.get",
            Self::SmsSend => "sms.send",
            Self::DebugLogs => "debug.logs",
            Self::DebugEd25519 => "debug.ed25519",
            Self::AppUpdate => "app.update",
        }
    }
}

impl fmt::Display for NodeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device capability families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    Canvas,
    Screen,
    Camera,
    Sms,
    VoiceWake,
    Location,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Canvas => "canvas",
            Self::Screen => "screen",
            Self::Camera => "camera",
            Self::Sms => "sms",
            Self::VoiceWake => "voiceWake",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access scopes requested by operator clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorScope {
    #[serde(rename = "operator.read")]
    Read,
    #[serde(rename = "operator.write")]
    Write,
    #[serde(rename = "operator.talk.secrets")]
    TalkSecrets,
}

impl OperatorScope {
    pub const ALL: [Self; 3] = [Self::Read, Self::Write, Self::TalkSecrets];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "operator.read",
            Self::Write => "operator.write",
            Self::TalkSecrets => "operator.talk.secrets",
        }
    }
}

impl fmt::Display for OperatorScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_wire_strings() {
        for command in NodeCommand::BASELINE
            .into_iter()
            .chain([NodeCommand::SmsSend, NodeCommand::AppUpdate])
        {
            assert_eq!(
                serde_json::to_value(command).unwrap(),
                serde_json::Value::String(command.as_str().to_owned())
            );
        }
        assert_eq!(
            serde_json::to_value(Capability::VoiceWake).unwrap(),
            serde_json::json!("voiceWake")
        );
        assert_eq!(
            serde_json::to_value(OperatorScope::TalkSecrets).unwrap(),
            serde_json::json!("operator.talk.secrets")
        );
    }

    #[test]
    fn canvas_commands_use_stable_strings() {
        assert_eq!(NodeCommand::CanvasA2uiPushJsonl.as_str(), "canvas.a2ui.pushJSONL");
        assert_eq!(NodeCommand::ScreenRecord.as_str(), "screen.record");
        assert_eq!(Capability::Screen.as_str(), "screen");
    }
}
