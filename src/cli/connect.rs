use anyhow::Result;
use genesis_gate::caps::{FeatureFlags, build_connect_options};

use super::args::ConnectArgs;
use super::{AppContext, print_json};

pub(super) fn handle(context: &AppContext, args: &ConnectArgs) -> Result<()> {
    let flags = FeatureFlags {
        camera_enabled: args.camera,
        location_mode: args.location,
        voice_wake_mode: args.voice_wake,
        microphone_permission_granted: args.mic_granted,
        sms_available: args.sms,
        debug_build: args.debug_build,
    };
    let identity = context.client_identity()?;
    let options = build_connect_options(args.role, &flags, &identity);
    print_json(&options)
}
