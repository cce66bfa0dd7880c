//! Human-readable error descriptions and structured JSON error formatting.

use hand_core::error::{BuildError, HandError, ProtocolError};
use hand_hardware::LinkError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(he) = err.downcast_ref::<HandError>() {
        return match he {
            HandError::PlaybackActive => {
                "What happened: The program was edited while it was playing.\nLikely causes: An edit was issued without stopping playback first.\nHow to fix: Stop playback, then apply the edit.".to_string()
            }
            HandError::EmptyProgram => {
                "What happened: The program has no commands.\nLikely causes: The program file has no [[commands]] entries.\nHow to fix: Add at least one move or wait command to the file.".to_string()
            }
            HandError::UnknownCommand(id) => format!(
                "What happened: Command {id} does not exist in the program.\nLikely causes: It was already removed.\nHow to fix: Refresh the program listing and retry."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingTransport => {
                "What happened: No transport was provided to the controller.\nLikely causes: The hand link failed to open.\nHow to fix: Check [link] in the config, or remove link.device to use the simulated hand.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(le) = err.downcast_ref::<LinkError>() {
        return match le {
            LinkError::Io(e) => format!(
                "What happened: The hand link could not be opened or written ({e}).\nLikely causes: Hand not paired, RFCOMM device not bound, or missing permissions.\nHow to fix: Bind the device (e.g. rfcomm bind), check link.device in the config and the device node's permissions."
            ),
            LinkError::Disconnected | LinkError::QueueFull => format!(
                "What happened: {le}.\nLikely causes: The hand went out of range or was switched off.\nHow to fix: Reconnect the hand and rerun."
            ),
        };
    }

    if let Some(pe) = err.downcast_ref::<ProtocolError>() {
        return format!(
            "What happened: Invalid wire frame ({pe}).\nLikely causes: Frame text does not follow P-T:n,I:n,M:n,R:n,P:n or S-<J>:n.\nHow to fix: Use `handctl encode` to produce a valid frame."
        );
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("calibration csv must have headers") {
        return "Invalid headers in calibration CSV. Expected 'finger,open,closed'.".to_string();
    }

    if lower.contains("pose frames csv must have headers") {
        return "Invalid headers in pose frames CSV. Expected 'thumb,index,middle,ring,pinky'."
            .to_string();
    }

    if lower.contains("must be") || lower.contains("unreasonably large") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes for typed failures; everything else returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<LinkError>().is_some() {
        return 3;
    }
    if let Some(HandError::EmptyProgram) = err.downcast_ref::<HandError>() {
        return 4;
    }
    1
}

/// Name of the typed error at the top of the report, for JSON output.
fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(he) = err.downcast_ref::<HandError>() {
        return match he {
            HandError::PlaybackActive => "PlaybackActive",
            HandError::UnknownCommand(_) => "UnknownCommand",
            HandError::EmptyProgram => "EmptyProgram",
            HandError::Config(_) => "Config",
            HandError::Transport(_) => "Transport",
            HandError::State(_) => "State",
        };
    }
    if err.downcast_ref::<LinkError>().is_some() {
        return "Link";
    }
    if err.downcast_ref::<ProtocolError>().is_some() {
        return "Protocol";
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
