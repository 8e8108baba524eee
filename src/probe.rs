//! Hardware-acceleration capability probing.
//!
//! The probe is advisory. It answers "is it worth asking the tool for this
//! device?" and may say no when the device would have worked. A false
//! positive is harmless because [`AudioTranscoder`](crate::AudioTranscoder)
//! falls back to the CPU at run time.

use std::ffi::OsString;

use crate::{
    error::MkvAudioError,
    hardware_acceleration::{HardwareDevice, parse_hardware_listing},
    tool::ToolRunner,
};

/// List the hardware backends the tool advertises via `-hwaccels`.
///
/// # Errors
///
/// Propagates runner errors, and returns [`MkvAudioError::ToolInvocation`]
/// if the listing command exits unsuccessfully.
pub fn available_hardware_devices(
    runner: &dyn ToolRunner,
) -> Result<Vec<HardwareDevice>, MkvAudioError> {
    let output = runner.run(&arguments(&["-hide_banner", "-hwaccels"]))?;
    if !output.success() {
        return Err(MkvAudioError::ToolInvocation {
            program: runner.program().to_path_buf(),
            reason: format!("-hwaccels exited with {:?}", output.exit_code),
        });
    }
    Ok(parse_hardware_listing(&output.stdout))
}

/// Decide whether `device` looks usable.
///
/// The device must be advertised by `-hwaccels`, and a deliberately
/// failing invocation against a nonexistent input must mention the device
/// in its diagnostics. Every error along the way yields `false`.
pub fn probe_acceleration(runner: &dyn ToolRunner, device: HardwareDevice) -> bool {
    match available_hardware_devices(runner) {
        Ok(devices) if devices.contains(&device) => {}
        Ok(devices) => {
            log::info!("{device} not advertised by the tool (found {devices:?})");
            return false;
        }
        Err(error) => {
            log::warn!("Hardware listing failed: {error}");
            return false;
        }
    }

    // The input "none" does not exist, so this always fails; the banner and
    // device initialisation messages are what get inspected.
    let mut probe = Vec::with_capacity(10);
    probe.extend(device.input_arguments()[..4].iter().map(OsString::from));
    probe.extend(arguments(&["-i", "none", "-f", "null", "-"]));

    match runner.run(&probe) {
        Ok(output) => {
            let confirmed = output
                .stderr
                .to_ascii_lowercase()
                .contains(device.tool_name());
            log::debug!("Probe for {device} confirmed: {confirmed}");
            confirmed
        }
        Err(error) => {
            log::warn!("Hardware probe invocation failed: {error}");
            false
        }
    }
}

fn arguments(values: &[&str]) -> Vec<OsString> {
    values.iter().map(OsString::from).collect()
}
