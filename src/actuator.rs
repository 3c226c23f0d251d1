// THEORY:
// The actuator is a binary output with no feedback: it can be switched on and
// off, and an I/O error is the only thing it ever reports back. Only the
// `FireSequencer` drives it; nothing else in the crate holds an actuator.

use crate::error::{Result, ServoError};
use log::{debug, info};
use std::fs;
use std::io;
use std::path::PathBuf;

/// GPIO pin the relay is wired to when a relay is requested without naming a pin.
pub const DEFAULT_RELAY_PIN: u32 = 18;

/// Reads a relay pin setting such as `SERVO_RELAY_GPIO`. Blank means [`DEFAULT_RELAY_PIN`].
pub fn parse_relay_pin(value: &str) -> Result<u32> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(DEFAULT_RELAY_PIN);
    }
    value
        .parse()
        .map_err(|_| ServoError::Config(format!("relay pin must be a GPIO number, got {value:?}")))
}

/// A binary output. Calls may block on I/O; the fire sequencer runs them on the
/// blocking pool, never on a runtime worker.
pub trait Actuator: Send + Sync + 'static {
    fn on(&self) -> io::Result<()>;
    fn off(&self) -> io::Result<()>;
}

/// An active-high relay on a sysfs-exported GPIO line.
#[derive(Debug)]
pub struct SysfsRelay {
    pin: u32,
    value_path: PathBuf,
}

impl SysfsRelay {
    /// Exports `pin` if needed, configures it as an output and drives it low.
    pub fn open(pin: u32) -> io::Result<Self> {
        Self::open_at(PathBuf::from("/sys/class/gpio"), pin)
    }

    fn open_at(root: PathBuf, pin: u32) -> io::Result<Self> {
        let line = root.join(format!("gpio{pin}"));
        if !line.exists() {
            fs::write(root.join("export"), pin.to_string())?;
        }
        // "low" sets the direction and the initial value in one write.
        fs::write(line.join("direction"), "low")?;
        info!("Relay ready on GPIO {pin}");
        Ok(Self {
            pin,
            value_path: line.join("value"),
        })
    }

    pub fn pin(&self) -> u32 {
        self.pin
    }
}

impl Actuator for SysfsRelay {
    fn on(&self) -> io::Result<()> {
        fs::write(&self.value_path, "1")
    }

    fn off(&self) -> io::Result<()> {
        fs::write(&self.value_path, "0")
    }
}

/// Stand-in used when no relay is wired up; every transition is only logged.
#[derive(Debug, Default)]
pub struct LoggingRelay;

impl Actuator for LoggingRelay {
    fn on(&self) -> io::Result<()> {
        debug!("relay on");
        Ok(())
    }

    fn off(&self) -> io::Result<()> {
        debug!("relay off");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_gpio_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("servo_vision_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("gpio18")).unwrap();
        root
    }

    #[test]
    fn sysfs_relay_writes_direction_and_values() {
        let root = scratch_gpio_root("values");
        let relay = SysfsRelay::open_at(root.clone(), 18).unwrap();
        assert_eq!(fs::read_to_string(root.join("gpio18/direction")).unwrap(), "low");

        relay.on().unwrap();
        assert_eq!(fs::read_to_string(root.join("gpio18/value")).unwrap(), "1");
        relay.off().unwrap();
        assert_eq!(fs::read_to_string(root.join("gpio18/value")).unwrap(), "0");

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn blank_pin_setting_selects_the_default_relay() {
        assert_eq!(parse_relay_pin("").unwrap(), DEFAULT_RELAY_PIN);
        assert_eq!(parse_relay_pin("  ").unwrap(), 18);
        assert_eq!(parse_relay_pin("23").unwrap(), 23);
        assert!(matches!(parse_relay_pin("gpio23"), Err(ServoError::Config(_))));
    }

    #[test]
    fn sysfs_relay_reports_missing_lines() {
        let root = std::env::temp_dir().join(format!("servo_vision_missing_{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        assert!(SysfsRelay::open_at(root, 18).is_err());
    }
}
