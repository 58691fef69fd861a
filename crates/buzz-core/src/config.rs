//! Buzzer configuration

/// Known I2C addresses and registers for the Qwiic buzzer
pub mod addresses {
    /// Factory default address of the Qwiic buzzer
    pub const QWIIC_BUZZER_ADDR: u8 = 0x34;

    /// Register that takes a full note command (tone, volume, duration, play)
    pub const NOTE_COMMAND_REG: u8 = 0x03;
}

/// Per-instance buzzer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuzzerConfig {
    /// 7-bit I2C address of the device
    pub address: u8,
    /// Register the note command frame is written to
    pub register: u8,
    /// Share of each note's duration sent to the device, in percent.
    ///
    /// The device is told to stop slightly before the scheduler sends the
    /// next note so its own timer never overlaps the next bus write.
    pub dispatch_percent: u8,
}

impl Default for BuzzerConfig {
    fn default() -> Self {
        Self {
            address: addresses::QWIIC_BUZZER_ADDR,
            register: addresses::NOTE_COMMAND_REG,
            dispatch_percent: 99,
        }
    }
}

impl BuzzerConfig {
    /// Duration actually sent to the device for a note of `duration` ms
    pub fn dispatch_duration(&self, duration: u16) -> u16 {
        let percent = u32::from(self.dispatch_percent.min(100));
        // floor(duration * percent / 100) never exceeds duration, so it fits
        (u32::from(duration) * percent / 100) as u16
    }
}
