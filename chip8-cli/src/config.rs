//! Configuration file for the command line runner.
use std::{error::Error, fs::File, path::Path};

use chip8::{constants::KEY_COUNT, prelude::*};
use serde::{de::Error as _, Deserialize};

/// Runner settings, loaded from an optional YAML file.
///
/// ```yaml
/// vm:
///   cycles_per_tick: 20
///   tick_rate: 60
///   edge_policy: wrap
/// frames: 600
/// held_keys: [5]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Settings passed through to the virtual machine.
    pub vm: Chip8Conf,
    /// Stop after this many frames. Runs until an error when absent.
    pub frames: Option<usize>,
    /// Keys that are reported as held down for the whole run.
    pub held_keys: Vec<u8>,
}

impl CliConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let file = File::open(path)?;
        let config: Self = serde_yaml::from_reader(file)?;
        Ok(config.validate()?)
    }

    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<Self>(source)?.validate()
    }

    /// A runner that never executes instructions would spin forever.
    fn validate(self) -> Result<Self, serde_yaml::Error> {
        if self.vm.cycles_per_tick == 0 {
            return Err(serde_yaml::Error::custom(
                "vm.cycles_per_tick must be greater than zero",
            ));
        }
        Ok(self)
    }

    /// Key state with every held key pressed.
    pub fn key_state(&self) -> Result<[bool; KEY_COUNT as usize], InvalidKeyCode> {
        let mut keys = [false; KEY_COUNT as usize];

        for key_id in &self.held_keys {
            let keycode = KeyCode::try_from(*key_id)?;
            keys[keycode.as_u8() as usize] = true;
        }

        Ok(keys)
    }
}
