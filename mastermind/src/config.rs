use dotenv::var;
use log::{debug, info};
use mastermind_gpio::lcd::hd44780::driver::{LcdDataPins, LcdPins};
use mastermind_gpio::raw::RawGpioPort;
use mastermind_gpio::GpioResult;
use serde::{Deserialize, Serialize};
use std::env::var_os;
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: String, value: String },
    #[error("the button poll interval must be at least 1 ms")]
    ZeroPollInterval,
    #[error("cannot parse {path}: {message}")]
    Parse { path: String, message: String },
    #[error("cannot access {path}: {kind}")]
    Io { path: String, kind: ErrorKind },
}

impl ConfigError {
    fn io(path: &Path, err: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.display().to_string(),
            kind: err.kind(),
        }
    }
}

/// Wiring of the display.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(default)]
pub struct LcdConfig {
    pub rs_pin: usize,
    pub strobe_pin: usize,
    /// D4–D7, in this order. Eight pins select the 8-bit bus, which is rejected on startup.
    pub data_pins: Vec<usize>,
}

impl LcdConfig {
    pub fn pins(&self) -> GpioResult<LcdPins> {
        Ok(LcdPins {
            rs: self.rs_pin,
            strobe: self.strobe_pin,
            data: LcdDataPins::try_from(self.data_pins.as_slice())?,
        })
    }
}

impl Default for LcdConfig {
    fn default() -> Self {
        LcdConfig {
            rs_pin: 25,
            strobe_pin: 24,
            data_pins: vec![23, 10, 27, 22],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Device the GPIO registers are mapped from, `/dev/mem` or `/dev/gpiomem`.
    pub gpio_device: String,
    /// Physical address of the GPIO registers, used with `/dev/mem`.
    pub gpio_base: u64,
    pub lcd: LcdConfig,
    pub button_pin: usize,
    pub led_pin: usize,
    pub led_red_pin: usize,
    pub poll_interval_ms: u64,
}

impl Config {
    /// Gets the config file path, `CONFIG_FILE` or `config.json`.
    pub fn path() -> PathBuf {
        let config_str = var_os("CONFIG_FILE");
        let config_str: &OsStr = config_str.as_deref().unwrap_or(OsStr::new("config.json"));
        PathBuf::from(config_str)
    }

    /// Loads the config from `path`. Gives `None` only if the file does not exist; a file that
    /// cannot be read or parsed is an error.
    pub fn try_load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(path).map_err(|e| ConfigError::io(path, e))?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map(Some)
            .map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path).map_err(|e| ConfigError::io(path, e))?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer(writer, self).map_err(|e| ConfigError::io(path, e.into()))?;
        Ok(())
    }

    /// Loads the config from `path`, writing the defaults there first if there is no file yet.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        debug!("Trying to load config from {}...", path.display());
        if let Some(config) = Self::try_load(path)? {
            info!("Config loaded.");
            return Ok(config);
        }

        info!("Config not found. Using default");
        let config = Config::default();
        config.save(path)?;
        info!("Default config saved.");
        Ok(config)
    }

    /// Overrides the pins with `MASTERMIND_*` environment variables, if set.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        override_from_env("MASTERMIND_LCD_PIN_RS", &mut self.lcd.rs_pin)?;
        override_from_env("MASTERMIND_LCD_PIN_STROBE", &mut self.lcd.strobe_pin)?;
        if let Ok(value) = var("MASTERMIND_LCD_PINS_DATA") {
            self.lcd.data_pins = parse_pin_bus(&value).map_err(|_| ConfigError::InvalidValue {
                name: "MASTERMIND_LCD_PINS_DATA".to_string(),
                value,
            })?;
        }
        override_from_env("MASTERMIND_BUTTON_PIN", &mut self.button_pin)?;
        override_from_env("MASTERMIND_LED_PIN", &mut self.led_pin)?;
        override_from_env("MASTERMIND_LED_RED_PIN", &mut self.led_red_pin)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(Duration::from_millis(self.poll_interval_ms))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gpio_device: "/dev/mem".to_string(),
            gpio_base: RawGpioPort::GPIO_BASE_RPI2,
            lcd: LcdConfig::default(),
            button_pin: 19,
            led_pin: 5,
            led_red_pin: 13,
            poll_interval_ms: 200,
        }
    }
}

fn override_from_env<T: FromStr>(name: &str, target: &mut T) -> Result<(), ConfigError> {
    if let Ok(value) = var(name) {
        *target = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        })?;
    }
    Ok(())
}

/// Parses a list of pins separated by commas, spaces or semicolons.
pub fn parse_pin_bus(pin_str: &str) -> Result<Vec<usize>, std::num::ParseIntError> {
    pin_str
        .split([',', ' ', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse())
        .collect()
}
