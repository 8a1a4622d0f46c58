use std::env::var_os;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use dotenv::var;
use eyre::{bail, eyre, WrapErr};
use lcdpi_gpio::lcd::hd44780::{CharSize, DisplayGeometry, PinAssignment};
use log::debug;
use serde::{Deserialize, Serialize};

/// Where the GPIO lines come from.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// `/dev/mem`, needs root.
    Raw,
    /// `/dev/gpiomem`.
    Gpiomem,
    /// The GPIO character device.
    Gpiod,
    /// No hardware, transfers are only logged.
    DryRun,
}

impl FromStr for Backend {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" | "mem" => Ok(Backend::Raw),
            "gpiomem" => Ok(Backend::Gpiomem),
            "gpiod" => Ok(Backend::Gpiod),
            "dry-run" | "dry" => Ok(Backend::DryRun),
            other => Err(eyre!("Unknown backend: {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Geometry {
    #[serde(rename = "16x2")]
    W16xH02,
    #[serde(rename = "20x4")]
    W20xH04,
}

impl From<Geometry> for DisplayGeometry {
    fn from(geometry: Geometry) -> Self {
        match geometry {
            Geometry::W16xH02 => DisplayGeometry::W16xH02,
            Geometry::W20xH04 => DisplayGeometry::W20xH04,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct Pins {
    pub rs: usize,
    pub e: usize,
    /// D4..D7 for a 4-bit bus, D0..D7 for an 8-bit one.
    pub data: Vec<usize>,
}

impl Pins {
    pub fn assignment(&self) -> eyre::Result<PinAssignment> {
        match self.data.len() {
            4 => Ok(PinAssignment::four_bit(self.rs, self.e, [
                self.data[0], self.data[1], self.data[2], self.data[3],
            ])),
            8 => {
                let mut data = [0; 8];
                data.copy_from_slice(&self.data);
                Ok(PinAssignment::eight_bit(self.rs, self.e, data))
            }
            n => bail!("Invalid number of data pins: {}, expected 4 or 8", n),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub backend: Backend,
    /// Only used by the `gpiod` backend.
    pub chip: String,
    pub geometry: Geometry,
    pub tall_font: bool,
    pub pins: Pins,
}

impl Config {
    fn path() -> PathBuf {
        let config_str = var_os("LCDPI_CONFIG_FILE");
        let config_str: &OsStr = config_str.as_deref().unwrap_or(OsStr::new("lcdpi.json"));
        Path::new(config_str).to_path_buf()
    }

    /// Loads the config file named by `LCDPI_CONFIG_FILE`.
    ///
    /// Returns `Ok(None)` only when the file does not exist. A file that cannot be read or parsed is
    /// an error, so a broken pin mapping is never replaced by the defaults.
    pub fn try_load() -> eyre::Result<Option<Self>> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(config_path: &Path) -> eyre::Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(config_path)
            .wrap_err_with(|| format!("Cannot open {}", config_path.display()))?;
        let reader = std::io::BufReader::new(file);
        let config = serde_json::from_reader(reader)
            .wrap_err_with(|| format!("Invalid config file {}", config_path.display()))?;
        Ok(Some(config))
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, config_path: &Path) -> std::io::Result<()> {
        let file = std::fs::File::create(config_path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Applies the `LCDPI_BACKEND`, `LCDPI_PIN_RS`, `LCDPI_PIN_E` and `LCDPI_PINS_DATA` overrides.
    pub fn apply_env(&mut self) -> eyre::Result<()> {
        if let Ok(backend) = var("LCDPI_BACKEND") {
            self.backend = backend.parse()?;
            debug!("Backend overridden: {:?}", self.backend);
        }
        if let Ok(rs) = var("LCDPI_PIN_RS") {
            self.pins.rs = rs.trim().parse()?;
        }
        if let Ok(e) = var("LCDPI_PIN_E") {
            self.pins.e = e.trim().parse()?;
        }
        if let Ok(data) = var("LCDPI_PINS_DATA") {
            self.pins.data = parse_pin_bus(&data)?;
        }
        Ok(())
    }

    pub fn char_size(&self) -> CharSize {
        if self.tall_font {
            CharSize::Dots5x10
        } else {
            CharSize::Dots5x8
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::Gpiomem,
            chip: "/dev/gpiochip0".to_string(),
            geometry: Geometry::W20xH04,
            tall_font: false,
            pins: Pins {
                rs: 17,
                e: 16,
                data: vec![21, 20, 19, 18],
            },
        }
    }
}

pub fn parse_pin_bus(pin_str: &str) -> eyre::Result<Vec<usize>> {
    let pins = pin_str
        .split([',', ' ', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse())
        .collect::<Result<Vec<_>, _>>()?;
    match pins.len() {
        4 | 8 => Ok(pins),
        n => bail!("Invalid number of data pins: {}", n),
    }
}
