use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use glyph_render::{GlyphConfig, ImageResampler, Ramp, DEFAULT_CELL_ASPECT};
use image::imageops::FilterType;
use serde::Deserialize;

#[derive(Args, Debug, Clone, Default)]
pub struct RenderSettings {
    /// TOML file with default render settings; flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Ramp preset used to map brightness to glyphs
    #[arg(long, value_enum)]
    pub ramp: Option<RampPreset>,
    /// Custom ramp characters, first maps to brightness 0
    #[arg(long, conflicts_with = "ramp")]
    pub custom_ramp: Option<String>,
    /// Contrast gain around mid gray (1.0 = unchanged)
    #[arg(long)]
    pub contrast: Option<f64>,
    /// Invert glyph selection (colors are never inverted)
    #[arg(long)]
    pub invert: bool,
    /// Keep source colors (ANSI escapes in text output)
    #[arg(long)]
    pub color: bool,
    /// Glyph cell width / height ratio
    #[arg(long)]
    pub cell_aspect: Option<f64>,
    /// Resampling filter used to shrink the image
    #[arg(long, value_enum)]
    pub filter: Option<FilterChoice>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RampPreset {
    Standard,
    Detailed,
    Blocks,
    Simple,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterChoice {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

/// Settings file contents; every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub width: Option<u32>,
    pub ramp: Option<RampPreset>,
    pub custom_ramp: Option<String>,
    pub contrast: Option<f64>,
    pub invert: Option<bool>,
    pub color: Option<bool>,
    pub cell_aspect: Option<f64>,
    pub filter: Option<FilterChoice>,
}

impl FileSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("failed to parse config {:?}", path))
    }
}

impl RenderSettings {
    /// Merges flags over the optional config file over built-in defaults.
    pub fn resolve(
        &self,
        width: Option<u32>,
        default_width: u32,
    ) -> Result<(GlyphConfig, ImageResampler)> {
        let file = match &self.config {
            Some(path) => FileSettings::load(path)?,
            None => FileSettings::default(),
        };
        self.merge(file, width, default_width)
    }

    fn merge(
        &self,
        file: FileSettings,
        width: Option<u32>,
        default_width: u32,
    ) -> Result<(GlyphConfig, ImageResampler)> {
        let ramp = match (&self.custom_ramp, self.ramp) {
            (Some(chars), _) => Ramp::new(chars).context("invalid --custom-ramp")?,
            (None, Some(preset)) => preset.to_ramp(),
            (None, None) => match (&file.custom_ramp, file.ramp) {
                (Some(chars), _) => Ramp::new(chars).context("invalid custom_ramp in config")?,
                (None, preset) => preset.unwrap_or(RampPreset::Standard).to_ramp(),
            },
        };

        let config = GlyphConfig {
            target_width: width.or(file.width).unwrap_or(default_width),
            ramp,
            contrast: self.contrast.or(file.contrast).unwrap_or(1.0),
            invert: self.invert || file.invert.unwrap_or(false),
            color: self.color || file.color.unwrap_or(false),
            cell_aspect: self.cell_aspect.or(file.cell_aspect).unwrap_or(DEFAULT_CELL_ASPECT),
        };
        config.validate().context("invalid render settings")?;

        let filter = self.filter.or(file.filter).unwrap_or(FilterChoice::Triangle);
        Ok((config, ImageResampler::new(filter.to_filter())))
    }
}

impl RampPreset {
    pub fn to_ramp(self) -> Ramp {
        match self {
            RampPreset::Standard => Ramp::standard(),
            RampPreset::Detailed => Ramp::detailed(),
            RampPreset::Blocks => Ramp::blocks(),
            RampPreset::Simple => Ramp::simple(),
        }
    }
}

impl FilterChoice {
    pub fn to_filter(self) -> FilterType {
        match self {
            FilterChoice::Nearest => FilterType::Nearest,
            FilterChoice::Triangle => FilterType::Triangle,
            FilterChoice::CatmullRom => FilterType::CatmullRom,
            FilterChoice::Gaussian => FilterType::Gaussian,
            FilterChoice::Lanczos3 => FilterType::Lanczos3,
        }
    }
}
