//! Startup configuration, read once. Any failure here is fatal before a worker starts.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::core::CanvasSize;
use crate::foundation::error::{TalkheadError, TalkheadResult};
use crate::generate::GeneratorContext;
use crate::media::still::AssetKind;
use crate::pipeline::cache::CorrectionThreading;

/// Secrets file contents.
#[derive(Clone, Deserialize)]
pub struct Secrets {
    /// API key for the lip-sync service.
    pub lip_api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("lip_api_key", &"<redacted>")
            .finish()
    }
}

impl Secrets {
    /// Read and validate a secrets JSON file.
    pub fn load(path: &Path) -> TalkheadResult<Self> {
        let secrets: Self = read_json(path)?;
        if secrets.lip_api_key.trim().is_empty() {
            return Err(TalkheadError::config(format!(
                "'{}': lip_api_key is empty",
                path.display()
            )));
        }
        Ok(secrets)
    }
}

/// External generation command template.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratorCommand {
    /// Program to run.
    pub program: String,
    /// Arguments, with `{text}`-style placeholders.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Which output display to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayKind {
    /// Discard frames (headless).
    Null,
    /// Stream into an `ffplay` window.
    #[default]
    Ffplay,
}

/// Application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the secrets JSON file.
    #[serde(default = "default_secrets_path")]
    pub secrets_path: PathBuf,
    /// Generation service command.
    pub generator: GeneratorCommand,
    /// Voice-conversion library path passed to the generator.
    #[serde(default = "default_rvc_path")]
    pub rvc_path: PathBuf,
    /// Voice model path passed to the generator.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// Reference face (image, or video whose first frame is used).
    pub face_path: PathBuf,
    /// Idle background (image or looping video).
    pub idle_path: PathBuf,
    /// Idle asset kind; inferred from `idle_path` when absent.
    #[serde(default)]
    pub idle_kind: Option<AssetKind>,
    /// Voice pitch shift in semitones.
    #[serde(default = "default_pitch_shift")]
    pub pitch_shift: i32,
    /// Ask the lip-sync service to crop to the mouth region.
    #[serde(default = "default_lip_crop")]
    pub lip_crop: bool,
    /// Initial canvas size.
    #[serde(default)]
    pub canvas: CanvasSize,
    /// Canvas clear color (straight RGBA8).
    #[serde(default = "default_background")]
    pub background_rgba: [u8; 4],
    /// Correction pre-pass threading.
    #[serde(default)]
    pub correction: CorrectionThreading,
    /// Output display.
    #[serde(default)]
    pub display: DisplayKind,
}

fn default_secrets_path() -> PathBuf {
    PathBuf::from("secrets.json")
}

fn default_rvc_path() -> PathBuf {
    PathBuf::from("venv/src/rvclib")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/denvot.pth")
}

fn default_pitch_shift() -> i32 {
    6
}

fn default_lip_crop() -> bool {
    true
}

fn default_background() -> [u8; 4] {
    [0, 0, 0, 255]
}

impl AppConfig {
    /// Read a config file. Relative paths inside it resolve against the file's directory.
    pub fn load(path: &Path) -> TalkheadResult<Self> {
        let mut cfg: Self = read_json(path)?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        cfg.resolve_paths(root);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> TalkheadResult<()> {
        CanvasSize::new(self.canvas.width, self.canvas.height)
            .map_err(|e| TalkheadError::config(e.to_string()))?;
        if self.generator.program.trim().is_empty() {
            return Err(TalkheadError::config("generator.program is empty"));
        }
        if let Some(0) = self.correction.threads {
            return Err(TalkheadError::config("correction.threads must be >= 1"));
        }
        Ok(())
    }

    /// Idle asset kind, explicit or inferred.
    pub fn idle_kind(&self) -> AssetKind {
        self.idle_kind
            .unwrap_or_else(|| AssetKind::infer(&self.idle_path))
    }

    /// Reference face asset kind, inferred from its extension.
    pub fn face_kind(&self) -> AssetKind {
        AssetKind::infer(&self.face_path)
    }

    /// Generator substitutions for this config and `secrets`.
    pub fn generator_context(&self, secrets: &Secrets) -> GeneratorContext {
        GeneratorContext {
            api_key: secrets.lip_api_key.clone(),
            rvc_path: self.rvc_path.clone(),
            model_path: self.model_path.clone(),
            lip_crop: self.lip_crop,
        }
    }

    fn resolve_paths(&mut self, root: &Path) {
        for p in [
            &mut self.secrets_path,
            &mut self.rvc_path,
            &mut self.model_path,
            &mut self.face_path,
            &mut self.idle_path,
        ] {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> TalkheadResult<T> {
    let f = File::open(path)
        .with_context(|| format!("open '{}'", path.display()))
        .map_err(|e| TalkheadError::config(format!("{e:#}")))?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| TalkheadError::config(format!("parse '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
