//! Boundary to the external text-to-speech / voice-conversion / lip-sync service.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::foundation::error::{TalkheadError, TalkheadResult};

/// One generation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Text to speak.
    pub text: String,
    /// Face image or video the lip-sync service animates.
    pub face_path: PathBuf,
    /// Voice pitch shift in semitones.
    pub pitch_shift: i32,
}

/// Produces a video file (one video + one audio stream) from text.
pub trait Generator: Send + Sync {
    /// Generate a clip; fails with [`TalkheadError::Generation`].
    fn generate(&self, request: &GenerationRequest) -> TalkheadResult<PathBuf>;
}

/// Values substituted into the command template besides the per-request ones.
#[derive(Clone, Debug, Default)]
pub struct GeneratorContext {
    /// API key for the lip-sync service.
    pub api_key: String,
    /// Path to the voice-conversion library checkout.
    pub rvc_path: PathBuf,
    /// Path to the voice model.
    pub model_path: PathBuf,
    /// Whether the service should crop to the lips.
    pub lip_crop: bool,
}

/// Runs an external program per request.
///
/// Each argument may contain `{text}`, `{face}`, `{pitch}`, `{api_key}`, `{rvc_path}`,
/// `{model_path}` and `{lip_crop}`. The last non-empty line the program prints on stdout is the
/// generated video path.
#[derive(Clone, Debug)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    context: GeneratorContext,
}

impl CommandGenerator {
    /// Create a generator for `program args...`.
    pub fn new(program: impl Into<String>, args: Vec<String>, context: GeneratorContext) -> Self {
        Self {
            program: program.into(),
            args,
            context,
        }
    }

    /// Substitute placeholders in the template arguments only; substituted values are never
    /// scanned again, so request text is passed through verbatim.
    pub(crate) fn expand_args(&self, request: &GenerationRequest) -> Vec<String> {
        let pitch = request.pitch_shift.to_string();
        let face = request.face_path.display().to_string();
        let rvc = self.context.rvc_path.display().to_string();
        let model = self.context.model_path.display().to_string();
        let lip_crop = self.context.lip_crop.to_string();
        let values: [(&str, &str); 7] = [
            ("text", request.text.as_str()),
            ("face", face.as_str()),
            ("pitch", pitch.as_str()),
            ("api_key", self.context.api_key.as_str()),
            ("rvc_path", rvc.as_str()),
            ("model_path", model.as_str()),
            ("lip_crop", lip_crop.as_str()),
        ];
        self.args
            .iter()
            .map(|arg| expand_template(arg, &values))
            .collect()
    }
}

/// Single left-to-right pass over `template`; unknown `{names}` are kept as written.
fn expand_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        if let Some(close) = after.find('}')
            && let Some((_, value)) = values.iter().find(|(name, _)| *name == &after[..close])
        {
            out.push_str(value);
            rest = &after[close + 1..];
            continue;
        }
        out.push('{');
        rest = after;
    }
    out.push_str(rest);
    out
}

impl Generator for CommandGenerator {
    #[tracing::instrument(skip_all, fields(program = %self.program, chars = request.text.len()))]
    fn generate(&self, request: &GenerationRequest) -> TalkheadResult<PathBuf> {
        let out = Command::new(&self.program)
            .args(self.expand_args(request))
            .output()
            .map_err(|e| {
                TalkheadError::generation(format!("failed to run '{}': {e}", self.program))
            })?;

        if !out.status.success() {
            return Err(TalkheadError::generation(format!(
                "'{}' exited with status {}: {}",
                self.program,
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&out.stdout);
        let path = parse_output_path(&stdout).ok_or_else(|| {
            TalkheadError::generation(format!("'{}' printed no output path", self.program))
        })?;
        if !path.is_file() {
            return Err(TalkheadError::generation(format!(
                "generated video '{}' does not exist",
                path.display()
            )));
        }
        tracing::info!(path = %path.display(), "generated clip");
        Ok(path)
    }
}

fn parse_output_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .map(|l| Path::new(l).to_path_buf())
}

#[cfg(test)]
#[path = "../tests/unit/generate.rs"]
mod tests;
