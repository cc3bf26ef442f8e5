//! eSpeak-backed speech synthesis
//!
//! Synthesis shells out to the `espeak` (or `espeak-ng`) binary and captures
//! the WAV stream it writes to stdout. Calls block and are expected to run on
//! the blocking thread pool.

use std::io::Write;
use std::process::{Command, Stdio};

use regex::Regex;

use super::error::SpeechError;
use super::types::{SynthesisParams, VoiceInfo};

/// Produces WAV audio from text.
pub trait SynthesisEngine: Send + Sync {
    fn name(&self) -> &str;

    fn synthesize(&self, text: &str, params: &SynthesisParams) -> Result<Vec<u8>, SpeechError>;

    fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError>;
}

pub struct EspeakEngine {
    binary: String,
}

impl EspeakEngine {
    /// Probes for an espeak binary on the PATH.
    pub fn detect() -> Result<Self, SpeechError> {
        for candidate in ["espeak", "espeak-ng"] {
            let probe = Command::new(candidate)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            if matches!(probe, Ok(status) if status.success()) {
                tracing::debug!(binary = candidate, "speech engine detected");
                return Ok(Self {
                    binary: candidate.to_string(),
                });
            }
        }
        Err(SpeechError::EngineNotFound)
    }

    fn build_args(params: &SynthesisParams) -> Vec<String> {
        let mut args = vec!["--stdout".to_string(), "-s".to_string(), params.rate.to_string()];
        if let Some(voice) = &params.voice {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        args
    }

    /// Parses `--voices` table rows. Header and malformed lines are skipped.
    fn parse_voice_list(output: &str) -> Vec<VoiceInfo> {
        let row = Regex::new(r"^\s*\d+\s+([\w-]+)\s+\S+\s+(\S+)\s+(\S+)").unwrap();
        output
            .lines()
            .filter_map(|line| {
                let captures = row.captures(line)?;
                Some(VoiceInfo {
                    id: captures[3].to_string(),
                    name: captures[2].to_string(),
                    language: captures[1].to_string(),
                })
            })
            .collect()
    }
}

/// Stand-in used when no engine binary was found at startup. The server
/// still comes up; every synthesis attempt reports the missing engine.
pub struct UnavailableEngine;

impl SynthesisEngine for UnavailableEngine {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn synthesize(&self, _text: &str, _params: &SynthesisParams) -> Result<Vec<u8>, SpeechError> {
        Err(SpeechError::EngineNotFound)
    }

    fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
        Err(SpeechError::EngineNotFound)
    }
}

impl SynthesisEngine for EspeakEngine {
    fn name(&self) -> &str {
        &self.binary
    }

    fn synthesize(&self, text: &str, params: &SynthesisParams) -> Result<Vec<u8>, SpeechError> {
        // Text goes over stdin so long documents do not hit argv limits.
        let mut command = Command::new(&self.binary);
        command.args(Self::build_args(params));
        let output = run_capture(command, text)?;

        if !output.status.success() {
            return Err(SpeechError::Synthesis(format!(
                "{} exited with {}",
                self.binary, output.status
            )));
        }
        if output.stdout.is_empty() {
            return Err(SpeechError::Synthesis(format!(
                "{} produced no audio",
                self.binary
            )));
        }
        Ok(output.stdout)
    }

    fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
        let output = Command::new(&self.binary)
            .arg("--voices")
            .output()
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;
        if !output.status.success() {
            return Err(SpeechError::Synthesis(format!(
                "{} --voices exited with {}",
                self.binary, output.status
            )));
        }
        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(Self::parse_voice_list(&listing))
    }
}

/// Runs a child, feeding `input` over stdin while stdout is drained.
///
/// The write happens on its own thread: engines stream audio while still
/// consuming text, and feeding the whole input before reading would wedge
/// both processes once the pipes fill. The child is reaped on every path;
/// a write error (child exited early) is left for the exit status check.
fn run_capture(mut command: Command, input: &str) -> Result<std::process::Output, SpeechError> {
    let program = command.get_program().to_string_lossy().into_owned();
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| SpeechError::Synthesis(format!("failed to spawn {program}: {e}")))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| SpeechError::Synthesis(format!("{program} stdin not captured")))?;
    let bytes = input.as_bytes().to_vec();
    let writer = std::thread::spawn(move || {
        let _ = stdin.write_all(&bytes);
    });

    let output = child
        .wait_with_output()
        .map_err(|e| SpeechError::Synthesis(e.to_string()))?;
    let _ = writer.join();
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_carry_rate_and_stdout() {
        let params = SynthesisParams {
            voice: None,
            rate: 150,
        };
        let args = EspeakEngine::build_args(&params);
        assert_eq!(args, ["--stdout", "-s", "150"]);
    }

    #[test]
    fn args_include_voice_when_set() {
        let params = SynthesisParams {
            voice: Some("en-us".to_string()),
            rate: 180,
        };
        let args = EspeakEngine::build_args(&params);
        assert_eq!(args, ["--stdout", "-s", "180", "-v", "en-us"]);
    }

    #[test]
    fn voice_table_rows_are_parsed() {
        let listing = "\
Pty Language Age/Gender VoiceName          File          Other Languages
 5  af             M  afrikaans            other/af
 5  en             M  default              default
 2  en-gb          M  english              en
";
        let voices = EspeakEngine::parse_voice_list(listing);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[0].language, "af");
        assert_eq!(voices[0].name, "afrikaans");
        assert_eq!(voices[0].id, "other/af");
        assert_eq!(voices[2].language, "en-gb");
    }

    #[test]
    fn header_only_listing_yields_no_voices() {
        let listing = "Pty Language Age/Gender VoiceName File Other Languages\n";
        assert!(EspeakEngine::parse_voice_list(listing).is_empty());
    }

    // `cat` streams its input back while still reading it, the same pipe
    // behaviour as an engine writing WAV mid-synthesis. Input well beyond
    // pipe capacity completes only if stdin is fed concurrently.
    #[test]
    #[cfg(unix)]
    fn large_input_is_pumped_without_deadlock() {
        let input = "lorem ipsum dolor sit amet ".repeat(40_000);
        let output = run_capture(Command::new("cat"), &input).unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, input.as_bytes());
    }

    #[test]
    #[cfg(unix)]
    fn child_exiting_without_reading_is_still_reaped() {
        // `true` exits immediately; the unread input must not hang the call
        // and the exit status must come back.
        let input = "x".repeat(1 << 20);
        let output = run_capture(Command::new("true"), &input).unwrap();
        assert!(output.status.success());
        assert!(output.stdout.is_empty());
    }
}
