use std::env;
use std::process::Stdio;

use parley_speech::{ErrorKind, RecognitionEngine};
use tokio::process::Command;

use crate::Error;

/// A recognition engine that delegates capture to an external command.
///
/// The configured command line is run through the user's shell and is
/// expected to record one utterance and print its final transcript to
/// stdout, then exit. A non-zero exit status is reported as a capture
/// failure carrying the command's stderr output.
pub struct CommandRecognizer {
    cmdline: String,
}

impl CommandRecognizer {
    /// Creates an engine that captures with the given command line.
    #[inline]
    pub fn new<S: Into<String>>(cmdline: S) -> Self {
        Self {
            cmdline: cmdline.into(),
        }
    }
}

impl RecognitionEngine for CommandRecognizer {
    type Error = Error;

    fn capture(
        &self,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static
    {
        let cmdline = self.cmdline.clone();
        async move {
            debug!("running capture command: {cmdline}");
            let output = create_command_with_inferred_shell()
                .arg("-c")
                .arg(&cmdline)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|err| {
                    Error::new(
                        format!("failed to run capture command: {err}"),
                        ErrorKind::Other,
                    )
                })?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let reason = match stderr.trim() {
                    "" => format!(
                        "capture command exited with {}",
                        output.status
                    ),
                    detail => detail.to_owned(),
                };
                return Err(Error::new(reason, ErrorKind::Other));
            }

            let transcript = String::from_utf8_lossy(&output.stdout)
                .trim_end_matches(['\r', '\n'])
                .to_owned();
            Ok(transcript)
        }
    }
}

#[inline]
fn create_command_with_inferred_shell() -> Command {
    let Some(shell) = env::var_os("SHELL") else {
        return Command::new("/bin/sh");
    };
    Command::new(shell)
}
