//! Oracle that delegates each query to an external program
//!
//! The program receives the request as one JSON object on stdin and must
//! print `{"text": "...", "input_tokens": n, "output_tokens": n}` on stdout.
//! Any language-model client can be wrapped this way.

use super::{Oracle, OracleError, OracleReply, OracleRequest, OracleResult, TokenUsage};
use serde::Deserialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

#[derive(Debug, Deserialize)]
struct CommandResponse {
    text: String,
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Runs `program args...` once per query
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandOracle {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Oracle for CommandOracle {
    fn name(&self) -> &str {
        "command"
    }

    fn ask(&mut self, request: &OracleRequest) -> OracleResult<OracleReply> {
        let payload = serde_json::to_vec(request)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let written = match child.stdin.take() {
            Some(mut stdin) => stdin
                .write_all(&payload)
                .and_then(|()| stdin.write_all(b"\n")),
            None => Ok(()),
        };

        // Reap the child even if it stopped reading before the request was sent
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(OracleError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        written?;

        let response: CommandResponse = serde_json::from_slice(&output.stdout)?;
        Ok(OracleReply {
            text: response.text,
            usage: TokenUsage::new(response.input_tokens, response.output_tokens),
        })
    }
}
