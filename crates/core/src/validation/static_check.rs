//! External static-check gate: optionally pipes the candidate source
//! through an external type/consistency checker with a bounded timeout.
//!
//! Tool unavailability and timeouts are recoverable (logged and skipped,
//! treated as "no findings"). Only specific critical signatures matched
//! from the tool's textual output hard-fail the candidate.

use std::process::Stdio;
use std::time::Duration;

use regex::Regex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{Gate, GateFailure};

/// Configuration for the external checker invocation
#[derive(Debug, Clone)]
pub struct StaticCheckConfig {
    /// Program to run; the candidate source is piped to its stdin
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl StaticCheckConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(20),
        }
    }
}

/// Error signatures that hard-fail regardless of the tool's exit status.
/// Everything else the tool prints is logged only.
pub fn critical_signatures() -> Vec<Regex> {
    [
        r"(?i)cannot read propert(?:y|ies) of (?:null|undefined)",
        r"(?i)\bnull (?:pointer )?dereference\b",
        r"(?i)is possibly '(?:null|undefined)'",
        r"\bTS2322\b|\bTS2345\b",
        r"(?i)type '[^']*' is not assignable to type",
    ]
    .into_iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
}

/// Match the tool's combined output against the critical signature table.
pub fn match_critical(output: &str) -> Option<String> {
    let signatures = critical_signatures();
    output.lines().find_map(|line| {
        signatures
            .iter()
            .any(|s| s.is_match(line))
            .then(|| line.trim().to_string())
    })
}

/// Gate entry point. Returns `Ok(())` for every recoverable condition:
/// missing tool, spawn failure, timeout, or non-critical findings.
pub async fn check(source: &str, config: &StaticCheckConfig) -> Result<(), GateFailure> {
    let mut child = match Command::new(&config.program)
        .args(&config.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(program = %config.program, "static checker unavailable, skipping: {}", e);
            return Ok(());
        }
    };

    // The stdin feed must sit inside the timeout too: a tool that never
    // reads its input would otherwise block us on a full pipe forever.
    let feed_and_wait = async move {
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes()).await?;
            drop(stdin);
        }
        child.wait_with_output().await
    };

    let output = match tokio::time::timeout(config.timeout, feed_and_wait).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::warn!("static checker failed to run, skipping: {}", e);
            return Ok(());
        }
        Err(_) => {
            tracing::warn!(
                program = %config.program,
                timeout_ms = config.timeout.as_millis() as u64,
                "static checker timed out, treating as no findings"
            );
            return Ok(());
        }
    };

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if let Some(line) = match_critical(&combined) {
        return Err(GateFailure {
            gate: Gate::StaticCheck,
            reason: format!("critical finding: {}", line),
        });
    }

    if !output.status.success() {
        tracing::debug!(
            status = %output.status,
            "static checker reported non-critical findings"
        );
    }

    Ok(())
}
