//! Watch mode: every input line is a JSON edit of the form, using the same
//! keys as the HTTP API. Edits accumulate into one running form and the
//! simulation re-runs once input has been quiet for the settle window, so a
//! burst of edits yields a single output line.

use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::Instant;

use crate::core::{Field, Recommendation, SimulationParameters, UnresolvedBracket, simulate};
use crate::form::{RawParameters, assemble};
use crate::schedule::SettleGate;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WatchUpdate {
    parameters: SimulationParameters,
    validation: BTreeMap<Field, String>,
    final_total: f64,
    total_contributed: f64,
    total_gain: f64,
    recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    bracket_notice: Option<UnresolvedBracket>,
}

impl WatchUpdate {
    fn compute(raw: &RawParameters) -> Self {
        let assembled = assemble(raw);
        let result = simulate(&assembled.parameters);
        Self {
            parameters: assembled.parameters,
            validation: assembled.messages,
            final_total: result.final_total,
            total_contributed: result.total_contributed,
            total_gain: result.total_gain,
            recommendation: result.recommendation,
            bracket_notice: result.bracket_notice,
        }
    }
}

/// Reads edits from `input` until EOF and writes one JSON line per settled
/// simulation to `output`. Returns the number of lines written.
pub async fn run_watch<R, W>(input: R, mut output: W, settle: Duration) -> anyhow::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut gate = SettleGate::new(settle);
    let mut form = RawParameters::default();
    let mut input_open = true;
    let mut written = 0;

    loop {
        let now = Instant::now().into_std();
        if let Some((ticket, raw)) = gate.poll(now) {
            serde_json::to_writer(&mut output, &WatchUpdate::compute(&raw))?;
            writeln!(output)?;
            output.flush()?;
            written += 1;
            tracing::debug!(?ticket, "settled simulation written");
            continue;
        }

        match (input_open, gate.remaining(now)) {
            (false, None) => break,
            (false, Some(wait)) => tokio::time::sleep(wait).await,
            (true, None) => match lines.next_line().await? {
                Some(line) => apply_edit(&line, &mut form, &mut gate),
                None => input_open = false,
            },
            (true, Some(wait)) => {
                tokio::select! {
                    line = lines.next_line() => match line? {
                        Some(line) => apply_edit(&line, &mut form, &mut gate),
                        None => input_open = false,
                    },
                    () = tokio::time::sleep(wait) => {}
                }
            }
        }
    }

    Ok(written)
}

fn apply_edit(line: &str, form: &mut RawParameters, gate: &mut SettleGate<RawParameters>) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match serde_json::from_str::<RawParameters>(line) {
        Ok(edit) => {
            form.merge(edit);
            gate.schedule(Instant::now().into_std(), form.clone());
        }
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable edit"),
    }
}
