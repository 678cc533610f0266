// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-flush record loop.
//!
//! The host decodes its buffer and hands records over one at a time. Records
//! that cannot become entries are logged and skipped; they never stop the
//! rest of the flush.

use tracing::{debug, warn};

use crate::entry::build_entry;
use crate::errors::DropReason;
use crate::gateway::Outcome;
use crate::registry::OutputInstance;
use crate::value::{RawRecord, RawValue};

/// Pull-style source of `(event timestamp, record)` pairs.
///
/// `None` marks the end of the stream.
pub trait RecordSource {
    fn next_record(&mut self) -> Option<(RawValue, RawRecord)>;
}

impl<I> RecordSource for I
where
    I: Iterator<Item = (RawValue, RawRecord)>,
{
    fn next_record(&mut self) -> Option<(RawValue, RawRecord)> {
        self.next()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub appended: usize,
    pub dropped: usize,
    pub outcome: Outcome,
}

/// Turns every record of `source`, flushed under `tag`, into an entry for
/// `output`, then flushes.
///
/// The returned outcome is the most severe of the threshold flushes and the
/// final flush.
pub async fn process_records<S>(source: &mut S, tag: &str, output: &OutputInstance) -> FlushSummary
where
    S: RecordSource + ?Sized,
{
    let id = output.handle.id();
    debug!("LOGS | Flushing for id: {id}, tag: {tag}");

    let mut summary = FlushSummary::default();
    while let Some((ts, record)) = source.next_record() {
        let entry = match build_entry(&ts, tag, record, &output.settings) {
            Ok(entry) => entry,
            Err(DropReason::MissingMessage) => {
                debug!("LOGS | No message or log field in the record, dropping it");
                summary.dropped += 1;
                continue;
            }
            Err(e) => {
                warn!("LOGS | Dropping record for {id}: {e}");
                summary.dropped += 1;
                continue;
            }
        };

        match output.handle.append(entry).await {
            Ok(outcome) => {
                summary.appended += 1;
                summary.outcome = summary.outcome.worst(outcome);
            }
            Err(e) => {
                warn!("LOGS | {e}");
                summary.outcome = Outcome::Fatal;
                return summary;
            }
        }
    }

    let outcome = match output.handle.flush().await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("LOGS | {e}");
            Outcome::Fatal
        }
    };
    summary.outcome = summary.outcome.worst(outcome);
    summary
}
