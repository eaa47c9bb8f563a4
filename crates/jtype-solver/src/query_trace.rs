//! Start/end records for the engine's public queries.
//!
//! Records go to target `jtype::query_json` and pair up by `query_id`:
//!
//! ```bash
//! JTYPE_LOG=jtype::query_json=trace JTYPE_LOG_FORMAT=json jtype run universe.json
//! ```
//!
//! `JTYPE_QUERY_RUN_ID` tags every record of one process, so traces of
//! several runs can be concatenated and still told apart.

use crate::TypeId;
use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Level, trace};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);
static RUN_ID: OnceLock<String> = OnceLock::new();

#[inline]
pub(crate) fn enabled() -> bool {
    tracing::enabled!(target: "jtype::query_json", Level::TRACE)
}

fn run_id() -> &'static str {
    RUN_ID.get_or_init(|| std::env::var("JTYPE_QUERY_RUN_ID").unwrap_or_else(|_| "default".into()))
}

/// Emit the start record of `op` over `operands` and return its query id.
pub(crate) fn start(op: &'static str, operands: &[TypeId]) -> u64 {
    let query_id = NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed);
    let operands: Vec<u32> = operands.iter().map(|ty| ty.0).collect();
    trace!(
        target: "jtype::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op,
        operands = ?operands
    );
    query_id
}

/// Emit the end record of a query started with [`start`].
pub(crate) fn finish(query_id: u64, op: &'static str, result: impl fmt::Debug) {
    trace!(
        target: "jtype::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op,
        result = ?result
    );
}
