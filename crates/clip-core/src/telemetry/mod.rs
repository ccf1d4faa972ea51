// ── Live telemetry ──
//
// Bounded log buffer, the ingest task that fills it, and consumer-side
// filters.

mod buffer;
mod filter;
mod ingestor;

pub use buffer::{DEFAULT_LOG_CAPACITY, LogBuffer};
pub use filter::LogFilter;
pub use ingestor::{
    BACKFILL_FAILED, BackfillStatus, IngestState, LogChange, LogUpdate, STREAM_DISCONNECTED,
    StreamPhase, TelemetryIngestor, TelemetrySnapshot,
};
