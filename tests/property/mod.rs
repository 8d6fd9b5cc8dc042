//! Property-based tests for the codec, scalar parsing and snapshot lists

mod codec_round_trip;
mod snapshot_isolation;
