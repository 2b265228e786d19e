// Adapters layer: concrete clients for external systems. Storage sinks live under config/.

#[cfg(feature = "kafka")]
pub mod kafka;
