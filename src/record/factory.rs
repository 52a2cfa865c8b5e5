//! Record writer factory with automatic feature-based registration.

use crate::error::{PrepError, PrepResult};
use crate::record::writer::{BinRecordWriter, RecordWriter};
use std::collections::HashMap;

#[cfg(feature = "storage_arrow")]
use crate::record::arrow_writer::ArrowRecordWriter;

type WriterFactory = Box<dyn Fn() -> Box<dyn RecordWriter> + Send + Sync>;

/// Registry for record writer factories with automatic feature detection.
///
/// The registry registers available record backends based on enabled Cargo
/// features, so new formats can be added without modifying the selection
/// logic.
///
/// # Examples
///
/// ```
/// use crf_prep::record::factory::RecordWriterRegistry;
///
/// let registry = RecordWriterRegistry::new();
/// for format in registry.list_formats() {
///     println!("Available format: {}", format);
/// }
/// let writer = registry.create("bin")?;
/// # Ok::<(), crf_prep::error::PrepError>(())
/// ```
pub struct RecordWriterRegistry {
    factories: HashMap<String, WriterFactory>,
}

impl Default for RecordWriterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordWriterRegistry {
    /// Creates a new registry and registers all available backends.
    ///
    /// - `bin` is always available.
    /// - `arrow` requires the `storage_arrow` feature.
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };

        registry.register("bin", || Box::new(BinRecordWriter::new()));

        #[cfg(feature = "storage_arrow")]
        registry.register("arrow", || Box::new(ArrowRecordWriter::new()));

        registry
    }

    /// Registers a custom record writer factory.
    pub fn register<F>(&mut self, format: &str, factory: F)
    where
        F: Fn() -> Box<dyn RecordWriter> + Send + Sync + 'static,
    {
        self.factories.insert(format.to_string(), Box::new(factory));
    }

    /// Creates a writer for `format`.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::FeatureNotEnabled`] for a known backend whose
    /// feature is off, and [`PrepError::Configuration`] for an unknown one.
    pub fn create(&self, format: &str) -> PrepResult<Box<dyn RecordWriter>> {
        if let Some(factory) = self.factories.get(format) {
            return Ok(factory());
        }
        match format {
            "arrow" => Err(PrepError::FeatureNotEnabled("storage_arrow".to_string())),
            other => Err(PrepError::Configuration(format!(
                "unknown record backend '{other}'. Available: {}",
                self.list_formats().join(", ")
            ))),
        }
    }

    /// Lists the formats compiled into this build, sorted.
    pub fn list_formats(&self) -> Vec<String> {
        let mut formats: Vec<String> = self.factories.keys().cloned().collect();
        formats.sort();
        formats
    }
}
