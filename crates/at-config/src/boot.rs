//! Boot-time configuration loading

use at_store::AutomationStore;
use tracing::{error, info, warn};

use crate::codec::{decode, encode, DecodeReport};
use crate::storage::{ConfigStorage, StorageResult};

/// Where the running configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootSource {
    /// A stored document was decoded over the defaults
    Stored(DecodeReport),
    /// Nothing usable was stored; the defaults are in effect
    Defaults,
}

/// Encode the store and write it out
pub async fn save(store: &AutomationStore, storage: &dyn ConfigStorage) -> StorageResult<()> {
    let bytes = encode(store)?;
    storage.write(&bytes).await
}

/// Populate `store` at boot
///
/// The store is first reset to defaults. A stored document is decoded over
/// them and volatile runtime state is cleared afterwards. With no stored
/// document, or one that cannot be read, the defaults are written back so the
/// next boot finds a complete document. Storage failures are logged and never
/// stop the boot.
pub async fn load_or_initialize(
    store: &mut AutomationStore,
    storage: &dyn ConfigStorage,
) -> BootSource {
    store.reset_to_defaults();

    match storage.read().await {
        Ok(Some(bytes)) => {
            let report = decode(store, &bytes);
            if !report.valid_json {
                warn!("Stored configuration is not valid JSON, running on defaults");
            }
            store.reset_volatile_state();
            info!(
                applied = report.applied.len(),
                dropped = report.dropped,
                "Loaded stored configuration"
            );
            return BootSource::Stored(report);
        }
        Ok(None) => info!("No stored configuration, writing defaults"),
        Err(err) => error!(%err, "Failed to read stored configuration, writing defaults"),
    }

    if let Err(err) = save(store, storage).await {
        error!(%err, "Failed to save default configuration");
    }
    BootSource::Defaults
}
