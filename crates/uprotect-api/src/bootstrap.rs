// Bootstrap endpoint
//
// `GET /api/bootstrap` is the single poll unit: one request returns the
// NVR record plus every adopted camera with its full settings.

use tracing::debug;

use crate::client::ProtectClient;
use crate::error::Error;
use crate::types::{BootstrapPayload, NvrPayload};

impl ProtectClient {
    /// Fetch the full NVR state dump.
    ///
    /// `GET /api/bootstrap`
    pub async fn bootstrap(&self) -> Result<BootstrapPayload, Error> {
        let url = self.api_url("bootstrap");
        debug!("fetching bootstrap");
        self.get_json(url).await
    }

    /// Fetch just the NVR record (server id, name, model, firmware).
    ///
    /// Convenience wrapper over [`bootstrap`](Self::bootstrap) for setup
    /// flows that only need server identity.
    pub async fn server_information(&self) -> Result<NvrPayload, Error> {
        let bootstrap = self.bootstrap().await?;
        Ok(bootstrap.nvr)
    }
}
