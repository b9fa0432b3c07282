use serde::{Deserialize, Serialize};

/// Identity of the NVR an instance is connected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NvrInfo {
    pub id: String,
    pub name: String,
    /// Hardware type, e.g. `UDMPRO` or `CloudKeyGen2Plus`.
    pub model: Option<String>,
    /// Protect application version.
    pub version: Option<String>,
    pub host: Option<String>,
    /// Port the RTSP re-stream service listens on.
    pub rtsp_port: u16,
}

impl NvrInfo {
    /// Label used for log lines and table output, `name (model)` when the
    /// model is known.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.model {
            Some(model) => format!("{} ({model})", self.name),
            None => self.name.clone(),
        }
    }
}
