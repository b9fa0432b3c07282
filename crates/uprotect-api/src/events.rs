// Event endpoints
//
// Motion and ring events are polled over a sliding window; the NVR takes
// millisecond-epoch bounds and returns events overlapping the range.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::client::ProtectClient;
use crate::error::Error;
use crate::types::EventPayload;

impl ProtectClient {
    /// List events overlapping the `[start, end]` window.
    ///
    /// `GET /api/events?start=...&end=...` (millisecond epochs)
    pub async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EventPayload>, Error> {
        let mut url = self.api_url("events");
        url.query_pairs_mut()
            .append_pair("start", &start.timestamp_millis().to_string())
            .append_pair("end", &end.timestamp_millis().to_string());

        debug!(%start, %end, "listing events");
        self.get_json(url).await
    }
}
