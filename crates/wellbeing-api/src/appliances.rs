// Appliance endpoints
//
// Discovery, telemetry snapshots and single-field commands.

use serde_json::{Map, Value};
use tracing::debug;

use crate::client::AuthenticatedClient;
use crate::error::Error;
use crate::models::{ApplianceData, ApplianceEntry};

impl AuthenticatedClient {
    /// List the appliances registered to the account.
    ///
    /// `GET /Domains/Appliances`
    pub async fn list_appliances(&self) -> Result<Vec<ApplianceEntry>, Error> {
        let url = self.endpoints().api_url(&["Domains", "Appliances"])?;
        debug!("listing appliances");
        self.get(url).await
    }

    /// Fetch the full telemetry snapshot of one appliance.
    ///
    /// `GET /Appliances/{pncId}`
    pub async fn get_appliance(&self, pnc_id: &str) -> Result<ApplianceData, Error> {
        let url = self.endpoints().api_url(&["Appliances", pnc_id])?;
        debug!(pnc_id, "fetching appliance data");
        self.get(url).await
    }

    /// Set a single reported field on an appliance.
    ///
    /// `PUT /Appliances/{pncId}/Commands` with `{field: value}`. Returns
    /// whatever the API answers with (`null` for an empty body).
    pub async fn send_command(
        &self,
        pnc_id: &str,
        field: &str,
        value: Value,
    ) -> Result<Value, Error> {
        let url = self
            .endpoints()
            .api_url(&["Appliances", pnc_id, "Commands"])?;
        let mut body = Map::with_capacity(1);
        body.insert(field.to_owned(), value);
        debug!(pnc_id, field, "sending command");
        self.put(url, &Value::Object(body)).await
    }
}
