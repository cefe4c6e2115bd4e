//! HTTP request layer - builds URLs, attaches the auth token, POSTs
//!
//! Every call to the shipment API goes through [`ApiClient::post`]:
//! a form-encoded POST carrying the auth token, with any transport
//! failure or non-2xx status mapped to the single [`RequestError`]
//! kind. JSON decoding and raw byte passthrough are the two response
//! variants; there are no retries, failures surface immediately.

use std::io::Write;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::{
    CLOSE_SHIPMENT_PATH, CURRENT_SHIPMENTS_PATH, DOWNLOAD_ADDRESS_FILE_PATH,
    DOWNLOAD_SHIPMENT_FILE_PATH, SHIPMENT_EXPORTS_PATH,
};
use crate::models::{Export, Shipment};
use crate::settings::Settings;

/// Error raised by any failed API request
///
/// Transport failures and non-success statuses both collapse into this
/// type; callers never see a raw `reqwest::Error`.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("error making request to {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("error making request to {url} (status {status})")]
    Status { url: String, status: u16 },
}

impl RequestError {
    /// URL of the failed request
    pub fn url(&self) -> &str {
        match self {
            RequestError::Transport { url, .. } => url,
            RequestError::Status { url, .. } => url,
        }
    }

    /// HTTP status code, when the server responded at all
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Transport { .. } => None,
            RequestError::Status { status, .. } => Some(*status),
        }
    }
}

/// Form payload sent with every request
#[derive(Debug, Serialize)]
struct Payload<'a> {
    token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipment_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    export_id: Option<i64>,
}

impl<'a> Payload<'a> {
    fn token(token: &'a str) -> Self {
        Payload {
            token,
            shipment_id: None,
            export_id: None,
        }
    }

    fn with_shipment_id(token: &'a str, shipment_id: i64) -> Self {
        Payload {
            token,
            shipment_id: Some(shipment_id),
            export_id: None,
        }
    }

    fn with_export_id(token: &'a str, export_id: i64) -> Self {
        Payload {
            token,
            shipment_id: None,
            export_id: Some(export_id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ShipmentsResponse {
    shipments: Vec<Shipment>,
}

#[derive(Debug, Deserialize)]
struct ExportsResponse {
    exports: Vec<Export>,
}

#[derive(Debug, Deserialize)]
struct CloseShipmentResponse {
    export_id: i64,
}

/// Seam between the request layer and the file manager
///
/// The file manager only needs "stream this export's bytes into a
/// writer"; keeping that behind a trait lets its tests run without a
/// network.
pub trait ExportDownloader {
    /// Stream the exported commodities file into `dest`
    fn download_commodities_file(
        &self,
        export_id: i64,
        dest: &mut dyn Write,
    ) -> Result<(), RequestError>;

    /// Stream the exported address file into `dest`
    fn download_address_file(
        &self,
        export_id: i64,
        dest: &mut dyn Write,
    ) -> Result<(), RequestError>;
}

/// Blocking client for the shipment management API
pub struct ApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Create a client from loaded settings
    pub fn new(settings: &Settings) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        ApiClient {
            client,
            base_url: settings.base_url(),
            token: settings.token.clone(),
        }
    }

    /// Compose the full URL for a relative API path
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// POST a payload to a composed URL and return the raw response
    ///
    /// Any transport error or non-2xx status becomes a [`RequestError`].
    fn post(
        &self,
        url: &str,
        payload: &Payload<'_>,
    ) -> Result<reqwest::blocking::Response, RequestError> {
        debug!(%url, "POST");
        let response = self.client.post(url).form(payload).send().map_err(|source| {
            warn!(%url, error = %source, "request failed");
            RequestError::Transport {
                url: url.to_owned(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "request rejected");
            return Err(RequestError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    /// JSON-decoding variant: POST to a relative path and decode the body
    fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &Payload<'_>,
    ) -> Result<T, RequestError> {
        let url = self.url(path);
        let response = self.post(&url, payload)?;
        response
            .json()
            .map_err(|source| RequestError::Transport { url, source })
    }

    /// Fetch the list of currently open shipments
    pub fn current_shipments(&self) -> Result<Vec<Shipment>, RequestError> {
        let body: ShipmentsResponse =
            self.post_json(CURRENT_SHIPMENTS_PATH, &Payload::token(&self.token))?;
        Ok(body.shipments)
    }

    /// Fetch the list of recent shipment exports
    pub fn shipment_exports(&self) -> Result<Vec<Export>, RequestError> {
        let body: ExportsResponse =
            self.post_json(SHIPMENT_EXPORTS_PATH, &Payload::token(&self.token))?;
        Ok(body.exports)
    }

    /// Close open shipments tied to `shipment_id`
    ///
    /// Returns the id of the export created server-side. Caches are not
    /// touched; callers re-fetch to observe the change.
    pub fn close_shipment(&self, shipment_id: i64) -> Result<i64, RequestError> {
        let body: CloseShipmentResponse = self.post_json(
            CLOSE_SHIPMENT_PATH,
            &Payload::with_shipment_id(&self.token, shipment_id),
        )?;
        Ok(body.export_id)
    }

    /// Raw-passthrough variant: stream a file download into `dest`
    fn download(
        &self,
        path: &str,
        export_id: i64,
        dest: &mut dyn Write,
    ) -> Result<(), RequestError> {
        let url = self.url(path);
        let mut response = self.post(&url, &Payload::with_export_id(&self.token, export_id))?;
        let bytes = response
            .copy_to(dest)
            .map_err(|source| RequestError::Transport {
                url: url.clone(),
                source,
            })?;
        debug!(%url, export_id, bytes, "downloaded file");
        Ok(())
    }
}

impl ExportDownloader for ApiClient {
    fn download_commodities_file(
        &self,
        export_id: i64,
        dest: &mut dyn Write,
    ) -> Result<(), RequestError> {
        self.download(DOWNLOAD_SHIPMENT_FILE_PATH, export_id, dest)
    }

    fn download_address_file(
        &self,
        export_id: i64,
        dest: &mut dyn Write,
    ) -> Result<(), RequestError> {
        self.download(DOWNLOAD_ADDRESS_FILE_PATH, export_id, dest)
    }
}
