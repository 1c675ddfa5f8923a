// XML API authentication
//
// Key generation (`type=keygen`). PAN-OS exchanges a username/password for
// a long-lived API key; every later request carries that key in the
// `X-PAN-KEY` header.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::Error;
use crate::xapi::client::XapiClient;

impl XapiClient {
    /// Generate an API key from username/password and store it on the client.
    ///
    /// `POST /api/` with `type=keygen&user=...&password=...`
    pub async fn keygen(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        debug!(username, "generating API key");

        let resp = self
            .request_unauthenticated(&[
                ("type", "keygen"),
                ("user", username),
                ("password", password.expose_secret()),
            ])
            .await
            .map_err(|e| match e {
                Error::Api { message, .. } => Error::Authentication { message },
                other => other,
            })?;

        let key = resp
            .root()
            .find_text(&["result", "key"])
            .ok_or_else(|| Error::Authentication {
                message: "keygen response did not contain a key".into(),
            })?;

        self.set_api_key(SecretString::from(key.to_owned()));
        debug!("API key generated");
        Ok(())
    }
}
