//! Account activation
//!
//! The activation mail links to `#activate/{key}`. Activation asks the server
//! to confirm the key; a confirmed key comes back with the credentials of a
//! fresh session, which are handed straight to the application.

use crate::error::{ClientError, Result};
use crate::reporter::ErrorReporter;
use crate::request::{encode_segment, Transport};
use crate::session::{App, Login};

pub const ACTIVATION_FAILED_TITLE: &str = "Ошибка активации учётной записи";
pub const ACTIVATION_FAILED_MESSAGE: &str =
    "Учётная запись, с таким ключём активации, не найдена.";

/// What happened to an activation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Key accepted, user logged in
    Activated(Login),
    /// Request failed; the failure has been reported
    Rejected,
}

/// Activation flow bound to its collaborators
pub struct Activation<T, R, A> {
    transport: T,
    reporter: R,
    app: A,
}

impl<T: Transport, R: ErrorReporter, A: App> Activation<T, R, A> {
    pub fn new(transport: T, reporter: R, app: A) -> Self {
        Self {
            transport,
            reporter,
            app,
        }
    }

    /// Activate the account behind `key`.
    ///
    /// Issues exactly one request. A rejected key is reported and yields
    /// `Ok(Rejected)`; only a failing `make_login` is returned as an error.
    pub async fn activate(&self, key: &str) -> Result<ActivationOutcome> {
        let path = format!("/registration/{}", encode_segment(key));
        let answer = self.transport.get(&path, &[]).await;

        let login: Login = match answer.decode() {
            Ok(login) => login,
            Err(_) => {
                // Payload is not inspected: every failure means "no such key"
                tracing::debug!("Rejected activation key {:?}", key);
                tracing::warn!("Activation rejected");
                self.reporter
                    .oops(ACTIVATION_FAILED_TITLE, ACTIVATION_FAILED_MESSAGE);
                return Ok(ActivationOutcome::Rejected);
            }
        };

        self.app
            .make_login(&login.name, &login.sid)
            .map_err(|source| {
                tracing::error!("make_login failed after activation: {:#}", source);
                ClientError::Login {
                    name: login.name.clone(),
                    source,
                }
            })?;

        tracing::info!("Account {} activated", login.name);
        Ok(ActivationOutcome::Activated(login))
    }
}
