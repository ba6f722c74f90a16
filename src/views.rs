//! Login and registration views with their form models
//!
//! A view owns exactly one model. Models hold the form state and know how to
//! submit it; views only present it.

use crate::error::{ClientError, Result};
use crate::events::generate_id;
use crate::reporter::ErrorReporter;
use crate::request::Transport;
use crate::session::{App, Login};
use crate::util::stringify;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub const LOGIN_FAILED_TITLE: &str = "Ошибка входа";
pub const REGISTER_FAILED_TITLE: &str = "Ошибка регистрации";

/// Collaborators shared by every model the router builds
pub struct Services<T, R, A> {
    pub transport: T,
    pub reporter: R,
    pub app: A,
}

impl<T, R, A> Services<T, R, A> {
    pub fn new(transport: T, reporter: R, app: A) -> Arc<Self> {
        Arc::new(Self {
            transport,
            reporter,
            app,
        })
    }
}

/// Result of submitting a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    LoggedIn(Login),
    /// Account created; the activation mail is on its way
    Registered,
    /// Request failed; the failure has been reported
    Rejected,
}

/// Field-level refusal the server sends for a bad registration
#[derive(Debug, Deserialize)]
struct FieldError {
    field: String,
    reason: String,
}

fn describe_refusal(payload: &Value) -> String {
    match FieldError::deserialize(payload) {
        Ok(e) => format!("{}: {}", e.field, e.reason),
        Err(_) => stringify(payload),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Login
// ─────────────────────────────────────────────────────────────────────────────

pub struct LoginModel<T, R, A> {
    id: u64,
    services: Arc<Services<T, R, A>>,
    pub user: String,
    pub password: String,
}

impl<T: Transport, R: ErrorReporter, A: App> LoginModel<T, R, A> {
    pub fn new(services: Arc<Services<T, R, A>>) -> Self {
        Self {
            id: generate_id(),
            services,
            user: String::new(),
            password: String::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// POST the form to `/login`; a good answer logs the user in
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let form = [
            ("user", self.user.clone()),
            ("password", self.password.clone()),
        ];
        let answer = self.services.transport.post("/login", &form).await;

        let login: Login = match answer.decode() {
            Ok(login) => login,
            Err(payload) => {
                tracing::warn!("Login refused for {}", self.user);
                self.services
                    .reporter
                    .oops(LOGIN_FAILED_TITLE, &stringify(&payload));
                return Ok(SubmitOutcome::Rejected);
            }
        };

        self.services
            .app
            .make_login(&login.name, &login.sid)
            .map_err(|source| ClientError::Login {
                name: login.name.clone(),
                source,
            })?;
        Ok(SubmitOutcome::LoggedIn(login))
    }
}

pub struct LoginView<T, R, A> {
    model: LoginModel<T, R, A>,
}

impl<T, R, A> LoginView<T, R, A> {
    pub fn new(model: LoginModel<T, R, A>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &LoginModel<T, R, A> {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut LoginModel<T, R, A> {
        &mut self.model
    }

    pub fn title(&self) -> &'static str {
        "Вход"
    }

    pub fn render(&self) -> String {
        format!(
            "{}\n  Логин:  {}\n  Пароль: {}",
            self.title(),
            self.model.user,
            "*".repeat(self.model.password.chars().count())
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

pub struct RegisterModel<T, R, A> {
    id: u64,
    services: Arc<Services<T, R, A>>,
    pub user: String,
    pub password: String,
    pub email: String,
}

impl<T: Transport, R: ErrorReporter, A: App> RegisterModel<T, R, A> {
    pub fn new(services: Arc<Services<T, R, A>>) -> Self {
        Self {
            id: generate_id(),
            services,
            user: String::new(),
            password: String::new(),
            email: String::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// POST the form to `/join_us`
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let form = [
            ("user", self.user.clone()),
            ("password", self.password.clone()),
            ("email", self.email.clone()),
        ];

        match self.services.transport.post("/join_us", &form).await.decode::<Value>() {
            Ok(_) => {
                tracing::info!("Registered {}, waiting for activation", self.user);
                Ok(SubmitOutcome::Registered)
            }
            Err(payload) => {
                self.services
                    .reporter
                    .oops(REGISTER_FAILED_TITLE, &describe_refusal(&payload));
                Ok(SubmitOutcome::Rejected)
            }
        }
    }
}

pub struct RegisterView<T, R, A> {
    model: RegisterModel<T, R, A>,
}

impl<T, R, A> RegisterView<T, R, A> {
    pub fn new(model: RegisterModel<T, R, A>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &RegisterModel<T, R, A> {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut RegisterModel<T, R, A> {
        &mut self.model
    }

    pub fn title(&self) -> &'static str {
        "Регистрация"
    }

    pub fn render(&self) -> String {
        format!(
            "{}\n  Логин:  {}\n  E-mail: {}\n  Пароль: {}",
            self.title(),
            self.model.user,
            self.model.email,
            "*".repeat(self.model.password.chars().count())
        )
    }
}
