//! Fragment router
//!
//! Maps `#login` and `#register` onto freshly built view/model pairs. The
//! router owns the single current view; activating a route drops whatever
//! was there before. Unknown fragments resolve to [`Route::NotFound`] and
//! leave the current view alone.

use crate::reporter::ErrorReporter;
use crate::request::Transport;
use crate::session::App;
use crate::views::{LoginModel, LoginView, RegisterModel, RegisterView, Services};
use std::fmt;
use std::sync::Arc;

/// Every fragment the router understands, plus the fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    NotFound(String),
}

impl Route {
    /// Parse a URL fragment, with or without the leading `#`
    pub fn parse(fragment: &str) -> Self {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        match fragment {
            "login" => Route::Login,
            "register" => Route::Register,
            other => Route::NotFound(other.to_string()),
        }
    }

    pub fn fragment(&self) -> &str {
        match self {
            Route::Login => "login",
            Route::Register => "register",
            Route::NotFound(fragment) => fragment,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.fragment())
    }
}

/// The view the router currently shows
pub enum CurrentView<T, R, A> {
    Login(LoginView<T, R, A>),
    Register(RegisterView<T, R, A>),
}

impl<T, R, A> CurrentView<T, R, A> {
    pub fn title(&self) -> &'static str {
        match self {
            CurrentView::Login(view) => view.title(),
            CurrentView::Register(view) => view.title(),
        }
    }

    pub fn render(&self) -> String {
        match self {
            CurrentView::Login(view) => view.render(),
            CurrentView::Register(view) => view.render(),
        }
    }

    pub fn route(&self) -> Route {
        match self {
            CurrentView::Login(_) => Route::Login,
            CurrentView::Register(_) => Route::Register,
        }
    }
}

impl<T: Transport, R: ErrorReporter, A: App> CurrentView<T, R, A> {
    /// Instance id of the bound model
    pub fn model_id(&self) -> u64 {
        match self {
            CurrentView::Login(view) => view.model().id(),
            CurrentView::Register(view) => view.model().id(),
        }
    }
}

/// Router holding the current view
pub struct Workspace<T, R, A> {
    services: Arc<Services<T, R, A>>,
    current: Option<CurrentView<T, R, A>>,
}

impl<T: Transport, R: ErrorReporter, A: App> Workspace<T, R, A> {
    pub fn new(services: Arc<Services<T, R, A>>) -> Self {
        Self {
            services,
            current: None,
        }
    }

    /// Dispatch `fragment`. Known routes always rebuild their view, even when
    /// it is already showing.
    pub fn navigate(&mut self, fragment: &str) -> Route {
        let route = Route::parse(fragment);
        match &route {
            Route::Login => self.login(),
            Route::Register => self.register(),
            Route::NotFound(fragment) => {
                tracing::warn!("No route for fragment {:?}, keeping current view", fragment);
            }
        }
        route
    }

    pub fn login(&mut self) {
        let model = LoginModel::new(self.services.clone());
        tracing::debug!("Showing login view (model {})", model.id());
        self.current = Some(CurrentView::Login(LoginView::new(model)));
    }

    pub fn register(&mut self) {
        let model = RegisterModel::new(self.services.clone());
        tracing::debug!("Showing register view (model {})", model.id());
        self.current = Some(CurrentView::Register(RegisterView::new(model)));
    }

    pub fn current(&self) -> Option<&CurrentView<T, R, A>> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut CurrentView<T, R, A>> {
        self.current.as_mut()
    }
}
