//! Process-wide service graph.

use std::sync::Arc;

use anyhow::Context;
use tracing::debug;
use url::Url;

use crate::auth::AuthGateway;
use crate::config::Settings;
use crate::credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
use crate::dashboard::Dashboard;
use crate::http::{ApiClient, RequestAuthorizer, ReqwestTransport, Transport};
use crate::router::{NavigationGuard, Router};
use crate::session::SessionState;

/// One instance of every service, wired together once at startup.
pub struct App {
    pub session: Arc<SessionState>,
    pub router: Arc<Router>,
    pub auth: AuthGateway,
    pub dashboard: Arc<Dashboard>,
    pub api: ApiClient,
}

impl App {
    /// Build the app from settings: a credential file for the API origin
    /// (or an in-memory store when ephemeral) and a reqwest transport.
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let api_url = settings
            .api_url()
            .with_context(|| format!("Invalid API URL: {}", settings.api_url))?;

        let store: Arc<dyn CredentialStore> = if settings.ephemeral {
            Arc::new(MemoryCredentialStore::new())
        } else {
            let store = FileCredentialStore::for_origin(&settings.data_dir, &api_url);
            debug!("Using credential file {}", store.path().display());
            Arc::new(store)
        };

        let transport = ReqwestTransport::new(
            settings.request_timeout(),
            settings.user_agent.as_deref(),
        )
        .context("Failed to create HTTP client")?;

        Ok(Self::with_parts(api_url, store, Arc::new(transport)))
    }

    /// Wire the services over an explicit store and transport.
    pub fn with_parts(
        api_url: Url,
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let session = Arc::new(SessionState::new(store));
        let authorizer = RequestAuthorizer::new(session.clone());
        let api = ApiClient::new(api_url, transport, authorizer);
        let router = Arc::new(Router::new(NavigationGuard::new(session.clone())));
        let auth = AuthGateway::new(api.clone(), session.clone(), router.clone());
        let dashboard = Arc::new(Dashboard::new(api.clone(), &session));

        Self {
            session,
            router,
            auth,
            dashboard,
            api,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{TOKEN_KEY, USERNAME_KEY};
    use crate::http::testing::ScriptedTransport;
    use crate::router::{Navigator, Route};
    use tempfile::tempdir;

    #[test]
    fn test_new_restores_session_from_disk() {
        let dir = tempdir().unwrap();
        let settings = Settings {
            api_url: "http://localhost:8080".into(),
            ..Settings::with_data_dir(dir.path().to_path_buf())
        };

        let url = settings.api_url().unwrap();
        FileCredentialStore::for_origin(dir.path(), &url)
            .set_many(&[(TOKEN_KEY, "persisted"), (USERNAME_KEY, "judy")]);

        let app = App::new(&settings).unwrap();
        assert!(app.session.is_authenticated());
        assert_eq!(app.dashboard.username().as_deref(), Some("judy"));
        assert_eq!(app.router.navigate_to(""), Route::Dashboard);
    }

    #[test]
    fn test_sessions_are_scoped_per_origin() {
        let dir = tempdir().unwrap();
        let first = Settings {
            api_url: "http://localhost:8080".into(),
            ..Settings::with_data_dir(dir.path().to_path_buf())
        };
        App::new(&first)
            .unwrap()
            .session
            .set_authenticated("t", "kim");

        let second = Settings {
            api_url: "http://localhost:9090".into(),
            ..first.clone()
        };
        assert!(!App::new(&second).unwrap().session.is_authenticated());
        assert!(App::new(&first).unwrap().session.is_authenticated());
    }

    #[test]
    fn test_ephemeral_writes_nothing() {
        let dir = tempdir().unwrap();
        let settings = Settings {
            ephemeral: true,
            ..Settings::with_data_dir(dir.path().to_path_buf())
        };

        let app = App::new(&settings).unwrap();
        app.session.set_authenticated("t", "lee");
        assert!(!dir.path().join("credentials").exists());
    }

    #[test]
    fn test_invalid_api_url_is_error() {
        let settings = Settings {
            api_url: "not a url".into(),
            ephemeral: true,
            ..Default::default()
        };
        assert!(App::new(&settings).is_err());
    }

    #[test]
    fn test_services_share_one_session() {
        let app = App::with_parts(
            Url::parse("http://localhost:8080").unwrap(),
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(ScriptedTransport::new()),
        );
        app.session.set_authenticated("t", "max");
        assert!(app.auth.is_logged_in());
        assert_eq!(app.router.navigate(Route::Dashboard), Route::Dashboard);

        app.auth.logout();
        assert_eq!(app.router.current(), Some(Route::Login));
        assert_eq!(app.dashboard.username(), None);
    }
}
