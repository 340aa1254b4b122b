use reqwest::Url;

use super::{ClientError, SessionStore};

pub const AUTH_PATH: &str = "/auth";
pub const TODOS_PATH: &str = "/todos";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    pub path: &'static str,
    /// Reachable without a session.
    pub public: bool,
}

const ROUTES: &[Route] = &[
    Route {
        name: "auth",
        path: AUTH_PATH,
        public: true,
    },
    Route {
        name: "todos",
        path: TODOS_PATH,
        public: false,
    },
];

impl Route {
    /// Resolves a path (query string ignored) to a route record.
    /// `/` resolves to the todos view.
    pub fn resolve(full_path: &str) -> Option<&'static Route> {
        let path = full_path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => TODOS_PATH,
            other => other,
        };
        ROUTES.iter().find(|route| route.path == path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect {
        to: &'static str,
        /// Path to return to once signed in.
        redirect: Option<String>,
    },
}

impl Navigation {
    /// The redirect target as a location string, e.g. `/auth?redirect=%2Ftodos`.
    pub fn location(&self) -> Option<String> {
        match self {
            Navigation::Proceed => None,
            Navigation::Redirect { to, redirect: None } => Some(to.to_string()),
            Navigation::Redirect {
                to,
                redirect: Some(redirect),
            } => {
                let url = Url::parse_with_params(
                    &format!("http://localhost{}", to),
                    &[("redirect", redirect.as_str())],
                )
                .ok()?;
                Some(format!("{}?{}", url.path(), url.query().unwrap_or_default()))
            }
        }
    }
}

/// Runs before every navigation to `full_path`.
///
/// Always calls `SessionStore::ensure`, so an expired token is dropped even
/// when navigating to a public route. Unknown paths are treated as private.
pub fn before_each(
    session: &mut SessionStore,
    full_path: &str,
) -> Result<Navigation, ClientError> {
    let authenticated = session.ensure()?;
    let route = Route::resolve(full_path);
    let public = route.map_or(false, |route| route.public);

    if !public && !authenticated {
        let target = match full_path {
            "" | "/" => TODOS_PATH.to_string(),
            other => other.to_string(),
        };
        return Ok(Navigation::Redirect {
            to: AUTH_PATH,
            redirect: Some(target),
        });
    }

    if route.map_or(false, |route| route.path == AUTH_PATH) && authenticated {
        return Ok(Navigation::Redirect {
            to: TODOS_PATH,
            redirect: None,
        });
    }

    if full_path.is_empty() || full_path == "/" {
        return Ok(Navigation::Redirect {
            to: TODOS_PATH,
            redirect: None,
        });
    }

    Ok(Navigation::Proceed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtKeys;
    use crate::client::{ApiClient, MemoryStorage, TokenStorage, TOKEN_KEY};
    use std::time::Duration;
    use uuid::Uuid;

    fn session(signed_in: bool) -> SessionStore {
        let storage = MemoryStorage::new();
        if signed_in {
            let keys = JwtKeys::new("router_test_secret_value", Duration::from_secs(600));
            let token = keys.issue(Uuid::new_v4(), "a@b.com").unwrap();
            storage.set(TOKEN_KEY, &token).unwrap();
        }
        SessionStore::new(ApiClient::new("http://127.0.0.1:9"), Box::new(storage)).unwrap()
    }

    #[test]
    fn test_resolve() {
        assert_eq!(Route::resolve("/").map(|r| r.name), Some("todos"));
        assert_eq!(Route::resolve("/auth?redirect=%2Ftodos").map(|r| r.name), Some("auth"));
        assert_eq!(Route::resolve("/todos/").map(|r| r.name), Some("todos"));
        assert_eq!(Route::resolve("/missing"), None);
    }

    #[test]
    fn test_private_route_without_session_redirects_to_auth() {
        let mut session = session(false);
        let nav = before_each(&mut session, "/todos").unwrap();
        assert_eq!(
            nav,
            Navigation::Redirect {
                to: AUTH_PATH,
                redirect: Some("/todos".into())
            }
        );
        assert_eq!(nav.location().as_deref(), Some("/auth?redirect=%2Ftodos"));

        let nav = before_each(&mut session, "/").unwrap();
        assert_eq!(nav.location().as_deref(), Some("/auth?redirect=%2Ftodos"));
    }

    #[test]
    fn test_auth_route() {
        let mut anonymous = session(false);
        assert_eq!(before_each(&mut anonymous, "/auth").unwrap(), Navigation::Proceed);

        let mut signed_in = session(true);
        let nav = before_each(&mut signed_in, "/auth").unwrap();
        assert_eq!(nav.location().as_deref(), Some("/todos"));
    }

    #[test]
    fn test_signed_in_navigation() {
        let mut session = session(true);
        assert_eq!(before_each(&mut session, "/todos").unwrap(), Navigation::Proceed);
        assert_eq!(
            before_each(&mut session, "/").unwrap(),
            Navigation::Redirect {
                to: TODOS_PATH,
                redirect: None
            }
        );
        assert_eq!(Navigation::Proceed.location(), None);
    }
}
