use serde::{Deserialize, Serialize};

/// Path of the login view; the default entry destination.
pub const LOGIN_PATH: &str = "/login";

/// A navigable destination. Static configuration, never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    /// Path pattern; segments starting with `:` match any single segment.
    pub path: String,
    #[serde(default)]
    pub requires_auth: bool,
}

impl Route {
    pub fn public(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            requires_auth: false,
        }
    }

    pub fn protected(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            requires_auth: true,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        let pattern = segments(&self.path);
        let actual = segments(path);
        pattern.len() == actual.len()
            && pattern
                .iter()
                .zip(&actual)
                .all(|(p, a)| p.starts_with(':') || p == a)
    }
}

fn segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// First route whose pattern matches `path`.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matches(path))
    }

    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl Default for RouteTable {
    /// The idea board's views.
    fn default() -> Self {
        Self::new(vec![
            Route::public("home", "/"),
            Route::public("login", LOGIN_PATH),
            Route::public("register", "/register"),
            Route::public("ideas", "/ideas"),
            Route::public("idea-detail", "/ideas/:id"),
            Route::protected("submit-idea", "/submit-idea"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_static_and_param_routes() {
        let table = RouteTable::default();
        assert_eq!(table.resolve("/").map(|r| r.name.as_str()), Some("home"));
        assert_eq!(table.resolve("/ideas").map(|r| r.name.as_str()), Some("ideas"));
        assert_eq!(
            table.resolve("/ideas/42").map(|r| r.name.as_str()),
            Some("idea-detail")
        );
        assert_eq!(
            table.resolve("/submit-idea/").map(|r| r.name.as_str()),
            Some("submit-idea")
        );
        assert!(table.resolve("/ideas/42/edit").is_none());
        assert!(table.resolve("/nowhere").is_none());
    }

    #[test]
    fn test_query_string_is_ignored() {
        let table = RouteTable::default();
        assert_eq!(
            table.resolve("/ideas?page=2").map(|r| r.name.as_str()),
            Some("ideas")
        );
    }

    #[test]
    fn test_only_submit_requires_auth_by_default() {
        let table = RouteTable::default();
        let protected: Vec<&str> = table
            .routes()
            .iter()
            .filter(|r| r.requires_auth)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(protected, vec!["submit-idea"]);
    }

    #[test]
    fn test_route_table_from_json() {
        let table: RouteTable = serde_json::from_str(
            r#"{"routes": [{"name": "submit", "path": "/submit", "requires_auth": true},
                           {"name": "login", "path": "/login"}]}"#,
        )
        .unwrap();
        assert!(table.by_name("submit").unwrap().requires_auth);
        assert!(!table.by_name("login").unwrap().requires_auth);
    }
}
