use std::collections::HashMap;

use super::errors::DispatchError;
use super::path::{handler_name, split_path};

/// What to do with a segment that names no registered handler or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Keep the default handler/method and leave the segment in place.
    #[default]
    Silent,
    /// Report the path as not found.
    Strict,
}

impl FallbackPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "silent" => Some(Self::Silent),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// The resolved target of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub handler: String,
    pub method: String,
    pub params: Vec<String>,
}

/// Handlers and their methods, registered at startup.
///
/// `A` is whatever the caller invokes for a route; the table only stores and returns it.
#[derive(Debug, Clone)]
pub struct RouteTable<A> {
    handlers: HashMap<String, HashMap<String, A>>,
    default_handler: String,
    default_method: String,
    fallback: FallbackPolicy,
}

impl<A: Clone> RouteTable<A> {
    pub fn new(default_handler: impl Into<String>, default_method: impl Into<String>) -> Self {
        Self {
            handlers: HashMap::new(),
            default_handler: default_handler.into(),
            default_method: default_method.into(),
            fallback: FallbackPolicy::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Registers `method` on `handler` (a full name such as `"UserController"`).
    pub fn register(&mut self, handler: &str, method: &str, action: A) -> &mut Self {
        self.handlers
            .entry(handler.to_string())
            .or_default()
            .insert(method.to_string(), action);
        self
    }

    pub fn has_handler(&self, handler: &str) -> bool {
        self.handlers.contains_key(handler)
    }

    pub fn has_method(&self, handler: &str, method: &str) -> bool {
        self.handlers
            .get(handler)
            .is_some_and(|methods| methods.contains_key(method))
    }

    /// Fails if the default handler was never registered.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.has_handler(&self.default_handler) {
            Ok(())
        } else {
            Err(DispatchError::MissingHandler(self.default_handler.clone()))
        }
    }

    /// Resolves `path` to a route and the action registered for it.
    ///
    /// Segment 0 selects a handler only if its transformed name is registered.
    /// Segment 1 selects a method only if the *selected* handler has it, whether or not
    /// segment 0 was consumed. Every unconsumed segment becomes a positional parameter,
    /// in its original order.
    pub fn resolve(&self, path: &str) -> Result<(Route, A), DispatchError> {
        self.validate()?;

        let mut segments: Vec<Option<String>> = split_path(path).into_iter().map(Some).collect();
        let mut handler = self.default_handler.clone();
        let mut method = self.default_method.clone();

        if let Some(first) = segments.first_mut() {
            let candidate = handler_name(first.as_deref().unwrap_or_default());
            if self.has_handler(&candidate) {
                handler = candidate;
                *first = None;
            } else if self.fallback == FallbackPolicy::Strict {
                return Err(DispatchError::NotFound(path.to_string()));
            }
        }

        if let Some(second) = segments.get_mut(1) {
            match second.take() {
                Some(name) if self.has_method(&handler, &name) => method = name,
                Some(_) if self.fallback == FallbackPolicy::Strict => {
                    return Err(DispatchError::NotFound(path.to_string()));
                }
                unmatched => *second = unmatched,
            }
        }

        let action = self
            .handlers
            .get(&handler)
            .and_then(|methods| methods.get(&method))
            .cloned()
            .ok_or_else(|| DispatchError::MissingMethod {
                handler: handler.clone(),
                method: method.clone(),
            })?;

        let route = Route {
            handler,
            method,
            params: segments.into_iter().flatten().collect(),
        };
        tracing::debug!(
            handler = %route.handler,
            method = %route.method,
            params = ?route.params,
            "Route resolved"
        );
        Ok((route, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable<&'static str> {
        let mut table = RouteTable::new("DashboardController", "index");
        table
            .register("DashboardController", "index", "dashboard.index")
            .register("DashboardController", "whatever", "dashboard.whatever")
            .register("UniversityController", "index", "university.index")
            .register("UniversityController", "edit", "university.edit")
            .register("AuthController", "login", "auth.login");
        table
    }

    fn route(handler: &str, method: &str, params: &[&str]) -> Route {
        Route {
            handler: handler.to_string(),
            method: method.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_resolve_handler_method_params() {
        // Given a registered UniversityController.edit
        let table = table();

        // When resolving an edit path
        let (resolved, action) = table.resolve("university/edit/42").unwrap();

        // Then the id is the single positional parameter
        assert_eq!(resolved, route("UniversityController", "edit", &["42"]));
        assert_eq!(action, "university.edit");
    }

    #[test]
    fn test_empty_path_uses_defaults() {
        let (resolved, action) = table().resolve("").unwrap();
        assert_eq!(resolved, route("DashboardController", "index", &[]));
        assert_eq!(action, "dashboard.index");

        let (resolved, _) = table().resolve("/").unwrap();
        assert_eq!(resolved, route("DashboardController", "index", &[]));
    }

    #[test]
    fn test_unknown_handler_checks_method_on_default_handler() {
        // Given a path whose first segment names no handler
        let table = table();

        // When resolving
        let (resolved, action) = table.resolve("bogus/whatever/1/2").unwrap();

        // Then the default handler is kept and "bogus" stays unconsumed, while
        // segment 1 is matched against the default handler's methods
        assert_eq!(
            resolved,
            route("DashboardController", "whatever", &["bogus", "1", "2"])
        );
        assert_eq!(action, "dashboard.whatever");
    }

    #[test]
    fn test_unknown_handler_and_unknown_method() {
        // Given neither segment matches
        let (resolved, action) = table().resolve("bogus/nothing/1").unwrap();

        // Then the defaults run with every segment as a parameter
        assert_eq!(
            resolved,
            route("DashboardController", "index", &["bogus", "nothing", "1"])
        );
        assert_eq!(action, "dashboard.index");
    }

    #[test]
    fn test_first_segment_is_never_a_method() {
        // Given a first segment that happens to be a default-handler method name
        let (resolved, _) = table().resolve("whatever/1").unwrap();

        // Then it is still a parameter, only segment 1 is checked as a method
        assert_eq!(resolved, route("DashboardController", "index", &["whatever", "1"]));
    }

    #[test]
    fn test_unknown_method_falls_back_to_default_method() {
        let (resolved, _) = table().resolve("university/5").unwrap();
        assert_eq!(resolved, route("UniversityController", "index", &["5"]));
    }

    #[test]
    fn test_trailing_slash_insensitive() {
        let (a, _) = table().resolve("university/edit/42/").unwrap();
        let (b, _) = table().resolve("/university/edit/42").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_handler_without_default_method() {
        // Given AuthController which has no index method
        let result = table().resolve("auth");

        // Then resolution reports the missing method
        assert_eq!(
            result.unwrap_err(),
            DispatchError::MissingMethod {
                handler: "AuthController".to_string(),
                method: "index".to_string()
            }
        );
    }

    #[test]
    fn test_missing_default_handler_is_fatal() {
        let mut table = RouteTable::new("HomeController", "index");
        table.register("AuthController", "login", ());
        assert_eq!(
            table.resolve("auth/login").unwrap_err(),
            DispatchError::MissingHandler("HomeController".to_string())
        );
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_method_match_is_case_sensitive() {
        let (resolved, _) = table().resolve("university/EDIT/1").unwrap();
        assert_eq!(resolved, route("UniversityController", "index", &["EDIT", "1"]));
    }

    #[test]
    fn test_strict_policy_rejects_unknown_segments() {
        // Given a strict table
        let table = table().with_fallback(FallbackPolicy::Strict);

        // Then unknown handlers and methods are not found
        assert!(matches!(
            table.resolve("bogus/whatever/1/2"),
            Err(DispatchError::NotFound(_))
        ));
        assert!(matches!(
            table.resolve("university/5"),
            Err(DispatchError::NotFound(_))
        ));

        // And exact routes still resolve
        let (resolved, _) = table.resolve("university/edit/42").unwrap();
        assert_eq!(resolved, route("UniversityController", "edit", &["42"]));
        let (resolved, _) = table.resolve("").unwrap();
        assert_eq!(resolved, route("DashboardController", "index", &[]));
    }

    #[test]
    fn test_parse_fallback_policy() {
        assert_eq!(FallbackPolicy::parse("strict"), Some(FallbackPolicy::Strict));
        assert_eq!(FallbackPolicy::parse(" Silent "), Some(FallbackPolicy::Silent));
        assert_eq!(FallbackPolicy::parse("loud"), None);
    }
}
