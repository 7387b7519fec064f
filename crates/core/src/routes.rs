//! Route classification for page requests.
//!
//! The proxy in front of the marketplace apps sorts every page path into
//! public, protected or uncategorized, and decides per request whether to
//! answer a CORS preflight, redirect to sign-in, or let the request through.
//!
//! Only cookie *presence* is considered here. Whether the session is valid is
//! for the backend to decide.
//!
//! # Prefix matching
//!
//! A prefix matches when the path equals it or continues with `/`, so
//! `/catalog` is not matched by `/cat`:
//!
//! ```rust
//! use marketplace_core::routes::prefix_matches;
//!
//! assert!(prefix_matches("/account/settings", "/account"));
//! assert!(!prefix_matches("/catalog", "/cat"));
//! ```

/// Default public path prefixes.
pub const DEFAULT_PUBLIC_PREFIXES: &[&str] = &[
    "/",
    "/products",
    "/catalog",
    "/categories",
    "/search",
    "/sellers",
    "/forum",
    "/sign-in",
    "/sign-up",
    "/unauthorized",
    "/about",
];

/// Default protected path prefixes.
pub const DEFAULT_PROTECTED_PREFIXES: &[&str] = &[
    "/account",
    "/messages",
    "/orders",
    "/checkout",
    "/wishlist",
    "/settings",
    "/seller",
    "/admin",
    "/t/new",
];

/// Prefix under which thread detail pages are public.
pub const DEFAULT_DETAIL_PREFIX: &str = "/t";

/// Segment under the detail prefix reserved for the protected creation flow.
pub const RESERVED_DETAIL_SEGMENT: &str = "new";

pub const DEFAULT_SIGN_IN_PATH: &str = "/sign-in";
pub const DEFAULT_REDIRECT_PARAM: &str = "redirect";

/// Whether `path` is `prefix` or lies below it.
#[must_use]
pub fn prefix_matches(path: &str, prefix: &str) -> bool {
    let prefix = match prefix.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => prefix,
    };
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Classification of a page path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    Public,
    Protected,
    Uncategorized,
}

/// What the proxy does with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyDecision {
    /// Answer with an empty `204` (CORS preflight).
    Preflight,
    /// Send the visitor to sign-in; `location` carries the return path.
    Redirect { location: String },
    /// Let the request continue to the app.
    PassThrough(RouteClass),
}

/// The parts of a request the proxy looks at.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub has_session: bool,
}

/// Static route configuration, built once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    public_prefixes: Vec<String>,
    protected_prefixes: Vec<String>,
    detail_prefix: Option<String>,
    sign_in_path: String,
    redirect_param: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_PUBLIC_PREFIXES.iter().copied(),
            DEFAULT_PROTECTED_PREFIXES.iter().copied(),
        )
    }
}

impl RouteTable {
    /// Create a table with the given prefixes, the default detail prefix and
    /// the default sign-in target.
    pub fn new<P, Q>(public: P, protected: Q) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        Q: IntoIterator,
        Q::Item: Into<String>,
    {
        Self {
            public_prefixes: public.into_iter().map(Into::into).collect(),
            protected_prefixes: protected.into_iter().map(Into::into).collect(),
            detail_prefix: Some(DEFAULT_DETAIL_PREFIX.to_owned()),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_owned(),
            redirect_param: DEFAULT_REDIRECT_PARAM.to_owned(),
        }
    }

    /// Set (or disable) the prefix whose detail pages are public.
    #[must_use]
    pub fn with_detail_prefix(mut self, prefix: Option<&str>) -> Self {
        self.detail_prefix = prefix.map(str::to_owned);
        self
    }

    /// Set where anonymous visitors are sent and the return-path parameter.
    #[must_use]
    pub fn with_sign_in(mut self, path: impl Into<String>, param: impl Into<String>) -> Self {
        self.sign_in_path = path.into();
        self.redirect_param = param.into();
        self
    }

    #[must_use]
    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    #[must_use]
    pub fn redirect_param(&self) -> &str {
        &self.redirect_param
    }

    /// Whether `path` is a public detail page such as `/t/abc123`.
    #[must_use]
    pub fn is_public_detail(&self, path: &str) -> bool {
        let Some(prefix) = self.detail_prefix.as_deref() else {
            return false;
        };
        path.strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(|rest| rest.split('/').next())
            .is_some_and(|segment| !segment.is_empty() && segment != RESERVED_DETAIL_SEGMENT)
    }

    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes
            .iter()
            .any(|prefix| prefix_matches(path, prefix))
            || self.is_public_detail(path)
    }

    #[must_use]
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| prefix_matches(path, prefix))
    }

    /// Classify `path`. Public wins over protected.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        if self.is_public(path) {
            RouteClass::Public
        } else if self.is_protected(path) {
            RouteClass::Protected
        } else {
            RouteClass::Uncategorized
        }
    }

    /// Sign-in URL carrying `return_path`.
    #[must_use]
    pub fn sign_in_location(&self, return_path: &str) -> String {
        format!(
            "{}?{}={}",
            self.sign_in_path,
            self.redirect_param,
            urlencoding::encode(return_path)
        )
    }

    /// Decide what to do with a page request.
    #[must_use]
    pub fn decide(&self, request: &RouteRequest<'_>) -> ProxyDecision {
        if request.method.eq_ignore_ascii_case("OPTIONS") {
            return ProxyDecision::Preflight;
        }

        match self.classify(request.path) {
            RouteClass::Protected if !request.has_session => ProxyDecision::Redirect {
                location: self.sign_in_location(request.path),
            },
            class => ProxyDecision::PassThrough(class),
        }
    }
}
