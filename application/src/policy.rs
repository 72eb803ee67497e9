//! Access policy of the dashboard areas.

use service::domain::user::Role;

/// Site root, where unauthorized visitors are sent back to.
pub const ROOT: &str = "/";

/// Dashboard root page, redirecting to the dashboard of the visitor's [`Role`].
pub const DASHBOARD: &str = "/dashboard";

/// Root of the administrator dashboard pages.
pub const ADMIN_DASHBOARD: &str = "/dashboard/admin";

/// Root of the editor dashboard pages.
pub const EDITOR_DASHBOARD: &str = "/dashboard/editor";

/// Root of the dashboard API.
pub const DASHBOARD_API: &str = "/api/dashboard";

/// Part of the site guarded by this policy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// Dashboard pages, answering with redirects.
    Page,

    /// Dashboard API, answering with JSON errors.
    Api,
}

impl Scope {
    /// Detects the [`Scope`] of the provided `path`.
    ///
    /// [`None`] means the `path` is not subject to this policy.
    #[must_use]
    pub fn of(path: &str) -> Option<Self> {
        if is_under(path, DASHBOARD_API) {
            Some(Self::Api)
        } else if is_under(path, DASHBOARD) {
            Some(Self::Page)
        } else {
            None
        }
    }
}

/// How a [`Rule`] prefix matches a path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Matching {
    /// Matches the prefix itself and anything below it as path segments.
    Segments,

    /// Matches any path starting with the prefix.
    Plain,
}

/// Single rule of the [`RULES`] table.
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    /// Path prefix this [`Rule`] applies to.
    pub prefix: &'static str,

    /// How the `prefix` is matched.
    matching: Matching,

    /// [`Role`]s allowed to pass.
    pub roles: &'static [Role],
}

impl Rule {
    /// Checks whether this [`Rule`] applies to the provided `path`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self.matching {
            Matching::Segments => is_under(path, self.prefix),
            Matching::Plain => path.starts_with(self.prefix),
        }
    }
}

/// [`Role`]s of the dashboard staff.
const STAFF: &[Role] = &[Role::Admin, Role::Editor];

/// Only the administrators.
const ADMINS: &[Role] = &[Role::Admin];

/// Rules in evaluation order, the first matching one wins.
pub const RULES: &[Rule] = &[
    Rule {
        prefix: ADMIN_DASHBOARD,
        matching: Matching::Segments,
        roles: ADMINS,
    },
    Rule {
        prefix: EDITOR_DASHBOARD,
        matching: Matching::Segments,
        roles: STAFF,
    },
    Rule {
        prefix: "/api/dashboard/users",
        matching: Matching::Plain,
        roles: ADMINS,
    },
    Rule {
        prefix: "/api/dashboard/admin",
        matching: Matching::Plain,
        roles: ADMINS,
    },
    Rule {
        prefix: "/api/dashboard/editor",
        matching: Matching::Plain,
        roles: STAFF,
    },
    Rule {
        prefix: DASHBOARD_API,
        matching: Matching::Segments,
        roles: STAFF,
    },
];

/// Returns the first of the [`RULES`] applying to the provided `path`.
#[must_use]
pub fn rule_for(path: &str) -> Option<&'static Rule> {
    RULES.iter().find(|r| r.matches(path))
}

/// Checks whether the provided [`Role`] may access the provided `path`.
///
/// Paths outside any [`Scope`] are always allowed, while dashboard pages
/// matching no rule are denied to everyone.
#[must_use]
pub fn is_allowed(path: &str, role: Role) -> bool {
    if Scope::of(path).is_none() {
        return true;
    }
    rule_for(path).is_some_and(|r| r.roles.contains(&role))
}

/// Returns the dashboard page of the provided [`Role`].
#[must_use]
pub const fn home_of(role: Role) -> &'static str {
    match role {
        Role::Admin => ADMIN_DASHBOARD,
        Role::Editor => EDITOR_DASHBOARD,
        Role::User => ROOT,
    }
}

/// Returns the page a [`Role`] is sent to when denied a dashboard page.
#[must_use]
pub const fn fallback_of(role: Role) -> &'static str {
    match role {
        Role::Editor => EDITOR_DASHBOARD,
        Role::Admin | Role::User => ROOT,
    }
}

/// Checks whether the provided `path` equals the `prefix` or lies below it.
fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
