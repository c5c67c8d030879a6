//! Immutable, process-lifetime route registry.
//!
//! The table is built once at start-up from a declarative entry list and is
//! then read-only, so it is safely shared across concurrently handled
//! requests without locking. Structural invariants (duplicate routes,
//! parameter-name counts, permission-template placeholders) are enforced
//! here and never re-checked per request.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::method::HttpMethod;
use crate::path::placeholder_count;

/// Everything the gateway needs to know about one (path, method) route.
///
/// The handler is opaque to this crate; callers typically instantiate `H`
/// with a registry identifier resolved at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor<H> {
    /// Names for the path's placeholder segments, in placeholder order.
    pub param_names: Vec<&'static str>,

    /// Whether a valid access token is required before dispatch.
    pub requires_auth: bool,

    /// Permission templates (e.g. `user:update:{userID}`), expanded with
    /// bound parameters at request time.
    pub permissions: Vec<&'static str>,

    /// Opaque handler capability.
    pub handler: H,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("duplicate route: {method} {path}")]
    DuplicateRoute { path: String, method: HttpMethod },

    #[error(
        "route '{path}' declares {names} parameter name(s) for {placeholders} placeholder(s)"
    )]
    ParamCountMismatch {
        path: String,
        placeholders: usize,
        names: usize,
    },

    #[error("route '{path}': permission template '{template}' is malformed")]
    MalformedTemplate { path: String, template: String },

    #[error(
        "route '{path}': permission template '{template}' references '{{{name}}}' which is not a declared parameter"
    )]
    UnboundTemplateParam {
        path: String,
        template: String,
        name: String,
    },
}

/// Builder collecting declarative route entries before validation.
#[derive(Debug, Default)]
pub struct RouteTableBuilder<H> {
    entries: Vec<(&'static str, HttpMethod, RouteDescriptor<H>)>,
}

impl<H> RouteTableBuilder<H> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a route under a canonical path (placeholders as `{x}`).
    pub fn route(
        mut self,
        path: &'static str,
        method: HttpMethod,
        descriptor: RouteDescriptor<H>,
    ) -> Self {
        self.entries.push((path, method, descriptor));
        self
    }

    /// Validate the start-up invariants and freeze the table.
    pub fn build(self) -> Result<RouteTable<H>, TableError> {
        let mut routes: HashMap<String, BTreeMap<HttpMethod, RouteDescriptor<H>>> = HashMap::new();

        for (path, method, descriptor) in self.entries {
            let placeholders = placeholder_count(path);
            if placeholders != descriptor.param_names.len() {
                return Err(TableError::ParamCountMismatch {
                    path: path.to_string(),
                    placeholders,
                    names: descriptor.param_names.len(),
                });
            }

            for template in descriptor.permissions.iter().copied() {
                validate_template(path, template, &descriptor.param_names)?;
            }

            let methods = routes.entry(path.to_string()).or_default();
            if methods.insert(method, descriptor).is_some() {
                return Err(TableError::DuplicateRoute {
                    path: path.to_string(),
                    method,
                });
            }
        }

        Ok(RouteTable { routes })
    }
}

/// Every `{name}` in a template must name a declared route parameter, except
/// the grant-side wildcard `{all}` which is a literal part of the permission.
fn validate_template(
    path: &'static str,
    template: &'static str,
    param_names: &[&'static str],
) -> Result<(), TableError> {
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            return Err(TableError::MalformedTemplate {
                path: path.to_string(),
                template: template.to_string(),
            });
        };
        let name = &rest[open + 1..open + close];
        if name != "all" && !param_names.contains(&name) {
            return Err(TableError::UnboundTemplateParam {
                path: path.to_string(),
                template: template.to_string(),
                name: name.to_string(),
            });
        }
        rest = &rest[open + close + 1..];
    }
    Ok(())
}

/// The frozen registry: canonical path → method → descriptor.
#[derive(Debug)]
pub struct RouteTable<H> {
    routes: HashMap<String, BTreeMap<HttpMethod, RouteDescriptor<H>>>,
}

impl<H> RouteTable<H> {
    pub fn builder() -> RouteTableBuilder<H> {
        RouteTableBuilder::new()
    }

    pub(crate) fn methods_for(
        &self,
        canonical_key: &str,
    ) -> Option<&BTreeMap<HttpMethod, RouteDescriptor<H>>> {
        self.routes.get(canonical_key)
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
