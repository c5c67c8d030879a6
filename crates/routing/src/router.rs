//! Route resolution: canonical-key lookup, method lookup, parameter binding.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::method::HttpMethod;
use crate::path::ApiPath;
use crate::table::{RouteDescriptor, RouteTable};

/// Route parameters bound by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundParams {
    params: BTreeMap<&'static str, u64>,
}

impl BoundParams {
    pub fn get(&self, name: &str) -> Option<u64> {
        self.params.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.params.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl FromIterator<(&'static str, u64)> for BoundParams {
    fn from_iter<I: IntoIterator<Item = (&'static str, u64)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// No registered route matches the requested path under any method.
    #[error("no route matches the path '{0}'")]
    PathNotFound(String),

    /// The path exists but not for this method. `available` always lists
    /// every method registered for the path, so the boundary can render a
    /// method-not-allowed response with alternatives.
    #[error("the path '{path}' has no method {method}")]
    MethodNotFound {
        path: String,
        method: HttpMethod,
        available: Vec<HttpMethod>,
    },
}

/// A resolved route: the matched descriptor plus its bound parameters.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub params: BoundParams,
    pub requires_auth: bool,
    pub permissions: &'a [&'static str],
    pub handler: &'a H,
}

/// Resolves parsed paths against the frozen route table.
///
/// Deterministic for a fixed table; the table is never modified after
/// start-up.
#[derive(Debug)]
pub struct Router<H> {
    table: RouteTable<H>,
}

impl<H> Router<H> {
    pub fn new(table: RouteTable<H>) -> Self {
        Self { table }
    }

    pub fn route(
        &self,
        path: &ApiPath,
        method: HttpMethod,
    ) -> Result<RouteMatch<'_, H>, RoutingError> {
        let methods = self
            .table
            .methods_for(&path.canonical_key())
            .ok_or_else(|| RoutingError::PathNotFound(path.to_string()))?;

        let descriptor = methods.get(&method).ok_or_else(|| RoutingError::MethodNotFound {
            path: path.to_string(),
            method,
            available: methods.keys().copied().collect(),
        })?;

        Ok(RouteMatch {
            params: bind_params(descriptor, path),
            requires_auth: descriptor.requires_auth,
            permissions: &descriptor.permissions,
            handler: &descriptor.handler,
        })
    }
}

/// Positional binding of declared names to the path's numeric parameters.
///
/// Counts are guaranteed equal by the table's start-up invariant.
fn bind_params<H>(descriptor: &RouteDescriptor<H>, path: &ApiPath) -> BoundParams {
    descriptor
        .param_names
        .iter()
        .copied()
        .zip(path.parameters())
        .collect()
}
