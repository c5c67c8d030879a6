//! Permission-template expansion and checking.
//!
//! Both rules live here and nowhere else, so they stay independently
//! testable: route declarations carry templates like `user:update:{userID}`,
//! the gateway expands them with the bound route parameters, and the result
//! is checked against the single permission granted by the caller's access
//! token.

use gatehouse_routing::BoundParams;

/// Grant-side wildcard over the id position: `user:read:{all}` satisfies
/// every `user:read:<id>` requirement.
const ALL_WILDCARD: &str = "{all}";

/// Substitute every `{name}` placeholder with the decimal form of the bound
/// parameter of that name. `{all}` is a literal part of a permission and is
/// left intact.
///
/// Templates are validated against the route's parameter names when the
/// route table is built, so an unresolved placeholder here is a programming
/// fault, not a per-request error.
pub fn expand(template: &str, params: &BoundParams) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        let name = &rest[open + 1..open + close];
        out.push_str(&rest[..open]);

        if name == "all" {
            out.push_str(ALL_WILDCARD);
        } else if let Some(value) = params.get(name) {
            out.push_str(&value.to_string());
        } else {
            debug_assert!(false, "unbound permission placeholder '{{{name}}}'");
            out.push_str(&rest[open..open + close + 1]);
        }
        rest = &rest[open + close + 1..];
    }

    out.push_str(rest);
    out
}

/// True iff `granted` equals one of `required` exactly, or `granted` is the
/// `{all}`-scoped form of the same action/resource pair.
pub fn check(required: &[String], granted: &str) -> bool {
    required.iter().any(|r| satisfies(r, granted))
}

fn satisfies(required: &str, granted: &str) -> bool {
    if required == granted {
        return true;
    }

    // "user:read:{all}" covers "user:read:<id>" for any single id segment.
    if let Some(prefix) = granted.strip_suffix(ALL_WILDCARD) {
        if let Some(id) = required.strip_prefix(prefix) {
            return !id.is_empty() && !id.contains(':');
        }
    }

    false
}
