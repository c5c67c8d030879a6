//! Declarative route set.
//!
//! One entry per (canonical path, method) pair: parameter names in
//! placeholder order, the authentication flag, permission templates bound
//! to the parameters, and the handler identifier.

use gatehouse_routing::{HttpMethod, RouteDescriptor, RouteTable, TableError};

use crate::registry::HandlerId;

fn route(
    param_names: &[&'static str],
    requires_auth: bool,
    permissions: &[&'static str],
    handler: HandlerId,
) -> RouteDescriptor<HandlerId> {
    RouteDescriptor {
        param_names: param_names.to_vec(),
        requires_auth,
        permissions: permissions.to_vec(),
        handler,
    }
}

/// Build the full route table. Start-up invariants are validated by
/// `RouteTableBuilder::build`; a `TableError` here is a wiring fault.
pub fn route_table() -> Result<RouteTable<HandlerId>, TableError> {
    use HttpMethod::{Delete, Get, Post, Put};

    RouteTable::builder()
        // Registration and account verification (anonymous).
        .route("/register", Post, route(&[], false, &[], HandlerId::Register))
        .route(
            "/users/{x}/verify/{x}",
            Get,
            route(
                &["userID", "verificationCode"],
                false,
                &[],
                HandlerId::VerifyUser,
            ),
        )
        // Session protocol.
        .route("/login", Post, route(&[], false, &[], HandlerId::Login))
        .route("/token", Get, route(&[], false, &[], HandlerId::IssueToken))
        .route(
            "/users/{x}/logout",
            Post,
            route(
                &["userID"],
                true,
                &["user:delete:{userID}"],
                HandlerId::Logout,
            ),
        )
        // Single-user operations.
        .route(
            "/users/{x}",
            Get,
            route(&["userID"], true, &["user:read:{userID}"], HandlerId::GetUser),
        )
        .route(
            "/users/{x}",
            Put,
            route(
                &["userID"],
                true,
                &["user:update:{userID}"],
                HandlerId::UpdateUser,
            ),
        )
        .route(
            "/users/{x}",
            Delete,
            route(
                &["userID"],
                true,
                &["user:delete:{userID}"],
                HandlerId::DeleteUser,
            ),
        )
        .route(
            "/users/{x}/password",
            Put,
            route(
                &["userID"],
                true,
                &["user:update:{userID}"],
                HandlerId::ChangePassword,
            ),
        )
        .route(
            "/users/{x}/emailchange",
            Post,
            route(
                &["userID"],
                true,
                &["user:update:{userID}"],
                HandlerId::RequestEmailChange,
            ),
        )
        .route(
            "/users/{x}/emailchange/{x}",
            Get,
            route(
                &["userID", "verificationCode"],
                false,
                &[],
                HandlerId::VerifyEmailChange,
            ),
        )
        // Collection queries.
        .route(
            "/users",
            Get,
            route(&[], true, &["user:read:{all}"], HandlerId::ListUsers),
        )
        .route(
            "/users/length",
            Get,
            route(&[], true, &["user:read:{all}"], HandlerId::UserCount),
        )
        .route("/roles", Get, route(&[], false, &[], HandlerId::ListRoles))
        .build()
}
