//! Checked-in prost/tonic code for the collaborators this workspace talks to.
//!
//! The `.proto` sources live in `proto/`. Timestamps travel as Unix seconds
//! (`int64`); see `grpc_client::conversions`.

/// Identity service: users.
pub mod sso {
    include!("generated/sso.rs");
}

/// Catalog service: masters.
pub mod toys {
    include!("generated/toys.rs");
}

/// Request board: tickets and responds.
pub mod tickets {
    include!("generated/tickets.rs");
}

/// Read API over the communication log served by this workspace.
pub mod notifications {
    include!("generated/notifications.rs");
}
