/// Authentication and authorization
///
/// - `policy`: the pure role policy gating every board mutation
/// - `jwt`: bearer-token validation supplying the caller's identity
///
/// Token issuance, registration, and credential storage are outside
/// this crate; the API layer only ever validates tokens it is handed.

pub mod jwt;
pub mod policy;

pub use policy::{authorize, required_role, BoardAction, PolicyDenied};
