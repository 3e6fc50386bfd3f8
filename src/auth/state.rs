//! Authentication state trait and macro.

use super::transport::TokenTransport;
use crate::jwt::JwtConfig;

/// Trait for router states that can run the authorization gate.
pub trait HasAuthBackend {
    fn jwt(&self) -> &JwtConfig;
    fn transport(&self) -> TokenTransport;
}

/// Macro to implement `HasAuthBackend` for state structs with the standard fields.
///
/// The struct must have these fields:
/// - `jwt: Arc<JwtConfig>`
/// - `transport: TokenTransport`
///
/// # Example
/// ```ignore
/// #[derive(Clone)]
/// pub struct RoomsState {
///     pub db: Database,
///     pub jwt: Arc<JwtConfig>,
///     pub transport: TokenTransport,
/// }
///
/// impl_has_auth_backend!(RoomsState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn jwt(&self) -> &$crate::jwt::JwtConfig {
                &self.jwt
            }
            fn transport(&self) -> $crate::auth::TokenTransport {
                self.transport
            }
        }
    };
}
