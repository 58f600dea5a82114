//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying a snapshot of the user's identity at
//! issuance time. Decoding alone never establishes trust; only
//! [`TokenCodec::verify`] (or the verifying path inside refresh) does.

mod claims;
mod codec;

pub use claims::SessionClaims;
pub use codec::TokenCodec;
