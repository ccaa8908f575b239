//! Bearer-token session: persistence, client-side decoding and the
//! login/logout lifecycle.

mod session;
mod token;
mod token_store;

pub use session::{LoginInput, Session};
pub use token::{decode_token, DecodedToken, SessionUser};
pub use token_store::{KeyringTokenStore, MemoryTokenStore, TokenStore};
