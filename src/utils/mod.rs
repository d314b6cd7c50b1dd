pub mod base62;
pub mod ip;
pub mod url_validator;

pub use base62::{decode as decode_base62, encode as encode_base62};
pub use url_validator::normalize_url;
