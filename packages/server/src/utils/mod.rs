pub mod ident;
pub mod jwt;
pub mod password;
pub mod text;
