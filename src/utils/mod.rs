pub mod ids;
pub mod jwt;
pub mod password;
pub mod session_cookie;
