//! Application-wide constants

pub const MIN_NAME_LENGTH: usize = 2;
pub const MIN_PHONE_DIGITS: usize = 10;
pub const MAX_BIO_LENGTH: usize = 200;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const STRONG_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_SCORE: u8 = 6;
pub const FALLBACK_DISPLAY_NAME: &str = "User";
pub const FALLBACK_AVATAR_INITIAL: char = 'U';
