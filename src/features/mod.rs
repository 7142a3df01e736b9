pub mod antibot;
pub mod captcha;
pub mod signature_cache;
