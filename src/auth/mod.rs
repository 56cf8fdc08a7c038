// Credential handling
// Employee passwords never leave this module in plaintext form

pub mod password;
