use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of generated SIP endpoint passwords.
pub const SIP_PASSWORD_LEN: usize = 16;

/// Random characters in a generated SIP domain name, after the `d` prefix.
pub const DOMAIN_NAME_LEN: usize = 15;

/// Lowercase letters and digits without look-alikes (`0`/`o`, `1`/`l`/`i`).
const READABLE_LOWERCASE: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";

/// Random alphanumeric secret of `len` characters.
pub fn random_secret(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random lowercase string drawn from a readable alphabet.
pub fn random_readable(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| READABLE_LOWERCASE[rng.gen_range(0..READABLE_LOWERCASE.len())] as char)
        .collect()
}

/// Password for a SIP endpoint created without one.
pub fn sip_password() -> String {
    random_secret(SIP_PASSWORD_LEN)
}

/// Name for a SIP domain created without one. Domain names must start with a letter.
pub fn domain_name() -> String {
    format!("d{}", random_readable(DOMAIN_NAME_LEN))
}
