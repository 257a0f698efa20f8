use lazy_static::lazy_static;
use regex::Regex;

/// Consumer, free-mail and disposable domains that cannot be used to sign up.
pub const BLOCKED_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "aol.com",
    "icloud.com",
    "mail.com",
    "protonmail.com",
    "zoho.com",
    "yandex.com",
    "temp.com",
    "mailinator.com",
    "guerrillamail.com",
    "sharklasers.com",
    "trashmail.com",
];

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// True unless the address is malformed (not exactly one `@`) or its domain is
/// block-listed. Domains are compared exactly, case-insensitively.
pub fn is_work_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(_local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let domain = domain.to_lowercase();
    !BLOCKED_DOMAINS.contains(&domain.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blocked_domains_in_any_case() {
        assert!(!is_work_email("jane@gmail.com"));
        assert!(!is_work_email("jane@GMail.COM"));
        assert!(!is_work_email("x@Mailinator.com"));
    }

    #[test]
    fn accepts_company_domains() {
        assert!(is_work_email("jane@acme.com"));
        assert!(is_work_email("ops@verifiedmeasure.io"));
    }

    #[test]
    fn subdomains_of_blocked_domains_are_not_blocked() {
        assert!(is_work_email("jane@eu.gmail.com"));
        assert!(is_work_email("jane@gmail.co"));
    }

    #[test]
    fn malformed_addresses_fail_closed() {
        assert!(!is_work_email("no-at-sign"));
        assert!(!is_work_email("a@b@acme.com"));
        assert!(!is_work_email(""));
    }

    #[test]
    fn syntax_check() {
        assert!(is_valid_email("jane@acme.com"));
        assert!(!is_valid_email("jane@acme"));
        assert!(!is_valid_email("jane doe@acme.com"));
    }
}
