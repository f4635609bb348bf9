//! Natural-language descriptions of sensitive fragments.

use crate::catalog::Category;
use std::net::Ipv4Addr;

/// Domain labels of free mail providers
const PERSONAL_MAIL_PROVIDERS: &[&str] = &[
    "gmail",
    "googlemail",
    "yahoo",
    "outlook",
    "hotmail",
    "live",
    "icloud",
    "aol",
    "proton",
    "protonmail",
    "gmx",
    "yandex",
];

const CORPORATE_MAIL_MARKERS: &[&str] = &["company", "corp", "enterprise"];

/// Describe a matched fragment in prose instead of a placeholder
pub fn describe(category: Category, matched: &str) -> &'static str {
    match category {
        Category::Email => describe_email(matched),
        Category::IpAddress => describe_ip(matched),
        Category::InternalUrl => describe_internal_url(matched),
        Category::Name => "a person's name",
        Category::Phone => "a phone number",
        Category::Ssn => "a social security number",
        Category::CreditCard => "a credit card number",
        Category::ApiKey if matched.contains("PRIVATE KEY") => "SSH private key credentials",
        Category::ApiKey => "an API key",
        Category::Credential => "a secret value",
        Category::BankAccount => "a bank account number",
        Category::RoutingNumber => "a bank routing number",
        Category::GovernmentId => "a government ID number",
        Category::Health => "health information",
        Category::Financial => "financial figures",
        Category::Confidential => "restricted",
        Category::ExportControl => "export-controlled technology",
        Category::Whistleblower => "a protected case reference",
        Category::Address => "a street address",
        Category::DeviceId => "a device identifier",
        // Override attempts are dropped from the rewrite entirely.
        Category::JailbreakPattern => "",
        Category::Custom => "sensitive information",
    }
}

fn describe_email(email: &str) -> &'static str {
    let domain = email
        .rsplit_once('@')
        .map(|(_, d)| d.to_ascii_lowercase())
        .unwrap_or_default();

    if domain
        .split('.')
        .any(|label| PERSONAL_MAIL_PROVIDERS.contains(&label))
    {
        "a personal email address"
    } else if CORPORATE_MAIL_MARKERS.iter().any(|m| domain.contains(m)) {
        "a corporate email address"
    } else {
        "an email address"
    }
}

fn describe_ip(ip: &str) -> &'static str {
    let (addr, is_range) = match ip.split_once('/') {
        Some((addr, _)) => (addr, true),
        None => (ip, false),
    };
    let internal = addr
        .parse::<Ipv4Addr>()
        .map(|a| a.is_private() || a.is_loopback() || a.is_link_local())
        .unwrap_or(false);

    match (internal, is_range) {
        (true, true) => "a private network range",
        (true, false) => "an internal IP address",
        (false, true) => "a network range",
        (false, false) => "an IP address",
    }
}

fn describe_internal_url(url: &str) -> &'static str {
    let host = url
        .split_once("://")
        .map_or(url, |(_, rest)| rest)
        .to_ascii_lowercase();

    if host.starts_with("dev") {
        "a development environment URL"
    } else if host.starts_with("staging") {
        "a staging environment URL"
    } else if host.starts_with("admin") {
        "an admin panel URL"
    } else {
        "an internal system URL"
    }
}
