//! Built-in detector table.
//!
//! Ranks are spaced by ten so a detector can be slotted between two
//! existing ones without renumbering.

use super::validate;
use super::{Category, DetectorSpec, Validator};

fn spec(
    rank: u16,
    category: Category,
    pattern: &str,
    validator: Option<Validator>,
    description: &str,
) -> DetectorSpec {
    DetectorSpec {
        name: category.as_str().to_string(),
        category,
        severity: category.default_severity(),
        rank,
        pattern: pattern.to_string(),
        validator,
        description: description.to_string(),
    }
}

/// The built-in detectors, in precedence order
pub fn builtin_detectors() -> Vec<DetectorSpec> {
    vec![
        // ---- Secrets ----
        spec(
            10,
            Category::ApiKey,
            concat!(
                r"\bsk-[A-Za-z0-9_-]{20,}",
                r"|\b(?:sk|pk|rk)_(?:live|test)_[A-Za-z0-9]{16,}",
                r"|\bAKIA[0-9A-Z]{16}\b",
                r"|\bgh[pousr]_[A-Za-z0-9]{36,}",
                r"|\bgithub_pat_[A-Za-z0-9_]{22,}",
                r"|\bAIza[0-9A-Za-z_-]{35}",
                r"|\bxox[abprs]-[A-Za-z0-9-]{10,}",
                r"|\beyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+",
                r"|-----BEGIN (?:RSA |DSA |EC |OPENSSH )?PRIVATE KEY-----",
                r"|(?i:\bbearer\s+)(?P<value>[A-Za-z0-9._~+/-]{20,}=*)",
            ),
            None,
            "Provider API keys, access tokens, JWTs and private key headers",
        ),
        spec(
            20,
            Category::Credential,
            concat!(
                r"(?i:\b(?:password|passwd|pwd|passphrase|secret|client_secret|access_token|refresh_token|api[_-]?key|credentials?)\s*[:=]\s*)",
                r"(?P<value>[^\s\[][^\s,;]*)",
                r"|\b(?:postgres(?:ql)?|mysql|mongodb(?:\+srv)?|redis|amqp)://[^\s:/@]+:[^\s@]+@[^\s]+",
            ),
            None,
            "Assigned passwords and secrets, connection strings with credentials",
        ),
        // ---- Financial identifiers ----
        spec(
            30,
            Category::CreditCard,
            r"\b(?:\d{4}[ -]?){3}\d{1,4}\b|\b3[47]\d{2}[ -]?\d{6}[ -]?\d{5}\b",
            Some(validate::luhn),
            "Payment card numbers passing the Luhn check",
        ),
        spec(
            40,
            Category::Ssn,
            r"\b\d{3}[- ]\d{2}[- ]\d{4}\b|(?i:\b(?:ssn|social security(?: number)?)\s*(?:number|no\.?|#)?\s*[:#]?\s*)(?P<value>\d{9})\b",
            Some(validate::ssn),
            "US Social Security numbers",
        ),
        // ---- Regulatory markers ----
        spec(
            50,
            Category::ExportControl,
            r"\bITAR\b|\bEAR99\b|(?i:\bexport[- ]controlled\b|\bdual[- ]use (?:item|technology|goods)\b)",
            None,
            "Export-controlled technology markers",
        ),
        spec(
            60,
            Category::Whistleblower,
            r"(?i:\b(?:whistle-?blower|insider[- ]threat)(?:\s+(?:id|case|report))?\b)(?:\s*[:#]\s*[A-Za-z0-9-]+)?",
            None,
            "Whistleblower identities and case references",
        ),
        spec(
            70,
            Category::InternalUrl,
            concat!(
                r#"\bhttps?://(?:dev|staging|internal|admin|intranet)[-.][A-Za-z0-9.-]+(?::\d+)?(?:/[^\s"'<>)\]]*)?"#,
                r#"|\bhttps?://[A-Za-z0-9.-]+\.(?:internal|corp|local|lan|intranet)\b(?::\d+)?(?:/[^\s"'<>)\]]*)?"#,
            ),
            None,
            "URLs pointing at development, staging or intranet hosts",
        ),
        spec(
            80,
            Category::BankAccount,
            concat!(
                r"(?i:\b(?:account|acct)\s*(?:number|no\.?|#)?\s*[:#]?\s*)(?P<value>\d{8,17})\b",
                r"|\b[A-Z]{2}\d{2}(?: ?[A-Z0-9]{4}){2,7}(?: ?[A-Z0-9]{1,3})?\b",
                r"|\b\d{12,17}\b",
            ),
            None,
            "Bank account numbers, IBANs and long digit runs",
        ),
        spec(
            90,
            Category::RoutingNumber,
            r"(?i:\b(?:routing|aba|rtn)\s*(?:number|no\.?|#)?\s*[:#]?\s*)(?P<value>\d{9})\b|\b\d{9}\b",
            Some(validate::routing_number),
            "ABA routing numbers passing the checksum",
        ),
        spec(
            100,
            Category::GovernmentId,
            concat!(
                r"(?i:\b(?:passport|driver'?s? licen[cs]e|licen[cs]e|tax id|ein|itin|national id)\s*(?:number|no\.?|#)?\s*[:#]?\s*)",
                r"(?P<value>[A-Z0-9][A-Z0-9-]{4,14})\b",
                r"|\b\d{2}-\d{7}\b",
            ),
            Some(validate::contains_digit),
            "Passport, licence and tax identifiers",
        ),
        // ---- Sensitive context ----
        spec(
            110,
            Category::Health,
            r"(?i)\b(?:diagnos(?:is|ed with)|prescription|medical record|patient id|treatment plan|medical history|MRN\s*\d{6,10}|RX\d{7,10})\b",
            None,
            "Protected health information markers",
        ),
        spec(
            120,
            Category::Financial,
            concat!(
                r"(?i)\$[\d,]+(?:\.\d{2})?\s*(?:million|billion|[MB]|in revenues?|revenues?|profits?|loss(?:es)?)\b",
                r"|\b(?:Q[1-4]|FY\s?\d{2,4})\s+(?:revenue|earnings|profit|forecast)\b",
                r"|\binvestment account\b",
            ),
            None,
            "Revenue figures, forecasts and investment accounts",
        ),
        spec(
            130,
            Category::Confidential,
            r"(?i)\b(?:confidential|internal[- ]only|do not distribute|trade secret|attorney[- ]client|privileged and confidential|classified)\b",
            None,
            "Confidentiality markers",
        ),
        // ---- Contact & network ----
        spec(
            140,
            Category::Email,
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            None,
            "Email addresses",
        ),
        spec(
            150,
            Category::IpAddress,
            r"\b(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)(?:/\d{1,2})?\b",
            None,
            "IPv4 addresses and CIDR ranges",
        ),
        spec(
            160,
            Category::DeviceId,
            r"\b[0-9A-Fa-f]{2}(?:[:-][0-9A-Fa-f]{2}){5}\b",
            None,
            "MAC addresses",
        ),
        spec(
            170,
            Category::Phone,
            concat!(
                r"(?:\+?\b1[-.\s]?(?:\(\d{3}\)|\d{3})|\(\d{3}\)|\b\d{3})",
                r"[-.\s]?\d{3}[-.\s]?\d{4}\b",
            ),
            None,
            "North American phone numbers",
        ),
        // ---- Prompt attacks ----
        spec(
            180,
            Category::JailbreakPattern,
            concat!(
                r"(?i)\b(?:ignore (?:all )?(?:previous|prior|above) instructions",
                r"|disregard (?:all )?(?:previous|prior|your) (?:instructions|rules|guidelines)",
                r"|you are now (?:DAN|in developer mode)",
                r"|developer mode enabled",
                r"|DAN mode",
                r"|do anything now",
                r"|pretend (?:you have|there are) no (?:restrictions|rules|filters)",
                r"|bypass (?:your |all )?(?:safety|content) (?:filters|guidelines|restrictions)",
                r"|jailbreak)\b",
            ),
            None,
            "Jailbreak and instruction-override phrasing",
        ),
        // ---- Generic personal data ----
        spec(
            190,
            Category::Address,
            r"\b\d{1,5}\s+(?:[A-Z][a-z]+\s+){1,3}(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Way|Place|Pl)\b\.?",
            None,
            "Street addresses",
        ),
        spec(
            200,
            Category::Name,
            r"\b[A-Z][a-z]+ [A-Z][a-z]+\b",
            Some(validate::person_name),
            "Capitalized first and last names",
        ),
    ]
}
