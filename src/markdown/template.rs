use chrono::NaiveDate;

use crate::site::{non_blank, SiteConfig};

/// Values for the `{{name}}` placeholders in legal page sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalFields {
    pub company_name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub vat_number: String,
    pub last_updated: String,
}

impl LegalFields {
    /// Company name falls back to the app name; address, email and phone
    /// fall back to the contact block; VAT number has no fallback.
    pub fn resolve(site: &SiteConfig, today: NaiveDate) -> Self {
        let legal = &site.legal;
        let pick = |chain: &[&Option<String>], default: &str| {
            chain
                .iter()
                .find_map(|v| non_blank(v))
                .unwrap_or(default)
                .to_string()
        };

        LegalFields {
            company_name: pick(&[&legal.company_name, &site.app.name], "Company Name"),
            address: pick(&[&legal.address, &site.contact.address], "Address"),
            email: pick(&[&legal.email, &site.contact.email], "email@example.com"),
            phone: pick(&[&legal.phone, &site.contact.phone], ""),
            vat_number: pick(&[&legal.vat_number], ""),
            last_updated: non_blank(&legal.last_updated)
                .map(str::to_string)
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
        }
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        let value = match name {
            "companyName" => &self.company_name,
            "address" => &self.address,
            "email" => &self.email,
            "phone" => &self.phone,
            "vatNumber" => &self.vat_number,
            "lastUpdated" => &self.last_updated,
            _ => return None,
        };
        Some(value)
    }
}

/// Replace known `{{name}}` placeholders in one left-to-right scan.
/// Unknown names and unterminated braces are copied verbatim.
pub fn substitute(source: &str, fields: &LegalFields) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match fields.lookup(name) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after[close + 2..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
    }

    #[test]
    fn fallback_chains() {
        let site = SiteConfig::from_json(
            r#"{
                "app": {"name": "Osteria"},
                "contact": {"email": "ciao@osteria.example", "phone": "011 123"}
            }"#,
        )
        .unwrap();
        let fields = LegalFields::resolve(&site, today());
        assert_eq!(fields.company_name, "Osteria");
        assert_eq!(fields.address, "Address");
        assert_eq!(fields.email, "ciao@osteria.example");
        assert_eq!(fields.phone, "011 123");
        assert_eq!(fields.vat_number, "");
        assert_eq!(fields.last_updated, "2025-03-12");
    }

    #[test]
    fn legal_block_wins() {
        let site = SiteConfig::from_json(
            r#"{
                "app": {"name": "Osteria"},
                "legal": {"companyName": "Osteria S.r.l.", "lastUpdated": "2024-01-01"}
            }"#,
        )
        .unwrap();
        let fields = LegalFields::resolve(&site, today());
        assert_eq!(fields.company_name, "Osteria S.r.l.");
        assert_eq!(fields.last_updated, "2024-01-01");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let fields = LegalFields::resolve(&SiteConfig::default(), today());
        assert_eq!(fields.company_name, "Company Name");
        assert_eq!(fields.email, "email@example.com");
    }

    #[test]
    fn substitutes_known_placeholders_only() {
        let fields = LegalFields::resolve(&SiteConfig::default(), today());
        let out = substitute("{{companyName}} ({{unknown}}) {{ email }} {{vatNumber}}.", &fields);
        assert_eq!(out, "Company Name ({{unknown}}) {{ email }} .");
    }

    #[test]
    fn repeated_and_unterminated() {
        let fields = LegalFields::resolve(&SiteConfig::default(), today());
        assert_eq!(
            substitute("{{address}}/{{address}} {{lastUpdated", &fields),
            "Address/Address {{lastUpdated"
        );
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let site = SiteConfig::from_json(r#"{"legal": {"companyName": "{{email}}"}}"#).unwrap();
        let fields = LegalFields::resolve(&site, today());
        assert_eq!(substitute("{{companyName}}", &fields), "{{email}}");
    }
}
