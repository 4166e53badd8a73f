//! Static currency reference data keyed by country code

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyDescriptor {
    pub code: &'static str,
    pub symbol: &'static str,
    #[serde(rename = "currency")]
    pub display_name: &'static str,
}

const fn cur(
    code: &'static str,
    symbol: &'static str,
    display_name: &'static str,
) -> CurrencyDescriptor {
    CurrencyDescriptor {
        code,
        symbol,
        display_name,
    }
}

const CURRENCIES: &[(&str, CurrencyDescriptor)] = &[
    ("AE", cur("AED", "د.إ", "United Arab Emirates Dirham")),
    ("AR", cur("ARS", "$", "Argentine Peso")),
    ("AT", cur("EUR", "€", "Euro")),
    ("AU", cur("AUD", "A$", "Australian Dollar")),
    ("BD", cur("BDT", "৳", "Bangladeshi Taka")),
    ("BE", cur("EUR", "€", "Euro")),
    ("BG", cur("BGN", "лв", "Bulgarian Lev")),
    ("BH", cur("BHD", ".د.ب", "Bahraini Dinar")),
    ("BR", cur("BRL", "R$", "Brazilian Real")),
    ("BW", cur("BWP", "P", "Botswana Pula")),
    ("CA", cur("CAD", "C$", "Canadian Dollar")),
    ("CH", cur("CHF", "CHF", "Swiss Franc")),
    ("CI", cur("XOF", "CFA", "West African CFA Franc")),
    ("CL", cur("CLP", "$", "Chilean Peso")),
    ("CM", cur("XAF", "FCFA", "Central African CFA Franc")),
    ("CN", cur("CNY", "¥", "Chinese Yuan")),
    ("CO", cur("COP", "$", "Colombian Peso")),
    ("CZ", cur("CZK", "Kč", "Czech Koruna")),
    ("DE", cur("EUR", "€", "Euro")),
    ("DK", cur("DKK", "kr", "Danish Krone")),
    ("DZ", cur("DZD", "د.ج", "Algerian Dinar")),
    ("EG", cur("EGP", "E£", "Egyptian Pound")),
    ("ES", cur("EUR", "€", "Euro")),
    ("ET", cur("ETB", "Br", "Ethiopian Birr")),
    ("FI", cur("EUR", "€", "Euro")),
    ("FR", cur("EUR", "€", "Euro")),
    ("GB", cur("GBP", "£", "British Pound Sterling")),
    ("GH", cur("GHS", "GH₵", "Ghanaian Cedi")),
    ("GR", cur("EUR", "€", "Euro")),
    ("HK", cur("HKD", "HK$", "Hong Kong Dollar")),
    ("HU", cur("HUF", "Ft", "Hungarian Forint")),
    ("ID", cur("IDR", "Rp", "Indonesian Rupiah")),
    ("IE", cur("EUR", "€", "Euro")),
    ("IL", cur("ILS", "₪", "Israeli New Shekel")),
    ("IN", cur("INR", "₹", "Indian Rupee")),
    ("IS", cur("ISK", "kr", "Icelandic Króna")),
    ("IT", cur("EUR", "€", "Euro")),
    ("JM", cur("JMD", "J$", "Jamaican Dollar")),
    ("JO", cur("JOD", "JD", "Jordanian Dinar")),
    ("JP", cur("JPY", "¥", "Japanese Yen")),
    ("KE", cur("KES", "KSh", "Kenyan Shilling")),
    ("KR", cur("KRW", "₩", "South Korean Won")),
    ("KW", cur("KWD", "KD", "Kuwaiti Dinar")),
    ("KZ", cur("KZT", "₸", "Kazakhstani Tenge")),
    ("LK", cur("LKR", "Rs", "Sri Lankan Rupee")),
    ("MA", cur("MAD", "DH", "Moroccan Dirham")),
    ("MX", cur("MXN", "Mex$", "Mexican Peso")),
    ("MY", cur("MYR", "RM", "Malaysian Ringgit")),
    ("NG", cur("NGN", "₦", "Nigerian Naira")),
    ("NL", cur("EUR", "€", "Euro")),
    ("NO", cur("NOK", "kr", "Norwegian Krone")),
    ("NP", cur("NPR", "Rs", "Nepalese Rupee")),
    ("NZ", cur("NZD", "NZ$", "New Zealand Dollar")),
    ("OM", cur("OMR", "ر.ع.", "Omani Rial")),
    ("PE", cur("PEN", "S/", "Peruvian Sol")),
    ("PH", cur("PHP", "₱", "Philippine Peso")),
    ("PK", cur("PKR", "Rs", "Pakistani Rupee")),
    ("PL", cur("PLN", "zł", "Polish Złoty")),
    ("PT", cur("EUR", "€", "Euro")),
    ("QA", cur("QAR", "QR", "Qatari Riyal")),
    ("RO", cur("RON", "lei", "Romanian Leu")),
    ("RS", cur("RSD", "дин.", "Serbian Dinar")),
    ("RU", cur("RUB", "₽", "Russian Ruble")),
    ("RW", cur("RWF", "FRw", "Rwandan Franc")),
    ("SA", cur("SAR", "SR", "Saudi Riyal")),
    ("SE", cur("SEK", "kr", "Swedish Krona")),
    ("SG", cur("SGD", "S$", "Singapore Dollar")),
    ("SN", cur("XOF", "CFA", "West African CFA Franc")),
    ("TH", cur("THB", "฿", "Thai Baht")),
    ("TN", cur("TND", "DT", "Tunisian Dinar")),
    ("TR", cur("TRY", "₺", "Turkish Lira")),
    ("TW", cur("TWD", "NT$", "New Taiwan Dollar")),
    ("TZ", cur("TZS", "TSh", "Tanzanian Shilling")),
    ("UA", cur("UAH", "₴", "Ukrainian Hryvnia")),
    ("UG", cur("UGX", "USh", "Ugandan Shilling")),
    ("US", cur("USD", "$", "United States Dollar")),
    ("UY", cur("UYU", "$U", "Uruguayan Peso")),
    ("VN", cur("VND", "₫", "Vietnamese Đồng")),
    ("ZA", cur("ZAR", "R", "South African Rand")),
    ("ZM", cur("ZMW", "ZK", "Zambian Kwacha")),
];

/// Descriptor for the currency used in `country` (ISO-3166 alpha-2).
pub fn by_country(country: &str) -> Option<&'static CurrencyDescriptor> {
    let country = country.to_uppercase();
    CURRENCIES
        .iter()
        .find(|(c, _)| *c == country)
        .map(|(_, descriptor)| descriptor)
}

/// First descriptor whose currency code is `code`.
pub fn by_currency(code: &str) -> Option<&'static CurrencyDescriptor> {
    let code = code.to_uppercase();
    CURRENCIES
        .iter()
        .map(|(_, descriptor)| descriptor)
        .find(|descriptor| descriptor.code == code)
}

/// The full table, ordered by country code.
pub fn all() -> BTreeMap<&'static str, &'static CurrencyDescriptor> {
    CURRENCIES.iter().map(|(c, d)| (*c, d)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_country_is_case_insensitive() {
        let usd = by_country("us").unwrap();
        assert_eq!(usd.code, "USD");
        assert_eq!(usd.symbol, "$");
        assert!(by_country("XX").is_none());
    }

    #[test]
    fn test_lookup_by_currency_code() {
        let eur = by_currency("eur").unwrap();
        assert_eq!(eur.symbol, "€");
        assert_eq!(eur.display_name, "Euro");
        assert!(by_currency("ZZZ").is_none());
    }

    #[test]
    fn test_descriptor_wire_format() {
        let json = serde_json::to_value(by_country("JP").unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": "JPY", "symbol": "¥", "currency": "Japanese Yen"})
        );
    }

    #[test]
    fn test_table_has_unique_countries() {
        assert_eq!(all().len(), CURRENCIES.len());
    }
}
