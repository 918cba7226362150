//! Localized Payment Strings
//!
//! Strings come from the active language pack. Looking them up is the UI's
//! job; this type only carries what the payment workflow needs.

use serde::{Deserialize, Serialize};

/// Localized strings used by the payment workflow
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCopy {
    /// Language code driving number formatting
    pub lang: String,

    /// Popup title for failures
    pub error_title: String,

    /// Generic failure message
    pub went_wrong: String,

    /// Popup acknowledgement button
    pub button_ok: String,

    /// Coupon template with `{COUPON}` and `{AMOUNT}` placeholders
    pub coupon_applied_desc: String,

    /// Suffix for monthly amounts
    pub per_month: String,
}

impl Default for PaymentCopy {
    fn default() -> Self {
        Self {
            lang: "fr".into(),
            error_title: "Erreur".into(),
            went_wrong: "Une erreur s'est produite, veuillez réessayer.".into(),
            button_ok: "OK".into(),
            coupon_applied_desc: "Code promo {COUPON} appliqué : {AMOUNT}".into(),
            per_month: "mois".into(),
        }
    }
}

impl PaymentCopy {
    /// English strings
    pub fn english() -> Self {
        Self {
            lang: "en".into(),
            error_title: "Error".into(),
            went_wrong: "Something went wrong, please try again.".into(),
            button_ok: "OK".into(),
            coupon_applied_desc: "Coupon {COUPON} applied: {AMOUNT}".into(),
            per_month: "month".into(),
        }
    }

    /// Built-in strings for a language code, French otherwise
    pub fn for_lang(lang: &str) -> Self {
        if lang.eq_ignore_ascii_case("en") {
            Self::english()
        } else {
            Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_lang() {
        assert_eq!(PaymentCopy::for_lang("EN").lang, "en");
        assert_eq!(PaymentCopy::for_lang("fr").lang, "fr");
        assert_eq!(PaymentCopy::for_lang("de").lang, "fr");
    }

    #[test]
    fn test_parse_language_pack() {
        let copy: PaymentCopy = serde_json::from_str(
            r#"{
                "lang": "en",
                "errorTitle": "Error",
                "wentWrong": "Oops",
                "buttonOk": "Got it",
                "couponAppliedDesc": "{COUPON} gives {AMOUNT}",
                "perMonth": "mo"
            }"#,
        )
        .unwrap();
        assert_eq!(copy.button_ok, "Got it");
        assert!(copy.coupon_applied_desc.contains("{AMOUNT}"));
    }
}
