//! Payment gateway collaborator.
//!
//! The gateway itself is external: this module only composes the signed
//! redirect URL a resident settles a [`Transaction`] through, in the wire
//! format the VNPay gateway expects.

use std::collections::BTreeMap;

use common::DateTime;
use derive_more::{AsRef, Debug, Display, Into};
use hmac::{Hmac, Mac as _};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret as _, SecretString};
use sha2::Sha512;
use url::form_urlencoded;

use crate::domain::{Category, Transaction};

/// Gateway protocol version spoken by the [`Vnpay`] builder.
const VERSION: &str = "2.1.0";

/// Payment gateway [`Config`]uration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Gateway endpoint residents are redirected to.
    pub payment_url: String,

    /// Merchant terminal code issued by the gateway.
    pub tmn_code: String,

    /// Secret signing the redirect URLs.
    #[debug(skip)]
    pub hash_secret: SecretString,

    /// URL the gateway redirects back to after the payment.
    pub return_url: String,
}

/// Redirect URL settling a [`Transaction`] through the gateway.
#[derive(AsRef, Clone, Debug, Display, Into)]
#[as_ref(str, String)]
pub struct PaymentUrl(String);

/// VNPay redirect URL builder.
#[derive(Clone, Copy, Debug)]
pub struct Vnpay<'c> {
    /// [`Config`] of the gateway.
    config: &'c Config,
}

impl<'c> Vnpay<'c> {
    /// Creates a new [`Vnpay`] builder upon the provided [`Config`].
    #[must_use]
    pub fn new(config: &'c Config) -> Self {
        Self { config }
    }

    /// Composes the signed [`PaymentUrl`] settling the provided
    /// [`Transaction`].
    #[must_use]
    pub fn payment_url(
        &self,
        transaction: &Transaction,
        category: &Category,
    ) -> PaymentUrl {
        // The gateway charges in hundredths of a currency unit.
        let amount = (transaction.amount.amount * Decimal::ONE_HUNDRED)
            .trunc()
            .to_string();

        // `yyyyMMddHHmmss`, as the gateway expects it.
        let created_at: String = DateTime::now()
            .to_rfc3339()
            .chars()
            .filter(char::is_ascii_digit)
            .take(14)
            .collect();

        // Parameters are signed in lexicographical order of their names.
        let mut params = BTreeMap::new();
        let _ = params.insert("vnp_Amount", amount);
        let _ = params.insert("vnp_Command", "pay".to_owned());
        let _ = params.insert("vnp_CreateDate", created_at);
        let _ = params.insert(
            "vnp_CurrCode",
            transaction.amount.currency.to_string(),
        );
        let _ = params.insert("vnp_Locale", "vn".to_owned());
        let _ = params.insert(
            "vnp_OrderInfo",
            format!("Payment for {}", category.name),
        );
        let _ = params.insert("vnp_OrderType", "apartment_fee".to_owned());
        let _ =
            params.insert("vnp_ReturnUrl", self.config.return_url.clone());
        let _ = params.insert("vnp_TmnCode", self.config.tmn_code.clone());
        let _ = params.insert("vnp_TxnRef", transaction.id.to_string());
        let _ = params.insert("vnp_Version", VERSION.to_owned());

        let mut query = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &params {
            let _ = query.append_pair(name, value);
        }
        let query = query.finish();

        let signature = self.sign(&query);

        PaymentUrl(format!(
            "{}?{query}&vnp_SecureHash={signature}",
            self.config.payment_url,
        ))
    }

    /// Signs the provided query string with the configured secret.
    fn sign(&self, query: &str) -> String {
        let mut mac = Hmac::<Sha512>::new_from_slice(
            self.config.hash_secret.expose_secret().as_bytes(),
        )
        .expect("HMAC accepts keys of any length");
        mac.update(query.as_bytes());
        mac.finalize()
            .into_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{money::Currency, DateTime, Money, Percent};
    use rust_decimal::Decimal;
    use secrecy::SecretString;

    use crate::domain::{fee, payment, Category, Transaction};

    use super::{Config, Vnpay};

    fn config() -> Config {
        Config {
            payment_url: "https://sandbox.gateway.test/paymentv2/vpcpay.html"
                .to_owned(),
            tmn_code: "DEMO0001".to_owned(),
            hash_secret: SecretString::from("topsecret".to_owned()),
            return_url: "https://app.test/payment-return".to_owned(),
        }
    }

    fn category() -> Category {
        Category {
            id: fee::Id::new(),
            name: fee::Name::new("Parking fee").unwrap(),
            amount: Money {
                amount: Decimal::from(1_000_000),
                currency: Currency::Vnd,
            },
            tax: Percent::from_str("10").unwrap(),
            frequency: fee::Frequency::Monthly,
            kind: fee::Kind::Service,
            grace_period: fee::GracePeriod::default(),
            is_recurring: true,
            active: true,
            resident_id: None,
            description: None,
            created_at: DateTime::now().coerce(),
        }
    }

    fn transaction(category: &Category) -> Transaction {
        Transaction {
            id: payment::Id::new(),
            category_id: category.id,
            resident_id: crate::domain::user::Id::new(),
            amount: category.gross(),
            method: payment::Method::Vnpay,
            status: payment::Status::Pending,
            external_ref: None,
            paid_at: None,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn url_carries_the_charge_in_hundredths() {
        let category = category();
        let transaction = transaction(&category);
        let url = Vnpay::new(&config())
            .payment_url(&transaction, &category)
            .to_string();

        assert!(url.starts_with(
            "https://sandbox.gateway.test/paymentv2/vpcpay.html?",
        ));
        // 1_100_000 VND gross, charged as 110_000_000 hundredths.
        assert!(url.contains("vnp_Amount=110000000"));
        assert!(url.contains("vnp_CurrCode=VND"));
        assert!(url.contains("vnp_TmnCode=DEMO0001"));
        assert!(url.contains(&format!("vnp_TxnRef={}", transaction.id)));
        assert!(url.contains("vnp_SecureHash="));
    }

    #[test]
    fn signature_is_stable_for_identical_queries() {
        let config = config();
        let vnpay = Vnpay::new(&config);
        assert_eq!(vnpay.sign("a=1&b=2"), vnpay.sign("a=1&b=2"));
        assert_ne!(vnpay.sign("a=1&b=2"), vnpay.sign("a=1&b=3"));
    }
}
