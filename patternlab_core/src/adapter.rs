//! The Adapter Engine - Legacy Payments Behind a Modern Interface

/// The old system, with an incompatible call shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyPaymentSystem;

impl LegacyPaymentSystem {
    pub fn process_payment(&self, amount: f64, currency: &str) -> String {
        format!("Legacy: Processing {} {}", currency, amount)
    }
}

/// The interface new code is written against.
pub trait PaymentProcessor {
    fn pay(&self, amount: f64) -> String;

    fn currency(&self) -> &str;
}

/// Fixes a currency and forwards `pay` to the legacy system.
#[derive(Debug, Clone)]
pub struct PaymentAdapter {
    legacy: LegacyPaymentSystem,
    currency: String,
}

impl PaymentAdapter {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            legacy: LegacyPaymentSystem,
            currency: currency.into(),
        }
    }
}

impl Default for PaymentAdapter {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl PaymentProcessor for PaymentAdapter {
    fn pay(&self, amount: f64) -> String {
        self.legacy.process_payment(amount, &self.currency)
    }

    fn currency(&self) -> &str {
        &self.currency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_forwards_to_legacy() {
        let adapter = PaymentAdapter::new("EUR");
        assert_eq!(adapter.pay(100.0), "Legacy: Processing EUR 100");
        assert_eq!(adapter.pay(12.5), "Legacy: Processing EUR 12.5");
        assert_eq!(adapter.currency(), "EUR");
    }

    #[test]
    fn test_default_currency() {
        let processor: Box<dyn PaymentProcessor> = Box::new(PaymentAdapter::default());
        assert_eq!(processor.currency(), "USD");
        assert_eq!(processor.pay(7.0), "Legacy: Processing USD 7");
    }
}
