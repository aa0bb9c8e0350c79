/// A monetary figure as printed on invoices and in emails.
#[derive(Debug, Clone, Copy)]
pub struct Money {
    pub amount: f64,
}

impl Money {
    pub fn new(amount: f64) -> Self {
        Money { amount }
    }

    /// Two decimals with thousands separators, e.g. `1,234.50`.
    pub fn format(&self) -> String {
        if !self.amount.is_finite() {
            return self.amount.to_string();
        }

        let formatted = format!("{:.2}", self.amount.abs());
        let (integer, decimal) = formatted
            .split_once('.')
            .unwrap_or((formatted.as_str(), "00"));

        let mut result = String::new();
        for (i, c) in integer.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }

        let sign = if self.amount < 0.0 && formatted != "0.00" { "-" } else { "" };
        format!("{}{}.{}", sign, result.chars().rev().collect::<String>(), decimal)
    }
}
