// src/extractors/pricing.rs

/// Billable quantity and value for one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Billing {
    pub quantity: f64,
    pub value: f64,
}

/// Contract cost wins when present; otherwise unit cost x quantity.
/// Returns `None` when the row has no positive billable value.
pub fn price(contract_value: f64, unit_cost: f64, estimated_quantity: f64) -> Option<Billing> {
    let billing = if contract_value > 0.0 {
        Billing {
            quantity: if estimated_quantity > 0.0 { estimated_quantity } else { 1.0 },
            value: contract_value,
        }
    } else if unit_cost > 0.0 && estimated_quantity > 0.0 {
        Billing {
            quantity: estimated_quantity,
            value: unit_cost * estimated_quantity,
        }
    } else {
        return None;
    };

    (billing.value > 0.0).then_some(billing)
}

/// Pass-throughs bill one unit at contract cost.
pub fn price_pass_through(contract_value: f64) -> Option<Billing> {
    (contract_value > 0.0).then_some(Billing {
        quantity: 1.0,
        value: contract_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_value_preferred() {
        assert_eq!(price(500.0, 10.0, 20.0), Some(Billing { quantity: 20.0, value: 500.0 }));
        assert_eq!(price(500.0, 10.0, 0.0), Some(Billing { quantity: 1.0, value: 500.0 }));
    }

    #[test]
    fn test_unit_cost_fallback() {
        assert_eq!(price(0.0, 10.0, 5.0), Some(Billing { quantity: 5.0, value: 50.0 }));
    }

    #[test]
    fn test_no_billable_value() {
        assert_eq!(price(0.0, 0.0, 5.0), None);
        assert_eq!(price(-100.0, 0.0, 5.0), None);
        assert_eq!(price(0.0, 10.0, -2.0), None);
        assert_eq!(price_pass_through(0.0), None);
        assert_eq!(price_pass_through(1200.0), Some(Billing { quantity: 1.0, value: 1200.0 }));
    }
}
