//! Custom field validators for request payloads

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::domain::value_objects::Money;

const MAX_DECIMAL_PLACES: u32 = 2;
const MAX_PRICE_DIGITS: u32 = 8;

fn invalid(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

fn check_decimal_places(value: &Decimal) -> Result<(), ValidationError> {
    if value.normalize().scale() > MAX_DECIMAL_PLACES {
        return Err(invalid("max_decimal_places", format!("Ensure that there are no more than {MAX_DECIMAL_PLACES} decimal places.")));
    }
    Ok(())
}

/// Non-negative, two decimal places, fits `NUMERIC(10, 2)`.
pub fn validate_price(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("min_value", "Ensure this value is greater than or equal to 0.".to_string()));
    }
    check_decimal_places(value)?;
    let digits = Money::saturating(*value).integer_digits();
    if digits > MAX_PRICE_DIGITS {
        return Err(invalid("max_whole_digits", format!("Ensure that there are no more than {MAX_PRICE_DIGITS} digits before the decimal point.")));
    }
    Ok(())
}

/// A frozen order total must fit the same `NUMERIC(10, 2)` column shape as a price.
pub fn validate_order_total(total: &Money) -> Result<(), ValidationError> {
    if total.integer_digits() > MAX_PRICE_DIGITS {
        return Err(invalid("max_total", format!("Ensure the order total has no more than {MAX_PRICE_DIGITS} digits before the decimal point.")));
    }
    Ok(())
}

/// Between 0 and 100 inclusive, two decimal places.
pub fn validate_percentage(value: &Decimal) -> Result<(), ValidationError> {
    validate_percentage_up_to(value, Decimal::ONE_HUNDRED)
}

pub fn validate_percentage_up_to(value: &Decimal, max: Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("min_value", "Ensure this value is greater than or equal to 0.".to_string()));
    }
    if *value > max {
        return Err(invalid("max_value", format!("Ensure this value is less than or equal to {max}.")));
    }
    check_decimal_places(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(19.99), true)]
    #[case(dec!(10.500), true)]
    #[case(dec!(99999999.99), true)]
    #[case(dec!(-0.01), false)]
    #[case(dec!(1.999), false)]
    #[case(dec!(100000000), false)]
    fn price_rules(#[case] value: Decimal, #[case] ok: bool) {
        assert_eq!(validate_price(&value).is_ok(), ok);
    }

    #[rstest]
    #[case(dec!(0.00), true)]
    #[case(dec!(99999999.99), true)]
    #[case(dec!(100000000.00), false)]
    #[case(dec!(214748364678525163.53), false)]
    fn order_total_rules(#[case] total: Decimal, #[case] ok: bool) {
        assert_eq!(validate_order_total(&Money::new(total).unwrap()).is_ok(), ok);
    }

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(50), true)]
    #[case(dec!(50.01), false)]
    #[case(dec!(-1), false)]
    fn capped_percentage(#[case] value: Decimal, #[case] ok: bool) {
        assert_eq!(validate_percentage_up_to(&value, dec!(50)).is_ok(), ok);
    }

    #[test]
    fn percentage_message_names_the_cap() {
        let err = validate_percentage_up_to(&dec!(75), dec!(50)).unwrap_err();
        assert_eq!(err.code, "max_value");
        assert_eq!(err.message.unwrap(), "Ensure this value is less than or equal to 50.");
    }
}
