//! Built-in constraint types.

use crate::expr::InternalValue;
use crate::meta::{
    ConstraintTypeInfo, MetaInformationRegistry, PropertySpecification, PropertyValues,
};
use crate::types::ValueType;

use super::validators;

pub(super) fn register(registry: &mut MetaInformationRegistry) {
    registry.register_constraint_type(
        ConstraintTypeInfo::new("AllowlistConstraint", ValueType::TEXT, allowlist)
            .with_docs("The value must be one of the listed texts.")
            .with_property(
                "allowlist",
                PropertySpecification::new(ValueType::collection(ValueType::TEXT)),
            ),
    );

    registry.register_constraint_type(
        ConstraintTypeInfo::new("DenylistConstraint", ValueType::TEXT, denylist)
            .with_docs("The value must not be one of the listed texts.")
            .with_property(
                "denylist",
                PropertySpecification::new(ValueType::collection(ValueType::TEXT)),
            ),
    );

    registry.register_constraint_type(
        ConstraintTypeInfo::new("RegexConstraint", ValueType::TEXT, regex)
            .with_docs("The value must match the regular expression.")
            .with_property("regex", PropertySpecification::new(ValueType::REGEX)),
    );

    registry.register_constraint_type(
        ConstraintTypeInfo::new("LengthConstraint", ValueType::TEXT, length)
            .with_docs("The number of characters must lie between minLength and maxLength.")
            .with_property(
                "minLength",
                PropertySpecification::new(ValueType::INTEGER)
                    .with_default(InternalValue::Integer(0))
                    .with_validator(validators::non_negative),
            )
            .with_property(
                "maxLength",
                PropertySpecification::new(ValueType::INTEGER)
                    .with_default(InternalValue::Integer(i64::MAX))
                    .with_validator(validators::non_negative),
            )
            .with_body_validator(validators::length_bounds),
    );

    registry.register_constraint_type(
        ConstraintTypeInfo::new("RangeConstraint", ValueType::DECIMAL, range)
            .with_docs("The number must lie between lowerBound and upperBound.")
            .with_property("lowerBound", PropertySpecification::new(ValueType::DECIMAL))
            .with_property(
                "lowerBoundInclusive",
                PropertySpecification::new(ValueType::BOOLEAN)
                    .with_default(InternalValue::Boolean(true)),
            )
            .with_property("upperBound", PropertySpecification::new(ValueType::DECIMAL))
            .with_property(
                "upperBoundInclusive",
                PropertySpecification::new(ValueType::BOOLEAN)
                    .with_default(InternalValue::Boolean(true)),
            )
            .with_body_validator(validators::range_bounds),
    );
}

/* ===================== Executors ===================== */

fn listed(value: &InternalValue, values: &PropertyValues<'_>, property: &str) -> Option<bool> {
    let text = value.as_text()?;
    let list = values.collection(property)?;
    Some(list.iter().any(|item| item.as_text() == Some(text)))
}

fn allowlist(value: &InternalValue, values: &PropertyValues<'_>) -> bool {
    listed(value, values, "allowlist").unwrap_or(false)
}

fn denylist(value: &InternalValue, values: &PropertyValues<'_>) -> bool {
    listed(value, values, "denylist").is_some_and(|found| !found)
}

fn regex(value: &InternalValue, values: &PropertyValues<'_>) -> bool {
    let (Some(text), Some(InternalValue::Regex(regex))) = (value.as_text(), values.value("regex"))
    else {
        return false;
    };
    regex.regex().is_match(text)
}

fn length(value: &InternalValue, values: &PropertyValues<'_>) -> bool {
    let Some(text) = value.as_text() else {
        return false;
    };
    let length = i64::try_from(text.chars().count()).unwrap_or(i64::MAX);
    let min = values.integer("minLength").unwrap_or(0);
    let max = values.integer("maxLength").unwrap_or(i64::MAX);
    (min..=max).contains(&length)
}

fn range(value: &InternalValue, values: &PropertyValues<'_>) -> bool {
    let (Some(number), Some(lower), Some(upper)) = (
        value.as_decimal(),
        values.decimal("lowerBound"),
        values.decimal("upperBound"),
    ) else {
        return false;
    };
    let lower_inclusive = values.boolean("lowerBoundInclusive").unwrap_or(true);
    let upper_inclusive = values.boolean("upperBoundInclusive").unwrap_or(true);
    let above_lower = if lower_inclusive {
        number >= lower
    } else {
        number > lower
    };
    let below_upper = if upper_inclusive {
        number <= upper
    } else {
        number < upper
    };
    above_lower && below_upper
}
