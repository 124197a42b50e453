//! Property and body validators shared by the built-in types.

use crate::cells::RangeShape;
use crate::diagnostics::{DiagnosticLocation, ValidationAcceptor};
use crate::expr::InternalValue;
use crate::meta::PropertyValues;

/* ===================== Property validators ===================== */

pub(super) fn non_negative(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    if let Some(number) = value.as_decimal() {
        if number < 0.0 {
            acceptor.error("The value must not be negative", location);
        }
    }
}

pub(super) fn positive(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    if let Some(number) = value.as_decimal() {
        if number < 1.0 {
            acceptor.error("The value must be positive", location);
        }
    }
}

/// Every element of a collection of numbers must be positive
pub(super) fn positive_elements(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    let Some(items) = value.as_collection() else {
        return;
    };
    for (index, item) in items.iter().enumerate() {
        if item.as_decimal().is_some_and(|n| n < 1.0) {
            acceptor.error(
                format!("Line numbers start at 1, found {}", item),
                location.clone().index(index),
            );
        }
    }
}

pub(super) fn non_empty_text(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    if value.as_text().is_some_and(str::is_empty) {
        acceptor.error("The value must not be empty", location);
    }
}

fn one_of(
    value: &InternalValue,
    allowed: &[&str],
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    let Some(text) = value.as_text() else {
        return;
    };
    if !allowed.contains(&text) {
        let quoted: Vec<String> = allowed.iter().map(|a| format!("\"{}\"", a)).collect();
        acceptor.error(
            format!("The value must be one of {}", quoted.join(", ")),
            location,
        );
    }
}

pub(super) fn retry_backoff_strategy(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    one_of(value, &["exponential", "linear"], location, acceptor);
}

pub(super) fn retry_backoff_milliseconds(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    if value.as_integer().is_some_and(|ms| ms < 1000) {
        acceptor.error("The backoff must be at least 1000 milliseconds", location);
    }
}

pub(super) fn text_encoding(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    one_of(
        value,
        &["utf8", "utf-8", "utf16le", "utf-16le", "ascii", "latin1", "binary", "hex", "base64"],
        location,
        acceptor,
    );
}

pub(super) fn archive_type(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    one_of(value, &["zip", "gz"], location, acceptor);
}

pub(super) fn gtfs_entity(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    one_of(value, &["trip_update", "alert", "vehicle"], location, acceptor);
}

/// Relative paths only, no escaping upwards
pub(super) fn file_path(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    let Some(path) = value.as_text() else {
        return;
    };
    if path.split(['/', '\\']).any(|segment| segment == "..") {
        acceptor.error(
            "File path cannot include \"..\". Path traversal is restricted.",
            location,
        );
    }
}

pub(super) fn port_number(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    if value.as_integer().is_some_and(|port| !(0..=65535).contains(&port)) {
        acceptor.error("The port must be between 0 and 65535", location);
    }
}

pub(super) fn one_dimensional_range(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    if value.as_cell_range().is_some_and(|r| !r.is_one_dimensional()) {
        acceptor.error("The cell range needs to be one-dimensional", location);
    }
}

fn ranges_of_shape(
    value: &InternalValue,
    shape: RangeShape,
    message: &str,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    let Some(items) = value.as_collection() else {
        return;
    };
    for (index, item) in items.iter().enumerate() {
        if item.as_cell_range().is_some_and(|r| r.shape() != shape) {
            acceptor.error(message, location.clone().index(index));
        }
    }
}

pub(super) fn whole_columns(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    ranges_of_shape(
        value,
        RangeShape::Column,
        "An entire column needs to be selected",
        location,
        acceptor,
    );
}

pub(super) fn whole_rows(
    value: &InternalValue,
    location: DiagnosticLocation,
    acceptor: &mut ValidationAcceptor,
) {
    ranges_of_shape(
        value,
        RangeShape::Row,
        "An entire row needs to be selected",
        location,
        acceptor,
    );
}

/* ===================== Body validators ===================== */

pub(super) fn line_range(values: &PropertyValues<'_>, acceptor: &mut ValidationAcceptor) {
    let (Some(from), Some(to)) = (values.integer("lineFrom"), values.integer("lineTo")) else {
        return;
    };
    if from > to {
        acceptor.error(
            format!("lineFrom ({}) must not be greater than lineTo ({})", from, to),
            values.location("lineTo"),
        );
    }
}

/// The number of written values must match the size of the target range
pub(super) fn cells_to_write(values: &PropertyValues<'_>, acceptor: &mut ValidationAcceptor) {
    let Some(write) = values.collection("write") else {
        return;
    };
    let Some(cells) = values
        .value("at")
        .and_then(|at| at.as_cell_range().and_then(|r| r.number_of_cells()))
    else {
        return;
    };
    if write.len() != cells {
        acceptor.error(
            format!(
                "The number of values to write ({}) does not match the number of cells ({})",
                write.len(),
                cells
            ),
            values.location("write"),
        );
    }
}

pub(super) fn unique_column_names(values: &PropertyValues<'_>, acceptor: &mut ValidationAcceptor) {
    let Some(columns) = values.collection("columns") else {
        return;
    };
    let mut seen = Vec::new();
    for (index, column) in columns.iter().enumerate() {
        let InternalValue::ValuetypeAssignment { column: name, .. } = column else {
            continue;
        };
        if seen.contains(&name) {
            acceptor.error(
                format!("The column name \"{}\" needs to be unique", name),
                values.location("columns").index(index),
            );
        } else {
            seen.push(name);
        }
    }
}

/// `inputColumns` must feed exactly the `from` ports of the transform
pub(super) fn transform_arity(values: &PropertyValues<'_>, acceptor: &mut ValidationAcceptor) {
    let Some(InternalValue::TransformRef(id)) = values.value("uses") else {
        return;
    };
    let Some(columns) = values.collection("inputColumns") else {
        return;
    };
    let Some(transform) = values.model().transform(id) else {
        return;
    };
    let expected = transform.input_ports().count();
    if columns.len() != expected {
        acceptor.error(
            format!(
                "Expected {} input columns for transform \"{}\" but got {}",
                expected,
                transform.name,
                columns.len()
            ),
            values.location("inputColumns"),
        );
    }
}

pub(super) fn length_bounds(values: &PropertyValues<'_>, acceptor: &mut ValidationAcceptor) {
    let (Some(min), Some(max)) = (values.integer("minLength"), values.integer("maxLength")) else {
        return;
    };
    if min > max {
        let message = format!(
            "minLength ({}) must not be greater than maxLength ({})",
            min, max
        );
        acceptor.error(message.clone(), values.location("minLength"));
        acceptor.error(message, values.location("maxLength"));
    }
}

pub(super) fn range_bounds(values: &PropertyValues<'_>, acceptor: &mut ValidationAcceptor) {
    let (Some(lower), Some(upper)) = (values.decimal("lowerBound"), values.decimal("upperBound"))
    else {
        return;
    };
    if lower > upper {
        let message = format!(
            "lowerBound ({}) must not be greater than upperBound ({})",
            lower, upper
        );
        acceptor.error(message.clone(), values.location("lowerBound"));
        acceptor.error(message, values.location("upperBound"));
        return;
    }
    if lower == upper {
        let lower_inclusive = values.boolean("lowerBoundInclusive").unwrap_or(true);
        let upper_inclusive = values.boolean("upperBoundInclusive").unwrap_or(true);
        if !(lower_inclusive && upper_inclusive) {
            acceptor.error(
                "lowerBound and upperBound are equal, so both bounds need to be inclusive",
                values.location("lowerBound"),
            );
        }
    }
}
