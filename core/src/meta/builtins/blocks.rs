//! Built-in block types.

use crate::expr::{InternalValue, RegexValue};
use crate::meta::{BlockTypeInfo, IoType, MetaInformationRegistry, PropertySpecification};
use crate::types::ValueType;

use super::validators;

/// Upper bound for open line ranges
const MAX_LINE: i64 = 9_007_199_254_740_991;

fn text(value: &str) -> InternalValue {
    InternalValue::Text(value.to_string())
}

pub(super) fn register(registry: &mut MetaInformationRegistry) {
    // ------------------------------------------------------------------
    // Extractors
    // ------------------------------------------------------------------
    registry.register_block_type(
        BlockTypeInfo::builtin("HttpExtractor", IoType::None, IoType::File)
            .with_docs("Fetches a file over HTTP(S).")
            .with_property(
                "url",
                PropertySpecification::new(ValueType::TEXT)
                    .with_validator(validators::non_empty_text)
                    .with_docs("The URL to fetch."),
            )
            .with_property(
                "retries",
                PropertySpecification::new(ValueType::INTEGER)
                    .with_default(InternalValue::Integer(0))
                    .with_validator(validators::non_negative),
            )
            .with_property(
                "retryBackoffMilliseconds",
                PropertySpecification::new(ValueType::INTEGER)
                    .with_default(InternalValue::Integer(2000))
                    .with_validator(validators::retry_backoff_milliseconds),
            )
            .with_property(
                "retryBackoffStrategy",
                PropertySpecification::new(ValueType::TEXT)
                    .with_default(text("exponential"))
                    .with_validator(validators::retry_backoff_strategy),
            )
            .with_property(
                "followRedirects",
                PropertySpecification::new(ValueType::BOOLEAN)
                    .with_default(InternalValue::Boolean(true)),
            ),
    );

    registry.register_block_type(
        BlockTypeInfo::builtin("LocalFileExtractor", IoType::None, IoType::File)
            .with_docs("Reads a file relative to the working directory.")
            .with_property(
                "filePath",
                PropertySpecification::new(ValueType::TEXT)
                    .with_validator(validators::file_path),
            ),
    );

    // ------------------------------------------------------------------
    // Files and text
    // ------------------------------------------------------------------
    registry.register_block_type(
        BlockTypeInfo::builtin("TextFileInterpreter", IoType::File, IoType::TextFile)
            .with_docs("Decodes a file into lines of text.")
            .with_property(
                "encoding",
                PropertySpecification::new(ValueType::TEXT)
                    .with_default(text("utf-8"))
                    .with_validator(validators::text_encoding),
            )
            .with_property("lineSeparator", line_separator()),
    );

    registry.register_block_type(
        BlockTypeInfo::builtin("TextRangeSelector", IoType::TextFile, IoType::TextFile)
            .with_docs("Keeps the lines between lineFrom and lineTo, both inclusive and 1-based.")
            .with_property(
                "lineFrom",
                PropertySpecification::new(ValueType::INTEGER)
                    .with_default(InternalValue::Integer(1))
                    .with_validator(validators::positive),
            )
            .with_property(
                "lineTo",
                PropertySpecification::new(ValueType::INTEGER)
                    .with_default(InternalValue::Integer(MAX_LINE))
                    .with_validator(validators::positive),
            )
            .with_body_validator(validators::line_range),
    );

    registry.register_block_type(
        BlockTypeInfo::builtin("TextLineDeleter", IoType::TextFile, IoType::TextFile)
            .with_docs("Deletes the given 1-based lines.")
            .with_property(
                "lines",
                PropertySpecification::new(ValueType::collection(ValueType::INTEGER))
                    .with_validator(validators::positive_elements),
            ),
    );

    registry.register_block_type(
        BlockTypeInfo::builtin("CSVInterpreter", IoType::TextFile, IoType::Sheet)
            .with_docs("Interprets text as comma separated values.")
            .with_property(
                "delimiter",
                PropertySpecification::new(ValueType::TEXT)
                    .with_default(text(","))
                    .with_validator(validators::non_empty_text),
            )
            .with_property(
                "enclosing",
                PropertySpecification::new(ValueType::TEXT).with_default(text("\"")),
            )
            .with_property(
                "enclosingEscape",
                PropertySpecification::new(ValueType::TEXT).with_default(text("\"")),
            ),
    );

    registry.register_block_type(
        BlockTypeInfo::builtin("ArchiveInterpreter", IoType::File, IoType::FileSystem)
            .with_docs("Unpacks an archive into a file system.")
            .with_property(
                "archiveType",
                PropertySpecification::new(ValueType::TEXT)
                    .with_validator(validators::archive_type),
            ),
    );

    registry.register_block_type(
        BlockTypeInfo::builtin("FilePicker", IoType::FileSystem, IoType::File)
            .with_docs("Picks one file from a file system.")
            .with_property(
                "path",
                PropertySpecification::new(ValueType::TEXT)
                    .with_validator(validators::non_empty_text),
            ),
    );

    // ------------------------------------------------------------------
    // Sheets
    // ------------------------------------------------------------------
    registry.register_block_type(
        BlockTypeInfo::builtin("CellRangeSelector", IoType::Sheet, IoType::Sheet)
            .with_docs("Keeps only the selected cell range.")
            .with_property("select", PropertySpecification::new(ValueType::CELL_RANGE)),
    );

    registry.register_block_type(
        BlockTypeInfo::builtin("CellWriter", IoType::Sheet, IoType::Sheet)
            .with_docs("Writes values into a one-dimensional cell range.")
            .with_property(
                "write",
                PropertySpecification::new(ValueType::collection(ValueType::TEXT)),
            )
            .with_property(
                "at",
                PropertySpecification::new(ValueType::CELL_RANGE)
                    .with_validator(validators::one_dimensional_range),
            )
            .with_body_validator(validators::cells_to_write),
    );

    registry.register_block_type(
        BlockTypeInfo::builtin("ColumnDeleter", IoType::Sheet, IoType::Sheet)
            .with_docs("Deletes entire columns.")
            .with_property(
                "delete",
                PropertySpecification::new(ValueType::collection(ValueType::CELL_RANGE))
                    .with_validator(validators::whole_columns),
            ),
    );

    registry.register_block_type(
        BlockTypeInfo::builtin("RowDeleter", IoType::Sheet, IoType::Sheet)
            .with_docs("Deletes entire rows.")
            .with_property(
                "delete",
                PropertySpecification::new(ValueType::collection(ValueType::CELL_RANGE))
                    .with_validator(validators::whole_rows),
            ),
    );

    // ------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------
    registry.register_block_type(
        BlockTypeInfo::builtin("TableInterpreter", IoType::Sheet, IoType::Table)
            .with_docs("Interprets a sheet as a table with typed columns.")
            .with_property(
                "header",
                PropertySpecification::new(ValueType::BOOLEAN)
                    .with_default(InternalValue::Boolean(true)),
            )
            .with_property(
                "columns",
                PropertySpecification::new(ValueType::collection(
                    ValueType::VALUETYPE_ASSIGNMENT,
                )),
            )
            .with_body_validator(validators::unique_column_names),
    );

    registry.register_block_type(
        BlockTypeInfo::builtin("TableTransformer", IoType::Table, IoType::Table)
            .with_docs("Computes a column by applying a transform to input columns.")
            .with_property(
                "inputColumns",
                PropertySpecification::new(ValueType::collection(ValueType::TEXT)),
            )
            .with_property(
                "outputColumn",
                PropertySpecification::new(ValueType::TEXT)
                    .with_validator(validators::non_empty_text),
            )
            .with_property("uses", PropertySpecification::new(ValueType::TRANSFORM))
            .with_body_validator(validators::transform_arity),
    );

    // ------------------------------------------------------------------
    // Loaders
    // ------------------------------------------------------------------
    registry.register_block_type(
        BlockTypeInfo::builtin("SQLiteLoader", IoType::Table, IoType::None)
            .with_docs("Writes a table into a SQLite database file.")
            .with_property(
                "table",
                PropertySpecification::new(ValueType::TEXT)
                    .with_validator(validators::non_empty_text),
            )
            .with_property(
                "file",
                PropertySpecification::new(ValueType::TEXT)
                    .with_validator(validators::non_empty_text),
            )
            .with_property(
                "dropTable",
                PropertySpecification::new(ValueType::BOOLEAN)
                    .with_default(InternalValue::Boolean(true)),
            ),
    );

    registry.register_block_type(
        BlockTypeInfo::builtin("PostgresLoader", IoType::Table, IoType::None)
            .with_docs("Writes a table into a PostgreSQL database.")
            .with_property("host", PropertySpecification::new(ValueType::TEXT))
            .with_property(
                "port",
                PropertySpecification::new(ValueType::INTEGER)
                    .with_validator(validators::port_number),
            )
            .with_property("username", PropertySpecification::new(ValueType::TEXT))
            .with_property("password", PropertySpecification::new(ValueType::TEXT))
            .with_property("database", PropertySpecification::new(ValueType::TEXT))
            .with_property(
                "table",
                PropertySpecification::new(ValueType::TEXT)
                    .with_validator(validators::non_empty_text),
            ),
    );

    // ------------------------------------------------------------------
    // Formats
    // ------------------------------------------------------------------
    registry.register_block_type(
        BlockTypeInfo::builtin("GtfsRTInterpreter", IoType::File, IoType::Sheet)
            .with_docs("Interprets a GTFS-RT feed as a sheet of one entity kind.")
            .with_property(
                "entity",
                PropertySpecification::new(ValueType::TEXT)
                    .with_validator(validators::gtfs_entity),
            ),
    );
}

fn line_separator() -> PropertySpecification {
    let specification = PropertySpecification::new(ValueType::REGEX);
    match RegexValue::new(r"\r?\n") {
        Ok(regex) => specification.with_default(InternalValue::Regex(regex)),
        Err(_) => specification,
    }
}
