//! Tantivy schema for comic metadata documents
//!
//! One document per comic. `key` carries the decimal comic number as an
//! untokenized term so a re-index can delete the previous version before
//! adding the new one. The four text fields share an English-stemming
//! analyzer; `img` and `published` are stored for display only.

use std::collections::BTreeSet;

use tantivy::{
    schema::{
        FieldType, Field, IndexRecordOption, NumericOptions, STORED, STRING, Schema,
        TextFieldIndexing, TextOptions,
    },
    tokenizer::{
        AlphaNumOnlyFilter, Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer,
        TextAnalyzer, TokenizerManager,
    },
};

/// Analyzer shared by every searchable comic field
pub const COMIC_TEXT_TOKENIZER: &str = "comic_text";

/// Tokens longer than this are dropped (URLs pasted into transcripts, etc.)
const MAX_TOKEN_LEN: usize = 40;

/// Relative weight of a title match against alt text and transcript
pub const TITLE_BOOST: f32 = 2.0;

/// Every field the index carries, with its expected tantivy type
const FIELD_TYPES: &[(&str, &str)] = &[
    ("key", "Text"),
    ("num", "U64"),
    ("title", "Text"),
    ("safe_title", "Text"),
    ("alt", "Text"),
    ("transcript", "Text"),
    ("img", "Text"),
    ("published", "Text"),
];

/// Fields that must be tokenized for full-text matching
const SEARCHABLE_FIELDS: &[&str] = &["title", "safe_title", "alt", "transcript"];

/// Comic document schema with resolved field handles
#[derive(Debug, Clone)]
pub struct ComicSchema {
    pub schema: Schema,
    pub key: Field,
    pub num: Field,
    pub title: Field,
    pub safe_title: Field,
    pub alt: Field,
    pub transcript: Field,
    pub img: Field,
    pub published: Field,
}

/// Reasons an on-disk schema cannot be used as a comic schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Field '{field}' not found in schema")]
    FieldNotFound { field: String },

    #[error("Unexpected field '{field}' in schema")]
    UnexpectedField { field: String },

    #[error("Incompatible field type for '{field}': expected {expected}, found {found}")]
    IncompatibleFieldType {
        field: String,
        expected: String,
        found: String,
    },

    #[error("Field '{field}' configuration error: {details}")]
    FieldConfiguration { field: String, details: String },
}

impl ComicSchema {
    /// Build the schema used for newly created indexes
    #[must_use]
    pub fn build() -> Self {
        let mut builder = Schema::builder();

        let text_options = TextOptions::default().set_stored().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(COMIC_TEXT_TOKENIZER)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        );

        let key = builder.add_text_field("key", STRING | STORED);
        let num = builder.add_u64_field(
            "num",
            NumericOptions::default()
                .set_indexed()
                .set_stored()
                .set_fast(),
        );
        let title = builder.add_text_field("title", text_options.clone());
        let safe_title = builder.add_text_field("safe_title", text_options.clone());
        let alt = builder.add_text_field("alt", text_options.clone());
        let transcript = builder.add_text_field("transcript", text_options);
        let img = builder.add_text_field("img", STORED);
        let published = builder.add_text_field("published", STORED);

        Self {
            schema: builder.build(),
            key,
            num,
            title,
            safe_title,
            alt,
            transcript,
            img,
            published,
        }
    }

    /// Resolve field handles from an existing index schema.
    ///
    /// # Errors
    ///
    /// Fails when the field set differs from [`ComicSchema::build`] or a field
    /// has the wrong type or indexing options.
    pub fn from_schema(schema: &Schema) -> Result<Self, SchemaError> {
        validate_field_set(schema)?;
        validate_field_types(schema)?;
        validate_indexing_options(schema)?;

        let field = |name: &str| {
            schema.get_field(name).map_err(|_| SchemaError::FieldNotFound {
                field: name.to_string(),
            })
        };

        Ok(Self {
            schema: schema.clone(),
            key: field("key")?,
            num: field("num")?,
            title: field("title")?,
            safe_title: field("safe_title")?,
            alt: field("alt")?,
            transcript: field("transcript")?,
            img: field("img")?,
            published: field("published")?,
        })
    }

    /// Register the comic analyzer with an index's tokenizer manager.
    ///
    /// Must run for every opened index: tokenizers are not persisted.
    pub fn register_tokenizers(tokenizer_manager: &TokenizerManager) {
        let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
            .filter(LowerCaser)
            .filter(AlphaNumOnlyFilter)
            .filter(Stemmer::new(Language::English))
            .build();

        tokenizer_manager.register(COMIC_TEXT_TOKENIZER, analyzer);
    }

    /// Searchable fields with their query boost
    #[must_use]
    pub fn searchable_fields(&self) -> [(Field, f32); 4] {
        [
            (self.title, TITLE_BOOST),
            (self.safe_title, 1.0),
            (self.alt, 1.0),
            (self.transcript, 1.0),
        ]
    }
}

fn validate_field_set(schema: &Schema) -> Result<(), SchemaError> {
    let expected: BTreeSet<&str> = FIELD_TYPES.iter().map(|(name, _)| *name).collect();
    let actual: BTreeSet<&str> = schema.fields().map(|(_, entry)| entry.name()).collect();

    if let Some(missing) = expected.difference(&actual).next() {
        return Err(SchemaError::FieldNotFound {
            field: (*missing).to_string(),
        });
    }
    if let Some(extra) = actual.difference(&expected).next() {
        return Err(SchemaError::UnexpectedField {
            field: (*extra).to_string(),
        });
    }
    Ok(())
}

fn validate_field_types(schema: &Schema) -> Result<(), SchemaError> {
    for (name, expected) in FIELD_TYPES {
        let Ok(field) = schema.get_field(name) else {
            continue;
        };
        let found = match schema.get_field_entry(field).field_type() {
            FieldType::Str(_) => "Text",
            FieldType::U64(_) => "U64",
            FieldType::I64(_) => "I64",
            FieldType::F64(_) => "F64",
            FieldType::Date(_) => "Date",
            _ => "Other",
        };
        if found != *expected {
            return Err(SchemaError::IncompatibleFieldType {
                field: (*name).to_string(),
                expected: (*expected).to_string(),
                found: found.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_indexing_options(schema: &Schema) -> Result<(), SchemaError> {
    for name in SEARCHABLE_FIELDS {
        let Ok(field) = schema.get_field(name) else {
            continue;
        };
        if let FieldType::Str(options) = schema.get_field_entry(field).field_type() {
            let tokenizer = options.get_indexing_options().map(TextFieldIndexing::tokenizer);
            if tokenizer != Some(COMIC_TEXT_TOKENIZER) {
                return Err(SchemaError::FieldConfiguration {
                    field: (*name).to_string(),
                    details: format!("expected tokenizer '{COMIC_TEXT_TOKENIZER}'"),
                });
            }
            if !options.is_stored() {
                return Err(SchemaError::FieldConfiguration {
                    field: (*name).to_string(),
                    details: "text field must be stored for retrieval".to_string(),
                });
            }
        }
    }

    if let Ok(field) = schema.get_field("key")
        && let FieldType::Str(options) = schema.get_field_entry(field).field_type()
        && options.get_indexing_options().is_none()
    {
        return Err(SchemaError::FieldConfiguration {
            field: "key".to_string(),
            details: "key must be indexed for delete-by-term".to_string(),
        });
    }

    Ok(())
}
