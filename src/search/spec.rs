//! Canonical, validated query intent.
//!
//! A `FilterSpecification` is built once per request, either by the request
//! parsing layer or by the Apollo URL mapper, and is immutable afterwards.
//! Validation happens at construction: a predicate must match its field's
//! catalog kind, and empty values are dropped rather than carried as no-ops.

use crate::schema::{FilterField, FilterKind};
use crate::{Error, Result};

/// How a text filter value is compared against the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMatchMode {
    /// Case-insensitive containment (default).
    #[default]
    Substring,
    /// Word-order-insensitive equality: both sides are tokenized, the tokens
    /// sorted and rejoined before comparison. Exact word-set equality.
    WordOrder,
    /// "Jumble" match: every word of the filter phrase must appear somewhere
    /// in the column value, in any order.
    WordSet,
}

/// A predicate bound to a single catalog field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    Text {
        values: Vec<String>,
        mode: TextMatchMode,
    },
    Range {
        min: Option<i64>,
        max: Option<i64>,
    },
    Array {
        values: Vec<String>,
        /// true = every value must be an element; false = any value suffices.
        match_all: bool,
    },
    Domain {
        domains: Vec<String>,
    },
}

impl FilterPredicate {
    pub fn text(values: Vec<String>) -> Self {
        Self::Text {
            values,
            mode: TextMatchMode::Substring,
        }
    }

    pub fn text_with_mode(values: Vec<String>, mode: TextMatchMode) -> Self {
        Self::Text { values, mode }
    }

    pub fn range(min: Option<i64>, max: Option<i64>) -> Self {
        Self::Range { min, max }
    }

    pub fn array_any(values: Vec<String>) -> Self {
        Self::Array {
            values,
            match_all: false,
        }
    }

    pub fn array_all(values: Vec<String>) -> Self {
        Self::Array {
            values,
            match_all: true,
        }
    }

    pub fn domains(domains: Vec<String>) -> Self {
        Self::Domain { domains }
    }

    fn kind(&self) -> FilterKind {
        match self {
            Self::Text { .. } => FilterKind::Text,
            Self::Range { .. } => FilterKind::Range,
            Self::Array { .. } => FilterKind::Array,
            Self::Domain { .. } => FilterKind::Domain,
        }
    }

    /// Drop empty values; a predicate left with nothing to match is absent.
    fn pruned(self) -> Option<Self> {
        match self {
            Self::Text { values, mode } => {
                let values: Vec<String> = values
                    .into_iter()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect();
                (!values.is_empty()).then_some(Self::Text { values, mode })
            }
            Self::Range { min, max } => {
                (min.is_some() || max.is_some()).then_some(Self::Range { min, max })
            }
            Self::Array { values, match_all } => {
                let values: Vec<String> = values
                    .into_iter()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect();
                (!values.is_empty()).then_some(Self::Array { values, match_all })
            }
            Self::Domain { domains } => {
                let domains: Vec<String> = domains
                    .into_iter()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect();
                (!domains.is_empty()).then_some(Self::Domain { domains })
            }
        }
    }
}

/// An active filter occurrence. Repeating a field ANDs the occurrences.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveFilter {
    pub field: FilterField,
    pub predicate: FilterPredicate,
}

/// An exclusion set: rows matching any of the values are filtered out.
/// NULL columns pass exclusions (documented policy, see the compiler).
#[derive(Debug, Clone, PartialEq)]
pub struct Exclusion {
    pub field: FilterField,
    pub values: Vec<String>,
}

/// Sort specification. The field name is resolved against the catalog at
/// compile time; an unknown name is a validation error there.
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub field: String,
    pub ascending: bool,
}

/// Pagination intent: an explicit offset or an opaque cursor, plus page size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pagination {
    pub page_size: Option<usize>,
    pub offset: Option<u64>,
    pub cursor: Option<String>,
}

/// The canonical, validated query intent consumed by the planner and compiler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpecification {
    filters: Vec<ActiveFilter>,
    exclusions: Vec<Exclusion>,
    free_text: Option<String>,
    sort: Option<SortSpec>,
    pagination: Pagination,
}

impl FilterSpecification {
    pub fn builder() -> FilterSpecificationBuilder {
        FilterSpecificationBuilder::default()
    }

    pub fn filters(&self) -> &[ActiveFilter] {
        &self.filters
    }

    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    pub fn free_text(&self) -> Option<&str> {
        self.free_text.as_deref()
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// True when nothing narrows the result set.
    pub fn is_unfiltered(&self) -> bool {
        self.filters.is_empty() && self.exclusions.is_empty() && self.free_text.is_none()
    }
}

/// Builder enforcing the field-catalog invariants at construction time.
#[derive(Debug, Default)]
pub struct FilterSpecificationBuilder {
    spec: FilterSpecification,
}

impl FilterSpecificationBuilder {
    /// Bind a predicate to a field. Fails if the predicate does not match the
    /// field's catalog kind.
    pub fn filter(mut self, field: FilterField, predicate: FilterPredicate) -> Result<Self> {
        if predicate.kind() != field.kind() {
            return Err(Error::Validation(format!(
                "Filter kind {:?} is not valid for field {:?} (expected {:?})",
                predicate.kind(),
                field,
                field.kind()
            )));
        }
        if matches!(&predicate, FilterPredicate::Text { mode, .. }
            if *mode != TextMatchMode::Substring && field != FilterField::Title)
        {
            return Err(Error::Validation(format!(
                "Match mode is only selectable for the title field, not {field:?}"
            )));
        }
        if let Some(predicate) = predicate.pruned() {
            self.spec.filters.push(ActiveFilter { field, predicate });
        }
        Ok(self)
    }

    /// Add an exclusion set. Only text, array and domain fields can be
    /// excluded; excluding a numeric range has no defined meaning.
    pub fn exclude(mut self, field: FilterField, values: Vec<String>) -> Result<Self> {
        if field.kind() == FilterKind::Range {
            return Err(Error::Validation(format!(
                "Field {field:?} cannot appear in an exclusion set"
            )));
        }
        let values: Vec<String> = values
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if !values.is_empty() {
            self.spec.exclusions.push(Exclusion { field, values });
        }
        Ok(self)
    }

    pub fn free_text(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let term = term.trim();
        self.spec.free_text = (!term.is_empty()).then(|| term.to_string());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, ascending: bool) -> Self {
        self.spec.sort = Some(SortSpec {
            field: field.into(),
            ascending,
        });
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.spec.pagination.page_size = Some(page_size);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.spec.pagination.offset = Some(offset);
        self
    }

    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.spec.pagination.cursor = Some(cursor.into());
        self
    }

    pub fn build(self) -> FilterSpecification {
        self.spec
    }
}
