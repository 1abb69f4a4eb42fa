use crate::property::PropertyId;
use crate::selection::filter::Filterable;
use crate::value::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub property: PropertyId,
    pub order: SortOrder,
}

/// Properties to order results by, most significant first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortRequest {
    fields: Vec<SortField>,
}

impl SortRequest {
    pub fn new(fields: impl IntoIterator<Item = SortField>) -> Self { Self { fields: fields.into_iter().collect() } }

    pub fn ascending(mut self, property: impl Into<PropertyId>) -> Self {
        self.fields.push(SortField { property: property.into(), order: SortOrder::Ascending });
        self
    }

    pub fn descending(mut self, property: impl Into<PropertyId>) -> Self {
        self.fields.push(SortField { property: property.into(), order: SortOrder::Descending });
        self
    }

    pub fn fields(&self) -> &[SortField] { &self.fields }

    pub fn property_ids(&self) -> impl Iterator<Item = &PropertyId> + '_ { self.fields.iter().map(|field| &field.property) }
}

/// Stable sort of `items` by the fields of `sort`.
///
/// A missing value sorts before any present one. Values of kinds with no ordering between them
/// fall back to comparing their text.
pub fn sort_resources<T: Filterable>(items: &mut [T], sort: &SortRequest) {
    items.sort_by(|a, b| {
        for field in sort.fields() {
            let a_val = a.value(&field.property);
            let b_val = b.value(&field.property);

            let cmp = match field.order {
                SortOrder::Ascending => compare_values(a_val.as_ref(), b_val.as_ref()),
                SortOrder::Descending => compare_values(b_val.as_ref(), a_val.as_ref()),
            };

            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    });
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare_with(b).unwrap_or_else(|| a.to_string().cmp(&b.to_string())),
    }
}
