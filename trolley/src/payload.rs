//! Lenient extraction of the few fields the journey checks.
//!
//! Response bodies are parsed as untyped JSON and then narrowed into small structs. A missing
//! field or a field of the wrong type is a [StepFailure], never a panic.
use crate::StepFailure;
use serde_json::Value;

/// Catalogue identifier. Wide enough for any JSON integer, signed or unsigned.
pub type ProductId = i128;

/// The integer held by `value`. Floats, strings and booleans are not ids.
fn integer_id(value: &Value) -> Option<ProductId> {
    value
        .as_i64()
        .map(ProductId::from)
        .or_else(|| value.as_u64().map(ProductId::from))
}

/// A response body that parsed as JSON, before any shape checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Document(Value);

impl Document {
    pub fn parse(body: &[u8]) -> Result<Self, StepFailure> {
        serde_json::from_slice(body)
            .map(Document)
            .map_err(|err| StepFailure::InvalidJson(err.to_string()))
    }

    /// The `collection` array, if the document is an object that holds one.
    pub fn collection(&self) -> Option<Collection<'_>> {
        self.0
            .get("collection")
            .and_then(Value::as_array)
            .map(|items| Collection { items })
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Items of a `{ "collection": [...] }` envelope.
#[derive(Debug, Clone, Copy)]
pub struct Collection<'a> {
    items: &'a [Value],
}

impl<'a> Collection<'a> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&'a Value> {
        self.items.first()
    }
}

/// Names from `required` that `item` does not carry, in the order given. A non-object item is
/// missing every field.
pub fn missing_fields(item: &Value, required: &[&'static str]) -> Vec<&'static str> {
    match item.as_object() {
        Some(fields) => required
            .iter()
            .copied()
            .filter(|name| !fields.contains_key(*name))
            .collect(),
        None => required.to_vec(),
    }
}

/// First product of the catalogue listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogueEntry {
    pub product_id: ProductId,
}

impl CatalogueEntry {
    pub fn from_document(document: &Document) -> Result<Self, StepFailure> {
        let first = document
            .collection()
            .and_then(|collection| collection.first())
            .ok_or(StepFailure::EmptyCatalogue)?;

        first
            .get("productId")
            .and_then(integer_id)
            .map(|product_id| CatalogueEntry { product_id })
            .ok_or(StepFailure::MissingProductId)
    }
}

/// Body of the single-product endpoint. Only the identifier is inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductDetail {
    pub product_id: Option<ProductId>,
}

impl ProductDetail {
    pub fn from_document(document: &Document) -> Self {
        Self {
            product_id: document.as_value().get("productId").and_then(integer_id),
        }
    }

    pub fn expect_id(&self, expected: ProductId) -> Result<(), StepFailure> {
        if self.product_id == Some(expected) {
            Ok(())
        } else {
            Err(StepFailure::UnexpectedProductId {
                expected,
                found: self.product_id,
            })
        }
    }
}

/// Shared check for the favourites, shipping and payment listings.
pub fn validate_collection(
    document: &Document,
    required: &[&'static str],
) -> Result<(), StepFailure> {
    let first = document
        .collection()
        .and_then(|collection| collection.first())
        .ok_or(StepFailure::EmptyCollection)?;

    let missing = missing_fields(first, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StepFailure::MissingFields(missing))
    }
}
