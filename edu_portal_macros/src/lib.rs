mod document;

use proc_macro::TokenStream;

/// Derive macro that implements `edu_portal::Document`.
///
/// # Usage
///
/// ```ignore
/// use edu_portal::{Document, Timestamp};
///
/// #[derive(Clone, Serialize, Deserialize, Document)]
/// #[document(collection = "lessons")]
/// struct Lesson {
///     #[document(id)]
///     pub id: String,
///     #[document(created_at)]
///     pub created_at: Option<Timestamp>,
/// }
/// ```
///
/// Attributes:
/// - `#[document(collection = "...")]` on the struct. Defaults to the snake_case
///   struct name plus `s`.
/// - `#[document(id)]` on the identity field. Defaults to a field named `id`.
/// - `#[document(created_at)]` / `#[document(updated_at)]` on `Option<Timestamp>`
///   fields used for client-side ordering. Without them the trait defaults
///   (no timestamp) apply.
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    document::derive_document(input)
}
