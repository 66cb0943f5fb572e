//! UI independent administration state: list screen, entity form and drafts

pub mod draft;
pub mod field_list;
pub mod form;
pub mod list_screen;
pub mod vat;

#[cfg(test)]
pub(crate) mod testing;

pub use draft::{ClientDraft, CommonFields, DayDraft, Draft, Editable, SupplierDraft};
pub use field_list::{ContactField, EditableRecord, FieldList};
pub use form::{CountryDialog, EntityForm, FormMode, Submission};
pub use list_screen::{EntityListScreen, ImportSummary, RowView};
pub use vat::{VatChoice, VatSelection};
