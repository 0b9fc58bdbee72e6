//! Core domain for the Propel PRD editor: the document model, the section
//! catalog, load-boundary normalization, gateway contracts, and the document
//! state controller.

pub mod controller;
pub mod document;
pub mod gateway;
pub mod schema;
pub mod testing;

pub use controller::{
    AddressBar, ContextField, ControllerState, DocumentController, MemoryAddressBar, RouteQuery,
    ViewState, DEFAULT_AUTOSAVE_DELAY,
};
pub use document::model::{
    ApprovalStatus, AppSettings, Comment, DocStatus, GenerationContext, Prd, PublicSettings,
    Section, DEFAULT_MODEL,
};
pub use document::normalize::normalize_document;
pub use document::validate::{validate_import, ImportError};
pub use gateway::{
    ApprovalEvent, Approver, ApproverDetails, ContentGenerator, DocumentStore, GenerationError,
    StoreError, WebhookNotifier, APPROVAL_EVENT_NAME,
};
