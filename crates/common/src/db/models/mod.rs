//! SeaORM entity models
//!
//! Database entities for LitShelf

mod paper;
mod pdf_file;
mod project;

pub use paper::{
    ActiveModel as PaperActiveModel, Column as PaperColumn, Entity as PaperEntity, JournalInfo,
    Model as Paper, PaperView,
};

pub use project::{
    ActiveModel as ProjectActiveModel, Column as ProjectColumn, Entity as ProjectEntity,
    Model as Project,
};

pub use pdf_file::{
    ActiveModel as PdfFileActiveModel, Column as PdfFileColumn, Entity as PdfFileEntity,
    Model as PdfFile,
};
