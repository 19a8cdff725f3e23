pub mod csv_export;
pub mod extractor;
pub mod processor;

pub use csv_export::{export_csv, REPORT_FILE_NAME};
pub use extractor::{HttpExtractor, InvoiceExtractor};
pub use processor::{BatchReport, Snapshot, UploadController, UploadedFile};
