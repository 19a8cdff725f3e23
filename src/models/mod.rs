pub mod invoice;

pub use invoice::{Client, Invoice, LineItem, ProcessedInvoice, Totals};
