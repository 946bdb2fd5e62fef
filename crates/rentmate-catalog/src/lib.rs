pub mod client;
pub mod error;
pub mod payment;
pub mod types;
pub mod window;

pub use client::CatalogClient;
pub use error::CatalogError;
pub use payment::PaymentQuote;
pub use types::{Booking, Item, ItemSummary};
pub use window::RentalWindow;
