//! Request and result types of a conversion.

mod request;
mod result;

pub use request::ConversionRequest;
pub use result::ConversionResult;
