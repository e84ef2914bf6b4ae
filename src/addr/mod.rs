//! Types for representing bus addresses and bank granularity.

mod page;
mod range;

pub use page::{PageSize, PageSizeTryFromError};
pub use range::{Pages, Range};

//===========================================================================//
