//! Token domain - claims and validated principals

mod claims;
mod principal;

pub use claims::{Claim, ClaimSet, REGISTERED_CLAIMS};
pub use principal::TokenPrincipal;
