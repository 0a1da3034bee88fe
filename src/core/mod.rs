//! Shared identity and call types
//!
//! - [`Principal`]: the identity every operation is checked against
//! - [`Call`] / [`Invoker`]: the encoded-call seam between the multisig
//!   wallet and whatever it controls

pub mod call;
pub mod principal;

pub use call::{
    selector, Call, CallError, Invoker, CHANGE_CONTROLLER_SIGNATURE, MINT_SIGNATURE,
};
pub use principal::Principal;
