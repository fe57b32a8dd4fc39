//! Request-scoped logging context.
//!
//! # Data Flow
//! ```text
//! request handler
//!     → attach_*(ctx, value)      (merge one field into the bag)
//!     → new Context (parent untouched)
//!     → passed down the call chain
//!     → Logger::info(&ctx, ..)    (middleware reads current_bag)
//!
//! failure path:
//!     → ContextError::new(&ctx, err)   (snapshot of the bag)
//!     → returned / sent to a background consumer
//!     → context_from_error(&ctx, &err) (bag reinstalled for logging)
//! ```
//!
//! # Design Decisions
//! - Attach operations never fail and never mutate the parent context
//! - Empty strings and zero ids mean "absent"; they never overwrite a field
//! - The bag lives under a private key type, so nothing outside this module
//!   can read or replace it without going through these functions
//! - Phone numbers are masked when attached, not when logged

pub mod bag;
pub mod call;
pub mod error;
pub mod masking;

pub use bag::ContextBag;
pub use call::{CancelHandle, Context, DoneReason};
pub use error::{context_from_error, wrap_error, ContextError, ResultExt};
pub use masking::{mask_phone, mask_tail};

use uuid::Uuid;

use crate::record::Value;

/// Private key under which the bag is stored in a `Context`.
struct BagSlot(ContextBag);

/// The bag attached to `ctx`, if any.
pub fn bag_of(ctx: &Context) -> Option<&ContextBag> {
    ctx.value::<BagSlot>().map(|slot| &slot.0)
}

/// The bag attached to `ctx`, or an empty one.
pub fn current_bag(ctx: &Context) -> ContextBag {
    bag_of(ctx).cloned().unwrap_or_default()
}

/// Install `bag` as-is, replacing any bag `ctx` carries.
pub(crate) fn install_bag(ctx: &Context, bag: ContextBag) -> Context {
    ctx.with_value(BagSlot(bag))
}

/// Merge a partial bag into the one carried by `ctx`.
pub fn attach_bag(ctx: &Context, partial: ContextBag) -> Context {
    let merged = current_bag(ctx).merge(partial);
    install_bag(ctx, merged)
}

pub fn attach_user_id(ctx: &Context, user_id: i64) -> Context {
    attach_bag(ctx, ContextBag::new().with_user_id(user_id))
}

/// Attach a phone number. Only the masked form is stored.
pub fn attach_phone(ctx: &Context, phone: &str) -> Context {
    attach_bag(ctx, ContextBag::new().with_phone(phone))
}

pub fn attach_sms_gate(ctx: &Context, gate: &str) -> Context {
    attach_bag(ctx, ContextBag::new().with_sms_gate(gate))
}

pub fn attach_message(ctx: &Context, message: &str) -> Context {
    attach_bag(ctx, ContextBag::new().with_message(message))
}

pub fn attach_request_id(ctx: &Context, request_id: &str) -> Context {
    attach_bag(ctx, ContextBag::new().with_request_id(request_id))
}

/// Generate a UUID v4 request id and attach it.
pub fn attach_new_request_id(ctx: &Context) -> (Context, String) {
    let id = Uuid::new_v4().to_string();
    (attach_request_id(ctx, &id), id)
}

/// Attach an arbitrary field. Built-in keys route to their typed fields.
pub fn attach_field(ctx: &Context, key: &str, value: impl Into<Value>) -> Context {
    attach_bag(ctx, ContextBag::new().with_field(key, value))
}
