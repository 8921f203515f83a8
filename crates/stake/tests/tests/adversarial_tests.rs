#[path = "adversarial/reentrant_withdraw.rs"]
mod reentrant_withdraw;

#[path = "adversarial/reentrant_sign.rs"]
mod reentrant_sign;

#[path = "adversarial/rejecting_recipient.rs"]
mod rejecting_recipient;

#[path = "adversarial/custody_drain.rs"]
mod custody_drain;
