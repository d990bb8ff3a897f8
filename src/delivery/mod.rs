//! Outbound directives, inbound action types, and their Telegram execution.

pub mod directive;
pub mod inbound;
pub mod scheduler;
pub mod telegram;

pub use directive::{
    Button, ButtonAction, Directive, EditBody, FactAttachment, FactGroupId, Keyboard,
    ScheduledAction,
};
pub use inbound::{Actor, CallbackData, ContinentChoice, CoopButton, SoloButton, StartPayload};
pub use scheduler::Scheduler;
pub use telegram::TelegramDelivery;
