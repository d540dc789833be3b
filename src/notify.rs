// src/notify.rs

use crate::session::Mode;
use log::warn;
use notify_rust::Notification;
use rfd::{MessageButtons, MessageDialog, MessageLevel};

pub const ACKNOWLEDGE: &str = "Acknowledge";

/**
 * Blocks until the user has acknowledged the end of a period.
 */
pub trait Prompt {
    fn acknowledge(&self, finished: Mode);
}

/**
 * Posts a desktop notification and waits on a native modal dialog.
 */
pub struct DialogPrompt;

impl Prompt for DialogPrompt {
    fn acknowledge(&self, finished: Mode) {
        let message: &str = finished.end_message();
        if let Err(e) = Notification::new()
            .summary("Rest Reminder")
            .body(message)
            .show()
        {
            warn!("Desktop notification failed: {}", e);
        }
        MessageDialog::new()
            .set_title("Reminder")
            .set_description(message)
            .set_level(MessageLevel::Warning)
            .set_buttons(MessageButtons::OkCustom(ACKNOWLEDGE.to_string()))
            .show();
    }
}
