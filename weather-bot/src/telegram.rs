//! Telegram transport: converts teloxide messages into [`InboundEvent`]s and
//! delivers [`OutboundMessage`]s through the Bot API.

use async_trait::async_trait;
use std::sync::Arc;
use teloxide::{
    payloads::SendMessageSetters,
    prelude::*,
    types::{ButtonRequest, KeyboardButton, KeyboardMarkup, MessageId, ReplyParameters},
};
use tracing::{debug, info};
use weather_core::{
    ChatQueues, ChatTransport, Coordinates, InboundEvent, OutboundMessage, ReplyMarkup,
    TransportError,
};

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        let mut request = self
            .bot
            .send_message(ChatId(message.chat_id), message.text.clone());

        if let Some(id) = message.reply_to {
            request = request.reply_parameters(ReplyParameters::new(MessageId(id)));
        }
        if let Some(markup) = &message.markup {
            request = request.reply_markup(keyboard(markup));
        }

        request.await.map_err(|e| TransportError(e.to_string()))?;
        Ok(())
    }
}

fn keyboard(markup: &ReplyMarkup) -> KeyboardMarkup {
    match markup {
        ReplyMarkup::RequestLocation { label } => KeyboardMarkup::new(vec![vec![
            KeyboardButton::new(label.clone()).request(ButtonRequest::Location),
        ]])
        .resize_keyboard(),
    }
}

/// `None` for messages carrying neither text nor a location.
fn to_inbound(msg: &Message) -> Option<InboundEvent> {
    let text = msg.text().map(str::to_string);
    let location = msg
        .location()
        .map(|l| Coordinates::new(l.latitude, l.longitude));

    if text.is_none() && location.is_none() {
        return None;
    }

    Some(InboundEvent {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        text,
        location,
    })
}

/// Long-poll Telegram and hand every relevant message to the chat queues.
pub async fn run(bot: Bot, queues: Arc<ChatQueues>) {
    teloxide::repl(bot, move |msg: Message| {
        let queues = queues.clone();

        async move {
            match to_inbound(&msg) {
                Some(event) => {
                    info!(
                        chat_id = event.chat_id,
                        message_id = event.message_id,
                        has_text = event.text.is_some(),
                        has_location = event.location.is_some(),
                        "Received message"
                    );
                    queues.submit(event);
                }
                None => debug!(
                    chat_id = msg.chat.id.0,
                    "Ignoring message without text or location"
                ),
            }
            respond(())
        }
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_keyboard_has_single_location_button() {
        let markup = keyboard(&ReplyMarkup::RequestLocation {
            label: "Share location".into(),
        });

        assert_eq!(markup.keyboard.len(), 1);
        assert_eq!(markup.keyboard[0].len(), 1);
        assert_eq!(markup.keyboard[0][0].text, "Share location");
        assert!(matches!(markup.keyboard[0][0].request, Some(ButtonRequest::Location)));
    }

    fn message(extra: serde_json::Value) -> Message {
        let mut json = serde_json::json!({
            "message_id": 17,
            "date": 1_714_564_800,
            "chat": {"id": 42, "type": "private", "first_name": "Ann"},
            "from": {"id": 42, "is_bot": false, "first_name": "Ann"}
        });
        if let (Some(base), Some(extra)) = (json.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn text_message_maps_to_text_event() {
        let event = to_inbound(&message(serde_json::json!({"text": "/weather Paris"}))).unwrap();

        assert_eq!(event, InboundEvent::text(42, 17, "/weather Paris"));
    }

    #[test]
    fn location_message_maps_to_location_event() {
        let msg = message(serde_json::json!({
            "location": {"latitude": 48.8566, "longitude": 2.3522}
        }));

        let event = to_inbound(&msg).unwrap();

        assert_eq!(event, InboundEvent::location(42, 17, Coordinates::new(48.8566, 2.3522)));
    }

    #[test]
    fn message_without_text_or_location_is_skipped() {
        let msg = message(serde_json::json!({
            "contact": {"phone_number": "+33100000000", "first_name": "Bob"}
        }));

        assert!(to_inbound(&msg).is_none());
    }
}
