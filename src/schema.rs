use std::sync::Arc;

use teloxide::{
    dispatching::{dialogue::GetChatId, UpdateFilterExt, UpdateHandler},
    dptree,
    payloads::{SendMessageSetters, SendPhotoSetters},
    prelude::Requester,
    types::{CallbackQuery, ChatId, InputFile, Message, Update, UserId},
    Bot,
};
use tracing::instrument;

use crate::{
    commands::Command,
    keyboard::Keyboard,
    router::{DialogueRouter, Event, Reply},
    HandlerError, HandlerResult,
};

pub fn schema() -> UpdateHandler<HandlerError> {
    let command_handler = teloxide::filter_command::<Command, _>().endpoint(on_command);

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(dptree::filter(is_plain_text).endpoint(on_text));

    let callback_handler = Update::filter_callback_query().endpoint(on_callback);

    dptree::entry()
        .branch(message_handler)
        .branch(callback_handler)
}

/// Unrecognised `/commands` never reach the free-text endpoint.
fn is_plain_text(msg: Message) -> bool {
    msg.text().is_some_and(|text| !text.starts_with('/'))
}

/// Sessions are per private chat, whose id is the user id.
fn chat_user(msg: &Message) -> Option<UserId> {
    msg.chat.is_private().then(|| UserId(msg.chat.id.0 as u64))
}

async fn on_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    router: Arc<DialogueRouter>,
) -> HandlerResult {
    tracing::info!(chat = %msg.chat.id, command = ?cmd, "Command received");
    let result = dispatch_message(&bot, &msg, Event::Command(cmd), &router).await;
    report(format!("command {cmd:?} in chat {}", msg.chat.id), result)
}

async fn on_text(bot: Bot, msg: Message, router: Arc<DialogueRouter>) -> HandlerResult {
    let text = msg.text().unwrap_or_default().to_owned();
    tracing::info!(chat = %msg.chat.id, text = %text, "Message received");
    let description = format!("message {text:?} in chat {}", msg.chat.id);
    let result = dispatch_message(&bot, &msg, Event::Text(text), &router).await;
    report(description, result)
}

async fn on_callback(bot: Bot, q: CallbackQuery, router: Arc<DialogueRouter>) -> HandlerResult {
    let payload = q.data.clone().unwrap_or_default();
    tracing::info!(user = %q.from.id, payload = %payload, "Callback query received");
    let description = format!("callback {payload:?} from {}", q.from.id);
    let result = dispatch_callback(&bot, &q, payload, &router).await;
    report(description, result)
}

async fn dispatch_message(
    bot: &Bot,
    msg: &Message,
    event: Event,
    router: &DialogueRouter,
) -> HandlerResult {
    let Some(user) = chat_user(msg) else {
        tracing::debug!(chat = %msg.chat.id, "Ignoring message outside of a private chat");
        return Ok(());
    };

    let replies = router.handle(user, &event).await;
    deliver(bot, msg.chat.id, replies).await
}

async fn dispatch_callback(
    bot: &Bot,
    q: &CallbackQuery,
    payload: String,
    router: &DialogueRouter,
) -> HandlerResult {
    bot.answer_callback_query(&q.id).await?;

    let Some(chat_id) = q.chat_id() else {
        tracing::warn!(user = %q.from.id, "Callback query without a chat");
        return Ok(());
    };

    let replies = router.handle(q.from.id, &Event::Callback(payload)).await;
    deliver(bot, chat_id, replies).await
}

/// Sends replies in order, each as a new message. A photo that fails to
/// upload is replaced by its caption so the card and its buttons still arrive.
#[instrument(level = "debug", skip(bot, replies))]
async fn deliver(bot: &Bot, chat_id: ChatId, replies: Vec<Reply>) -> HandlerResult {
    for reply in replies {
        match reply {
            Reply::Text { text, keyboard } => send_text(bot, chat_id, text, keyboard).await?,
            Reply::Photo {
                ref path,
                ref caption,
                ref keyboard,
            } => {
                let mut request = bot.send_photo(chat_id, InputFile::file(path.clone()));
                if let Some(caption) = caption {
                    request = request.caption(caption.clone());
                }
                if let Some(keyboard) = keyboard {
                    request = request.reply_markup(keyboard.markup());
                }
                if let Err(err) = request.await {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "Failed to send photo, falling back to text"
                    );
                    if let Some(Reply::Text { text, keyboard }) = reply.text_fallback() {
                        send_text(bot, chat_id, text, keyboard).await?;
                    }
                }
            }
        }
    }

    Ok(())
}

async fn send_text(
    bot: &Bot,
    chat_id: ChatId,
    text: String,
    keyboard: Option<Keyboard>,
) -> HandlerResult {
    let mut request = bot.send_message(chat_id, text);
    if let Some(keyboard) = keyboard {
        request = request.reply_markup(keyboard.markup());
    }
    request.await?;
    Ok(())
}

/// Catch-all for failures while handling one update: logged together with the
/// update, never propagated to the dispatcher.
fn report(update: String, result: HandlerResult) -> HandlerResult {
    if let Err(err) = result {
        tracing::error!(update = %update, error = %err, "Failed to handle update");
    }
    Ok(())
}
