use std::{net::SocketAddr, path::PathBuf};

use url::Url;

use crate::error::ConfigError;

/// Stand-in used when no token is configured. Not a real credential.
pub const PLACEHOLDER_TOKEN: &str = "0000000000:PLACEHOLDER-SET-TELOXIDE_TOKEN";
pub const PLACEHOLDER_SUPPORT_CHAT: i64 = 0;

#[derive(Debug, Clone)]
pub struct Webhook {
    pub url: Url,
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub support_chat_id: i64,
    pub data_dir: PathBuf,
    pub media_dir: PathBuf,
    pub logo_file: String,
    pub log_level: String,
    pub webhook: Option<Webhook>,
}

impl Config {
    /// Reads `.env` (if any) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup("TELOXIDE_TOKEN")
            .or_else(|| lookup("BOT_TOKEN"))
            .unwrap_or_else(|| PLACEHOLDER_TOKEN.to_owned());

        let support_chat_id = match lookup("SUPPORT_CHAT_ID") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidSupportChat(raw))?,
            None => PLACEHOLDER_SUPPORT_CHAT,
        };

        let webhook = match (lookup("NGROK_URL"), lookup("NGROK_ADDR")) {
            (Some(url), Some(addr)) => Some(Webhook {
                url: url.parse()?,
                addr: addr.parse()?,
            }),
            _ => None,
        };

        Ok(Self {
            token,
            support_chat_id,
            data_dir: lookup("DATA_DIR").unwrap_or_else(|| "data".into()).into(),
            media_dir: lookup("MEDIA_DIR")
                .unwrap_or_else(|| "media/images".into())
                .into(),
            logo_file: lookup("LOGO_FILE").unwrap_or_else(|| "moscow_zoo.png".into()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            webhook,
        })
    }

    pub fn uses_placeholder_token(&self) -> bool {
        self.token == PLACEHOLDER_TOKEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn falls_back_to_placeholders() {
        let cfg = config(&[]).unwrap();

        assert!(cfg.uses_placeholder_token());
        assert_eq!(cfg.support_chat_id, PLACEHOLDER_SUPPORT_CHAT);
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.media_dir, PathBuf::from("media/images"));
        assert_eq!(cfg.logo_file, "moscow_zoo.png");
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.webhook.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("BOT_TOKEN", "123:abc"),
            ("SUPPORT_CHAT_ID", "-100500"),
            ("DATA_DIR", "/srv/quiz"),
            ("NGROK_URL", "https://example.ngrok.app/"),
            ("NGROK_ADDR", "127.0.0.1:8443"),
        ])
        .unwrap();

        assert_eq!(cfg.token, "123:abc");
        assert_eq!(cfg.support_chat_id, -100500);
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/quiz"));
        let webhook = cfg.webhook.unwrap();
        assert_eq!(webhook.addr.port(), 8443);
        assert_eq!(webhook.url.host_str(), Some("example.ngrok.app"));
    }

    #[test]
    fn teloxide_token_wins_over_bot_token() {
        let cfg = config(&[("BOT_TOKEN", "1:a"), ("TELOXIDE_TOKEN", "2:b")]).unwrap();
        assert_eq!(cfg.token, "2:b");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            config(&[("SUPPORT_CHAT_ID", "support")]),
            Err(ConfigError::InvalidSupportChat(_))
        ));
        assert!(matches!(
            config(&[("NGROK_URL", "not a url"), ("NGROK_ADDR", "127.0.0.1:80")]),
            Err(ConfigError::InvalidWebhookUrl(_))
        ));
        assert!(matches!(
            config(&[("NGROK_URL", "https://x.io"), ("NGROK_ADDR", "nowhere")]),
            Err(ConfigError::InvalidWebhookAddr(_))
        ));
    }
}
