//! 聊天訊息模型
//!
//! 只保留穩定化流程需要的欄位：附件與內嵌影片網址。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u64,
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
}

impl ChatMessage {
    /// 以指令前綴組成、只含單一網址的穩定化要求（例如 CLI 輸入的連結）
    #[must_use]
    pub fn stabilize_request(prefix: &str, url: &str) -> Self {
        Self {
            content: format!("{prefix}vid {url}"),
            attachments: Vec::new(),
            embeds: vec![Embed {
                video_url: Some(url.to_string()),
            }],
        }
    }
}

/// 取出所有內嵌影片的網址（依訊息中的順序）
#[must_use]
pub fn extract_embedded_urls(message: &ChatMessage) -> Vec<String> {
    message
        .embeds
        .iter()
        .filter_map(|embed| embed.video_url.as_deref())
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

/// 判斷訊息是否為穩定化指令（例如 `stab!vid`）
#[must_use]
pub fn is_stabilize_command(content: &str, prefix: &str) -> bool {
    content
        .split_whitespace()
        .next()
        .and_then(|word| word.strip_prefix(prefix))
        .is_some_and(|command| command == "vid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_embedded_urls_skips_empty_embeds() {
        let message = ChatMessage {
            content: "stab!vid".to_string(),
            attachments: Vec::new(),
            embeds: vec![
                Embed {
                    video_url: Some("https://example.com/a.mp4".to_string()),
                },
                Embed { video_url: None },
                Embed {
                    video_url: Some("  ".to_string()),
                },
                Embed {
                    video_url: Some("https://example.com/b.mp4".to_string()),
                },
            ],
        };

        assert_eq!(
            extract_embedded_urls(&message),
            vec!["https://example.com/a.mp4", "https://example.com/b.mp4"]
        );
    }

    #[test]
    fn test_stabilize_request() {
        let message = ChatMessage::stabilize_request("!", "https://example.com/clip");
        assert_eq!(message.content, "!vid https://example.com/clip");
        assert!(is_stabilize_command(&message.content, "!"));
        assert_eq!(extract_embedded_urls(&message), vec!["https://example.com/clip"]);
        assert!(message.attachments.is_empty());
    }

    #[test]
    fn test_is_stabilize_command() {
        assert!(is_stabilize_command("stab!vid", "stab!"));
        assert!(is_stabilize_command("stab!vid https://example.com", "stab!"));
        assert!(!is_stabilize_command("stab!video", "stab!"));
        assert!(!is_stabilize_command("hello stab!vid", "stab!"));
        assert!(!is_stabilize_command("", "stab!"));
    }

    #[test]
    fn test_message_deserialize_without_lists() {
        let message: ChatMessage = serde_json::from_str(r#"{"content": "stab!vid"}"#).unwrap();
        assert!(message.attachments.is_empty());
        assert!(message.embeds.is_empty());
    }
}
