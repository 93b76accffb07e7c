//! User-facing Reply - 用户可见结果
//!
//! 命令与触发处理的统一出参: 成功与预期失败都以结构化结果返回,
//! 由外围呈现层渲染; Display 提供默认纯文本渲染

use serde::Serialize;

/// 效果音一览中的单项
#[derive(Debug, Clone, Serialize)]
pub struct EffectSummary {
    pub name: String,
    pub source_url: String,
}

/// 命令帮助中的单项
#[derive(Debug, Clone, Serialize)]
pub struct CommandHelp {
    pub name: &'static str,
    pub params: &'static str,
    pub description: &'static str,
}

/// 用户可见结果
///
/// 预期失败 (下载失败 / Busy / 不在语音频道等) 不是 Err,
/// 与成功结果走同一条回复通道
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    EffectRegistered { name: String },
    EffectRemoved { name: String },
    EffectList { effects: Vec<EffectSummary> },
    Joined { channel: u64 },
    AlreadyConnected,
    Left,
    NotConnected,
    Help { commands: Vec<CommandHelp> },
    NotInVoice,
    Busy { name: String },
    DownloadFailed { name: String, url: String, status: Option<u16> },
    StorageFailed { name: String },
    VoiceConnectFailed { reason: String },
    PlaybackFailed { name: String, reason: String },
    InvalidRequest { reason: String },
    Internal,
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EffectRegistered { name } => {
                write!(f, "Registered sound effect `{}`.", name)
            }
            Self::EffectRemoved { name } => {
                write!(f, "Removed sound effect `{}`.", name)
            }
            Self::EffectList { effects } => {
                if effects.is_empty() {
                    return write!(f, "No sound effects registered.");
                }
                writeln!(f, "Registered sound effects:")?;
                for (i, e) in effects.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}: {}", e.name, e.source_url)?;
                }
                Ok(())
            }
            Self::Joined { channel } => {
                write!(f, "Joined voice channel <#{}>.", channel)
            }
            Self::AlreadyConnected => {
                write!(f, "Already connected to a voice channel.")
            }
            Self::Left => write!(f, "Disconnected from the voice channel."),
            Self::NotConnected => {
                write!(f, "Not connected to any voice channel.")
            }
            Self::Help { commands } => {
                writeln!(f, "Commands:")?;
                for (i, c) in commands.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    if c.params.is_empty() {
                        write!(f, "/{}: {}", c.name, c.description)?;
                    } else {
                        write!(f, "/{} {}: {}", c.name, c.params, c.description)?;
                    }
                }
                Ok(())
            }
            Self::NotInVoice => write!(f, "Join a voice channel first."),
            Self::Busy { name } => {
                write!(f, "Cannot play `{}`: another sound is already playing.", name)
            }
            Self::DownloadFailed { name, url, status } => match status {
                Some(status) => write!(
                    f,
                    "Failed to register sound effect `{}`: download of {} returned status {}.",
                    name, url, status
                ),
                None => write!(
                    f,
                    "Failed to register sound effect `{}`: download of {} failed.",
                    name, url
                ),
            },
            Self::StorageFailed { name } => {
                write!(f, "Failed to register sound effect `{}`: storage unavailable.", name)
            }
            Self::VoiceConnectFailed { reason } => {
                write!(f, "Failed to connect to the voice channel: {}", reason)
            }
            Self::PlaybackFailed { name, reason } => {
                write!(f, "Failed to play sound effect `{}`: {}", name, reason)
            }
            Self::InvalidRequest { reason } => write!(f, "Invalid request: {}", reason),
            Self::Internal => write!(f, "Something went wrong handling the request."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_effect_list_rendering() {
        let reply = Reply::EffectList { effects: vec![] };
        assert_eq!(reply.to_string(), "No sound effects registered.");
    }

    #[test]
    fn test_effect_list_pairs_name_with_url() {
        let reply = Reply::EffectList {
            effects: vec![
                EffectSummary {
                    name: "boing".into(),
                    source_url: "https://example.com/boing.mp3".into(),
                },
                EffectSummary {
                    name: "tada".into(),
                    source_url: "https://example.com/tada.wav".into(),
                },
            ],
        };
        let text = reply.to_string();
        assert!(text.contains("boing: https://example.com/boing.mp3"));
        assert!(text.contains("tada: https://example.com/tada.wav"));
    }

    #[test]
    fn test_failure_replies_quote_effect_name() {
        let busy = Reply::Busy { name: "boing".into() };
        assert!(busy.to_string().contains("`boing`"));

        let download = Reply::DownloadFailed {
            name: "boing".into(),
            url: "https://example.com/gone.mp3".into(),
            status: Some(404),
        };
        let text = download.to_string();
        assert!(text.contains("`boing`"));
        assert!(text.contains("404"));
    }
}
