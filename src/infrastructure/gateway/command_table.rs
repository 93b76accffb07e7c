//! Command Table - 静态命令描述符表
//!
//! 命令面固定, 启动时构建一次; help 输出直接由这张表渲染

use crate::application::{CommandHelp, Reply};

/// 命令描述符
#[derive(Debug, Clone, Copy)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub params: &'static str,
    pub description: &'static str,
}

/// 全部命令
pub const COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "se_add",
        params: "<name> <url>",
        description: "Register a sound effect from a URL",
    },
    CommandDescriptor {
        name: "se_del",
        params: "<name>",
        description: "Remove a registered sound effect",
    },
    CommandDescriptor {
        name: "se_list",
        params: "",
        description: "List registered sound effects with their source URLs",
    },
    CommandDescriptor {
        name: "join",
        params: "",
        description: "Join your current voice channel",
    },
    CommandDescriptor {
        name: "disc",
        params: "",
        description: "Leave the voice channel",
    },
    CommandDescriptor {
        name: "help",
        params: "",
        description: "Show this command list",
    },
];

/// 由命令表渲染 help 回复
pub fn help_reply() -> Reply {
    Reply::Help {
        commands: COMMANDS
            .iter()
            .map(|c| CommandHelp {
                name: c.name,
                params: c.params,
                description: c.description,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::CommandRequest;

    #[test]
    fn test_table_covers_every_command_request() {
        let requests = [
            CommandRequest::AddEffect {
                name: "boing".into(),
                url: "https://example.com/boing.mp3".into(),
            },
            CommandRequest::RemoveEffect {
                name: "boing".into(),
            },
            CommandRequest::ListEffects,
            CommandRequest::Join,
            CommandRequest::Leave,
            CommandRequest::Help,
        ];

        for request in &requests {
            assert!(
                COMMANDS.iter().any(|c| c.name == request.name()),
                "descriptor missing for {}",
                request.name()
            );
        }
        assert_eq!(COMMANDS.len(), requests.len());
    }

    #[test]
    fn test_help_reply_renders_usage() {
        let text = help_reply().to_string();
        assert!(text.contains("/se_add <name> <url>"));
        assert!(text.contains("/se_list:"));
        assert!(text.contains("/disc:"));
    }
}
