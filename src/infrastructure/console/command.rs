//! Shell 命令解析

use thiserror::Error;

use crate::domain::{DomainError, Language, Section};

/// 命令解析错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing argument <{argument}> for '{command}'")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// 外壳意图
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Start { name: String, language: Language },
    End,
    Section(Section),
    Hide,
    Show,
    Translate(Vec<Language>),
    Text(Language),
    Process(Vec<String>),
    Play,
    Stop,
    Status,
    Help,
    Quit,
}

impl ShellCommand {
    /// 解析一行输入；空行返回 `Ok(None)`
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match verb.to_lowercase().as_str() {
            "start" => {
                // 最后一个参数是语言，其余部分组成显示名
                let (language, name) = args.split_last().ok_or(CommandError::MissingArgument {
                    command: "start",
                    argument: "name",
                })?;
                if name.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "start",
                        argument: "language",
                    });
                }
                ShellCommand::Start {
                    name: name.join(" "),
                    language: language.parse()?,
                }
            }
            "end" => ShellCommand::End,
            "section" => {
                let name = args.first().ok_or(CommandError::MissingArgument {
                    command: "section",
                    argument: "name",
                })?;
                ShellCommand::Section(name.parse()?)
            }
            "hide" => ShellCommand::Hide,
            "show" => ShellCommand::Show,
            "translate" => {
                if args.is_empty() {
                    ShellCommand::Translate(Language::ALL.to_vec())
                } else {
                    let languages = args
                        .iter()
                        .map(|a| a.parse::<Language>())
                        .collect::<Result<Vec<_>, _>>()?;
                    ShellCommand::Translate(languages)
                }
            }
            "text" => {
                let language = args.first().ok_or(CommandError::MissingArgument {
                    command: "text",
                    argument: "language",
                })?;
                ShellCommand::Text(language.parse()?)
            }
            "process" => ShellCommand::Process(args.iter().map(|a| a.to_string()).collect()),
            "play" => ShellCommand::Play,
            "stop" => ShellCommand::Stop,
            "status" => ShellCommand::Status,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

pub const HELP: &str = "\
commands:
  start <name> <language>   start a live conversation
  end                       end the current conversation
  section <name>            switch section (upload, ask, podcast, conversation)
  hide | show               change page visibility
  translate [language...]   load translations (all languages by default)
  text <language>           fetch podcast text
  process <url>...          submit YouTube videos for summarization
  play | stop               control synthesized audio
  status                    show current state
  quit                      leave the shell";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_with_multi_word_name() {
        let command = ShellCommand::parse("start Ada Lovelace es").unwrap().unwrap();
        assert_eq!(
            command,
            ShellCommand::Start {
                name: "Ada Lovelace".to_string(),
                language: Language::Spanish,
            }
        );
    }

    #[test]
    fn test_parse_start_requires_name_and_language() {
        assert_eq!(
            ShellCommand::parse("start").unwrap_err(),
            CommandError::MissingArgument {
                command: "start",
                argument: "name",
            }
        );
        assert_eq!(
            ShellCommand::parse("start en").unwrap_err(),
            CommandError::MissingArgument {
                command: "start",
                argument: "language",
            }
        );
    }

    #[test]
    fn test_parse_translate_defaults_to_all_languages() {
        let command = ShellCommand::parse("translate").unwrap().unwrap();
        assert_eq!(command, ShellCommand::Translate(Language::ALL.to_vec()));

        let command = ShellCommand::parse("translate fr ur").unwrap().unwrap();
        assert_eq!(
            command,
            ShellCommand::Translate(vec![Language::French, Language::Urdu])
        );
    }

    #[test]
    fn test_parse_rejects_unknown_language() {
        let err = ShellCommand::parse("text klingon").unwrap_err();
        assert!(matches!(err, CommandError::Invalid(DomainError::UnknownLanguage(_))));
    }

    #[test]
    fn test_parse_blank_and_unknown() {
        assert_eq!(ShellCommand::parse("   ").unwrap(), None);
        assert_eq!(
            ShellCommand::parse("dance").unwrap_err(),
            CommandError::Unknown("dance".to_string())
        );
    }

    #[test]
    fn test_parse_section_alias() {
        let command = ShellCommand::parse("section live").unwrap().unwrap();
        assert_eq!(command, ShellCommand::Section(Section::Conversation));
    }
}
