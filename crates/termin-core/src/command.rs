use thiserror::Error;

/// Poll name that triggers the weekend-date shortcut in `!newpoll`.
pub const NEXT_POLL_NAME: &str = "next";

/// Command reference: invocation, argument shape, description. Drives both
/// the `!help` reply and the usage text of parse errors.
pub const COMMANDS: &[(&str, &str, &str)] = &[
    ("!newpoll", "{name};{question};{options}+", "Creates a new poll"),
    ("!endpoll", "{name}<;keep>", "Evaluates <and deletes> given poll"),
    ("!delpoll", "{name}", "Deletes a existing poll"),
    (
        "!poke",
        "{name}<;{emote}>",
        "Mentions all, that hadn't reacted to the poll <with emote>",
    ),
    (
        "!who",
        "{id}<;{emote}>",
        "Lists all, that reacted to the message <with emote>",
    ),
    ("!help", "", "This :eyes:"),
    ("!ping", "", "Tests if bot is up and running"),
];

/// A parsed chat command. One closed variant per supported command so the
/// engine can match exhaustively instead of switching on strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Help,
    NewPoll {
        name: String,
        question: String,
        options: Vec<String>,
    },
    DeletePoll {
        name: String,
    },
    EndPoll {
        name: String,
        keep: bool,
    },
    Poke {
        name: String,
        emote: Option<String>,
    },
    Who {
        message_id: String,
        emote: Option<String>,
    },
}

/// Parse failures are user-visible reply text, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Bare unknown head; answered with the literal `???`.
    #[error("???")]
    UnknownCommand,
    /// Unknown head followed by arguments; dropped without a reply.
    #[error("unknown command")]
    UnknownCommandWithArgs,
    #[error("Usage: {command} {usage}")]
    MissingArguments {
        command: &'static str,
        usage: &'static str,
    },
}

fn missing_arguments(command: &'static str) -> ParseError {
    let usage = COMMANDS
        .iter()
        .find(|(name, _, _)| *name == command)
        .map(|(_, usage, _)| *usage)
        .unwrap_or("");
    ParseError::MissingArguments { command, usage }
}

impl Command {
    /// Parse one raw chat message.
    ///
    /// The first newline counts as a space, then the message splits into a
    /// head token and an optional remainder. Without a remainder only the
    /// zero-argument commands exist. With one, the remainder splits on `;`
    /// into at most three segments; any further `;` stays inside the third
    /// segment (the options list uses `;` itself).
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let text = raw.replacen('\n', " ", 1);
        let (head, rest) = match text.split_once(' ') {
            Some((head, rest)) if !rest.is_empty() => (head, Some(rest)),
            _ => (text.as_str(), None),
        };

        let Some(rest) = rest else {
            return match head {
                "!ping" => Ok(Command::Ping),
                "!help" => Ok(Command::Help),
                _ => Err(ParseError::UnknownCommand),
            };
        };

        let segments: Vec<&str> = rest.splitn(3, ';').collect();
        match head {
            "!newpoll" => {
                if segments[0] == NEXT_POLL_NAME {
                    // Question and options are generated by the engine.
                    return Ok(Command::NewPoll {
                        name: NEXT_POLL_NAME.to_string(),
                        question: String::new(),
                        options: Vec::new(),
                    });
                }
                if segments.len() < 3 {
                    return Err(missing_arguments("!newpoll"));
                }
                Ok(Command::NewPoll {
                    name: segments[0].to_string(),
                    question: segments[1].to_string(),
                    options: segments[2].split(';').map(str::to_string).collect(),
                })
            }
            "!delpoll" => Ok(Command::DeletePoll {
                name: segments[0].to_string(),
            }),
            "!endpoll" => Ok(Command::EndPoll {
                name: segments[0].to_string(),
                keep: segments.get(1).copied() == Some("keep"),
            }),
            "!poke" => Ok(Command::Poke {
                name: segments[0].to_string(),
                emote: segments.get(1).map(|s| s.to_string()),
            }),
            "!who" => Ok(Command::Who {
                message_id: segments[0].to_string(),
                emote: segments.get(1).map(|s| s.to_string()),
            }),
            _ => Err(ParseError::UnknownCommandWithArgs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_argument_commands() {
        assert_eq!(Command::parse("!ping"), Ok(Command::Ping));
        assert_eq!(Command::parse("!help"), Ok(Command::Help));
    }

    #[test]
    fn bare_argument_command_is_unknown() {
        assert_eq!(Command::parse("!newpoll"), Err(ParseError::UnknownCommand));
        assert_eq!(Command::parse("hello"), Err(ParseError::UnknownCommand));
    }

    #[test]
    fn newpoll_with_three_segments() {
        let cmd = Command::parse("!newpoll trip;Where to?;A;B;C").unwrap();
        assert_eq!(
            cmd,
            Command::NewPoll {
                name: "trip".into(),
                question: "Where to?".into(),
                options: vec!["A".into(), "B".into(), "C".into()],
            }
        );
    }

    #[test]
    fn newpoll_missing_segments_is_a_usage_error() {
        let err = Command::parse("!newpoll trip;Where to?").unwrap_err();
        assert!(matches!(err, ParseError::MissingArguments { .. }));
        assert!(err.to_string().contains("!newpoll"));
    }

    #[test]
    fn newpoll_next_needs_only_the_name() {
        let cmd = Command::parse("!newpoll next").unwrap();
        assert_eq!(
            cmd,
            Command::NewPoll {
                name: "next".into(),
                question: String::new(),
                options: vec![],
            }
        );
    }

    #[test]
    fn first_newline_acts_as_separator() {
        let cmd = Command::parse("!delpoll\ntrip").unwrap();
        assert_eq!(cmd, Command::DeletePoll { name: "trip".into() });
    }

    #[test]
    fn endpoll_keep_flag() {
        assert_eq!(
            Command::parse("!endpoll trip;keep").unwrap(),
            Command::EndPoll {
                name: "trip".into(),
                keep: true,
            }
        );
        assert_eq!(
            Command::parse("!endpoll trip").unwrap(),
            Command::EndPoll {
                name: "trip".into(),
                keep: false,
            }
        );
        // Anything other than the literal "keep" does not delete-protect.
        assert_eq!(
            Command::parse("!endpoll trip;kep").unwrap(),
            Command::EndPoll {
                name: "trip".into(),
                keep: false,
            }
        );
    }

    #[test]
    fn poke_and_who_take_an_optional_emote() {
        assert_eq!(
            Command::parse("!poke trip").unwrap(),
            Command::Poke {
                name: "trip".into(),
                emote: None,
            }
        );
        assert_eq!(
            Command::parse("!poke trip;0\u{fe0f}\u{20e3}").unwrap(),
            Command::Poke {
                name: "trip".into(),
                emote: Some("0\u{fe0f}\u{20e3}".into()),
            }
        );
        assert_eq!(
            Command::parse("!who 424242;3\u{fe0f}\u{20e3}").unwrap(),
            Command::Who {
                message_id: "424242".into(),
                emote: Some("3\u{fe0f}\u{20e3}".into()),
            }
        );
    }

    #[test]
    fn unknown_head_with_remainder_is_silently_dropped() {
        assert_eq!(
            Command::parse("!frobnicate a;b;c"),
            Err(ParseError::UnknownCommandWithArgs)
        );
    }
}
