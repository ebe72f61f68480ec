//! Chat command recognition.

/// Characters that may introduce a command.
pub const COMMAND_PREFIXES: &[char] = &['.', '-', '$', '!', '¡', '/'];

/// A recognized chat command with its raw argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Gen(String),
    Bin(String),
    Regenerate(String),
    Unknown(String),
}

/// Recognize a command in a message, or `None` if the text has no command prefix.
pub fn parse_command(text: &str) -> Option<Command> {
    let body = text.trim().strip_prefix(COMMAND_PREFIXES)?.trim_start();

    let (word, args) = match body.split_once(char::is_whitespace) {
        Some((word, args)) => (word, args.trim()),
        None => (body, ""),
    };

    // `/gen@SomeBot` addresses this bot explicitly in groups.
    let word = word.split('@').next().unwrap_or_default().to_lowercase();

    let command = match word.as_str() {
        "start" => Command::Start,
        "gen" => Command::Gen(args.to_string()),
        "bin" => Command::Bin(args.to_string()),
        "regenerate" | "regen" => Command::Regenerate(args.to_string()),
        _ => Command::Unknown(word),
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_prefixes() {
        for prefix in COMMAND_PREFIXES {
            let text = format!("{}gen 411111|12|26|123", prefix);
            assert_eq!(
                parse_command(&text),
                Some(Command::Gen("411111|12|26|123".to_string())),
                "prefix {}",
                prefix
            );
        }
    }

    #[test]
    fn test_no_prefix_is_ignored() {
        assert_eq!(parse_command("gen 411111"), None);
        assert_eq!(parse_command("hello there"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_case_and_bot_suffix() {
        assert_eq!(
            parse_command("/GEN@CardBot 411111 12 26 123"),
            Some(Command::Gen("411111 12 26 123".to_string()))
        );
        assert_eq!(parse_command("/start@CardBot"), Some(Command::Start));
    }

    #[test]
    fn test_space_after_prefix() {
        assert_eq!(
            parse_command(". bin 411111"),
            Some(Command::Bin("411111".to_string()))
        );
    }

    #[test]
    fn test_missing_args() {
        assert_eq!(parse_command("!gen"), Some(Command::Gen(String::new())));
        assert_eq!(parse_command("$bin   "), Some(Command::Bin(String::new())));
    }

    #[test]
    fn test_regenerate_and_unknown() {
        assert_eq!(
            parse_command("/regenerate regen_1_00ff"),
            Some(Command::Regenerate("regen_1_00ff".to_string()))
        );
        assert_eq!(
            parse_command("/chk 411111"),
            Some(Command::Unknown("chk".to_string()))
        );
    }
}
