#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    New,
    Delete,
    Help,
    Quit,
    Unknown(String),
}

/// Parses `input` as a command when its first word looks like `/name`.
///
/// A first word with anything besides ASCII letters, digits, `-` or `_` after
/// the slash (such as `/etc/hosts`) is ordinary message text.
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let command = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_string();
    if !is_command_name(&command[1..]) {
        return None;
    }

    let parsed = match command.as_str() {
        "/new" => SlashCommand::New,
        "/delete" => SlashCommand::Delete,
        "/help" => SlashCommand::Help,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}

fn is_command_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_slash_command("hello /new"), None);
        assert_eq!(parse_slash_command(""), None);
    }

    #[test]
    fn known_commands_ignore_arguments_and_padding() {
        assert_eq!(parse_slash_command("  /new  "), Some(SlashCommand::New));
        assert_eq!(parse_slash_command("/delete now"), Some(SlashCommand::Delete));
        assert_eq!(parse_slash_command("/help"), Some(SlashCommand::Help));
        assert_eq!(parse_slash_command("/exit"), Some(SlashCommand::Quit));
    }

    #[test]
    fn path_like_input_is_not_a_command() {
        assert_eq!(parse_slash_command("/etc/hosts is missing"), None);
        assert_eq!(parse_slash_command("/"), None);
        assert_eq!(parse_slash_command("// note"), None);
        assert_eq!(parse_slash_command("/usr/bin"), None);
    }

    #[test]
    fn unknown_commands_keep_their_name() {
        assert_eq!(
            parse_slash_command("/rename foo"),
            Some(SlashCommand::Unknown("/rename".to_string()))
        );
    }
}
